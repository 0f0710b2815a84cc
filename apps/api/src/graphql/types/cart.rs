//! Cart GraphQL types

use std::sync::Arc;

use async_graphql::{Object, Result, ResultExt, SimpleObject};

use commerce_bridge_dataloader::{Entity, LazyEntity};
use commerce_bridge_occ_client::{Cart as OccCart, DeliveryMode, Product as OccProduct};

use crate::error::{ApiError, ApiResult};
use crate::graphql::loaders::{CartKey, RequestLoaders, CURRENT_CART};

use super::catalog::Product;
use super::shared::{Address, AddressCountry, Money};

#[derive(Debug, Clone, SimpleObject)]
#[graphql(rename_fields = "snake_case")]
pub struct CartPrices {
    pub grand_total: Option<Money>,
    pub subtotal_excluding_tax: Option<Money>,
    pub subtotal_including_tax: Option<Money>,
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(rename_fields = "snake_case")]
pub struct CartItemPrices {
    /// Unit price
    pub price: Option<Money>,
    pub row_total: Option<Money>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct AppliedCoupon {
    pub code: String,
}

/// A delivery mode offered for a shipping address
#[derive(Debug, Clone, SimpleObject)]
#[graphql(rename_fields = "snake_case")]
pub struct AvailableShippingMethod {
    pub carrier_code: String,
    pub method_code: String,
    pub carrier_title: Option<String>,
    pub method_title: Option<String>,
    pub amount: Option<Money>,
    pub available: bool,
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(rename_fields = "snake_case")]
pub struct SelectedShippingMethod {
    pub carrier_code: String,
    pub method_code: String,
    pub carrier_title: Option<String>,
    pub method_title: Option<String>,
    pub amount: Option<Money>,
}

impl From<&DeliveryMode> for AvailableShippingMethod {
    fn from(mode: &DeliveryMode) -> Self {
        Self {
            carrier_code: mode.code.clone(),
            method_code: mode.code.clone(),
            carrier_title: mode.name.clone(),
            method_title: mode.description.clone(),
            amount: mode.delivery_cost.as_ref().map(Money::from),
            available: true,
        }
    }
}

impl From<&DeliveryMode> for SelectedShippingMethod {
    fn from(mode: &DeliveryMode) -> Self {
        Self {
            carrier_code: mode.code.clone(),
            method_code: mode.code.clone(),
            carrier_title: mode.name.clone(),
            method_title: mode.description.clone(),
            amount: mode.delivery_cost.as_ref().map(Money::from),
        }
    }
}

/// Converted cart payload
#[derive(Debug, Clone)]
pub struct CartView {
    code: String,
    email: Option<String>,
    lines: Vec<CartLine>,
    prices: CartPrices,
    total_quantity: f64,
    shipping_address: Option<Address>,
    selected_shipping_method: Option<SelectedShippingMethod>,
}

#[derive(Debug, Clone)]
struct CartLine {
    uid: String,
    quantity: f64,
    prices: CartItemPrices,
    product: Arc<OccProduct>,
}

/// Guest carts carry the guest email in the owner uid as `guid|email`
fn email_from_uid(uid: &str) -> Option<String> {
    uid.rsplit('|')
        .next()
        .filter(|candidate| candidate.contains('@'))
        .map(str::to_string)
}

pub struct CartSource {
    key: CartKey,
    loaders: RequestLoaders,
}

impl Entity for CartSource {
    type Raw = Arc<OccCart>;
    type Output = CartView;
    type Error = ApiError;

    async fn load(&self) -> ApiResult<Arc<OccCart>> {
        Ok(self.loaders.cart.load(self.key.clone()).await?)
    }

    fn convert(&self, raw: Arc<OccCart>) -> ApiResult<CartView> {
        let lines = raw
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| -> ApiResult<CartLine> {
                let number = entry.entry_number.unwrap_or(position as i32);
                let product = entry.product.clone().ok_or_else(|| {
                    ApiError::InvalidPayload(format!(
                        "cart {} entry {} has no product",
                        raw.code, number
                    ))
                })?;
                Ok(CartLine {
                    uid: number.to_string(),
                    quantity: entry.quantity.unwrap_or(0) as f64,
                    prices: CartItemPrices {
                        price: entry.base_price.as_ref().map(Money::from),
                        row_total: entry.total_price.as_ref().map(Money::from),
                    },
                    product: Arc::new(product),
                })
            })
            .collect::<ApiResult<Vec<_>>>()?;

        let total_quantity = match raw.total_unit_count {
            Some(units) => units as f64,
            None => lines.iter().map(|line| line.quantity).sum(),
        };

        let subtotal_including_tax = match (&raw.sub_total, &raw.total_tax) {
            (Some(sub_total), Some(tax)) => Money::sum(sub_total, tax),
            _ => None,
        };

        Ok(CartView {
            code: raw.code.clone(),
            email: raw.user.as_ref().and_then(|user| email_from_uid(&user.uid)),
            lines,
            prices: CartPrices {
                grand_total: raw.total_price_with_tax.as_ref().map(Money::from),
                subtotal_excluding_tax: raw.sub_total.as_ref().map(Money::from),
                subtotal_including_tax,
            },
            total_quantity,
            shipping_address: raw.delivery_address.as_ref().map(Address::from),
            selected_shipping_method: raw
                .delivery_mode
                .as_ref()
                .map(SelectedShippingMethod::from),
        })
    }
}

/// A shopping cart
pub struct Cart {
    entity: LazyEntity<CartSource>,
}

impl Cart {
    pub fn new(key: CartKey, loaders: RequestLoaders) -> Self {
        Self {
            entity: LazyEntity::new(CartSource { key, loaders }),
        }
    }

    fn key(&self) -> &CartKey {
        &self.entity.source().key
    }

    fn loaders(&self) -> &RequestLoaders {
        &self.entity.source().loaders
    }
}

#[Object(rename_fields = "snake_case")]
impl Cart {
    /// Cart identifier as given by the client
    ///
    /// Only the customer's active cart needs its payload to know its id.
    async fn id(&self) -> Result<String> {
        let cart_id = &self.key().cart_id;
        if cart_id != CURRENT_CART {
            return Ok(cart_id.clone());
        }
        self.entity.get(|cart| cart.code.clone()).await.extend()
    }

    async fn email(&self) -> Result<Option<String>> {
        self.entity.get(|cart| cart.email.clone()).await.extend()
    }

    async fn items(&self) -> Result<Vec<CartItem>> {
        let cart = self.entity.resolve().await.extend()?;
        let loaders = self.loaders();

        Ok(cart
            .lines
            .iter()
            .map(|line| CartItem {
                line: line.clone(),
                loaders: loaders.clone(),
            })
            .collect())
    }

    async fn prices(&self) -> Result<CartPrices> {
        self.entity.get(|cart| cart.prices.clone()).await.extend()
    }

    async fn total_quantity(&self) -> Result<f64> {
        self.entity.get(|cart| cart.total_quantity).await.extend()
    }

    /// Vouchers applied to the cart
    async fn applied_coupons(&self) -> Result<Vec<AppliedCoupon>> {
        let vouchers = self
            .loaders()
            .vouchers
            .load(self.key().clone())
            .await
            .map_err(ApiError::from)
            .extend()?;

        Ok(vouchers
            .vouchers
            .iter()
            .filter_map(|voucher| voucher.voucher_code.as_ref().or(voucher.code.as_ref()))
            .map(|code| AppliedCoupon { code: code.clone() })
            .collect())
    }

    async fn shipping_addresses(&self) -> Result<Vec<ShippingCartAddress>> {
        let cart = self.entity.resolve().await.extend()?;

        Ok(cart
            .shipping_address
            .iter()
            .map(|address| ShippingCartAddress {
                address: address.clone(),
                selected_shipping_method: cart.selected_shipping_method.clone(),
                key: self.key().clone(),
                loaders: self.loaders().clone(),
            })
            .collect())
    }
}

/// One cart line
pub struct CartItem {
    line: CartLine,
    loaders: RequestLoaders,
}

#[Object(rename_fields = "snake_case")]
impl CartItem {
    async fn uid(&self) -> &str {
        &self.line.uid
    }

    async fn quantity(&self) -> f64 {
        self.line.quantity
    }

    async fn prices(&self) -> &CartItemPrices {
        &self.line.prices
    }

    /// The embedded product; fields the entry omits load the full product
    async fn product(&self) -> Product {
        Product::from_summary(Arc::clone(&self.line.product), self.loaders.clone())
    }
}

/// Shipping address of a cart with its delivery options
pub struct ShippingCartAddress {
    address: Address,
    selected_shipping_method: Option<SelectedShippingMethod>,
    key: CartKey,
    loaders: RequestLoaders,
}

#[Object(rename_fields = "snake_case")]
impl ShippingCartAddress {
    async fn firstname(&self) -> Option<&str> {
        self.address.firstname.as_deref()
    }

    async fn lastname(&self) -> Option<&str> {
        self.address.lastname.as_deref()
    }

    async fn street(&self) -> &[String] {
        &self.address.street
    }

    async fn city(&self) -> Option<&str> {
        self.address.city.as_deref()
    }

    async fn postcode(&self) -> Option<&str> {
        self.address.postcode.as_deref()
    }

    async fn telephone(&self) -> Option<&str> {
        self.address.telephone.as_deref()
    }

    async fn country(&self) -> Option<&AddressCountry> {
        self.address.country.as_ref()
    }

    async fn available_shipping_methods(&self) -> Result<Vec<AvailableShippingMethod>> {
        let modes = self
            .loaders
            .delivery_modes
            .load(self.key.clone())
            .await
            .map_err(ApiError::from)
            .extend()?;

        Ok(modes
            .delivery_modes
            .iter()
            .map(AvailableShippingMethod::from)
            .collect())
    }

    async fn selected_shipping_method(&self) -> Option<&SelectedShippingMethod> {
        self.selected_shipping_method.as_ref()
    }
}
