//! Cart mutations
//!
//! Writes go straight to the backend. Afterwards the cached cart (and the
//! resources derived from it) are cleared so the returned `Cart` is loaded
//! fresh.

use std::sync::Arc;

use async_graphql::{
    Context, ErrorExtensions, InputObject, Object, Result, ResultExt, SimpleObject,
};
use tracing::{debug, info, instrument};

use crate::error::ApiError;
use crate::graphql::loaders::{CartKey, RequestLoaders};
use crate::graphql::types::Cart;

/// One product to add to a cart
#[derive(Debug, Clone, InputObject)]
pub struct CartItemInput {
    pub sku: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, InputObject)]
#[graphql(rename_fields = "snake_case")]
pub struct ApplyCouponToCartInput {
    pub cart_id: String,
    pub coupon_code: String,
}

/// A cart line the backend refused
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct CartUserInputError {
    pub code: String,
    pub message: String,
}

impl CartUserInputError {
    fn from_api_error(error: &ApiError) -> Self {
        let code = match error {
            ApiError::NotFound {
                resource_type: "product",
                ..
            } => "PRODUCT_NOT_FOUND",
            ApiError::ValidationError(_) => "INVALID_PARAMETER_VALUE",
            _ => "UNDEFINED",
        };
        Self {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(SimpleObject)]
#[graphql(rename_fields = "snake_case")]
pub struct AddProductsToCartOutput {
    pub cart: Cart,
    pub user_errors: Vec<CartUserInputError>,
}

#[derive(SimpleObject)]
pub struct ApplyCouponToCartOutput {
    pub cart: Cart,
}

/// Whole units only
fn unit_quantity(quantity: f64) -> Result<i64, ApiError> {
    if quantity.fract() != 0.0 || quantity < 1.0 {
        return Err(ApiError::ValidationError(format!(
            "quantity must be a positive whole number, got {}",
            quantity
        )));
    }
    Ok(quantity as i64)
}

#[derive(Default)]
pub struct CartMutation;

#[Object]
impl CartMutation {
    /// Create an empty cart and return its id
    ///
    /// Guests get the cart guid, customers the cart code. The created cart is
    /// primed so that reading it in the same request costs no fetch.
    #[instrument(skip(self, ctx))]
    async fn create_empty_cart(&self, ctx: &Context<'_>) -> Result<String> {
        let loaders = ctx.data::<RequestLoaders>()?;
        let session = loaders.session();

        let cart = session
            .client()
            .create_cart(session.user_id(), session.token())
            .await
            .map_err(ApiError::from)
            .extend()?;

        let cart_id = if session.is_authenticated() {
            cart.code.clone()
        } else {
            cart.guid.clone().unwrap_or_else(|| cart.code.clone())
        };
        info!(cart = %cart_id, "Created cart");

        loaders
            .cart
            .prime(loaders.cart_key(cart_id.clone()), Arc::new(cart));
        Ok(cart_id)
    }

    /// Add products to a cart
    ///
    /// Lines the backend refuses are reported in `user_errors`; the other
    /// lines are still added.
    #[instrument(skip(self, ctx, cart_items))]
    async fn add_products_to_cart(
        &self,
        ctx: &Context<'_>,
        cart_id: String,
        cart_items: Vec<CartItemInput>,
    ) -> Result<AddProductsToCartOutput> {
        let loaders = ctx.data::<RequestLoaders>()?;
        let session = loaders.session();
        let key = loaders.cart_key(cart_id);

        let mut user_errors = Vec::new();
        for item in &cart_items {
            let added = match unit_quantity(item.quantity) {
                Ok(quantity) => session
                    .client()
                    .add_cart_entry(
                        &key.user_id,
                        &key.cart_id,
                        &item.sku,
                        quantity,
                        session.token(),
                    )
                    .await
                    .map(|_| ())
                    .map_err(ApiError::from),
                Err(e) => Err(e),
            };

            match added {
                Ok(()) => debug!(sku = %item.sku, "Added cart entry"),
                Err(ApiError::NotFound {
                    resource_type: "cart",
                    id,
                }) => return Err(ApiError::not_found("cart", id).extend()),
                Err(e) => user_errors.push(CartUserInputError::from_api_error(&e)),
            }
        }

        Ok(AddProductsToCartOutput {
            cart: fresh_cart(loaders, key),
            user_errors,
        })
    }

    /// Apply a voucher to a cart
    #[instrument(skip(self, ctx))]
    async fn apply_coupon_to_cart(
        &self,
        ctx: &Context<'_>,
        input: ApplyCouponToCartInput,
    ) -> Result<ApplyCouponToCartOutput> {
        let loaders = ctx.data::<RequestLoaders>()?;
        let session = loaders.session();
        let key = loaders.cart_key(input.cart_id);

        session
            .client()
            .apply_voucher(
                &key.user_id,
                &key.cart_id,
                &input.coupon_code,
                session.token(),
            )
            .await
            .map_err(ApiError::from)
            .extend()?;
        info!(cart = %key.cart_id, "Applied voucher");

        Ok(ApplyCouponToCartOutput {
            cart: fresh_cart(loaders, key),
        })
    }
}

/// Drop cached state of a modified cart and hand out a new entity for it
fn fresh_cart(loaders: &RequestLoaders, key: CartKey) -> Cart {
    loaders.invalidate_cart(&key);
    Cart::new(key, loaders.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, Some(1))]
    #[case(3.0, Some(3))]
    #[case(0.0, None)]
    #[case(-2.0, None)]
    #[case(1.5, None)]
    fn test_unit_quantity(#[case] quantity: f64, #[case] expected: Option<i64>) {
        assert_eq!(unit_quantity(quantity).ok(), expected);
    }

    #[test]
    fn test_user_error_codes() {
        let missing = CartUserInputError::from_api_error(&ApiError::not_found("product", "999"));
        assert_eq!(missing.code, "PRODUCT_NOT_FOUND");
        assert_eq!(missing.message, "product not found: 999");

        let refused = CartUserInputError::from_api_error(&ApiError::Backend {
            status: 400,
            message: "stock".to_string(),
        });
        assert_eq!(refused.code, "UNDEFINED");
    }
}
