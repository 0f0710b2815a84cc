//! OCC REST payload models
//!
//! These mirror the JSON returned by the backend with `fields=FULL`. Every
//! field the bridge does not strictly need is optional so that partial
//! payloads (for example products embedded in cart entries) still parse.

use serde::{Deserialize, Serialize};

/// Monetary amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub currency_iso: Option<String>,
    pub value: Option<f64>,
    pub formatted_value: Option<String>,
}

/// Stock information of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    /// `inStock`, `lowStock` or `outOfStock`
    pub stock_level_status: Option<String>,
    pub stock_level: Option<i64>,
}

/// Category reference embedded in a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub code: String,
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub price: Option<Price>,
    pub stock: Option<Stock>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
}

/// Line of a cart or an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntry {
    pub entry_number: Option<i32>,
    pub quantity: Option<i64>,
    pub product: Option<Product>,
    pub base_price: Option<Price>,
    pub total_price: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub isocode: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub town: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub country: Option<Country>,
}

/// Owner of a cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub uid: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryMode {
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub delivery_cost: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryModeList {
    #[serde(default)]
    pub delivery_modes: Vec<DeliveryMode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub code: Option<String>,
    pub voucher_code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherList {
    #[serde(default)]
    pub vouchers: Vec<Voucher>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub code: String,
    pub guid: Option<String>,
    pub user: Option<Principal>,
    #[serde(default)]
    pub entries: Vec<OrderEntry>,
    pub total_items: Option<i64>,
    pub total_unit_count: Option<i64>,
    pub total_price: Option<Price>,
    pub total_price_with_tax: Option<Price>,
    pub sub_total: Option<Price>,
    pub total_tax: Option<Price>,
    pub delivery_address: Option<Address>,
    pub delivery_mode: Option<DeliveryMode>,
}

/// Result of adding a product to a cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartModification {
    pub status_code: Option<String>,
    pub status_message: Option<String>,
    pub quantity_added: Option<i64>,
    pub entry: Option<OrderEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title_code: Option<String>,
    pub default_address: Option<Address>,
}

/// Category node with its embedded subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub subcategories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: Option<i32>,
    pub page_size: Option<i32>,
    pub total_pages: Option<i32>,
    pub total_results: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearchPage {
    #[serde(default)]
    pub products: Vec<Product>,
    pub pagination: Option<Pagination>,
    pub free_text_search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub code: String,
    pub status: Option<String>,
    pub status_display: Option<String>,
    pub created: Option<String>,
    #[serde(default)]
    pub entries: Vec<OrderEntry>,
    pub total_price: Option<Price>,
    pub total_price_with_tax: Option<Price>,
    pub sub_total: Option<Price>,
    pub delivery_cost: Option<Price>,
    pub delivery_address: Option<Address>,
    pub delivery_mode: Option<DeliveryMode>,
}

/// Order summary from the order history listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistory {
    pub code: String,
    pub status: Option<String>,
    pub status_display: Option<String>,
    pub placed: Option<String>,
    pub total: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistoryList {
    #[serde(default)]
    pub orders: Vec<OrderHistory>,
    pub pagination: Option<Pagination>,
}

/// Search parameters for the product search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Free text, optionally followed by `:sort:facet:value` refinements
    pub query: String,
    /// Zero-based page index, as the backend expects it
    pub current_page: u32,
    pub page_size: u32,
    pub sort: Option<String>,
}

// Internal response types for deserialization

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorList {
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorEntry {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub message: Option<String>,
    pub reason: Option<String>,
    pub subject: Option<String>,
}

impl ErrorList {
    /// Join the messages of all reported errors
    pub fn message(&self) -> Option<String> {
        let messages: Vec<&str> = self
            .errors
            .iter()
            .filter_map(|error| error.message.as_deref().or(error.error_type.as_deref()))
            .collect();
        (!messages.is_empty()).then(|| messages.join("; "))
    }

    /// Whether the backend flagged the subject as missing
    pub fn is_not_found(&self) -> bool {
        self.errors.iter().any(|error| {
            error.reason.as_deref() == Some("notFound")
                || error
                    .error_type
                    .as_deref()
                    .is_some_and(|kind| kind.ends_with("NotFoundError"))
        })
    }

    /// Subject of the first error, if any
    pub fn subject(&self) -> Option<&str> {
        self.errors.iter().find_map(|error| error.subject.as_deref())
    }
}
