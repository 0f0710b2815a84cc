//! Mock OCC commerce backend for testing
//!
//! Provides a [`MockOccServer`] that simulates the OCC REST endpoints used by
//! the bridge, with helpers to count the requests each endpoint received.

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use commerce_bridge_shared_config::BackendConfig;

use crate::fixtures::{
    occ_error, pagination, CartFixture, CategoryFixture, DeliveryModeFixture, OrderFixture,
    ProductFixture, UserFixture,
};

/// Path prefix of the REST root, API version included
pub const OCC_ROOT: &str = "/occ/v2";

/// Mock OCC server
///
/// Wraps a [`wiremock::MockServer`] and mounts canned OCC responses for
/// carts, customers, catalogs and orders.
///
/// # Example
///
/// ```rust,ignore
/// use commerce_bridge_test_utils::{CartFixture, MockOccServer};
///
/// #[tokio::test]
/// async fn test_cart() {
///     let server = MockOccServer::start().await;
///     server.mock_cart("anonymous", "00000035", &CartFixture::empty("00000035")).await;
///
///     // Build a client from server.backend_config()
/// }
/// ```
pub struct MockOccServer {
    server: MockServer,
    site: String,
    catalog_id: String,
    catalog_version: String,
}

impl MockOccServer {
    /// Start a mock backend serving the `electronics` site
    pub async fn start() -> Self {
        Self::start_with_site("electronics").await
    }

    /// Start a mock backend serving a custom site
    pub async fn start_with_site(site: &str) -> Self {
        let server = MockServer::start().await;
        Self {
            server,
            site: site.to_string(),
            catalog_id: format!("{}ProductCatalog", site),
            catalog_version: "Online".to_string(),
        }
    }

    /// REST root URL to configure clients with
    pub fn url(&self) -> String {
        format!("{}{}", self.server.uri(), OCC_ROOT)
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    /// Backend configuration pointing at this server, without retries
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.url(),
            base_site: self.site.clone(),
            catalog_id: self.catalog_id.clone(),
            catalog_version: self.catalog_version.clone(),
            timeout_secs: 5,
            connect_timeout_secs: 2,
            max_retries: 0,
            retry_base_delay_ms: 1,
        }
    }

    fn site_path(&self, rest: &str) -> String {
        format!("{}/{}/{}", OCC_ROOT, self.site, rest)
    }

    fn cart_path(&self, user_id: &str, cart_id: &str) -> String {
        self.site_path(&format!("users/{}/carts/{}", user_id, cart_id))
    }

    fn category_path(&self, category_id: &str) -> String {
        self.site_path(&format!(
            "catalogs/{}/{}/categories/{}",
            self.catalog_id, self.catalog_version, category_id
        ))
    }

    /// Number of requests received for an exact path
    pub async fn requests_to(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == request_path)
            .count()
    }

    /// Number of times a cart payload was fetched
    pub async fn cart_fetches(&self, user_id: &str, cart_id: &str) -> usize {
        self.requests_to(&self.cart_path(user_id, cart_id)).await
    }

    /// Number of times a category payload was fetched
    pub async fn category_fetches(&self, category_id: &str) -> usize {
        self.requests_to(&self.category_path(category_id)).await
    }

    /// Number of times a single product payload was fetched
    pub async fn product_fetches(&self, code: &str) -> usize {
        self.requests_to(&self.site_path(&format!("products/{}", code)))
            .await
    }

    /// Number of product searches received
    pub async fn search_requests(&self) -> usize {
        self.requests_to(&self.site_path("products/search")).await
    }

    /// Total number of requests received
    pub async fn total_requests(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }

    /// Mount a cart payload
    pub async fn mock_cart(&self, user_id: &str, cart_id: &str, cart: &CartFixture) {
        Mock::given(method("GET"))
            .and(path(self.cart_path(user_id, cart_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(cart.to_json()))
            .mount(&self.server)
            .await;
    }

    /// Mount the OCC answer for an unknown cart
    pub async fn mock_cart_not_found(&self, user_id: &str, cart_id: &str) {
        Mock::given(method("GET"))
            .and(path_regex(format!(
                "^{}(/.*)?$",
                self.cart_path(user_id, cart_id)
            )))
            .respond_with(ResponseTemplate::new(400).set_body_json(occ_error(
                "CartError",
                "Cart not found.",
                Some("notFound"),
                Some(cart_id),
            )))
            .mount(&self.server)
            .await;
    }

    /// Mount the delivery modes of a cart
    pub async fn mock_delivery_modes(
        &self,
        user_id: &str,
        cart_id: &str,
        modes: &[DeliveryModeFixture],
    ) {
        let modes: Vec<_> = modes.iter().map(DeliveryModeFixture::to_json).collect();
        Mock::given(method("GET"))
            .and(path(format!("{}/deliverymodes", self.cart_path(user_id, cart_id))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "deliveryModes": modes
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount the vouchers applied to a cart
    pub async fn mock_vouchers(&self, user_id: &str, cart_id: &str, codes: &[&str]) {
        let vouchers: Vec<_> = codes
            .iter()
            .map(|code| json!({ "code": code, "voucherCode": code, "name": code }))
            .collect();
        Mock::given(method("GET"))
            .and(path(format!("{}/vouchers", self.cart_path(user_id, cart_id))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "vouchers": vouchers
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount the profile returned for a bearer token
    pub async fn mock_current_user(&self, token: &str, user: &UserFixture) {
        Mock::given(method("GET"))
            .and(path(self.site_path("users/current")))
            .and(header("Authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(user.to_json()))
            .mount(&self.server)
            .await;
    }

    /// Mount a 401 for every customer resource requested with a bad token
    pub async fn mock_auth_failure(&self, bad_token: &str) {
        Mock::given(path_regex(format!(
            "^{}/users/current.*$",
            self.site_path("").trim_end_matches('/')
        )))
        .and(header("Authorization", format!("Bearer {}", bad_token).as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(occ_error(
            "InvalidTokenError",
            "Invalid access token",
            None,
            None,
        )))
        .mount(&self.server)
        .await;
    }

    /// Mount a category and, recursively, each of its subcategories
    pub async fn mock_category(&self, category: &CategoryFixture) {
        let mut stack = vec![category];
        while let Some(node) = stack.pop() {
            Mock::given(method("GET"))
                .and(path(self.category_path(&node.id)))
                .respond_with(ResponseTemplate::new(200).set_body_json(node.to_json()))
                .mount(&self.server)
                .await;
            stack.extend(node.children.iter());
        }
    }

    /// Mount a single product
    pub async fn mock_product(&self, product: &ProductFixture) {
        Mock::given(method("GET"))
            .and(path(self.site_path(&format!("products/{}", product.code))))
            .respond_with(ResponseTemplate::new(200).set_body_json(product.to_json()))
            .mount(&self.server)
            .await;
    }

    /// Mount the OCC answer for an unknown product
    pub async fn mock_product_not_found(&self, code: &str) {
        Mock::given(method("GET"))
            .and(path(self.site_path(&format!("products/{}", code))))
            .respond_with(ResponseTemplate::new(404).set_body_json(occ_error(
                "UnknownIdentifierError",
                &format!("Product with code '{}' not found!", code),
                None,
                None,
            )))
            .mount(&self.server)
            .await;
    }

    /// Mount a product search result for a query string
    pub async fn mock_product_search(&self, query: &str, products: &[ProductFixture], total: usize) {
        let products = products.iter().map(ProductFixture::to_json).collect();
        self.mount_search(query, products, total).await;
    }

    /// Mount a search result whose hits carry only code and name
    pub async fn mock_product_search_summaries(
        &self,
        query: &str,
        products: &[ProductFixture],
        total: usize,
    ) {
        let products = products.iter().map(ProductFixture::to_summary_json).collect();
        self.mount_search(query, products, total).await;
    }

    async fn mount_search(&self, query: &str, products: Vec<Value>, total: usize) {
        let page_size = products.len().max(1) as u32;
        Mock::given(method("GET"))
            .and(path(self.site_path("products/search")))
            .and(query_param("query", query))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "freeTextSearch": query,
                "products": products,
                "pagination": pagination(0, page_size, total)
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount one full order of the current user
    pub async fn mock_order(&self, order: &OrderFixture) {
        Mock::given(method("GET"))
            .and(path(self.site_path(&format!("users/current/orders/{}", order.code))))
            .respond_with(ResponseTemplate::new(200).set_body_json(order.to_json()))
            .mount(&self.server)
            .await;
    }

    /// Mount the order history of the current user
    pub async fn mock_order_history(&self, orders: &[OrderFixture]) {
        let summaries: Vec<_> = orders.iter().map(OrderFixture::to_history_json).collect();
        let page_size = orders.len().max(1) as u32;
        Mock::given(method("GET"))
            .and(path(self.site_path("users/current/orders")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "orders": summaries,
                "pagination": pagination(0, page_size, orders.len())
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount cart creation for a user
    pub async fn mock_create_cart(&self, user_id: &str, cart: &CartFixture) {
        Mock::given(method("POST"))
            .and(path(self.site_path(&format!("users/{}/carts", user_id))))
            .respond_with(ResponseTemplate::new(201).set_body_json(cart.to_json()))
            .mount(&self.server)
            .await;
    }

    /// Mount a successful add-to-cart for one product
    pub async fn mock_add_entry(&self, user_id: &str, cart_id: &str, product: &ProductFixture) {
        Mock::given(method("POST"))
            .and(path(format!("{}/entries", self.cart_path(user_id, cart_id))))
            .and(body_partial_json(json!({ "product": { "code": product.code } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statusCode": "success",
                "quantityAdded": 1,
                "entry": { "entryNumber": 0, "quantity": 1, "product": product.to_json() }
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount voucher application; unknown codes are rejected with a 400
    pub async fn mock_apply_voucher(&self, user_id: &str, cart_id: &str, valid_code: &str) {
        let vouchers_path = format!("{}/vouchers", self.cart_path(user_id, cart_id));
        Mock::given(method("POST"))
            .and(path(vouchers_path.clone()))
            .and(query_param("voucherId", valid_code))
            .respond_with(ResponseTemplate::new(200))
            .with_priority(1)
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path(vouchers_path))
            .respond_with(ResponseTemplate::new(400).set_body_json(occ_error(
                "VoucherOperationError",
                "coupon.invalid.code.provided",
                Some("invalid"),
                None,
            )))
            .with_priority(2)
            .mount(&self.server)
            .await;
    }

    /// Mount the base sites listing used by health checks
    pub async fn mock_base_sites(&self) {
        Mock::given(method("GET"))
            .and(path(format!("{}/basesites", OCC_ROOT)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "baseSites": [{ "uid": self.site, "name": self.site }]
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a server error for every path below the site
    pub async fn mock_server_error(&self, message: &str) {
        Mock::given(path_regex(format!("^{}/{}/.*$", OCC_ROOT, self.site)))
            .respond_with(ResponseTemplate::new(500).set_body_json(occ_error(
                "InternalServerError",
                message,
                None,
                None,
            )))
            .with_priority(10)
            .mount(&self.server)
            .await;
    }

    /// Mount rate limiting for every path below the site
    pub async fn mock_rate_limit(&self) {
        Mock::given(path_regex(format!("^{}/{}/.*$", OCC_ROOT, self.site)))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("Retry-After", "60")
                    .set_body_json(json!({ "errors": [{ "type": "RateLimitError" }] })),
            )
            .with_priority(10)
            .mount(&self.server)
            .await;
    }
}
