//! OCC REST API client implementation

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument, warn};

use commerce_bridge_shared_config::BackendConfig;

use crate::error::{OccError, OccResult};
use crate::models::{
    Cart, CartModification, Category, DeliveryModeList, ErrorList, Order, OrderHistoryList,
    Product, ProductSearchPage, SearchQuery, User, VoucherList,
};

/// Field set requested on every read
const FIELDS_FULL: &str = "FULL";

/// Maximum length of an identifier placed in a resource path
const MAX_ID_LENGTH: usize = 256;

/// User id addressing anonymous carts by guid
pub const ANONYMOUS_USER: &str = "anonymous";

/// User id addressing the bearer token's own resources
pub const CURRENT_USER: &str = "current";

/// OCC REST API client
///
/// Reads are retried on transient failures. Writes are sent exactly once.
#[derive(Clone)]
pub struct OccClient {
    http_client: Client,
    config: BackendConfig,
}

/// Backend reachability as seen by the readiness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    /// Backend answered the check
    Available,
    /// Backend answered, but rejected the check
    Degraded(String),
    /// Backend could not be reached
    Unavailable(String),
}

impl BackendStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// What a request targets, for error reporting
#[derive(Clone, Copy)]
struct Target<'a> {
    resource: &'static str,
    id: &'a str,
}

impl fmt::Debug for OccClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccClient")
            .field("base_url", &self.config.base_url)
            .field("base_site", &self.config.base_site)
            .field("max_retries", &self.config.max_retries)
            .finish()
    }
}

impl OccClient {
    /// Create a new client for the configured backend
    ///
    /// # Errors
    /// Returns `OccError::InvalidInput` if the configuration is invalid, or
    /// `OccError::Http` if the HTTP client cannot be built
    pub fn new(config: &BackendConfig) -> OccResult<Self> {
        config
            .validate()
            .map_err(|e| OccError::InvalidInput(e.to_string()))?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent("CommerceBridge/1.0")
            .build()?;

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    /// Backend configuration this client was built from
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Validate an identifier that becomes a path segment
    fn validate_id<'a>(name: &str, value: &'a str) -> OccResult<&'a str> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(OccError::InvalidInput(format!("{} cannot be empty", name)));
        }
        if trimmed.len() > MAX_ID_LENGTH {
            return Err(OccError::InvalidInput(format!(
                "{} too long (max {} characters)",
                name, MAX_ID_LENGTH
            )));
        }
        if trimmed.contains(['/', '?', '#']) {
            return Err(OccError::InvalidInput(format!(
                "{} contains reserved characters",
                name
            )));
        }
        Ok(trimmed)
    }

    /// Execute an operation with retry logic for transient failures
    async fn with_retry<T, F, Fut>(&self, operation: F) -> OccResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = OccResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay_ms = self.config.retry_base_delay_ms * 2u64.pow(attempt);
                    warn!(
                        attempt = attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "OCC request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .http_client
            .request(method, self.config.site_url(path))
            .header("Accept", "application/json");
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and map error statuses
    async fn make_request(&self, builder: RequestBuilder, target: Target<'_>) -> OccResult<String> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                OccError::Timeout
            } else {
                OccError::Http(e)
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(OccError::Http)?;

        if status.is_success() {
            return Ok(text);
        }
        Err(Self::status_error(status, &text, target))
    }

    /// Translate an error status and OCC error body into an `OccError`
    fn status_error(status: StatusCode, body: &str, target: Target<'_>) -> OccError {
        let errors = serde_json::from_str::<ErrorList>(body).ok();
        let message = errors
            .as_ref()
            .and_then(ErrorList::message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("OCC API rate limited");
                OccError::RateLimited
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => OccError::Unauthorized(message),
            StatusCode::NOT_FOUND => OccError::not_found(target.resource, target.id),
            // OCC reports unknown carts and vouchers as 400 with a notFound reason
            StatusCode::BAD_REQUEST if errors.as_ref().is_some_and(ErrorList::is_not_found) => {
                let id = errors
                    .as_ref()
                    .and_then(ErrorList::subject)
                    .unwrap_or(target.id);
                OccError::not_found(target.resource, id)
            }
            _ => OccError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// GET a resource below the base site with retries
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
        target: Target<'_>,
    ) -> OccResult<T> {
        let text = self
            .with_retry(|| async {
                let builder = self
                    .request(Method::GET, path, token)
                    .query(&[("fields", FIELDS_FULL)])
                    .query(query);
                self.make_request(builder, target).await
            })
            .await?;

        Ok(serde_json::from_str(&text)?)
    }

    /// Path of a cart resource for the given owner
    fn cart_path(user_id: &str, cart_id: &str) -> OccResult<String> {
        let user_id = Self::validate_id("user id", user_id)?;
        let cart_id = Self::validate_id("cart id", cart_id)?;
        Ok(format!("users/{}/carts/{}", user_id, cart_id))
    }

    /// Fetch a cart with its entries and totals
    ///
    /// # Errors
    /// - `OccError::InvalidInput` - If an identifier is empty or malformed
    /// - `OccError::NotFound` - If the cart does not exist for this user
    /// - `OccError::Unauthorized` - If the token is missing or rejected
    #[instrument(skip(self, token))]
    pub async fn get_cart(
        &self,
        user_id: &str,
        cart_id: &str,
        token: Option<&str>,
    ) -> OccResult<Cart> {
        let path = Self::cart_path(user_id, cart_id)?;
        debug!(user = %user_id, cart = %cart_id, "Fetching cart from OCC");

        self.get_json(
            &path,
            &[],
            token,
            Target {
                resource: "cart",
                id: cart_id,
            },
        )
        .await
    }

    /// Fetch the delivery modes applicable to a cart
    #[instrument(skip(self, token))]
    pub async fn get_delivery_modes(
        &self,
        user_id: &str,
        cart_id: &str,
        token: Option<&str>,
    ) -> OccResult<DeliveryModeList> {
        let path = format!("{}/deliverymodes", Self::cart_path(user_id, cart_id)?);
        debug!(user = %user_id, cart = %cart_id, "Fetching delivery modes from OCC");

        self.get_json(
            &path,
            &[],
            token,
            Target {
                resource: "cart",
                id: cart_id,
            },
        )
        .await
    }

    /// Fetch the vouchers applied to a cart
    #[instrument(skip(self, token))]
    pub async fn get_vouchers(
        &self,
        user_id: &str,
        cart_id: &str,
        token: Option<&str>,
    ) -> OccResult<VoucherList> {
        let path = format!("{}/vouchers", Self::cart_path(user_id, cart_id)?);
        debug!(user = %user_id, cart = %cart_id, "Fetching cart vouchers from OCC");

        self.get_json(
            &path,
            &[],
            token,
            Target {
                resource: "cart",
                id: cart_id,
            },
        )
        .await
    }

    /// Fetch the profile of the token's owner
    ///
    /// # Errors
    /// Returns `OccError::Unauthorized` when no token is given
    #[instrument(skip(self, token))]
    pub async fn get_current_user(&self, token: Option<&str>) -> OccResult<User> {
        let token = token.ok_or_else(|| {
            OccError::Unauthorized("customer requests require a bearer token".to_string())
        })?;
        debug!("Fetching current user from OCC");

        self.get_json(
            &format!("users/{}", CURRENT_USER),
            &[],
            Some(token),
            Target {
                resource: "user",
                id: CURRENT_USER,
            },
        )
        .await
    }

    /// Fetch a category of the configured catalog version, with its subtree
    #[instrument(skip(self))]
    pub async fn get_category(&self, category_id: &str) -> OccResult<Category> {
        let category_id = Self::validate_id("category id", category_id)?;
        let path = format!(
            "catalogs/{}/{}/categories/{}",
            self.config.catalog_id, self.config.catalog_version, category_id
        );
        debug!(category = %category_id, "Fetching category from OCC");

        self.get_json(
            &path,
            &[],
            None,
            Target {
                resource: "category",
                id: category_id,
            },
        )
        .await
    }

    /// Fetch a single product by code
    #[instrument(skip(self))]
    pub async fn get_product(&self, code: &str) -> OccResult<Product> {
        let code = Self::validate_id("product code", code)?;
        debug!(product = %code, "Fetching product from OCC");

        self.get_json(
            &format!("products/{}", code),
            &[],
            None,
            Target {
                resource: "product",
                id: code,
            },
        )
        .await
    }

    /// Run a product search
    #[instrument(skip(self))]
    pub async fn search_products(&self, search: &SearchQuery) -> OccResult<ProductSearchPage> {
        if search.page_size == 0 {
            return Err(OccError::InvalidInput(
                "page size must be positive".to_string(),
            ));
        }

        let mut query = vec![
            ("query", search.query.clone()),
            ("currentPage", search.current_page.to_string()),
            ("pageSize", search.page_size.to_string()),
        ];
        if let Some(sort) = &search.sort {
            query.push(("sort", sort.clone()));
        }

        debug!(query = %search.query, page = search.current_page, "Searching products on OCC");

        let page: ProductSearchPage = self
            .get_json(
                "products/search",
                &query,
                None,
                Target {
                    resource: "search",
                    id: &search.query,
                },
            )
            .await?;

        debug!(result_count = page.products.len(), "Product search finished");
        Ok(page)
    }

    /// Fetch one order of the token's owner
    #[instrument(skip(self, token))]
    pub async fn get_order(&self, code: &str, token: Option<&str>) -> OccResult<Order> {
        let code = Self::validate_id("order code", code)?;
        debug!(order = %code, "Fetching order from OCC");

        self.get_json(
            &format!("users/{}/orders/{}", CURRENT_USER, code),
            &[],
            token,
            Target {
                resource: "order",
                id: code,
            },
        )
        .await
    }

    /// Fetch one page of the token owner's order history
    #[instrument(skip(self, token))]
    pub async fn get_order_history(
        &self,
        current_page: u32,
        page_size: u32,
        token: Option<&str>,
    ) -> OccResult<OrderHistoryList> {
        let token = token.ok_or_else(|| {
            OccError::Unauthorized("order history requires a bearer token".to_string())
        })?;
        debug!(page = current_page, page_size, "Fetching order history from OCC");

        self.get_json(
            &format!("users/{}/orders", CURRENT_USER),
            &[
                ("currentPage", current_page.to_string()),
                ("pageSize", page_size.to_string()),
            ],
            Some(token),
            Target {
                resource: "order history",
                id: CURRENT_USER,
            },
        )
        .await
    }

    /// Create an empty cart for the given user
    #[instrument(skip(self, token))]
    pub async fn create_cart(&self, user_id: &str, token: Option<&str>) -> OccResult<Cart> {
        let user_id = Self::validate_id("user id", user_id)?;
        debug!(user = %user_id, "Creating cart on OCC");

        let builder = self
            .request(Method::POST, &format!("users/{}/carts", user_id), token)
            .query(&[("fields", FIELDS_FULL)]);
        let text = self
            .make_request(
                builder,
                Target {
                    resource: "user",
                    id: user_id,
                },
            )
            .await?;

        let cart: Cart = serde_json::from_str(&text)?;
        debug!(cart = %cart.code, "Created cart");
        Ok(cart)
    }

    /// Add a product to a cart
    #[instrument(skip(self, token))]
    pub async fn add_cart_entry(
        &self,
        user_id: &str,
        cart_id: &str,
        product_code: &str,
        quantity: i64,
        token: Option<&str>,
    ) -> OccResult<CartModification> {
        let path = format!("{}/entries", Self::cart_path(user_id, cart_id)?);
        let product_code = Self::validate_id("product code", product_code)?;
        if quantity <= 0 {
            return Err(OccError::InvalidInput(
                "quantity must be positive".to_string(),
            ));
        }

        let builder = self
            .request(Method::POST, &path, token)
            .json(&json!({
                "product": { "code": product_code },
                "quantity": quantity,
            }));
        let text = self
            .make_request(
                builder,
                Target {
                    resource: "cart",
                    id: cart_id,
                },
            )
            .await?;

        Ok(serde_json::from_str(&text)?)
    }

    /// Apply a voucher code to a cart
    #[instrument(skip(self, token))]
    pub async fn apply_voucher(
        &self,
        user_id: &str,
        cart_id: &str,
        voucher_code: &str,
        token: Option<&str>,
    ) -> OccResult<()> {
        let path = format!("{}/vouchers", Self::cart_path(user_id, cart_id)?);
        let voucher_code = Self::validate_id("voucher code", voucher_code)?;

        let builder = self
            .request(Method::POST, &path, token)
            .query(&[("voucherId", voucher_code)]);
        self.make_request(
            builder,
            Target {
                resource: "voucher",
                id: voucher_code,
            },
        )
        .await?;

        debug!(cart = %cart_id, voucher = %voucher_code, "Applied voucher");
        Ok(())
    }

    /// Check that the backend answers for the configured base site
    pub async fn check_health(&self) -> BackendStatus {
        let builder = self
            .http_client
            .get(self.config.root_url("basesites"))
            .header("Accept", "application/json");
        match self
            .make_request(
                builder,
                Target {
                    resource: "base site",
                    id: &self.config.base_site,
                },
            )
            .await
        {
            Ok(_) => BackendStatus::Available,
            Err(e @ (OccError::Http(_) | OccError::Timeout)) => {
                BackendStatus::Unavailable(e.to_string())
            }
            Err(e) => BackendStatus::Degraded(e.to_string()),
        }
    }
}
