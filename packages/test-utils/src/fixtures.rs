//! JSON fixtures shaped like OCC REST payloads

use serde_json::{json, Value};

fn price(value: f64) -> Value {
    json!({
        "currencyIso": "USD",
        "value": value,
        "formattedValue": format!("${:.2}", value)
    })
}

/// Fixture for product payloads
#[derive(Debug, Clone)]
pub struct ProductFixture {
    pub code: String,
    pub name: String,
    pub price: f64,
    pub stock_status: String,
    pub categories: Vec<String>,
}

impl ProductFixture {
    /// Create an in-stock product
    pub fn new(code: &str, name: &str, price: f64) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            price,
            stock_status: "inStock".to_string(),
            categories: Vec::new(),
        }
    }

    /// Mark the product as out of stock
    pub fn out_of_stock(mut self) -> Self {
        self.stock_status = "outOfStock".to_string();
        self
    }

    /// Attach the product to a category
    pub fn in_category(mut self, category: &str) -> Self {
        self.categories.push(category.to_string());
        self
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> Value {
        json!({
            "code": self.code,
            "name": self.name,
            "description": format!("<p>{}</p>", self.name),
            "summary": self.name,
            "url": format!("/{}/p/{}", self.name.to_lowercase().replace(' ', "-"), self.code),
            "price": price(self.price),
            "stock": { "stockLevelStatus": self.stock_status },
            "categories": self.categories.iter().map(|code| json!({
                "code": code,
                "url": format!("/c/{}", code)
            })).collect::<Vec<_>>()
        })
    }

    /// The thin product embedded in cart entries and search hits
    pub fn to_summary_json(&self) -> Value {
        json!({
            "code": self.code,
            "name": self.name
        })
    }
}

/// Fixture for one cart or order line
#[derive(Debug, Clone)]
pub struct EntryFixture {
    pub product: ProductFixture,
    pub quantity: i64,
    /// Embed only the product summary
    pub summary_only: bool,
}

impl EntryFixture {
    pub fn new(product: ProductFixture, quantity: i64) -> Self {
        Self {
            product,
            quantity,
            summary_only: false,
        }
    }

    fn to_json(&self, entry_number: usize) -> Value {
        json!({
            "entryNumber": entry_number,
            "quantity": self.quantity,
            "basePrice": price(self.product.price),
            "totalPrice": price(self.product.price * self.quantity as f64),
            "product": if self.summary_only {
                self.product.to_summary_json()
            } else {
                self.product.to_json()
            }
        })
    }

    fn total(&self) -> f64 {
        self.product.price * self.quantity as f64
    }
}

/// Fixture for cart payloads
#[derive(Debug, Clone)]
pub struct CartFixture {
    pub code: String,
    pub guid: String,
    pub user_uid: String,
    pub entries: Vec<EntryFixture>,
    pub delivery_mode: Option<DeliveryModeFixture>,
    pub with_address: bool,
}

impl CartFixture {
    /// Create an anonymous cart without entries
    pub fn empty(code: &str) -> Self {
        Self {
            code: code.to_string(),
            guid: format!("guid-{}", code),
            user_uid: "anonymous".to_string(),
            entries: Vec::new(),
            delivery_mode: None,
            with_address: false,
        }
    }

    /// Set the owner's uid (their email for registered customers)
    pub fn owned_by(mut self, uid: &str) -> Self {
        self.user_uid = uid.to_string();
        self
    }

    /// Add a line to the cart
    pub fn with_entry(mut self, product: ProductFixture, quantity: i64) -> Self {
        self.entries.push(EntryFixture::new(product, quantity));
        self
    }

    /// Add a line that embeds only the product's code and name
    pub fn with_summary_entry(mut self, product: ProductFixture, quantity: i64) -> Self {
        self.entries.push(EntryFixture {
            summary_only: true,
            ..EntryFixture::new(product, quantity)
        });
        self
    }

    /// Add a delivery address and a selected delivery mode
    pub fn with_delivery(mut self, mode: DeliveryModeFixture) -> Self {
        self.delivery_mode = Some(mode);
        self.with_address = true;
        self
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> Value {
        let sub_total: f64 = self.entries.iter().map(EntryFixture::total).sum();
        let tax = (sub_total * 0.1 * 100.0).round() / 100.0;
        let units: i64 = self.entries.iter().map(|entry| entry.quantity).sum();

        json!({
            "code": self.code,
            "guid": self.guid,
            "user": { "uid": self.user_uid, "name": "Anonymous" },
            "entries": self.entries.iter().enumerate()
                .map(|(number, entry)| entry.to_json(number))
                .collect::<Vec<_>>(),
            "totalItems": self.entries.len(),
            "totalUnitCount": units,
            "subTotal": price(sub_total),
            "totalTax": price(tax),
            "totalPrice": price(sub_total),
            "totalPriceWithTax": price(sub_total + tax),
            "deliveryAddress": self.with_address.then(address),
            "deliveryMode": self.delivery_mode.as_ref().map(DeliveryModeFixture::to_json)
        })
    }
}

fn address() -> Value {
    json!({
        "id": "8796093087767",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "line1": "12 St James's Square",
        "town": "London",
        "postalCode": "SW1Y 4JH",
        "phone": "+44 20 7946 0000",
        "country": { "isocode": "GB", "name": "United Kingdom" }
    })
}

/// Fixture for delivery mode payloads
#[derive(Debug, Clone)]
pub struct DeliveryModeFixture {
    pub code: String,
    pub name: String,
    pub cost: f64,
}

impl DeliveryModeFixture {
    pub fn new(code: &str, name: &str, cost: f64) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            cost,
        }
    }

    /// Standard ground shipping
    pub fn standard() -> Self {
        Self::new("standard-gross", "Standard Delivery", 8.99)
    }

    /// Next day shipping
    pub fn premium() -> Self {
        Self::new("premium-gross", "Premium Delivery", 16.99)
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> Value {
        json!({
            "code": self.code,
            "name": self.name,
            "description": format!("{} (3-5 business days)", self.name),
            "deliveryCost": price(self.cost)
        })
    }
}

/// Fixture for category payloads, including the embedded subtree
#[derive(Debug, Clone)]
pub struct CategoryFixture {
    pub id: String,
    pub name: String,
    pub children: Vec<CategoryFixture>,
}

impl CategoryFixture {
    /// Create a category without subcategories
    pub fn leaf(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            children: Vec::new(),
        }
    }

    /// Add a subcategory
    pub fn with_child(mut self, child: CategoryFixture) -> Self {
        self.children.push(child);
        self
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "url": format!("/c/{}", self.id),
            "subcategories": self.children.iter().map(CategoryFixture::to_json).collect::<Vec<_>>()
        })
    }
}

/// Fixture for registered customer payloads
#[derive(Debug, Clone)]
pub struct UserFixture {
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
}

impl UserFixture {
    pub fn new(uid: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            uid: uid.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> Value {
        json!({
            "uid": self.uid,
            "name": format!("{} {}", self.first_name, self.last_name),
            "firstName": self.first_name,
            "lastName": self.last_name,
            "titleCode": "ms",
            "defaultAddress": address()
        })
    }
}

/// Fixture for placed orders
#[derive(Debug, Clone)]
pub struct OrderFixture {
    pub code: String,
    pub status: String,
    pub placed: String,
    pub entries: Vec<EntryFixture>,
}

impl OrderFixture {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            status: "COMPLETED".to_string(),
            placed: "2024-03-01T10:15:00+0000".to_string(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, product: ProductFixture, quantity: i64) -> Self {
        self.entries.push(EntryFixture::new(product, quantity));
        self
    }

    fn total(&self) -> f64 {
        self.entries.iter().map(EntryFixture::total).sum()
    }

    /// Full order payload
    pub fn to_json(&self) -> Value {
        json!({
            "code": self.code,
            "status": self.status,
            "statusDisplay": self.status.to_lowercase(),
            "created": self.placed,
            "entries": self.entries.iter().enumerate()
                .map(|(number, entry)| entry.to_json(number))
                .collect::<Vec<_>>(),
            "subTotal": price(self.total()),
            "totalPrice": price(self.total()),
            "totalPriceWithTax": price(self.total()),
            "deliveryCost": price(0.0)
        })
    }

    /// Summary payload as listed in the order history
    pub fn to_history_json(&self) -> Value {
        json!({
            "code": self.code,
            "status": self.status,
            "statusDisplay": self.status.to_lowercase(),
            "placed": self.placed,
            "total": price(self.total())
        })
    }
}

/// OCC style error body
pub fn occ_error(error_type: &str, message: &str, reason: Option<&str>, subject: Option<&str>) -> Value {
    json!({
        "errors": [{
            "type": error_type,
            "message": message,
            "reason": reason,
            "subject": subject
        }]
    })
}

/// Pagination block for list payloads
pub fn pagination(current_page: u32, page_size: u32, total_results: usize) -> Value {
    let total_pages = total_results.div_ceil(page_size.max(1) as usize);
    json!({
        "currentPage": current_page,
        "pageSize": page_size,
        "totalPages": total_pages,
        "totalResults": total_results
    })
}
