//! Value objects shared by several GraphQL types

use async_graphql::SimpleObject;

use commerce_bridge_occ_client::{Address as OccAddress, Pagination, Price};

/// A monetary amount
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct Money {
    pub value: Option<f64>,
    /// ISO 4217 currency code
    pub currency: Option<String>,
}

impl Money {
    /// Sum of two amounts of the same currency
    pub fn sum(a: &Price, b: &Price) -> Option<Self> {
        if a.currency_iso != b.currency_iso {
            return None;
        }
        Some(Self {
            value: Some(a.value? + b.value?),
            currency: a.currency_iso.clone(),
        })
    }
}

impl From<&Price> for Money {
    fn from(price: &Price) -> Self {
        Self {
            value: price.value,
            currency: price.currency_iso.clone(),
        }
    }
}

/// Paging position of a list result
#[derive(Debug, Clone, PartialEq, SimpleObject)]
#[graphql(rename_fields = "snake_case")]
pub struct SearchResultPageInfo {
    /// 1-based page number
    pub current_page: Option<i32>,
    pub page_size: Option<i32>,
    pub total_pages: Option<i32>,
}

impl From<&Pagination> for SearchResultPageInfo {
    fn from(pagination: &Pagination) -> Self {
        Self {
            current_page: pagination.current_page.map(|page| page + 1),
            page_size: pagination.page_size,
            total_pages: pagination.total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct AddressCountry {
    pub code: Option<String>,
    pub label: Option<String>,
}

/// Postal address of a cart or customer
#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct Address {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub street: Vec<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub telephone: Option<String>,
    pub country: Option<AddressCountry>,
}

impl From<&OccAddress> for Address {
    fn from(address: &OccAddress) -> Self {
        Self {
            firstname: address.first_name.clone(),
            lastname: address.last_name.clone(),
            street: [&address.line1, &address.line2]
                .into_iter()
                .flatten()
                .cloned()
                .collect(),
            city: address.town.clone(),
            postcode: address.postal_code.clone(),
            telephone: address.phone.clone(),
            country: address.country.as_ref().map(|country| AddressCountry {
                code: country.isocode.clone(),
                label: country.name.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(value: f64) -> Price {
        Price {
            currency_iso: Some("USD".to_string()),
            value: Some(value),
            formatted_value: None,
        }
    }

    #[test]
    fn test_money_sum() {
        assert_eq!(
            Money::sum(&usd(10.0), &usd(1.0)),
            Some(Money {
                value: Some(11.0),
                currency: Some("USD".to_string())
            })
        );

        let mut eur = usd(1.0);
        eur.currency_iso = Some("EUR".to_string());
        assert_eq!(Money::sum(&usd(10.0), &eur), None);
    }

    #[test]
    fn test_page_info_is_one_based() {
        let info = SearchResultPageInfo::from(&Pagination {
            current_page: Some(0),
            page_size: Some(20),
            total_pages: Some(3),
            total_results: Some(42),
        });
        assert_eq!(info.current_page, Some(1));
        assert_eq!(info.total_pages, Some(3));
    }

    #[test]
    fn test_address_street_lines() {
        let address = Address::from(&OccAddress {
            id: None,
            first_name: Some("Ada".to_string()),
            last_name: None,
            line1: Some("12 St James's Square".to_string()),
            line2: None,
            town: Some("London".to_string()),
            postal_code: None,
            phone: None,
            country: None,
        });
        assert_eq!(address.street, vec!["12 St James's Square"]);
        assert_eq!(address.city.as_deref(), Some("London"));
    }
}
