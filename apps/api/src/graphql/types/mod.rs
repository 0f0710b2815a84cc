//! GraphQL type definitions for the commerce bridge
//!
//! Types backed by a backend resource wrap a `LazyEntity` together with the
//! request's loaders and hand those loaders down to the types they return.

mod cart;
mod catalog;
mod customer;
mod shared;

pub use cart::{
    AppliedCoupon, AvailableShippingMethod, Cart, CartItem, CartItemPrices, CartPrices,
    SelectedShippingMethod, ShippingCartAddress,
};
pub use catalog::{
    CategoryTree, ComplexTextValue, PriceRange, Product, ProductPrice, ProductStockStatus,
    Products,
};
pub use customer::{Customer, CustomerOrder, CustomerOrders, OrderItem, OrderTotal};
pub use shared::{Address, AddressCountry, Money, SearchResultPageInfo};
