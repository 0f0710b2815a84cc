//! GraphQL mutations for the commerce bridge

mod cart;

pub use cart::{
    AddProductsToCartOutput, ApplyCouponToCartInput, ApplyCouponToCartOutput, CartItemInput,
    CartMutation, CartUserInputError,
};

use async_graphql::MergedObject;

/// Root mutation type combining all mutation domains
#[derive(MergedObject, Default)]
pub struct Mutation(CartMutation);
