//! Integration tests for cart mutations

mod common;

use std::sync::Arc;

use common::*;
use serde_json::json;

use commerce_bridge_occ_client::Cart as OccCart;

#[tokio::test]
async fn test_create_empty_cart_primes_loader() {
    let app = TestApp::start().await;
    app.occ
        .mock_create_cart("anonymous", &CartFixture::empty("00000040"))
        .await;

    let loaders = app.guest_loaders();
    let response = app
        .execute_with(loaders.clone(), "mutation { createEmptyCart }")
        .await;

    assert_no_errors(&response);
    assert_eq!(response["data"]["createEmptyCart"], "guid-00000040");
    assert!(loaders
        .cart
        .contains(&loaders.cart_key("guid-00000040".to_string())));

    // Reading the new cart in the same request costs nothing
    let response = app
        .execute_with(loaders, r#"{ cart(cart_id: "guid-00000040") { total_quantity } }"#)
        .await;
    assert_no_errors(&response);
    assert_eq!(response["data"]["cart"]["total_quantity"], 0.0);
    assert_eq!(app.occ.cart_fetches("anonymous", "guid-00000040").await, 0);
}

#[tokio::test]
async fn test_customer_cart_is_identified_by_code() {
    let app = TestApp::start().await;
    app.occ
        .mock_create_cart("current", &CartFixture::empty("00000041").owned_by("ada@example.com"))
        .await;

    let response = app
        .execute_as(TOKEN, "mutation { createEmptyCart }")
        .await;

    assert_no_errors(&response);
    assert_eq!(response["data"]["createEmptyCart"], "00000041");
}

#[tokio::test]
async fn test_add_products_reloads_cart() {
    let app = TestApp::start().await;
    let camera = ProductFixture::new("300938", "Photosmart Camera", 114.12);
    app.occ
        .mock_add_entry("anonymous", "guid-00000042", &camera)
        .await;
    app.occ
        .mock_cart(
            "anonymous",
            "guid-00000042",
            &CartFixture::empty("00000042").with_entry(camera.clone(), 1),
        )
        .await;

    // A stale copy cached earlier in the request must not be served
    let loaders = app.guest_loaders();
    let stale: OccCart = serde_json::from_value(CartFixture::empty("00000042").to_json())
        .expect("cart fixture parses");
    loaders
        .cart
        .prime(loaders.cart_key("guid-00000042".to_string()), Arc::new(stale));

    let response = app
        .execute_with(
            loaders,
            r#"mutation {
                addProductsToCart(
                    cartId: "guid-00000042"
                    cartItems: [{ sku: "300938", quantity: 1 }, { sku: "1934793", quantity: 1.5 }]
                ) {
                    cart { total_quantity items { product { sku } } }
                    user_errors { code }
                }
            }"#,
        )
        .await;

    assert_no_errors(&response);
    let output = &response["data"]["addProductsToCart"];
    assert_eq!(output["cart"]["total_quantity"], 1.0);
    assert_eq!(output["cart"]["items"][0]["product"]["sku"], "300938");
    assert_eq!(
        output["user_errors"],
        json!([{ "code": "INVALID_PARAMETER_VALUE" }])
    );
    assert_eq!(app.occ.cart_fetches("anonymous", "guid-00000042").await, 1);
}

#[tokio::test]
async fn test_add_products_to_missing_cart() {
    let app = TestApp::start().await;
    app.occ
        .mock_cart_not_found("anonymous", "guid-missing")
        .await;

    let response = app
        .execute(
            r#"mutation {
                addProductsToCart(cartId: "guid-missing", cartItems: [{ sku: "300938", quantity: 1 }]) {
                    user_errors { code }
                }
            }"#,
        )
        .await;

    let error = only_error(&response);
    assert_eq!(error_code(error), "NOT_FOUND");
    assert!(response["data"].is_null());
}

#[tokio::test]
async fn test_apply_valid_coupon() {
    let app = TestApp::start().await;
    app.occ
        .mock_apply_voucher("anonymous", "guid-00000043", "SUMMER10")
        .await;
    app.occ
        .mock_vouchers("anonymous", "guid-00000043", &["SUMMER10"])
        .await;

    let response = app
        .execute(
            r#"mutation {
                applyCouponToCart(input: { cart_id: "guid-00000043", coupon_code: "SUMMER10" }) {
                    cart { id applied_coupons { code } }
                }
            }"#,
        )
        .await;

    assert_no_errors(&response);
    let cart = &response["data"]["applyCouponToCart"]["cart"];
    assert_eq!(cart["id"], "guid-00000043");
    assert_eq!(cart["applied_coupons"], json!([{ "code": "SUMMER10" }]));
}

#[tokio::test]
async fn test_apply_invalid_coupon() {
    let app = TestApp::start().await;
    app.occ
        .mock_apply_voucher("anonymous", "guid-00000043", "SUMMER10")
        .await;

    let response = app
        .execute(
            r#"mutation {
                applyCouponToCart(input: { cart_id: "guid-00000043", coupon_code: "BOGUS" }) {
                    cart { id }
                }
            }"#,
        )
        .await;

    let error = only_error(&response);
    assert_eq!(error_code(error), "BACKEND_ERROR");
    assert_eq!(error["extensions"]["category"], "graphql-input");
    assert_eq!(error["extensions"]["backend_status"], 400);
    assert!(error["message"]
        .as_str()
        .is_some_and(|message| message.contains("coupon.invalid.code.provided")));
}
