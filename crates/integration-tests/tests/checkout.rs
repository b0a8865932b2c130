//! Checkout submissions through `submit_order`.

use axum::http::StatusCode;
use okami_core::{OrderStatus, Price};
use okami_integration_tests::{TestApp, product, product_id};
use serde_json::{Value, json};
use testresult::TestResult;

fn catalog() -> TestApp {
    TestApp::new(vec![
        product(product_id(1), "Oni Hoodie", 1000, 2, &["m"]),
        product(product_id(2), "Kitsune Tee", 2500, 5, &["s", "m"]),
    ])
}

fn draft(items: Value) -> Value {
    json!({
        "customerName": "Yacine Benali",
        "phone": "0551 23 45 67",
        "wilaya": "ALGER ",
        "deliveryType": "home",
        "items": items,
        "total": 1
    })
}

fn line(n: u128, size: &str, quantity: u32) -> Value {
    json!({ "product": { "id": product_id(n).to_string() }, "size": size, "quantity": quantity })
}

// =============================================================================
// Accepted orders
// =============================================================================

#[tokio::test]
async fn test_total_is_recomputed_from_catalog() -> TestResult {
    let app = catalog();

    let (status, body) = app.call("submit_order", draft(json!([line(1, "m", 2)])), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["order"]["total"], 2000);
    assert_eq!(body["order"]["status"], "pending");

    let orders = app.orders.all();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total, Price::from_dinars(2000));
    Ok(())
}

#[tokio::test]
async fn test_persisted_fields_are_normalized() -> TestResult {
    let app = catalog();

    let items = json!([line(1, "m", 1), line(2, "s", 2)]);
    let (status, _) = app.call("submit_order", draft(items), None).await;
    assert_eq!(status, StatusCode::OK);

    let order = &app.orders.all()[0];
    assert_eq!(order.customer_name, "Yacine Benali");
    assert_eq!(order.phone, "0551234567");
    assert_eq!(order.wilaya, "alger");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[1].product.title, "Kitsune Tee");
    assert_eq!(order.items[1].product.price, Price::from_dinars(2500));
    assert_eq!(order.total, Price::from_dinars(6000));
    Ok(())
}

#[tokio::test]
async fn test_checkout_needs_no_session() -> TestResult {
    let app = catalog();

    let (status, _) = app.call("submit_order", draft(json!([line(2, "m", 1)])), None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(app.sessions.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_markup_is_stripped_from_name() -> TestResult {
    let app = catalog();
    let mut order = draft(json!([line(2, "m", 1)]));
    order["customerName"] = json!("<b>Amel</b> Haddad<script>");

    let (status, _) = app.call("submit_order", order, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.orders.all()[0].customer_name, "Amel Haddad");
    Ok(())
}

// =============================================================================
// Rejections
// =============================================================================

async fn rejection(app: &TestApp, order: Value) -> String {
    let (status, body) = app.call("submit_order", order, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "unexpected body: {body}");
    assert_eq!(body["success"], false);
    assert!(app.orders.all().is_empty(), "rejected order was persisted");
    body["error"].as_str().unwrap_or_default().to_owned()
}

#[tokio::test]
async fn test_insufficient_stock() -> TestResult {
    let app = catalog();
    let error = rejection(&app, draft(json!([line(1, "m", 3)]))).await;
    assert_eq!(error, "insufficient stock for Oni Hoodie");
    Ok(())
}

#[tokio::test]
async fn test_size_unavailable() -> TestResult {
    let app = catalog();
    let error = rejection(&app, draft(json!([line(2, "xl", 1)]))).await;
    assert_eq!(error, "size xl is not available for Kitsune Tee");
    Ok(())
}

#[tokio::test]
async fn test_unknown_product_names_id() -> TestResult {
    let app = catalog();
    let error = rejection(&app, draft(json!([line(99, "m", 1)]))).await;
    assert_eq!(error, format!("product not found: {}", product_id(99)));
    Ok(())
}

#[tokio::test]
async fn test_short_phone_rejected() -> TestResult {
    let app = catalog();
    let mut order = draft(json!([line(1, "m", 1)]));
    order["phone"] = json!("0612345");
    assert_eq!(rejection(&app, order).await, "invalid phone number");
    Ok(())
}

#[tokio::test]
async fn test_foreign_wilaya_rejected() -> TestResult {
    let app = catalog();
    let mut order = draft(json!([line(1, "m", 1)]));
    order["wilaya"] = json!("Paris");
    assert_eq!(rejection(&app, order).await, "invalid wilaya");
    Ok(())
}

#[tokio::test]
async fn test_first_failure_wins() -> TestResult {
    let app = catalog();
    let mut order = draft(json!([line(1, "m", 3)]));
    order["customerName"] = json!("Y");
    order["phone"] = json!("123");
    assert_eq!(rejection(&app, order).await, "invalid customer name");
    Ok(())
}

#[tokio::test]
async fn test_pickup_is_not_a_delivery_type() -> TestResult {
    let app = catalog();
    let mut order = draft(json!([line(1, "m", 1)]));
    order["deliveryType"] = json!("pickup");
    assert_eq!(rejection(&app, order).await, "invalid delivery type");
    Ok(())
}

#[tokio::test]
async fn test_empty_cart_rejected() -> TestResult {
    let app = catalog();
    let error = rejection(&app, draft(json!([]))).await;
    assert_eq!(error, "order must contain between 1 and 20 items");
    Ok(())
}

#[tokio::test]
async fn test_one_bad_line_rejects_whole_order() -> TestResult {
    let app = catalog();
    let items = json!([line(2, "m", 1), line(1, "m", 11)]);
    assert_eq!(rejection(&app, draft(items)).await, "invalid quantity for item 2");
    Ok(())
}
