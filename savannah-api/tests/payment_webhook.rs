mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::{booking_body, read_text, TestApp};
use savannah_core::invoice::InvoiceStatus;
use savannah_core::repository::InvoiceRepository;

const WEBHOOK: &str = "/extensions/callback/check-paystack-payment";

async fn book(app: &TestApp) -> String {
    let package = app.package(100.0).await;
    let (status, body) = app
        .post("/bookings/create", booking_body(package.id), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["responses"]["invoice"]["paystack_reference"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn deliver(app: &TestApp, method: Method, uri: &str, body: Body) -> (StatusCode, String) {
    let response = app
        .send(Request::builder().method(method).uri(uri).body(body).unwrap())
        .await;
    let status = response.status();
    (status, read_text(response).await)
}

#[tokio::test]
async fn test_webhook_settles_invoice_once() {
    let app = TestApp::new();
    let reference = book(&app).await;
    app.gateway.script_verify(&reference, "success", 12_200);

    let uri = format!("{}?reference={}", WEBHOOK, reference);
    let (status, text) = deliver(&app, Method::POST, &uri, Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Payment confirmed");

    let invoice = app.store.find_by_reference(&reference).await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    let paid_at = invoice.paid_at;
    assert!(paid_at.is_some());

    // Redelivery, this time as the gateway's GET redirect.
    let (status, text) = deliver(&app, Method::GET, &uri, Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Payment already processed");

    let again = app.store.find_by_reference(&reference).await.unwrap().unwrap();
    assert_eq!(again.paid_at, paid_at);
    assert_eq!(app.gateway.verify_calls(), 1);

    let metrics = app.state.metrics.export().unwrap();
    assert!(metrics.contains("savannah_payment_reconciliations_total{outcome=\"paid\"} 1"));
    assert!(metrics.contains("savannah_payment_reconciliations_total{outcome=\"already_paid\"} 1"));
}

#[tokio::test]
async fn test_webhook_reads_reference_from_event_body() {
    let app = TestApp::new();
    let reference = book(&app).await;

    let event = format!(
        r#"{{"event":"charge.success","data":{{"reference":"{}","amount":12200}}}}"#,
        reference
    );
    let (status, text) = deliver(&app, Method::POST, WEBHOOK, Body::from(event)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Payment confirmed");
}

#[tokio::test]
async fn test_unknown_reference_is_acknowledged() {
    let app = TestApp::new();
    let uri = format!("{}?reference=never-issued", WEBHOOK);
    let (status, text) = deliver(&app, Method::POST, &uri, Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Reference not recognised");
    assert_eq!(app.gateway.verify_calls(), 0);

    let (status, _) = deliver(&app, Method::POST, WEBHOOK, Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_amount_mismatch_leaves_invoice_pending() {
    let app = TestApp::new();
    let reference = book(&app).await;
    app.gateway.script_verify(&reference, "success", 12_100);

    let uri = format!("{}?reference={}", WEBHOOK, reference);
    let (status, text) = deliver(&app, Method::POST, &uri, Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("Amount mismatch"), "{text}");

    let invoice = app.store.find_by_reference(&reference).await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Pending);
}

#[tokio::test]
async fn test_unsuccessful_payment_leaves_invoice_pending() {
    let app = TestApp::new();
    let reference = book(&app).await;
    app.gateway.script_verify(&reference, "abandoned", 12_200);

    let uri = format!("{}?reference={}", WEBHOOK, reference);
    let (status, text) = deliver(&app, Method::POST, &uri, Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Payment not successful: abandoned");

    let invoice = app.store.find_by_reference(&reference).await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Pending);
}

#[tokio::test]
async fn test_verify_failure_asks_for_redelivery() {
    let app = TestApp::new();
    let reference = book(&app).await;
    app.gateway.script_verify_error(&reference, "connection reset");

    let uri = format!("{}?reference={}", WEBHOOK, reference);
    let (status, _) = deliver(&app, Method::POST, &uri, Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    // Once the gateway answers, the retry settles the invoice.
    app.gateway.script_verify(&reference, "success", 12_200);
    let (status, text) = deliver(&app, Method::POST, &uri, Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Payment confirmed");
}
