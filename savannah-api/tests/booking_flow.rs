mod common;

use axum::http::{Method, StatusCode};
use chrono::{TimeZone, Utc};
use common::{booking_body, TestApp};
use savannah_catalog::GuideStatus;
use savannah_core::booking::BookingStatus;
use savannah_core::identity::Role;
use savannah_core::repository::InvoiceRepository;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_create_booking_freezes_total_and_initializes_payment() {
    let app = TestApp::new();
    let package = app.package(100.0).await;

    let (status, body) = app
        .post("/bookings/create", booking_body(package.id), None)
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["code"], 201);

    let booking = &body["responses"]["booking"];
    let invoice = &body["responses"]["invoice"];
    assert_eq!(booking["total_amount"], 122.0);
    assert_eq!(booking["guest_email"], "kofi.boateng@example.com");
    assert_eq!(booking["package_title"], "Cape Coast Tour!");
    assert_eq!(booking["booking_status"], "pending");
    assert_eq!(booking["payment_status"], "pending");
    assert!(booking["reference"].as_str().unwrap().starts_with("tour-INV-"));

    assert_eq!(invoice["status"], "pending");
    assert_eq!(invoice["amount"], 122.0);
    assert_eq!(invoice["currency"], "GHS");
    assert_eq!(invoice["is_requested"], true);
    let reference = invoice["paystack_reference"].as_str().unwrap();
    assert_eq!(
        invoice["paystack_authorization_url"],
        format!("https://checkout.local/{}", reference)
    );

    let sent = app.gateway.initialized();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].amount_minor, 12_200);
    assert_eq!(sent[0].email, "kofi.boateng@example.com");
}

#[tokio::test]
async fn test_create_booking_rejects_bad_input() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/bookings/create", booking_body(Uuid::now_v7()), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let package = app.package(100.0).await;
    let mut input = booking_body(package.id);
    input["guest_email"] = json!("not-an-email");
    input["num_guests"] = json!(0);
    let (status, body) = app.post("/bookings/create", input, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let paths: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"guest_email"));
    assert!(paths.contains(&"num_guests"));

    let mut input = booking_body(package.id);
    input["addons"] = json!([{ "name": "Tip", "price": 0.004 }]);
    let (status, body) = app.post("/bookings/create", input, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["path"], "addons[0].price");
    assert!(app.gateway.initialized().is_empty());

    let response = app
        .send(
            axum::http::Request::builder()
                .method(Method::POST)
                .uri("/bookings/create")
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_gateway_failure_keeps_booking_and_fails_invoice() {
    let app = TestApp::new();
    app.gateway.set_fail_initialize(true);
    let package = app.package(100.0).await;

    let (status, body) = app
        .post("/bookings/create", booking_body(package.id), None)
        .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(body["message"].as_str().unwrap().contains("was saved"));

    let token = app.token_for(Role::Operations).await;
    let (status, list) = app.get("/bookings", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["responses"]["total"], 1);

    let booking_id: Uuid = list["responses"]["items"][0]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    let invoice = app.store.find_by_booking(booking_id).await.unwrap().unwrap();
    assert_eq!(invoice.status.as_str(), "failed");
    assert!(invoice.paystack_authorization_url.is_none());
}

#[tokio::test]
async fn test_staff_routes_require_a_staff_token() {
    let app = TestApp::new();

    let (status, body) = app.get("/bookings", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/bookings", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let guide_token = app.token_for(Role::Guide).await;
    let (status, _) = app.get("/bookings", Some(&guide_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let support = app.token_for(Role::Support).await;
    let (status, _) = app.get("/bookings", Some(&support)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_filters_and_guide_names() {
    let app = TestApp::new();
    let token = app.token_for(Role::Admin).await;
    let package = app.package(80.0).await;
    let guide = app.guide("Yaw Darko", GuideStatus::Active).await;
    let april_first = Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap();
    let april_second = Utc.with_ymd_and_hms(2025, 4, 2, 9, 0, 0).unwrap();

    let with_guide = app
        .booking_for_guide(&package, guide.id, april_first, BookingStatus::Confirmed)
        .await;
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let orphan = app
        .booking_for_guide(&package, Uuid::now_v7(), april_second, BookingStatus::Pending)
        .await;

    let (status, body) = app.get("/bookings?limit=10", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["responses"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    // Newest first.
    assert_eq!(items[0]["id"], orphan.id.to_string());
    assert!(items[0]["assigned_guide_name"].is_null());
    assert_eq!(items[1]["assigned_guide_name"], "Yaw Darko");

    let (_, body) = app
        .get("/bookings?tour_date=2025-04-01", Some(&token))
        .await;
    assert_eq!(body["responses"]["total"], 1);
    assert_eq!(body["responses"]["items"][0]["id"], with_guide.id.to_string());

    let (_, body) = app
        .get("/bookings?booking_status=pending", Some(&token))
        .await;
    assert_eq!(body["responses"]["total"], 1);

    let (_, body) = app.get("/bookings?guest_name=AMA", Some(&token)).await;
    assert_eq!(body["responses"]["total"], 2);

    let (status, _) = app
        .get("/bookings?package_id=not-a-uuid", Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .get("/bookings?tour_date=%2B262142-12-31", Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_reassign_and_delete() {
    let app = TestApp::new();
    let token = app.token_for(Role::Operations).await;
    let package = app.package(100.0).await;
    let guide = app.guide("Esi Owusu", GuideStatus::Active).await;
    let tour = Utc.with_ymd_and_hms(2025, 5, 10, 0, 0, 0).unwrap();
    let booking = app
        .booking_for_guide(&package, Uuid::now_v7(), tour, BookingStatus::Pending)
        .await;

    // pending -> completed skips confirmation
    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/bookings/update/{}", booking.id),
            Some(json!({ "booking_status": "completed" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(
        app.stored_booking(booking.id).await.unwrap().booking_status,
        BookingStatus::Pending
    );

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/bookings/update/{}", booking.id),
            Some(json!({ "booking_status": "confirmed", "guest_name": "Ama K. Mensah" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responses"]["booking_status"], "confirmed");
    assert_eq!(body["responses"]["guest_name"], "Ama K. Mensah");
    assert_eq!(body["responses"]["total_amount"], booking.total_amount);

    let (status, _) = app
        .post(
            &format!("/bookings/{}/reassign-guide", booking.id),
            json!({}),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            &format!("/bookings/{}/reassign-guide", booking.id),
            json!({ "guide_id": guide.id.to_string() }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responses"]["assigned_guide_id"], guide.id.to_string());

    let (status, body) = app
        .get(&format!("/bookings/{}", booking.id), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responses"]["assigned_guide_name"], "Esi Owusu");

    let (status, _) = app
        .json(
            Method::DELETE,
            &format!("/bookings/delete/{}", booking.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.stored_booking(booking.id).await.is_none());

    let (status, _) = app
        .json(
            Method::DELETE,
            &format!("/bookings/delete/{}", booking.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
