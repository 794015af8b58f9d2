#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{DateTime, Utc};
use savannah_api::auth::{new_user, CreateUserRequest};
use savannah_api::tokens::TokenKind;
use savannah_api::{app, AppState, Repositories};
use savannah_catalog::{Addon, AvailabilityOverride, Guide, GuideStatus, NewGuide, NewPackage, Package};
use savannah_core::booking::{Booking, BookingStatus, PaymentStatus};
use savannah_core::identity::{Role, User};
use savannah_core::repository::{BookingRepository, GuideRepository, PackageRepository, UserRepository};
use savannah_order::ScriptedGateway;
use savannah_store::app_config::Config;
use savannah_store::{MemoryObjectStore, MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse-battery";

pub fn test_config() -> Config {
    serde_json::from_value(json!({
        "server": { "port": 0, "environment": "test" },
        "database": { "url": "memory" },
        "auth": { "jwt_secret": "integration-secret" },
        "payment": { "secret_key": "" },
        "storage": { "base_prefix": "uploads" },
    }))
    .expect("test config")
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<ScriptedGateway>,
    pub objects: Arc<MemoryObjectStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(ScriptedGateway::new());
        let objects = Arc::new(MemoryObjectStore::new());

        let state = AppState::build(
            &test_config(),
            Repositories::memory(store.clone()),
            gateway.clone(),
            objects.clone(),
        )
        .expect("app state");

        Self {
            router: app(state.clone()),
            state,
            store,
            gateway,
            objects,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("infallible router")
    }

    /// JSON request; returns the status and the parsed body (`Null` when not JSON).
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.send(request).await;
        let status = response.status();
        (status, read_json(response).await)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.json(Method::GET, uri, None, token).await
    }

    pub async fn post(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.json(Method::POST, uri, Some(body), token).await
    }

    /// Stores a user with [`PASSWORD`].
    pub async fn user(&self, email: &str, role: Role) -> User {
        let user = new_user(CreateUserRequest {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            name: None,
            role,
            permissions: Vec::new(),
        })
        .expect("user");
        self.store.create_user(&user).await.expect("create user");
        user
    }

    pub async fn token_for(&self, role: Role) -> String {
        let email = format!("{}-{}@savannah.test", role, Uuid::now_v7().simple());
        let user = self.user(&email, role).await;
        self.state
            .tokens
            .issue(&user, TokenKind::Access, Utc::now())
            .expect("token")
    }

    pub async fn package(&self, base_price: f64) -> Package {
        let input: NewPackage = serde_json::from_value(json!({
            "title": "Cape Coast Tour!",
            "description": "Castles and canopy walk",
            "base_price": base_price,
            "guest_limit": 10,
            "duration_hours": 8,
        }))
        .expect("package input");
        let package = Package::create(input, Utc::now());
        self.store.create_package(&package).await.expect("create package");
        package
    }

    pub async fn guide(&self, name: &str, status: GuideStatus) -> Guide {
        self.guide_with(name, status, Vec::new()).await
    }

    pub async fn guide_with(
        &self,
        name: &str,
        status: GuideStatus,
        availability: Vec<AvailabilityOverride>,
    ) -> Guide {
        let input: NewGuide = serde_json::from_value(json!({
            "name": name,
            "email": format!("{}@guides.test", name.to_lowercase().replace(' ', ".")),
            "phone": "+233200000000",
            "bio": "Knows every trail",
            "status": status,
        }))
        .expect("guide input");
        let mut guide = Guide::create(input, Utc::now());
        guide.availability = availability;
        self.store.create_guide(&guide).await.expect("create guide");
        guide
    }

    /// Booking written straight to the store, bypassing the gateway.
    pub async fn booking_for_guide(
        &self,
        package: &Package,
        guide_id: Uuid,
        tour_date: DateTime<Utc>,
        status: BookingStatus,
    ) -> Booking {
        let booking = Booking {
            id: Uuid::now_v7(),
            reference: format!("tour-INV-TEST-{}", Uuid::now_v7().simple()),
            package_id: package.id,
            package_title: package.title.clone(),
            guest_name: "Ama Mensah".into(),
            guest_phone: "+233244000000".into(),
            guest_email: "ama@example.com".into(),
            tour_date,
            num_guests: 2,
            total_amount: package.base_price + 2.0,
            payment_status: PaymentStatus::Pending,
            booking_status: status,
            assigned_guide_id: Some(guide_id),
            addons: Vec::<Addon>::new(),
            invoice_id: None,
            created_at: Utc::now(),
        };
        let invoice = savannah_core::invoice::Invoice::for_booking(&booking, "GHS", None, Utc::now());
        self.store
            .create_booking_with_invoice(&booking, &invoice)
            .await
            .expect("create booking");
        booking
    }

    pub async fn stored_booking(&self, id: Uuid) -> Option<Booking> {
        self.store.get_booking(id).await.expect("get booking")
    }
}

pub async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

pub async fn read_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn booking_body(package_id: Uuid) -> Value {
    json!({
        "package_id": package_id.to_string(),
        "guest_name": "Kofi Boateng",
        "guest_phone": "+233501234567",
        "guest_email": "Kofi.Boateng@Example.com",
        "tour_date": "2025-04-01",
        "num_guests": 2,
        "addons": [{ "name": "Lunch", "price": 20.0 }],
        "redirect_url": "https://savannah.test/thanks",
    })
}
