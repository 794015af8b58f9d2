use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use prometheus::{opts, Encoder, IntCounter, IntCounterVec, Registry, TextEncoder};

use crate::state::AppState;

/// Business counters scraped at `GET /metrics`.
pub struct Metrics {
    registry: Registry,
    bookings_created: IntCounter,
    reconciliations: IntCounterVec,
    gateway_failures: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let bookings_created = IntCounter::with_opts(opts!(
            "savannah_bookings_created_total",
            "Bookings persisted through the public booking endpoint"
        ))?;
        let reconciliations = IntCounterVec::new(
            opts!(
                "savannah_payment_reconciliations_total",
                "Payment webhook deliveries by outcome"
            ),
            &["outcome"],
        )?;
        let gateway_failures = IntCounter::with_opts(opts!(
            "savannah_gateway_failures_total",
            "Payment gateway calls that failed or timed out"
        ))?;

        registry.register(Box::new(bookings_created.clone()))?;
        registry.register(Box::new(reconciliations.clone()))?;
        registry.register(Box::new(gateway_failures.clone()))?;

        Ok(Self {
            registry,
            bookings_created,
            reconciliations,
            gateway_failures,
        })
    }

    pub fn booking_created(&self) {
        self.bookings_created.inc();
    }

    pub fn reconciliation(&self, outcome: &str) {
        self.reconciliations.with_label_values(&[outcome]).inc();
    }

    pub fn gateway_failure(&self) {
        self.gateway_failures.inc();
    }

    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/metrics", get(scrape))
}

async fn scrape(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.export() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            tracing::error!("Metrics export failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                String::new(),
            )
        }
    }
}
