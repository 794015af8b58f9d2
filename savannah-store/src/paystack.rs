use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use savannah_core::payment::{
    InitializeTransaction, InitializedTransaction, PaymentGateway, VerifiedTransaction,
};
use savannah_core::{CoreError, CoreResult};
use serde::Deserialize;
use serde_json::json;

use crate::app_config::PaymentConfig;

const CHANNELS: [&str; 3] = ["mobile_money", "card", "bank_transfer"];

/// Paystack REST client: `POST /transaction/initialize`, `GET /transaction/verify/{reference}`.
#[derive(Clone)]
pub struct PaystackClient {
    client: Client,
    secret_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
    access_code: Option<String>,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    amount: i64,
    reference: String,
    currency: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    gateway_response: Option<String>,
}

impl PaystackClient {
    pub fn new(config: &PaymentConfig) -> CoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CoreError::Internal(format!("paystack client: {e}")))?;
        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn read_envelope<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> CoreResult<(T, serde_json::Value)> {
        let status = response.status();
        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CoreError::Gateway(format!("unreadable response ({status}): {e}")))?;
        let envelope: Envelope<T> = serde_json::from_value(raw.clone())
            .map_err(|e| CoreError::Gateway(format!("unexpected response shape ({status}): {e}")))?;

        if !status.is_success() || !envelope.status {
            return Err(CoreError::Gateway(envelope.message));
        }
        let data = envelope
            .data
            .ok_or_else(|| CoreError::Gateway(format!("{} (no data)", envelope.message)))?;
        Ok((data, raw))
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize(&self, request: &InitializeTransaction) -> CoreResult<InitializedTransaction> {
        let body = json!({
            "amount": request.amount_minor,
            "email": request.email,
            "reference": request.reference,
            "currency": request.currency,
            "callback_url": request.callback_url,
            "channels": CHANNELS,
        });

        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::Gateway(format!("initialize request failed: {e}")))?;

        let (data, raw) = Self::read_envelope::<InitializeData>(response).await?;
        Ok(InitializedTransaction {
            authorization_url: data.authorization_url,
            access_code: data.access_code,
            reference: data.reference,
            raw,
        })
    }

    async fn verify(&self, reference: &str) -> CoreResult<VerifiedTransaction> {
        let response = self
            .client
            .get(format!("{}/transaction/verify/{}", self.base_url, reference))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| CoreError::Gateway(format!("verify request failed: {e}")))?;

        let (data, _) = Self::read_envelope::<VerifyData>(response).await?;
        Ok(VerifiedTransaction {
            status: data.status,
            amount_minor: data.amount,
            reference: data.reference,
            currency: data.currency,
            paid_at: data.paid_at,
            gateway_response: data.gateway_response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> PaystackClient {
        PaystackClient::new(&PaymentConfig {
            secret_key: "sk_test_123".to_string(),
            base_url: server.uri(),
            callback_url: None,
            currency: "GHS".to_string(),
            minor_unit_factor: 100,
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_sends_minor_units_and_channels() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transaction/initialize"))
            .and(bearer_token("sk_test_123"))
            .and(body_partial_json(json!({
                "amount": 12200,
                "currency": "GHS",
                "reference": "ref-1",
                "channels": ["mobile_money", "card", "bank_transfer"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "message": "Authorization URL created",
                "data": {
                    "authorization_url": "https://checkout.paystack.com/abc",
                    "access_code": "abc",
                    "reference": "ref-1"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tx = client(&server)
            .initialize(&InitializeTransaction {
                amount_minor: 12_200,
                email: "kofi@example.com".to_string(),
                reference: "ref-1".to_string(),
                currency: "GHS".to_string(),
                callback_url: Some("https://tours.example.com/paid".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(tx.authorization_url, "https://checkout.paystack.com/abc");
        assert_eq!(tx.access_code.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_verify_parses_transaction() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transaction/verify/ref-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "message": "Verification successful",
                "data": {
                    "status": "success",
                    "amount": 12200,
                    "reference": "ref-1",
                    "currency": "GHS",
                    "paid_at": "2025-03-14T10:00:00Z",
                    "gateway_response": "Approved"
                }
            })))
            .mount(&server)
            .await;

        let tx = client(&server).verify("ref-1").await.unwrap();
        assert!(tx.is_success());
        assert_eq!(tx.amount_minor, 12_200);
        assert_eq!(tx.currency.as_deref(), Some("GHS"));
        assert!(tx.paid_at.is_some());
    }

    #[tokio::test]
    async fn test_gateway_rejection_is_gateway_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transaction/verify/missing"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": false,
                "message": "Transaction reference not found"
            })))
            .mount(&server)
            .await;

        let err = client(&server).verify("missing").await.unwrap_err();
        match err {
            CoreError::Gateway(message) => assert_eq!(message, "Transaction reference not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
