use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreResult;

/// Request to open a hosted checkout for an invoice. Amounts are in minor units.
#[derive(Debug, Clone, Serialize)]
pub struct InitializeTransaction {
    pub amount_minor: i64,
    pub email: String,
    pub reference: String,
    pub currency: String,
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InitializedTransaction {
    pub authorization_url: String,
    pub access_code: Option<String>,
    pub reference: String,
    pub raw: serde_json::Value,
}

/// Gateway's view of a transaction after verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifiedTransaction {
    pub status: String,
    pub amount_minor: i64,
    pub reference: String,
    pub currency: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub gateway_response: Option<String>,
}

impl VerifiedTransaction {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a transaction and return the authorization URL the guest pays at.
    async fn initialize(&self, request: &InitializeTransaction) -> CoreResult<InitializedTransaction>;

    /// Ask the gateway what happened to a transaction.
    async fn verify(&self, reference: &str) -> CoreResult<VerifiedTransaction>;
}
