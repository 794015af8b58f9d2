use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use savannah_core::payment::{
    InitializeTransaction, InitializedTransaction, PaymentGateway, VerifiedTransaction,
};
use savannah_core::{CoreError, CoreResult};

/// In-process gateway for local runs and tests.
///
/// Initialization succeeds with a fake checkout URL unless `fail_initialize` is set.
/// Verification answers from whatever was scripted for the reference; an unscripted
/// reference verifies as a success for the amount it was initialized with.
#[derive(Default)]
pub struct ScriptedGateway {
    state: Mutex<ScriptState>,
}

#[derive(Default)]
struct ScriptState {
    fail_initialize: bool,
    initialized: Vec<InitializeTransaction>,
    verify: HashMap<String, Result<VerifiedTransaction, String>>,
    verify_calls: usize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let gateway = Self::default();
        gateway.set_fail_initialize(true);
        gateway
    }

    pub fn set_fail_initialize(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_initialize = fail;
        }
    }

    /// Script the verify answer for `reference`.
    pub fn script_verify(&self, reference: &str, status: &str, amount_minor: i64) {
        let answer = VerifiedTransaction {
            status: status.to_string(),
            amount_minor,
            reference: reference.to_string(),
            currency: None,
            paid_at: Some(Utc::now()),
            gateway_response: Some(status.to_string()),
        };
        if let Ok(mut state) = self.state.lock() {
            state.verify.insert(reference.to_string(), Ok(answer));
        }
    }

    pub fn script_verify_error(&self, reference: &str, message: &str) {
        if let Ok(mut state) = self.state.lock() {
            state
                .verify
                .insert(reference.to_string(), Err(message.to_string()));
        }
    }

    pub fn initialized(&self) -> Vec<InitializeTransaction> {
        self.state
            .lock()
            .map(|state| state.initialized.clone())
            .unwrap_or_default()
    }

    pub fn verify_calls(&self) -> usize {
        self.state.lock().map(|state| state.verify_calls).unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn initialize(&self, request: &InitializeTransaction) -> CoreResult<InitializedTransaction> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CoreError::Internal("gateway script poisoned".to_string()))?;
        if state.fail_initialize {
            return Err(CoreError::Gateway("initialize rejected".to_string()));
        }
        state.initialized.push(request.clone());
        Ok(InitializedTransaction {
            authorization_url: format!("https://checkout.local/{}", request.reference),
            access_code: Some(format!("ac_{}", request.reference.len())),
            reference: request.reference.clone(),
            raw: serde_json::json!({ "reference": request.reference }),
        })
    }

    async fn verify(&self, reference: &str) -> CoreResult<VerifiedTransaction> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CoreError::Internal("gateway script poisoned".to_string()))?;
        state.verify_calls += 1;
        if let Some(answer) = state.verify.get(reference) {
            return match answer {
                Ok(tx) => Ok(tx.clone()),
                Err(message) => Err(CoreError::Gateway(message.clone())),
            };
        }
        let amount_minor = state
            .initialized
            .iter()
            .find(|tx| tx.reference == reference)
            .map(|tx| tx.amount_minor)
            .unwrap_or_default();
        Ok(VerifiedTransaction {
            status: "success".to_string(),
            amount_minor,
            reference: reference.to_string(),
            currency: None,
            paid_at: Some(Utc::now()),
            gateway_response: Some("Approved".to_string()),
        })
    }
}
