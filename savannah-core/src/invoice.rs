use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use savannah_catalog::UnknownStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::Booking;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            "failed" => Ok(InvoiceStatus::Failed),
            other => Err(UnknownStatus {
                kind: "invoice",
                value: other.to_string(),
            }),
        }
    }
}

/// One invoice per booking; moves pending -> paid at most once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub customer_email: String,
    pub amount: f64,
    pub currency: String,
    pub status: InvoiceStatus,
    pub paystack_reference: String,
    pub paystack_authorization_url: Option<String>,
    pub paystack_access_code: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub redirect_url: Option<String>,
    pub is_requested: bool,
    pub extra: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Pending invoice for the booking's frozen total, with a fresh gateway reference.
    pub fn for_booking(
        booking: &Booking,
        currency: &str,
        redirect_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            booking_id: booking.id,
            customer_email: booking.guest_email.clone(),
            amount: booking.total_amount,
            currency: currency.to_string(),
            status: InvoiceStatus::Pending,
            paystack_reference: Uuid::new_v4().to_string(),
            paystack_authorization_url: None,
            paystack_access_code: None,
            paid_at: None,
            redirect_url,
            is_requested: false,
            extra: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }
}
