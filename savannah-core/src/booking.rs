use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use savannah_catalog::{Addon, UnknownStatus};
use savannah_shared::validation::{require_email, require_non_empty};
use savannah_shared::window::flexible_instant;
use savannah_shared::FieldError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(UnknownStatus {
                kind: "booking",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Success,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "success" => Ok(PaymentStatus::Success),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(UnknownStatus {
                kind: "payment",
                value: other.to_string(),
            }),
        }
    }
}

/// A guest booking. `total_amount` is frozen at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub reference: String,
    pub package_id: Uuid,
    pub package_title: String,
    pub guest_name: String,
    pub guest_phone: String,
    pub guest_email: String,
    pub tour_date: DateTime<Utc>,
    pub num_guests: i32,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub booking_status: BookingStatus,
    pub assigned_guide_id: Option<Uuid>,
    pub addons: Vec<Addon>,
    pub invoice_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Booking request as it arrives at the edge.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub package_id: String,
    pub guest_name: String,
    pub guest_phone: String,
    pub guest_email: String,
    #[serde(with = "flexible_instant")]
    pub tour_date: DateTime<Utc>,
    pub num_guests: i32,
    #[serde(default)]
    pub addons: Vec<Addon>,
    pub redirect_url: Option<String>,
}

impl NewBooking {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require_non_empty(&mut errors, "package_id", &self.package_id);
        require_non_empty(&mut errors, "guest_name", &self.guest_name);
        require_non_empty(&mut errors, "guest_phone", &self.guest_phone);
        require_email(&mut errors, "guest_email", &self.guest_email);
        if self.num_guests < 1 {
            errors.push(FieldError::new("num_guests", "num_guests must be at least 1"));
        }
        for (i, addon) in self.addons.iter().enumerate() {
            if !addon.price.is_finite() || addon.price < 0.0 {
                errors.push(FieldError::new(
                    format!("addons[{i}].price"),
                    "addon price must not be negative",
                ));
            }
        }
        if let Some(url) = &self.redirect_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(FieldError::new("redirect_url", "redirect_url must be an http(s) URL"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Partial admin update. Totals are never recomputed from it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingUpdate {
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_email: Option<String>,
    #[serde(default, with = "optional_instant")]
    pub tour_date: Option<DateTime<Utc>>,
    pub num_guests: Option<i32>,
    pub payment_status: Option<PaymentStatus>,
    pub booking_status: Option<BookingStatus>,
    pub assigned_guide_id: Option<Uuid>,
    pub addons: Option<Vec<Addon>>,
}

impl BookingUpdate {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if let Some(name) = &self.guest_name {
            require_non_empty(&mut errors, "guest_name", name);
        }
        if let Some(phone) = &self.guest_phone {
            require_non_empty(&mut errors, "guest_phone", phone);
        }
        if let Some(email) = &self.guest_email {
            require_email(&mut errors, "guest_email", email);
        }
        if self.num_guests.is_some_and(|n| n < 1) {
            errors.push(FieldError::new("num_guests", "num_guests must be at least 1"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

mod optional_instant {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => savannah_shared::parse_instant("tour_date", &raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Listing filter for bookings. Text fields match case-insensitive substrings.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub package_id: Option<Uuid>,
    pub payment_status: Option<PaymentStatus>,
    pub booking_status: Option<BookingStatus>,
    pub tour_date: Option<savannah_shared::DateWindow>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            match needle.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
                None => true,
            }
        }

        contains(&booking.guest_name, &self.guest_name)
            && contains(&booking.guest_email, &self.guest_email)
            && self.package_id.is_none_or(|id| id == booking.package_id)
            && self.payment_status.is_none_or(|s| s == booking.payment_status)
            && self.booking_status.is_none_or(|s| s == booking.booking_status)
            && self
                .tour_date
                .as_ref()
                .is_none_or(|window| window.contains(booking.tour_date))
    }
}

/// A booking as listed to staff, with the assigned guide's name when it resolves.
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub assigned_guide_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_booking_validation() {
        let input: NewBooking = serde_json::from_value(serde_json::json!({
            "package_id": "",
            "guest_name": "Kofi",
            "guest_phone": "+233201234567",
            "guest_email": "not-an-email",
            "tour_date": "2025-03-14",
            "num_guests": 0
        }))
        .unwrap();
        let paths: Vec<_> = input.validate().unwrap_err().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["package_id", "guest_email", "num_guests"]);
    }

    #[test]
    fn test_update_accepts_bare_tour_date() {
        let update: BookingUpdate =
            serde_json::from_value(serde_json::json!({"tour_date": "2025-04-01", "booking_status": "confirmed"}))
                .unwrap();
        assert_eq!(update.tour_date.unwrap().to_rfc3339(), "2025-04-01T00:00:00+00:00");
        assert_eq!(update.booking_status, Some(BookingStatus::Confirmed));

        let empty: BookingUpdate = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(empty.tour_date.is_none());
    }

    #[test]
    fn test_status_strings() {
        assert_eq!("refunded".parse::<PaymentStatus>().unwrap(), PaymentStatus::Refunded);
        assert_eq!(BookingStatus::Cancelled.to_string(), "cancelled");
        assert!("paid".parse::<BookingStatus>().is_err());
    }
}
