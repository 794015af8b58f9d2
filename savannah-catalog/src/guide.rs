use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use savannah_shared::validation::{require_email, require_non_empty};
use savannah_shared::window::flexible_instant;
use savannah_shared::{DateWindow, FieldError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::UnknownStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GuideStatus {
    Active,
    #[default]
    Inactive,
}

impl GuideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuideStatus::Active => "active",
            GuideStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for GuideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuideStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(GuideStatus::Active),
            "inactive" => Ok(GuideStatus::Inactive),
            other => Err(UnknownStatus {
                kind: "guide",
                value: other.to_string(),
            }),
        }
    }
}

/// Date-scoped override on a guide. No entry for a date means available.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityOverride {
    #[serde(with = "flexible_instant")]
    pub date: DateTime<Utc>,
    pub available: bool,
    #[serde(default)]
    pub blocked_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Guide {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub photo_url: Option<String>,
    pub languages: Vec<String>,
    pub specialties: Vec<String>,
    pub status: GuideStatus,
    pub availability: Vec<AvailabilityOverride>,
    pub created_at: DateTime<Utc>,
}

impl Guide {
    pub fn create(input: NewGuide, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            email: input.email.trim().to_lowercase(),
            phone: input.phone,
            bio: input.bio,
            photo_url: input.photo_url,
            languages: input.languages,
            specialties: input.specialties,
            status: input.status.unwrap_or_default(),
            availability: input.availability,
            created_at: now,
        }
    }

    /// True when an `available: false` override falls inside the window.
    pub fn is_blocked_within(&self, window: &DateWindow) -> bool {
        self.availability
            .iter()
            .any(|entry| !entry.available && window.contains(entry.date))
    }

    pub fn apply(&mut self, update: GuideUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email.trim().to_lowercase();
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(bio) = update.bio {
            self.bio = bio;
        }
        if let Some(photo_url) = update.photo_url {
            self.photo_url = Some(photo_url);
        }
        if let Some(languages) = update.languages {
            self.languages = languages;
        }
        if let Some(specialties) = update.specialties {
            self.specialties = specialties;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(availability) = update.availability {
            self.availability = availability;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGuide {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub status: Option<GuideStatus>,
    #[serde(default)]
    pub availability: Vec<AvailabilityOverride>,
}

impl NewGuide {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require_non_empty(&mut errors, "name", &self.name);
        require_email(&mut errors, "email", &self.email);
        require_non_empty(&mut errors, "phone", &self.phone);
        require_non_empty(&mut errors, "bio", &self.bio);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuideUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub languages: Option<Vec<String>>,
    pub specialties: Option<Vec<String>>,
    pub status: Option<GuideStatus>,
    pub availability: Option<Vec<AvailabilityOverride>>,
}

impl GuideUpdate {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            require_non_empty(&mut errors, "name", name);
        }
        if let Some(email) = &self.email {
            require_email(&mut errors, "email", email);
        }
        if let Some(phone) = &self.phone {
            require_non_empty(&mut errors, "phone", phone);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Listing filter for guides. `name` is a case-insensitive substring match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuideFilter {
    pub status: Option<GuideStatus>,
    pub name: Option<String>,
}

impl GuideFilter {
    pub fn matches(&self, guide: &Guide) -> bool {
        if self.status.is_some_and(|status| status != guide.status) {
            return false;
        }
        match self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            Some(needle) => guide.name.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }
}
