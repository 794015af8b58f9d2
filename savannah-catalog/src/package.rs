use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use savannah_shared::validation::{require_non_empty, require_non_negative};
use savannah_shared::FieldError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::slug::slugify;
use crate::UnknownStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    #[default]
    Active,
    Inactive,
    Draft,
}

impl PackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageStatus::Active => "active",
            PackageStatus::Inactive => "inactive",
            PackageStatus::Draft => "draft",
        }
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PackageStatus::Active),
            "inactive" => Ok(PackageStatus::Inactive),
            "draft" => Ok(PackageStatus::Draft),
            other => Err(UnknownStatus {
                kind: "package",
                value: other.to_string(),
            }),
        }
    }
}

/// Optional extra a guest can attach to a booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Addon {
    pub name: String,
    pub price: f64,
}

/// A sellable tour package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Package {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub base_price: f64,
    pub guest_limit: i32,
    pub extra_guest_fee: f64,
    pub duration_hours: i32,
    pub images: Vec<String>,
    pub addons: Vec<Addon>,
    pub available_dates: Vec<NaiveDate>,
    pub status: PackageStatus,
    pub created_at: DateTime<Utc>,
}

impl Package {
    /// Builds a fresh package with a time-ordered id and a slug derived from the title.
    pub fn create(input: NewPackage, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            slug: slugify(&input.title),
            title: input.title,
            description: input.description,
            base_price: input.base_price,
            guest_limit: input.guest_limit,
            extra_guest_fee: input.extra_guest_fee.unwrap_or(0.0),
            duration_hours: input.duration_hours.unwrap_or(1),
            images: input.images,
            addons: input.addons,
            available_dates: input.available_dates,
            status: input.status.unwrap_or_default(),
            created_at: now,
        }
    }

    /// Applies a partial update. A new title always re-derives the slug.
    pub fn apply(&mut self, update: PackageUpdate) {
        if let Some(title) = update.title {
            self.slug = slugify(&title);
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(base_price) = update.base_price {
            self.base_price = base_price;
        }
        if let Some(guest_limit) = update.guest_limit {
            self.guest_limit = guest_limit;
        }
        if let Some(fee) = update.extra_guest_fee {
            self.extra_guest_fee = fee;
        }
        if let Some(hours) = update.duration_hours {
            self.duration_hours = hours;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        if let Some(addons) = update.addons {
            self.addons = addons;
        }
        if let Some(dates) = update.available_dates {
            self.available_dates = dates;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPackage {
    pub title: String,
    pub description: String,
    pub base_price: f64,
    pub guest_limit: i32,
    pub extra_guest_fee: Option<f64>,
    pub duration_hours: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub addons: Vec<Addon>,
    #[serde(default)]
    pub available_dates: Vec<NaiveDate>,
    pub status: Option<PackageStatus>,
}

impl NewPackage {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require_non_empty(&mut errors, "title", &self.title);
        require_non_empty(&mut errors, "description", &self.description);
        require_non_negative(&mut errors, "base_price", self.base_price);
        check_limits(
            &mut errors,
            Some(self.guest_limit),
            self.extra_guest_fee,
            self.duration_hours,
        );
        check_addons(&mut errors, &self.addons);
        finish(errors)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<f64>,
    pub guest_limit: Option<i32>,
    pub extra_guest_fee: Option<f64>,
    pub duration_hours: Option<i32>,
    pub images: Option<Vec<String>>,
    pub addons: Option<Vec<Addon>>,
    pub available_dates: Option<Vec<NaiveDate>>,
    pub status: Option<PackageStatus>,
}

impl PackageUpdate {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if let Some(title) = &self.title {
            require_non_empty(&mut errors, "title", title);
        }
        if let Some(description) = &self.description {
            require_non_empty(&mut errors, "description", description);
        }
        if let Some(price) = self.base_price {
            require_non_negative(&mut errors, "base_price", price);
        }
        check_limits(
            &mut errors,
            self.guest_limit,
            self.extra_guest_fee,
            self.duration_hours,
        );
        if let Some(addons) = &self.addons {
            check_addons(&mut errors, addons);
        }
        finish(errors)
    }
}

fn check_limits(
    errors: &mut Vec<FieldError>,
    guest_limit: Option<i32>,
    extra_guest_fee: Option<f64>,
    duration_hours: Option<i32>,
) {
    if guest_limit.is_some_and(|limit| limit < 1) {
        errors.push(FieldError::new("guest_limit", "must be at least 1"));
    }
    if let Some(fee) = extra_guest_fee {
        require_non_negative(errors, "extra_guest_fee", fee);
    }
    if duration_hours.is_some_and(|hours| hours < 1) {
        errors.push(FieldError::new("duration_hours", "must be at least 1"));
    }
}

fn check_addons(errors: &mut Vec<FieldError>, addons: &[Addon]) {
    for (i, addon) in addons.iter().enumerate() {
        require_non_empty(errors, &format!("addons[{i}].name"), &addon.name);
        require_non_negative(errors, &format!("addons[{i}].price"), addon.price);
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
