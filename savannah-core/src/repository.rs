use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use savannah_catalog::{Guide, GuideFilter, GuideStatus, Package, PackageStatus};
use savannah_shared::{DateWindow, Page, PageRequest};
use uuid::Uuid;

use crate::booking::{Booking, BookingFilter, BookingStatus};
use crate::identity::User;
use crate::invoice::Invoice;
use crate::kpi::{BookingSummary, DailyKpi};
use crate::CoreResult;

/// Repository trait for package catalog access
#[async_trait]
pub trait PackageRepository: Send + Sync {
    async fn create_package(&self, package: &Package) -> CoreResult<()>;

    async fn get_package(&self, id: Uuid) -> CoreResult<Option<Package>>;

    async fn list_packages(
        &self,
        status: Option<PackageStatus>,
        page: &PageRequest,
    ) -> CoreResult<Page<Package>>;

    /// Replace the stored package. `NotFound` when the id is unknown.
    async fn update_package(&self, package: &Package) -> CoreResult<()>;
}

/// Repository trait for guide profiles
#[async_trait]
pub trait GuideRepository: Send + Sync {
    async fn create_guide(&self, guide: &Guide) -> CoreResult<()>;

    async fn get_guide(&self, id: Uuid) -> CoreResult<Option<Guide>>;

    async fn list_guides(&self, filter: &GuideFilter, page: &PageRequest) -> CoreResult<Page<Guide>>;

    async fn update_guide(&self, guide: &Guide) -> CoreResult<()>;

    /// Every guide in a status, newest id first. Input to the availability resolver.
    async fn guides_with_status(&self, status: GuideStatus) -> CoreResult<Vec<Guide>>;
}

/// Repository trait for bookings
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a booking and its invoice together. Neither exists if either write fails.
    async fn create_booking_with_invoice(&self, booking: &Booking, invoice: &Invoice) -> CoreResult<()>;

    async fn get_booking(&self, id: Uuid) -> CoreResult<Option<Booking>>;

    async fn list_bookings(&self, filter: &BookingFilter, page: &PageRequest) -> CoreResult<Page<Booking>>;

    async fn update_booking(&self, booking: &Booking) -> CoreResult<()>;

    /// Hard delete. Returns false when nothing was removed.
    async fn delete_booking(&self, id: Uuid) -> CoreResult<bool>;

    /// Guides holding a booking in one of `statuses` whose tour date lies in `window`.
    async fn busy_guide_ids(
        &self,
        window: &DateWindow,
        statuses: &[BookingStatus],
    ) -> CoreResult<HashSet<Uuid>>;

    /// Counts and revenue over bookings created in `window` (all time when `None`).
    async fn booking_summary(&self, window: Option<&DateWindow>) -> CoreResult<BookingSummary>;
}

/// Repository trait for invoices
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn get_invoice(&self, id: Uuid) -> CoreResult<Option<Invoice>>;

    async fn find_by_reference(&self, reference: &str) -> CoreResult<Option<Invoice>>;

    async fn find_by_booking(&self, booking_id: Uuid) -> CoreResult<Option<Invoice>>;

    async fn update_invoice(&self, invoice: &Invoice) -> CoreResult<()>;

    /// Flip the invoice to paid unless it already is. Returns whether this call did the flip.
    async fn mark_paid_if_unpaid(
        &self,
        id: Uuid,
        paid_at: DateTime<Utc>,
        extra: Option<serde_json::Value>,
    ) -> CoreResult<bool>;
}

/// Repository trait for back-office users
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// `Conflict` when the email is taken.
    async fn create_user(&self, user: &User) -> CoreResult<()>;

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    async fn get_user(&self, id: Uuid) -> CoreResult<Option<User>>;

    /// Bump and return the new token version.
    async fn increment_token_version(&self, id: Uuid) -> CoreResult<i64>;
}

/// Repository trait for the daily KPI rollup
#[async_trait]
pub trait KpiRepository: Send + Sync {
    async fn upsert_daily(&self, kpi: &DailyKpi) -> CoreResult<()>;

    async fn get_daily(&self, date: NaiveDate) -> CoreResult<Option<DailyKpi>>;
}
