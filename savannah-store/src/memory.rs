use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use savannah_catalog::{Guide, GuideFilter, GuideStatus, Package, PackageStatus};
use savannah_core::booking::{Booking, BookingFilter, BookingStatus};
use savannah_core::identity::User;
use savannah_core::invoice::{Invoice, InvoiceStatus};
use savannah_core::kpi::{BookingSummary, DailyKpi};
use savannah_core::repository::{
    BookingRepository, GuideRepository, InvoiceRepository, KpiRepository, PackageRepository,
    UserRepository,
};
use savannah_core::storage::ObjectStore;
use savannah_core::{CoreError, CoreResult};
use savannah_shared::{DateWindow, Page, PageRequest, SortDir};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local implementation of every repository.
///
/// Maps are keyed by id in a `BTreeMap`, so iteration is oldest first for v7 ids.
#[derive(Default)]
pub struct MemoryStore {
    packages: RwLock<BTreeMap<Uuid, Package>>,
    guides: RwLock<BTreeMap<Uuid, Guide>>,
    bookings: RwLock<BTreeMap<Uuid, Booking>>,
    invoices: RwLock<BTreeMap<Uuid, Invoice>>,
    users: RwLock<BTreeMap<Uuid, User>>,
    kpis: RwLock<BTreeMap<NaiveDate, DailyKpi>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn order_by_id<T>(mut items: Vec<T>, page: &PageRequest, id: impl Fn(&T) -> Uuid) -> Vec<T> {
    items.sort_by_key(|item| id(item));
    if page.sort_dir == SortDir::Desc {
        items.reverse();
    }
    items
}

#[async_trait]
impl PackageRepository for MemoryStore {
    async fn create_package(&self, package: &Package) -> CoreResult<()> {
        self.packages.write().await.insert(package.id, package.clone());
        Ok(())
    }

    async fn get_package(&self, id: Uuid) -> CoreResult<Option<Package>> {
        Ok(self.packages.read().await.get(&id).cloned())
    }

    async fn list_packages(
        &self,
        status: Option<PackageStatus>,
        page: &PageRequest,
    ) -> CoreResult<Page<Package>> {
        let matching: Vec<Package> = self
            .packages
            .read()
            .await
            .values()
            .filter(|p| status.is_none_or(|s| s == p.status))
            .cloned()
            .collect();
        Ok(Page::slice(order_by_id(matching, page, |p| p.id), page))
    }

    async fn update_package(&self, package: &Package) -> CoreResult<()> {
        match self.packages.write().await.get_mut(&package.id) {
            Some(slot) => {
                *slot = package.clone();
                Ok(())
            }
            None => Err(CoreError::NotFound(format!("Package {}", package.id))),
        }
    }
}

#[async_trait]
impl GuideRepository for MemoryStore {
    async fn create_guide(&self, guide: &Guide) -> CoreResult<()> {
        self.guides.write().await.insert(guide.id, guide.clone());
        Ok(())
    }

    async fn get_guide(&self, id: Uuid) -> CoreResult<Option<Guide>> {
        Ok(self.guides.read().await.get(&id).cloned())
    }

    async fn list_guides(&self, filter: &GuideFilter, page: &PageRequest) -> CoreResult<Page<Guide>> {
        let matching: Vec<Guide> = self
            .guides
            .read()
            .await
            .values()
            .filter(|g| filter.matches(g))
            .cloned()
            .collect();
        Ok(Page::slice(order_by_id(matching, page, |g| g.id), page))
    }

    async fn update_guide(&self, guide: &Guide) -> CoreResult<()> {
        match self.guides.write().await.get_mut(&guide.id) {
            Some(slot) => {
                *slot = guide.clone();
                Ok(())
            }
            None => Err(CoreError::NotFound(format!("Guide {}", guide.id))),
        }
    }

    async fn guides_with_status(&self, status: GuideStatus) -> CoreResult<Vec<Guide>> {
        Ok(self
            .guides
            .read()
            .await
            .values()
            .rev()
            .filter(|g| g.status == status)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create_booking_with_invoice(&self, booking: &Booking, invoice: &Invoice) -> CoreResult<()> {
        // Lock order: bookings before invoices, everywhere.
        let mut bookings = self.bookings.write().await;
        let mut invoices = self.invoices.write().await;

        if invoices
            .values()
            .any(|i| i.paystack_reference == invoice.paystack_reference || i.booking_id == invoice.booking_id)
        {
            return Err(CoreError::Conflict(format!(
                "invoice for booking {} already exists",
                booking.reference
            )));
        }
        bookings.insert(booking.id, booking.clone());
        invoices.insert(invoice.id, invoice.clone());
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> CoreResult<Option<Booking>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn list_bookings(&self, filter: &BookingFilter, page: &PageRequest) -> CoreResult<Page<Booking>> {
        let matching: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        Ok(Page::slice(order_by_id(matching, page, |b| b.id), page))
    }

    async fn update_booking(&self, booking: &Booking) -> CoreResult<()> {
        match self.bookings.write().await.get_mut(&booking.id) {
            Some(slot) => {
                *slot = booking.clone();
                Ok(())
            }
            None => Err(CoreError::NotFound(format!("Booking {}", booking.id))),
        }
    }

    async fn delete_booking(&self, id: Uuid) -> CoreResult<bool> {
        let mut bookings = self.bookings.write().await;
        let mut invoices = self.invoices.write().await;
        let removed = bookings.remove(&id).is_some();
        if removed {
            invoices.retain(|_, invoice| invoice.booking_id != id);
        }
        Ok(removed)
    }

    async fn busy_guide_ids(
        &self,
        window: &DateWindow,
        statuses: &[BookingStatus],
    ) -> CoreResult<HashSet<Uuid>> {
        Ok(self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| statuses.contains(&b.booking_status) && window.contains(b.tour_date))
            .filter_map(|b| b.assigned_guide_id)
            .collect())
    }

    async fn booking_summary(&self, window: Option<&DateWindow>) -> CoreResult<BookingSummary> {
        use savannah_core::booking::PaymentStatus;

        let bookings = self.bookings.read().await;
        let mut summary = BookingSummary::default();
        for booking in bookings
            .values()
            .filter(|b| window.is_none_or(|w| w.contains(b.created_at)))
        {
            summary.bookings += 1;
            match booking.payment_status {
                PaymentStatus::Success => {
                    summary.successful_payments += 1;
                    summary.revenue += booking.total_amount;
                }
                PaymentStatus::Pending => summary.pending_payments += 1,
                _ => {}
            }
        }
        Ok(summary)
    }
}

#[async_trait]
impl InvoiceRepository for MemoryStore {
    async fn get_invoice(&self, id: Uuid) -> CoreResult<Option<Invoice>> {
        Ok(self.invoices.read().await.get(&id).cloned())
    }

    async fn find_by_reference(&self, reference: &str) -> CoreResult<Option<Invoice>> {
        Ok(self
            .invoices
            .read()
            .await
            .values()
            .find(|i| i.paystack_reference == reference)
            .cloned())
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> CoreResult<Option<Invoice>> {
        Ok(self
            .invoices
            .read()
            .await
            .values()
            .find(|i| i.booking_id == booking_id)
            .cloned())
    }

    async fn update_invoice(&self, invoice: &Invoice) -> CoreResult<()> {
        match self.invoices.write().await.get_mut(&invoice.id) {
            Some(slot) => {
                *slot = invoice.clone();
                Ok(())
            }
            None => Err(CoreError::NotFound(format!("Invoice {}", invoice.id))),
        }
    }

    async fn mark_paid_if_unpaid(
        &self,
        id: Uuid,
        paid_at: DateTime<Utc>,
        extra: Option<serde_json::Value>,
    ) -> CoreResult<bool> {
        let mut invoices = self.invoices.write().await;
        let invoice = invoices
            .get_mut(&id)
            .ok_or_else(|| CoreError::NotFound(format!("Invoice {id}")))?;
        if invoice.status == InvoiceStatus::Paid {
            return Ok(false);
        }
        invoice.status = InvoiceStatus::Paid;
        invoice.paid_at = Some(paid_at);
        if extra.is_some() {
            invoice.extra = extra;
        }
        invoice.updated_at = Utc::now();
        Ok(true)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: &User) -> CoreResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(CoreError::Conflict(format!("User {} already exists", user.email)));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let email = email.trim();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_user(&self, id: Uuid) -> CoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn increment_token_version(&self, id: Uuid) -> CoreResult<i64> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| CoreError::NotFound(format!("User {id}")))?;
        user.token_version += 1;
        Ok(user.token_version)
    }
}

#[async_trait]
impl KpiRepository for MemoryStore {
    async fn upsert_daily(&self, kpi: &DailyKpi) -> CoreResult<()> {
        self.kpis.write().await.insert(kpi.date, kpi.clone());
        Ok(())
    }

    async fn get_daily(&self, date: NaiveDate) -> CoreResult<Option<DailyKpi>> {
        Ok(self.kpis.read().await.get(&date).cloned())
    }
}

/// Keeps uploaded objects in memory and hands back `memory://` URLs.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub cache_control: String,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> CoreResult<String> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
                cache_control: cache_control.to_string(),
            },
        );
        Ok(format!("memory://{key}"))
    }
}
