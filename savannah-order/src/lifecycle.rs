use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use savannah_catalog::{Addon, Package};
use savannah_core::booking::{
    Booking, BookingFilter, BookingStatus, BookingUpdate, BookingView, NewBooking, PaymentStatus,
};
use savannah_core::invoice::{Invoice, InvoiceStatus};
use savannah_core::payment::{InitializeTransaction, PaymentGateway};
use savannah_core::repository::{
    BookingRepository, GuideRepository, InvoiceRepository, PackageRepository,
};
use savannah_core::{CoreError, CoreResult};
use savannah_shared::{FieldError, Masked, Page, PageRequest};
use serde::Serialize;
use uuid::Uuid;

use crate::manager::BookingManager;
use crate::reference::ReferenceGenerator;

/// Knobs the lifecycle takes from configuration.
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    pub currency: String,
    /// Minor units per major unit (pesewas per cedi).
    pub minor_unit_factor: i64,
    pub callback_url: Option<String>,
    pub gateway_timeout: Duration,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            currency: "GHS".to_string(),
            minor_unit_factor: 100,
            callback_url: None,
            gateway_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedBooking {
    pub booking: Booking,
    pub invoice: Invoice,
}

/// What a webhook delivery ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    UnknownReference,
    AlreadyPaid { invoice_id: Uuid },
    Paid { invoice_id: Uuid, booking_id: Uuid },
}

impl ReconcileOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ReconcileOutcome::UnknownReference => "unknown_reference",
            ReconcileOutcome::AlreadyPaid { .. } => "already_paid",
            ReconcileOutcome::Paid { .. } => "paid",
        }
    }
}

/// Booking -> invoice -> gateway round trip, and the webhook that closes it.
pub struct BookingLifecycle {
    packages: Arc<dyn PackageRepository>,
    guides: Arc<dyn GuideRepository>,
    bookings: Arc<dyn BookingRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    gateway: Arc<dyn PaymentGateway>,
    references: ReferenceGenerator,
    settings: LifecycleSettings,
}

impl BookingLifecycle {
    pub fn new(
        packages: Arc<dyn PackageRepository>,
        guides: Arc<dyn GuideRepository>,
        bookings: Arc<dyn BookingRepository>,
        invoices: Arc<dyn InvoiceRepository>,
        gateway: Arc<dyn PaymentGateway>,
        references: ReferenceGenerator,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            packages,
            guides,
            bookings,
            invoices,
            gateway,
            references,
            settings,
        }
    }

    /// `base_price + num_guests + sum(addon prices)`.
    ///
    /// The guest count is added as-is, not multiplied by a fee. Existing
    /// bookings depend on this figure so it must stay stable.
    pub fn compute_total(package: &Package, num_guests: i32, addons: &[Addon]) -> f64 {
        package.base_price + f64::from(num_guests) + addons.iter().map(|a| a.price).sum::<f64>()
    }

    pub async fn create_booking(&self, input: NewBooking) -> CoreResult<CreatedBooking> {
        input.validate()?;
        self.check_minor_units(&input.addons)?;

        let package_id = Uuid::parse_str(input.package_id.trim())
            .map_err(|_| CoreError::InvalidReference(format!("package {}", input.package_id)))?;
        let package = self
            .packages
            .get_package(package_id)
            .await?
            .ok_or_else(|| CoreError::InvalidReference(format!("package {package_id}")))?;

        let now = Utc::now();
        // Stored in whole minor units so the invoice equals what the gateway charges.
        let total = Self::compute_total(&package, input.num_guests, &input.addons);
        let total_amount = self.to_minor(total) as f64 / self.settings.minor_unit_factor as f64;

        let mut booking = Booking {
            id: Uuid::now_v7(),
            reference: self.references.generate(now),
            package_id: package.id,
            package_title: package.title.clone(),
            guest_name: input.guest_name.trim().to_string(),
            guest_phone: input.guest_phone.trim().to_string(),
            guest_email: input.guest_email.trim().to_lowercase(),
            tour_date: input.tour_date,
            num_guests: input.num_guests,
            total_amount,
            payment_status: PaymentStatus::Pending,
            booking_status: BookingStatus::Pending,
            assigned_guide_id: None,
            addons: input.addons,
            invoice_id: None,
            created_at: now,
        };
        let mut invoice = Invoice::for_booking(&booking, &self.settings.currency, input.redirect_url, now);
        booking.invoice_id = Some(invoice.id);

        self.bookings.create_booking_with_invoice(&booking, &invoice).await?;
        tracing::info!(
            booking = %booking.reference,
            invoice = %invoice.id,
            email = %Masked(&booking.guest_email),
            total = booking.total_amount,
            "Booking and invoice created"
        );

        let request = InitializeTransaction {
            amount_minor: self.to_minor(invoice.amount),
            email: invoice.customer_email.clone(),
            reference: invoice.paystack_reference.clone(),
            currency: invoice.currency.clone(),
            callback_url: self.settings.callback_url.clone(),
        };

        let initialized =
            match tokio::time::timeout(self.settings.gateway_timeout, self.gateway.initialize(&request)).await {
                Ok(result) => result,
                Err(_) => Err(CoreError::Gateway("payment initialization timed out".to_string())),
            };

        match initialized {
            Ok(tx) => {
                invoice.paystack_authorization_url = Some(tx.authorization_url);
                invoice.paystack_access_code = tx.access_code;
                invoice.is_requested = true;
                invoice.extra = Some(tx.raw);
                invoice.updated_at = Utc::now();
                self.invoices.update_invoice(&invoice).await?;
                tracing::info!(
                    booking = %booking.reference,
                    reference = %invoice.paystack_reference,
                    "Payment initialized"
                );
                Ok(CreatedBooking { booking, invoice })
            }
            Err(err) => {
                tracing::warn!(
                    booking = %booking.reference,
                    reference = %invoice.paystack_reference,
                    error = %err,
                    "Payment initialization failed, marking invoice failed"
                );
                invoice.status = InvoiceStatus::Failed;
                invoice.extra = Some(serde_json::json!({ "initialize_error": err.to_string() }));
                invoice.updated_at = Utc::now();
                self.invoices.update_invoice(&invoice).await?;
                Err(CoreError::Gateway(format!(
                    "booking {} was saved but payment could not be initialized",
                    booking.reference
                )))
            }
        }
    }

    /// Settles an invoice from a gateway callback. Safe to call any number of times.
    pub async fn reconcile_payment(&self, reference: &str) -> CoreResult<ReconcileOutcome> {
        let Some(invoice) = self.invoices.find_by_reference(reference).await? else {
            tracing::info!(reference, "Webhook for unknown reference acknowledged");
            return Ok(ReconcileOutcome::UnknownReference);
        };

        if invoice.is_paid() {
            tracing::info!(reference, invoice = %invoice.id, "Invoice already paid");
            return Ok(ReconcileOutcome::AlreadyPaid { invoice_id: invoice.id });
        }

        let verified = self.gateway.verify(reference).await?;
        if !verified.is_success() {
            tracing::warn!(reference, status = %verified.status, "Gateway reports payment not successful");
            return Err(CoreError::PaymentNotSuccessful(verified.status));
        }

        if verified.amount_minor != self.to_minor(invoice.amount) {
            let reported = verified.amount_minor as f64 / self.settings.minor_unit_factor as f64;
            tracing::error!(
                reference,
                expected = invoice.amount,
                reported,
                "Gateway amount does not match invoice"
            );
            return Err(CoreError::AmountMismatch {
                expected: invoice.amount,
                reported,
            });
        }

        let paid_at = verified.paid_at.unwrap_or_else(Utc::now);
        let extra = serde_json::to_value(&verified).ok();
        let flipped = self.invoices.mark_paid_if_unpaid(invoice.id, paid_at, extra).await?;
        if !flipped {
            tracing::info!(reference, invoice = %invoice.id, "Invoice paid by a concurrent delivery");
            return Ok(ReconcileOutcome::AlreadyPaid { invoice_id: invoice.id });
        }

        tracing::info!(reference, invoice = %invoice.id, booking = %invoice.booking_id, "Invoice paid");
        Ok(ReconcileOutcome::Paid {
            invoice_id: invoice.id,
            booking_id: invoice.booking_id,
        })
    }

    /// Overwrites the assigned guide. Availability is not re-checked.
    pub async fn reassign_guide(&self, booking_id: Uuid, guide_id: Uuid) -> CoreResult<Booking> {
        let mut booking = self.require_booking(booking_id).await?;
        let previous = booking.assigned_guide_id.replace(guide_id);
        self.bookings.update_booking(&booking).await?;
        tracing::info!(
            booking = %booking.reference,
            guide = %guide_id,
            previous = ?previous,
            "Guide reassigned"
        );
        Ok(booking)
    }

    pub async fn update_booking(&self, booking_id: Uuid, update: BookingUpdate) -> CoreResult<Booking> {
        update.validate()?;
        let mut booking = self.require_booking(booking_id).await?;
        BookingManager::apply_update(&mut booking, update)?;
        self.bookings.update_booking(&booking).await?;
        Ok(booking)
    }

    pub async fn delete_booking(&self, booking_id: Uuid) -> CoreResult<()> {
        if !self.bookings.delete_booking(booking_id).await? {
            return Err(CoreError::NotFound(format!("Booking {booking_id}")));
        }
        tracing::info!(booking = %booking_id, "Booking deleted");
        Ok(())
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> CoreResult<BookingView> {
        let booking = self.require_booking(booking_id).await?;
        self.annotate(booking).await
    }

    /// Lists bookings with the assigned guide's name filled in where it resolves.
    pub async fn list_bookings(
        &self,
        filter: &BookingFilter,
        page: &PageRequest,
    ) -> CoreResult<Page<BookingView>> {
        let Page {
            items,
            total,
            page,
            limit,
            page_count,
        } = self.bookings.list_bookings(filter, page).await?;
        let mut views = Vec::with_capacity(items.len());
        for booking in items {
            views.push(self.annotate(booking).await?);
        }
        Ok(Page {
            items: views,
            total,
            page,
            limit,
            page_count,
        })
    }

    pub async fn invoice_for(&self, booking_id: Uuid) -> CoreResult<Option<Invoice>> {
        self.invoices.find_by_booking(booking_id).await
    }

    async fn annotate(&self, booking: Booking) -> CoreResult<BookingView> {
        let assigned_guide_name = match booking.assigned_guide_id {
            Some(id) => self.guides.get_guide(id).await?.map(|g| g.name),
            None => None,
        };
        Ok(BookingView {
            booking,
            assigned_guide_name,
        })
    }

    async fn require_booking(&self, booking_id: Uuid) -> CoreResult<Booking> {
        self.bookings
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Booking {booking_id}")))
    }

    /// Client-supplied prices may not be finer than the currency's minor unit.
    fn check_minor_units(&self, addons: &[Addon]) -> CoreResult<()> {
        let factor = self.settings.minor_unit_factor as f64;
        let errors: Vec<FieldError> = addons
            .iter()
            .enumerate()
            .filter(|(_, addon)| {
                let scaled = addon.price * factor;
                (scaled - scaled.round()).abs() > 1e-6
            })
            .map(|(i, _)| {
                FieldError::new(
                    format!("addons[{i}].price"),
                    "addon price is finer than the currency's minor unit",
                )
            })
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidFields(errors))
        }
    }

    fn to_minor(&self, amount: f64) -> i64 {
        (amount * self.settings.minor_unit_factor as f64).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ScriptedGateway;
    use savannah_catalog::NewPackage;
    use savannah_store::MemoryStore;

    struct Harness {
        store: Arc<MemoryStore>,
        gateway: Arc<ScriptedGateway>,
        lifecycle: BookingLifecycle,
    }

    fn harness(gateway: ScriptedGateway) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(gateway);
        let lifecycle = BookingLifecycle::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            gateway.clone(),
            ReferenceGenerator::default(),
            LifecycleSettings {
                callback_url: Some("https://tours.example.com/paid".to_string()),
                ..Default::default()
            },
        );
        Harness {
            store,
            gateway,
            lifecycle,
        }
    }

    async fn seed_package(store: &MemoryStore) -> Package {
        let package = Package::create(
            NewPackage {
                title: "Cape Coast Tour".to_string(),
                description: "Castles".to_string(),
                base_price: 100.0,
                guest_limit: 10,
                extra_guest_fee: Some(15.0),
                duration_hours: Some(8),
                images: vec![],
                addons: vec![],
                available_dates: vec![],
                status: None,
            },
            Utc::now(),
        );
        store.create_package(&package).await.unwrap();
        package
    }

    fn request(package_id: &str) -> NewBooking {
        serde_json::from_value(serde_json::json!({
            "package_id": package_id,
            "guest_name": "Kofi Mensah",
            "guest_phone": "+233201234567",
            "guest_email": "Kofi@Example.com",
            "tour_date": "2025-03-14",
            "num_guests": 2,
            "addons": [{"name": "Lunch", "price": 20}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_booking_freezes_total_and_initializes_payment() {
        let h = harness(ScriptedGateway::new());
        let package = seed_package(&h.store).await;

        let created = h.lifecycle.create_booking(request(&package.id.to_string())).await.unwrap();
        assert_eq!(created.booking.total_amount, 122.0);
        assert_eq!(created.booking.guest_email, "kofi@example.com");
        assert_eq!(created.booking.package_title, "Cape Coast Tour");
        assert_eq!(created.booking.invoice_id, Some(created.invoice.id));
        assert_eq!(created.invoice.amount, 122.0);
        assert_eq!(created.invoice.currency, "GHS");
        assert!(created.invoice.is_requested);
        assert!(created.invoice.paystack_authorization_url.is_some());

        let sent = h.gateway.initialized();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].amount_minor, 12_200);
        assert_eq!(sent[0].reference, created.invoice.paystack_reference);
        assert_eq!(sent[0].callback_url.as_deref(), Some("https://tours.example.com/paid"));

        // Later price changes never touch the stored total.
        let mut repriced = package.clone();
        repriced.base_price = 500.0;
        h.store.update_package(&repriced).await.unwrap();
        let stored = h.lifecycle.get_booking(created.booking.id).await.unwrap();
        assert_eq!(stored.booking.total_amount, 122.0);
    }

    #[tokio::test]
    async fn test_sub_minor_addon_price_is_rejected() {
        let h = harness(ScriptedGateway::new());
        let package = seed_package(&h.store).await;
        let mut input = request(&package.id.to_string());
        input.addons = vec![
            Addon {
                name: "Lunch".to_string(),
                price: 20.25,
            },
            Addon {
                name: "Tip".to_string(),
                price: 0.004,
            },
        ];

        match h.lifecycle.create_booking(input).await {
            Err(CoreError::InvalidFields(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, "addons[1].price");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(h.gateway.initialized().is_empty());

        // Float noise in whole-pesewa prices still books, at an exact total.
        let mut input = request(&package.id.to_string());
        input.addons = vec![
            Addon {
                name: "Water".to_string(),
                price: 0.1,
            },
            Addon {
                name: "Snack".to_string(),
                price: 0.2,
            },
        ];
        let created = h.lifecycle.create_booking(input).await.unwrap();
        assert_eq!(created.invoice.amount, 102.3);
        assert_eq!(h.gateway.initialized()[0].amount_minor, 10_230);

        let outcome = h
            .lifecycle
            .reconcile_payment(&created.invoice.paystack_reference)
            .await
            .unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Paid { .. }));
    }

    #[tokio::test]
    async fn test_unknown_package_is_invalid_reference() {
        let h = harness(ScriptedGateway::new());
        let missing = h.lifecycle.create_booking(request(&Uuid::now_v7().to_string())).await;
        assert!(matches!(missing, Err(CoreError::InvalidReference(_))));

        let garbage = h.lifecycle.create_booking(request("not-a-uuid")).await;
        assert!(matches!(garbage, Err(CoreError::InvalidReference(_))));
    }

    #[tokio::test]
    async fn test_gateway_failure_keeps_booking_and_fails_invoice() {
        let h = harness(ScriptedGateway::failing());
        let package = seed_package(&h.store).await;

        let err = h.lifecycle.create_booking(request(&package.id.to_string())).await.unwrap_err();
        assert!(matches!(err, CoreError::Gateway(_)));

        let page = h
            .lifecycle
            .list_bookings(&BookingFilter::default(), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        let booking = &page.items[0].booking;
        assert_eq!(booking.booking_status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Pending);

        let invoice = h.lifecycle.invoice_for(booking.id).await.unwrap().unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Failed);
        assert!(invoice.paystack_authorization_url.is_none());
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let h = harness(ScriptedGateway::new());
        let package = seed_package(&h.store).await;
        let created = h.lifecycle.create_booking(request(&package.id.to_string())).await.unwrap();
        let reference = created.invoice.paystack_reference.clone();

        let first = h.lifecycle.reconcile_payment(&reference).await.unwrap();
        assert_eq!(
            first,
            ReconcileOutcome::Paid {
                invoice_id: created.invoice.id,
                booking_id: created.booking.id
            }
        );
        let paid = h.lifecycle.invoice_for(created.booking.id).await.unwrap().unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert!(paid.paid_at.is_some());

        let second = h.lifecycle.reconcile_payment(&reference).await.unwrap();
        assert_eq!(second, ReconcileOutcome::AlreadyPaid { invoice_id: created.invoice.id });
        assert_eq!(h.gateway.verify_calls(), 1);

        let again = h.lifecycle.invoice_for(created.booking.id).await.unwrap().unwrap();
        assert_eq!(again, paid);

        // Booking payment status is not advanced by reconciliation.
        let booking = h.lifecycle.get_booking(created.booking.id).await.unwrap();
        assert_eq!(booking.booking.payment_status, PaymentStatus::Pending);
    }

    /// Holds every verify call until `parties` callers are waiting, so concurrent
    /// deliveries all get past the paid check before either settles.
    struct GatedGateway {
        inner: Arc<ScriptedGateway>,
        gate: tokio::sync::Barrier,
    }

    #[async_trait::async_trait]
    impl PaymentGateway for GatedGateway {
        async fn initialize(
            &self,
            request: &InitializeTransaction,
        ) -> CoreResult<savannah_core::payment::InitializedTransaction> {
            self.inner.initialize(request).await
        }

        async fn verify(
            &self,
            reference: &str,
        ) -> CoreResult<savannah_core::payment::VerifiedTransaction> {
            self.gate.wait().await;
            self.inner.verify(reference).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_deliveries_settle_once() {
        let h = harness(ScriptedGateway::new());
        let package = seed_package(&h.store).await;
        let created = h.lifecycle.create_booking(request(&package.id.to_string())).await.unwrap();
        let reference = created.invoice.paystack_reference.clone();

        let gated = BookingLifecycle::new(
            h.store.clone(),
            h.store.clone(),
            h.store.clone(),
            h.store.clone(),
            Arc::new(GatedGateway {
                inner: h.gateway.clone(),
                gate: tokio::sync::Barrier::new(2),
            }),
            ReferenceGenerator::default(),
            LifecycleSettings::default(),
        );

        let (first, second) = tokio::join!(
            gated.reconcile_payment(&reference),
            gated.reconcile_payment(&reference)
        );
        let outcomes = [first.unwrap(), second.unwrap()];
        assert_eq!(h.gateway.verify_calls(), 2);

        let paid = outcomes
            .iter()
            .filter(|o| matches!(o, ReconcileOutcome::Paid { .. }))
            .count();
        let already = outcomes
            .iter()
            .filter(|o| matches!(o, ReconcileOutcome::AlreadyPaid { invoice_id } if *invoice_id == created.invoice.id))
            .count();
        assert_eq!((paid, already), (1, 1));

        let invoice = h.lifecycle.invoice_for(created.booking.id).await.unwrap().unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn test_unknown_reference_is_acknowledged() {
        let h = harness(ScriptedGateway::new());
        let outcome = h.lifecycle.reconcile_payment("no-such-reference").await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::UnknownReference);
        assert_eq!(h.gateway.verify_calls(), 0);
    }

    #[tokio::test]
    async fn test_amount_mismatch_leaves_invoice_pending() {
        let h = harness(ScriptedGateway::new());
        let package = seed_package(&h.store).await;
        let created = h.lifecycle.create_booking(request(&package.id.to_string())).await.unwrap();
        let reference = created.invoice.paystack_reference.clone();
        h.gateway.script_verify(&reference, "success", 12_100);

        let err = h.lifecycle.reconcile_payment(&reference).await.unwrap_err();
        match err {
            CoreError::AmountMismatch { expected, reported } => {
                assert_eq!(expected, 122.0);
                assert_eq!(reported, 121.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let invoice = h.lifecycle.invoice_for(created.booking.id).await.unwrap().unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Pending);
    }

    #[tokio::test]
    async fn test_unsuccessful_payment_leaves_invoice_pending() {
        let h = harness(ScriptedGateway::new());
        let package = seed_package(&h.store).await;
        let created = h.lifecycle.create_booking(request(&package.id.to_string())).await.unwrap();
        let reference = created.invoice.paystack_reference.clone();
        h.gateway.script_verify(&reference, "abandoned", 12_200);

        let err = h.lifecycle.reconcile_payment(&reference).await.unwrap_err();
        assert!(matches!(err, CoreError::PaymentNotSuccessful(status) if status == "abandoned"));
        let invoice = h.lifecycle.invoice_for(created.booking.id).await.unwrap().unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Pending);
    }

    #[tokio::test]
    async fn test_reassign_and_update() {
        let h = harness(ScriptedGateway::new());
        let package = seed_package(&h.store).await;
        let created = h.lifecycle.create_booking(request(&package.id.to_string())).await.unwrap();

        let orphan_guide = Uuid::now_v7();
        let booking = h.lifecycle.reassign_guide(created.booking.id, orphan_guide).await.unwrap();
        assert_eq!(booking.assigned_guide_id, Some(orphan_guide));

        // Dangling guide ids list without a name instead of failing.
        let view = h.lifecycle.get_booking(created.booking.id).await.unwrap();
        assert!(view.assigned_guide_name.is_none());

        let bad = h
            .lifecycle
            .update_booking(
                created.booking.id,
                BookingUpdate {
                    booking_status: Some(BookingStatus::Completed),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(bad, Err(CoreError::InvalidTransition { .. })));

        let missing = h.lifecycle.reassign_guide(Uuid::now_v7(), orphan_guide).await;
        assert!(matches!(missing, Err(CoreError::NotFound(_))));

        h.lifecycle.delete_booking(created.booking.id).await.unwrap();
        assert!(matches!(
            h.lifecycle.delete_booking(created.booking.id).await,
            Err(CoreError::NotFound(_))
        ));
    }
}
