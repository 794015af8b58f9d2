use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use savannah_catalog::Addon;
use savannah_core::booking::{Booking, BookingFilter, BookingStatus};
use savannah_core::invoice::Invoice;
use savannah_core::kpi::BookingSummary;
use savannah_core::repository::{BookingRepository, InvoiceRepository};
use savannah_core::{CoreError, CoreResult};
use savannah_shared::{DateWindow, Page, PageRequest};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::{db_error, from_json, parse_column, to_json};
use crate::guide_repo::escape_like;
use crate::sort_clause;

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    reference: String,
    package_id: Uuid,
    package_title: String,
    guest_name: String,
    guest_phone: String,
    guest_email: String,
    tour_date: DateTime<Utc>,
    num_guests: i32,
    total_amount: f64,
    payment_status: String,
    booking_status: String,
    assigned_guide_id: Option<Uuid>,
    addons: Value,
    invoice_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            reference: row.reference,
            package_id: row.package_id,
            package_title: row.package_title,
            guest_name: row.guest_name,
            guest_phone: row.guest_phone,
            guest_email: row.guest_email,
            tour_date: row.tour_date,
            num_guests: row.num_guests,
            total_amount: row.total_amount,
            payment_status: parse_column("payment_status", &row.payment_status)?,
            booking_status: parse_column("booking_status", &row.booking_status)?,
            assigned_guide_id: row.assigned_guide_id,
            addons: from_json::<Vec<Addon>>("addons", row.addons)?,
            invoice_id: row.invoice_id,
            created_at: row.created_at,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, reference, package_id, package_title, guest_name, guest_phone, guest_email, \
     tour_date, num_guests, total_amount, payment_status, booking_status, assigned_guide_id, addons, \
     invoice_id, created_at";

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &BookingFilter) {
    qb.push(" WHERE TRUE");
    if let Some(name) = non_empty(&filter.guest_name) {
        qb.push(" AND guest_name ILIKE ")
            .push_bind(format!("%{}%", escape_like(name)));
    }
    if let Some(email) = non_empty(&filter.guest_email) {
        qb.push(" AND guest_email ILIKE ")
            .push_bind(format!("%{}%", escape_like(email)));
    }
    if let Some(package_id) = filter.package_id {
        qb.push(" AND package_id = ").push_bind(package_id);
    }
    if let Some(status) = filter.payment_status {
        qb.push(" AND payment_status = ").push_bind(status.as_str());
    }
    if let Some(status) = filter.booking_status {
        qb.push(" AND booking_status = ").push_bind(status.as_str());
    }
    if let Some(window) = &filter.tour_date {
        qb.push(" AND tour_date >= ")
            .push_bind(window.start())
            .push(" AND tour_date < ")
            .push_bind(window.end());
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    bookings: i64,
    successful_payments: i64,
    pending_payments: i64,
    revenue: f64,
}

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn create_booking_with_invoice(&self, booking: &Booking, invoice: &Invoice) -> CoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query(
            r#"
            INSERT INTO bookings (id, reference, package_id, package_title, guest_name, guest_phone,
                                  guest_email, tour_date, num_guests, total_amount, payment_status,
                                  booking_status, assigned_guide_id, addons, invoice_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.reference)
        .bind(booking.package_id)
        .bind(&booking.package_title)
        .bind(&booking.guest_name)
        .bind(&booking.guest_phone)
        .bind(&booking.guest_email)
        .bind(booking.tour_date)
        .bind(booking.num_guests)
        .bind(booking.total_amount)
        .bind(booking.payment_status.as_str())
        .bind(booking.booking_status.as_str())
        .bind(booking.assigned_guide_id)
        .bind(to_json(&booking.addons)?)
        .bind(booking.invoice_id)
        .bind(booking.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        sqlx::query(
            r#"
            INSERT INTO invoices (id, booking_id, customer_email, amount, currency, status,
                                  paystack_reference, paystack_authorization_url, paystack_access_code,
                                  paid_at, redirect_url, is_requested, extra, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(invoice.id)
        .bind(invoice.booking_id)
        .bind(&invoice.customer_email)
        .bind(invoice.amount)
        .bind(&invoice.currency)
        .bind(invoice.status.as_str())
        .bind(&invoice.paystack_reference)
        .bind(&invoice.paystack_authorization_url)
        .bind(&invoice.paystack_access_code)
        .bind(invoice.paid_at)
        .bind(&invoice.redirect_url)
        .bind(invoice.is_requested)
        .bind(&invoice.extra)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> CoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(Booking::try_from).transpose()
    }

    async fn list_bookings(&self, filter: &BookingFilter, page: &PageRequest) -> CoreResult<Page<Booking>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bookings");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {BOOKING_COLUMNS} FROM bookings"));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY ")
            .push(sort_clause(page, &["id", "created_at", "tour_date", "total_amount", "guest_name"]))
            .push(" LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let rows = select
            .build_query_as::<BookingRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        let items = rows.into_iter().map(Booking::try_from).collect::<CoreResult<Vec<_>>>()?;
        Ok(Page::new(items, total as u64, page))
    }

    async fn update_booking(&self, booking: &Booking) -> CoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET guest_name = $2, guest_phone = $3, guest_email = $4, tour_date = $5, num_guests = $6,
                payment_status = $7, booking_status = $8, assigned_guide_id = $9, addons = $10
            WHERE id = $1
            "#,
        )
        .bind(booking.id)
        .bind(&booking.guest_name)
        .bind(&booking.guest_phone)
        .bind(&booking.guest_email)
        .bind(booking.tour_date)
        .bind(booking.num_guests)
        .bind(booking.payment_status.as_str())
        .bind(booking.booking_status.as_str())
        .bind(booking.assigned_guide_id)
        .bind(to_json(&booking.addons)?)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Booking {}", booking.id)));
        }
        Ok(())
    }

    async fn delete_booking(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn busy_guide_ids(
        &self,
        window: &DateWindow,
        statuses: &[BookingStatus],
    ) -> CoreResult<HashSet<Uuid>> {
        let statuses: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT assigned_guide_id FROM bookings
            WHERE assigned_guide_id IS NOT NULL
              AND tour_date >= $1 AND tour_date < $2
              AND booking_status = ANY($3)
            "#,
        )
        .bind(window.start())
        .bind(window.end())
        .bind(statuses)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(ids.into_iter().collect())
    }

    async fn booking_summary(&self, window: Option<&DateWindow>) -> CoreResult<BookingSummary> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT COUNT(*) AS bookings,
                   COUNT(*) FILTER (WHERE payment_status = 'success') AS successful_payments,
                   COUNT(*) FILTER (WHERE payment_status = 'pending') AS pending_payments,
                   COALESCE(SUM(total_amount) FILTER (WHERE payment_status = 'success'), 0)::DOUBLE PRECISION AS revenue
            FROM bookings
            WHERE ($1::TIMESTAMPTZ IS NULL OR created_at >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR created_at < $2)
            "#,
        )
        .bind(window.map(|w| w.start()))
        .bind(window.map(|w| w.end()))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(BookingSummary {
            bookings: row.bookings as u64,
            successful_payments: row.successful_payments as u64,
            pending_payments: row.pending_payments as u64,
            revenue: row.revenue,
        })
    }
}

pub struct StoreInvoiceRepository {
    pool: PgPool,
}

impl StoreInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: Uuid,
    booking_id: Uuid,
    customer_email: String,
    amount: f64,
    currency: String,
    status: String,
    paystack_reference: String,
    paystack_authorization_url: Option<String>,
    paystack_access_code: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    redirect_url: Option<String>,
    is_requested: bool,
    extra: Option<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = CoreError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Invoice {
            id: row.id,
            booking_id: row.booking_id,
            customer_email: row.customer_email,
            amount: row.amount,
            currency: row.currency,
            status: parse_column("status", &row.status)?,
            paystack_reference: row.paystack_reference,
            paystack_authorization_url: row.paystack_authorization_url,
            paystack_access_code: row.paystack_access_code,
            paid_at: row.paid_at,
            redirect_url: row.redirect_url,
            is_requested: row.is_requested,
            extra: row.extra,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const INVOICE_COLUMNS: &str = "id, booking_id, customer_email, amount, currency, status, paystack_reference, \
     paystack_authorization_url, paystack_access_code, paid_at, redirect_url, is_requested, extra, \
     created_at, updated_at";

#[async_trait]
impl InvoiceRepository for StoreInvoiceRepository {
    async fn get_invoice(&self, id: Uuid) -> CoreResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(Invoice::try_from).transpose()
    }

    async fn find_by_reference(&self, reference: &str) -> CoreResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE paystack_reference = $1"
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        row.map(Invoice::try_from).transpose()
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> CoreResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE booking_id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        row.map(Invoice::try_from).transpose()
    }

    async fn update_invoice(&self, invoice: &Invoice) -> CoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET status = $2, paystack_authorization_url = $3, paystack_access_code = $4, paid_at = $5,
                redirect_url = $6, is_requested = $7, extra = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(invoice.id)
        .bind(invoice.status.as_str())
        .bind(&invoice.paystack_authorization_url)
        .bind(&invoice.paystack_access_code)
        .bind(invoice.paid_at)
        .bind(&invoice.redirect_url)
        .bind(invoice.is_requested)
        .bind(&invoice.extra)
        .bind(invoice.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Invoice {}", invoice.id)));
        }
        Ok(())
    }

    async fn mark_paid_if_unpaid(
        &self,
        id: Uuid,
        paid_at: DateTime<Utc>,
        extra: Option<Value>,
    ) -> CoreResult<bool> {
        // Only one concurrent delivery can match `status <> 'paid'`.
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET status = 'paid', paid_at = $2, extra = COALESCE($3, extra), updated_at = NOW()
            WHERE id = $1 AND status <> 'paid'
            "#,
        )
        .bind(id)
        .bind(paid_at)
        .bind(extra)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(result.rows_affected() == 1)
    }
}
