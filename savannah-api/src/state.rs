use std::sync::Arc;
use std::time::Duration;

use savannah_core::booking::BookingStatus;
use savannah_core::payment::PaymentGateway;
use savannah_core::repository::{
    BookingRepository, GuideRepository, InvoiceRepository, KpiRepository, PackageRepository,
    UserRepository,
};
use savannah_core::storage::ObjectStore;
use savannah_order::{
    AvailabilityResolver, BookingLifecycle, KpiService, LifecycleSettings, ReferenceGenerator,
};
use savannah_shared::PageRequest;
use savannah_store::app_config::{BusinessRules, Config};
use savannah_store::{
    DbClient, MemoryStore, RedisClient, StoreBookingRepository, StoreGuideRepository,
    StoreInvoiceRepository, StoreKpiRepository, StorePackageRepository, StoreUserRepository,
    Uploader,
};

use crate::metrics::Metrics;
use crate::tokens::TokenSigner;

#[derive(Clone)]
pub struct AuthSettings {
    pub cookie_secure: bool,
    pub refresh_ttl_seconds: i64,
}

/// One handle per repository trait, backed by Postgres or the in-memory store.
#[derive(Clone)]
pub struct Repositories {
    pub packages: Arc<dyn PackageRepository>,
    pub guides: Arc<dyn GuideRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub users: Arc<dyn UserRepository>,
    pub kpis: Arc<dyn KpiRepository>,
}

impl Repositories {
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            packages: store.clone(),
            guides: store.clone(),
            bookings: store.clone(),
            invoices: store.clone(),
            users: store.clone(),
            kpis: store,
        }
    }

    pub fn postgres(db: &DbClient) -> Self {
        Self {
            packages: Arc::new(StorePackageRepository::new(db.pool.clone())),
            guides: Arc::new(StoreGuideRepository::new(db.pool.clone())),
            bookings: Arc::new(StoreBookingRepository::new(db.pool.clone())),
            invoices: Arc::new(StoreInvoiceRepository::new(db.pool.clone())),
            users: Arc::new(StoreUserRepository::new(db.pool.clone())),
            kpis: Arc::new(StoreKpiRepository::new(db.pool.clone())),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub packages: Arc<dyn PackageRepository>,
    pub guides: Arc<dyn GuideRepository>,
    pub users: Arc<dyn UserRepository>,
    pub lifecycle: Arc<BookingLifecycle>,
    pub availability: Arc<AvailabilityResolver>,
    pub kpis: Arc<KpiService>,
    pub uploader: Uploader,
    pub tokens: Arc<TokenSigner>,
    pub metrics: Arc<Metrics>,
    pub db: Option<Arc<DbClient>>,
    pub redis: Option<Arc<RedisClient>>,
    pub auth: AuthSettings,
    pub business_rules: BusinessRules,
    pub rate_limit_per_minute: i64,
    /// Outside production a 500 carries its cause under `details`.
    pub expose_internal_errors: bool,
}

impl AppState {
    pub fn build(
        config: &Config,
        repos: Repositories,
        gateway: Arc<dyn PaymentGateway>,
        objects: Arc<dyn ObjectStore>,
    ) -> anyhow::Result<Self> {
        let rules = config.business_rules.clone();
        let busy_statuses = rules
            .busy_booking_statuses
            .iter()
            .map(|s| s.parse::<BookingStatus>())
            .collect::<Result<Vec<_>, _>>()?;

        let settings = LifecycleSettings {
            currency: config.payment.currency.clone(),
            minor_unit_factor: config.payment.minor_unit_factor,
            callback_url: config.payment.callback_url.clone(),
            gateway_timeout: Duration::from_secs(config.payment.timeout_seconds),
        };

        let lifecycle = BookingLifecycle::new(
            repos.packages.clone(),
            repos.guides.clone(),
            repos.bookings.clone(),
            repos.invoices.clone(),
            gateway,
            ReferenceGenerator::new(rules.reference_prefix.clone()),
            settings,
        );
        let availability =
            AvailabilityResolver::new(repos.guides.clone(), repos.bookings.clone(), busy_statuses);
        let kpis = KpiService::new(repos.bookings.clone(), repos.kpis.clone());

        Ok(Self {
            packages: repos.packages,
            guides: repos.guides,
            users: repos.users,
            lifecycle: Arc::new(lifecycle),
            availability: Arc::new(availability),
            kpis: Arc::new(kpis),
            uploader: Uploader::new(objects, config.storage.base_prefix.clone()),
            tokens: Arc::new(TokenSigner::new(&config.auth)?),
            metrics: Arc::new(Metrics::new()?),
            db: None,
            redis: None,
            auth: AuthSettings {
                cookie_secure: config.auth.cookie_secure,
                refresh_ttl_seconds: (config.auth.refresh_ttl_days * 24 * 60 * 60) as i64,
            },
            business_rules: rules,
            rate_limit_per_minute: config.redis.rate_limit_per_minute,
            expose_internal_errors: !config.server.is_production(),
        })
    }

    pub fn with_db(mut self, db: Arc<DbClient>) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_redis(mut self, redis: Arc<RedisClient>) -> Self {
        self.redis = Some(redis);
        self
    }

    pub fn page_request(&self, page: Option<u32>, limit: Option<u32>) -> PageRequest {
        PageRequest::new(
            page,
            limit,
            self.business_rules.default_page_limit,
            self.business_rules.max_page_limit,
        )
    }
}
