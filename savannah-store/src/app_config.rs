use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub payment: PaymentConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn default_environment() -> String {
    "development".into()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres URL, or `memory` for the in-process store.
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url == "memory"
    }
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: Option<String>,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: i64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: None,
            rate_limit_per_minute: default_rate_limit(),
        }
    }
}

fn default_rate_limit() -> i64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_ttl_seconds: u64,
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: u64,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default)]
    pub cookie_secure: bool,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

fn default_access_ttl() -> u64 {
    15 * 60
}

fn default_refresh_ttl_days() -> u64 {
    90
}

fn default_algorithm() -> String {
    "HS512".into()
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    pub secret_key: String,
    #[serde(default = "default_paystack_url")]
    pub base_url: String,
    pub callback_url: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_minor_unit_factor")]
    pub minor_unit_factor: i64,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_paystack_url() -> String {
    "https://api.paystack.co".into()
}

fn default_currency() -> String {
    "GHS".into()
}

fn default_minor_unit_factor() -> i64 {
    100
}

fn default_timeout() -> u64 {
    15
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Empty bucket keeps uploads in memory.
    #[serde(default)]
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_base_prefix")]
    pub base_prefix: String,
    pub public_base_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_region(),
            base_prefix: default_base_prefix(),
            public_base_url: None,
        }
    }
}

fn default_region() -> String {
    "eu-west-1".into()
}

fn default_base_prefix() -> String {
    "uploads".into()
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Booking statuses that hold a guide for the tour date.
    #[serde(default = "default_busy_statuses")]
    pub busy_booking_statuses: Vec<String>,
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: String,
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u32,
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: u32,
    #[serde(default = "default_availability_page_limit")]
    pub availability_page_limit: u32,
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            busy_booking_statuses: default_busy_statuses(),
            reference_prefix: default_reference_prefix(),
            default_page_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
            availability_page_limit: default_availability_page_limit(),
        }
    }
}

fn default_busy_statuses() -> Vec<String> {
    vec!["pending".into(), "confirmed".into()]
}

fn default_reference_prefix() -> String {
    "tour-INV".into()
}

fn default_page_limit() -> u32 {
    10
}

fn default_max_page_limit() -> u32 {
    100
}

fn default_availability_page_limit() -> u32 {
    20
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Developer-local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // SAVANNAH__AUTH__JWT_SECRET=... sets auth.jwt_secret
            .add_source(
                config::Environment::with_prefix("SAVANNAH")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("business_rules.busy_booking_statuses")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_fills_defaults() {
        let cfg: Config = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                port = 8080

                [database]
                url = "memory"

                [auth]
                jwt_secret = "dev-secret"

                [payment]
                secret_key = "sk_test"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(cfg.database.is_memory());
        assert!(!cfg.server.is_production());
        assert_eq!(cfg.auth.access_ttl_seconds, 900);
        assert_eq!(cfg.auth.refresh_ttl_days, 90);
        assert_eq!(cfg.payment.currency, "GHS");
        assert_eq!(cfg.payment.minor_unit_factor, 100);
        assert_eq!(cfg.business_rules.busy_booking_statuses, vec!["pending", "confirmed"]);
        assert_eq!(cfg.business_rules.reference_prefix, "tour-INV");
        assert!(cfg.redis.url.is_none());
        assert!(cfg.storage.bucket.is_empty());
    }
}
