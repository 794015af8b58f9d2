pub mod auth;
pub mod error_detail;
pub mod rate_limit;

pub use auth::{bearer_token, require_admin, require_kpi_access, require_staff};
pub use error_detail::internal_detail_middleware;
pub use rate_limit::rate_limit_middleware;
