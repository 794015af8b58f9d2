pub mod app_config;
pub mod blob;
pub mod booking_repo;
pub mod database;
pub mod guide_repo;
pub mod kpi_repo;
pub mod memory;
pub mod package_repo;
pub mod paystack;
pub mod redis_repo;
pub mod user_repo;

pub use blob::{S3ObjectStore, UploadedObject, Uploader};
pub use booking_repo::{StoreBookingRepository, StoreInvoiceRepository};
pub use database::DbClient;
pub use guide_repo::StoreGuideRepository;
pub use kpi_repo::StoreKpiRepository;
pub use memory::{MemoryObjectStore, MemoryStore};
pub use package_repo::StorePackageRepository;
pub use paystack::PaystackClient;
pub use redis_repo::RedisClient;
pub use user_repo::StoreUserRepository;

use savannah_shared::{PageRequest, SortDir};

/// `ORDER BY` body for a page request. Unknown sort keys fall back to `id`;
/// `id` is always the final tie-break.
pub(crate) fn sort_clause(page: &PageRequest, allowed: &[&str]) -> String {
    let dir = match page.sort_dir {
        SortDir::Asc => "ASC",
        SortDir::Desc => "DESC",
    };
    let key = allowed
        .iter()
        .find(|col| **col == page.sort_key)
        .copied()
        .unwrap_or("id");
    if key == "id" {
        format!("id {dir}")
    } else {
        format!("{key} {dir}, id {dir}")
    }
}
