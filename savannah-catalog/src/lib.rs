pub mod guide;
pub mod package;
pub mod slug;

pub use guide::{AvailabilityOverride, Guide, GuideFilter, GuideStatus, GuideUpdate, NewGuide};
pub use package::{Addon, NewPackage, Package, PackageStatus, PackageUpdate};
pub use slug::slugify;

/// Parse failure for the lowercase status strings the catalog stores.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} status: {value}")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}
