pub mod availability;
pub mod gateway;
pub mod kpi;
pub mod lifecycle;
pub mod manager;
pub mod reference;

pub use availability::AvailabilityResolver;
pub use gateway::ScriptedGateway;
pub use kpi::KpiService;
pub use lifecycle::{BookingLifecycle, CreatedBooking, LifecycleSettings, ReconcileOutcome};
pub use manager::BookingManager;
pub use reference::ReferenceGenerator;
