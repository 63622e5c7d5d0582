//! Leads captured through the public form, kept per referring agent.

pub mod convert;
pub mod handlers;
#[cfg(feature = "postgres")]
pub mod pg;
pub mod store;
pub mod types;

pub use convert::{convert_to_pipeline_lead, QR_CAPTURE_SOURCE, QR_CAPTURE_TAG};
pub use handlers::configure_leads_routes;
#[cfg(feature = "postgres")]
pub use pg::PgLeadRepository;
pub use store::{InMemoryLeadRepository, JsonFileLeadRepository, LeadRepository};
pub use types::{CaptureStage, CapturedLead, Interest, Priority, UpdateStageRequest};
