//! Public lead-capture form opened from an agent's QR code.

pub mod form;
pub mod handlers;
pub mod page;
pub mod params;

pub use form::{CaptureError, CaptureSubmission};
pub use handlers::configure_capture_routes;
pub use params::AgentContext;
