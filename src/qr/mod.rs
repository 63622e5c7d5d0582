//! Agent QR codes: payload encoding, rendering onto a pixel surface and the
//! HTTP endpoints that expose both.

pub mod encoder;
pub mod handlers;
pub mod renderer;
pub mod surface;

pub use encoder::{encode_capture_url, encode_contact_card, encode_payload, ContactInfo, PayloadMode};
pub use handlers::configure_qr_routes;
pub use renderer::{encode_png, QrRenderer, RenderOutcome};
pub use surface::{Bitmap, SurfaceSource};
