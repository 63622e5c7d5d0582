pub mod error;
#[cfg(feature = "postgres")]
pub mod schema;
pub mod state;
pub mod store;
pub mod user;
pub mod utils;

pub use error::*;
pub use state::AppState;
pub use user::CurrentUser;
