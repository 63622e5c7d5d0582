//! Agent contacts with a placeholder list when the store is unreachable.

pub mod book;
pub mod handlers;
#[cfg(feature = "postgres")]
pub mod pg;
pub mod repository;
pub mod service;
pub mod types;

pub use book::ContactBook;
pub use handlers::configure_contacts_routes;
#[cfg(feature = "postgres")]
pub use pg::PgContactRepository;
pub use repository::{placeholder_contacts, ContactRepository, InMemoryContactRepository};
pub use types::{Contact, ContactListResponse, ContactStatus, CreateContactRequest};
