use crate::contacts::{Contact, ContactRepository};
use crate::core::shared::StoreError;
use crate::pipeline::{Lead, PipelineRepository};
use async_trait::async_trait;

/// Stand-in for the remote tables when the configured database cannot be
/// reached at startup. Every call fails, which sends list endpoints to their
/// placeholder data.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::Connection(self.reason.clone())
    }
}

#[async_trait]
impl PipelineRepository for UnavailableStore {
    async fn list_for_owner(&self, _owner_id: &str) -> Result<Vec<Lead>, StoreError> {
        Err(self.error())
    }

    async fn insert(&self, _lead: &Lead) -> Result<(), StoreError> {
        Err(self.error())
    }

    async fn update(&self, _lead: &Lead) -> Result<(), StoreError> {
        Err(self.error())
    }

    async fn delete(&self, _owner_id: &str, _id: &str) -> Result<(), StoreError> {
        Err(self.error())
    }
}

#[async_trait]
impl ContactRepository for UnavailableStore {
    async fn list_for_owner(&self, _owner_id: &str) -> Result<Vec<Contact>, StoreError> {
        Err(self.error())
    }

    async fn insert(&self, _contact: &Contact) -> Result<(), StoreError> {
        Err(self.error())
    }

    async fn delete(&self, _owner_id: &str, _id: &str) -> Result<(), StoreError> {
        Err(self.error())
    }
}
