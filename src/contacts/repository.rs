use super::types::{Contact, ContactStatus};
use crate::core::shared::StoreError;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Contact>, StoreError>;

    async fn insert(&self, contact: &Contact) -> Result<(), StoreError>;

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct InMemoryContactRepository {
    contacts: RwLock<HashMap<String, Vec<Contact>>>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Contact>, StoreError> {
        let mut contacts = self
            .contacts
            .read()
            .await
            .get(owner_id)
            .cloned()
            .unwrap_or_default();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(contacts)
    }

    async fn insert(&self, contact: &Contact) -> Result<(), StoreError> {
        self.contacts
            .write()
            .await
            .entry(contact.owner_id.clone())
            .or_default()
            .push(contact.clone());
        Ok(())
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), StoreError> {
        let mut all = self.contacts.write().await;
        let contacts = all
            .get_mut(owner_id)
            .ok_or_else(|| StoreError::NotFound(format!("contact {id}")))?;
        let before = contacts.len();
        contacts.retain(|c| c.id != id);
        if contacts.len() == before {
            return Err(StoreError::NotFound(format!("contact {id}")));
        }
        Ok(())
    }
}

/// Example contacts shown when the contacts table cannot be queried.
pub fn placeholder_contacts(owner_id: &str) -> Vec<Contact> {
    let now = Utc::now();
    let sample = |n: u32,
                  first: &str,
                  last: &str,
                  email: &str,
                  phone: &str,
                  company: Option<&str>,
                  status: ContactStatus,
                  age_days: i64| {
        let created = now - Duration::days(age_days);
        Contact {
            id: format!("{owner_id}-contact-{n}"),
            owner_id: owner_id.to_string(),
            first_name: first.to_string(),
            last_name: Some(last.to_string()),
            email: Some(email.to_string()),
            phone: Some(phone.to_string()),
            company: company.map(str::to_string),
            job_title: None,
            address: None,
            notes: None,
            tags: vec!["sample".to_string()],
            status,
            created_at: created,
            updated_at: created,
        }
    };

    vec![
        sample(
            1,
            "David",
            "Thompson",
            "david.thompson@example.com",
            "(555) 456-7890",
            None,
            ContactStatus::Client,
            30,
        ),
        sample(
            2,
            "Lisa",
            "Martinez",
            "lisa.martinez@example.com",
            "(555) 567-8901",
            Some("Martinez Holdings"),
            ContactStatus::Lead,
            14,
        ),
        sample(
            3,
            "Robert",
            "Williams",
            "robert.williams@example.com",
            "(555) 678-9012",
            None,
            ContactStatus::PastClient,
            90,
        ),
    ]
}
