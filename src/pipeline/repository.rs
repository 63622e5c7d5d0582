use super::types::{Activity, ActivityKind, Lead, PipelineStage};
use crate::core::shared::StoreError;
use crate::leads::Priority;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Backing store for pipeline leads. Rows are scoped to the owning user.
#[async_trait]
pub trait PipelineRepository: Send + Sync {
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Lead>, StoreError>;

    async fn insert(&self, lead: &Lead) -> Result<(), StoreError>;

    /// Full-row overwrite keyed by id and owner.
    async fn update(&self, lead: &Lead) -> Result<(), StoreError>;

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct InMemoryPipelineRepository {
    leads: RwLock<HashMap<String, Vec<Lead>>>,
}

impl InMemoryPipelineRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PipelineRepository for InMemoryPipelineRepository {
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Lead>, StoreError> {
        let mut leads = self
            .leads
            .read()
            .await
            .get(owner_id)
            .cloned()
            .unwrap_or_default();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    async fn insert(&self, lead: &Lead) -> Result<(), StoreError> {
        self.leads
            .write()
            .await
            .entry(lead.owner_id.clone())
            .or_default()
            .push(lead.clone());
        Ok(())
    }

    async fn update(&self, lead: &Lead) -> Result<(), StoreError> {
        let mut all = self.leads.write().await;
        let existing = all
            .get_mut(&lead.owner_id)
            .and_then(|leads| leads.iter_mut().find(|l| l.id == lead.id))
            .ok_or_else(|| StoreError::NotFound(format!("pipeline lead {}", lead.id)))?;
        *existing = lead.clone();
        Ok(())
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), StoreError> {
        let mut all = self.leads.write().await;
        let leads = all
            .get_mut(owner_id)
            .ok_or_else(|| StoreError::NotFound(format!("pipeline lead {id}")))?;
        let before = leads.len();
        leads.retain(|l| l.id != id);
        if leads.len() == before {
            return Err(StoreError::NotFound(format!("pipeline lead {id}")));
        }
        Ok(())
    }
}

/// The fixed example leads shown when the pipeline table cannot be queried.
/// Ids are derived from the owner so repeated loads produce the same cards.
pub fn placeholder_leads(owner_id: &str) -> Vec<Lead> {
    let now = Utc::now();
    let sample = |n: u32,
                  name: &str,
                  email: &str,
                  phone: &str,
                  source: &str,
                  stage: PipelineStage,
                  value: f64,
                  priority: Priority,
                  interest: &str,
                  notes: &str,
                  age_days: i64| {
        let created = now - Duration::days(age_days);
        Lead {
            id: format!("{owner_id}-sample-{n}"),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            source: source.to_string(),
            stage,
            value,
            probability: stage.default_probability(),
            notes: notes.to_string(),
            created_at: created,
            updated_at: created,
            tags: vec!["sample".to_string()],
            priority,
            property_interest: interest.to_string(),
            activities: vec![Activity::new(ActivityKind::Created, "Lead created", created)],
        }
    };

    vec![
        sample(
            1,
            "Sarah Johnson",
            "sarah.johnson@example.com",
            "(555) 123-4567",
            "Website",
            PipelineStage::New,
            450_000.0,
            Priority::High,
            "3BR single family home",
            "First-time buyer, pre-approved",
            1,
        ),
        sample(
            2,
            "Michael Chen",
            "michael.chen@example.com",
            "(555) 234-5678",
            "Referral",
            PipelineStage::Qualified,
            725_000.0,
            Priority::Medium,
            "Downtown condo",
            "Relocating for work in the spring",
            6,
        ),
        sample(
            3,
            "Emily Rodriguez",
            "emily.rodriguez@example.com",
            "(555) 345-6789",
            "Open House",
            PipelineStage::Showing,
            580_000.0,
            Priority::High,
            "Townhouse near schools",
            "Second showing booked",
            12,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_set_is_fixed() {
        let first = placeholder_leads("user-1");
        let second = placeholder_leads("user-1");
        assert_eq!(first.len(), 3);
        let ids = |leads: &[Lead]| leads.iter().map(|l| l.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert!(first.iter().all(|l| l.owner_id == "user-1"));
        assert_ne!(ids(&first), ids(&placeholder_leads("user-2")));
    }

    #[tokio::test]
    async fn test_in_memory_scopes_by_owner() {
        let repo = InMemoryPipelineRepository::new();
        let mut leads = placeholder_leads("user-1");
        let mut other = placeholder_leads("user-2").remove(0);
        for lead in &leads {
            repo.insert(lead).await.unwrap();
        }
        repo.insert(&other).await.unwrap();

        assert_eq!(repo.list_for_owner("user-1").await.unwrap().len(), 3);
        assert_eq!(repo.list_for_owner("user-2").await.unwrap().len(), 1);
        assert!(repo.list_for_owner("nobody").await.unwrap().is_empty());

        leads[0].stage = PipelineStage::Closed;
        repo.update(&leads[0]).await.unwrap();
        let stored = repo.list_for_owner("user-1").await.unwrap();
        assert!(stored
            .iter()
            .any(|l| l.id == leads[0].id && l.stage == PipelineStage::Closed));

        other.owner_id = "user-1".to_string();
        assert!(repo.update(&other).await.unwrap_err().is_not_found());
        assert!(repo
            .delete("user-1", &other.id)
            .await
            .unwrap_err()
            .is_not_found());
        repo.delete("user-2", &other.id).await.unwrap();
        assert!(repo.list_for_owner("user-2").await.unwrap().is_empty());
    }
}
