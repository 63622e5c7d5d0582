//! Captured-lead repositories.
//!
//! `InMemoryLeadRepository` backs tests and demo runs, `JsonFileLeadRepository`
//! keeps the list on local disk between restarts, and the Postgres flavour
//! lives in `leads::pg`.

use super::types::{CaptureStage, CapturedLead};
use crate::core::shared::StoreError;
use async_trait::async_trait;
use log::{error, trace};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Appends the lead. No duplicate detection.
    async fn add(&self, lead: CapturedLead) -> Result<(), StoreError>;

    async fn get(&self, id: &str) -> Result<CapturedLead, StoreError>;

    /// Leads whose `agent_email` equals `agent_email` exactly, newest first.
    async fn get_leads_by_agent(&self, agent_email: &str) -> Result<Vec<CapturedLead>, StoreError>;

    /// Overwrites the stage unconditionally.
    async fn update_lead_stage(
        &self,
        id: &str,
        stage: CaptureStage,
    ) -> Result<CapturedLead, StoreError>;

    async fn delete_lead(&self, id: &str) -> Result<(), StoreError>;
}

fn select_by_agent(leads: &[CapturedLead], agent_email: &str) -> Vec<CapturedLead> {
    let mut selected: Vec<CapturedLead> = leads
        .iter()
        .filter(|lead| lead.agent_email == agent_email)
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
    selected
}

fn set_stage(
    leads: &mut [CapturedLead],
    id: &str,
    stage: CaptureStage,
) -> Result<CapturedLead, StoreError> {
    let lead = leads
        .iter_mut()
        .find(|lead| lead.id == id)
        .ok_or_else(|| StoreError::NotFound(format!("captured lead {id}")))?;
    lead.stage = stage;
    Ok(lead.clone())
}

fn remove(leads: &mut Vec<CapturedLead>, id: &str) -> Result<(), StoreError> {
    let before = leads.len();
    leads.retain(|lead| lead.id != id);
    if leads.len() == before {
        return Err(StoreError::NotFound(format!("captured lead {id}")));
    }
    Ok(())
}

fn find(leads: &[CapturedLead], id: &str) -> Result<CapturedLead, StoreError> {
    leads
        .iter()
        .find(|lead| lead.id == id)
        .cloned()
        .ok_or_else(|| StoreError::NotFound(format!("captured lead {id}")))
}

#[derive(Default)]
pub struct InMemoryLeadRepository {
    leads: RwLock<Vec<CapturedLead>>,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leads(leads: Vec<CapturedLead>) -> Self {
        Self {
            leads: RwLock::new(leads),
        }
    }

    pub async fn len(&self) -> usize {
        self.leads.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.leads.read().await.is_empty()
    }
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn add(&self, lead: CapturedLead) -> Result<(), StoreError> {
        self.leads.write().await.push(lead);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<CapturedLead, StoreError> {
        find(&self.leads.read().await, id)
    }

    async fn get_leads_by_agent(&self, agent_email: &str) -> Result<Vec<CapturedLead>, StoreError> {
        Ok(select_by_agent(&self.leads.read().await, agent_email))
    }

    async fn update_lead_stage(
        &self,
        id: &str,
        stage: CaptureStage,
    ) -> Result<CapturedLead, StoreError> {
        set_stage(&mut self.leads.write().await, id, stage)
    }

    async fn delete_lead(&self, id: &str) -> Result<(), StoreError> {
        remove(&mut *self.leads.write().await, id)
    }
}

/// Captured leads persisted as a JSON array in a single file.
///
/// The whole list is rewritten after every mutation through a sibling
/// temporary file and a rename, so a crash leaves either the old or the new
/// list on disk. A mutation only becomes visible once the new list is on
/// disk.
pub struct JsonFileLeadRepository {
    path: PathBuf,
    leads: RwLock<Vec<CapturedLead>>,
}

impl JsonFileLeadRepository {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let leads = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                error!("Failed to read leads file {}: {e}", path.display());
                return Err(e.into());
            }
        };
        trace!("Loaded {} captured leads from {}", leads.len(), path.display());
        Ok(Self {
            path,
            leads: RwLock::new(leads),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, leads: &[CapturedLead]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let body = serde_json::to_vec_pretty(leads)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            error!("Failed to replace leads file {}: {e}", self.path.display());
            StoreError::Io(e)
        })
    }
}

#[async_trait]
impl LeadRepository for JsonFileLeadRepository {
    async fn add(&self, lead: CapturedLead) -> Result<(), StoreError> {
        let mut leads = self.leads.write().await;
        let mut next = leads.clone();
        next.push(lead);
        self.persist(&next).await?;
        *leads = next;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<CapturedLead, StoreError> {
        find(&self.leads.read().await, id)
    }

    async fn get_leads_by_agent(&self, agent_email: &str) -> Result<Vec<CapturedLead>, StoreError> {
        Ok(select_by_agent(&self.leads.read().await, agent_email))
    }

    async fn update_lead_stage(
        &self,
        id: &str,
        stage: CaptureStage,
    ) -> Result<CapturedLead, StoreError> {
        let mut leads = self.leads.write().await;
        let mut next = leads.clone();
        let updated = set_stage(&mut next, id, stage)?;
        self.persist(&next).await?;
        *leads = next;
        Ok(updated)
    }

    async fn delete_lead(&self, id: &str) -> Result<(), StoreError> {
        let mut leads = self.leads.write().await;
        let mut next = leads.clone();
        remove(&mut next, id)?;
        self.persist(&next).await?;
        *leads = next;
        Ok(())
    }
}
