use super::store::LeadRepository;
use super::types::{CaptureStage, CapturedLead};
use crate::core::shared::schema::captured_leads;
use crate::core::shared::utils::{with_connection, DbPool};
use crate::core::shared::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::error;

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = captured_leads)]
struct CapturedLeadRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    interested_in: String,
    message: String,
    stage: String,
    priority: String,
    captured_at: DateTime<Utc>,
    agent_email: String,
}

impl From<&CapturedLead> for CapturedLeadRow {
    fn from(lead: &CapturedLead) -> Self {
        Self {
            id: lead.id.clone(),
            first_name: lead.first_name.clone(),
            last_name: lead.last_name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            interested_in: lead.interested_in.to_string(),
            message: lead.message.clone(),
            stage: lead.stage.to_string(),
            priority: lead.priority.to_string(),
            captured_at: lead.captured_at,
            agent_email: lead.agent_email.clone(),
        }
    }
}

impl TryFrom<CapturedLeadRow> for CapturedLead {
    type Error = StoreError;

    fn try_from(row: CapturedLeadRow) -> Result<Self, Self::Error> {
        Ok(Self {
            interested_in: row.interested_in.parse().map_err(StoreError::Corrupt)?,
            stage: row.stage.parse().map_err(StoreError::Corrupt)?,
            priority: row.priority.parse().map_err(StoreError::Corrupt)?,
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            message: row.message,
            captured_at: row.captured_at,
            agent_email: row.agent_email,
        })
    }
}

pub struct PgLeadRepository {
    pool: DbPool,
}

impl PgLeadRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn query_error(e: diesel::result::Error) -> StoreError {
    match e {
        diesel::result::Error::NotFound => StoreError::NotFound("captured lead".to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

#[async_trait]
impl LeadRepository for PgLeadRepository {
    async fn add(&self, lead: CapturedLead) -> Result<(), StoreError> {
        let row = CapturedLeadRow::from(&lead);
        with_connection(&self.pool, move |conn| {
            diesel::insert_into(captured_leads::table)
                .values(&row)
                .execute(conn)
                .map_err(|e| {
                    error!("Failed to insert captured lead {}: {e}", row.id);
                    query_error(e)
                })
        })
        .await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<CapturedLead, StoreError> {
        let lead_id = id.to_string();
        let row: CapturedLeadRow = with_connection(&self.pool, move |conn| {
            captured_leads::table
                .filter(captured_leads::id.eq(lead_id.as_str()))
                .select(CapturedLeadRow::as_select())
                .first(conn)
                .map_err(query_error)
        })
        .await?;
        row.try_into()
    }

    async fn get_leads_by_agent(&self, agent_email: &str) -> Result<Vec<CapturedLead>, StoreError> {
        let agent_email = agent_email.to_string();
        let rows: Vec<CapturedLeadRow> = with_connection(&self.pool, move |conn| {
            captured_leads::table
                .filter(captured_leads::agent_email.eq(agent_email.as_str()))
                .order(captured_leads::captured_at.desc())
                .select(CapturedLeadRow::as_select())
                .load(conn)
                .map_err(query_error)
        })
        .await?;
        rows.into_iter().map(CapturedLead::try_from).collect()
    }

    async fn update_lead_stage(
        &self,
        id: &str,
        stage: CaptureStage,
    ) -> Result<CapturedLead, StoreError> {
        let lead_id = id.to_string();
        let updated = with_connection(&self.pool, move |conn| {
            diesel::update(captured_leads::table.filter(captured_leads::id.eq(lead_id.as_str())))
                .set(captured_leads::stage.eq(stage.to_string()))
                .execute(conn)
                .map_err(query_error)
        })
        .await?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("captured lead {id}")));
        }
        self.get(id).await
    }

    async fn delete_lead(&self, id: &str) -> Result<(), StoreError> {
        let lead_id = id.to_string();
        let deleted = with_connection(&self.pool, move |conn| {
            diesel::delete(captured_leads::table.filter(captured_leads::id.eq(lead_id.as_str())))
                .execute(conn)
                .map_err(query_error)
        })
        .await?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("captured lead {id}")));
        }
        Ok(())
    }
}
