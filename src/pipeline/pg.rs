use super::repository::PipelineRepository;
use super::types::Lead;
use crate::core::shared::schema::pipeline_leads;
use crate::core::shared::utils::{with_connection, DbPool};
use crate::core::shared::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::error;

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = pipeline_leads)]
struct PipelineLeadRow {
    id: String,
    owner_id: String,
    name: String,
    email: String,
    phone: String,
    source: String,
    stage: String,
    value: f64,
    probability: i32,
    notes: String,
    tags: String,
    priority: String,
    property_interest: String,
    activities: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<&Lead> for PipelineLeadRow {
    type Error = StoreError;

    fn try_from(lead: &Lead) -> Result<Self, Self::Error> {
        Ok(Self {
            id: lead.id.clone(),
            owner_id: lead.owner_id.clone(),
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            source: lead.source.clone(),
            stage: lead.stage.to_string(),
            value: lead.value,
            probability: lead.probability,
            notes: lead.notes.clone(),
            tags: serde_json::to_string(&lead.tags)?,
            priority: lead.priority.to_string(),
            property_interest: lead.property_interest.clone(),
            activities: serde_json::to_string(&lead.activities)?,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
        })
    }
}

fn decode_json<T: serde::de::DeserializeOwned>(
    id: &str,
    column: &str,
    raw: &str,
) -> Result<T, StoreError> {
    serde_json::from_str(raw)
        .map_err(|e| StoreError::Corrupt(format!("pipeline lead {id} has malformed {column}: {e}")))
}

impl TryFrom<PipelineLeadRow> for Lead {
    type Error = StoreError;

    fn try_from(row: PipelineLeadRow) -> Result<Self, Self::Error> {
        Ok(Self {
            stage: row.stage.parse().map_err(StoreError::Corrupt)?,
            priority: row.priority.parse().map_err(StoreError::Corrupt)?,
            tags: decode_json(&row.id, "tags", &row.tags)?,
            activities: decode_json(&row.id, "activities", &row.activities)?,
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            source: row.source,
            value: row.value,
            probability: row.probability,
            notes: row.notes,
            property_interest: row.property_interest,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgPipelineRepository {
    pool: DbPool,
}

impl PgPipelineRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PipelineRepository for PgPipelineRepository {
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Lead>, StoreError> {
        let owner_id = owner_id.to_string();
        let rows: Vec<PipelineLeadRow> = with_connection(&self.pool, move |conn| {
            pipeline_leads::table
                .filter(pipeline_leads::owner_id.eq(owner_id.as_str()))
                .order(pipeline_leads::created_at.desc())
                .select(PipelineLeadRow::as_select())
                .load(conn)
                .map_err(|e| StoreError::Query(e.to_string()))
        })
        .await?;
        rows.into_iter().map(Lead::try_from).collect()
    }

    async fn insert(&self, lead: &Lead) -> Result<(), StoreError> {
        let row = PipelineLeadRow::try_from(lead)?;
        with_connection(&self.pool, move |conn| {
            diesel::insert_into(pipeline_leads::table)
                .values(&row)
                .execute(conn)
                .map_err(|e| {
                    error!("Failed to insert pipeline lead {}: {e}", row.id);
                    StoreError::Query(e.to_string())
                })
        })
        .await?;
        Ok(())
    }

    async fn update(&self, lead: &Lead) -> Result<(), StoreError> {
        let row = PipelineLeadRow::try_from(lead)?;
        let updated = with_connection(&self.pool, move |conn| {
            diesel::update(
                pipeline_leads::table
                    .filter(pipeline_leads::id.eq(row.id.as_str()))
                    .filter(pipeline_leads::owner_id.eq(row.owner_id.as_str())),
            )
            .set(&row)
            .execute(conn)
            .map_err(|e| StoreError::Query(e.to_string()))
        })
        .await?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("pipeline lead {}", lead.id)));
        }
        Ok(())
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), StoreError> {
        let (owner_id, lead_id) = (owner_id.to_string(), id.to_string());
        let deleted = with_connection(&self.pool, move |conn| {
            diesel::delete(
                pipeline_leads::table
                    .filter(pipeline_leads::id.eq(lead_id.as_str()))
                    .filter(pipeline_leads::owner_id.eq(owner_id.as_str())),
            )
            .execute(conn)
            .map_err(|e| StoreError::Query(e.to_string()))
        })
        .await?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("pipeline lead {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::placeholder_leads;

    #[test]
    fn test_row_round_trip_keeps_json_columns() {
        let lead = placeholder_leads("user-1").remove(0);
        let row = PipelineLeadRow::try_from(&lead).unwrap();
        assert_eq!(Lead::try_from(row).unwrap(), lead);
    }

    #[test]
    fn test_malformed_json_columns_are_corrupt() {
        let lead = placeholder_leads("user-1").remove(0);
        let mut row = PipelineLeadRow::try_from(&lead).unwrap();
        row.tags = "[\"sample\"".to_string();
        assert!(matches!(Lead::try_from(row), Err(StoreError::Corrupt(_))));

        let mut row = PipelineLeadRow::try_from(&lead).unwrap();
        row.activities = "not json".to_string();
        let err = Lead::try_from(row).unwrap_err();
        assert!(err.to_string().contains("activities"));
    }
}
