use super::repository::ContactRepository;
use super::types::Contact;
use crate::core::shared::schema::contacts;
use crate::core::shared::utils::{with_connection, DbPool};
use crate::core::shared::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::error;

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = contacts)]
struct ContactRow {
    id: String,
    owner_id: String,
    first_name: String,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    company: Option<String>,
    job_title: Option<String>,
    address: Option<String>,
    notes: Option<String>,
    tags: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContactRow {
    fn into_contact(self) -> Result<Contact, StoreError> {
        Ok(Contact {
            status: self.status.parse().map_err(StoreError::Corrupt)?,
            tags: serde_json::from_str(&self.tags).map_err(|e| {
                StoreError::Corrupt(format!("contact {} has malformed tags: {e}", self.id))
            })?,
            id: self.id,
            owner_id: self.owner_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            job_title: self.job_title,
            address: self.address,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct PgContactRepository {
    pool: DbPool,
}

impl PgContactRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Contact>, StoreError> {
        let owner_id = owner_id.to_string();
        let rows: Vec<ContactRow> = with_connection(&self.pool, move |conn| {
            contacts::table
                .filter(contacts::owner_id.eq(owner_id.as_str()))
                .order(contacts::created_at.desc())
                .select(ContactRow::as_select())
                .load(conn)
                .map_err(|e| StoreError::Query(e.to_string()))
        })
        .await?;
        rows.into_iter().map(ContactRow::into_contact).collect()
    }

    async fn insert(&self, contact: &Contact) -> Result<(), StoreError> {
        let row = ContactRow {
            id: contact.id.clone(),
            owner_id: contact.owner_id.clone(),
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            company: contact.company.clone(),
            job_title: contact.job_title.clone(),
            address: contact.address.clone(),
            notes: contact.notes.clone(),
            tags: serde_json::to_string(&contact.tags)?,
            status: contact.status.to_string(),
            created_at: contact.created_at,
            updated_at: contact.updated_at,
        };
        with_connection(&self.pool, move |conn| {
            diesel::insert_into(contacts::table)
                .values(&row)
                .execute(conn)
                .map_err(|e| {
                    error!("Failed to insert contact {}: {e}", row.id);
                    StoreError::Query(e.to_string())
                })
        })
        .await?;
        Ok(())
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), StoreError> {
        let (owner_id, contact_id) = (owner_id.to_string(), id.to_string());
        let deleted = with_connection(&self.pool, move |conn| {
            diesel::delete(
                contacts::table
                    .filter(contacts::id.eq(contact_id.as_str()))
                    .filter(contacts::owner_id.eq(owner_id.as_str())),
            )
            .execute(conn)
            .map_err(|e| StoreError::Query(e.to_string()))
        })
        .await?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("contact {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(tags: &str) -> ContactRow {
        let now = Utc::now();
        ContactRow {
            id: "c-1".to_string(),
            owner_id: "user-1".to_string(),
            first_name: "Maya".to_string(),
            last_name: None,
            email: None,
            phone: None,
            company: None,
            job_title: None,
            address: None,
            notes: None,
            tags: tags.to_string(),
            status: "lead".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_malformed_tags_are_corrupt() {
        assert_eq!(row(r#"["buyer"]"#).into_contact().unwrap().tags, vec!["buyer"]);
        let err = row("buyer").into_contact().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
        assert!(err.to_string().contains("c-1"));
    }
}
