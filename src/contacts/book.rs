use super::repository::placeholder_contacts;
use super::types::{Contact, CreateContactRequest};
use crate::core::shared::utils::non_blank;
use crate::core::shared::ApiError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A user's contact list as last shown, with optimistic local edits.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactBook {
    pub contacts: Vec<Contact>,
    pub fallback_mode: bool,
}

impl ContactBook {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self {
            contacts,
            fallback_mode: false,
        }
    }

    pub fn placeholder(owner_id: &str) -> Self {
        Self {
            contacts: placeholder_contacts(owner_id),
            fallback_mode: true,
        }
    }

    pub fn add(&mut self, contact: Contact) {
        self.contacts.retain(|c| c.id != contact.id);
        self.contacts.insert(0, contact);
    }

    pub fn remove(&mut self, id: &str) -> Option<Contact> {
        let index = self.contacts.iter().position(|c| c.id == id)?;
        Some(self.contacts.remove(index))
    }
}

pub fn build_contact(
    owner_id: &str,
    request: CreateContactRequest,
    at: DateTime<Utc>,
) -> Result<Contact, ApiError> {
    let first_name = non_blank(Some(&request.first_name))
        .ok_or_else(|| ApiError::Validation("first_name is required".to_string()))?;
    let email = non_blank(request.email.as_deref());
    if email.as_deref().is_some_and(|e| !e.contains('@')) {
        return Err(ApiError::Validation("email is not valid".to_string()));
    }

    Ok(Contact {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        first_name,
        last_name: non_blank(request.last_name.as_deref()),
        email,
        phone: non_blank(request.phone.as_deref()),
        company: non_blank(request.company.as_deref()),
        job_title: non_blank(request.job_title.as_deref()),
        address: non_blank(request.address.as_deref()),
        notes: non_blank(request.notes.as_deref()),
        tags: request.tags.unwrap_or_default(),
        status: request.status.unwrap_or_default(),
        created_at: at,
        updated_at: at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::ContactStatus;

    fn request(first: &str) -> CreateContactRequest {
        CreateContactRequest {
            first_name: first.to_string(),
            last_name: Some("  ".to_string()),
            email: Some("ana@example.com".to_string()),
            phone: None,
            company: Some("Bay Homes".to_string()),
            job_title: None,
            address: None,
            notes: None,
            tags: None,
            status: None,
        }
    }

    #[test]
    fn test_build_contact_normalises_blanks() {
        let contact = build_contact("user-1", request(" Ana "), Utc::now()).unwrap();
        assert_eq!(contact.first_name, "Ana");
        assert_eq!(contact.last_name, None);
        assert_eq!(contact.company.as_deref(), Some("Bay Homes"));
        assert_eq!(contact.status, ContactStatus::Active);
        assert_eq!(contact.owner_id, "user-1");
    }

    #[test]
    fn test_build_contact_requires_first_name() {
        assert!(matches!(
            build_contact("user-1", request(""), Utc::now()),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_book_add_and_remove() {
        let mut book = ContactBook::placeholder("user-1");
        assert!(book.fallback_mode);
        assert_eq!(book.contacts.len(), 3);

        let contact = build_contact("user-1", request("Ana"), Utc::now()).unwrap();
        let id = contact.id.clone();
        book.add(contact);
        assert_eq!(book.contacts[0].id, id);
        assert!(book.remove(&id).is_some());
        assert!(book.remove(&id).is_none());
        assert_eq!(book.contacts.len(), 3);
    }
}
