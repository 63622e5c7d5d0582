//! Per-user contact book cache. Store calls run without the cache lock held.

use super::book::ContactBook;
use super::types::Contact;
use crate::core::shared::AppState;
use log::{info, warn};

async fn fetch_book(state: &AppState, owner_id: &str) -> ContactBook {
    match state.contacts.list_for_owner(owner_id).await {
        Ok(contacts) => ContactBook::new(contacts),
        Err(e) => {
            info!("Contacts query failed for user {owner_id} ({e}), showing sample contacts");
            ContactBook::placeholder(owner_id)
        }
    }
}

/// Snapshot of the owner's contact book, loading it when not cached or when
/// `refresh` is set.
pub async fn load_book(state: &AppState, owner_id: &str, refresh: bool) -> ContactBook {
    if !refresh {
        if let Some(book) = state.contact_books.lock().await.get(owner_id) {
            return book.clone();
        }
    }

    let fetched = fetch_book(state, owner_id).await;
    let mut books = state.contact_books.lock().await;
    if refresh {
        books.insert(owner_id.to_string(), fetched.clone());
        fetched
    } else {
        books
            .entry(owner_id.to_string())
            .or_insert(fetched)
            .clone()
    }
}

async fn with_book<T>(
    state: &AppState,
    owner_id: &str,
    change: impl FnOnce(&mut ContactBook) -> T,
) -> T {
    let loaded = load_book(state, owner_id, false).await;
    let mut books = state.contact_books.lock().await;
    let book = books.entry(owner_id.to_string()).or_insert(loaded);
    change(book)
}

async fn enter_fallback_mode(state: &AppState, owner_id: &str) {
    if let Some(book) = state.contact_books.lock().await.get_mut(owner_id) {
        book.fallback_mode = true;
    }
}

/// Shows the contact at the top of the book, then saves it. A failed save
/// keeps the local copy and flags fallback mode.
pub async fn add_contact(state: &AppState, contact: Contact) -> bool {
    let owner_id = contact.owner_id.clone();
    with_book(state, &owner_id, |book| book.add(contact.clone())).await;

    match state.contacts.insert(&contact).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Could not save contact {}: {e}", contact.id);
            enter_fallback_mode(state, &owner_id).await;
            false
        }
    }
}

/// Drops the contact from the book, then from the store on a best-effort
/// basis. `None` when the book has no such contact.
pub async fn remove_contact(state: &AppState, owner_id: &str, contact_id: &str) -> Option<Contact> {
    let removed = with_book(state, owner_id, |book| book.remove(contact_id)).await?;

    if let Err(e) = state.contacts.delete(owner_id, contact_id).await {
        warn!("Could not delete contact {contact_id} from store: {e}");
        enter_fallback_mode(state, owner_id).await;
    }
    Some(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::book::build_contact;
    use crate::contacts::{ContactRepository, CreateContactRequest, InMemoryContactRepository};
    use crate::core::config::AppConfig;
    use crate::core::shared::store::UnavailableStore;
    use crate::leads::InMemoryLeadRepository;
    use crate::pipeline::InMemoryPipelineRepository;
    use chrono::Utc;
    use std::sync::Arc;

    fn state_with(contacts: Arc<dyn ContactRepository>) -> AppState {
        AppState::new(
            AppConfig::default(),
            Arc::new(InMemoryLeadRepository::new()),
            Arc::new(InMemoryPipelineRepository::new()),
            contacts,
        )
    }

    fn contact(owner: &str, first: &str) -> Contact {
        let request = CreateContactRequest {
            first_name: first.to_string(),
            ..Default::default()
        };
        build_contact(owner, request, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_add_and_remove_reach_the_store() {
        let repo = Arc::new(InMemoryContactRepository::new());
        let state = state_with(repo.clone());
        let saved = contact("u1", "Maya");

        assert!(add_contact(&state, saved.clone()).await);
        assert_eq!(repo.list_for_owner("u1").await.unwrap().len(), 1);
        assert_eq!(load_book(&state, "u1", false).await.contacts[0].id, saved.id);

        assert!(remove_contact(&state, "u1", &saved.id).await.is_some());
        assert!(repo.list_for_owner("u1").await.unwrap().is_empty());
        assert!(remove_contact(&state, "u1", &saved.id).await.is_none());
        assert!(!load_book(&state, "u1", false).await.fallback_mode);
    }

    #[tokio::test]
    async fn test_offline_changes_stay_local() {
        let state = state_with(Arc::new(UnavailableStore::new("offline")));
        assert_eq!(load_book(&state, "u1", false).await.contacts.len(), 3);

        assert!(!add_contact(&state, contact("u1", "Maya")).await);
        assert_eq!(load_book(&state, "u1", false).await.contacts.len(), 4);

        assert!(remove_contact(&state, "u1", "u1-contact-2").await.is_some());
        let book = load_book(&state, "u1", false).await;
        assert_eq!(book.contacts.len(), 3);
        assert!(book.fallback_mode);
        assert!(book.contacts.iter().all(|c| c.id != "u1-contact-2"));
    }
}
