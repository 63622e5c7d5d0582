//! Per-user board cache in front of the pipeline store.
//!
//! The cache lock is only held while the in-memory board is read or changed.
//! Store calls happen outside it, so a slow database stalls only the request
//! that is waiting on it.

use super::board::{BoardError, PipelineBoard};
use super::repository::placeholder_leads;
use super::types::Lead;
use crate::core::shared::AppState;
use log::{info, warn};

async fn fetch_board(state: &AppState, owner_id: &str) -> PipelineBoard {
    match state.pipeline.list_for_owner(owner_id).await {
        Ok(leads) => PipelineBoard::new(leads),
        Err(e) => {
            info!("Pipeline query failed for user {owner_id} ({e}), showing sample leads");
            PipelineBoard::new(placeholder_leads(owner_id)).in_fallback_mode()
        }
    }
}

/// Snapshot of the owner's board. Loads it from the store when it is not
/// cached yet or `refresh` is set; a failed query yields the placeholder
/// leads in fallback mode.
pub async fn load_board(state: &AppState, owner_id: &str, refresh: bool) -> PipelineBoard {
    if !refresh {
        if let Some(board) = state.boards.lock().await.get(owner_id) {
            return board.clone();
        }
    }

    let fetched = fetch_board(state, owner_id).await;
    let mut boards = state.boards.lock().await;
    if refresh {
        boards.insert(owner_id.to_string(), fetched.clone());
        fetched
    } else {
        // another request may have loaded it meanwhile; keep its edits
        boards
            .entry(owner_id.to_string())
            .or_insert(fetched)
            .clone()
    }
}

/// Runs `change` against the owner's cached board, loading it first.
pub async fn with_board<T>(
    state: &AppState,
    owner_id: &str,
    change: impl FnOnce(&mut PipelineBoard) -> T,
) -> T {
    let loaded = load_board(state, owner_id, false).await;
    let mut boards = state.boards.lock().await;
    let board = boards.entry(owner_id.to_string()).or_insert(loaded);
    change(board)
}

async fn enter_fallback_mode(state: &AppState, owner_id: &str) {
    if let Some(board) = state.boards.lock().await.get_mut(owner_id) {
        board.fallback_mode = true;
    }
}

/// Pushes a locally changed lead to the store. Failure is logged and flips
/// the board into fallback mode; the local change stays.
pub async fn push_update(state: &AppState, lead: &Lead) -> bool {
    match state.pipeline.update(lead).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Could not save lead {} to pipeline store: {e}", lead.id);
            enter_fallback_mode(state, &lead.owner_id).await;
            false
        }
    }
}

/// Stores a new lead and puts it at the top of its column on the owner's
/// board. Returns whether the store accepted it.
pub async fn add_lead(state: &AppState, lead: Lead) -> bool {
    let stored = match state.pipeline.insert(&lead).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Could not save lead {} to pipeline store: {e}", lead.id);
            false
        }
    };

    let owner_id = lead.owner_id.clone();
    with_board(state, &owner_id, |board| {
        board.insert(lead);
        if !stored {
            board.fallback_mode = true;
        }
    })
    .await;
    stored
}

/// Takes a lead off the owner's board, then deletes it from the store on a
/// best-effort basis.
pub async fn remove_lead(state: &AppState, owner_id: &str, lead_id: &str) -> Result<Lead, BoardError> {
    let removed = with_board(state, owner_id, |board| board.remove(lead_id))
        .await
        .ok_or_else(|| BoardError::LeadNotFound(lead_id.to_string()))?;

    if let Err(e) = state.pipeline.delete(owner_id, lead_id).await {
        warn!("Could not delete lead {lead_id} from pipeline store: {e}");
        enter_fallback_mode(state, owner_id).await;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::InMemoryContactRepository;
    use crate::core::config::AppConfig;
    use crate::core::shared::store::UnavailableStore;
    use crate::leads::InMemoryLeadRepository;
    use crate::pipeline::{InMemoryPipelineRepository, PipelineRepository, PipelineStage};
    use std::sync::Arc;

    fn state_with(pipeline: Arc<dyn PipelineRepository>) -> AppState {
        AppState::new(
            AppConfig::default(),
            Arc::new(InMemoryLeadRepository::new()),
            pipeline,
            Arc::new(InMemoryContactRepository::new()),
        )
    }

    fn sample(owner: &str) -> Lead {
        let mut lead = placeholder_leads(owner).remove(0);
        lead.id = "lead-1".to_string();
        lead
    }

    #[tokio::test]
    async fn test_remove_deletes_from_board_and_store() {
        let repo = Arc::new(InMemoryPipelineRepository::new());
        let state = state_with(repo.clone());
        assert!(add_lead(&state, sample("u1")).await);

        let removed = remove_lead(&state, "u1", "lead-1").await.unwrap();
        assert_eq!(removed.id, "lead-1");
        assert!(repo.list_for_owner("u1").await.unwrap().is_empty());

        let board = load_board(&state, "u1", false).await;
        assert_eq!(board.total_leads(), 0);
        assert!(!board.fallback_mode);
        assert_eq!(
            remove_lead(&state, "u1", "lead-1").await.unwrap_err(),
            BoardError::LeadNotFound("lead-1".to_string())
        );
    }

    #[tokio::test]
    async fn test_failed_store_delete_keeps_local_removal() {
        let state = state_with(Arc::new(UnavailableStore::new("offline")));
        let board = load_board(&state, "u1", false).await;
        assert_eq!(board.total_leads(), 3);

        remove_lead(&state, "u1", "u1-sample-1").await.unwrap();
        let board = load_board(&state, "u1", false).await;
        assert_eq!(board.total_leads(), 2);
        assert!(board.fallback_mode);
        assert!(board.lead("u1-sample-1").is_none());
    }

    #[tokio::test]
    async fn test_failed_update_flags_fallback_without_rollback() {
        let state = state_with(Arc::new(UnavailableStore::new("offline")));
        let lead = with_board(&state, "u1", |board| board.advance("u1-sample-1", chrono::Utc::now()))
            .await
            .unwrap();
        assert!(!push_update(&state, &lead).await);

        let board = load_board(&state, "u1", false).await;
        assert!(board.fallback_mode);
        assert_eq!(board.lead("u1-sample-1").unwrap().stage, PipelineStage::Contacted);
    }

    #[tokio::test]
    async fn test_refresh_reloads_from_store() {
        let repo = Arc::new(InMemoryPipelineRepository::new());
        let state = state_with(repo.clone());
        assert_eq!(load_board(&state, "u1", false).await.total_leads(), 0);

        repo.insert(&sample("u1")).await.unwrap();
        assert_eq!(load_board(&state, "u1", false).await.total_leads(), 0);
        assert_eq!(load_board(&state, "u1", true).await.total_leads(), 1);
    }
}
