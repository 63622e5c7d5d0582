use super::types::{BoardPosition, DragEnd, Lead, PipelineStage};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("Lead {0} is not on the board")]
    LeadNotFound(String),
    #[error("Lead {0} is already in a final stage")]
    FinalStage(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub stage: PipelineStage,
    pub title: &'static str,
    pub leads: Vec<Lead>,
}

impl BoardColumn {
    pub fn total_value(&self) -> f64 {
        self.leads.iter().map(|l| l.value).sum()
    }
}

#[derive(Debug, PartialEq)]
pub enum MoveOutcome {
    Unchanged,
    Moved(Lead),
}

/// Kanban view over pipeline leads: one column per stage, in stage order.
///
/// All mutations here are local. Pushing them to the backing store is the
/// caller's business, and a failed push never rolls a move back; the board
/// is flagged `fallback_mode` instead.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineBoard {
    pub columns: Vec<BoardColumn>,
    pub fallback_mode: bool,
}

impl PipelineBoard {
    pub fn new(leads: Vec<Lead>) -> Self {
        let mut columns: Vec<BoardColumn> = PipelineStage::ORDER
            .iter()
            .map(|stage| BoardColumn {
                stage: *stage,
                title: stage.title(),
                leads: Vec::new(),
            })
            .collect();
        for lead in leads {
            columns[lead.stage.position()].leads.push(lead);
        }
        Self {
            columns,
            fallback_mode: false,
        }
    }

    pub fn in_fallback_mode(mut self) -> Self {
        self.fallback_mode = true;
        self
    }

    pub fn column(&self, stage: PipelineStage) -> &BoardColumn {
        &self.columns[stage.position()]
    }

    fn column_mut(&mut self, stage: PipelineStage) -> &mut BoardColumn {
        &mut self.columns[stage.position()]
    }

    pub fn total_leads(&self) -> usize {
        self.columns.iter().map(|c| c.leads.len()).sum()
    }

    pub fn pipeline_value(&self) -> f64 {
        self.columns
            .iter()
            .filter(|c| c.stage != PipelineStage::Lost)
            .map(BoardColumn::total_value)
            .sum()
    }

    pub fn locate(&self, lead_id: &str) -> Option<BoardPosition> {
        self.columns.iter().find_map(|column| {
            column
                .leads
                .iter()
                .position(|l| l.id == lead_id)
                .map(|index| BoardPosition {
                    stage: column.stage,
                    index,
                })
        })
    }

    pub fn lead(&self, lead_id: &str) -> Option<&Lead> {
        self.locate(lead_id)
            .map(|pos| &self.column(pos.stage).leads[pos.index])
    }

    pub fn leads(&self) -> impl Iterator<Item = &Lead> {
        self.columns.iter().flat_map(|c| c.leads.iter())
    }

    /// Adds a lead at the top of its stage column, replacing any card with
    /// the same id.
    pub fn insert(&mut self, lead: Lead) {
        self.remove(&lead.id);
        self.column_mut(lead.stage).leads.insert(0, lead);
    }

    pub fn remove(&mut self, lead_id: &str) -> Option<Lead> {
        let pos = self.locate(lead_id)?;
        Some(self.column_mut(pos.stage).leads.remove(pos.index))
    }

    /// Applies a drag gesture. Any column may be dropped onto any other.
    ///
    /// The reported source position is trusted only when it actually holds
    /// the dragged card; otherwise the card is looked up by id.
    pub fn apply_drag_end(
        &mut self,
        event: &DragEnd,
        at: DateTime<Utc>,
    ) -> Result<MoveOutcome, BoardError> {
        let Some(destination) = event.destination else {
            return Ok(MoveOutcome::Unchanged);
        };
        if destination == event.source {
            return Ok(MoveOutcome::Unchanged);
        }

        let source_holds_card = self
            .column(event.source.stage)
            .leads
            .get(event.source.index)
            .is_some_and(|l| l.id == event.lead_id);
        let source = if source_holds_card {
            event.source
        } else {
            self.locate(&event.lead_id)
                .ok_or_else(|| BoardError::LeadNotFound(event.lead_id.clone()))?
        };
        if source == destination {
            return Ok(MoveOutcome::Unchanged);
        }

        let mut lead = self.column_mut(source.stage).leads.remove(source.index);
        lead.set_stage(destination.stage, at);

        let target = &mut self.column_mut(destination.stage).leads;
        let index = destination.index.min(target.len());
        target.insert(index, lead.clone());
        Ok(MoveOutcome::Moved(lead))
    }

    /// Moves a lead one step along the stage order, to the top of the next
    /// column.
    pub fn advance(&mut self, lead_id: &str, at: DateTime<Utc>) -> Result<Lead, BoardError> {
        let pos = self
            .locate(lead_id)
            .ok_or_else(|| BoardError::LeadNotFound(lead_id.to_string()))?;
        let next = pos
            .stage
            .next()
            .ok_or_else(|| BoardError::FinalStage(lead_id.to_string()))?;

        let mut lead = self.column_mut(pos.stage).leads.remove(pos.index);
        lead.set_stage(next, at);
        if lead.probability < next.default_probability() {
            lead.probability = next.default_probability();
        }
        self.column_mut(next).leads.insert(0, lead.clone());
        Ok(lead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::repository::placeholder_leads;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap()
    }

    fn lead(id: &str, stage: PipelineStage) -> Lead {
        let mut lead = placeholder_leads("user-1").remove(0);
        lead.id = id.to_string();
        lead.stage = stage;
        lead.activities.clear();
        lead
    }

    fn board() -> PipelineBoard {
        PipelineBoard::new(vec![
            lead("a", PipelineStage::New),
            lead("b", PipelineStage::New),
            lead("c", PipelineStage::Qualified),
            lead("d", PipelineStage::Offer),
        ])
    }

    fn pos(stage: PipelineStage, index: usize) -> BoardPosition {
        BoardPosition { stage, index }
    }

    fn columns_containing(board: &PipelineBoard, id: &str) -> Vec<PipelineStage> {
        board
            .columns
            .iter()
            .filter(|c| c.leads.iter().any(|l| l.id == id))
            .map(|c| c.stage)
            .collect()
    }

    #[test]
    fn test_columns_follow_stage_order() {
        let board = board();
        let stages: Vec<PipelineStage> = board.columns.iter().map(|c| c.stage).collect();
        assert_eq!(stages, PipelineStage::ORDER.to_vec());
        assert_eq!(board.column(PipelineStage::New).leads.len(), 2);
        assert_eq!(board.total_leads(), 4);
    }

    #[test]
    fn test_drag_moves_lead_to_exactly_one_column() {
        let mut board = board();
        let event = DragEnd {
            lead_id: "b".to_string(),
            source: pos(PipelineStage::New, 1),
            destination: Some(pos(PipelineStage::Showing, 0)),
        };

        let outcome = board.apply_drag_end(&event, now()).unwrap();
        let MoveOutcome::Moved(moved) = outcome else {
            panic!("expected a move");
        };
        assert_eq!(moved.stage, PipelineStage::Showing);
        assert_eq!(moved.updated_at, now());
        assert_eq!(columns_containing(&board, "b"), vec![PipelineStage::Showing]);
        assert_eq!(board.lead("b").unwrap().stage, PipelineStage::Showing);
        assert_eq!(board.total_leads(), 4);
    }

    #[test]
    fn test_drag_can_skip_straight_to_closed() {
        let mut board = board();
        let event = DragEnd {
            lead_id: "a".to_string(),
            source: pos(PipelineStage::New, 0),
            destination: Some(pos(PipelineStage::Closed, 0)),
        };
        assert!(matches!(
            board.apply_drag_end(&event, now()),
            Ok(MoveOutcome::Moved(_))
        ));
        assert_eq!(board.lead("a").unwrap().stage, PipelineStage::Closed);
    }

    #[test]
    fn test_drop_on_same_spot_is_noop() {
        let mut board = board();
        let before = board.lead("c").cloned();
        let event = DragEnd {
            lead_id: "c".to_string(),
            source: pos(PipelineStage::Qualified, 0),
            destination: Some(pos(PipelineStage::Qualified, 0)),
        };
        assert_eq!(board.apply_drag_end(&event, now()), Ok(MoveOutcome::Unchanged));
        assert_eq!(board.lead("c").cloned(), before);

        let outside = DragEnd {
            destination: None,
            ..event
        };
        assert_eq!(board.apply_drag_end(&outside, now()), Ok(MoveOutcome::Unchanged));
    }

    #[test]
    fn test_reorder_within_column() {
        let mut board = board();
        let event = DragEnd {
            lead_id: "a".to_string(),
            source: pos(PipelineStage::New, 0),
            destination: Some(pos(PipelineStage::New, 1)),
        };
        board.apply_drag_end(&event, now()).unwrap();
        let ids: Vec<&str> = board
            .column(PipelineStage::New)
            .leads
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(board.lead("a").unwrap().activities.is_empty());
    }

    #[test]
    fn test_stale_source_index_falls_back_to_lookup() {
        let mut board = board();
        let event = DragEnd {
            lead_id: "d".to_string(),
            source: pos(PipelineStage::New, 0),
            destination: Some(pos(PipelineStage::Negotiating, 99)),
        };
        board.apply_drag_end(&event, now()).unwrap();
        assert_eq!(columns_containing(&board, "d"), vec![PipelineStage::Negotiating]);
        assert_eq!(board.column(PipelineStage::New).leads.len(), 2);

        let unknown = DragEnd {
            lead_id: "zzz".to_string(),
            ..event
        };
        assert_eq!(
            board.apply_drag_end(&unknown, now()),
            Err(BoardError::LeadNotFound("zzz".to_string()))
        );
    }

    #[test]
    fn test_advance_respects_stage_order() {
        let mut board = board();
        let lead = board.advance("c", now()).unwrap();
        assert_eq!(lead.stage, PipelineStage::Showing);
        assert_eq!(lead.probability, PipelineStage::Showing.default_probability());
        assert_eq!(lead.activities.len(), 1);
        assert_eq!(board.column(PipelineStage::Showing).leads[0].id, "c");

        board.insert(self::lead("z", PipelineStage::Closed));
        assert_eq!(
            board.advance("z", now()),
            Err(BoardError::FinalStage("z".to_string()))
        );
        assert_eq!(
            board.advance("missing", now()),
            Err(BoardError::LeadNotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_insert_replaces_existing_card() {
        let mut board = board();
        board.insert(lead("a", PipelineStage::Offer));
        assert_eq!(columns_containing(&board, "a"), vec![PipelineStage::Offer]);
        assert_eq!(board.total_leads(), 4);
        assert!(board.remove("a").is_some());
        assert!(board.remove("a").is_none());
    }
}
