use crate::leads::Priority;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sales pipeline stages in board order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    #[default]
    New,
    Contacted,
    Qualified,
    Showing,
    Offer,
    Negotiating,
    Closed,
    Lost,
}

impl PipelineStage {
    pub const ORDER: [PipelineStage; 8] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::Showing,
        Self::Offer,
        Self::Negotiating,
        Self::Closed,
        Self::Lost,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Showing => "showing",
            Self::Offer => "offer",
            Self::Negotiating => "negotiating",
            Self::Closed => "closed",
            Self::Lost => "lost",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::New => "New Leads",
            Self::Contacted => "Contacted",
            Self::Qualified => "Qualified",
            Self::Showing => "Showing",
            Self::Offer => "Offer Made",
            Self::Negotiating => "Negotiating",
            Self::Closed => "Closed",
            Self::Lost => "Lost",
        }
    }

    pub fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default()
    }

    /// Stage reached by the single-step "advance" action. `Closed` and `Lost`
    /// are terminal.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Closed | Self::Lost => None,
            stage => Self::ORDER.get(stage.position() + 1).copied(),
        }
    }

    pub fn default_probability(self) -> i32 {
        match self {
            Self::New => 10,
            Self::Contacted => 20,
            Self::Qualified => 40,
            Self::Showing => 50,
            Self::Offer => 70,
            Self::Negotiating => 80,
            Self::Closed => 100,
            Self::Lost => 0,
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PipelineStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ORDER
            .into_iter()
            .find(|stage| stage.id() == s.trim())
            .ok_or_else(|| format!("unknown pipeline stage '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Created,
    StageChange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub kind: ActivityKind,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(kind: ActivityKind, description: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            description: description.into(),
            occurred_at: at,
        }
    }
}

/// A lead as worked on the pipeline board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub source: String,
    pub stage: PipelineStage,
    pub value: f64,
    pub probability: i32,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub property_interest: String,
    pub activities: Vec<Activity>,
}

impl Lead {
    /// Moves the lead to `stage`, stamping `updated_at` and logging the
    /// change on the activity trail.
    pub fn set_stage(&mut self, stage: PipelineStage, at: DateTime<Utc>) {
        if self.stage != stage {
            self.activities.push(Activity::new(
                ActivityKind::StageChange,
                format!("Moved from {} to {}", self.stage.title(), stage.title()),
                at,
            ));
        }
        self.stage = stage;
        self.updated_at = at;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPosition {
    pub stage: PipelineStage,
    pub index: usize,
}

/// Drop event reported by the board UI when a drag gesture ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    pub lead_id: String,
    pub source: BoardPosition,
    /// `None` when the card was dropped outside every column.
    pub destination: Option<BoardPosition>,
}
