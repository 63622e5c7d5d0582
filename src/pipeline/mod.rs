//! Sales pipeline: stage model, kanban board and its backing store.

pub mod board;
pub mod handlers;
#[cfg(feature = "postgres")]
pub mod pg;
pub mod repository;
pub mod service;
pub mod types;

pub use board::{BoardColumn, BoardError, MoveOutcome, PipelineBoard};
pub use handlers::configure_pipeline_routes;
#[cfg(feature = "postgres")]
pub use pg::PgPipelineRepository;
pub use repository::{placeholder_leads, InMemoryPipelineRepository, PipelineRepository};
pub use types::{Activity, ActivityKind, BoardPosition, DragEnd, Lead, PipelineStage};
