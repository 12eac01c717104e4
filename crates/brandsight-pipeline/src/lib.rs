//! Brand analysis pipeline.
//!
//! Classifies a brand URL, acquires reviews through a [`ReviewSource`], hands
//! them to a [`SentimentEngine`], and persists the resulting report in a
//! [`ReportStore`]. All three are trait objects so callers can swap in
//! stand-ins.

pub mod engine;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod sources;
pub mod store;

pub use engine::{AnalysisRequest, HttpSentimentEngine, SentimentEngine};
pub use error::{EngineError, PipelineError, SourceError, Stage, StoreError};
pub use history::{list_history, History};
pub use pipeline::{
    AnalysisOutcome, AnalyzeRequest, Pipeline, DEFAULT_REVIEW_COUNT, MAX_REVIEW_COUNT,
};
pub use sources::{
    acquire, AcquiredBrand, Acquisition, AppMetadata, PlayStoreClient, ReviewSource,
    MAP_PLACE_MESSAGE,
};
pub use store::{MemoryReportStore, PgReportStore, ReportStore};
