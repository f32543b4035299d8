//! Core library for the VM resize advisor
//!
//! This crate provides the building blocks of a resize evaluation:
//! - Per-region machine profile capability catalog
//! - Series lifecycle classification registry
//! - Compatibility rule engine
//! - Alternative recommendation scorer
//! - Memoized pricing resolver
//! - Fault-isolated batch orchestrator

pub mod catalog;
pub mod compat;
pub mod error;
pub mod models;
pub mod observability;
pub mod orchestrator;
pub mod pricing;
pub mod scorer;
pub mod series;

pub use error::{JobError, SupplierError};
pub use models::*;
pub use observability::{AdvisorMetrics, RunLogger};
pub use orchestrator::{
    AdvisorEngine, BatchOrchestrator, EngineConfig, OrchestratorConfig, ProcessMode,
    RecommendationQuality, RecommendationRecord, RecordSource, RecordStatus, ResizeJob,
    VmConfigSupplier,
};
