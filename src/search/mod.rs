//! Search orchestration: strategy selection, fan-out, residual filtering.
//!
//! # Module layout
//!
//! - [`criteria`] -- Request criteria and the canonical response entity.
//! - [`strategy`] -- Fetch strategy selected from criteria shape.
//! - [`filter`] -- Residual client-side predicate evaluation.
//! - [`orchestrator`] -- The request driver tying everything together.

pub mod criteria;
pub mod filter;
pub mod orchestrator;
pub mod strategy;

pub use criteria::{CanonicalMovie, MediaKind, Provenance, SearchCriteria};
pub use orchestrator::{OrchestratorSettings, SearchError, SearchOrchestrator};
pub use strategy::Strategy;
