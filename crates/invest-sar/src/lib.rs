//! The SAR (Search-Assess-Refine) investigation engine: the per-type
//! iterative cycle, phase sequencing across the five phases, and
//! checkpointing of investigation state (§4.F, §4.H).
//!
//! [`cycle`] drives a single information type through SEARCH → ASSESS →
//! REFINE until it reaches a terminal [`invest_core::model::SarPhase`].
//! [`info_type_manager`] groups types into phases and enforces the
//! dependency rule; [`phase_handlers`] runs each phase's types with the
//! concurrency and sequencing §4.F specifies; [`reconciliation`] is the
//! terminal phase's cross-type consistency pass; [`engine`] wires all of
//! the above into the single entry point the orchestrator calls.

pub mod assessor;
pub mod checkpoint;
pub mod cycle;
pub mod engine;
pub mod error;
pub mod info_type_manager;
pub mod phase_handlers;
pub mod planner;
pub mod reconciliation;
pub mod refiner;

pub use checkpoint::{Checkpoint, CheckpointMetadata, Checkpointer, FileCheckpointer, InMemoryCheckpointer};
pub use cycle::{run_cycle, CycleOutcome};
pub use engine::{InvestigationOutcome, SarEngine};
pub use error::{Result, SarError};
pub use info_type_manager::InfoTypeManager;
pub use reconciliation::{reconcile, Inconsistency, ReconciliationReport};
