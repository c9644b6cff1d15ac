//! The investigation orchestrator: the inbound service surface, outbound
//! domain events, HRIS webhook ingress, and the pipeline that wires
//! entity resolution, the SAR engine, and the risk analyzer into one
//! investigation (§2, §4, §6).
//!
//! [`pipeline::InvestigationPipeline`] is the concrete
//! [`service::InvestigationService`] every deployment drives — directly
//! from `invest-cli` for local use, or behind a thin HTTP adapter in a
//! real deployment (transport is explicitly out of scope here).

pub mod error;
pub mod events;
pub mod pipeline;
pub mod service;
pub mod status;
pub mod webhook;

pub use error::{OrchestratorError, Result};
pub use events::{DomainEvent, EventPublisher, InMemoryEventPublisher, RetryingEventPublisher};
pub use pipeline::InvestigationPipeline;
pub use service::{InvestigationRecord, InvestigationReport, InvestigationService, SubmissionRequest};
pub use status::InvestigationStatus;
pub use webhook::HrisWebhookEvent;
