//! Finding extraction, classification, severity scoring, anomaly
//! detection, and network risk propagation (§4.G "Risk analyzer").
//!
//! [`analyzer::RiskAnalyzer`] is the entry point: it drives extraction
//! ([`extractor`]) through classification ([`classifier`]) and severity
//! assignment ([`severity`]), scores the resulting findings
//! ([`scoring`]), layers in anomaly/pattern detection ([`anomaly`]) and
//! network propagation ([`propagation`]), and aggregates everything into
//! a [`model::RiskAssessment`]. This crate never depends on `invest-sar`:
//! the reconciliation pass's deception score is threaded in as a plain
//! `f64` argument so the dependency graph stays acyclic.

pub mod analyzer;
pub mod anomaly;
pub mod classifier;
pub mod error;
pub mod extractor;
pub mod model;
pub mod propagation;
pub mod scoring;
pub mod severity;

pub use analyzer::RiskAnalyzer;
pub use error::{Result, RiskError};
pub use model::{Recommendation, RiskAssessment, RiskLevel};
