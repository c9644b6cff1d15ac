use invest_core::model::InfoType;
use thiserror::Error;

/// Errors raised by the SAR engine: the per-type cycle, the phase
/// handlers, and the checkpoint manager (§4.F, §7).
#[derive(Debug, Error)]
pub enum SarError {
    /// A type's declared predecessors are not all COMPLETE/CAPPED/
    /// DIMINISHED yet (§4.F dependency rule).
    #[error("{info_type:?} cannot start: predecessor {blocking:?} is not terminal")]
    PredecessorNotReady {
        /// The type that was asked to start.
        info_type: InfoType,
        /// The predecessor still blocking it.
        blocking: InfoType,
    },
    /// Foundation confidence fell below the can-proceed threshold; Records
    /// and onward are blocked for this investigation (§4.F).
    #[error("foundation confidence {confidence} below can-proceed threshold {threshold}; blocking downstream phases")]
    FoundationBelowCanProceed {
        /// The confidence actually reached.
        confidence: f64,
        /// The configured can-proceed threshold.
        threshold: f64,
    },
    /// The provider gateway could not service a request.
    #[error(transparent)]
    Provider(#[from] invest_providers::ProviderError),
    /// The cache-aside layer failed.
    #[error(transparent)]
    Cache(#[from] invest_cache::CacheError),
    /// The entity resolver/store failed.
    #[error(transparent)]
    Resolver(#[from] invest_resolver::ResolverError),
    /// The compliance gate rejected an operation directly (not via a
    /// dropped query).
    #[error(transparent)]
    Compliance(#[from] invest_core::CoreError),
    /// A checkpoint file or blob failed its integrity check.
    #[error(transparent)]
    CheckpointIntegrity(#[from] crate::checkpoint::CheckpointIntegrityError),
    /// A checkpoint I/O operation failed (file backend).
    #[error("checkpoint I/O failed for {investigation_id}: {message}")]
    CheckpointIo {
        /// The investigation whose checkpoint failed to read/write.
        investigation_id: String,
        /// The underlying I/O error's message.
        message: String,
    },
    /// No checkpoint exists for the requested investigation/sequence.
    #[error("no checkpoint found for investigation {investigation_id}")]
    CheckpointNotFound {
        /// The investigation that was looked up.
        investigation_id: String,
    },
    /// The investigation's per-investigation wall-clock cap was exceeded
    /// (§5 "Timeouts"). The investigation aborts with a partial profile;
    /// this is not a per-type CAPPED outcome.
    #[error("investigation wall-clock cap exceeded")]
    InvestigationTimedOut,
    /// The investigation was cancelled cooperatively (§5 "Cancellation").
    #[error("investigation cancelled")]
    Cancelled,
}

/// Convenience alias used across `invest-sar`.
pub type Result<T> = std::result::Result<T, SarError>;
