use thiserror::Error;

/// Errors raised loading or validating a configuration surface.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file's TOML was malformed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The tier-policy or freshness table is missing an entry for a
    /// declared info-type. This is a loud configuration error by design
    /// (§9 open questions): adding a check type without a corresponding
    /// entry must never fail silently at runtime.
    #[error("config table `{table}` has no entry for info-type {info_type:?}")]
    MissingCheckTypeEntry {
        /// Which table is missing the entry.
        table: &'static str,
        /// The info-type with no entry.
        info_type: invest_core::model::InfoType,
    },
}

/// Convenience alias used across `invest-config`.
pub type Result<T> = std::result::Result<T, ConfigError>;
