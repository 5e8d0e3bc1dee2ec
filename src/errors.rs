use thiserror::Error;

/// Failures surfaced by the engine and its configuration.
///
/// Snapshot and window errors are local: the offending snapshot or tick is
/// skipped and processing continues. Configuration errors abort startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("malformed snapshot: {reason}")]
    MalformedSnapshot { reason: String },

    #[error("timestamp regressed from {previous_ns}ns to {received_ns}ns")]
    TimestampRegression { previous_ns: u64, received_ns: u64 },

    #[error("no policy grid configured for instrument \"{symbol}\"")]
    ConfigurationMissing { symbol: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("rolling window is empty")]
    EmptyWindow,
}
