use thiserror::Error;

/// Failures surfaced by generated code at access time, never at construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Segment '{name}' is not provided to {uri}")]
    MissingSegment { name: String, uri: String },
    #[error("Parameter '{name}' is not provided to {uri}")]
    MissingParameter { name: String, uri: String },
    #[error("Adding new rules to this dispatcher is not supported")]
    DispatcherSealed,
    #[error("Adapter could not deserialize '{raw}': {reason}")]
    Adapter { raw: String, reason: String },
}
