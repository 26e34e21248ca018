//! Error types for the conversion pipeline.
//!
//! Two layers: [`HostError`] is what a [`crate::host::SceneHost`]
//! implementation reports; [`ConvertError`] wraps it together with raw
//! document decode failures at the pipeline boundary. Per-node failures are
//! caught at the top-level selection loop and downgraded to warnings — only
//! errors outside that boundary surface as `ConvertError`.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Failure reported by a `SceneHost` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure of one conversion step.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The host failed to export a subtree or look something up.
    #[error("host call failed: {0}")]
    Host(#[from] HostError),

    /// The exported raw document could not be decoded.
    #[error("raw document decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_error_display_is_verbatim() {
        let err = HostError::new("variable service unavailable");
        assert_eq!(err.to_string(), "variable service unavailable");
    }

    #[test]
    fn convert_error_prefixes_host_failures() {
        let err = ConvertError::from(HostError::new("export timed out"));
        assert_eq!(err.to_string(), "host call failed: export timed out");
    }

    #[test]
    fn convert_error_prefixes_decode_failures() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ConvertError::from(json_err);
        assert!(err.to_string().starts_with("raw document decode failed:"));
    }
}
