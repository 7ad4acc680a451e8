/// Domain-specific error types for fedrank
///
/// Every failure names the offending value so a caller can tell a malformed
/// run from a misconfigured algorithm without digging through logs.
///
/// Too little training evidence for SSL or SAFE is NOT an error: those
/// methods return an empty list and the caller picks a fallback.

#[derive(Debug, thiserror::Error)]
pub enum FedRankError {
    #[error("Missing input: {what}")]
    MissingInput {
        what: String
    },

    #[error("Invalid argument: {message}")]
    InvalidArgument {
        message: String,
        field: Option<String>
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, FedRankError>;

impl FedRankError {
    /// Helper to create invalid-argument errors with field names
    ///
    /// Example:
    /// ```
    /// use fedrank::errors::FedRankError;
    /// let err = FedRankError::invalid("lambda", "The CORI parameter lambda is negative: -1");
    /// ```
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        FedRankError::InvalidArgument {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }

    pub fn missing(what: impl Into<String>) -> Self {
        FedRankError::MissingInput { what: what.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_carries_field() {
        match FedRankError::invalid("beta", "The beta is not positive: 0") {
            FedRankError::InvalidArgument { field, message } => {
                assert_eq!(field.as_deref(), Some("beta"));
                assert!(message.contains("0"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_display_messages() {
        let err = FedRankError::missing("sample ranking");
        assert_eq!(err.to_string(), "Missing input: sample ranking");
        let err = FedRankError::Config("bad toml".into());
        assert_eq!(err.to_string(), "Configuration error: bad toml");
    }
}
