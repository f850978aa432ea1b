//! Error types for Kora operations

use thiserror::Error;

/// Result type alias for Kora operations
pub type Result<T> = std::result::Result<T, KoraError>;

/// Errors that can occur across the Kora services
///
/// Nothing here is fatal: every failure is absorbed at the call site and
/// surfaced to the caller with a structured code. Conflicts are a
/// first-class variant, never detected by matching provider messages.
#[derive(Error, Debug, Clone)]
pub enum KoraError {
    // === Validation ===
    /// A required field was missing or empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Input failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Caller lacks the role needed for the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    // === Records ===
    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Uniqueness conflict (e.g. duplicate submission per opportunity)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Illegal status transition
    #[error("Invalid transition for {entity}: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    // === Wallet / Chain ===
    /// Signer balance below the requested amount
    #[error("Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    /// On-chain call or transaction failed
    #[error("Chain error: {0}")]
    Chain(String),

    /// Transaction was submitted but never confirmed in time
    #[error("Transaction not confirmed: {0}")]
    Unconfirmed(String),

    // === External gateways ===
    /// Payment on-ramp call failed
    #[error("Onramp error: {0}")]
    Onramp(String),

    /// Assistant (chat completion) call failed
    #[error("Assistant error: {0}")]
    Assistant(String),

    // === Infrastructure ===
    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {limit} per second")]
    RateLimitExceeded { limit: u32 },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes matching the JSON-RPC API surface
impl KoraError {
    /// Get the error code for API responses
    pub fn code(&self) -> u32 {
        match self {
            Self::MissingField(_) | Self::InvalidInput(_) => 2001,
            Self::Forbidden(_) => 2002,
            Self::NotFound { .. } => 2003,
            Self::Conflict(_) => 2004,
            Self::InvalidTransition { .. } => 2005,
            Self::InsufficientBalance { .. } => 2101,
            Self::Chain(_) => 2102,
            Self::Unconfirmed(_) => 2103,
            Self::Onramp(_) => 2201,
            Self::Assistant(_) => 2202,
            Self::RateLimitExceeded { .. } => 2301,
            Self::Storage(_) | Self::Internal(_) => 9999,
        }
    }

    /// Check if the caller can sensibly retry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded { .. }
                | Self::Unconfirmed(_)
                | Self::Chain(_)
                | Self::Onramp(_)
                | Self::Assistant(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = KoraError::Conflict("duplicate submission".into());
        assert_eq!(err.code(), 2004);

        let err = KoraError::InsufficientBalance {
            needed: 10,
            available: 3,
        };
        assert_eq!(err.code(), 2101);
    }

    #[test]
    fn test_error_display() {
        let err = KoraError::NotFound {
            entity: "opportunity",
            id: "abc".into(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("opportunity not found"));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(KoraError::RateLimitExceeded { limit: 100 }.is_recoverable());
        assert!(!KoraError::MissingField("title").is_recoverable());
        assert!(!KoraError::Conflict("dup".into()).is_recoverable());
    }
}
