use thiserror::Error;

/// Domain-level errors for key parsing, derivation and rendering
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("can't parse {token}")]
    UnrecognizedToken {
        token: String,
    },

    #[error("invalid (x, y) pair")]
    InvalidPublicPair {
        x: String,
        y: String,
    },

    #[error("can't find sources of entropy: collected {collected} bytes, need {required}")]
    EntropySourceExhausted {
        collected: usize,
        required: usize,
    },

    #[error("can't create hierarchical key after {attempts} attempts")]
    KeyCreationExhausted {
        attempts: u32,
    },

    #[error("Key does not support subkey derivation: {path}")]
    NotHierarchical {
        path: String,
    },

    #[error("Hardened derivation requires a private key: {index}H")]
    HardenedDerivationFromPublic {
        index: u32,
    },

    #[error("Invalid subkey path {path:?}: {reason}")]
    InvalidSubkeyPath {
        path: String,
        reason: String,
    },

    #[error("Seed value out of range for master key")]
    InvalidSeed,

    #[error("Derived child key is invalid at index {index}")]
    InvalidChildKey {
        index: u32,
    },

    #[error("Invalid key data: {0}")]
    InvalidKeyData(String),

    #[error("Unknown network code: {0}")]
    UnknownNetwork(String),

    #[error("Duplicate prefix {prefix} registered for network {network}")]
    DuplicatePrefix {
        network: String,
        prefix: String,
    },

    #[error("Cryptographic operation failed: {0}")]
    CryptoError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DomainError {
    /// Whether processing may continue with the next input token
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnrecognizedToken { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unrecognized_tokens_are_recoverable() {
        let unrecognized = DomainError::UnrecognizedToken {
            token: "zzz".to_string(),
        };
        assert!(unrecognized.is_recoverable());
        assert_eq!(unrecognized.to_string(), "can't parse zzz");

        let pair = DomainError::InvalidPublicPair {
            x: "1".to_string(),
            y: "2".to_string(),
        };
        assert!(!pair.is_recoverable());
        assert_eq!(pair.to_string(), "invalid (x, y) pair");

        assert!(!DomainError::KeyCreationExhausted { attempts: 64 }.is_recoverable());
    }

    #[test]
    fn test_entropy_errors_are_distinct() {
        let exhausted = DomainError::EntropySourceExhausted {
            collected: 10,
            required: 64,
        };
        let retries = DomainError::KeyCreationExhausted { attempts: 64 };
        assert_ne!(exhausted.to_string(), retries.to_string());
    }
}
