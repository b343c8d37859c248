use crate::crypto::entropy::system_sources;
use crate::crypto::{gather_entropy, EntropySource, HierarchicalKey};
use crate::domain::{DomainError, DomainResult, Key};
use secrecy::{ExposeSecret, SecretVec};

/// Upper bound on master-key attempts before giving up
pub const MAX_CREATION_ATTEMPTS: u32 = 64;

/// Key creation use case: a fresh hierarchical master key from system entropy
pub struct KeyCreation {
    sources: Vec<Box<dyn EntropySource>>,
}

impl KeyCreation {
    /// Use the gpg helper and `/dev/random`
    pub fn system() -> Self {
        Self::with_sources(system_sources())
    }

    pub fn with_sources(sources: Vec<Box<dyn EntropySource>>) -> Self {
        Self { sources }
    }

    /// Gather entropy and build a master key, retrying on out-of-range seeds
    pub fn create_from_entropy(&self) -> DomainResult<Key> {
        Self::create_with(
            || gather_entropy(&self.sources),
            HierarchicalKey::from_master_secret,
        )
    }

    fn create_with<E, B>(mut entropy: E, mut build: B) -> DomainResult<Key>
    where
        E: FnMut() -> DomainResult<SecretVec<u8>>,
        B: FnMut(&[u8]) -> DomainResult<HierarchicalKey>,
    {
        for attempt in 1..=MAX_CREATION_ATTEMPTS {
            let seed = entropy()?;
            match build(seed.expose_secret()) {
                Ok(node) => return Ok(Key::Hierarchical(node)),
                Err(DomainError::InvalidSeed) => {
                    tracing::debug!(attempt, "seed out of range, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::KeyCreationExhausted {
            attempts: MAX_CREATION_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingEntropy(u8);

    impl EntropySource for CountingEntropy {
        fn name(&self) -> &str {
            "counting"
        }

        fn gather(&self) -> DomainResult<Vec<u8>> {
            Ok(vec![self.0; 64])
        }
    }

    #[test]
    fn test_create_from_fixed_entropy() {
        let creation = KeyCreation::with_sources(vec![Box::new(CountingEntropy(5))]);
        let key = creation.create_from_entropy().unwrap();
        let node = key.hierarchical().unwrap();
        assert!(node.is_private());
        assert_eq!(node.depth(), 0);

        // deterministic for identical entropy
        assert_eq!(creation.create_from_entropy().unwrap(), key);
    }

    #[test]
    fn test_entropy_exhaustion_is_fatal() {
        let creation = KeyCreation::with_sources(Vec::new());
        assert!(matches!(
            creation.create_from_entropy(),
            Err(DomainError::EntropySourceExhausted { collected: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_seed_is_retried() {
        let mut calls = 0;
        let key = KeyCreation::create_with(
            || Ok(SecretVec::new(vec![1u8; 64])),
            |seed| {
                calls += 1;
                if calls < 3 {
                    Err(DomainError::InvalidSeed)
                } else {
                    HierarchicalKey::from_master_secret(seed)
                }
            },
        )
        .unwrap();
        assert!(key.is_private());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retries_are_bounded() {
        let mut calls = 0u32;
        let err = KeyCreation::create_with(
            || Ok(SecretVec::new(vec![1u8; 64])),
            |_| {
                calls += 1;
                Err(DomainError::InvalidSeed)
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DomainError::KeyCreationExhausted { attempts: 64 }
        ));
        assert_eq!(calls, MAX_CREATION_ATTEMPTS);
    }

    #[test]
    fn test_other_errors_are_not_retried() {
        let mut calls = 0;
        let err = KeyCreation::create_with(
            || Ok(SecretVec::new(vec![1u8; 64])),
            |_| {
                calls += 1;
                Err(DomainError::CryptoError("boom".to_string()))
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::CryptoError(_)));
        assert_eq!(calls, 1);
    }
}
