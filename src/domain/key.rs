use super::derivation::{SubkeyPath, Subkeys};
use super::error::{DomainError, DomainResult};
use crate::crypto::encoding::{hash160, sec};
use crate::crypto::curve::{from_be_bytes, to_be_bytes};
use crate::crypto::{Generator, HierarchicalKey, U256};
use secp256k1::{PublicKey, Secp256k1, SecretKey};

/// A resolved key
///
/// Every instance is exactly one of: secret-exponent-bearing
/// (`Hierarchical` private, `FlatPrivate`), public-pair-bearing
/// (`Hierarchical` public, `FlatPublic`) or hash160-only (`AddressOnly`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Hierarchical(HierarchicalKey),
    FlatPrivate(SecretKey),
    FlatPublic(PublicKey),
    AddressOnly([u8; 20]),
}

impl Key {
    /// Build a flat private key from a secret exponent in `(0, n)`
    pub fn from_secret_exponent(exponent: &U256) -> DomainResult<Self> {
        if !Generator.is_valid_exponent(exponent) {
            return Err(DomainError::InvalidKeyData(
                "secret exponent out of range".to_string(),
            ));
        }
        let secret = SecretKey::from_byte_array(to_be_bytes(exponent))
            .map_err(|e| DomainError::InvalidKeyData(e.to_string()))?;
        Ok(Self::FlatPrivate(secret))
    }

    pub fn secret_key(&self) -> Option<SecretKey> {
        match self {
            Self::Hierarchical(node) => node.secret_key().copied(),
            Self::FlatPrivate(secret) => Some(*secret),
            Self::FlatPublic(_) | Self::AddressOnly(_) => None,
        }
    }

    pub fn secret_exponent(&self) -> Option<U256> {
        self.secret_key()
            .map(|secret| from_be_bytes(&secret.secret_bytes()))
    }

    pub fn public_key(&self) -> Option<PublicKey> {
        match self {
            Self::Hierarchical(node) => Some(node.public_key()),
            Self::FlatPrivate(secret) => Some(PublicKey::from_secret_key(&Secp256k1::new(), secret)),
            Self::FlatPublic(point) => Some(*point),
            Self::AddressOnly(_) => None,
        }
    }

    /// Affine (x, y) of the public point
    pub fn public_pair(&self) -> Option<(U256, U256)> {
        self.public_key().map(|point| Generator::public_pair(&point))
    }

    /// hash160 of the SEC encoding; `AddressOnly` keys only have the one they were built from
    pub fn hash160(&self, compressed: bool) -> Option<[u8; 20]> {
        match self {
            Self::AddressOnly(digest) => compressed.then_some(*digest),
            _ => self
                .public_key()
                .map(|point| hash160(&sec(&point, compressed))),
        }
    }

    pub fn hierarchical(&self) -> Option<&HierarchicalKey> {
        match self {
            Self::Hierarchical(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_private(&self) -> bool {
        self.secret_key().is_some()
    }

    /// Same key with any private material stripped
    pub fn public_copy(&self) -> Self {
        match self {
            Self::Hierarchical(node) => Self::Hierarchical(node.public_copy()),
            Self::FlatPrivate(secret) => {
                Self::FlatPublic(PublicKey::from_secret_key(&Secp256k1::new(), secret))
            }
            Self::FlatPublic(_) | Self::AddressOnly(_) => self.clone(),
        }
    }

    /// Lazily derive every key named by `path`
    pub fn subkeys<'a>(&self, path: &'a SubkeyPath) -> Subkeys<'a> {
        path.apply(self)
    }
}
