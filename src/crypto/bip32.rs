//! BIP-32 hierarchical deterministic keys over secp256k1
//!
//! Serialization is network-agnostic: callers supply the 4-byte version prefix
//! and wrap the 78-byte payload in base58check themselves.

use super::encoding::hash160;
use crate::domain::{DomainError, DomainResult};
use hmac::{Hmac, Mac};
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Key used for the master HMAC
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Child indices at or above this value are hardened
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Length of a serialized extended key, version prefix included
pub const SERIALIZED_LEN: usize = 78;

/// Private or public key material of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKey {
    Private(SecretKey),
    Public(PublicKey),
}

/// A node in a BIP-32 tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchicalKey {
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
    chain_code: [u8; 32],
    key: NodeKey,
}

impl HierarchicalKey {
    /// Create a master node from arbitrary seed bytes
    ///
    /// Fails with [`DomainError::InvalidSeed`] when the derived secret is zero or
    /// not below the group order.
    pub fn from_master_secret(seed: &[u8]) -> DomainResult<Self> {
        let mut mac = HmacSha512::new_from_slice(MASTER_HMAC_KEY)
            .map_err(|e| DomainError::CryptoError(format!("HMAC init failed: {}", e)))?;
        mac.update(seed);
        let digest = mac.finalize().into_bytes();
        let (il, ir) = digest.split_at(32);

        let secret = SecretKey::from_byte_array(to_array32(il)).map_err(|_| DomainError::InvalidSeed)?;

        Ok(Self {
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
            chain_code: to_array32(ir),
            key: NodeKey::Private(secret),
        })
    }

    /// Parse a 78-byte serialized node (version prefix included)
    pub fn deserialize(data: &[u8], is_private: bool) -> DomainResult<Self> {
        if data.len() != SERIALIZED_LEN {
            return Err(DomainError::InvalidKeyData(format!(
                "extended key is {} bytes (expected {})",
                data.len(),
                SERIALIZED_LEN
            )));
        }

        let depth = data[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&data[5..9]);
        let child_number = u32::from_be_bytes([data[9], data[10], data[11], data[12]]);
        let chain_code = to_array32(&data[13..45]);
        let key_data = &data[45..];

        let key = if is_private {
            if key_data[0] != 0x00 {
                return Err(DomainError::InvalidKeyData(
                    "private key data must start with 0x00".to_string(),
                ));
            }
            let secret = SecretKey::from_byte_array(to_array32(&key_data[1..]))
                .map_err(|e| DomainError::InvalidKeyData(format!("bad private key: {}", e)))?;
            NodeKey::Private(secret)
        } else {
            let point = PublicKey::from_slice(key_data)
                .map_err(|e| DomainError::InvalidKeyData(format!("bad public key: {}", e)))?;
            NodeKey::Public(point)
        };

        Ok(Self {
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            key,
        })
    }

    /// 78-byte serialization under `version`; `None` if a private form is requested
    /// from a public node
    pub fn serialize(&self, version: [u8; 4], as_private: bool) -> Option<[u8; SERIALIZED_LEN]> {
        let mut out = [0u8; SERIALIZED_LEN];
        out[..4].copy_from_slice(&version);
        out[4] = self.depth;
        out[5..9].copy_from_slice(&self.parent_fingerprint);
        out[9..13].copy_from_slice(&self.child_number.to_be_bytes());
        out[13..45].copy_from_slice(&self.chain_code);

        if as_private {
            let secret = self.secret_key()?;
            out[45] = 0x00;
            out[46..].copy_from_slice(&secret.secret_bytes());
        } else {
            out[45..].copy_from_slice(&self.public_key().serialize());
        }
        Some(out)
    }

    pub fn is_private(&self) -> bool {
        matches!(self.key, NodeKey::Private(_))
    }

    pub fn secret_key(&self) -> Option<&SecretKey> {
        match &self.key {
            NodeKey::Private(secret) => Some(secret),
            NodeKey::Public(_) => None,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match &self.key {
            NodeKey::Private(secret) => PublicKey::from_secret_key(&Secp256k1::new(), secret),
            NodeKey::Public(point) => *point,
        }
    }

    /// Same node with the private key stripped
    pub fn public_copy(&self) -> Self {
        Self {
            key: NodeKey::Public(self.public_key()),
            ..self.clone()
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    pub fn chain_code(&self) -> [u8; 32] {
        self.chain_code
    }

    /// First four bytes of the hash160 of the compressed public key
    pub fn fingerprint(&self) -> [u8; 4] {
        let digest = hash160(&self.public_key().serialize());
        [digest[0], digest[1], digest[2], digest[3]]
    }

    /// Single-step child derivation (CKDpriv or CKDpub)
    pub fn derive_child(&self, index: u32) -> DomainResult<Self> {
        let hardened = index >= HARDENED_OFFSET;
        let depth = self.depth.checked_add(1).ok_or_else(|| {
            DomainError::InvalidKeyData("maximum tree depth reached".to_string())
        })?;

        let mut mac = HmacSha512::new_from_slice(&self.chain_code)
            .map_err(|e| DomainError::CryptoError(format!("HMAC init failed: {}", e)))?;
        match (&self.key, hardened) {
            (NodeKey::Private(secret), true) => {
                mac.update(&[0x00]);
                mac.update(&secret.secret_bytes());
            }
            (NodeKey::Public(_), true) => {
                return Err(DomainError::HardenedDerivationFromPublic {
                    index: index - HARDENED_OFFSET,
                });
            }
            (_, false) => mac.update(&self.public_key().serialize()),
        }
        mac.update(&index.to_be_bytes());
        let digest = mac.finalize().into_bytes();
        let (il, ir) = digest.split_at(32);

        let tweak = Scalar::from_be_bytes(to_array32(il))
            .map_err(|_| DomainError::InvalidChildKey { index })?;

        let key = match &self.key {
            NodeKey::Private(secret) => NodeKey::Private(
                secret
                    .add_tweak(&tweak)
                    .map_err(|_| DomainError::InvalidChildKey { index })?,
            ),
            NodeKey::Public(point) => NodeKey::Public(
                point
                    .add_exp_tweak(&Secp256k1::verification_only(), &tweak)
                    .map_err(|_| DomainError::InvalidChildKey { index })?,
            ),
        };

        Ok(Self {
            depth,
            parent_fingerprint: self.fingerprint(),
            child_number: index,
            chain_code: to_array32(ir),
            key,
        })
    }
}

fn to_array32(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes[..32]);
    out
}
