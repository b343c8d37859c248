//! Per-network table of textual key encodings
//!
//! Each network owns one [`FormatRegistry`]: an ordered list of descriptors
//! keyed by a base58 byte prefix, a one-character scheme tag (`H:`, `P:`) or a
//! bech32 human-readable part.

use crate::crypto::encoding::{b58check_decode, decode_segwit_address};
use crate::crypto::HierarchicalKey;
use crate::domain::{DomainError, DomainResult, Key, NetworkParams};
use secp256k1::SecretKey;
use secrecy::{ExposeSecret, SecretVec};
use std::fmt;

/// Builds a key from the payload left after the prefix is removed
pub type KeyFactory = fn(&FormatDescriptor, &[u8]) -> DomainResult<Key>;

/// What a token must start with to select a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatPrefix {
    /// Leading bytes of a base58check payload
    Base58(Vec<u8>),
    /// `<tag>:` scheme prefix
    Scheme(char),
    /// Human-readable part of a segwit address
    Bech32(&'static str),
}

impl fmt::Display for FormatPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base58(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Self::Scheme(tag) => write!(f, "{}:", tag),
            Self::Bech32(hrp) => write!(f, "{}1", hrp),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    HierarchicalPlain,
    HierarchicalSeededHex,
    HierarchicalSeededText,
    Wif,
    Address,
    SegwitAddress,
}

impl FormatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HierarchicalPlain => "hierarchical-plain",
            Self::HierarchicalSeededHex => "hierarchical-seeded-hex",
            Self::HierarchicalSeededText => "hierarchical-seeded-text",
            Self::Wif => "wif",
            Self::Address => "address",
            Self::SegwitAddress => "segwit-address",
        }
    }

    /// Whether a base58 payload body (prefix removed) has a shape this kind accepts
    fn accepts_body(&self, body: &[u8]) -> bool {
        match self {
            Self::HierarchicalPlain => body.len() == 74,
            Self::Wif => body.len() == 32 || (body.len() == 33 && body[32] == 0x01),
            Self::Address => body.len() == 20,
            Self::HierarchicalSeededHex | Self::HierarchicalSeededText | Self::SegwitAddress => false,
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognizable encoding
#[derive(Clone)]
pub struct FormatDescriptor {
    pub prefix: FormatPrefix,
    pub kind: FormatKind,
    pub is_private: bool,
    pub factory: KeyFactory,
}

impl fmt::Debug for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatDescriptor")
            .field("prefix", &self.prefix)
            .field("kind", &self.kind)
            .field("is_private", &self.is_private)
            .finish_non_exhaustive()
    }
}

impl FormatDescriptor {
    pub fn new(prefix: FormatPrefix, kind: FormatKind, is_private: bool, factory: KeyFactory) -> Self {
        Self {
            prefix,
            kind,
            is_private,
            factory,
        }
    }
}

/// A token matched by a descriptor, with its payload bound
pub struct Recognition<'a> {
    pub network: &'static NetworkParams,
    pub descriptor: &'a FormatDescriptor,
    payload: SecretVec<u8>,
}

impl Recognition<'_> {
    /// Run the descriptor's factory over the bound payload
    pub fn create_key(&self) -> DomainResult<Key> {
        (self.descriptor.factory)(self.descriptor, self.payload.expose_secret())
    }
}

/// Ordered descriptors for one network
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    network: &'static NetworkParams,
    descriptors: Vec<FormatDescriptor>,
}

impl FormatRegistry {
    /// An empty registry
    pub fn new(network: &'static NetworkParams) -> Self {
        Self {
            network,
            descriptors: Vec::new(),
        }
    }

    /// The standard encodings of `network`
    pub fn for_network(network: &'static NetworkParams) -> DomainResult<Self> {
        let mut registry = Self::new(network);
        registry.register(FormatDescriptor::new(
            FormatPrefix::Base58(network.bip32_private_prefix.to_vec()),
            FormatKind::HierarchicalPlain,
            true,
            hierarchical_from_serialized,
        ))?;
        registry.register(FormatDescriptor::new(
            FormatPrefix::Base58(network.bip32_public_prefix.to_vec()),
            FormatKind::HierarchicalPlain,
            false,
            hierarchical_from_serialized,
        ))?;
        registry.register(FormatDescriptor::new(
            FormatPrefix::Scheme('H'),
            FormatKind::HierarchicalSeededHex,
            true,
            hierarchical_from_seed,
        ))?;
        registry.register(FormatDescriptor::new(
            FormatPrefix::Scheme('P'),
            FormatKind::HierarchicalSeededText,
            true,
            hierarchical_from_seed,
        ))?;
        registry.register(FormatDescriptor::new(
            FormatPrefix::Base58(vec![network.wif_prefix]),
            FormatKind::Wif,
            true,
            flat_from_wif,
        ))?;
        registry.register(FormatDescriptor::new(
            FormatPrefix::Base58(vec![network.address_prefix]),
            FormatKind::Address,
            false,
            address_only,
        ))?;
        if let Some(hrp) = network.bech32_hrp {
            registry.register(FormatDescriptor::new(
                FormatPrefix::Bech32(hrp),
                FormatKind::SegwitAddress,
                false,
                address_only,
            ))?;
        }
        Ok(registry)
    }

    pub fn network(&self) -> &'static NetworkParams {
        self.network
    }

    pub fn descriptors(&self) -> &[FormatDescriptor] {
        &self.descriptors
    }

    /// Add a descriptor; prefixes must be unique within the network
    pub fn register(&mut self, descriptor: FormatDescriptor) -> DomainResult<()> {
        if self.descriptors.iter().any(|d| d.prefix == descriptor.prefix) {
            return Err(DomainError::DuplicatePrefix {
                network: self.network.symbol.to_string(),
                prefix: descriptor.prefix.to_string(),
            });
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Match `token` against the registered encodings
    pub fn recognize(&self, token: &str) -> Option<Recognition<'_>> {
        self.recognize_scheme(token)
            .or_else(|| self.recognize_base58(token))
            .or_else(|| self.recognize_bech32(token))
    }

    fn recognize_scheme(&self, token: &str) -> Option<Recognition<'_>> {
        let (tag, rest) = token.split_once(':')?;
        let mut chars = tag.chars();
        let tag = chars.next()?;
        if chars.next().is_some() {
            return None;
        }

        let descriptor = self
            .descriptors
            .iter()
            .find(|d| d.prefix == FormatPrefix::Scheme(tag))?;
        let payload = match descriptor.kind {
            FormatKind::HierarchicalSeededHex => hex::decode(rest).ok()?,
            _ => rest.as_bytes().to_vec(),
        };
        Some(self.recognition(descriptor, payload))
    }

    fn recognize_base58(&self, token: &str) -> Option<Recognition<'_>> {
        let data = b58check_decode(token)?;

        let mut candidates: Vec<(&FormatDescriptor, &[u8])> = self
            .descriptors
            .iter()
            .filter_map(|d| match &d.prefix {
                FormatPrefix::Base58(prefix) => Some((d, prefix.as_slice())),
                _ => None,
            })
            .collect();
        candidates.sort_by_key(|(_, prefix)| std::cmp::Reverse(prefix.len()));

        candidates.into_iter().find_map(|(descriptor, prefix)| {
            let body = data.strip_prefix(prefix)?;
            descriptor
                .kind
                .accepts_body(body)
                .then(|| self.recognition(descriptor, body.to_vec()))
        })
    }

    fn recognize_bech32(&self, token: &str) -> Option<Recognition<'_>> {
        let hrp = self.network.bech32_hrp?;
        let descriptor = self
            .descriptors
            .iter()
            .find(|d| d.prefix == FormatPrefix::Bech32(hrp))?;
        let program = decode_segwit_address(hrp, token)?;
        Some(self.recognition(descriptor, program.to_vec()))
    }

    fn recognition<'a>(&self, descriptor: &'a FormatDescriptor, payload: Vec<u8>) -> Recognition<'a> {
        tracing::debug!(
            network = self.network.symbol,
            kind = descriptor.kind.as_str(),
            prefix = %descriptor.prefix,
            "recognized token"
        );
        Recognition {
            network: self.network,
            descriptor,
            payload: SecretVec::new(payload),
        }
    }
}

fn hierarchical_from_serialized(descriptor: &FormatDescriptor, body: &[u8]) -> DomainResult<Key> {
    let prefix = match &descriptor.prefix {
        FormatPrefix::Base58(prefix) => prefix.as_slice(),
        other => {
            return Err(DomainError::InvalidKeyData(format!(
                "{} is not a byte prefix",
                other
            )))
        }
    };
    let mut data = Vec::with_capacity(prefix.len() + body.len());
    data.extend_from_slice(prefix);
    data.extend_from_slice(body);
    let node = HierarchicalKey::deserialize(&data, descriptor.is_private)?;
    Ok(Key::Hierarchical(node))
}

fn hierarchical_from_seed(_: &FormatDescriptor, seed: &[u8]) -> DomainResult<Key> {
    Ok(Key::Hierarchical(HierarchicalKey::from_master_secret(seed)?))
}

fn flat_from_wif(_: &FormatDescriptor, body: &[u8]) -> DomainResult<Key> {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(body.get(..32).ok_or_else(|| {
        DomainError::InvalidKeyData("WIF payload is too short".to_string())
    })?);
    let secret = SecretKey::from_byte_array(bytes)
        .map_err(|e| DomainError::InvalidKeyData(format!("bad WIF secret: {}", e)))?;
    Ok(Key::FlatPrivate(secret))
}

fn address_only(_: &FormatDescriptor, body: &[u8]) -> DomainResult<Key> {
    let digest: [u8; 20] = body
        .try_into()
        .map_err(|_| DomainError::InvalidKeyData(format!("hash160 is {} bytes", body.len())))?;
    Ok(Key::AddressOnly(digest))
}
