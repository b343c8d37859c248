//! Token to key resolution
//!
//! Interpretations are tried in a fixed order: the per-network format
//! registries, a 40-character hash160 in hex, a secret exponent, a SEC
//! encoded public key and finally an `x,y` coordinate pair.

use super::format_registry::FormatRegistry;
use super::key_creation::KeyCreation;
use crate::crypto::{parse_number, Generator};
use crate::domain::{all_networks, DomainError, DomainResult, Key, NetworkParams};
use secp256k1::PublicKey;

/// Literal token that asks for a freshly created key
pub const CREATE_TOKEN: &str = "create";

const COORDINATE_SEPARATORS: [char; 2] = [',', '/'];

/// A resolved token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    /// Network whose encoding matched, if any
    pub network: Option<&'static NetworkParams>,
    pub key: Key,
}

/// Key parsing use case
pub struct KeyParser {
    registries: Vec<FormatRegistry>,
    default_network: &'static NetworkParams,
    creation: KeyCreation,
}

impl KeyParser {
    pub fn new(default_network: &'static NetworkParams, creation: KeyCreation) -> DomainResult<Self> {
        let registries = all_networks()
            .iter()
            .map(FormatRegistry::for_network)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(Self {
            registries,
            default_network,
            creation,
        })
    }

    /// Networks to try: `requested` alone, or the default followed by every network
    pub fn candidate_networks(
        &self,
        requested: Option<&'static NetworkParams>,
    ) -> Vec<&'static NetworkParams> {
        match requested {
            Some(network) => vec![network],
            None => std::iter::once(self.default_network)
                .chain(
                    all_networks()
                        .iter()
                        .filter(|n| n.symbol != self.default_network.symbol),
                )
                .collect(),
        }
    }

    /// Resolve `token`
    ///
    /// Returns [`DomainError::UnrecognizedToken`] when nothing matches and
    /// [`DomainError::InvalidPublicPair`] for coordinates that are not on the curve.
    pub fn parse(
        &self,
        token: &str,
        requested: Option<&'static NetworkParams>,
    ) -> DomainResult<ParsedKey> {
        if token == CREATE_TOKEN {
            let network = requested.unwrap_or(self.default_network);
            tracing::debug!(network = network.symbol, "creating new hierarchical key");
            return Ok(ParsedKey {
                network: Some(network),
                key: self.creation.create_from_entropy()?,
            });
        }

        for network in self.candidate_networks(requested) {
            if let Some(parsed) = self.parse_with_registry(token, network) {
                return Ok(parsed);
            }
        }

        let key = parse_hash160(token)
            .or_else(|| parse_secret_exponent(token))
            .or_else(|| parse_sec(token))
            .map(Ok)
            .or_else(|| parse_public_pair(token).transpose())
            .transpose()?;

        match key {
            Some(key) => Ok(ParsedKey { network: None, key }),
            None => Err(DomainError::UnrecognizedToken {
                token: token.to_string(),
            }),
        }
    }

    fn parse_with_registry(&self, token: &str, network: &'static NetworkParams) -> Option<ParsedKey> {
        let registry = self
            .registries
            .iter()
            .find(|r| r.network().symbol == network.symbol)?;
        let recognition = registry.recognize(token)?;
        match recognition.create_key() {
            Ok(key) => Some(ParsedKey {
                network: Some(recognition.network),
                key,
            }),
            Err(e) => {
                tracing::debug!(
                    network = recognition.network.symbol,
                    kind = recognition.descriptor.kind.as_str(),
                    "recognized token could not build a key: {}",
                    e
                );
                None
            }
        }
    }
}

fn is_hex_of_len(text: &str, len: usize) -> bool {
    text.len() == len && text.bytes().all(|b| b.is_ascii_hexdigit())
}

fn parse_hash160(token: &str) -> Option<Key> {
    if !is_hex_of_len(token, 40) {
        return None;
    }
    let digest: [u8; 20] = hex::decode(token).ok()?.try_into().ok()?;
    tracing::debug!("token is a hash160");
    Some(Key::AddressOnly(digest))
}

fn parse_secret_exponent(token: &str) -> Option<Key> {
    let value = parse_number(token)?;
    Key::from_secret_exponent(&value).ok()
}

fn parse_sec(token: &str) -> Option<Key> {
    let shaped = match token.get(..2) {
        Some("02") | Some("03") => is_hex_of_len(token, 66),
        Some("04") => is_hex_of_len(token, 130),
        _ => false,
    };
    if !shaped {
        return None;
    }
    let point = PublicKey::from_slice(&hex::decode(token).ok()?).ok()?;
    Some(Key::FlatPublic(point))
}

/// `x,y` or `x/y`, where `y` may be `even` or `odd`
///
/// `Ok(None)` when the token is not shaped like a pair.
fn parse_public_pair(token: &str) -> DomainResult<Option<Key>> {
    for separator in COORDINATE_SEPARATORS {
        let Some((x_text, y_text)) = token.split_once(separator) else {
            continue;
        };
        let Some(x) = parse_number(x_text) else {
            continue;
        };

        let point = match y_text {
            "even" | "odd" => Generator
                .points_for_x(&x)
                .map(|[even, odd]| if y_text == "odd" { odd } else { even }),
            _ => match parse_number(y_text) {
                Some(y) => Generator::point_from_coordinates(&x, &y),
                None => continue,
            },
        };

        return match point {
            Some(point) => Ok(Some(Key::FlatPublic(point))),
            None => Err(DomainError::InvalidPublicPair {
                x: x_text.to_string(),
                y: y_text.to_string(),
            }),
        };
    }
    Ok(None)
}
