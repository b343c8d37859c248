//! Subkey path grammar and lazy derivation
//!
//! A path is a `/`-separated list of segments. Each segment lists one or more
//! comma-separated alternatives, each either an index `N` or an inclusive range
//! `N-M`, optionally followed by a hardened marker (`H`, `h`, `'` or `p`):
//!
//! ```text
//! 0H/2,5/15-20
//! ```
//!
//! Applying a path expands the Cartesian product of all segments, leftmost
//! segment varying slowest.

use super::error::{DomainError, DomainResult};
use super::key::Key;
use crate::crypto::HARDENED_OFFSET;
use std::fmt;

const HARDENED_MARKERS: [char; 4] = ['H', 'h', '\'', 'p'];

/// Inclusive run of child indices sharing a hardened flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub low: u32,
    pub high: u32,
    pub hardened: bool,
}

impl IndexRange {
    /// Number of indices covered
    pub fn count(&self) -> u64 {
        u64::from(self.high - self.low) + 1
    }

    /// Index `offset` steps into the range, without the hardened bit
    fn index_at(&self, offset: u64) -> u32 {
        // offset < count() so the sum stays below 2^31
        self.low + offset as u32
    }
}

/// One level of a subkey path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub ranges: Vec<IndexRange>,
}

impl PathSegment {
    /// Number of child indices this segment expands to
    pub fn len(&self) -> u64 {
        self.ranges.iter().map(IndexRange::count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The `position`-th child of this segment as (index, hardened)
    fn child_at(&self, mut position: u64) -> (u32, bool) {
        for range in &self.ranges {
            if position < range.count() {
                return (range.index_at(position), range.hardened);
            }
            position -= range.count();
        }
        // unreachable for position < len(); fall back to the last index
        self.ranges
            .last()
            .map(|r| (r.high, r.hardened))
            .unwrap_or((0, false))
    }
}

/// A parsed subkey path; the empty path selects the key itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubkeyPath {
    text: String,
    segments: Vec<PathSegment>,
}

impl SubkeyPath {
    pub fn parse(text: &str) -> DomainResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::default());
        }

        let segments = text
            .split('/')
            .map(|segment| parse_segment(text, segment))
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(Self {
            text: text.to_string(),
            segments,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of keys `apply` will yield
    pub fn combination_count(&self) -> u64 {
        self.segments
            .iter()
            .map(PathSegment::len)
            .fold(1u64, |acc, n| acc.saturating_mul(n))
    }

    /// Lazily derive every combination from `key`; may be called any number of times
    pub fn apply(&self, key: &Key) -> Subkeys<'_> {
        Subkeys {
            path: self,
            root: key.clone(),
            positions: vec![0; self.segments.len()],
            finished: false,
        }
    }
}

impl fmt::Display for SubkeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn invalid(path: &str, reason: impl Into<String>) -> DomainError {
    DomainError::InvalidSubkeyPath {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn parse_segment(path: &str, segment: &str) -> DomainResult<PathSegment> {
    if segment.is_empty() {
        return Err(invalid(path, "empty segment"));
    }
    let ranges = segment
        .split(',')
        .map(|alternative| parse_range(path, alternative))
        .collect::<DomainResult<Vec<_>>>()?;
    Ok(PathSegment { ranges })
}

fn parse_range(path: &str, alternative: &str) -> DomainResult<IndexRange> {
    let (body, hardened) = match alternative.strip_suffix(&HARDENED_MARKERS[..]) {
        Some(body) => (body, true),
        None => (alternative, false),
    };

    let (low, high) = match body.split_once('-') {
        Some((low, high)) => (parse_index(path, low)?, parse_index(path, high)?),
        None => {
            let index = parse_index(path, body)?;
            (index, index)
        }
    };

    if low > high {
        return Err(invalid(path, format!("range {}-{} is descending", low, high)));
    }

    Ok(IndexRange {
        low,
        high,
        hardened,
    })
}

fn parse_index(path: &str, text: &str) -> DomainResult<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(path, format!("{:?} is not an index", text)));
    }
    text.parse::<u32>()
        .ok()
        .filter(|index| *index < HARDENED_OFFSET)
        .ok_or_else(|| invalid(path, format!("index {} is too large", text)))
}

/// A derived key together with the concrete path that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subkey {
    /// Expanded path such as `0H/1/5`; `None` when no path was applied
    pub path: Option<String>,
    pub key: Key,
}

/// Lazy Cartesian expansion of a [`SubkeyPath`] over one key
#[derive(Debug, Clone)]
pub struct Subkeys<'a> {
    path: &'a SubkeyPath,
    root: Key,
    /// Odometer over the segments, leftmost digit most significant
    positions: Vec<u64>,
    finished: bool,
}

impl Subkeys<'_> {
    fn current(&self) -> DomainResult<Subkey> {
        if self.path.is_empty() {
            return Ok(Subkey {
                path: None,
                key: self.root.clone(),
            });
        }

        let mut labels = Vec::with_capacity(self.positions.len());
        let mut key = self.root.clone();
        for (segment, position) in self.path.segments.iter().zip(&self.positions) {
            let (index, hardened) = segment.child_at(*position);
            labels.push(if hardened {
                format!("{}H", index)
            } else {
                index.to_string()
            });

            let node = match &key {
                Key::Hierarchical(node) => node,
                _ => {
                    return Err(DomainError::NotHierarchical {
                        path: labels.join("/"),
                    })
                }
            };
            let child = if hardened { index + HARDENED_OFFSET } else { index };
            key = Key::Hierarchical(node.derive_child(child)?);
        }

        Ok(Subkey {
            path: Some(labels.join("/")),
            key,
        })
    }

    fn advance(&mut self) {
        for (digit, segment) in self
            .positions
            .iter_mut()
            .zip(&self.path.segments)
            .rev()
        {
            *digit += 1;
            if *digit < segment.len() {
                return;
            }
            *digit = 0;
        }
        self.finished = true;
    }
}

impl Iterator for Subkeys<'_> {
    type Item = DomainResult<Subkey>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.current();
        self.advance();
        Some(item)
    }
}
