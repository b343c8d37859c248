use primitive_types::U256;
use secp256k1::PublicKey;

/// Order of the secp256k1 group
const SECP256K1_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// Parse a numeric token: decimal first, then hex with an optional `0x`;
/// a leading `+` is allowed
pub fn parse_number(text: &str) -> Option<U256> {
    let text = text.trim();
    let text = text.strip_prefix('+').unwrap_or(text);
    if text.is_empty() {
        return None;
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(value) = U256::from_dec_str(text) {
            return Some(value);
        }
    }
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    U256::from_str_radix(digits, 16).ok()
}

/// Big-endian 32-byte form, as secp256k1 expects
pub fn to_be_bytes(value: &U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

pub fn from_be_bytes(bytes: &[u8; 32]) -> U256 {
    U256::from_big_endian(bytes)
}

/// Group capability for secp256k1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generator;

impl Generator {
    /// Group order n
    pub fn order(&self) -> U256 {
        from_be_bytes(&SECP256K1_ORDER)
    }

    /// Whether `value` is a usable secret exponent, i.e. `0 < value < n`
    pub fn is_valid_exponent(&self, value: &U256) -> bool {
        !value.is_zero() && *value < self.order()
    }

    /// Whether (x, y) lies on the curve
    pub fn contains_point(&self, x: &U256, y: &U256) -> bool {
        Self::point_from_coordinates(x, y).is_some()
    }

    /// Point for the affine pair (x, y), if it lies on the curve
    pub fn point_from_coordinates(x: &U256, y: &U256) -> Option<PublicKey> {
        let mut sec = [0u8; 65];
        sec[0] = 0x04;
        sec[1..33].copy_from_slice(&to_be_bytes(x));
        sec[33..].copy_from_slice(&to_be_bytes(y));
        PublicKey::from_slice(&sec).ok()
    }

    /// The two points sharing `x`, indexed by y parity: `[even, odd]`
    pub fn points_for_x(&self, x: &U256) -> Option<[PublicKey; 2]> {
        let even = Self::point_with_parity(x, false)?;
        let odd = Self::point_with_parity(x, true)?;
        Some([even, odd])
    }

    fn point_with_parity(x: &U256, odd: bool) -> Option<PublicKey> {
        let mut sec = [0u8; 33];
        sec[0] = if odd { 0x03 } else { 0x02 };
        sec[1..].copy_from_slice(&to_be_bytes(x));
        PublicKey::from_slice(&sec).ok()
    }

    /// Affine coordinates of a point
    pub fn public_pair(point: &PublicKey) -> (U256, U256) {
        let sec = point.serialize_uncompressed();
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&sec[1..33]);
        y.copy_from_slice(&sec[33..]);
        (from_be_bytes(&x), from_be_bytes(&y))
    }
}
