//! Textual and binary encodings shared by every network: hash160, base58check,
//! WIF, SEC and bech32 segwit v0.

use bech32::Hrp;
use ripemd::Ripemd160;
use secp256k1::{PublicKey, SecretKey};
use sha2::{Digest, Sha256};

/// RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let digest = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    out
}

/// Base58 with a trailing double-SHA256 checksum
pub fn b58check_encode(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Decode base58check; `None` on bad alphabet or checksum mismatch
pub fn b58check_decode(text: &str) -> Option<Vec<u8>> {
    bs58::decode(text).with_check(None).into_vec().ok()
}

/// SEC serialization of a point
pub fn sec(point: &PublicKey, compressed: bool) -> Vec<u8> {
    if compressed {
        point.serialize().to_vec()
    } else {
        point.serialize_uncompressed().to_vec()
    }
}

/// Wallet import format for a secret exponent
pub fn wif(prefix: u8, secret: &SecretKey, compressed: bool) -> String {
    let mut payload = Vec::with_capacity(34);
    payload.push(prefix);
    payload.extend_from_slice(&secret.secret_bytes());
    if compressed {
        payload.push(0x01);
    }
    b58check_encode(&payload)
}

/// Base58check address: one version byte followed by a hash160
pub fn address(prefix: u8, hash160: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(prefix);
    payload.extend_from_slice(hash160);
    b58check_encode(&payload)
}

/// Pay-to-witness-pubkey-hash redeem script: `OP_0 PUSH20 <hash160>`
pub fn p2wpkh_script(hash160: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(22);
    script.push(0x00);
    script.push(0x14);
    script.extend_from_slice(hash160);
    script
}

/// Bech32 segwit v0 address; `None` if `hrp` is not a valid human-readable part
pub fn segwit_address(hrp: &str, program: &[u8; 20]) -> Option<String> {
    let hrp = Hrp::parse(hrp).ok()?;
    bech32::segwit::encode_v0(hrp, program).ok()
}

/// Decode a segwit v0 address carrying a 20-byte program for `hrp`
pub fn decode_segwit_address(hrp: &str, text: &str) -> Option<[u8; 20]> {
    let (decoded_hrp, version, program) = bech32::segwit::decode(text).ok()?;
    if decoded_hrp.to_lowercase() != hrp.to_lowercase() || version.to_u8() != 0 {
        return None;
    }
    program.as_slice().try_into().ok()
}
