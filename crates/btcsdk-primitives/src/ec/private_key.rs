//! secp256k1 private keys.
//!
//! A [`PrivateKey`] is a scalar in `[1, n - 1]`. The key bytes are wiped
//! when the value is dropped.

use std::fmt;

use zeroize::Zeroize;

use crate::bigint::BigInt;
use crate::ec::point::Point;
use crate::ec::public_key::PublicKey;
use crate::ec::signature::{RecoveryId, Signature};
use crate::ecdsa::{self, NonceMode};
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
pub const PRIVATE_KEY_LEN: usize = 32;

/// A secp256k1 private key.
#[derive(Clone)]
pub struct PrivateKey {
    /// Big-endian scalar.
    bytes: [u8; PRIVATE_KEY_LEN],
}

impl PrivateKey {
    /// Generate a key from the operating system RNG.
    pub fn random() -> Self {
        let scalar = ecdsa::random_scalar();
        PrivateKey { bytes: crate::ec::curve::scalar_bytes(&scalar) }
    }

    /// Parse a 32-byte big-endian scalar, rejecting zero and values `>= n`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_LEN,
                bytes.len()
            )));
        }
        ecdsa::check_secret(&BigInt::from_bytes_be(bytes))?;
        let mut arr = [0u8; PRIVATE_KEY_LEN];
        arr.copy_from_slice(bytes);
        Ok(PrivateKey { bytes: arr })
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let mut bytes = hex::decode(hex_str)?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LEN] {
        self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    pub(crate) fn scalar(&self) -> BigInt {
        BigInt::from_bytes_be(&self.bytes)
    }

    /// Derive the matching public key, `d * G`.
    pub fn public_key(&self) -> PublicKey {
        match Point::mul_base(&self.scalar()).into_affine() {
            Some(point) => PublicKey::from_affine(point),
            // d is in [1, n - 1], and only multiples of n map to infinity.
            None => unreachable!("private scalar outside [1, n - 1]"),
        }
    }

    /// Sign a 32-byte digest with an RFC 6979 nonce.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        self.sign_with_nonce(digest, NonceMode::Deterministic)
    }

    /// Sign a 32-byte digest with the chosen nonce source.
    pub fn sign_with_nonce(&self, digest: &[u8; 32], mode: NonceMode) -> Result<Signature, PrimitivesError> {
        let (sig, _) = ecdsa::sign(&self.scalar(), digest, mode)?;
        Ok(sig)
    }

    /// Sign and also return the recovery id of the nonce point.
    pub fn sign_recoverable(&self, digest: &[u8; 32]) -> Result<(Signature, RecoveryId), PrimitivesError> {
        ecdsa::sign(&self.scalar(), digest, NonceMode::Deterministic)
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    /// Trezor/CoreBitcoin deterministic signing vectors.
    #[test]
    fn test_rfc6979_vectors() {
        let tests = [
            (
                "cca9fbcc1b41e5a95d369eaa6ddcff73b61a4efaa279cfc6567e8daa39cbaf50",
                "sample",
                "3045022100af340daf02cc15c8d5d08d7735dfe6b98a474ed373bdb5fbecf7571be52b384202205009fb27f37034a9b24b707b7c6b79ca23ddef9e25f7282e8a797efe53a8f124",
            ),
            (
                "0000000000000000000000000000000000000000000000000000000000000001",
                "Satoshi Nakamoto",
                "3045022100934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d802202442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5",
            ),
            (
                "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140",
                "Satoshi Nakamoto",
                "3045022100fd567d121db66e382991534ada77a6bd3106f0a1098c231e47993447cd6af2d002206b39cd0eb1bc8603e159ef5c20a5c8ad685a45b06ce9bebed3f153d10d93bed5",
            ),
            (
                "f8b8af8ce3c7cca5e300d33939540c10d45ce001b8f252bfbc57ba0342904181",
                "Alan Turing",
                "304402207063ae83e7f62bbb171798131b4a0564b956930092b33b07b395615d9ec7e15c022058dfcc1e00a35e1572f366ffe34ba0fc47db1e7189759b9fb233c5b05ab388ea",
            ),
            (
                "e91671c46231f833a6406ccbea0e3e392c76c167bac1cb013f6f1013980455c2",
                "There is a computer disease that anybody who works with computers knows about. It's a very serious disease and it interferes completely with the work. The trouble with computers is that you 'play' with them!",
                "3045022100b552edd27580141f3b2a5463048cb7cd3e047b97c9f98076c32dbdf85a68718b0220279fa72dd19bfae05577e06c7c0c1900c371fcd5893f7e1d56a37d30174671f6",
            ),
        ];

        for (key_hex, msg, expected) in &tests {
            let key = PrivateKey::from_hex(key_hex).unwrap();
            let digest = sha256(msg.as_bytes());
            let sig = key.sign(&digest).unwrap();
            assert_eq!(hex::encode(sig.to_der()), *expected, "message {msg:?}");
            assert!(key.public_key().verify(&digest, &sig));
        }
    }

    #[test]
    fn test_from_bytes_range() {
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
        assert!(PrivateKey::from_bytes(&crate::ec::curve::CURVE_ORDER_BYTES).is_err());
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());

        let mut max = crate::ec::curve::CURVE_ORDER_BYTES;
        max[31] -= 1;
        assert!(PrivateKey::from_bytes(&max).is_ok());
    }

    #[test]
    fn test_from_invalid_hex() {
        assert!(PrivateKey::from_hex("").is_err());
        assert!(PrivateKey::from_hex("not hex").is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        let key = PrivateKey::random();
        let parsed = PrivateKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(parsed, key);
        assert_eq!(parsed.public_key(), key.public_key());
    }

    #[test]
    fn test_debug_hides_key() {
        let key = PrivateKey::from_hex("0000000000000000000000000000000000000000000000000000000000000001").unwrap();
        assert_eq!(format!("{key:?}"), "PrivateKey(..)");
    }

    #[test]
    fn test_sign_recoverable_recovers_public_key() {
        let key = PrivateKey::random();
        let digest = sha256(b"recover me");
        let (sig, recid) = key.sign_recoverable(&digest).unwrap();
        let recovered = PublicKey::recover(&digest, &sig, recid).unwrap();
        assert_eq!(recovered, key.public_key());
    }
}
