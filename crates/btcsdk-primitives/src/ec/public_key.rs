//! secp256k1 public keys.
//!
//! A [`PublicKey`] wraps a finite [`AffinePoint`], so infinity is ruled
//! out by the type and both SEC1 encodings are infallible. It verifies
//! ECDSA signatures over 32-byte digests.

use std::fmt;

use crate::ec::point::{AffinePoint, Point, COMPRESSED_LEN, UNCOMPRESSED_LEN};
use crate::ec::signature::{RecoveryId, Signature};
use crate::ecdsa;
use crate::hash::hash160;
use crate::PrimitivesError;

/// A secp256k1 public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    point: AffinePoint,
}

impl PublicKey {
    /// Parse a compressed (33-byte) or uncompressed (65-byte) SEC1 key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPublicKey("pubkey is empty".to_string()));
        }
        Self::from_point(Point::from_sec1(bytes)?)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Wrap a curve point, rejecting infinity.
    pub fn from_point(point: Point) -> Result<Self, PrimitivesError> {
        let point = point.into_affine().ok_or(PrimitivesError::PointAtInfinity)?;
        Ok(PublicKey { point })
    }

    pub(crate) fn from_affine(point: AffinePoint) -> Self {
        PublicKey { point }
    }

    pub fn affine(&self) -> &AffinePoint {
        &self.point
    }

    /// The key as a group element.
    pub fn to_point(&self) -> Point {
        Point::from(self.point.clone())
    }

    /// Recover the signer's key from a digest, signature and recovery id.
    pub fn recover(digest: &[u8; 32], sig: &Signature, recovery_id: RecoveryId) -> Result<Self, PrimitivesError> {
        Self::from_point(ecdsa::recover(digest, sig, recovery_id)?)
    }

    /// 33-byte SEC1 encoding: parity byte then x.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        self.point.to_compressed()
    }

    /// 65-byte SEC1 encoding: `0x04`, x, y.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        self.point.to_uncompressed()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// RIPEMD-160 of SHA-256 of the compressed encoding.
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// ECDSA verification. Never fails; malformed input is simply `false`.
    pub fn verify(&self, digest: &[u8; 32], sig: &Signature) -> bool {
        ecdsa::verify(&self.to_point(), digest, sig)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SATOSHI_UNCOMPRESSED: &str = "0411db93e1dcdb8a016b49840f8c53bc1eb68a382e97b1482ecad7b148a6909a5cb2e0eaddfb84ccf9744464f82e160bfa9b8b64f9d4c03f999b8643f656b412a3";
    const COMPRESSED_EVEN: &str = "02ce0b14fb842b1ba549fdd675c98075f12e9c510f8ef52bd021a9a1f4809d3b4d";
    const COMPRESSED_ODD: &str = "032689c7c2dab13309fb143e0e8fe396342521887e976690b6b47f5b2a4b7d448e";

    /// Valid and invalid SEC1 encodings.
    #[test]
    fn test_pub_keys() {
        let mut x_changed = hex::decode(SATOSHI_UNCOMPRESSED).unwrap();
        x_changed[1] = 0x15;

        let cases: Vec<(&str, Vec<u8>, bool)> = vec![
            ("uncompressed ok", hex::decode(SATOSHI_UNCOMPRESSED).unwrap(), true),
            ("uncompressed x changed", x_changed, false),
            ("compressed ok (ybit = 0)", hex::decode(COMPRESSED_EVEN).unwrap(), true),
            ("compressed ok (ybit = 1)", hex::decode(COMPRESSED_ODD).unwrap(), true),
            ("wrong length", vec![0x05], false),
            ("empty", vec![], false),
        ];

        for (name, key, is_valid) in cases {
            let result = PublicKey::from_bytes(&key);
            assert_eq!(result.is_ok(), is_valid, "{name}: {:?}", result.err());
        }
    }

    #[test]
    fn test_compressed_round_trip() {
        for hex_key in [COMPRESSED_EVEN, COMPRESSED_ODD] {
            let pk = PublicKey::from_hex(hex_key).unwrap();
            assert_eq!(hex::encode(pk.to_compressed()), hex_key);
        }
    }

    #[test]
    fn test_uncompressed_and_compressed_agree() {
        let pk = PublicKey::from_hex(SATOSHI_UNCOMPRESSED).unwrap();
        assert_eq!(hex::encode(pk.to_uncompressed()), SATOSHI_UNCOMPRESSED);
        let again = PublicKey::from_bytes(&pk.to_compressed()).unwrap();
        assert_eq!(again, pk);
    }

    #[test]
    fn test_display() {
        let pk = PublicKey::from_hex(COMPRESSED_EVEN).unwrap();
        assert_eq!(pk.to_string(), COMPRESSED_EVEN);
    }

    #[test]
    fn test_from_point_rejects_infinity() {
        let err = PublicKey::from_point(Point::INFINITY).unwrap_err();
        assert!(matches!(err, PrimitivesError::PointAtInfinity));
        assert_eq!(err.kind(), crate::ErrorKind::Domain);
    }

    #[test]
    fn test_encodings_come_from_the_point() {
        let g = Point::generator();
        let pk = PublicKey::from_point(g.clone()).unwrap();
        assert_eq!(pk.to_compressed(), g.to_compressed().unwrap());
        assert_eq!(pk.to_uncompressed(), g.to_uncompressed().unwrap());
        assert_eq!(pk.to_point(), g);
        assert!(pk.to_compressed().iter().any(|b| *b != 0));
    }

    #[test]
    fn test_hash160_of_generator() {
        let pk = PublicKey::from_point(Point::generator()).unwrap();
        assert_eq!(hex::encode(pk.hash160()), "751e76e8199196d454941c45d1b3a323f1433bd6");
    }
}
