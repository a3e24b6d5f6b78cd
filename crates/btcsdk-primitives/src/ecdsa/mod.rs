//! ECDSA over secp256k1 on raw 32-byte digests.
//!
//! These functions work on scalars and points directly; [`PrivateKey`] and
//! [`PublicKey`] wrap them for everyday use.
//!
//! [`PrivateKey`]: crate::ec::PrivateKey
//! [`PublicKey`]: crate::ec::PublicKey

use rand::RngCore;
use sha2::digest::consts::U32;
use sha2::digest::generic_array::GenericArray;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::bigint::BigInt;
use crate::ec::curve::{scalar_bytes, scalar_inv, CURVE_ORDER, CURVE_ORDER_BYTES, FIELD_PRIME};
use crate::ec::point::Point;
use crate::ec::signature::{RecoveryId, Signature};
use crate::PrimitivesError;

/// How the per-signature nonce is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NonceMode {
    /// RFC 6979 with HMAC-SHA256: the same key and digest always give the
    /// same signature.
    #[default]
    Deterministic,
    /// A fresh nonce from the operating system RNG.
    Random,
}

/// Sign `digest` with the secret scalar `secret`.
///
/// The returned signature is always low-S. A nonce that yields `r = 0` or
/// `s = 0` is discarded and another is drawn. For RFC 6979 the retry feeds
/// an attempt counter in as additional data (section 3.6), so the first
/// attempt is the plain RFC 6979 nonce.
pub fn sign(
    secret: &BigInt,
    digest: &[u8; 32],
    mode: NonceMode,
) -> Result<(Signature, RecoveryId), PrimitivesError> {
    check_secret(secret)?;
    let n = &*CURVE_ORDER;
    let e = BigInt::from_bytes_be(digest);

    let secret_bytes = Zeroizing::new(scalar_bytes(secret));

    for attempt in 0u32.. {
        let k = match mode {
            NonceMode::Deterministic => rfc6979_nonce(&secret_bytes, digest, attempt),
            NonceMode::Random => random_scalar(),
        };
        let big_r = Point::mul_base(&k);
        let Some(affine) = big_r.as_affine() else {
            continue;
        };
        let (rx, ry) = (affine.x(), affine.y());

        let r = rx.reduce(n);
        if r.is_zero() {
            tracing::trace!("nonce produced r = 0, drawing another");
            continue;
        }

        let k_inv = scalar_inv(&k);
        let s = (&k_inv * (&e + &r * secret)).reduce(n);
        if s.is_zero() {
            tracing::trace!("nonce produced s = 0, drawing another");
            continue;
        }

        let mut recid = (ry.is_odd() as u8) | if *rx >= *n { 2 } else { 0 };
        let sig = Signature::new(r, s)?;
        let sig = if sig.is_low_s() {
            sig
        } else {
            recid = RecoveryId::new(recid)?.flip_parity().to_byte();
            sig.to_low_s()
        };
        return Ok((sig, RecoveryId::new(recid)?));
    }
    Err(PrimitivesError::InvalidSignature("nonce search exhausted".into()))
}

/// Check `sig` against `digest` and `public`.
///
/// A pure predicate: out-of-range components, the point at infinity and
/// any arithmetic dead end all yield `false`.
pub fn verify(public: &Point, digest: &[u8; 32], sig: &Signature) -> bool {
    let n = &*CURVE_ORDER;
    let (r, s) = (sig.r(), sig.s());
    if r.is_zero() || s.is_zero() || r >= n || s >= n || r.is_negative() || s.is_negative() {
        return false;
    }
    if public.is_infinity() || !public.is_on_curve() {
        return false;
    }

    let w = scalar_inv(s);
    let e = BigInt::from_bytes_be(digest);
    let u1 = (&e * &w).reduce(n);
    let u2 = (r * &w).reduce(n);

    let x = Point::mul_base(&u1).add(&public.mul(&u2));
    match x.as_affine() {
        None => false,
        Some(point) => point.x().reduce(n) == *r,
    }
}

/// Recover the public key that produced `sig` over `digest`.
pub fn recover(digest: &[u8; 32], sig: &Signature, recovery_id: RecoveryId) -> Result<Point, PrimitivesError> {
    let n = &*CURVE_ORDER;
    let r = sig.r();

    let x = if recovery_id.is_x_reduced() { r + n } else { r.clone() };
    if x >= *FIELD_PRIME {
        return Err(PrimitivesError::InvalidSignature("recovered x is not a field element".into()));
    }
    let big_r = Point::decompress(&x, recovery_id.is_y_odd())?;

    let r_inv = scalar_inv(r);
    let e = BigInt::from_bytes_be(digest);
    let u1 = (-(&r_inv * &e)).reduce(n);
    let u2 = (&r_inv * sig.s()).reduce(n);

    let q = Point::mul_base(&u1).add(&big_r.mul(&u2));
    if q.is_infinity() {
        return Err(PrimitivesError::PointAtInfinity);
    }
    Ok(q)
}

pub(crate) fn check_secret(secret: &BigInt) -> Result<(), PrimitivesError> {
    if secret.is_zero() || secret.is_negative() || *secret >= *CURVE_ORDER {
        return Err(PrimitivesError::InvalidPrivateKey("scalar must be in [1, n - 1]".into()));
    }
    Ok(())
}

/// Uniform scalar in `[1, n - 1]` by rejection sampling.
pub(crate) fn random_scalar() -> BigInt {
    let mut buf = [0u8; 32];
    loop {
        rand::rngs::OsRng.fill_bytes(&mut buf);
        let k = BigInt::from_bytes_be(&buf);
        if !k.is_zero() && k < *CURVE_ORDER {
            return k;
        }
    }
}

/// RFC 6979 nonce for `secret` and `digest` with HMAC-SHA256.
///
/// `attempt` zero is the standard nonce. Later attempts pass the counter as
/// the optional extra input `k'` so each retry gets an independent nonce.
fn rfc6979_nonce(secret: &[u8; 32], digest: &[u8; 32], attempt: u32) -> BigInt {
    // bits2octets: the digest reduced modulo n.
    let h = scalar_bytes(&BigInt::from_bytes_be(digest));
    let extra = attempt.to_be_bytes();
    let extra: &[u8] = if attempt == 0 { &[] } else { &extra };
    let k = rfc6979::generate_k::<Sha256, U32>(
        GenericArray::from_slice(&secret[..]),
        GenericArray::from_slice(&CURVE_ORDER_BYTES[..]),
        GenericArray::from_slice(&h[..]),
        extra,
    );
    BigInt::from_bytes_be(&k)
}
