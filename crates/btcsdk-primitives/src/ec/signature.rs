//! ECDSA signature values and their wire encodings.
//!
//! A [`Signature`] always holds `r` and `s` in `[1, n - 1]`. Decoders are
//! strict: DER input must be the minimal encoding (the shape enforced by
//! BIP66), and compact input must be exactly 64 bytes. Nothing is silently
//! corrected; encoders emit exactly the values stored, so low-S
//! normalization is an explicit step ([`Signature::to_low_s`]).

use crate::bigint::BigInt;
use crate::ec::curve::{scalar_bytes, CURVE_ORDER, HALF_ORDER};
use crate::PrimitivesError;

/// Length of the `r || s` compact encoding.
pub const COMPACT_LEN: usize = 64;

/// Length of the compact encoding prefixed with a recovery header byte.
pub const RECOVERABLE_COMPACT_LEN: usize = 65;

/// Smallest and largest well-formed DER signatures.
const MIN_DER_LEN: usize = 8;
const MAX_DER_LEN: usize = 72;

/// Header byte base for recoverable compact signatures.
const COMPACT_HEADER_BASE: u8 = 27;

/// Header offset marking a compressed public key.
const COMPACT_COMPRESSED_FLAG: u8 = 4;

/// An ECDSA signature `(r, s)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: BigInt,
    s: BigInt,
}

/// Which of the up to four curve points with x-coordinate `r` was the
/// nonce point. Bit 0 is the y parity, bit 1 is set when the x-coordinate
/// overflowed the group order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoveryId(u8);

impl RecoveryId {
    pub fn new(id: u8) -> Result<Self, PrimitivesError> {
        if id > 3 {
            return Err(PrimitivesError::InvalidRecoveryId(id));
        }
        Ok(RecoveryId(id))
    }

    pub fn to_byte(self) -> u8 {
        self.0
    }

    pub fn is_y_odd(self) -> bool {
        self.0 & 1 == 1
    }

    pub fn is_x_reduced(self) -> bool {
        self.0 & 2 == 2
    }

    /// Same point with the opposite y, as produced by negating `s`.
    pub(crate) fn flip_parity(self) -> Self {
        RecoveryId(self.0 ^ 1)
    }
}

impl Signature {
    /// Build a signature, checking both components are in `[1, n - 1]`.
    pub fn new(r: BigInt, s: BigInt) -> Result<Self, PrimitivesError> {
        check_component("r", &r)?;
        check_component("s", &s)?;
        Ok(Signature { r, s })
    }

    pub fn r(&self) -> &BigInt {
        &self.r
    }

    pub fn s(&self) -> &BigInt {
        &self.s
    }

    /// `true` when `s <= n / 2`.
    pub fn is_low_s(&self) -> bool {
        self.s <= *HALF_ORDER
    }

    /// Return the low-S form, replacing `s` with `n - s` when needed.
    pub fn to_low_s(&self) -> Signature {
        if self.is_low_s() {
            return self.clone();
        }
        Signature { r: self.r.clone(), s: &*CURVE_ORDER - &self.s }
    }

    /// Parse a strictly encoded DER signature.
    ///
    /// Layout: `0x30 len 0x02 rlen r 0x02 slen s`, with no trailing bytes,
    /// no negative integers and no superfluous leading zero bytes.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let len = bytes.len();
        if len < MIN_DER_LEN {
            return Err(der_error("too short"));
        }
        if len > MAX_DER_LEN {
            return Err(der_error("too long"));
        }
        if bytes[0] != 0x30 {
            return Err(der_error("missing sequence tag"));
        }
        if bytes[1] as usize != len - 2 {
            return Err(der_error("sequence length does not match data"));
        }

        let r_len = bytes[3] as usize;
        if 5 + r_len >= len {
            return Err(der_error("r length overruns signature"));
        }
        let s_len = bytes[5 + r_len] as usize;
        if r_len + s_len + 6 != len {
            return Err(der_error("integer lengths do not match sequence"));
        }

        let r_bytes = der_integer(&bytes[2..4 + r_len], "r")?;
        let s_bytes = der_integer(&bytes[4 + r_len..], "s")?;

        let r = BigInt::from_bytes_be(r_bytes);
        let s = BigInt::from_bytes_be(s_bytes);
        check_component("r", &r).map_err(|_| der_error("r is zero or not below the group order"))?;
        check_component("s", &s).map_err(|_| der_error("s is zero or not below the group order"))?;
        Ok(Signature { r, s })
    }

    /// Minimal DER encoding of the stored `(r, s)`.
    pub fn to_der(&self) -> Vec<u8> {
        let r = der_int_bytes(&self.r);
        let s = der_int_bytes(&self.s);

        let mut out = Vec::with_capacity(6 + r.len() + s.len());
        out.push(0x30);
        out.push((4 + r.len() + s.len()) as u8);
        out.push(0x02);
        out.push(r.len() as u8);
        out.extend_from_slice(&r);
        out.push(0x02);
        out.push(s.len() as u8);
        out.extend_from_slice(&s);
        out
    }

    /// Parse the 64-byte `r || s` encoding.
    pub fn from_compact(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != COMPACT_LEN {
            return Err(PrimitivesError::InvalidLength { expected: COMPACT_LEN, got: bytes.len() });
        }
        let r = BigInt::from_bytes_be(&bytes[..32]);
        let s = BigInt::from_bytes_be(&bytes[32..]);
        Self::new(r, s).map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))
    }

    /// 64-byte `r || s` encoding, each half big-endian.
    pub fn to_compact(&self) -> [u8; COMPACT_LEN] {
        let mut out = [0u8; COMPACT_LEN];
        out[..32].copy_from_slice(&scalar_bytes(&self.r));
        out[32..].copy_from_slice(&scalar_bytes(&self.s));
        out
    }

    /// 65-byte recoverable form: header `27 + recid (+ 4 if compressed)`
    /// followed by `r || s`.
    pub fn to_compact_recoverable(&self, recovery_id: RecoveryId, compressed: bool) -> [u8; RECOVERABLE_COMPACT_LEN] {
        let mut out = [0u8; RECOVERABLE_COMPACT_LEN];
        out[0] = COMPACT_HEADER_BASE
            + recovery_id.to_byte()
            + if compressed { COMPACT_COMPRESSED_FLAG } else { 0 };
        out[1..].copy_from_slice(&self.to_compact());
        out
    }

    /// Parse the 65-byte recoverable form.
    ///
    /// Returns the signature, its recovery id and whether the header marked
    /// the key as compressed.
    pub fn from_compact_recoverable(bytes: &[u8]) -> Result<(Self, RecoveryId, bool), PrimitivesError> {
        if bytes.len() != RECOVERABLE_COMPACT_LEN {
            return Err(PrimitivesError::InvalidLength {
                expected: RECOVERABLE_COMPACT_LEN,
                got: bytes.len(),
            });
        }
        let header = bytes[0];
        if !(COMPACT_HEADER_BASE..COMPACT_HEADER_BASE + 8).contains(&header) {
            return Err(PrimitivesError::InvalidSignature(format!(
                "invalid compact header byte 0x{header:02x}"
            )));
        }
        let offset = header - COMPACT_HEADER_BASE;
        let compressed = offset & COMPACT_COMPRESSED_FLAG != 0;
        let recovery_id = RecoveryId::new(offset & 3)?;
        let sig = Self::from_compact(&bytes[1..])?;
        Ok((sig, recovery_id, compressed))
    }
}

fn check_component(name: &str, v: &BigInt) -> Result<(), PrimitivesError> {
    if v.is_zero() || v.is_negative() || *v >= *CURVE_ORDER {
        return Err(PrimitivesError::ScalarOutOfRange(format!(
            "signature {name} must be in [1, n - 1]"
        )));
    }
    Ok(())
}

fn der_error(msg: &str) -> PrimitivesError {
    PrimitivesError::InvalidDer(msg.to_string())
}

/// Validate one `0x02 len value` element and return the value bytes.
fn der_integer<'a>(element: &'a [u8], name: &str) -> Result<&'a [u8], PrimitivesError> {
    if element[0] != 0x02 {
        return Err(der_error(&format!("{name} is not an integer")));
    }
    let value = &element[2..];
    if value.is_empty() {
        return Err(der_error(&format!("{name} has zero length")));
    }
    if value[0] & 0x80 != 0 {
        return Err(der_error(&format!("{name} is negative")));
    }
    if value.len() > 1 && value[0] == 0x00 && value[1] & 0x80 == 0 {
        return Err(der_error(&format!("{name} has an unnecessary leading zero")));
    }
    Ok(value)
}

/// Minimal big-endian bytes with a 0x00 pad when the top bit is set.
fn der_int_bytes(v: &BigInt) -> Vec<u8> {
    let mut bytes = v.to_bytes_be();
    if bytes.is_empty() {
        bytes.push(0);
    }
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0);
    }
    bytes
}
