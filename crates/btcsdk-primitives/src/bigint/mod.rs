//! Arbitrary-precision signed integers.
//!
//! [`BigInt`] is an immutable value type: every operation returns a new
//! value. Plain arithmetic is exposed through the standard operator traits;
//! anything that can fail (division, modular reduction, modular inverse)
//! returns a `Result` so a zero divisor or a non-invertible value never
//! panics.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::Sign;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::PrimitivesError;

/// An arbitrary-precision signed integer.
///
/// The underlying representation never carries leading zero limbs, so two
/// equal values always compare and hash identically.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BigInt(num_bigint::BigInt);

impl BigInt {
    /// The value zero.
    pub fn zero() -> Self {
        BigInt(num_bigint::BigInt::zero())
    }

    /// The value one.
    pub fn one() -> Self {
        BigInt(num_bigint::BigInt::one())
    }

    /// Interpret `bytes` as an unsigned big-endian magnitude.
    ///
    /// An empty slice yields zero.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        BigInt(num_bigint::BigInt::from_bytes_be(Sign::Plus, bytes))
    }

    /// Parse an unsigned big-endian hex string.
    pub fn from_hex(s: &str) -> Result<Self, PrimitivesError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.is_empty() {
            return Err(PrimitivesError::InvalidHex("empty string".into()));
        }
        let padded = if s.len() % 2 == 1 { format!("0{s}") } else { s.to_string() };
        Ok(Self::from_bytes_be(&hex::decode(padded)?))
    }

    /// Build a value from a sign flag and a little-endian magnitude.
    pub fn from_magnitude_le(negative: bool, magnitude: &[u8]) -> Self {
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        BigInt(num_bigint::BigInt::from_bytes_le(sign, magnitude))
    }

    /// Split into a sign flag and a minimal little-endian magnitude.
    ///
    /// Zero yields `(false, [])`.
    pub fn to_magnitude_le(&self) -> (bool, Vec<u8>) {
        if self.0.is_zero() {
            return (false, Vec::new());
        }
        let (sign, bytes) = self.0.to_bytes_le();
        (sign == Sign::Minus, bytes)
    }

    /// Minimal big-endian magnitude. Zero yields an empty vector.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        if self.0.is_zero() {
            return Vec::new();
        }
        self.0.magnitude().to_bytes_be()
    }

    /// Export as an unsigned big-endian value left-padded to `width` bytes.
    ///
    /// Fails for negative values and for values that need more than
    /// `width` bytes.
    pub fn to_bytes_be_fixed(&self, width: usize) -> Result<Vec<u8>, PrimitivesError> {
        if self.is_negative() {
            return Err(PrimitivesError::ScalarOutOfRange(
                "negative values have no unsigned encoding".into(),
            ));
        }
        let magnitude = self.to_bytes_be();
        if magnitude.len() > width {
            return Err(PrimitivesError::ValueTooWide { needed: magnitude.len(), width });
        }
        let mut out = vec![0u8; width];
        out[width - magnitude.len()..].copy_from_slice(&magnitude);
        Ok(out)
    }

    /// Export as a 32-byte big-endian array, the width of every curve value.
    pub fn to_bytes32(&self) -> Result<[u8; 32], PrimitivesError> {
        let bytes = self.to_bytes_be_fixed(32)?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    /// Convert to `i64` if the value fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }

    /// Number of significant bits in the magnitude.
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    /// True for zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// True for one.
    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    /// True when strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// True when the value is odd. Sign does not matter: `-3` is odd.
    pub fn is_odd(&self) -> bool {
        self.0.is_odd()
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        BigInt(self.0.abs())
    }

    /// Quotient and remainder, truncating toward zero.
    ///
    /// The remainder takes the sign of the dividend, matching Rust's
    /// primitive integer `/` and `%`.
    pub fn div_rem(&self, divisor: &BigInt) -> Result<(BigInt, BigInt), PrimitivesError> {
        if divisor.is_zero() {
            return Err(PrimitivesError::DivisionByZero);
        }
        let (q, r) = self.0.div_rem(&divisor.0);
        Ok((BigInt(q), BigInt(r)))
    }

    /// Reduce into `[0, modulus)`. The modulus must be positive.
    pub fn modulo(&self, modulus: &BigInt) -> Result<BigInt, PrimitivesError> {
        check_modulus(modulus)?;
        Ok(BigInt(self.0.mod_floor(&modulus.0)))
    }

    /// `self^exponent mod modulus` for a non-negative exponent.
    pub fn mod_pow(&self, exponent: &BigInt, modulus: &BigInt) -> Result<BigInt, PrimitivesError> {
        check_modulus(modulus)?;
        if exponent.is_negative() {
            return Err(PrimitivesError::ScalarOutOfRange("negative exponent".into()));
        }
        let base = self.0.mod_floor(&modulus.0);
        Ok(BigInt(base.modpow(&exponent.0, &modulus.0)))
    }

    /// Multiplicative inverse modulo `modulus`.
    ///
    /// Fails with [`PrimitivesError::NotInvertible`] when
    /// `gcd(self, modulus) != 1`, including when `self` is a multiple of
    /// the modulus.
    pub fn mod_inverse(&self, modulus: &BigInt) -> Result<BigInt, PrimitivesError> {
        check_modulus(modulus)?;
        let a = self.0.mod_floor(&modulus.0);
        let egcd = a.extended_gcd(&modulus.0);
        if !egcd.gcd.is_one() {
            return Err(PrimitivesError::NotInvertible);
        }
        Ok(BigInt(egcd.x.mod_floor(&modulus.0)))
    }
}

impl BigInt {
    /// Reduce into `[0, modulus)` for a modulus already known to be
    /// positive. Curve arithmetic only calls this with compiled-in moduli.
    pub(crate) fn reduce(&self, modulus: &BigInt) -> BigInt {
        BigInt(self.0.mod_floor(&modulus.0))
    }

    /// `self^exponent mod modulus` for a known-positive modulus and a
    /// non-negative exponent.
    pub(crate) fn pow_reduce(&self, exponent: &BigInt, modulus: &BigInt) -> BigInt {
        BigInt(self.0.mod_floor(&modulus.0).modpow(&exponent.0, &modulus.0))
    }
}

fn check_modulus(modulus: &BigInt) -> Result<(), PrimitivesError> {
    if modulus.is_zero() {
        return Err(PrimitivesError::DivisionByZero);
    }
    if modulus.is_negative() {
        return Err(PrimitivesError::ScalarOutOfRange("modulus must be positive".into()));
    }
    Ok(())
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl From<i64> for BigInt {
    fn from(v: i64) -> Self {
        BigInt(num_bigint::BigInt::from(v))
    }
}

impl From<u64> for BigInt {
    fn from(v: u64) -> Self {
        BigInt(num_bigint::BigInt::from(v))
    }
}

impl From<u32> for BigInt {
    fn from(v: u32) -> Self {
        BigInt(num_bigint::BigInt::from(v))
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigInt({})", self.0)
    }
}

impl fmt::LowerHex for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

macro_rules! forward_binop {
    ($trait:ident, $method:ident) => {
        impl $trait<&BigInt> for &BigInt {
            type Output = BigInt;
            fn $method(self, rhs: &BigInt) -> BigInt {
                BigInt($trait::$method(&self.0, &rhs.0))
            }
        }

        impl $trait<BigInt> for BigInt {
            type Output = BigInt;
            fn $method(self, rhs: BigInt) -> BigInt {
                BigInt($trait::$method(self.0, rhs.0))
            }
        }

        impl $trait<&BigInt> for BigInt {
            type Output = BigInt;
            fn $method(self, rhs: &BigInt) -> BigInt {
                BigInt($trait::$method(self.0, &rhs.0))
            }
        }

        impl $trait<BigInt> for &BigInt {
            type Output = BigInt;
            fn $method(self, rhs: BigInt) -> BigInt {
                BigInt($trait::$method(&self.0, rhs.0))
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);

impl Neg for BigInt {
    type Output = BigInt;
    fn neg(self) -> BigInt {
        BigInt(-self.0)
    }
}

impl Neg for &BigInt {
    type Output = BigInt;
    fn neg(self) -> BigInt {
        BigInt(-&self.0)
    }
}
