//! secp256k1 domain parameters and prime-field helpers.
//!
//! The curve is `y^2 = x^3 + 7` over the field of integers modulo
//! [`FIELD_PRIME_BYTES`]. Every constant is compiled in and exposed through
//! lazily-built, read-only [`BigInt`] statics, so curve math never touches
//! mutable global state.

use std::sync::LazyLock;

use crate::bigint::BigInt;

/// Field prime `p = 2^256 - 2^32 - 977`, big-endian.
pub const FIELD_PRIME_BYTES: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xfc, 0x2f,
];

/// Group order `n`, big-endian.
pub const CURVE_ORDER_BYTES: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b,
    0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// `n / 2` rounded down; the largest low-S value.
pub const HALF_ORDER_BYTES: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d,
    0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// Base point x-coordinate.
pub const GENERATOR_X_BYTES: [u8; 32] = [
    0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac,
    0x55, 0xa0, 0x62, 0x95, 0xce, 0x87, 0x0b, 0x07,
    0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9,
    0x59, 0xf2, 0x81, 0x5b, 0x16, 0xf8, 0x17, 0x98,
];

/// Base point y-coordinate.
pub const GENERATOR_Y_BYTES: [u8; 32] = [
    0x48, 0x3a, 0xda, 0x77, 0x26, 0xa3, 0xc4, 0x65,
    0x5d, 0xa4, 0xfb, 0xfc, 0x0e, 0x11, 0x08, 0xa8,
    0xfd, 0x17, 0xb4, 0x48, 0xa6, 0x85, 0x54, 0x19,
    0x9c, 0x47, 0xd0, 0x8f, 0xfb, 0x10, 0xd4, 0xb8,
];

/// Field prime `p`.
pub static FIELD_PRIME: LazyLock<BigInt> = LazyLock::new(|| BigInt::from_bytes_be(&FIELD_PRIME_BYTES));

/// Group order `n`.
pub static CURVE_ORDER: LazyLock<BigInt> = LazyLock::new(|| BigInt::from_bytes_be(&CURVE_ORDER_BYTES));

/// `n / 2`.
pub static HALF_ORDER: LazyLock<BigInt> = LazyLock::new(|| BigInt::from_bytes_be(&HALF_ORDER_BYTES));

/// Curve coefficient `b = 7`.
pub static CURVE_B: LazyLock<BigInt> = LazyLock::new(|| BigInt::from(7u64));

/// Exponent `(p + 1) / 4` used for square roots, valid because `p = 3 mod 4`.
const SQRT_EXPONENT_BYTES: [u8; 32] = [
    0x3f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xbf, 0xff, 0xff, 0x0c,
];

static SQRT_EXPONENT: LazyLock<BigInt> = LazyLock::new(|| BigInt::from_bytes_be(&SQRT_EXPONENT_BYTES));

/// Exponent `p - 2` used for Fermat inversion in the field.
static INVERSE_EXPONENT: LazyLock<BigInt> =
    LazyLock::new(|| &*FIELD_PRIME - BigInt::from(2u64));

/// Exponent `n - 2` used for Fermat inversion of scalars.
static ORDER_INVERSE_EXPONENT: LazyLock<BigInt> =
    LazyLock::new(|| &*CURVE_ORDER - BigInt::from(2u64));

pub(crate) fn fadd(a: &BigInt, b: &BigInt) -> BigInt {
    (a + b).reduce(&FIELD_PRIME)
}

pub(crate) fn fsub(a: &BigInt, b: &BigInt) -> BigInt {
    (a - b).reduce(&FIELD_PRIME)
}

pub(crate) fn fmul(a: &BigInt, b: &BigInt) -> BigInt {
    (a * b).reduce(&FIELD_PRIME)
}

pub(crate) fn fsqr(a: &BigInt) -> BigInt {
    fmul(a, a)
}

/// Field inverse by Fermat's little theorem. Zero maps to zero, so callers
/// must rule it out first.
pub(crate) fn finv(a: &BigInt) -> BigInt {
    a.pow_reduce(&INVERSE_EXPONENT, &FIELD_PRIME)
}

/// Scalar inverse modulo `n` by Fermat's little theorem. Zero maps to zero.
pub(crate) fn scalar_inv(a: &BigInt) -> BigInt {
    a.pow_reduce(&ORDER_INVERSE_EXPONENT, &CURVE_ORDER)
}

/// Right-hand side of the curve equation, `x^3 + 7 mod p`.
pub(crate) fn curve_rhs(x: &BigInt) -> BigInt {
    fadd(&fmul(&fsqr(x), x), &CURVE_B)
}

/// Square root modulo `p`, or `None` when `a` is not a quadratic residue.
pub fn field_sqrt(a: &BigInt) -> Option<BigInt> {
    let a = a.reduce(&FIELD_PRIME);
    let root = a.pow_reduce(&SQRT_EXPONENT, &FIELD_PRIME);
    if fsqr(&root) == a {
        Some(root)
    } else {
        None
    }
}

/// Canonical 32-byte big-endian encoding of `v mod p`.
pub(crate) fn field_bytes(v: &BigInt) -> [u8; 32] {
    fixed32(&v.reduce(&FIELD_PRIME))
}

/// Canonical 32-byte big-endian encoding of `v mod n`.
pub(crate) fn scalar_bytes(v: &BigInt) -> [u8; 32] {
    fixed32(&v.reduce(&CURVE_ORDER))
}

// Both moduli are below 2^256, so a reduced value always fits.
fn fixed32(reduced: &BigInt) -> [u8; 32] {
    let magnitude = reduced.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - magnitude.len()..].copy_from_slice(&magnitude);
    out
}
