//! secp256k1 group elements.
//!
//! [`Point`] is either a finite [`AffinePoint`] or the point at infinity,
//! the group identity. Both types are opaque: coordinates are always reduced
//! modulo `p` and satisfy the curve equation, because the only ways to get a
//! point are the checked constructors, SEC1 decoding and group arithmetic.
//! Public arithmetic is affine; scalar multiplication runs internally in
//! Jacobian coordinates so it needs a single field inversion at the end.

use std::sync::LazyLock;

use crate::bigint::BigInt;
use crate::ec::curve::{
    curve_rhs, fadd, field_bytes, field_sqrt, finv, fmul, fsqr, fsub, scalar_bytes, FIELD_PRIME,
    GENERATOR_X_BYTES, GENERATOR_Y_BYTES,
};
use crate::PrimitivesError;

/// Length of a compressed SEC1 encoding.
pub const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed SEC1 encoding.
pub const UNCOMPRESSED_LEN: usize = 65;

static GENERATOR: LazyLock<Point> = LazyLock::new(|| {
    Point::from_reduced(BigInt::from_bytes_be(&GENERATOR_X_BYTES), BigInt::from_bytes_be(&GENERATOR_Y_BYTES))
});

/// A finite point on secp256k1 with both coordinates in `[0, p)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AffinePoint {
    x: BigInt,
    y: BigInt,
}

impl AffinePoint {
    pub fn x(&self) -> &BigInt {
        &self.x
    }

    pub fn y(&self) -> &BigInt {
        &self.y
    }

    /// 33-byte compressed SEC1 encoding.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let mut out = [0u8; COMPRESSED_LEN];
        out[0] = if self.y.is_odd() { 0x03 } else { 0x02 };
        out[1..].copy_from_slice(&field_bytes(&self.x));
        out
    }

    /// 65-byte uncompressed SEC1 encoding.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out[0] = 0x04;
        out[1..33].copy_from_slice(&field_bytes(&self.x));
        out[33..].copy_from_slice(&field_bytes(&self.y));
        out
    }
}

/// A point on secp256k1, or the point at infinity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Point(Option<AffinePoint>);

impl Point {
    /// The group identity. Has no SEC1 encoding.
    pub const INFINITY: Point = Point(None);

    /// Build an affine point, rejecting coordinates outside `[0, p)` and
    /// pairs that miss the curve equation.
    pub fn new(x: BigInt, y: BigInt) -> Result<Self, PrimitivesError> {
        if !is_field_element(&x) || !is_field_element(&y) {
            return Err(PrimitivesError::PointNotOnCurve);
        }
        if fsqr(&y) != curve_rhs(&x) {
            return Err(PrimitivesError::PointNotOnCurve);
        }
        Ok(Self::from_reduced(x, y))
    }

    /// Wrap coordinates that are reduced and on the curve by construction.
    fn from_reduced(x: BigInt, y: BigInt) -> Self {
        Point(Some(AffinePoint { x, y }))
    }

    /// The fixed base point `G`.
    pub fn generator() -> Self {
        GENERATOR.clone()
    }

    pub fn is_infinity(&self) -> bool {
        self.0.is_none()
    }

    /// The finite point, or `None` for infinity.
    pub fn as_affine(&self) -> Option<&AffinePoint> {
        self.0.as_ref()
    }

    pub fn into_affine(self) -> Option<AffinePoint> {
        self.0
    }

    /// Check that the coordinates lie in `[0, p)` and satisfy
    /// `y^2 = x^3 + 7 (mod p)`.
    ///
    /// The point at infinity is a group element and reports `true`; public
    /// key validation rejects it separately.
    pub fn is_on_curve(&self) -> bool {
        match &self.0 {
            None => true,
            Some(AffinePoint { x, y }) => {
                is_field_element(x) && is_field_element(y) && fsqr(y) == curve_rhs(x)
            }
        }
    }

    pub fn x(&self) -> Option<&BigInt> {
        self.0.as_ref().map(AffinePoint::x)
    }

    pub fn y(&self) -> Option<&BigInt> {
        self.0.as_ref().map(AffinePoint::y)
    }

    /// Additive inverse, `(x, p - y)`.
    pub fn negate(&self) -> Self {
        match &self.0 {
            None => Point::INFINITY,
            Some(AffinePoint { x, y }) => Self::from_reduced(x.clone(), fsub(&BigInt::zero(), y)),
        }
    }

    /// Group addition.
    ///
    /// Infinity is the identity, `P + (-P)` is infinity, and `P + P` falls
    /// through to [`Point::double`].
    pub fn add(&self, other: &Point) -> Point {
        let (a, b) = match (&self.0, &other.0) {
            (None, _) => return other.clone(),
            (_, None) => return self.clone(),
            (Some(a), Some(b)) => (a, b),
        };

        if a.x == b.x {
            if a.y == b.y {
                return self.double();
            }
            return Point::INFINITY;
        }

        let lambda = fmul(&fsub(&b.y, &a.y), &finv(&fsub(&b.x, &a.x)));
        let x3 = fsub(&fsub(&fsqr(&lambda), &a.x), &b.x);
        let y3 = fsub(&fmul(&lambda, &fsub(&a.x, &x3)), &a.y);
        Self::from_reduced(x3, y3)
    }

    /// Point doubling. Points with `y = 0` double to infinity.
    pub fn double(&self) -> Point {
        let Some(AffinePoint { x, y }) = &self.0 else {
            return Point::INFINITY;
        };
        if y.is_zero() {
            return Point::INFINITY;
        }

        let three_x2 = fmul(&BigInt::from(3u64), &fsqr(x));
        let lambda = fmul(&three_x2, &finv(&fadd(y, y)));
        let x3 = fsub(&fsqr(&lambda), &fadd(x, x));
        let y3 = fsub(&fmul(&lambda, &fsub(x, &x3)), y);
        Self::from_reduced(x3, y3)
    }

    /// Scalar multiplication `k * self`.
    ///
    /// `k` is reduced modulo the group order first, so zero and multiples
    /// of `n` yield infinity and negative scalars wrap. The ladder performs
    /// one addition and one doubling per bit regardless of the bit's value.
    pub fn mul(&self, k: &BigInt) -> Point {
        let Some(affine) = &self.0 else {
            return Point::INFINITY;
        };
        let scalar = scalar_bytes(k);

        let base = Jacobian::from_affine(affine);
        let mut r0 = Jacobian::infinity();
        let mut r1 = base;
        for byte in scalar {
            for shift in (0..8).rev() {
                if (byte >> shift) & 1 == 0 {
                    r1 = r0.add(&r1);
                    r0 = r0.double();
                } else {
                    r0 = r0.add(&r1);
                    r1 = r1.double();
                }
            }
        }
        r0.to_point()
    }

    /// `k * G`.
    pub fn mul_base(k: &BigInt) -> Point {
        GENERATOR.mul(k)
    }

    /// Decode a SEC1 point: `0x02`/`0x03` + x, or `0x04` + x + y.
    ///
    /// The hybrid `0x06`/`0x07` forms are rejected. Compressed input
    /// recovers y from the curve equation and the parity flag.
    pub fn from_sec1(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        match (bytes.first(), bytes.len()) {
            (Some(prefix @ (0x02 | 0x03)), COMPRESSED_LEN) => {
                let x = BigInt::from_bytes_be(&bytes[1..]);
                Self::decompress(&x, *prefix == 0x03)
            }
            (Some(0x04), UNCOMPRESSED_LEN) => {
                let x = BigInt::from_bytes_be(&bytes[1..33]);
                let y = BigInt::from_bytes_be(&bytes[33..]);
                Self::new(x, y)
            }
            (Some(prefix), len) => Err(PrimitivesError::InvalidPublicKey(format!(
                "unsupported encoding: prefix 0x{prefix:02x}, {len} bytes"
            ))),
            (None, _) => Err(PrimitivesError::InvalidPublicKey("empty input".into())),
        }
    }

    /// Recover the point with the given x-coordinate and y parity.
    pub fn decompress(x: &BigInt, odd: bool) -> Result<Self, PrimitivesError> {
        if !is_field_element(x) {
            return Err(PrimitivesError::PointNotOnCurve);
        }
        let y = field_sqrt(&curve_rhs(x)).ok_or(PrimitivesError::PointNotOnCurve)?;
        let y = if y.is_odd() == odd { y } else { fsub(&BigInt::zero(), &y) };
        Ok(Self::from_reduced(x.clone(), y))
    }

    /// 33-byte compressed SEC1 encoding.
    pub fn to_compressed(&self) -> Result<[u8; COMPRESSED_LEN], PrimitivesError> {
        self.as_affine().map(AffinePoint::to_compressed).ok_or(PrimitivesError::PointAtInfinity)
    }

    /// 65-byte uncompressed SEC1 encoding.
    pub fn to_uncompressed(&self) -> Result<[u8; UNCOMPRESSED_LEN], PrimitivesError> {
        self.as_affine().map(AffinePoint::to_uncompressed).ok_or(PrimitivesError::PointAtInfinity)
    }
}

impl From<AffinePoint> for Point {
    fn from(point: AffinePoint) -> Self {
        Point(Some(point))
    }
}

fn is_field_element(v: &BigInt) -> bool {
    !v.is_negative() && *v < *FIELD_PRIME
}

/// Jacobian coordinates `(X, Y, Z)` for `(X / Z^2, Y / Z^3)`; `Z = 0` is
/// infinity.
struct Jacobian {
    x: BigInt,
    y: BigInt,
    z: BigInt,
}

impl Jacobian {
    fn infinity() -> Self {
        Jacobian { x: BigInt::one(), y: BigInt::one(), z: BigInt::zero() }
    }

    fn from_affine(p: &AffinePoint) -> Self {
        Jacobian { x: p.x.clone(), y: p.y.clone(), z: BigInt::one() }
    }

    fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    fn to_point(&self) -> Point {
        if self.is_infinity() {
            return Point::INFINITY;
        }
        let z_inv = finv(&self.z);
        let z_inv2 = fsqr(&z_inv);
        let z_inv3 = fmul(&z_inv2, &z_inv);
        Point::from_reduced(fmul(&self.x, &z_inv2), fmul(&self.y, &z_inv3))
    }

    fn double(&self) -> Self {
        if self.is_infinity() || self.y.is_zero() {
            return Self::infinity();
        }
        let a = fsqr(&self.x);
        let b = fsqr(&self.y);
        let c = fsqr(&b);
        let x_plus_b = fadd(&self.x, &b);
        let d = fsub(&fsub(&fsqr(&x_plus_b), &a), &c);
        let d = fadd(&d, &d);
        let e = fadd(&fadd(&a, &a), &a);
        let f = fsqr(&e);

        let x3 = fsub(&f, &fadd(&d, &d));
        let eight_c = fmul(&BigInt::from(8u64), &c);
        let y3 = fsub(&fmul(&e, &fsub(&d, &x3)), &eight_c);
        let yz = fmul(&self.y, &self.z);
        let z3 = fadd(&yz, &yz);
        Jacobian { x: x3, y: y3, z: z3 }
    }

    fn add(&self, other: &Jacobian) -> Self {
        if self.is_infinity() {
            return Jacobian { x: other.x.clone(), y: other.y.clone(), z: other.z.clone() };
        }
        if other.is_infinity() {
            return Jacobian { x: self.x.clone(), y: self.y.clone(), z: self.z.clone() };
        }

        let z1z1 = fsqr(&self.z);
        let z2z2 = fsqr(&other.z);
        let u1 = fmul(&self.x, &z2z2);
        let u2 = fmul(&other.x, &z1z1);
        let s1 = fmul(&fmul(&self.y, &other.z), &z2z2);
        let s2 = fmul(&fmul(&other.y, &self.z), &z1z1);

        if u1 == u2 {
            if s1 == s2 {
                return self.double();
            }
            return Self::infinity();
        }

        let h = fsub(&u2, &u1);
        let r = fsub(&s2, &s1);
        let h2 = fsqr(&h);
        let h3 = fmul(&h2, &h);
        let u1h2 = fmul(&u1, &h2);

        let x3 = fsub(&fsub(&fsqr(&r), &h3), &fadd(&u1h2, &u1h2));
        let y3 = fsub(&fmul(&r, &fsub(&u1h2, &x3)), &fmul(&s1, &h3));
        let z3 = fmul(&fmul(&h, &self.z), &other.z);
        Jacobian { x: x3, y: y3, z: z3 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec::curve::CURVE_ORDER;

    const G2_COMPRESSED: &str = "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";
    const G3_COMPRESSED: &str = "02f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9";

    fn hex_point(s: &str) -> Point {
        Point::from_sec1(&hex::decode(s).unwrap()).unwrap()
    }

    #[test]
    fn test_generator_on_curve() {
        assert!(Point::generator().is_on_curve());
    }

    #[test]
    fn test_double_matches_known_2g() {
        let g2 = Point::generator().double();
        assert_eq!(hex::encode(g2.to_compressed().unwrap()), G2_COMPRESSED);
    }

    #[test]
    fn test_add_matches_known_3g() {
        let g = Point::generator();
        let g3 = g.double().add(&g);
        assert_eq!(hex::encode(g3.to_compressed().unwrap()), G3_COMPRESSED);
        assert_eq!(Point::mul_base(&BigInt::from(3u64)), g3);
    }

    #[test]
    fn test_infinity_is_identity() {
        let g = Point::generator();
        assert_eq!(g.add(&Point::INFINITY), g);
        assert_eq!(Point::INFINITY.add(&g), g);
        assert_eq!(g.add(&g.negate()), Point::INFINITY);
        assert_eq!(Point::INFINITY.double(), Point::INFINITY);
    }

    #[test]
    fn test_mul_by_zero_and_order() {
        assert!(Point::mul_base(&BigInt::zero()).is_infinity());
        assert!(Point::mul_base(&CURVE_ORDER).is_infinity());
        let n_minus_one = &*CURVE_ORDER - BigInt::one();
        assert_eq!(Point::mul_base(&n_minus_one), Point::generator().negate());
    }

    #[test]
    fn test_mul_matches_repeated_addition() {
        let g = Point::generator();
        let mut acc = Point::INFINITY;
        for k in 1u64..=7 {
            acc = acc.add(&g);
            assert_eq!(Point::mul_base(&BigInt::from(k)), acc, "k = {k}");
        }
    }

    #[test]
    fn test_sec1_round_trip() {
        let p = Point::mul_base(&BigInt::from(0xabcdefu64));
        let compressed = p.to_compressed().unwrap();
        let uncompressed = p.to_uncompressed().unwrap();
        assert_eq!(Point::from_sec1(&compressed).unwrap(), p);
        assert_eq!(Point::from_sec1(&uncompressed).unwrap(), p);
        assert_eq!(Point::from_sec1(&compressed).unwrap().to_compressed().unwrap(), compressed);
    }

    #[test]
    fn test_decompress_odd_parity() {
        let g = Point::generator();
        let neg = g.negate();
        let neg_bytes = neg.to_compressed().unwrap();
        assert_ne!(neg_bytes[0], g.to_compressed().unwrap()[0]);
        assert_eq!(Point::from_sec1(&neg_bytes).unwrap(), neg);
    }

    #[test]
    fn test_sec1_rejects_bad_input() {
        assert!(Point::from_sec1(&[]).is_err());
        assert!(Point::from_sec1(&[0x05; 33]).is_err());

        let mut hybrid = Point::generator().to_uncompressed().unwrap();
        hybrid[0] = 0x06;
        assert!(Point::from_sec1(&hybrid).is_err());

        let mut off_curve = Point::generator().to_uncompressed().unwrap();
        off_curve[64] ^= 1;
        let err = Point::from_sec1(&off_curve).unwrap_err();
        assert!(matches!(err, PrimitivesError::PointNotOnCurve));

        // x = p is out of range.
        let mut too_big = [0u8; 33];
        too_big[0] = 0x02;
        too_big[1..].copy_from_slice(&crate::ec::curve::FIELD_PRIME_BYTES);
        assert!(Point::from_sec1(&too_big).is_err());
    }

    #[test]
    fn test_new_rejects_off_curve() {
        assert!(Point::new(BigInt::one(), BigInt::one()).is_err());
    }

    #[test]
    fn test_unreduced_coordinates_are_rejected() {
        // x = 1 is on the curve, and x = 1 + p satisfies the equation mod p.
        let real = Point::decompress(&BigInt::one(), false).unwrap();
        let y = real.y().unwrap().clone();
        let x_alias = BigInt::one() + &*FIELD_PRIME;
        let y_alias = &y + &*FIELD_PRIME;

        assert_eq!(fsqr(&y_alias), curve_rhs(&x_alias));
        assert!(matches!(Point::new(x_alias.clone(), y.clone()), Err(PrimitivesError::PointNotOnCurve)));
        assert!(Point::new(BigInt::one(), y_alias).is_err());
        assert!(Point::new(BigInt::one(), -y.clone()).is_err());
        assert!(Point::decompress(&x_alias, false).is_err());
        assert_eq!(Point::new(BigInt::one(), y).unwrap(), real);
        assert!(real.is_on_curve());
    }

    #[test]
    fn test_affine_view_encodes_like_point() {
        let p = Point::mul_base(&BigInt::from(42u64));
        let affine = p.as_affine().unwrap().clone();
        assert_eq!(affine.to_compressed(), p.to_compressed().unwrap());
        assert_eq!(affine.to_uncompressed(), p.to_uncompressed().unwrap());
        assert_eq!(Point::from(affine.clone()), p);
        assert_eq!(p.clone().into_affine(), Some(affine));
        assert!(Point::INFINITY.as_affine().is_none());
    }

    #[test]
    fn test_infinity_has_no_encoding() {
        assert!(Point::INFINITY.to_compressed().is_err());
        assert!(Point::INFINITY.to_uncompressed().is_err());
    }
}
