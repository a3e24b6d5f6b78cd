/// Broad classification of a [`PrimitivesError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed bytes or text: bad DER, bad compact signature, bad SEC1
    /// point, bad hex, truncated wire data, value too wide for its slot.
    Encoding,
    /// A mathematically invalid request: non-invertible value, point off
    /// the curve, scalar outside its range, division by zero.
    Domain,
}

/// Unified error type for all primitives operations.
///
/// Covers big-integer arithmetic, curve points, keys, signatures and wire
/// decoding. Use [`PrimitivesError::kind`] to tell encoding defects from
/// domain defects.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("value is not invertible modulo the given modulus")]
    NotInvertible,

    #[error("division by zero")]
    DivisionByZero,

    #[error("value needs {needed} bytes but only {width} are available")]
    ValueTooWide { needed: usize, width: usize },

    #[error("point not on curve")]
    PointNotOnCurve,

    #[error("point at infinity is not a valid public key")]
    PointAtInfinity,

    #[error("scalar out of range: {0}")]
    ScalarOutOfRange(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid DER signature: {0}")]
    InvalidDer(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid recovery id {0}")]
    InvalidRecoveryId(u8),

    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("varint is not minimally encoded")]
    NonCanonicalVarInt,

    #[error("unexpected end of data")]
    UnexpectedEof,
}

impl PrimitivesError {
    /// Classify this error as an encoding or a domain defect.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrimitivesError::NotInvertible
            | PrimitivesError::DivisionByZero
            | PrimitivesError::PointNotOnCurve
            | PrimitivesError::PointAtInfinity
            | PrimitivesError::ScalarOutOfRange(_)
            | PrimitivesError::InvalidPrivateKey(_) => ErrorKind::Domain,
            PrimitivesError::ValueTooWide { .. }
            | PrimitivesError::InvalidPublicKey(_)
            | PrimitivesError::InvalidDer(_)
            | PrimitivesError::InvalidSignature(_)
            | PrimitivesError::InvalidRecoveryId(_)
            | PrimitivesError::InvalidLength { .. }
            | PrimitivesError::InvalidHex(_)
            | PrimitivesError::NonCanonicalVarInt
            | PrimitivesError::UnexpectedEof => ErrorKind::Encoding,
        }
    }
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
