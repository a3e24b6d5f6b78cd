//! Script number arithmetic with Bitcoin consensus rules.
//!
//! Numbers on the script stack are little-endian byte arrays with a sign bit
//! in the most significant bit of the last byte. Numeric opcodes read
//! operands of at most four bytes, but results may grow past that and stay
//! valid as long as they are never read back as numbers.

use std::cmp::Ordering;

use btcsdk_primitives::BigInt;

use super::error::{InterpreterError, InterpreterErrorCode};

/// A script number backed by an arbitrary-precision integer, so arithmetic
/// on in-range operands can never overflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptNumber(BigInt);

impl ScriptNumber {
    pub fn new(val: i64) -> Self {
        ScriptNumber(BigInt::from(val))
    }

    /// Parse a stack element.
    ///
    /// `max_len` is the widest accepted encoding; `require_minimal` rejects
    /// encodings with superfluous zero padding, including negative zero.
    pub fn from_bytes(bb: &[u8], max_len: usize, require_minimal: bool) -> Result<Self, InterpreterError> {
        if bb.len() > max_len {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NumberTooBig,
                format!(
                    "numeric value encoded as {:02x?} is {} bytes which exceeds the max allowed of {}",
                    bb,
                    bb.len(),
                    max_len
                ),
            ));
        }

        if require_minimal {
            check_minimal_data_encoding(bb)?;
        }

        let Some((&last, _)) = bb.split_last() else {
            return Ok(ScriptNumber(BigInt::zero()));
        };

        let mut magnitude = bb.to_vec();
        let negative = last & 0x80 != 0;
        if let Some(top) = magnitude.last_mut() {
            *top &= 0x7f;
        }
        Ok(ScriptNumber(BigInt::from_magnitude_le(negative, &magnitude)))
    }

    /// Minimal encoding of the value. Zero is the empty array.
    pub fn to_bytes(&self) -> Vec<u8> {
        let (negative, mut result) = self.0.to_magnitude_le();
        let Some(&last) = result.last() else {
            return Vec::new();
        };

        if last & 0x80 != 0 {
            // The top bit is taken, so the sign needs a byte of its own.
            result.push(if negative { 0x80 } else { 0x00 });
        } else if negative {
            let idx = result.len() - 1;
            result[idx] |= 0x80;
        }
        result
    }

    pub fn value(&self) -> &BigInt {
        &self.0
    }

    pub fn incr(&mut self) -> &mut Self {
        self.0 = &self.0 + BigInt::one();
        self
    }

    pub fn decr(&mut self) -> &mut Self {
        self.0 = &self.0 - BigInt::one();
        self
    }

    pub fn neg(&mut self) -> &mut Self {
        self.0 = -&self.0;
        self
    }

    pub fn abs(&mut self) -> &mut Self {
        self.0 = self.0.abs();
        self
    }

    pub fn set(&mut self, i: i64) -> &mut Self {
        self.0 = BigInt::from(i);
        self
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Convert to i32, clamping to [i32::MIN, i32::MAX] on overflow.
    pub fn to_i32(&self) -> i32 {
        self.to_i64().clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    /// Convert to i64, clamping to [i64::MIN, i64::MAX] on overflow.
    pub fn to_i64(&self) -> i64 {
        self.0.to_i64().unwrap_or(if self.0.is_negative() { i64::MIN } else { i64::MAX })
    }
}

impl From<i64> for ScriptNumber {
    fn from(val: i64) -> Self {
        ScriptNumber::new(val)
    }
}

impl From<BigInt> for ScriptNumber {
    fn from(val: BigInt) -> Self {
        ScriptNumber(val)
    }
}

impl PartialOrd for ScriptNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScriptNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// Check that a numeric stack element carries no superfluous padding.
pub fn check_minimal_data_encoding(v: &[u8]) -> Result<(), InterpreterError> {
    let Some((&last, rest)) = v.split_last() else {
        return Ok(());
    };

    // A padding byte is only allowed when it keeps the previous byte's top
    // bit from being read as the sign.
    if last & 0x7f == 0 && rest.last().map_or(true, |prev| prev & 0x80 == 0) {
        return Err(InterpreterError::new(
            InterpreterErrorCode::MinimalData,
            format!("numeric value encoded as {:02x?} is not minimally encoded", v),
        ));
    }
    Ok(())
}
