//! Legacy (pre-segwit) signature hash computation.
//!
//! The digest an input's signature commits to is the double SHA-256 of a
//! modified copy of the transaction: the signed input carries the script
//! code, the other inputs carry empty scripts, and the sighash type decides
//! which inputs and outputs are kept. The four byte sighash type is appended
//! before hashing. The spent output's value is not part of this digest.

use std::fmt;
use std::ops::BitOr;

use btcsdk_primitives::hash::sha256d;
use btcsdk_primitives::util::{ByteWriter, VarInt};
use btcsdk_script::Script;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::transaction::Transaction;

/// Digest returned when there is nothing valid to sign: the integer one,
/// little-endian. Signatures over it are valid for any transaction.
pub const SIGHASH_SINGLE_BUG: [u8; 32] = {
    let mut one = [0u8; 32];
    one[0] = 0x01;
    one
};

/// Output value written for blanked outputs under SIGHASH_SINGLE.
const BLANK_OUTPUT_VALUE: u64 = u64::MAX;

/// Sighash type: a base type in the low five bits plus the ANYONECANPAY bit.
///
/// Signatures carry it as a single trailing byte; the preimage carries it as
/// four little-endian bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SigHashType(pub u32);

impl SigHashType {
    /// Sign all inputs and all outputs.
    pub const ALL: SigHashType = SigHashType(0x01);
    /// Sign all inputs but no outputs.
    pub const NONE: SigHashType = SigHashType(0x02);
    /// Sign all inputs and only the output at the signed input's index.
    pub const SINGLE: SigHashType = SigHashType(0x03);
    /// Combined with a base type: sign only the signed input.
    pub const ANYONECANPAY: SigHashType = SigHashType(0x80);

    /// Mask selecting the base type.
    pub const MASK: u32 = 0x1f;

    /// From a signature's trailing byte.
    pub fn from_byte(b: u8) -> Self {
        SigHashType(b as u32)
    }

    /// The byte appended to a DER signature.
    pub fn to_byte(self) -> u8 {
        self.0 as u8
    }

    pub fn base_type(self) -> u32 {
        self.0 & Self::MASK
    }

    pub fn has_anyone_can_pay(self) -> bool {
        self.0 & Self::ANYONECANPAY.0 != 0
    }

    fn is_none(self) -> bool {
        self.base_type() == Self::NONE.0
    }

    fn is_single(self) -> bool {
        self.base_type() == Self::SINGLE.0
    }
}

impl Default for SigHashType {
    fn default() -> Self {
        SigHashType::ALL
    }
}

impl BitOr for SigHashType {
    type Output = SigHashType;

    fn bitor(self, rhs: SigHashType) -> SigHashType {
        SigHashType(self.0 | rhs.0)
    }
}

impl fmt::Display for SigHashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match self.base_type() {
            0x01 => "ALL",
            0x02 => "NONE",
            0x03 => "SINGLE",
            _ => return write!(f, "0x{:02x}", self.0),
        };
        if self.has_anyone_can_pay() {
            write!(f, "{}|ANYONECANPAY", base)
        } else {
            f.write_str(base)
        }
    }
}

/// Compute the legacy signature hash for input `input_idx`.
///
/// Returns [`SIGHASH_SINGLE_BUG`] when `input_idx` is out of range, or when
/// the type is SINGLE and there is no output at `input_idx`.
///
/// # Arguments
/// * `tx` - The spending transaction.
/// * `input_idx` - Index of the input being signed.
/// * `script_code` - The script the signature commits to: the spent
///   output's locking script, or the part of it after the last executed
///   OP_CODESEPARATOR.
/// * `sighash_type` - Which parts of the transaction are signed.
pub fn signature_hash(tx: &Transaction, input_idx: usize, script_code: &Script, sighash_type: SigHashType) -> [u8; 32] {
    match legacy_preimage(tx, input_idx, script_code, sighash_type) {
        Some(preimage) => {
            let digest = sha256d(&preimage);
            debug!(
                input_idx,
                sighash_type = %sighash_type,
                preimage_len = preimage.len(),
                digest = %hex::encode(digest),
                "computed legacy sighash"
            );
            digest
        }
        None => {
            warn!(
                input_idx,
                inputs = tx.inputs.len(),
                outputs = tx.outputs.len(),
                sighash_type = %sighash_type,
                "no output or input to sign, using the constant one digest"
            );
            SIGHASH_SINGLE_BUG
        }
    }
}

/// The serialized transaction copy that [`signature_hash`] double hashes.
///
/// `None` in the two cases where legacy signing commits to
/// [`SIGHASH_SINGLE_BUG`] instead of a preimage.
///
/// The layout is the normal transaction serialization with these changes:
/// 1. the signed input's script is `script_code` with its OP_CODESEPARATORs
///    removed, every other input's script is empty;
/// 2. NONE and SINGLE zero the other inputs' sequence numbers;
/// 3. ANYONECANPAY keeps only the signed input;
/// 4. NONE drops all outputs; SINGLE keeps outputs up to `input_idx`, with
///    the earlier ones blanked (value -1, empty script);
/// 5. the sighash type follows the lock time as a 4-byte LE integer.
pub fn legacy_preimage(
    tx: &Transaction,
    input_idx: usize,
    script_code: &Script,
    sighash_type: SigHashType,
) -> Option<Vec<u8>> {
    if input_idx >= tx.inputs.len() {
        return None;
    }
    if sighash_type.is_single() && input_idx >= tx.outputs.len() {
        return None;
    }

    let script_code = script_code.without_code_separators();
    let anyone_can_pay = sighash_type.has_anyone_can_pay();
    let zero_other_sequences = sighash_type.is_none() || sighash_type.is_single();

    let mut writer = ByteWriter::with_capacity(256 + script_code.len());
    writer.write_u32_le(tx.version);

    if anyone_can_pay {
        writer.write_varint(VarInt::from(1u64));
        let input = &tx.inputs[input_idx];
        input.write_with_script(&mut writer, script_code.to_bytes(), input.sequence);
    } else {
        writer.write_varint(VarInt::from(tx.inputs.len()));
        for (i, input) in tx.inputs.iter().enumerate() {
            if i == input_idx {
                input.write_with_script(&mut writer, script_code.to_bytes(), input.sequence);
            } else {
                let sequence = if zero_other_sequences { 0 } else { input.sequence };
                input.write_with_script(&mut writer, &[], sequence);
            }
        }
    }

    if sighash_type.is_none() {
        writer.write_varint(VarInt::from(0u64));
    } else if sighash_type.is_single() {
        writer.write_varint(VarInt::from(input_idx + 1));
        for _ in 0..input_idx {
            writer.write_u64_le(BLANK_OUTPUT_VALUE);
            writer.write_varint(VarInt::from(0u64));
        }
        tx.outputs[input_idx].write_to(&mut writer);
    } else {
        writer.write_varint(VarInt::from(tx.outputs.len()));
        for output in &tx.outputs {
            output.write_to(&mut writer);
        }
    }

    writer.write_u32_le(tx.lock_time);
    writer.write_u32_le(sighash_type.0);
    Some(writer.into_bytes())
}
