//! Core transaction type.
//!
//! A transaction is a version, ordered inputs and outputs, and a lock time,
//! serialized in the standard (pre-segwit) wire format.

use std::fmt;

use btcsdk_primitives::chainhash::Hash;
use btcsdk_primitives::util::{ByteReader, ByteWriter, VarInt};
use btcsdk_script::Script;
use serde::{Deserialize, Serialize};

use crate::input::TxIn;
use crate::output::TxOut;
use crate::sighash::{self, SigHashType};
use crate::TransactionError;

/// Smallest possible serialized input: txid, vout, empty script, sequence.
const MIN_INPUT_SIZE: usize = 32 + 4 + 1 + 4;
/// Smallest possible serialized output: satoshis and an empty script.
const MIN_OUTPUT_SIZE: usize = 8 + 1;

/// A transaction.
///
/// # Wire format
///
/// | Field        | Size                  |
/// |--------------|-----------------------|
/// | version      | 4 bytes (LE)          |
/// | input count  | VarInt                |
/// | inputs       | variable (per input)  |
/// | output count | VarInt                |
/// | outputs      | variable (per output) |
/// | lock_time    | 4 bytes (LE)          |
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    /// Block height (below 500,000,000) or Unix time before which the
    /// transaction is not final.
    pub lock_time: u32,
}

impl Transaction {
    /// An empty version 1 transaction.
    pub fn new() -> Self {
        Transaction { version: 1, inputs: Vec::new(), outputs: Vec::new(), lock_time: 0 }
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| TransactionError::SerializationError(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Parse exactly one transaction; trailing bytes are an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let version = reader
            .read_u32_le()
            .map_err(|e| TransactionError::SerializationError(format!("reading version: {}", e)))?;

        let input_count = read_count(reader, "input", MIN_INPUT_SIZE)?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TxIn::read_from(reader)?);
        }

        let output_count = read_count(reader, "output", MIN_OUTPUT_SIZE)?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TxOut::read_from(reader)?);
        }

        let lock_time = reader
            .read_u32_le()
            .map_err(|e| TransactionError::SerializationError(format!("reading lock time: {}", e)))?;

        Ok(Transaction { version, inputs, outputs, lock_time })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(256);
        writer.write_u32_le(self.version);

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(&mut writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(&mut writer);
        }

        writer.write_u32_le(self.lock_time);
        writer.into_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Double SHA-256 of the serialization. Displays byte-reversed.
    pub fn txid(&self) -> Hash {
        Hash::double_sha256(&self.to_bytes())
    }

    pub fn add_input(&mut self, input: TxIn) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, output: TxOut) {
        self.outputs.push(output);
    }

    /// The legacy signature hash of input `input_idx`.
    ///
    /// See [`sighash::signature_hash`].
    pub fn signature_hash(&self, input_idx: usize, script_code: &Script, sighash_type: SigHashType) -> [u8; 32] {
        sighash::signature_hash(self, input_idx, script_code, sighash_type)
    }
}

/// Read an item count, refusing counts the remaining bytes cannot hold.
fn read_count(reader: &mut ByteReader, what: &str, min_item_size: usize) -> Result<usize, TransactionError> {
    let count = reader
        .read_varint()
        .map_err(|e| TransactionError::SerializationError(format!("reading {} count: {}", what, e)))?
        .value();
    match usize::try_from(count) {
        Ok(n) if n <= reader.remaining() / min_item_size => Ok(n),
        _ => Err(TransactionError::SerializationError(format!(
            "{} count {} exceeds remaining {} bytes",
            what,
            count,
            reader.remaining()
        ))),
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Transaction {
    /// The hex serialization.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
