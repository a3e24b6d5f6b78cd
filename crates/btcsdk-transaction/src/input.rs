//! Transaction input referencing a previous output.
//!
//! # Wire format
//!
//! | Field            | Size          |
//! |------------------|---------------|
//! | prev_txid        | 32 bytes      |
//! | vout             | 4 bytes (LE)  |
//! | script length    | VarInt        |
//! | unlocking_script | variable      |
//! | sequence         | 4 bytes (LE)  |

use btcsdk_primitives::chainhash::Hash;
use btcsdk_primitives::util::{ByteReader, ByteWriter};
use btcsdk_script::Script;
use serde::{Deserialize, Serialize};

use crate::TransactionError;

/// Sequence number of a final input: no relative lock time, and lock time
/// checks against it fail.
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A single transaction input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    /// Id of the transaction holding the spent output, in wire byte order.
    pub prev_txid: Hash,
    /// Index of the spent output within that transaction.
    pub vout: u32,
    pub unlocking_script: Script,
    pub sequence: u32,
}

impl TxIn {
    /// An input spending `prev_txid:vout` with a final sequence number.
    pub fn new(prev_txid: Hash, vout: u32, unlocking_script: Script) -> Self {
        TxIn { prev_txid, vout, unlocking_script, sequence: DEFAULT_SEQUENCE_NUMBER }
    }

    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let prev_txid = reader
            .read_hash()
            .map_err(|e| TransactionError::SerializationError(format!("reading previous txid: {}", e)))?;

        let vout = reader
            .read_u32_le()
            .map_err(|e| TransactionError::SerializationError(format!("reading output index: {}", e)))?;

        let script_bytes = reader
            .read_var_bytes()
            .map_err(|e| TransactionError::SerializationError(format!("reading unlocking script: {}", e)))?;

        let sequence = reader
            .read_u32_le()
            .map_err(|e| TransactionError::SerializationError(format!("reading sequence number: {}", e)))?;

        Ok(TxIn {
            prev_txid: Hash::new(prev_txid),
            vout,
            unlocking_script: Script::from_bytes(script_bytes),
            sequence,
        })
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(self.prev_txid.as_bytes());
        writer.write_u32_le(self.vout);
        writer.write_var_bytes(self.unlocking_script.to_bytes());
        writer.write_u32_le(self.sequence);
    }

    /// Write the input with `script` in place of its unlocking script, as
    /// signature hashing does.
    pub(crate) fn write_with_script(&self, writer: &mut ByteWriter, script: &[u8], sequence: u32) {
        writer.write_bytes(self.prev_txid.as_bytes());
        writer.write_u32_le(self.vout);
        writer.write_var_bytes(script);
        writer.write_u32_le(sequence);
    }
}
