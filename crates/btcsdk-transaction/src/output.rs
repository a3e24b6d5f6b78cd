//! Transaction output: a satoshi value and the script that locks it.
//!
//! # Wire format
//!
//! | Field          | Size         |
//! |----------------|--------------|
//! | satoshis       | 8 bytes (LE) |
//! | script length  | VarInt       |
//! | locking_script | variable     |

use btcsdk_primitives::util::{ByteReader, ByteWriter};
use btcsdk_script::Script;
use serde::{Deserialize, Serialize};

use crate::TransactionError;

/// A single transaction output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub satoshis: u64,
    pub locking_script: Script,
}

impl TxOut {
    pub fn new(satoshis: u64, locking_script: Script) -> Self {
        TxOut { satoshis, locking_script }
    }

    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let satoshis = reader
            .read_u64_le()
            .map_err(|e| TransactionError::SerializationError(format!("reading satoshis: {}", e)))?;

        let script_bytes = reader
            .read_var_bytes()
            .map_err(|e| TransactionError::SerializationError(format!("reading locking script: {}", e)))?;

        Ok(TxOut { satoshis, locking_script: Script::from_bytes(script_bytes) })
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u64_le(self.satoshis);
        writer.write_var_bytes(self.locking_script.to_bytes());
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }
}
