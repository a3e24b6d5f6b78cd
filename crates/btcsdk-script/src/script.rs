//! Bitcoin Script type - a sequence of opcodes and data pushes.
//!
//! Scripts are used in transaction inputs (unlocking) and outputs (locking)
//! to define spending conditions. The Script wraps a `Vec<u8>`; it is never
//! parsed implicitly, so malformed byte code can be carried around and is
//! only rejected when it is decoded or executed.

use std::fmt;

use btcsdk_primitives::BigInt;

use crate::chunk::{decode_script, push_data_prefix, read_chunk, ScriptChunk};
use crate::interpreter::ScriptNumber;
use crate::opcodes::*;
use crate::ScriptError;

/// A script, represented as a byte vector newtype.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Script(Vec<u8>);

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create a new empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex-encoded string.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        Ok(Script(hex::decode(hex_str)?))
    }

    /// Create a script from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Create a script from an ASM string.
    ///
    /// Tokens are separated by whitespace. Known opcode names (e.g.
    /// "OP_DUP") are emitted directly; every other token must be hex and is
    /// pushed as data.
    pub fn from_asm(asm: &str) -> Result<Self, ScriptError> {
        let mut script = Script::new();
        for token in asm.split_whitespace() {
            if let Some(opcode) = string_to_opcode(token) {
                script.0.push(opcode);
            } else {
                let data =
                    hex::decode(token).map_err(|_| ScriptError::InvalidAsmToken(token.to_string()))?;
                script.append_push_data(&data)?;
            }
        }
        Ok(script)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Encode the script as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Convert the script to its ASM representation.
    ///
    /// Data pushes appear as hex, opcodes by name. A script that does not
    /// decode cleanly renders as `[error]` after the last good token.
    pub fn to_asm(&self) -> String {
        let mut parts = Vec::new();
        let mut pos = 0;
        while pos < self.0.len() {
            match read_chunk(&self.0, pos) {
                Ok((chunk, next)) => {
                    parts.push(chunk.to_asm_string());
                    pos = next;
                }
                Err(_) => {
                    parts.push("[error]".to_string());
                    break;
                }
            }
        }
        parts.join(" ")
    }

    /// The underlying bytes.
    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the script and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the script into a vector of decoded chunks.
    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    // -----------------------------------------------------------------------
    // Script classification
    // -----------------------------------------------------------------------

    /// True if every opcode is at most OP_16. OP_1NEGATE and OP_RESERVED
    /// count as pushes here; a script that fails to decode does not.
    pub fn is_push_only(&self) -> bool {
        match self.chunks() {
            Ok(chunks) => chunks.iter().all(|c| c.op <= OP_16),
            Err(_) => false,
        }
    }

    /// Pay-to-Public-Key-Hash:
    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn is_p2pkh(&self) -> bool {
        let b = &self.0;
        b.len() == 25
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
    }

    /// Pay-to-Script-Hash (BIP16): `OP_HASH160 <20 bytes> OP_EQUAL`.
    pub fn is_p2sh(&self) -> bool {
        let b = &self.0;
        b.len() == 23 && b[0] == OP_HASH160 && b[1] == OP_DATA_20 && b[22] == OP_EQUAL
    }

    // -----------------------------------------------------------------------
    // Data extraction
    // -----------------------------------------------------------------------

    /// The 20-byte hash of a P2PKH script.
    pub fn public_key_hash(&self) -> Result<[u8; 20], ScriptError> {
        if self.0.is_empty() {
            return Err(ScriptError::EmptyScript);
        }
        if !self.is_p2pkh() {
            return Err(ScriptError::NotP2PKH);
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&self.0[3..23]);
        Ok(hash)
    }

    /// The 20-byte script hash of a P2SH script, if it is one.
    pub fn script_hash(&self) -> Option<[u8; 20]> {
        if !self.is_p2sh() {
            return None;
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&self.0[2..22]);
        Some(hash)
    }

    /// The script with every OP_CODESEPARATOR opcode removed, the form in
    /// which legacy signature hashing serializes the script code. Bytes
    /// from a truncated push onward are kept as they are.
    pub fn without_code_separators(&self) -> Script {
        let mut out = Vec::with_capacity(self.0.len());
        let mut pos = 0;
        while pos < self.0.len() {
            match read_chunk(&self.0, pos) {
                Ok((chunk, next)) => {
                    if chunk.op != OP_CODESEPARATOR {
                        out.extend_from_slice(&self.0[pos..next]);
                    }
                    pos = next;
                }
                Err(_) => {
                    out.extend_from_slice(&self.0[pos..]);
                    break;
                }
            }
        }
        Script(out)
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    /// Append data with the smallest OP_PUSHDATA prefix that fits.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<&mut Self, ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(self)
    }

    /// Append non-push opcodes.
    ///
    /// Push opcodes (OP_DATA_1..OP_PUSHDATA4) are rejected since they need a
    /// payload; use [`append_push_data`](Self::append_push_data).
    pub fn append_opcodes(&mut self, opcodes: &[u8]) -> Result<&mut Self, ScriptError> {
        if let Some(&op) = opcodes.iter().find(|&&op| (OP_DATA_1..=OP_PUSHDATA4).contains(&op)) {
            return Err(ScriptError::InvalidOpcodeType(opcode_to_string(op)));
        }
        self.0.extend_from_slice(opcodes);
        Ok(self)
    }

    /// Append a number the way script expects it: OP_0, OP_1NEGATE and
    /// OP_1..OP_16 for small values, a minimal script-number push otherwise.
    pub fn append_number(&mut self, n: i64) -> Result<&mut Self, ScriptError> {
        match n {
            0 => self.0.push(OP_0),
            -1 => self.0.push(OP_1NEGATE),
            1..=16 => self.0.push(OP_1 + (n as u8) - 1),
            _ => {
                let bytes = ScriptNumber::from(BigInt::from(n)).to_bytes();
                self.append_push_data(&bytes)?;
            }
        }
        Ok(self)
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Script {
    /// Display the script as a lowercase hex string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P2PKH_HEX: &str = "76a914e2a623699e81b291c0327f408fea765d534baa2a88ac";
    const P2PKH_ASM: &str =
        "OP_DUP OP_HASH160 e2a623699e81b291c0327f408fea765d534baa2a OP_EQUALVERIFY OP_CHECKSIG";

    #[test]
    fn test_from_hex_roundtrip() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert_eq!(script.to_hex(), P2PKH_HEX);
        assert!(Script::from_hex("").unwrap().is_empty());
        assert!(matches!(Script::from_hex("ZZZZ"), Err(ScriptError::InvalidHex(_))));
    }

    #[test]
    fn test_asm_roundtrip() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert_eq!(script.to_asm(), P2PKH_ASM);
        assert_eq!(Script::from_asm(P2PKH_ASM).unwrap(), script);
        assert_eq!(Script::new().to_asm(), "");
    }

    #[test]
    fn test_from_asm_rejects_garbage() {
        assert!(matches!(
            Script::from_asm("OP_DUP OP_NOPE"),
            Err(ScriptError::InvalidAsmToken(t)) if t == "OP_NOPE"
        ));
    }

    #[test]
    fn test_to_asm_marks_truncated_push() {
        let script = Script::from_bytes(&[OP_DUP, 0x05, 0x01]);
        assert_eq!(script.to_asm(), "OP_DUP [error]");
    }

    #[test]
    fn test_classification() {
        let p2pkh = Script::from_hex(P2PKH_HEX).unwrap();
        assert!(p2pkh.is_p2pkh());
        assert!(!p2pkh.is_p2sh());
        assert!(!p2pkh.is_push_only());

        let p2sh = Script::from_hex("a9149de5aeaff9c48431ba4dd6e8af73d51f38e451cb87").unwrap();
        assert!(p2sh.is_p2sh());
        assert_eq!(hex::encode(p2sh.script_hash().unwrap()), "9de5aeaff9c48431ba4dd6e8af73d51f38e451cb");

        assert!(!p2sh.is_p2pkh());
        assert!(p2pkh.script_hash().is_none());
    }

    #[test]
    fn test_push_only() {
        assert!(Script::from_asm("OP_0 OP_1NEGATE OP_16 abcd").unwrap().is_push_only());
        assert!(!Script::from_asm("OP_1 OP_NOP").unwrap().is_push_only());
        assert!(Script::from_bytes(&[OP_RESERVED]).is_push_only());
        assert!(!Script::from_bytes(&[0x02, 0x01]).is_push_only());
        assert!(Script::new().is_push_only());
    }

    #[test]
    fn test_public_key_hash() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert_eq!(hex::encode(script.public_key_hash().unwrap()), "e2a623699e81b291c0327f408fea765d534baa2a");
        assert!(matches!(Script::new().public_key_hash(), Err(ScriptError::EmptyScript)));
        assert!(matches!(Script::from_bytes(&[OP_1]).public_key_hash(), Err(ScriptError::NotP2PKH)));
    }

    #[test]
    fn test_without_code_separators() {
        // The 0xab inside the push is data, not an opcode.
        let script = Script::from_bytes(&[OP_CODESEPARATOR, 0x01, OP_CODESEPARATOR, OP_DUP, OP_CODESEPARATOR]);
        assert_eq!(script.without_code_separators().to_bytes(), &[0x01, OP_CODESEPARATOR, OP_DUP]);

        let truncated = Script::from_bytes(&[OP_CODESEPARATOR, 0x05, OP_CODESEPARATOR]);
        assert_eq!(truncated.without_code_separators().to_bytes(), &[0x05, OP_CODESEPARATOR]);
    }

    #[test]
    fn test_append_helpers() {
        let mut script = Script::new();
        script
            .append_opcodes(&[OP_DUP, OP_HASH160])
            .unwrap()
            .append_push_data(&[0xaa; 20])
            .unwrap()
            .append_opcodes(&[OP_EQUALVERIFY, OP_CHECKSIG])
            .unwrap();
        assert!(script.is_p2pkh());

        assert!(matches!(
            Script::new().append_opcodes(&[OP_PUSHDATA1]),
            Err(ScriptError::InvalidOpcodeType("OP_PUSHDATA1"))
        ));
    }

    #[test]
    fn test_append_number() {
        let mut script = Script::new();
        for n in [0, -1, 1, 16, 17, -2, 128, 1000] {
            script.append_number(n).unwrap();
        }
        assert_eq!(script.to_hex(), "004f51600111018202800002e803");
    }

    #[test]
    fn test_serde_as_hex() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        let json = serde_json::to_string(&script).unwrap();
        assert_eq!(json, format!("\"{P2PKH_HEX}\""));
        let back: Script = serde_json::from_str(&json).unwrap();
        assert_eq!(back, script);
    }
}
