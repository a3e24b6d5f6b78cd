//! Script chunk parsing and encoding.
//!
//! A script chunk is either an opcode or a data push with its associated bytes.
//! This module handles decoding raw script bytes into structured chunks and
//! encoding push data with the correct OP_PUSHDATA prefix.

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes), this is the length.
    pub op: u8,
    /// The data payload, if this chunk is a push operation.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// ASM token for this chunk: hex for data pushes, the opcode name otherwise.
    pub fn to_asm_string(&self) -> String {
        match &self.data {
            Some(data) if data.is_empty() => opcode_to_string(OP_0).to_string(),
            Some(data) => hex::encode(data),
            None => opcode_to_string(self.op).to_string(),
        }
    }

    /// True if this chunk pushes data (including OP_0 but not OP_1..OP_16).
    pub fn is_push(&self) -> bool {
        self.op <= OP_PUSHDATA4
    }
}

/// Read the chunk starting at `pos`.
///
/// Returns the chunk and the position of the next one.
pub(crate) fn read_chunk(bytes: &[u8], pos: usize) -> Result<(ScriptChunk, usize), ScriptError> {
    let op = bytes[pos];
    let truncated = || ScriptError::TruncatedPush { offset: pos };

    let (header, length) = match op {
        OP_0 => return Ok((ScriptChunk { op, data: Some(Vec::new()) }, pos + 1)),
        OP_DATA_1..=OP_DATA_75 => (1, op as usize),
        OP_PUSHDATA1 => {
            let len = bytes.get(pos + 1).ok_or_else(truncated)?;
            (2, *len as usize)
        }
        OP_PUSHDATA2 => {
            let len = bytes.get(pos + 1..pos + 3).ok_or_else(truncated)?;
            (3, u16::from_le_bytes([len[0], len[1]]) as usize)
        }
        OP_PUSHDATA4 => {
            let len = bytes.get(pos + 1..pos + 5).ok_or_else(truncated)?;
            (5, u32::from_le_bytes([len[0], len[1], len[2], len[3]]) as usize)
        }
        _ => return Ok((ScriptChunk { op, data: None }, pos + 1)),
    };

    let start = pos + header;
    let end = start.checked_add(length).ok_or_else(truncated)?;
    let data = bytes.get(start..end).ok_or_else(truncated)?;
    Ok((ScriptChunk { op, data: Some(data.to_vec()) }, end))
}

/// Decode raw script bytes into a vector of `ScriptChunk` values.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let (chunk, next) = read_chunk(bytes, pos)?;
        chunks.push(chunk);
        pos = next;
    }
    Ok(chunks)
}

/// Compute the OP_PUSHDATA prefix bytes for a data payload of the given length.
///
/// This is the smallest push for raw data; it does not substitute OP_1..OP_16
/// for single-byte payloads.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len <= OP_DATA_75 as usize {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xFF {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xFFFF {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if let Ok(len) = u32::try_from(data_len) {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&len.to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig(data_len))
    }
}

/// Serialize a single data push: prefix followed by the payload.
pub fn encode_push_data(data: &[u8]) -> Result<Vec<u8>, ScriptError> {
    let mut out = push_data_prefix(data.len())?;
    out.extend_from_slice(data);
    Ok(out)
}

/// Encode multiple data payloads into a single byte vector with push prefixes.
pub fn encode_push_datas(parts: &[&[u8]]) -> Result<Vec<u8>, ScriptError> {
    let mut result = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let encoded = encode_push_data(part).map_err(|_| ScriptError::PartTooBig(i))?;
        result.extend_from_slice(&encoded);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_script_simple() {
        let bytes = hex::decode("05000102030401FF02ABCD").unwrap();
        let parts = decode_script(&bytes).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].data.as_deref(), Some(&[0, 1, 2, 3, 4][..]));
        assert_eq!(parts[2].data.as_deref(), Some(&[0xab, 0xcd][..]));
    }

    #[test]
    fn test_decode_and_encode_roundtrip() {
        let script_hex = "05000102030401ff02abcd";
        let parts = decode_script(&hex::decode(script_hex).unwrap()).unwrap();
        let data_parts: Vec<&[u8]> = parts.iter().filter_map(|p| p.data.as_deref()).collect();
        let encoded = encode_push_datas(&data_parts).unwrap();
        assert_eq!(hex::encode(encoded), script_hex);
    }

    #[test]
    fn test_decode_script_empty() {
        assert!(decode_script(&[]).unwrap().is_empty());
    }

    /// 2-of-2 multisig with two OP_PUSHDATA1 keys.
    #[test]
    fn test_decode_script_complex() {
        let script_hex = "524c53ff0488b21e000000000000000000362f7a9030543db8751401c387d6a71e870f1895b3a62569d455e8ee5f5f5e5f03036624c6df96984db6b4e625b6707c017eb0e0d137cd13a0c989bfa77a4473fd000000004c53ff0488b21e0000000000000000008b20425398995f3c866ea6ce5c1828a516b007379cf97b136bffbdc86f75df14036454bad23b019eae34f10aff8b8d6d8deb18cb31354e5a169ee09d8a4560e8250000000052ae";
        let parts = decode_script(&hex::decode(script_hex).unwrap()).unwrap();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[1].op, OP_PUSHDATA1);
        assert_eq!(parts[4].op, OP_CHECKMULTISIG);
    }

    #[test]
    fn test_truncated_pushes() {
        for bad in ["05000000", "4c05000000", "4c", "4d", "4d01", "4e", "4e010000", "4e0200000000"] {
            let bytes = hex::decode(bad).unwrap();
            assert!(
                matches!(decode_script(&bytes), Err(ScriptError::TruncatedPush { offset: 0 })),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_truncated_push_reports_offset() {
        let bytes = [OP_DUP, OP_HASH160, 0x14, 0xaa];
        assert!(matches!(decode_script(&bytes), Err(ScriptError::TruncatedPush { offset: 2 })));
    }

    #[test]
    fn test_pushdata_variants() {
        let data = b"testing";
        let mut script = vec![OP_PUSHDATA1, data.len() as u8];
        script.extend_from_slice(data);
        let parts = decode_script(&script).unwrap();
        assert_eq!(parts[0].op, OP_PUSHDATA1);
        assert_eq!(parts[0].data.as_deref(), Some(&data[..]));

        let mut script = vec![OP_PUSHDATA2, data.len() as u8, 0];
        script.extend_from_slice(data);
        assert_eq!(decode_script(&script).unwrap()[0].data.as_deref(), Some(&data[..]));

        let mut script = vec![OP_PUSHDATA4, data.len() as u8, 0, 0, 0];
        script.extend_from_slice(data);
        assert_eq!(decode_script(&script).unwrap()[0].data.as_deref(), Some(&data[..]));
    }

    #[test]
    fn test_push_data_prefix_boundaries() {
        assert_eq!(push_data_prefix(0).unwrap(), vec![0x00]);
        assert_eq!(push_data_prefix(75).unwrap(), vec![75]);
        assert_eq!(push_data_prefix(76).unwrap(), vec![OP_PUSHDATA1, 76]);
        assert_eq!(push_data_prefix(255).unwrap(), vec![OP_PUSHDATA1, 0xff]);
        assert_eq!(push_data_prefix(256).unwrap(), vec![OP_PUSHDATA2, 0x00, 0x01]);
        assert_eq!(push_data_prefix(65535).unwrap(), vec![OP_PUSHDATA2, 0xff, 0xff]);
        assert_eq!(push_data_prefix(65536).unwrap(), vec![OP_PUSHDATA4, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_asm_tokens() {
        assert_eq!(ScriptChunk { op: OP_DUP, data: None }.to_asm_string(), "OP_DUP");
        assert_eq!(ScriptChunk { op: 2, data: Some(vec![0xab, 0xcd]) }.to_asm_string(), "abcd");
        assert_eq!(ScriptChunk { op: OP_0, data: Some(vec![]) }.to_asm_string(), "OP_0");
    }
}
