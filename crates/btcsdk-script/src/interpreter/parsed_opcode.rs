//! Parsed opcode representation and script parser.

use crate::chunk::{encode_push_data, read_chunk};
use crate::opcodes::*;
use crate::{Script, ScriptError};

use super::error::{InterpreterError, InterpreterErrorCode, ScriptRole};
use super::opclass::{classify, OpClass};

/// One decoded instruction of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOpcode {
    pub opcode: u8,
    /// Push payload; empty for non-push opcodes.
    pub data: Vec<u8>,
    /// Byte offset of the opcode within its script.
    pub offset: usize,
    pub class: OpClass,
}

impl ParsedOpcode {
    pub fn name(&self) -> &'static str {
        opcode_to_string(self.opcode)
    }

    /// Check that a data push uses the smallest available encoding.
    pub fn enforce_minimum_data_push(&self) -> Result<(), InterpreterError> {
        let data_len = self.data.len();
        let fail = |expected: String| {
            Err(InterpreterError::new(
                InterpreterErrorCode::MinimalData,
                format!(
                    "data push of {} bytes encoded with opcode {} instead of {}",
                    data_len,
                    self.name(),
                    expected
                ),
            ))
        };

        if data_len == 0 {
            if self.opcode != OP_0 {
                return fail("OP_0".into());
            }
        } else if data_len == 1 && (1..=16).contains(&self.data[0]) {
            return fail(format!("OP_{}", self.data[0]));
        } else if data_len == 1 && self.data[0] == 0x81 {
            return fail("OP_1NEGATE".into());
        } else if data_len <= OP_DATA_75 as usize {
            if self.opcode as usize != data_len {
                return fail(format!("OP_DATA_{}", data_len));
            }
        } else if data_len <= 0xff {
            if self.opcode != OP_PUSHDATA1 {
                return fail("OP_PUSHDATA1".into());
            }
        } else if data_len <= 0xffff && self.opcode != OP_PUSHDATA2 {
            return fail("OP_PUSHDATA2".into());
        }
        Ok(())
    }

    /// Serialize back to the exact bytes it was parsed from.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.opcode];
        match self.opcode {
            OP_PUSHDATA1 => out.push(self.data.len() as u8),
            OP_PUSHDATA2 => out.extend_from_slice(&(self.data.len() as u16).to_le_bytes()),
            OP_PUSHDATA4 => out.extend_from_slice(&(self.data.len() as u32).to_le_bytes()),
            _ => {}
        }
        out.extend_from_slice(&self.data);
        out
    }
}

/// A parsed script is a sequence of parsed opcodes.
pub type ParsedScript = Vec<ParsedOpcode>;

/// Decode a whole script up front.
///
/// A truncated push anywhere in the script is reported as `MalformedPush`
/// at the offset of the offending opcode.
pub fn parse_script(script: &Script, role: ScriptRole) -> Result<ParsedScript, InterpreterError> {
    let bytes = script.to_bytes();
    let mut parsed = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let (chunk, next) = read_chunk(bytes, pos).map_err(|e| match e {
            ScriptError::TruncatedPush { offset } => {
                InterpreterError::new(InterpreterErrorCode::MalformedPush, "push data exceeds script length")
                    .at(role, offset)
            }
            other => InterpreterError::new(InterpreterErrorCode::MalformedPush, other.to_string()).at(role, pos),
        })?;
        parsed.push(ParsedOpcode {
            opcode: chunk.op,
            data: chunk.data.unwrap_or_default(),
            offset: pos,
            class: classify(chunk.op),
        });
        pos = next;
    }
    Ok(parsed)
}

/// Serialize a parsed script back to bytes.
pub fn unparse(pscript: &[ParsedOpcode]) -> Script {
    let bytes: Vec<u8> = pscript.iter().flat_map(|pop| pop.to_bytes()).collect();
    Script::from(bytes)
}

/// Drop every push whose serialized form is exactly the canonical push of
/// `data`.
pub fn remove_opcode_by_data(script: &[ParsedOpcode], data: &[u8]) -> ParsedScript {
    let Ok(pattern) = encode_push_data(data) else {
        return script.to_vec();
    };
    script.iter().filter(|pop| pop.to_bytes() != pattern).cloned().collect()
}
