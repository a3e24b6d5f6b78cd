//! OP_SIZE and byte equality.

use super::error::{InterpreterError, InterpreterErrorCode};
use super::opclass::{BitwiseOp, SpliceOp};
use super::parsed_opcode::ParsedOpcode;
use super::scriptnum::ScriptNumber;
use super::thread::Thread;

impl<'a> Thread<'a> {
    pub(crate) fn exec_splice(&mut self, op: SpliceOp) -> Result<(), InterpreterError> {
        match op {
            SpliceOp::Size => {
                let len = self.dstack.peek_byte_array(0)?.len();
                self.dstack.push_int(&ScriptNumber::new(len as i64));
                Ok(())
            }
        }
    }

    pub(crate) fn exec_bitwise(&mut self, op: BitwiseOp, pop: &ParsedOpcode) -> Result<(), InterpreterError> {
        let a = self.dstack.pop_byte_array()?;
        let b = self.dstack.pop_byte_array()?;
        self.dstack.push_bool(a == b);
        match op {
            BitwiseOp::Equal => Ok(()),
            BitwiseOp::EqualVerify => self.abstract_verify(pop, InterpreterErrorCode::EqualVerify),
        }
    }
}
