//! Stack manipulation operations for the script interpreter.

use super::error::{InterpreterError, InterpreterErrorCode};
use super::opclass::StackOp;
use super::scriptnum::ScriptNumber;
use super::stack::as_bool;
use super::thread::Thread;

impl<'a> Thread<'a> {
    pub(crate) fn exec_stack(&mut self, op: StackOp) -> Result<(), InterpreterError> {
        match op {
            StackOp::ToAltStack => {
                let data = self.dstack.pop_byte_array()?;
                self.astack.push_byte_array(data);
                Ok(())
            }
            StackOp::FromAltStack => self.op_from_alt_stack(),
            StackOp::TwoDrop => self.dstack.drop_n(2),
            StackOp::TwoDup => self.dstack.dup_n(2),
            StackOp::ThreeDup => self.dstack.dup_n(3),
            StackOp::TwoOver => self.dstack.over_n(2),
            StackOp::TwoRot => self.dstack.rot_n(2),
            StackOp::TwoSwap => self.dstack.swap_n(2),
            StackOp::IfDup => self.op_ifdup(),
            StackOp::Depth => {
                let depth = ScriptNumber::new(self.dstack.depth() as i64);
                self.dstack.push_int(&depth);
                Ok(())
            }
            StackOp::Drop => self.dstack.drop_n(1),
            StackOp::Dup => self.dstack.dup_n(1),
            StackOp::Nip => self.dstack.nip_n(1).map(|_| ()),
            StackOp::Over => self.dstack.over_n(1),
            StackOp::Pick => {
                let n = self.pop_stack_index()?;
                self.dstack.pick_n(n)
            }
            StackOp::Roll => {
                let n = self.pop_stack_index()?;
                self.dstack.roll_n(n)
            }
            StackOp::Rot => self.dstack.rot_n(1),
            StackOp::Swap => self.dstack.swap_n(1),
            StackOp::Tuck => self.dstack.tuck(),
        }
    }

    fn op_from_alt_stack(&mut self) -> Result<(), InterpreterError> {
        let data = self.astack.pop_byte_array().map_err(|_| {
            InterpreterError::new(InterpreterErrorCode::InvalidAltStackOperation, "alt stack is empty")
        })?;
        self.dstack.push_byte_array(data);
        Ok(())
    }

    fn op_ifdup(&mut self) -> Result<(), InterpreterError> {
        let so = self.dstack.peek_byte_array(0)?;
        if as_bool(so) {
            let so = so.to_vec();
            self.dstack.push_byte_array(so);
        }
        Ok(())
    }

    /// Operand of OP_PICK and OP_ROLL; range is checked by the stack.
    fn pop_stack_index(&mut self) -> Result<usize, InterpreterError> {
        let n = self.dstack.pop_int()?.to_i32();
        usize::try_from(n).map_err(|_| {
            InterpreterError::new(
                InterpreterErrorCode::InvalidStackOperation,
                format!("stack index {} is negative", n),
            )
        })
    }
}
