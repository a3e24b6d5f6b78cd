//! Arithmetic operations for the script interpreter.
//!
//! Operands are read with the configured number width (four bytes by
//! default); results are pushed at whatever width they need.

use super::error::{InterpreterError, InterpreterErrorCode};
use super::opclass::ArithmeticOp;
use super::parsed_opcode::ParsedOpcode;
use super::scriptnum::ScriptNumber;
use super::thread::Thread;

impl<'a> Thread<'a> {
    pub(crate) fn exec_arithmetic(&mut self, op: ArithmeticOp, pop: &ParsedOpcode) -> Result<(), InterpreterError> {
        use ArithmeticOp::*;
        match op {
            OneAdd => self.op_unary_int(|m| {
                m.incr();
            }),
            OneSub => self.op_unary_int(|m| {
                m.decr();
            }),
            Negate => self.op_unary_int(|m| {
                m.neg();
            }),
            Abs => self.op_unary_int(|m| {
                m.abs();
            }),
            Not => self.op_unary_int(|m| {
                let v = m.is_zero() as i64;
                m.set(v);
            }),
            ZeroNotEqual => self.op_unary_int(|m| {
                let v = !m.is_zero() as i64;
                m.set(v);
            }),
            Add => self.op_binary_int(|a, b| ScriptNumber::from(a.value() + b.value())),
            Sub => self.op_binary_int(|a, b| ScriptNumber::from(a.value() - b.value())),
            BoolAnd => self.op_bool_binop(|a, b| !a.is_zero() && !b.is_zero()),
            BoolOr => self.op_bool_binop(|a, b| !a.is_zero() || !b.is_zero()),
            NumEqual => self.op_bool_binop(|a, b| a == b),
            NumEqualVerify => {
                self.op_bool_binop(|a, b| a == b)?;
                self.abstract_verify(pop, InterpreterErrorCode::NumEqualVerify)
            }
            NumNotEqual => self.op_bool_binop(|a, b| a != b),
            LessThan => self.op_bool_binop(|a, b| a < b),
            GreaterThan => self.op_bool_binop(|a, b| a > b),
            LessThanOrEqual => self.op_bool_binop(|a, b| a <= b),
            GreaterThanOrEqual => self.op_bool_binop(|a, b| a >= b),
            Min => self.op_binary_int(|a, b| a.min(b).clone()),
            Max => self.op_binary_int(|a, b| a.max(b).clone()),
            Within => self.op_within(),
        }
    }

    fn op_unary_int(&mut self, f: impl FnOnce(&mut ScriptNumber)) -> Result<(), InterpreterError> {
        let mut m = self.dstack.pop_int()?;
        f(&mut m);
        self.dstack.push_int(&m);
        Ok(())
    }

    /// Pops `b` then `a` and pushes `f(a, b)`, where `a` was deeper.
    fn op_binary_int(
        &mut self,
        f: impl FnOnce(&ScriptNumber, &ScriptNumber) -> ScriptNumber,
    ) -> Result<(), InterpreterError> {
        let b = self.dstack.pop_int()?;
        let a = self.dstack.pop_int()?;
        self.dstack.push_int(&f(&a, &b));
        Ok(())
    }

    fn op_bool_binop(&mut self, f: impl FnOnce(&ScriptNumber, &ScriptNumber) -> bool) -> Result<(), InterpreterError> {
        let b = self.dstack.pop_int()?;
        let a = self.dstack.pop_int()?;
        self.dstack.push_bool(f(&a, &b));
        Ok(())
    }

    /// `x min max -> (min <= x < max)`
    fn op_within(&mut self) -> Result<(), InterpreterError> {
        let max = self.dstack.pop_int()?;
        let min = self.dstack.pop_int()?;
        let x = self.dstack.pop_int()?;
        self.dstack.push_bool(min <= x && x < max);
        Ok(())
    }
}
