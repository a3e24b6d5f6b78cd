//! Flow control and lock time operations for the script interpreter.

use super::error::{InterpreterError, InterpreterErrorCode};
use super::flags::ScriptFlags;
use super::opclass::{FlowOp, LockTimeOp};
use super::parsed_opcode::ParsedOpcode;
use super::stack::as_bool;
use super::thread::Thread;
use super::TxContext;

/// Lock times below this are block heights, at or above it timestamps.
const LOCK_TIME_THRESHOLD: i64 = 500_000_000;

/// Lock time operands may be one byte wider than arithmetic operands.
const LOCK_TIME_NUMBER_LENGTH: usize = 5;

const MAX_TX_IN_SEQUENCE_NUM: u32 = 0xffff_ffff;
const SEQUENCE_LOCK_TIME_DISABLED: i64 = 1 << 31;
const SEQUENCE_LOCK_TIME_IS_SECONDS: i64 = 1 << 22;
const SEQUENCE_LOCK_TIME_MASK: i64 = 0x0000_ffff;

fn unbalanced(pop: &ParsedOpcode) -> InterpreterError {
    InterpreterError::new(
        InterpreterErrorCode::UnbalancedConditional,
        format!("encountered opcode {} with no matching opcode to begin conditional execution", pop.name()),
    )
}

impl<'a> Thread<'a> {
    pub(crate) fn exec_flow(&mut self, op: FlowOp, pop: &ParsedOpcode) -> Result<(), InterpreterError> {
        match op {
            FlowOp::Nop => Ok(()),
            FlowOp::If => self.op_if(pop, false),
            FlowOp::NotIf => self.op_if(pop, true),
            FlowOp::VerIf | FlowOp::VerNotIf => Err(InterpreterError::new(
                InterpreterErrorCode::BadOpcode,
                format!("attempt to execute reserved opcode {}", pop.name()),
            )),
            FlowOp::Else => self.op_else(pop),
            FlowOp::EndIf => self.op_endif(pop),
            FlowOp::Verify => self.abstract_verify(pop, InterpreterErrorCode::Verify),
            FlowOp::Return => Err(InterpreterError::new(
                InterpreterErrorCode::EarlyReturn,
                "script returned early",
            )),
        }
    }

    fn pop_if_bool(&mut self, pop: &ParsedOpcode) -> Result<bool, InterpreterError> {
        if self.dstack.is_empty() {
            return Err(unbalanced(pop));
        }
        let b = self.dstack.pop_byte_array()?;
        if self.has_flag(ScriptFlags::MINIMAL_IF) && (b.len() > 1 || (b.len() == 1 && b[0] != 1)) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::MinimalIf,
                format!("{} argument must be empty or 0x01, got {:02x?}", pop.name(), b),
            ));
        }
        Ok(as_bool(&b))
    }

    /// OP_IF and OP_NOTIF. Inside a skipped branch the argument is not
    /// consumed and the new branch is skipped too.
    fn op_if(&mut self, pop: &ParsedOpcode, negate: bool) -> Result<(), InterpreterError> {
        let mut value = false;
        if self.is_branch_executing() {
            value = self.pop_if_bool(pop)? != negate;
        }
        self.cond_stack.push(value);
        Ok(())
    }

    /// Each OP_ELSE flips the innermost branch, so repeated ELSEs alternate.
    fn op_else(&mut self, pop: &ParsedOpcode) -> Result<(), InterpreterError> {
        let top = self.cond_stack.last_mut().ok_or_else(|| unbalanced(pop))?;
        *top = !*top;
        Ok(())
    }

    fn op_endif(&mut self, pop: &ParsedOpcode) -> Result<(), InterpreterError> {
        self.cond_stack.pop().ok_or_else(|| unbalanced(pop))?;
        Ok(())
    }

    /// Pop the top element and fail with `code` unless it is true.
    pub(crate) fn abstract_verify(
        &mut self,
        pop: &ParsedOpcode,
        code: InterpreterErrorCode,
    ) -> Result<(), InterpreterError> {
        if !self.dstack.pop_bool()? {
            return Err(InterpreterError::new(code, format!("{} failed", pop.name())));
        }
        Ok(())
    }

    pub(crate) fn exec_lock_time(&mut self, op: LockTimeOp) -> Result<(), InterpreterError> {
        let (flag, nop_name) = match op {
            LockTimeOp::CheckLockTimeVerify => (ScriptFlags::CHECK_LOCK_TIME_VERIFY, "OP_NOP2"),
            LockTimeOp::CheckSequenceVerify => (ScriptFlags::CHECK_SEQUENCE_VERIFY, "OP_NOP3"),
        };

        if !self.has_flag(flag) {
            if self.has_flag(ScriptFlags::DISCOURAGE_UPGRADABLE_NOPS) {
                return Err(InterpreterError::new(
                    InterpreterErrorCode::DiscourageUpgradableNOPs,
                    format!("{} reserved for soft-fork upgrades", nop_name),
                ));
            }
            return Ok(());
        }

        // The operand stays on the stack.
        let operand = self.dstack.peek_int_with_len(0, LOCK_TIME_NUMBER_LENGTH)?;
        if operand.is_negative() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NegativeLockTime,
                format!("negative lock time: {}", operand.to_i64()),
            ));
        }

        // A relative lock with the disable bit set always passes, with or
        // without a transaction to check it against.
        if matches!(op, LockTimeOp::CheckSequenceVerify) && operand.to_i64() & SEQUENCE_LOCK_TIME_DISABLED != 0 {
            return Ok(());
        }

        let ctx = self.tx_context.ok_or_else(|| {
            InterpreterError::new(
                InterpreterErrorCode::NoTxContext,
                format!("a transaction is required to evaluate {:?}", op),
            )
        })?;

        match op {
            LockTimeOp::CheckLockTimeVerify => check_lock_time(ctx, self.input_idx, operand.to_i64()),
            LockTimeOp::CheckSequenceVerify => check_sequence(ctx, self.input_idx, operand.to_i64()),
        }
    }
}

/// BIP65: the transaction's lock time must be of the same kind as and at
/// least `lock_time`, and the input must not be final.
fn check_lock_time(ctx: &dyn TxContext, input_idx: usize, lock_time: i64) -> Result<(), InterpreterError> {
    verify_lock_time(ctx.lock_time() as i64, LOCK_TIME_THRESHOLD, lock_time)?;

    if ctx.input_sequence(input_idx) == MAX_TX_IN_SEQUENCE_NUM {
        return Err(InterpreterError::new(
            InterpreterErrorCode::UnsatisfiedLockTime,
            "transaction input is finalized",
        ));
    }
    Ok(())
}

/// BIP112 relative lock time against the input's sequence number.
fn check_sequence(ctx: &dyn TxContext, input_idx: usize, sequence: i64) -> Result<(), InterpreterError> {
    if sequence & SEQUENCE_LOCK_TIME_DISABLED != 0 {
        return Ok(());
    }

    if ctx.tx_version() < 2 {
        return Err(InterpreterError::new(
            InterpreterErrorCode::UnsatisfiedLockTime,
            format!("invalid transaction version: {}", ctx.tx_version()),
        ));
    }

    let tx_sequence = ctx.input_sequence(input_idx) as i64;
    if tx_sequence & SEQUENCE_LOCK_TIME_DISABLED != 0 {
        return Err(InterpreterError::new(
            InterpreterErrorCode::UnsatisfiedLockTime,
            format!("transaction sequence has sequence locktime disabled bit set: 0x{:x}", tx_sequence),
        ));
    }

    let mask = SEQUENCE_LOCK_TIME_IS_SECONDS | SEQUENCE_LOCK_TIME_MASK;
    verify_lock_time(tx_sequence & mask, SEQUENCE_LOCK_TIME_IS_SECONDS, sequence & mask)
}

fn verify_lock_time(tx_lock_time: i64, threshold: i64, lock_time: i64) -> Result<(), InterpreterError> {
    if (tx_lock_time < threshold) != (lock_time < threshold) {
        return Err(InterpreterError::new(
            InterpreterErrorCode::UnsatisfiedLockTime,
            format!("mismatched locktime types -- tx locktime {}, stack locktime {}", tx_lock_time, lock_time),
        ));
    }
    if lock_time > tx_lock_time {
        return Err(InterpreterError::new(
            InterpreterErrorCode::UnsatisfiedLockTime,
            format!(
                "locktime requirement not satisfied -- locktime is greater than the transaction locktime: {} > {}",
                lock_time, tx_lock_time
            ),
        ));
    }
    Ok(())
}
