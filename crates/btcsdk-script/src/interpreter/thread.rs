//! Script execution thread: the interpreter's state machine.
//!
//! A [`Thread`] owns everything one verification needs (both stacks, the
//! branch stack, the parsed scripts and the operation counter) and is never
//! shared. [`Thread::step`] advances one instruction at a time so callers can
//! single-step a run; [`Thread::execute`] drives it to a verdict.

use tracing::{debug, trace};

use crate::opcodes::OP_16;
use crate::Script;

use super::config::Config;
use super::error::{InterpreterError, InterpreterErrorCode, ScriptRole};
use super::flags::ScriptFlags;
use super::opclass::OpClass;
use super::parsed_opcode::{parse_script, ParsedOpcode, ParsedScript};
use super::scriptnum::ScriptNumber;
use super::stack::{as_bool, Stack};
use super::{TxContext, Verdict};

/// Execution state of a [`Thread`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    HaltedSuccess,
    HaltedFailure,
}

/// The execution thread for the script interpreter.
pub struct Thread<'a> {
    pub(crate) dstack: Stack,
    pub(crate) astack: Stack,
    /// One entry per open IF; a branch executes only while all are true.
    pub(crate) cond_stack: Vec<bool>,
    pub(crate) cfg: Config,
    pub(crate) flags: ScriptFlags,
    /// Unlocking, locking and, for P2SH spends, the redeem script.
    scripts: Vec<(ScriptRole, ParsedScript)>,
    script_idx: usize,
    /// Index of the next instruction in the current script.
    pub(crate) script_off: usize,
    /// First instruction of the signed script code: just past the last
    /// executed OP_CODESEPARATOR.
    pub(crate) code_sep_start: usize,
    pub(crate) num_ops: usize,
    bip16: bool,
    saved_first_stack: Vec<Vec<u8>>,
    pub(crate) tx_context: Option<&'a dyn TxContext>,
    pub(crate) input_idx: usize,
    state: State,
    failure: Option<InterpreterError>,
}

impl<'a> Thread<'a> {
    /// Validate the inputs and prepare a run.
    ///
    /// Problems that make the run impossible (bad flag combination,
    /// oversized or malformed scripts, non-push unlocking scripts where
    /// pushes are required) are reported here rather than during stepping.
    pub fn new(
        unlocking_script: &Script,
        locking_script: &Script,
        flags: ScriptFlags,
        cfg: Config,
        tx_context: Option<&'a dyn TxContext>,
        input_idx: usize,
    ) -> Result<Self, InterpreterError> {
        if flags.has_flag(ScriptFlags::CLEAN_STACK) && !flags.has_flag(ScriptFlags::P2SH) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::InvalidFlags,
                "CLEAN_STACK requires P2SH",
            ));
        }

        for (role, script) in [(ScriptRole::Unlocking, unlocking_script), (ScriptRole::Locking, locking_script)] {
            check_script_size(script, role, &cfg)?;
        }

        if flags.has_flag(ScriptFlags::SIG_PUSH_ONLY) && !unlocking_script.is_push_only() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NotPushOnly,
                "signature script is not push only",
            ));
        }

        let bip16 = flags.has_flag(ScriptFlags::P2SH) && locking_script.is_p2sh();
        if bip16 && !unlocking_script.is_push_only() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NotPushOnly,
                "pay to script hash is not push only",
            ));
        }

        let scripts = vec![
            (ScriptRole::Unlocking, parse_script(unlocking_script, ScriptRole::Unlocking)?),
            (ScriptRole::Locking, parse_script(locking_script, ScriptRole::Locking)?),
        ];

        let verify_minimal_data = flags.has_flag(ScriptFlags::MINIMAL_DATA);
        let max_num_len = cfg.max_script_number_length;

        Ok(Thread {
            dstack: Stack::new(max_num_len, verify_minimal_data),
            astack: Stack::new(max_num_len, verify_minimal_data),
            cond_stack: Vec::new(),
            cfg,
            flags,
            scripts,
            script_idx: 0,
            script_off: 0,
            code_sep_start: 0,
            num_ops: 0,
            bip16,
            saved_first_stack: Vec::new(),
            tx_context,
            input_idx,
            state: State::Running,
            failure: None,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The main stack, bottom first.
    pub fn stack(&self) -> &[Vec<u8>] {
        self.dstack.items()
    }

    /// The reason for a `HaltedFailure` state.
    pub fn failure(&self) -> Option<&InterpreterError> {
        self.failure.as_ref()
    }

    pub(crate) fn has_flag(&self, flag: ScriptFlags) -> bool {
        self.flags.has_flag(flag)
    }

    pub(crate) fn has_any(&self, flags: &[ScriptFlags]) -> bool {
        self.flags.has_any(flags)
    }

    pub(crate) fn is_branch_executing(&self) -> bool {
        self.cond_stack.iter().all(|&c| c)
    }

    /// Run to completion.
    pub fn execute(&mut self) -> Verdict {
        while self.step() == State::Running {}
        match &self.failure {
            Some(err) => Verdict::Failure(err.clone()),
            None => Verdict::Success,
        }
    }

    /// Execute one instruction.
    ///
    /// Reaching the end of a script performs the transition to the next one
    /// in the same step, and the end of the last script performs the final
    /// stack check. Once halted, further calls do nothing.
    pub fn step(&mut self) -> State {
        if self.state != State::Running {
            return self.state;
        }
        match self.advance() {
            Ok(false) => {}
            Ok(true) => match self.final_check() {
                Ok(()) => {
                    debug!(depth = self.dstack.depth(), "script execution succeeded");
                    self.state = State::HaltedSuccess;
                }
                Err(err) => self.halt(err),
            },
            Err(err) => self.halt(err),
        }
        self.state
    }

    fn halt(&mut self, err: InterpreterError) {
        debug!(code = %err.code, kind = ?err.category(), "script execution failed: {}", err);
        self.failure = Some(err);
        self.state = State::HaltedFailure;
    }

    /// Returns true once every script has run.
    fn advance(&mut self) -> Result<bool, InterpreterError> {
        let (role, script) = &self.scripts[self.script_idx];
        let role = *role;
        if let Some(pop) = script.get(self.script_off).cloned() {
            trace!(
                script = %role,
                offset = pop.offset,
                opcode = pop.name(),
                depth = self.dstack.depth(),
                "step"
            );
            self.execute_opcode(&pop).map_err(|e| e.at(role, pop.offset))?;
            self.script_off += 1;
            self.check_stack_size().map_err(|e| e.at(role, pop.offset))?;

            if self.script_off < self.scripts[self.script_idx].1.len() {
                return Ok(false);
            }
        }
        self.end_script(role)
    }

    fn execute_opcode(&mut self, pop: &ParsedOpcode) -> Result<(), InterpreterError> {
        if pop.data.len() > self.cfg.max_element_size {
            return Err(InterpreterError::new(
                InterpreterErrorCode::ElementTooBig,
                format!(
                    "element size {} exceeds max allowed size {}",
                    pop.data.len(),
                    self.cfg.max_element_size
                ),
            ));
        }

        if pop.opcode > OP_16 {
            self.count_ops(1)?;
        }

        if pop.class == OpClass::Disabled {
            return Err(InterpreterError::new(
                InterpreterErrorCode::DisabledOpcode,
                format!("attempt to execute disabled opcode {}", pop.name()),
            ));
        }

        if !self.is_branch_executing() && !pop.class.is_conditional() {
            return Ok(());
        }

        self.dispatch_opcode(pop)
    }

    pub(crate) fn count_ops(&mut self, n: usize) -> Result<(), InterpreterError> {
        self.num_ops += n;
        if self.num_ops > self.cfg.max_ops {
            return Err(InterpreterError::new(
                InterpreterErrorCode::TooManyOperations,
                format!("exceeded max operation limit of {}", self.cfg.max_ops),
            ));
        }
        Ok(())
    }

    fn dispatch_opcode(&mut self, pop: &ParsedOpcode) -> Result<(), InterpreterError> {
        match pop.class {
            OpClass::PushData => {
                if self.has_flag(ScriptFlags::MINIMAL_DATA) {
                    pop.enforce_minimum_data_push()?;
                }
                self.dstack.push_byte_array(pop.data.clone());
                Ok(())
            }
            OpClass::PushNumber(n) => {
                self.dstack.push_int(&ScriptNumber::new(n as i64));
                Ok(())
            }
            OpClass::Flow(op) => self.exec_flow(op, pop),
            OpClass::Stack(op) => self.exec_stack(op),
            OpClass::Splice(op) => self.exec_splice(op),
            OpClass::Bitwise(op) => self.exec_bitwise(op, pop),
            OpClass::Arithmetic(op) => self.exec_arithmetic(op, pop),
            OpClass::Crypto(op) => self.exec_crypto(op, pop),
            OpClass::LockTime(op) => self.exec_lock_time(op),
            OpClass::UpgradableNop => {
                if self.has_flag(ScriptFlags::DISCOURAGE_UPGRADABLE_NOPS) {
                    return Err(InterpreterError::new(
                        InterpreterErrorCode::DiscourageUpgradableNOPs,
                        format!("{} reserved for soft-fork upgrades", pop.name()),
                    ));
                }
                Ok(())
            }
            OpClass::Disabled => Err(InterpreterError::new(
                InterpreterErrorCode::DisabledOpcode,
                format!("attempt to execute disabled opcode {}", pop.name()),
            )),
            OpClass::Reserved => Err(InterpreterError::new(
                InterpreterErrorCode::ReservedOpcode,
                format!("attempt to execute reserved opcode {}", pop.name()),
            )),
            OpClass::Invalid => Err(InterpreterError::new(
                InterpreterErrorCode::BadOpcode,
                format!("attempt to execute invalid opcode 0x{:02x}", pop.opcode),
            )),
        }
    }

    fn check_stack_size(&self) -> Result<(), InterpreterError> {
        let combined = self.dstack.depth() + self.astack.depth();
        if combined > self.cfg.max_stack_size {
            return Err(InterpreterError::new(
                InterpreterErrorCode::StackOverflow,
                format!("combined stack size {} > max allowed {}", combined, self.cfg.max_stack_size),
            ));
        }
        Ok(())
    }

    /// Move on from a finished script. Returns true when none are left.
    fn end_script(&mut self, role: ScriptRole) -> Result<bool, InterpreterError> {
        if !self.cond_stack.is_empty() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::UnbalancedConditional,
                format!("end of {} script reached in conditional execution", role),
            ));
        }

        // The alt stack does not carry over between scripts.
        self.astack.clear();
        self.script_idx += 1;
        self.script_off = 0;
        self.code_sep_start = 0;
        self.num_ops = 0;

        if self.bip16 {
            match self.script_idx {
                1 => self.saved_first_stack = self.dstack.items().to_vec(),
                2 => self.load_redeem_script()?,
                _ => {}
            }
        }

        Ok(self.script_idx >= self.scripts.len())
    }

    /// BIP16: once the locking script has checked the redeem script hash,
    /// rerun from the unlocking script's stack with its top element
    /// deserialized as the script to execute.
    fn load_redeem_script(&mut self) -> Result<(), InterpreterError> {
        self.check_top_true()?;

        let mut stack = std::mem::take(&mut self.saved_first_stack);
        let redeem = stack.pop().ok_or_else(|| {
            InterpreterError::new(InterpreterErrorCode::EmptyStack, "no redeem script on the stack")
        })?;
        let redeem = Script::from(redeem);
        check_script_size(&redeem, ScriptRole::Redeem, &self.cfg)?;
        let parsed = parse_script(&redeem, ScriptRole::Redeem)?;

        debug!(len = redeem.len(), "evaluating P2SH redeem script");
        self.scripts.push((ScriptRole::Redeem, parsed));
        self.dstack.set_items(stack);
        Ok(())
    }

    fn check_top_true(&self) -> Result<(), InterpreterError> {
        let top = self.dstack.peek_byte_array(0).map_err(|_| {
            InterpreterError::new(InterpreterErrorCode::EmptyStack, "stack empty at end of script execution")
        })?;
        if !as_bool(top) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::EvalFalse,
                "false stack entry at end of script execution",
            ));
        }
        Ok(())
    }

    fn final_check(&self) -> Result<(), InterpreterError> {
        self.check_top_true()?;
        if self.has_flag(ScriptFlags::CLEAN_STACK) && self.dstack.depth() != 1 {
            return Err(InterpreterError::new(
                InterpreterErrorCode::CleanStack,
                format!("stack contains {} unexpected items", self.dstack.depth() - 1),
            ));
        }
        Ok(())
    }

    /// The instructions of the running script that a signature commits to.
    pub(crate) fn sub_script(&self) -> &[ParsedOpcode] {
        let script = &self.scripts[self.script_idx].1;
        &script[self.code_sep_start.min(script.len())..]
    }
}

fn check_script_size(script: &Script, role: ScriptRole, cfg: &Config) -> Result<(), InterpreterError> {
    if script.len() > cfg.max_script_size {
        return Err(InterpreterError::new(
            InterpreterErrorCode::ScriptTooBig,
            format!(
                "{} script size {} is larger than the max allowed size {}",
                role,
                script.len(),
                cfg.max_script_size
            ),
        ));
    }
    Ok(())
}
