//! Bitcoin script interpreter.
//!
//! Executes an unlocking script followed by a locking script on a shared
//! stack and reports a [`Verdict`]. A rejected script is an ordinary
//! outcome, so failures come back as [`Verdict::Failure`] carrying an
//! [`InterpreterError`] with the violated rule and its location rather than
//! as an `Err`.
//!
//! # Architecture
//!
//! The interpreter does not depend on the transaction crate. Callers that
//! need signature or lock time checks provide a [`TxContext`]
//! implementation; scripts without such opcodes run with `None`.
//!
//! # Example
//!
//! ```
//! use btcsdk_script::interpreter::{Engine, ScriptFlags};
//! use btcsdk_script::Script;
//!
//! let unlock = Script::from_asm("OP_1 OP_1").unwrap();
//! let lock = Script::from_asm("OP_ADD OP_2 OP_EQUAL").unwrap();
//! let verdict = Engine::new().execute(&unlock, &lock, ScriptFlags::STANDARD, None, 0);
//! assert!(verdict.is_success());
//! ```

pub mod config;
pub mod error;
pub mod flags;
pub mod opclass;
pub mod parsed_opcode;
pub mod scriptnum;
pub mod stack;
pub mod thread;

mod ops_arithmetic;
mod ops_crypto;
mod ops_data;
mod ops_flow;
mod ops_stack;

pub use config::Config;
pub use error::{FailureKind, InterpreterError, InterpreterErrorCode, ScriptOffset, ScriptRole};
pub use flags::ScriptFlags;
pub use opclass::{classify, OpClass};
pub use parsed_opcode::{ParsedOpcode, ParsedScript};
pub use scriptnum::ScriptNumber;
pub use stack::Stack;
pub use thread::{State, Thread};

use tracing::debug;

use crate::Script;

/// Transaction data the signature and lock time opcodes need.
///
/// Implemented by the transaction crate's checker.
pub trait TxContext {
    /// Check `full_sig` (DER signature followed by its sighash byte) for
    /// `pub_key` over `script_code`, the part of the running script after
    /// the last executed OP_CODESEPARATOR with the signature pushes removed.
    ///
    /// Anything that prevents verification (unparseable key or signature,
    /// bad input index) is reported as `false`.
    fn verify_signature(&self, full_sig: &[u8], pub_key: &[u8], script_code: &Script, input_idx: usize) -> bool;

    fn lock_time(&self) -> u32;

    fn tx_version(&self) -> u32;

    fn input_sequence(&self, input_idx: usize) -> u32;
}

/// Outcome of running a pair of scripts.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure(InterpreterError),
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Success)
    }

    pub fn failure(&self) -> Option<&InterpreterError> {
        match self {
            Verdict::Success => None,
            Verdict::Failure(err) => Some(err),
        }
    }

    /// For callers that prefer `?`.
    pub fn into_result(self) -> Result<(), InterpreterError> {
        match self {
            Verdict::Success => Ok(()),
            Verdict::Failure(err) => Err(err),
        }
    }
}

/// The script execution engine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: Config,
}

impl Engine {
    /// An engine with the default policy limits.
    pub fn new() -> Self {
        Engine::default()
    }

    pub fn with_config(config: Config) -> Self {
        Engine { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute unlocking + locking scripts.
    ///
    /// # Arguments
    /// * `unlocking_script` - The input's unlocking (signature) script.
    /// * `locking_script` - The spent output's locking script.
    /// * `flags` - Verification flags.
    /// * `tx_context` - Transaction data for signature and lock time opcodes.
    /// * `input_idx` - The input index being verified.
    pub fn execute(
        &self,
        unlocking_script: &Script,
        locking_script: &Script,
        flags: ScriptFlags,
        tx_context: Option<&dyn TxContext>,
        input_idx: usize,
    ) -> Verdict {
        debug!(
            unlocking_len = unlocking_script.len(),
            locking_len = locking_script.len(),
            flags = flags.0,
            input_idx,
            "executing scripts"
        );

        match Thread::new(unlocking_script, locking_script, flags, self.config.clone(), tx_context, input_idx) {
            Ok(mut thread) => thread.execute(),
            Err(err) => {
                debug!(code = %err.code, "scripts rejected before execution: {}", err);
                Verdict::Failure(err)
            }
        }
    }
}
