//! Policy limits applied while interpreting scripts.
//!
//! These values have moved between protocol versions, so they are carried
//! as data rather than baked into the interpreter. `Config` deserializes
//! from partial documents: any field left out keeps its default.

use serde::{Deserialize, Serialize};

pub const MAX_OPS_PER_SCRIPT: usize = 200;
pub const MAX_SCRIPT_SIZE: usize = 10_000;
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;
pub const MAX_STACK_SIZE: usize = 1_000;
pub const MAX_SCRIPT_NUMBER_LENGTH: usize = 4;
pub const MAX_PUBKEYS_PER_MULTISIG: usize = 20;

/// Script configuration limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Non-push operations allowed per script; one more fails the run.
    pub max_ops: usize,
    /// Largest unlocking, locking or redeem script, in bytes.
    pub max_script_size: usize,
    /// Largest single stack element, in bytes.
    pub max_element_size: usize,
    /// Combined depth of the main and alt stacks.
    pub max_stack_size: usize,
    /// Widest operand accepted by numeric opcodes, in bytes.
    pub max_script_number_length: usize,
    pub max_pubkeys_per_multisig: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_ops: MAX_OPS_PER_SCRIPT,
            max_script_size: MAX_SCRIPT_SIZE,
            max_element_size: MAX_SCRIPT_ELEMENT_SIZE,
            max_stack_size: MAX_STACK_SIZE,
            max_script_number_length: MAX_SCRIPT_NUMBER_LENGTH,
            max_pubkeys_per_multisig: MAX_PUBKEYS_PER_MULTISIG,
        }
    }
}
