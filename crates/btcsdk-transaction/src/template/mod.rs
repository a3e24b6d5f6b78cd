//! Script templates for common spends.

pub mod p2pkh;

use btcsdk_script::Script;

use crate::transaction::Transaction;
use crate::TransactionError;

/// Something that can produce the unlocking script for an input.
pub trait UnlockingScriptTemplate {
    /// Produce an unlocking script for input `input_idx` of `tx`, which
    /// spends an output locked by `prev_locking_script`.
    fn sign(&self, tx: &Transaction, input_idx: usize, prev_locking_script: &Script) -> Result<Script, TransactionError>;
}
