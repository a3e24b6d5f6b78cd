//! Transactions, legacy signature hashing and input verification.
//!
//! [`Transaction`] models the standard wire format. [`sighash`] computes the
//! legacy digest a signature commits to, [`TransactionChecker`] exposes it to
//! the script interpreter, and [`verify_input`] / [`verify_all_inputs`] run
//! the interpreter over a transaction's inputs.

pub mod checker;
pub mod input;
pub mod output;
pub mod sighash;
pub mod template;
pub mod transaction;
pub mod verify;

mod error;
pub use checker::TransactionChecker;
pub use error::TransactionError;
pub use input::TxIn;
pub use output::TxOut;
pub use sighash::SigHashType;
pub use transaction::Transaction;
pub use verify::{verify_all_inputs, verify_input};

#[cfg(test)]
mod tests;
