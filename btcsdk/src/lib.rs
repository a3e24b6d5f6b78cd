#![deny(missing_docs)]

//! Bitcoin SDK - Complete SDK.
//!
//! Re-exports the btcsdk components for single-crate usage: key and hash
//! primitives, the script interpreter, and transactions with legacy
//! signature hashing.
//!
//! ```
//! use btcsdk::script::interpreter::{Engine, ScriptFlags};
//! use btcsdk::script::Script;
//!
//! let unlock = Script::from_asm("OP_2 OP_3").unwrap();
//! let lock = Script::from_asm("OP_ADD OP_5 OP_EQUAL").unwrap();
//! let verdict = Engine::new().execute(&unlock, &lock, ScriptFlags::NONE, None, 0);
//! assert!(verdict.is_success());
//! ```

/// Hashes, elliptic curve keys and signatures, and byte codecs.
pub use btcsdk_primitives as primitives;
/// Scripts and the script interpreter.
pub use btcsdk_script as script;
/// Transactions, signature hashing and input verification.
pub use btcsdk_transaction as transaction;
