//! Bitcoin script: parsing, building and execution.
//!
//! [`Script`] is a raw byte container with helpers for hex and ASM forms,
//! [`chunk`] decodes it into pushes and opcodes, and [`interpreter`] runs an
//! unlocking script against a locking script.

pub mod chunk;
pub mod interpreter;
pub mod opcodes;
pub mod script;

mod error;
pub use chunk::ScriptChunk;
pub use error::ScriptError;
pub use script::Script;
