use btcsdk_primitives::PrimitivesError;
use btcsdk_script::ScriptError;

/// Error types for transaction operations.
///
/// A script that fails verification is not an error here; it is reported
/// as a [`Verdict::Failure`](btcsdk_script::interpreter::Verdict::Failure).
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("input index {index} out of range (tx has {count} inputs)")]
    InputIndexOutOfRange { index: usize, count: usize },

    /// `verify_all_inputs` needs exactly one previous output per input.
    #[error("{outputs} previous outputs supplied for {inputs} inputs")]
    PrevOutputCountMismatch { inputs: usize, outputs: usize },

    /// An error occurred during binary/hex serialization or deserialization.
    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("script error: {0}")]
    Script(#[from] ScriptError),

    #[error("primitives error: {0}")]
    Primitives(#[from] PrimitivesError),
}
