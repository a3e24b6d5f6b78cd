/// Error types for script construction and parsing.
///
/// Script *execution* never yields a `ScriptError`: the interpreter reports
/// its outcome as a [`Verdict`](crate::interpreter::Verdict).
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// A push claims more bytes than the script holds.
    #[error("push at offset {offset} runs past the end of the script")]
    TruncatedPush { offset: usize },

    /// Push data too long for any push opcode.
    #[error("data too big: {0} bytes")]
    DataTooBig(usize),

    /// One element of a multi-push is too long.
    #[error("part {0} too big")]
    PartTooBig(usize),

    /// A push opcode was passed where a plain opcode is required.
    #[error("use append_push_data for push opcodes: {0}")]
    InvalidOpcodeType(&'static str),

    /// An ASM token that is neither an opcode name nor hex data.
    #[error("invalid ASM token '{0}'")]
    InvalidAsmToken(String),

    /// Invalid hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Script is empty when a non-empty script was expected.
    #[error("script is empty")]
    EmptyScript,

    /// Script is not a P2PKH script.
    #[error("not a P2PKH script")]
    NotP2PKH,

    /// Error from the primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] btcsdk_primitives::PrimitivesError),
}
