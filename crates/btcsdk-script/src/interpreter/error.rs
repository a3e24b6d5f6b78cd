//! Interpreter failure reasons.
//!
//! A failed run is ordinary data: [`InterpreterError`] records which rule was
//! violated and where, and travels inside a
//! [`Verdict::Failure`](super::Verdict::Failure).

use std::fmt;

/// Which rule a failed script run violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterpreterErrorCode {
    // Setup and plumbing
    InvalidFlags,
    NoTxContext,

    // Final state
    EmptyStack,
    EvalFalse,
    CleanStack,
    NotPushOnly,

    // Resource limits
    ScriptTooBig,
    ElementTooBig,
    TooManyOperations,
    StackOverflow,
    InvalidPubKeyCount,
    InvalidSignatureCount,

    // Opcode rules
    EarlyReturn,
    DisabledOpcode,
    ReservedOpcode,
    BadOpcode,
    MalformedPush,
    InvalidStackOperation,
    InvalidAltStackOperation,
    UnbalancedConditional,
    DiscourageUpgradableNOPs,

    // Verify family
    Verify,
    EqualVerify,
    NumEqualVerify,
    CheckSigVerify,
    CheckMultiSigVerify,

    // Number and push encoding
    NumberTooBig,
    MinimalData,
    MinimalIf,

    // Signature and key encoding
    InvalidSigHashType,
    SigTooShort,
    SigTooLong,
    SigInvalidSeqID,
    SigInvalidDataLen,
    SigMissingSTypeID,
    SigMissingSLen,
    SigInvalidSLen,
    SigInvalidRIntID,
    SigZeroRLen,
    SigNegativeR,
    SigTooMuchRPadding,
    SigInvalidSIntID,
    SigZeroSLen,
    SigNegativeS,
    SigTooMuchSPadding,
    SigHighS,
    SigNullDummy,
    PubKeyType,
    NullFail,

    // Lock time
    NegativeLockTime,
    UnsatisfiedLockTime,
}

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The script ran and its rules rejected the spend.
    Script,
    /// An operation-count, script-size or stack-size limit was exceeded.
    ResourceExhaustion,
    /// Malformed pushes, numbers, signatures or keys.
    Encoding,
}

impl InterpreterErrorCode {
    pub fn category(self) -> FailureKind {
        use InterpreterErrorCode::*;
        match self {
            ScriptTooBig | TooManyOperations | StackOverflow => FailureKind::ResourceExhaustion,

            ElementTooBig | MalformedPush | NumberTooBig | MinimalData | MinimalIf
            | InvalidSigHashType | SigTooShort | SigTooLong | SigInvalidSeqID | SigInvalidDataLen
            | SigMissingSTypeID | SigMissingSLen | SigInvalidSLen | SigInvalidRIntID | SigZeroRLen
            | SigNegativeR | SigTooMuchRPadding | SigInvalidSIntID | SigZeroSLen | SigNegativeS
            | SigTooMuchSPadding | SigHighS | PubKeyType => FailureKind::Encoding,

            InvalidFlags | NoTxContext | EmptyStack | EvalFalse | CleanStack | NotPushOnly
            | InvalidPubKeyCount | InvalidSignatureCount | EarlyReturn | DisabledOpcode
            | ReservedOpcode | BadOpcode | InvalidStackOperation | InvalidAltStackOperation
            | UnbalancedConditional | DiscourageUpgradableNOPs | Verify | EqualVerify
            | NumEqualVerify | CheckSigVerify | CheckMultiSigVerify | SigNullDummy | NullFail
            | NegativeLockTime | UnsatisfiedLockTime => FailureKind::Script,
        }
    }
}

impl fmt::Display for InterpreterErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The script a failing instruction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptRole {
    Unlocking,
    Locking,
    /// The serialized script revealed by a P2SH spend.
    Redeem,
}

impl fmt::Display for ScriptRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScriptRole::Unlocking => "unlocking",
            ScriptRole::Locking => "locking",
            ScriptRole::Redeem => "redeem",
        };
        f.write_str(name)
    }
}

/// Byte offset of an instruction within one of the executed scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptOffset {
    pub script: ScriptRole,
    pub byte: usize,
}

/// A script interpreter failure with its code, position and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterError {
    pub code: InterpreterErrorCode,
    /// Where execution stopped. `None` for failures that are not tied to one
    /// instruction, such as the final stack check.
    pub offset: Option<ScriptOffset>,
    pub description: String,
}

impl InterpreterError {
    pub fn new(code: InterpreterErrorCode, description: impl Into<String>) -> Self {
        InterpreterError { code, offset: None, description: description.into() }
    }

    /// Attach a position unless one is already recorded.
    pub fn at(mut self, script: ScriptRole, byte: usize) -> Self {
        self.offset.get_or_insert(ScriptOffset { script, byte });
        self
    }

    pub fn category(&self) -> FailureKind {
        self.code.category()
    }
}

impl fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(ScriptOffset { script, byte }) => {
                write!(f, "{} ({} script, offset {})", self.description, script, byte)
            }
            None => write!(f, "{}", self.description),
        }
    }
}

impl std::error::Error for InterpreterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(InterpreterErrorCode::TooManyOperations.category(), FailureKind::ResourceExhaustion);
        assert_eq!(InterpreterErrorCode::ScriptTooBig.category(), FailureKind::ResourceExhaustion);
        assert_eq!(InterpreterErrorCode::MinimalData.category(), FailureKind::Encoding);
        assert_eq!(InterpreterErrorCode::SigHighS.category(), FailureKind::Encoding);
        assert_eq!(InterpreterErrorCode::EvalFalse.category(), FailureKind::Script);
        assert_eq!(InterpreterErrorCode::DisabledOpcode.category(), FailureKind::Script);
    }

    #[test]
    fn test_offset_is_sticky() {
        let err = InterpreterError::new(InterpreterErrorCode::Verify, "OP_VERIFY failed")
            .at(ScriptRole::Locking, 3)
            .at(ScriptRole::Redeem, 9);
        assert_eq!(err.offset, Some(ScriptOffset { script: ScriptRole::Locking, byte: 3 }));
        assert_eq!(err.to_string(), "OP_VERIFY failed (locking script, offset 3)");
    }
}
