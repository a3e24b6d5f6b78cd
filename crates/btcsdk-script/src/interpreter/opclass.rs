//! Opcode classification.
//!
//! Every one of the 256 byte values maps to exactly one [`OpClass`]. The
//! interpreter dispatches on these enums with exhaustive matches, so an
//! opcode can never fall through to a default handler.

use crate::opcodes::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOp {
    Nop,
    If,
    NotIf,
    /// OP_VERIF and OP_VERNOTIF sit in the conditional range and fail
    /// whether or not the branch is executing.
    VerIf,
    VerNotIf,
    Else,
    EndIf,
    Verify,
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOp {
    ToAltStack,
    FromAltStack,
    TwoDrop,
    TwoDup,
    ThreeDup,
    TwoOver,
    TwoRot,
    TwoSwap,
    IfDup,
    Depth,
    Drop,
    Dup,
    Nip,
    Over,
    Pick,
    Roll,
    Rot,
    Swap,
    Tuck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceOp {
    Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitwiseOp {
    Equal,
    EqualVerify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    OneAdd,
    OneSub,
    Negate,
    Abs,
    Not,
    ZeroNotEqual,
    Add,
    Sub,
    BoolAnd,
    BoolOr,
    NumEqual,
    NumEqualVerify,
    NumNotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Min,
    Max,
    Within,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoOp {
    Ripemd160,
    Sha1,
    Sha256,
    Hash160,
    Hash256,
    CodeSeparator,
    CheckSig,
    CheckSigVerify,
    CheckMultiSig,
    CheckMultiSigVerify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTimeOp {
    CheckLockTimeVerify,
    CheckSequenceVerify,
}

/// What an opcode byte does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    /// OP_0, the direct pushes and OP_PUSHDATA1/2/4.
    PushData,
    /// OP_1NEGATE and OP_1..OP_16, carrying the value pushed.
    PushNumber(i8),
    Flow(FlowOp),
    Stack(StackOp),
    Splice(SpliceOp),
    Bitwise(BitwiseOp),
    Arithmetic(ArithmeticOp),
    Crypto(CryptoOp),
    LockTime(LockTimeOp),
    /// OP_NOP1 and OP_NOP4..OP_NOP10, reserved for soft-fork upgrades.
    UpgradableNop,
    /// Fails wherever it appears, executed or not.
    Disabled,
    /// Fails only when executed.
    Reserved,
    /// Unassigned opcode; fails only when executed.
    Invalid,
}

impl OpClass {
    /// Conditionals are evaluated even inside a non-executing branch.
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            OpClass::Flow(
                FlowOp::If | FlowOp::NotIf | FlowOp::VerIf | FlowOp::VerNotIf | FlowOp::Else | FlowOp::EndIf
            )
        )
    }
}

/// Classify an opcode byte.
pub fn classify(op: u8) -> OpClass {
    match op {
        OP_0..=OP_PUSHDATA4 => OpClass::PushData,
        OP_1NEGATE => OpClass::PushNumber(-1),
        OP_RESERVED => OpClass::Reserved,
        OP_1..=OP_16 => OpClass::PushNumber((op - OP_1 + 1) as i8),

        OP_NOP => OpClass::Flow(FlowOp::Nop),
        OP_VER => OpClass::Reserved,
        OP_IF => OpClass::Flow(FlowOp::If),
        OP_NOTIF => OpClass::Flow(FlowOp::NotIf),
        OP_VERIF => OpClass::Flow(FlowOp::VerIf),
        OP_VERNOTIF => OpClass::Flow(FlowOp::VerNotIf),
        OP_ELSE => OpClass::Flow(FlowOp::Else),
        OP_ENDIF => OpClass::Flow(FlowOp::EndIf),
        OP_VERIFY => OpClass::Flow(FlowOp::Verify),
        OP_RETURN => OpClass::Flow(FlowOp::Return),

        OP_TOALTSTACK => OpClass::Stack(StackOp::ToAltStack),
        OP_FROMALTSTACK => OpClass::Stack(StackOp::FromAltStack),
        OP_2DROP => OpClass::Stack(StackOp::TwoDrop),
        OP_2DUP => OpClass::Stack(StackOp::TwoDup),
        OP_3DUP => OpClass::Stack(StackOp::ThreeDup),
        OP_2OVER => OpClass::Stack(StackOp::TwoOver),
        OP_2ROT => OpClass::Stack(StackOp::TwoRot),
        OP_2SWAP => OpClass::Stack(StackOp::TwoSwap),
        OP_IFDUP => OpClass::Stack(StackOp::IfDup),
        OP_DEPTH => OpClass::Stack(StackOp::Depth),
        OP_DROP => OpClass::Stack(StackOp::Drop),
        OP_DUP => OpClass::Stack(StackOp::Dup),
        OP_NIP => OpClass::Stack(StackOp::Nip),
        OP_OVER => OpClass::Stack(StackOp::Over),
        OP_PICK => OpClass::Stack(StackOp::Pick),
        OP_ROLL => OpClass::Stack(StackOp::Roll),
        OP_ROT => OpClass::Stack(StackOp::Rot),
        OP_SWAP => OpClass::Stack(StackOp::Swap),
        OP_TUCK => OpClass::Stack(StackOp::Tuck),

        OP_CAT | OP_SUBSTR | OP_LEFT | OP_RIGHT => OpClass::Disabled,
        OP_SIZE => OpClass::Splice(SpliceOp::Size),

        OP_INVERT | OP_AND | OP_OR | OP_XOR => OpClass::Disabled,
        OP_EQUAL => OpClass::Bitwise(BitwiseOp::Equal),
        OP_EQUALVERIFY => OpClass::Bitwise(BitwiseOp::EqualVerify),
        OP_RESERVED1 | OP_RESERVED2 => OpClass::Reserved,

        OP_1ADD => OpClass::Arithmetic(ArithmeticOp::OneAdd),
        OP_1SUB => OpClass::Arithmetic(ArithmeticOp::OneSub),
        OP_2MUL | OP_2DIV => OpClass::Disabled,
        OP_NEGATE => OpClass::Arithmetic(ArithmeticOp::Negate),
        OP_ABS => OpClass::Arithmetic(ArithmeticOp::Abs),
        OP_NOT => OpClass::Arithmetic(ArithmeticOp::Not),
        OP_0NOTEQUAL => OpClass::Arithmetic(ArithmeticOp::ZeroNotEqual),
        OP_ADD => OpClass::Arithmetic(ArithmeticOp::Add),
        OP_SUB => OpClass::Arithmetic(ArithmeticOp::Sub),
        OP_MUL | OP_DIV | OP_MOD | OP_LSHIFT | OP_RSHIFT => OpClass::Disabled,
        OP_BOOLAND => OpClass::Arithmetic(ArithmeticOp::BoolAnd),
        OP_BOOLOR => OpClass::Arithmetic(ArithmeticOp::BoolOr),
        OP_NUMEQUAL => OpClass::Arithmetic(ArithmeticOp::NumEqual),
        OP_NUMEQUALVERIFY => OpClass::Arithmetic(ArithmeticOp::NumEqualVerify),
        OP_NUMNOTEQUAL => OpClass::Arithmetic(ArithmeticOp::NumNotEqual),
        OP_LESSTHAN => OpClass::Arithmetic(ArithmeticOp::LessThan),
        OP_GREATERTHAN => OpClass::Arithmetic(ArithmeticOp::GreaterThan),
        OP_LESSTHANOREQUAL => OpClass::Arithmetic(ArithmeticOp::LessThanOrEqual),
        OP_GREATERTHANOREQUAL => OpClass::Arithmetic(ArithmeticOp::GreaterThanOrEqual),
        OP_MIN => OpClass::Arithmetic(ArithmeticOp::Min),
        OP_MAX => OpClass::Arithmetic(ArithmeticOp::Max),
        OP_WITHIN => OpClass::Arithmetic(ArithmeticOp::Within),

        OP_RIPEMD160 => OpClass::Crypto(CryptoOp::Ripemd160),
        OP_SHA1 => OpClass::Crypto(CryptoOp::Sha1),
        OP_SHA256 => OpClass::Crypto(CryptoOp::Sha256),
        OP_HASH160 => OpClass::Crypto(CryptoOp::Hash160),
        OP_HASH256 => OpClass::Crypto(CryptoOp::Hash256),
        OP_CODESEPARATOR => OpClass::Crypto(CryptoOp::CodeSeparator),
        OP_CHECKSIG => OpClass::Crypto(CryptoOp::CheckSig),
        OP_CHECKSIGVERIFY => OpClass::Crypto(CryptoOp::CheckSigVerify),
        OP_CHECKMULTISIG => OpClass::Crypto(CryptoOp::CheckMultiSig),
        OP_CHECKMULTISIGVERIFY => OpClass::Crypto(CryptoOp::CheckMultiSigVerify),

        OP_NOP1 => OpClass::UpgradableNop,
        OP_CHECKLOCKTIMEVERIFY => OpClass::LockTime(LockTimeOp::CheckLockTimeVerify),
        OP_CHECKSEQUENCEVERIFY => OpClass::LockTime(LockTimeOp::CheckSequenceVerify),
        OP_NOP4..=OP_NOP10 => OpClass::UpgradableNop,

        0xba..=0xff => OpClass::Invalid,
    }
}
