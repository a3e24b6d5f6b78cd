//! Script verification flags (bitmask).

use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Script verification flags controlling interpreter strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptFlags(pub u32);

impl ScriptFlags {
    pub const NONE: ScriptFlags = ScriptFlags(0);
    /// Evaluate BIP16 pay-to-script-hash redeem scripts.
    pub const P2SH: ScriptFlags = ScriptFlags(1 << 0);
    /// Strict signature and public key encodings, defined sighash types.
    pub const STRICT_ENC: ScriptFlags = ScriptFlags(1 << 1);
    /// BIP66 strict DER signatures.
    pub const DER_SIG: ScriptFlags = ScriptFlags(1 << 2);
    pub const LOW_S: ScriptFlags = ScriptFlags(1 << 3);
    /// The extra CHECKMULTISIG stack element must be empty.
    pub const NULL_DUMMY: ScriptFlags = ScriptFlags(1 << 4);
    pub const SIG_PUSH_ONLY: ScriptFlags = ScriptFlags(1 << 5);
    pub const MINIMAL_DATA: ScriptFlags = ScriptFlags(1 << 6);
    pub const DISCOURAGE_UPGRADABLE_NOPS: ScriptFlags = ScriptFlags(1 << 7);
    /// Exactly one element may remain after a successful run. Requires P2SH.
    pub const CLEAN_STACK: ScriptFlags = ScriptFlags(1 << 8);
    pub const CHECK_LOCK_TIME_VERIFY: ScriptFlags = ScriptFlags(1 << 9);
    pub const CHECK_SEQUENCE_VERIFY: ScriptFlags = ScriptFlags(1 << 10);
    /// IF/NOTIF arguments must be empty or exactly `0x01`.
    ///
    /// Applies to every script run with the flag. Bitcoin Core enforces
    /// this only inside witness v0 scripts, which this interpreter does not
    /// run, so the flag is off in [`ScriptFlags::STANDARD`] and callers opt
    /// in to the rule for legacy scripts.
    pub const MINIMAL_IF: ScriptFlags = ScriptFlags(1 << 11);
    /// A failed signature check requires an empty signature.
    pub const NULL_FAIL: ScriptFlags = ScriptFlags(1 << 12);

    /// The usual relay policy.
    pub const STANDARD: ScriptFlags = ScriptFlags(
        Self::P2SH.0
            | Self::STRICT_ENC.0
            | Self::DER_SIG.0
            | Self::LOW_S.0
            | Self::NULL_DUMMY.0
            | Self::MINIMAL_DATA.0
            | Self::DISCOURAGE_UPGRADABLE_NOPS.0
            | Self::CLEAN_STACK.0
            | Self::CHECK_LOCK_TIME_VERIFY.0
            | Self::CHECK_SEQUENCE_VERIFY.0
            | Self::NULL_FAIL.0,
    );

    pub fn has_flag(self, flag: ScriptFlags) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn has_any(self, flags: &[ScriptFlags]) -> bool {
        flags.iter().any(|f| self.has_flag(*f))
    }

    pub fn add_flag(&mut self, flag: ScriptFlags) {
        self.0 |= flag.0;
    }
}

impl BitOr for ScriptFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        ScriptFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ScriptFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ScriptFlags {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        ScriptFlags(self.0 & rhs.0)
    }
}
