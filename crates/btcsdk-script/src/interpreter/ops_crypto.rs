//! Hashing and signature checking operations for the script interpreter.

use btcsdk_primitives::ec::curve::HALF_ORDER;
use btcsdk_primitives::{hash, BigInt};

use super::error::{InterpreterError, InterpreterErrorCode};
use super::flags::ScriptFlags;
use super::opclass::CryptoOp;
use super::parsed_opcode::{remove_opcode_by_data, unparse, ParsedOpcode};
use super::thread::Thread;
use super::TxContext;
use crate::Script;

const SIGHASH_ANYONECANPAY: u8 = 0x80;

impl<'a> Thread<'a> {
    pub(crate) fn exec_crypto(&mut self, op: CryptoOp, pop: &ParsedOpcode) -> Result<(), InterpreterError> {
        match op {
            CryptoOp::Ripemd160 => self.op_hash(|b| hash::ripemd160(b).to_vec()),
            CryptoOp::Sha1 => self.op_hash(|b| hash::sha1(b).to_vec()),
            CryptoOp::Sha256 => self.op_hash(|b| hash::sha256(b).to_vec()),
            CryptoOp::Hash160 => self.op_hash(|b| hash::hash160(b).to_vec()),
            CryptoOp::Hash256 => self.op_hash(|b| hash::sha256d(b).to_vec()),
            CryptoOp::CodeSeparator => {
                self.code_sep_start = self.script_off + 1;
                Ok(())
            }
            CryptoOp::CheckSig => self.op_checksig(),
            CryptoOp::CheckSigVerify => {
                self.op_checksig()?;
                self.abstract_verify(pop, InterpreterErrorCode::CheckSigVerify)
            }
            CryptoOp::CheckMultiSig => self.op_checkmultisig(),
            CryptoOp::CheckMultiSigVerify => {
                self.op_checkmultisig()?;
                self.abstract_verify(pop, InterpreterErrorCode::CheckMultiSigVerify)
            }
        }
    }

    fn op_hash(&mut self, f: impl FnOnce(&[u8]) -> Vec<u8>) -> Result<(), InterpreterError> {
        let buf = self.dstack.pop_byte_array()?;
        self.dstack.push_byte_array(f(&buf));
        Ok(())
    }

    fn require_tx_context(&self, what: &str) -> Result<&'a dyn TxContext, InterpreterError> {
        self.tx_context.ok_or_else(|| {
            InterpreterError::new(
                InterpreterErrorCode::NoTxContext,
                format!("a transaction is required to evaluate {}", what),
            )
        })
    }

    /// The script code a signature commits to, with every push of the
    /// given signatures removed.
    fn script_code(&self, sigs: &[Vec<u8>]) -> Script {
        let mut code = self.sub_script().to_vec();
        for sig in sigs {
            code = remove_opcode_by_data(&code, sig);
        }
        unparse(&code)
    }

    fn op_checksig(&mut self) -> Result<(), InterpreterError> {
        let pk_bytes = self.dstack.pop_byte_array()?;
        let full_sig = self.dstack.pop_byte_array()?;
        let ctx = self.require_tx_context("OP_CHECKSIG")?;

        self.check_signature_encoding(&full_sig)?;
        self.check_pub_key_encoding(&pk_bytes)?;

        let script_code = self.script_code(std::slice::from_ref(&full_sig));
        let valid = !full_sig.is_empty() && ctx.verify_signature(&full_sig, &pk_bytes, &script_code, self.input_idx);

        if !valid && !full_sig.is_empty() && self.has_flag(ScriptFlags::NULL_FAIL) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NullFail,
                "signature not empty on failed checksig",
            ));
        }
        self.dstack.push_bool(valid);
        Ok(())
    }

    fn op_checkmultisig(&mut self) -> Result<(), InterpreterError> {
        let num_keys = self.dstack.pop_int()?.to_i32();
        if num_keys < 0 || num_keys as usize > self.cfg.max_pubkeys_per_multisig {
            return Err(InterpreterError::new(
                InterpreterErrorCode::InvalidPubKeyCount,
                format!(
                    "number of pubkeys {} is outside [0, {}]",
                    num_keys, self.cfg.max_pubkeys_per_multisig
                ),
            ));
        }
        let num_keys = num_keys as usize;
        self.count_ops(num_keys)?;

        // Popped top first, so index 0 is the last key pushed.
        let mut pub_keys = Vec::with_capacity(num_keys);
        for _ in 0..num_keys {
            pub_keys.push(self.dstack.pop_byte_array()?);
        }

        let num_sigs = self.dstack.pop_int()?.to_i32();
        if num_sigs < 0 || num_sigs as usize > num_keys {
            return Err(InterpreterError::new(
                InterpreterErrorCode::InvalidSignatureCount,
                format!("number of signatures {} is outside [0, {}]", num_sigs, num_keys),
            ));
        }
        let num_sigs = num_sigs as usize;

        let mut signatures = Vec::with_capacity(num_sigs);
        for _ in 0..num_sigs {
            signatures.push(self.dstack.pop_byte_array()?);
        }

        // One extra element is consumed, an off-by-one kept for compatibility.
        let dummy = self.dstack.pop_byte_array()?;
        if self.has_flag(ScriptFlags::NULL_DUMMY) && !dummy.is_empty() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::SigNullDummy,
                format!("multisig dummy argument has length {} instead of 0", dummy.len()),
            ));
        }

        let ctx = self.require_tx_context("OP_CHECKMULTISIG")?;
        let script_code = self.script_code(&signatures);

        // Keys and signatures are matched in order; a key that fails to
        // verify the current signature is skipped for good.
        let mut success = true;
        let (mut key_idx, mut sig_idx) = (0, 0);
        while success && sig_idx < num_sigs {
            let sig = &signatures[sig_idx];
            let pub_key = &pub_keys[key_idx];

            self.check_signature_encoding(sig)?;
            self.check_pub_key_encoding(pub_key)?;

            if !sig.is_empty() && ctx.verify_signature(sig, pub_key, &script_code, self.input_idx) {
                sig_idx += 1;
            }
            key_idx += 1;

            if num_sigs - sig_idx > num_keys - key_idx {
                success = false;
            }
        }

        if !success && self.has_flag(ScriptFlags::NULL_FAIL) && signatures.iter().any(|s| !s.is_empty()) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NullFail,
                "not all signatures empty on failed checkmultisig",
            ));
        }

        self.dstack.push_bool(success);
        Ok(())
    }

    /// Encoding rules for a signature with its trailing sighash byte. An
    /// empty signature is always acceptable here; it simply fails to verify.
    pub(crate) fn check_signature_encoding(&self, full_sig: &[u8]) -> Result<(), InterpreterError> {
        let Some((&hash_type, sig)) = full_sig.split_last() else {
            return Ok(());
        };

        if self.has_any(&[ScriptFlags::DER_SIG, ScriptFlags::LOW_S, ScriptFlags::STRICT_ENC]) {
            let s = check_der_shape(sig)?;
            if self.has_flag(ScriptFlags::LOW_S) && BigInt::from_bytes_be(s) > *HALF_ORDER {
                return Err(InterpreterError::new(
                    InterpreterErrorCode::SigHighS,
                    "signature is not canonical due to unnecessarily high S value",
                ));
            }
        }

        if self.has_flag(ScriptFlags::STRICT_ENC) {
            let base = hash_type & !SIGHASH_ANYONECANPAY;
            if !(1..=3).contains(&base) {
                return Err(InterpreterError::new(
                    InterpreterErrorCode::InvalidSigHashType,
                    format!("invalid hash type 0x{:02x}", hash_type),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn check_pub_key_encoding(&self, pub_key: &[u8]) -> Result<(), InterpreterError> {
        if !self.has_flag(ScriptFlags::STRICT_ENC) {
            return Ok(());
        }
        match (pub_key.len(), pub_key.first()) {
            (33, Some(0x02 | 0x03)) | (65, Some(0x04)) => Ok(()),
            _ => Err(InterpreterError::new(
                InterpreterErrorCode::PubKeyType,
                "unsupported public key type",
            )),
        }
    }
}

fn der_error(code: InterpreterErrorCode, msg: &str) -> InterpreterError {
    InterpreterError::new(code, format!("malformed signature: {}", msg))
}

/// BIP66 shape check of a DER signature without its sighash byte.
///
/// Returns the S integer bytes.
fn check_der_shape(sig: &[u8]) -> Result<&[u8], InterpreterError> {
    use InterpreterErrorCode::*;

    let sig_len = sig.len();
    if sig_len < 8 {
        return Err(der_error(SigTooShort, &format!("too short: {} < 8", sig_len)));
    }
    if sig_len > 72 {
        return Err(der_error(SigTooLong, &format!("too long: {} > 72", sig_len)));
    }
    if sig[0] != 0x30 {
        return Err(der_error(SigInvalidSeqID, &format!("wrong sequence tag: {:#x}", sig[0])));
    }
    if sig[1] as usize != sig_len - 2 {
        return Err(der_error(SigInvalidDataLen, &format!("bad length: {} != {}", sig[1], sig_len - 2)));
    }

    let r_len = sig[3] as usize;
    let s_type_offset = 4 + r_len;
    let s_len_offset = s_type_offset + 1;
    if s_type_offset >= sig_len {
        return Err(der_error(SigMissingSTypeID, "S type indicator missing"));
    }
    if s_len_offset >= sig_len {
        return Err(der_error(SigMissingSLen, "S length missing"));
    }

    let s_offset = s_len_offset + 1;
    let s_len = sig[s_len_offset] as usize;
    if s_offset + s_len != sig_len {
        return Err(der_error(SigInvalidSLen, "invalid S length"));
    }

    if sig[2] != 0x02 {
        return Err(der_error(SigInvalidRIntID, &format!("R integer marker: {:#x} != 0x02", sig[2])));
    }
    if r_len == 0 {
        return Err(der_error(SigZeroRLen, "R length is zero"));
    }
    if sig[4] & 0x80 != 0 {
        return Err(der_error(SigNegativeR, "R is negative"));
    }
    if r_len > 1 && sig[4] == 0x00 && sig[5] & 0x80 == 0 {
        return Err(der_error(SigTooMuchRPadding, "R value has too much padding"));
    }

    if sig[s_type_offset] != 0x02 {
        return Err(der_error(
            SigInvalidSIntID,
            &format!("S integer marker: {:#x} != 0x02", sig[s_type_offset]),
        ));
    }
    if s_len == 0 {
        return Err(der_error(SigZeroSLen, "S length is zero"));
    }
    if sig[s_offset] & 0x80 != 0 {
        return Err(der_error(SigNegativeS, "S is negative"));
    }
    if s_len > 1 && sig[s_offset] == 0x00 && sig[s_offset + 1] & 0x80 == 0 {
        return Err(der_error(SigTooMuchSPadding, "S value has too much padding"));
    }

    Ok(&sig[s_offset..])
}
