//! Pay-to-Public-Key-Hash (P2PKH) script template.
//!
//! Locking script: `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`.
//! Unlocking script: `<sig> <pubkey>`.

use btcsdk_primitives::ec::PrivateKey;
use btcsdk_script::opcodes::*;
use btcsdk_script::Script;
use tracing::debug;

use crate::sighash::{signature_hash, SigHashType};
use crate::template::UnlockingScriptTemplate;
use crate::transaction::Transaction;
use crate::TransactionError;

/// The 25-byte P2PKH locking script for a public key hash.
pub fn lock(pubkey_hash: &[u8; 20]) -> Script {
    let mut bytes = Vec::with_capacity(25);
    bytes.push(OP_DUP);
    bytes.push(OP_HASH160);
    bytes.push(OP_DATA_20);
    bytes.extend_from_slice(pubkey_hash);
    bytes.push(OP_EQUALVERIFY);
    bytes.push(OP_CHECKSIG);
    Script::from(bytes)
}

/// Sign input `index` and build its unlocking script.
///
/// The signature is deterministic (RFC 6979) and low-S, followed by the
/// sighash byte; the key is pushed compressed.
///
/// # Arguments
/// * `tx` - The spending transaction.
/// * `index` - The input to sign.
/// * `key` - The private key whose public key hash `prev_locking_script` pays to.
/// * `prev_locking_script` - The locking script of the spent output.
/// * `sighash_type` - Which parts of `tx` the signature commits to.
pub fn sign_input(
    tx: &Transaction,
    index: usize,
    key: &PrivateKey,
    prev_locking_script: &Script,
    sighash_type: SigHashType,
) -> Result<Script, TransactionError> {
    if index >= tx.inputs.len() {
        return Err(TransactionError::InputIndexOutOfRange { index, count: tx.inputs.len() });
    }
    // Signing the constant digest would authorize any transaction.
    if sighash_type.base_type() == SigHashType::SINGLE.0 && index >= tx.outputs.len() {
        return Err(TransactionError::SigningError(format!(
            "SIGHASH_SINGLE for input {} but the transaction has {} outputs",
            index,
            tx.outputs.len()
        )));
    }

    let digest = signature_hash(tx, index, prev_locking_script, sighash_type);
    let signature = key.sign(&digest)?;

    let der = signature.to_der();
    let mut sig_buf = Vec::with_capacity(der.len() + 1);
    sig_buf.extend_from_slice(&der);
    sig_buf.push(sighash_type.to_byte());

    let mut script = Script::new();
    script.append_push_data(&sig_buf)?.append_push_data(&key.public_key().to_compressed())?;

    debug!(index, sighash_type = %sighash_type, "signed P2PKH input");
    Ok(script)
}

/// P2PKH unlocker holding a private key and sighash type.
pub struct P2PKH {
    private_key: PrivateKey,
    sighash_type: SigHashType,
}

/// A P2PKH unlocker. The sighash type defaults to ALL.
pub fn unlock(private_key: PrivateKey, sighash_type: Option<SigHashType>) -> P2PKH {
    P2PKH { private_key, sighash_type: sighash_type.unwrap_or_default() }
}

impl UnlockingScriptTemplate for P2PKH {
    fn sign(&self, tx: &Transaction, input_idx: usize, prev_locking_script: &Script) -> Result<Script, TransactionError> {
        sign_input(tx, input_idx, &self.private_key, prev_locking_script, self.sighash_type)
    }
}
