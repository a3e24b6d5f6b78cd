//! Signature and lock time checks backed by a real transaction.

use btcsdk_primitives::ec::{PublicKey, Signature};
use btcsdk_primitives::PrimitivesError;
use btcsdk_script::interpreter::TxContext;
use btcsdk_script::Script;
use tracing::trace;

use crate::sighash::{signature_hash, SigHashType};
use crate::transaction::Transaction;

/// Supplies the interpreter with the spending transaction: signature
/// checks hash it with the legacy algorithm and verify with ECDSA.
#[derive(Debug, Clone, Copy)]
pub struct TransactionChecker<'a> {
    tx: &'a Transaction,
}

impl<'a> TransactionChecker<'a> {
    pub fn new(tx: &'a Transaction) -> Self {
        TransactionChecker { tx }
    }

    pub fn transaction(&self) -> &'a Transaction {
        self.tx
    }
}

impl TxContext for TransactionChecker<'_> {
    fn verify_signature(&self, full_sig: &[u8], pub_key: &[u8], script_code: &Script, input_idx: usize) -> bool {
        let Some((&hash_type, der)) = full_sig.split_last() else {
            return false;
        };

        let pub_key = match parse_pub_key(pub_key) {
            Ok(pk) => pk,
            Err(e) => {
                trace!(input_idx, "unparseable public key: {}", e);
                return false;
            }
        };
        let sig = match Signature::from_der(der) {
            Ok(sig) => sig,
            Err(e) => {
                trace!(input_idx, "unparseable signature: {}", e);
                return false;
            }
        };

        let digest = signature_hash(self.tx, input_idx, script_code, SigHashType::from_byte(hash_type));
        pub_key.verify(&digest, &sig)
    }

    fn lock_time(&self) -> u32 {
        self.tx.lock_time
    }

    fn tx_version(&self) -> u32 {
        self.tx.version
    }

    /// Out of range indexes read as final.
    fn input_sequence(&self, input_idx: usize) -> u32 {
        self.tx
            .inputs
            .get(input_idx)
            .map_or(crate::input::DEFAULT_SEQUENCE_NUMBER, |input| input.sequence)
    }
}

/// Parse a key the way consensus does.
///
/// Besides the compressed and uncompressed SEC1 forms this takes the
/// hybrid `0x06`/`0x07` form: an uncompressed key whose prefix also
/// carries the parity of y, which must match. Strict encoding rejects
/// hybrid keys in the interpreter before they get here, so they only
/// verify when that flag is off.
fn parse_pub_key(bytes: &[u8]) -> Result<PublicKey, PrimitivesError> {
    match bytes {
        [prefix @ (0x06 | 0x07), coords @ ..] if coords.len() == 64 => {
            let mut uncompressed = [0u8; 65];
            uncompressed[0] = 0x04;
            uncompressed[1..].copy_from_slice(coords);
            let key = PublicKey::from_bytes(&uncompressed)?;
            if key.affine().y().is_odd() != (*prefix == 0x07) {
                return Err(PrimitivesError::InvalidPublicKey("hybrid key parity does not match y".into()));
            }
            Ok(key)
        }
        _ => PublicKey::from_bytes(bytes),
    }
}
