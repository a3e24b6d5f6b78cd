//! Tests for the btcsdk-transaction crate.
//!
//! Covers wire parsing and serialization, txids, the legacy sighash
//! against a mainnet spend, and end-to-end signing and verification.

use btcsdk_primitives::chainhash::Hash;
use btcsdk_primitives::ec::PrivateKey;
use btcsdk_script::interpreter::{Config, InterpreterErrorCode, ScriptFlags, ScriptRole};
use btcsdk_script::Script;

use crate::input::{TxIn, DEFAULT_SEQUENCE_NUMBER};
use crate::output::TxOut;
use crate::sighash::{self, SigHashType};
use crate::template::{p2pkh, UnlockingScriptTemplate};
use crate::transaction::Transaction;
use crate::{verify_all_inputs, verify_input, TransactionError};

// -----------------------------------------------------------------------
// Raw transaction vectors
// -----------------------------------------------------------------------

/// A standard transaction.
const SOURCE_RAW_TX: &str = "010000000138c7c61c14ffb063c3bb2664041a3e29ea6ea0412a0c18ff725ba4e9e12afae2030000006a47304402203e9ab8e4c14addf3b4741540b556cfb0e0efb67dc1a7b5ce84c3ac56b3fd447802203c9f49f7bd893ebd7060176dfc36bcaff9d2c443d9a0dd6cd2d59b372c024d20412102798913bc057b344de675dac34faafe3dc2f312c758cd9068209f810877306d66ffffffff02dc050000000000002076a914eb0bd5edba389198e73f8efabddfc61666969ff788ac6a0568656c6c6faa0d0000000000001976a914eb0bd5edba389198e73f8efabddfc61666969ff788ac00000000";

/// A coinbase transaction.
const COINBASE_TX_HEX: &str = "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff17033f250d2f43555656452f2c903fb60859897700d02700ffffffff01d864a012000000001976a914d648686cf603c11850f39600e37312738accca8f88ac00000000";

/// A transaction with three inputs.
const MULTI_INPUT_TX_HEX: &str = "0200000003a9bc457fdc6a54d99300fb137b23714d860c350a9d19ff0f571e694a419ff3a0010000006b48304502210086c83beb2b2663e4709a583d261d75be538aedcafa7766bd983e5c8db2f8b2fc02201a88b178624ab0ad1748b37c875f885930166237c88f5af78ee4e61d337f935f412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff0092bb9a47e27bf64fc98f557c530c04d9ac25e2f2a8b600e92a0b1ae7c89c20010000006b483045022100f06b3db1c0a11af348401f9cebe10ae2659d6e766a9dcd9e3a04690ba10a160f02203f7fbd7dfcfc70863aface1a306fcc91bbadf6bc884c21a55ef0d32bd6b088c8412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff9d0d4554fa692420a0830ca614b6c60f1bf8eaaa21afca4aa8c99fb052d9f398000000006b483045022100d920f2290548e92a6235f8b2513b7f693a64a0d3fa699f81a034f4b4608ff82f0220767d7d98025aff3c7bd5f2a66aab6a824f5990392e6489aae1e1ae3472d8dffb412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff02807c814a000000001976a9143a6bf34ebfcf30e8541bbb33a7882845e5a29cb488ac76b0e60e000000001976a914bd492b67f90cb85918494767ebb23102c4f06b7088ac67000000";

/// Mainnet block 170: the first spend of a coinbase output, a P2PK input
/// signed with SIGHASH_ALL.
const BLOCK_170_TX: &str = "0100000001c997a5e56e104102fa209c6a852dd90660a20b2d9c352423edce25857fcd3704000000004847304402204e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd410220181522ec8eca07de4860a4acdd12909d831cc56cbbac4622082221a8768d1d0901ffffffff0200ca9a3b00000000434104ae1a62fe09c5f51b13905f07f06b99a2f7159b2225f374cd378d71302fa28414e7aab37397f554a7df5f142c21c1b7303b8a0626f1baded5c72a704f7e6cd84cac00286bee0000000043410411db93e1dcdb8a016b49840f8c53bc1eb68a382e97b1482ecad7b148a6909a5cb2e0eaddfb84ccf9744464f82e160bfa9b8b64f9d4c03f999b8643f656b412a3ac00000000";
const BLOCK_170_TXID: &str = "f4184fc596403b9d638783cf57adfe4c75c605f6356fbc91338530e9831e9e16";
/// Locking script of the output spent by BLOCK_170_TX (block 9 coinbase).
const BLOCK_9_COINBASE_SCRIPT: &str = "410411db93e1dcdb8a016b49840f8c53bc1eb68a382e97b1482ecad7b148a6909a5cb2e0eaddfb84ccf9744464f82e160bfa9b8b64f9d4c03f999b8643f656b412a3ac";
const BLOCK_170_SIGHASH: &str = "7a05c6145f10101e9d6325494245adf1297d80f8f38d4d576d57cdba220bcb19";

const KEY_HEX: &str = "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn block_9_output() -> TxOut {
    TxOut::new(5_000_000_000, Script::from_hex(BLOCK_9_COINBASE_SCRIPT).unwrap())
}

// -----------------------------------------------------------------------
// Parsing and serialization
// -----------------------------------------------------------------------

#[test]
fn test_from_hex_roundtrip() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).expect("should parse source tx hex");
    assert_eq!(tx.version, 1);
    assert_eq!(tx.inputs.len(), 1);
    assert_eq!(tx.outputs.len(), 2);
    assert_eq!(tx.lock_time, 0);
    assert_eq!(tx.inputs[0].sequence, DEFAULT_SEQUENCE_NUMBER);
    assert_eq!(tx.to_hex(), SOURCE_RAW_TX);
    assert_eq!(tx.to_string(), SOURCE_RAW_TX);
}

#[test]
fn test_multi_input_roundtrip() {
    let tx = Transaction::from_hex(MULTI_INPUT_TX_HEX).expect("should parse multi-input tx");
    assert_eq!(tx.version, 2);
    assert_eq!(tx.inputs.len(), 3);
    assert_eq!(tx.outputs.len(), 2);
    assert_eq!(tx.lock_time, 103);
    assert!(tx.inputs.iter().all(|i| i.sequence == 0xffff_fffe));
    assert_eq!(tx.to_hex(), MULTI_INPUT_TX_HEX);
}

#[test]
fn test_coinbase_roundtrip() {
    let tx = Transaction::from_hex(COINBASE_TX_HEX).unwrap();
    assert_eq!(tx.inputs[0].prev_txid, Hash::default());
    assert_eq!(tx.inputs[0].vout, 0xffff_ffff);
    let paid: u64 = tx.outputs.iter().map(|o| o.satoshis).sum();
    assert_eq!(paid, 312_501_464);
    assert_eq!(tx.to_hex(), COINBASE_TX_HEX);
}

#[test]
fn test_input_prev_txid_is_wire_order() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).unwrap();
    let input = &tx.inputs[0];
    assert_eq!(
        hex::encode(input.prev_txid.as_bytes()),
        "38c7c61c14ffb063c3bb2664041a3e29ea6ea0412a0c18ff725ba4e9e12afae2"
    );
    assert_eq!(input.vout, 3);
}

#[test]
fn test_trailing_bytes_error() {
    let hex_with_extra = format!("{}00", SOURCE_RAW_TX);
    assert!(matches!(
        Transaction::from_hex(&hex_with_extra),
        Err(TransactionError::SerializationError(_))
    ));
}

#[test]
fn test_invalid_hex_error() {
    assert!(Transaction::from_hex("not hex").is_err());
}

#[test]
fn test_truncated_errors() {
    assert!(Transaction::from_bytes(&[]).is_err());
    let bytes = hex::decode(SOURCE_RAW_TX).unwrap();
    for cut in [3, 5, 40, 100, bytes.len() - 1] {
        assert!(Transaction::from_bytes(&bytes[..cut]).is_err(), "cut at {}", cut);
    }
}

#[test]
fn test_absurd_input_count_rejected() {
    // version, then a count of 2^32 inputs with nothing behind it
    let bytes = hex::decode("01000000ff0000000001000000").unwrap();
    let err = Transaction::from_bytes(&bytes).unwrap_err();
    assert!(err.to_string().contains("input count"), "{}", err);
}

#[test]
fn test_empty_transaction_serialization() {
    let tx = Transaction::new();
    assert_eq!(tx.to_hex(), "01000000000000000000");
    assert_eq!(Transaction::from_hex(&tx.to_hex()).unwrap(), tx);
}

#[test]
fn test_serde_json_roundtrip() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).unwrap();
    let json = serde_json::to_string(&tx).unwrap();
    assert!(json.contains("e2fa2ae1e9a45b72ff180c2a41a06eea293e1a046426bbc363b0ff141cc6c738"));
    let back: Transaction = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tx);
}

// -----------------------------------------------------------------------
// Transaction ID
// -----------------------------------------------------------------------

#[test]
fn test_txid() {
    let tx = Transaction::from_hex(BLOCK_170_TX).unwrap();
    let txid = tx.txid();
    assert_eq!(txid.to_string(), BLOCK_170_TXID);

    let mut reversed = *txid.as_bytes();
    reversed.reverse();
    assert_eq!(hex::encode(reversed), BLOCK_170_TXID);
}

// -----------------------------------------------------------------------
// Sighash and verification against mainnet
// -----------------------------------------------------------------------

#[test]
fn test_legacy_sighash_mainnet() {
    init_tracing();
    let tx = Transaction::from_hex(BLOCK_170_TX).unwrap();
    let script = Script::from_hex(BLOCK_9_COINBASE_SCRIPT).unwrap();
    let digest = tx.signature_hash(0, &script, SigHashType::ALL);
    assert_eq!(hex::encode(digest), BLOCK_170_SIGHASH);

    let preimage = sighash::legacy_preimage(&tx, 0, &script, SigHashType::ALL).unwrap();
    assert_eq!(&preimage[preimage.len() - 4..], &[1, 0, 0, 0]);
}

#[test]
fn test_verify_mainnet_input() {
    init_tracing();
    let tx = Transaction::from_hex(BLOCK_170_TX).unwrap();
    let verdict = verify_input(&tx, 0, &block_9_output(), ScriptFlags::STANDARD, &Config::default()).unwrap();
    assert!(verdict.is_success(), "{:?}", verdict);
}

#[test]
fn test_verify_detects_tampering() {
    let mut tx = Transaction::from_hex(BLOCK_170_TX).unwrap();
    tx.outputs[0].satoshis += 1;

    let verdict = verify_input(&tx, 0, &block_9_output(), ScriptFlags::P2SH, &Config::default()).unwrap();
    let err = verdict.failure().unwrap();
    assert_eq!(err.code, InterpreterErrorCode::EvalFalse);

    // A failed CHECKSIG with a non-empty signature is fatal under NULL_FAIL.
    let verdict = verify_input(&tx, 0, &block_9_output(), ScriptFlags::STANDARD, &Config::default()).unwrap();
    let err = verdict.failure().unwrap();
    assert_eq!(err.code, InterpreterErrorCode::NullFail);
    assert_eq!(err.offset.map(|o| o.script), Some(ScriptRole::Locking));
}

#[test]
fn test_verify_input_index_out_of_range() {
    let tx = Transaction::from_hex(BLOCK_170_TX).unwrap();
    let err = verify_input(&tx, 1, &block_9_output(), ScriptFlags::STANDARD, &Config::default()).unwrap_err();
    assert!(matches!(err, TransactionError::InputIndexOutOfRange { index: 1, count: 1 }));
}

// -----------------------------------------------------------------------
// Signing
// -----------------------------------------------------------------------

/// A transaction spending `n` P2PKH outputs of `key` into two outputs.
fn spending_tx(key: &PrivateKey, n: usize) -> (Transaction, Vec<TxOut>) {
    let lock = p2pkh::lock(&key.public_key().hash160());
    let mut tx = Transaction::new();
    let mut prev_outputs = Vec::new();
    for i in 0..n {
        tx.add_input(TxIn::new(Hash::new([0x11 + i as u8; 32]), i as u32, Script::new()));
        prev_outputs.push(TxOut::new(10_000, lock.clone()));
    }
    tx.add_output(TxOut::new(6_000, p2pkh::lock(&[0x22; 20])));
    tx.add_output(TxOut::new(3_000, p2pkh::lock(&[0x33; 20])));
    (tx, prev_outputs)
}

fn sign_all(tx: &mut Transaction, key: &PrivateKey, prev_outputs: &[TxOut], sighash_type: SigHashType) {
    for i in 0..tx.inputs.len() {
        let script = p2pkh::sign_input(tx, i, key, &prev_outputs[i].locking_script, sighash_type).unwrap();
        tx.inputs[i].unlocking_script = script;
    }
}

#[test]
fn test_p2pkh_lock() {
    let lock = p2pkh::lock(&[0xab; 20]);
    assert!(lock.is_p2pkh());
    assert_eq!(lock.public_key_hash().unwrap(), [0xab; 20]);
}

#[test]
fn test_p2pkh_sign_and_verify() {
    init_tracing();
    let key = PrivateKey::from_hex(KEY_HEX).unwrap();
    for sighash_type in [
        SigHashType::ALL,
        SigHashType::NONE,
        SigHashType::SINGLE,
        SigHashType::ALL | SigHashType::ANYONECANPAY,
    ] {
        let (mut tx, prev_outputs) = spending_tx(&key, 2);
        sign_all(&mut tx, &key, &prev_outputs, sighash_type);

        let unlock = &tx.inputs[0].unlocking_script;
        assert!(unlock.is_push_only());
        let chunks = unlock.chunks().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].data.as_ref().unwrap().last(), Some(&sighash_type.to_byte()));
        assert_eq!(chunks[1].data.as_deref(), Some(&key.public_key().to_compressed()[..]));

        for i in 0..2 {
            let verdict = verify_input(&tx, i, &prev_outputs[i], ScriptFlags::STANDARD, &Config::default()).unwrap();
            assert!(verdict.is_success(), "{} input {}: {:?}", sighash_type, i, verdict);
        }
    }
}

#[test]
fn test_signing_is_deterministic() {
    let key = PrivateKey::from_hex(KEY_HEX).unwrap();
    let (tx, prev_outputs) = spending_tx(&key, 1);
    let a = p2pkh::sign_input(&tx, 0, &key, &prev_outputs[0].locking_script, SigHashType::ALL).unwrap();
    let b = p2pkh::sign_input(&tx, 0, &key, &prev_outputs[0].locking_script, SigHashType::ALL).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_single_signature_survives_other_output_changes() {
    let key = PrivateKey::from_hex(KEY_HEX).unwrap();
    let (mut tx, prev_outputs) = spending_tx(&key, 1);
    sign_all(&mut tx, &key, &prev_outputs, SigHashType::SINGLE);

    let mut changed = tx.clone();
    changed.outputs[1].satoshis = 1;
    changed.add_output(TxOut::new(5, Script::new()));
    let verdict = verify_input(&changed, 0, &prev_outputs[0], ScriptFlags::STANDARD, &Config::default()).unwrap();
    assert!(verdict.is_success());

    changed.outputs[0].satoshis = 1;
    let verdict = verify_input(&changed, 0, &prev_outputs[0], ScriptFlags::STANDARD, &Config::default()).unwrap();
    assert!(!verdict.is_success());
}

#[test]
fn test_wrong_key_fails_equalverify() {
    let key = PrivateKey::from_hex(KEY_HEX).unwrap();
    let other = PrivateKey::from_hex("0000000000000000000000000000000000000000000000000000000000000001").unwrap();
    let (mut tx, prev_outputs) = spending_tx(&key, 1);
    sign_all(&mut tx, &other, &prev_outputs, SigHashType::ALL);

    let verdict = verify_input(&tx, 0, &prev_outputs[0], ScriptFlags::STANDARD, &Config::default()).unwrap();
    let err = verdict.failure().unwrap();
    assert_eq!(err.code, InterpreterErrorCode::EqualVerify);
    assert_eq!(err.offset.map(|o| o.byte), Some(23));
}

#[test]
fn test_single_without_output_refused() {
    let key = PrivateKey::from_hex(KEY_HEX).unwrap();
    let (tx, prev_outputs) = spending_tx(&key, 3);
    let err = p2pkh::sign_input(&tx, 2, &key, &prev_outputs[2].locking_script, SigHashType::SINGLE).unwrap_err();
    assert!(matches!(err, TransactionError::SigningError(_)));

    let err = p2pkh::sign_input(&tx, 3, &key, &prev_outputs[0].locking_script, SigHashType::ALL).unwrap_err();
    assert!(matches!(err, TransactionError::InputIndexOutOfRange { index: 3, count: 3 }));
}

#[test]
fn test_unlocking_template() {
    let key = PrivateKey::from_hex(KEY_HEX).unwrap();
    let (mut tx, prev_outputs) = spending_tx(&key, 1);
    let unlocker = p2pkh::unlock(key, None);
    tx.inputs[0].unlocking_script = unlocker.sign(&tx, 0, &prev_outputs[0].locking_script).unwrap();

    let verdict = verify_input(&tx, 0, &prev_outputs[0], ScriptFlags::STANDARD, &Config::default()).unwrap();
    assert!(verdict.is_success());
}

// -----------------------------------------------------------------------
// Whole-transaction verification
// -----------------------------------------------------------------------

#[test]
fn test_verify_all_inputs() {
    init_tracing();
    let key = PrivateKey::from_hex(KEY_HEX).unwrap();
    let (mut tx, prev_outputs) = spending_tx(&key, 5);
    sign_all(&mut tx, &key, &prev_outputs, SigHashType::ALL);
    // Break input 3 by swapping in input 1's unlocking script.
    tx.inputs[3].unlocking_script = tx.inputs[1].unlocking_script.clone();

    let verdicts = verify_all_inputs(&tx, &prev_outputs, ScriptFlags::STANDARD, &Config::default()).unwrap();
    assert_eq!(verdicts.len(), 5);
    for (i, verdict) in verdicts.iter().enumerate() {
        assert_eq!(verdict.is_success(), i != 3, "input {}: {:?}", i, verdict);
    }
    assert_eq!(verdicts[3].failure().unwrap().code, InterpreterErrorCode::NullFail);
}

#[test]
fn test_verify_all_inputs_count_mismatch() {
    let key = PrivateKey::from_hex(KEY_HEX).unwrap();
    let (tx, prev_outputs) = spending_tx(&key, 2);
    let err = verify_all_inputs(&tx, &prev_outputs[..1], ScriptFlags::STANDARD, &Config::default()).unwrap_err();
    assert!(matches!(err, TransactionError::PrevOutputCountMismatch { inputs: 2, outputs: 1 }));

    let empty = Transaction::new();
    assert!(verify_all_inputs(&empty, &[], ScriptFlags::STANDARD, &Config::default()).unwrap().is_empty());
}

/// A one-input transaction spending a bare pay-to-pubkey output locked to
/// `pub_key`, with the signature already in place.
fn p2pk_spend(key: &PrivateKey, pub_key: &[u8]) -> (Transaction, TxOut) {
    let mut lock = Script::new();
    lock.append_push_data(pub_key).unwrap();
    lock.append_opcodes(&[btcsdk_script::opcodes::OP_CHECKSIG]).unwrap();

    let mut tx = Transaction::new();
    tx.add_input(TxIn::new(Hash::new([0x44; 32]), 0, Script::new()));
    tx.add_output(TxOut::new(900, p2pkh::lock(&[0x55; 20])));

    let digest = tx.signature_hash(0, &lock, SigHashType::ALL);
    let mut sig = key.sign(&digest).unwrap().to_der();
    sig.push(SigHashType::ALL.to_byte());
    let mut unlock = Script::new();
    unlock.append_push_data(&sig).unwrap();
    tx.inputs[0].unlocking_script = unlock;

    (tx, TxOut::new(1_000, lock))
}

#[test]
fn test_hybrid_key_verifies_without_strict_encoding() {
    let key = PrivateKey::from_hex(KEY_HEX).unwrap();
    let public = key.public_key();
    let mut hybrid = public.to_uncompressed();
    hybrid[0] = if public.affine().y().is_odd() { 0x07 } else { 0x06 };

    let (tx, prev) = p2pk_spend(&key, &hybrid);
    let verdict = verify_input(&tx, 0, &prev, ScriptFlags::P2SH, &Config::default()).unwrap();
    assert!(verdict.is_success(), "{:?}", verdict);

    let verdict = verify_input(&tx, 0, &prev, ScriptFlags::STANDARD, &Config::default()).unwrap();
    assert_eq!(verdict.failure().unwrap().code, InterpreterErrorCode::PubKeyType);

    // The same signature under the plain uncompressed key also verifies.
    let (tx, prev) = p2pk_spend(&key, &public.to_uncompressed());
    assert!(verify_input(&tx, 0, &prev, ScriptFlags::STANDARD, &Config::default()).unwrap().is_success());
}

#[test]
fn test_hybrid_key_with_wrong_parity_fails() {
    let key = PrivateKey::from_hex(KEY_HEX).unwrap();
    let public = key.public_key();
    let mut hybrid = public.to_uncompressed();
    hybrid[0] = if public.affine().y().is_odd() { 0x06 } else { 0x07 };

    let (tx, prev) = p2pk_spend(&key, &hybrid);
    let verdict = verify_input(&tx, 0, &prev, ScriptFlags::P2SH, &Config::default()).unwrap();
    assert_eq!(verdict.failure().unwrap().code, InterpreterErrorCode::EvalFalse);
}

// -----------------------------------------------------------------------
// Lock time through the checker
// -----------------------------------------------------------------------

#[test]
fn test_check_lock_time_verify_against_transaction() {
    let mut lock = Script::new();
    lock.append_number(100).unwrap();
    lock.append_opcodes(&[
        btcsdk_script::opcodes::OP_CHECKLOCKTIMEVERIFY,
        btcsdk_script::opcodes::OP_DROP,
        btcsdk_script::opcodes::OP_1,
    ])
    .unwrap();
    let prev = TxOut::new(1_000, lock);

    let mut tx = Transaction::new();
    tx.lock_time = 200;
    let mut input = TxIn::new(Hash::new([1; 32]), 0, Script::new());
    input.sequence = 0;
    tx.add_input(input);

    let flags = ScriptFlags::STANDARD;
    assert!(verify_input(&tx, 0, &prev, flags, &Config::default()).unwrap().is_success());

    tx.lock_time = 99;
    let verdict = verify_input(&tx, 0, &prev, flags, &Config::default()).unwrap();
    assert_eq!(verdict.failure().unwrap().code, InterpreterErrorCode::UnsatisfiedLockTime);

    tx.lock_time = 200;
    tx.inputs[0].sequence = DEFAULT_SEQUENCE_NUMBER;
    let verdict = verify_input(&tx, 0, &prev, flags, &Config::default()).unwrap();
    assert_eq!(verdict.failure().unwrap().code, InterpreterErrorCode::UnsatisfiedLockTime);
}
