//! Input verification: run each input's unlocking script against the
//! output it spends.

use std::thread;

use btcsdk_script::interpreter::{Config, Engine, ScriptFlags, TxContext, Verdict};
use tracing::debug;

use crate::checker::TransactionChecker;
use crate::output::TxOut;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Verify input `index` of `tx` against `prev_output`, the output it spends.
///
/// A script that fails is a [`Verdict::Failure`]; `Err` is reserved for an
/// `index` that does not name an input.
pub fn verify_input(
    tx: &Transaction,
    index: usize,
    prev_output: &TxOut,
    flags: ScriptFlags,
    config: &Config,
) -> Result<Verdict, TransactionError> {
    let input = tx
        .inputs
        .get(index)
        .ok_or(TransactionError::InputIndexOutOfRange { index, count: tx.inputs.len() })?;

    let checker = TransactionChecker::new(tx);
    let engine = Engine::with_config(config.clone());
    Ok(engine.execute(&input.unlocking_script, &prev_output.locking_script, flags, Some(&checker), index))
}

/// Verify every input of `tx`. `prev_outputs[i]` is the output spent by
/// input `i`.
///
/// Runs share nothing mutable, so inputs are split across scoped worker
/// threads, at most one per available CPU. Verdicts come back in input
/// order.
pub fn verify_all_inputs(
    tx: &Transaction,
    prev_outputs: &[TxOut],
    flags: ScriptFlags,
    config: &Config,
) -> Result<Vec<Verdict>, TransactionError> {
    let count = tx.inputs.len();
    if prev_outputs.len() != count {
        return Err(TransactionError::PrevOutputCountMismatch { inputs: count, outputs: prev_outputs.len() });
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    let workers = thread::available_parallelism().map_or(1, |n| n.get()).min(count);
    let chunk_size = count.div_ceil(workers);
    debug!(inputs = count, workers, "verifying transaction inputs");

    let checker = TransactionChecker::new(tx);
    let engine = Engine::with_config(config.clone());
    let (checker, engine) = (&checker, &engine);

    let verdicts: Vec<Verdict> = thread::scope(|s| {
        let handles: Vec<_> = (0..count)
            .step_by(chunk_size)
            .map(|start| {
                let end = (start + chunk_size).min(count);
                s.spawn(move || {
                    (start..end)
                        .map(|i| {
                            engine.execute(
                                &tx.inputs[i].unlocking_script,
                                &prev_outputs[i].locking_script,
                                flags,
                                Some(checker as &dyn TxContext),
                                i,
                            )
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let failed = verdicts.iter().filter(|v| !v.is_success()).count();
    debug!(inputs = count, failed, "transaction inputs verified");
    Ok(verdicts)
}
