use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::assemble::RecordAssembler;
use crate::domain::{AssembledRecord, RawDocument};

/// Assemble a batch of documents across scoped worker threads.
///
/// Documents are independent of one another, so the batch fans out over a
/// shared work queue; output order always matches input order regardless of
/// which worker processed which document. Assembly is total (failures degrade
/// to incomplete records with diagnostics), so no document can abort the
/// batch.
pub fn assemble_batch(
    assembler: &RecordAssembler,
    docs: &[RawDocument],
    workers: usize,
) -> Vec<AssembledRecord> {
    let workers = workers.max(1).min(docs.len().max(1));
    if workers == 1 || docs.len() <= 1 {
        return docs.iter().map(|d| assembler.assemble(d)).collect();
    }

    let next = AtomicUsize::new(0);
    let slots: Mutex<Vec<Option<AssembledRecord>>> = Mutex::new(vec![None; docs.len()]);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let i = next.fetch_add(1, Ordering::SeqCst);
                if i >= docs.len() {
                    break;
                }
                let assembled = assembler.assemble(&docs[i]);
                let mut guard = slots.lock().expect("batch slots poisoned");
                guard[i] = Some(assembled);
            });
        }
    });

    slots
        .into_inner()
        .expect("batch slots poisoned")
        .into_iter()
        .map(|slot| slot.expect("every document assembled"))
        .collect()
}
