//! Batched fitness evaluation.
//!
//! A batch is a slot-major block of keys, `n` per chromosome. With more than
//! one worker the chromosomes are decoded on a dedicated, bounded rayon pool;
//! every worker sees one chromosome through a shared read-only view and
//! returns one value. Results come back in batch order regardless of which
//! worker finished first.

use super::types::Decoder;
use crate::error::{BrkgaError, Result};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Evaluates chromosome batches against a [`Decoder`].
pub struct FitnessDispatcher {
    max_workers: usize,
    pool: Option<ThreadPool>,
}

impl FitnessDispatcher {
    /// Creates a dispatcher bounded to `max_workers` threads.
    ///
    /// `0` and `1` both mean sequential, in-process decoding.
    pub fn new(max_workers: usize) -> Result<Self> {
        let pool = if max_workers > 1 {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(max_workers)
                    .thread_name(|i| format!("brkga-decode-{i}"))
                    .build()?,
            )
        } else {
            None
        };
        Ok(Self { max_workers, pool })
    }

    /// Configured worker bound.
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Decodes every chromosome of `keys` (chunks of length `n`).
    ///
    /// Blocks until the whole batch is done. A decoder failure discards the
    /// batch and is returned with the failing batch position; when several
    /// chromosomes fail on the pool, which of them is reported is unspecified.
    ///
    /// `n` must be non-zero and divide `keys.len()`.
    pub fn evaluate<D: Decoder + ?Sized>(
        &self,
        decoder: &D,
        keys: &[f64],
        n: usize,
    ) -> Result<Vec<f64>> {
        if n == 0 || keys.len() % n != 0 {
            return Err(BrkgaError::InvalidArgument(format!(
                "batch of {} keys cannot be split into chromosomes of length {n}",
                keys.len()
            )));
        }

        let decode_one = |(index, chromosome): (usize, &[f64])| {
            decoder
                .decode(chromosome)
                .map_err(|source| BrkgaError::Decode { index, source })
        };

        match &self.pool {
            Some(pool) => pool.install(|| {
                keys.par_chunks(n)
                    .enumerate()
                    .map(decode_one)
                    .collect::<Result<Vec<f64>>>()
            }),
            None => keys.chunks(n).enumerate().map(decode_one).collect(),
        }
    }
}

impl std::fmt::Debug for FitnessDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitnessDispatcher")
            .field("max_workers", &self.max_workers)
            .field("parallel", &self.pool.is_some())
            .finish()
    }
}
