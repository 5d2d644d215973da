use super::Partition;
use crate::BuildError;
use ndarray::{Array, Dimension, ShapeBuilder};
use rayon::prelude::*;
use std::ops::Range;

/// A fixed team of logical workers executing the same kernel over disjoint index ranges.
///
/// Workers run on a dedicated rayon pool sized to the team. A call to [`WorkerTeam::run`]
/// returns only once every worker, including those with an empty range, has finished: the
/// join is the collective barrier.
pub struct WorkerTeam {
    pool: rayon::ThreadPool,
    number_of_workers: usize,
}

impl std::fmt::Debug for WorkerTeam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerTeam")
            .field("number_of_workers", &self.number_of_workers)
            .finish()
    }
}

impl WorkerTeam {
    pub fn new(number_of_workers: usize) -> Result<Self, BuildError> {
        if number_of_workers == 0 {
            return Err(BuildError::NoWorkers);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(number_of_workers)
            .thread_name(|rank| format!("bte-worker-{rank}"))
            .build()?;
        Ok(Self {
            pool,
            number_of_workers,
        })
    }

    pub fn number_of_workers(&self) -> usize {
        self.number_of_workers
    }

    pub fn partition(&self, number_of_items: usize) -> Result<Partition, BuildError> {
        Partition::new(number_of_items, self.number_of_workers)
    }

    /// Runs `kernel(rank, range)` on every active worker and publishes the local buffers.
    ///
    /// Workers with an empty range do not run the kernel and publish nothing. The first
    /// error raised by any worker is returned instead of a published set.
    pub fn run<B, E, K>(&self, number_of_items: usize, kernel: K) -> Result<Published<B>, E>
    where
        B: Send,
        E: Send + From<BuildError>,
        K: Fn(usize, Range<usize>) -> Result<B, E> + Sync,
    {
        let partition = self.partition(number_of_items)?;
        let buffers = self.pool.install(|| {
            partition
                .ranges()
                .par_iter()
                .enumerate()
                .map(|(rank, range)| match range.is_empty() {
                    true => Ok(None),
                    false => kernel(rank, range.clone()).map(Some),
                })
                .collect::<Result<Vec<_>, E>>()
        })?;
        Ok(Published { buffers })
    }
}

/// The buffers published by a team after the barrier of [`WorkerTeam::run`].
///
/// Only exists once every worker has finished, so reading it can never observe a partial
/// buffer.
#[derive(Debug)]
pub struct Published<B> {
    buffers: Vec<Option<B>>,
}

impl<B> Published<B> {
    pub fn active_workers(&self) -> usize {
        self.buffers.iter().filter(|buffer| buffer.is_some()).count()
    }

    /// The buffer published by `rank`, `None` for inactive workers
    pub fn local(&self, rank: usize) -> Option<&B> {
        self.buffers.get(rank).and_then(Option::as_ref)
    }
}

impl<D: Dimension> Published<Array<f64, D>> {
    /// Element-wise sum over the buffers of all active workers.
    ///
    /// `shape` fixes the global array shape so the reduction is defined when no worker is
    /// active. Repeated calls return the same result.
    pub fn all_gather_sum<Sh>(&self, shape: Sh) -> Result<Array<f64, D>, BuildError>
    where
        Sh: ShapeBuilder<Dim = D>,
    {
        let mut total = Array::zeros(shape);
        for buffer in self.buffers.iter().flatten() {
            if buffer.shape() != total.shape() {
                return Err(BuildError::Shape(format!(
                    "published buffer of shape {:?} cannot be reduced into {:?}",
                    buffer.shape(),
                    total.shape()
                )));
            }
            total += buffer;
        }
        Ok(total)
    }
}
