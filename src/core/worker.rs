//! Worker pool for entry construction.
//!
//! Building an entry (stat, link and mount resolution, rendering) is independent per entry, so a
//! batch is fanned out over scoped worker threads. Jobs go out over a crossbeam job channel
//! tagged with their index and results come back over a response channel. Results are placed by
//! index, so the output order never depends on scheduling.
//!
//! Workers borrow the batch context directly; the scope joins every worker before returning, so
//! nothing outlives the batch.

use crossbeam_channel::unbounded;

use std::num::NonZeroUsize;
use std::thread;

/// Upper bound on worker threads, whatever the machine reports.
const MAX_WORKERS: usize = 16;

/// A fixed-size pool description. Threads are spawned per batch and joined before it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    threads: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        let threads = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        WorkerPool::new(threads.min(MAX_WORKERS))
    }
}

impl WorkerPool {
    pub fn new(threads: usize) -> Self {
        WorkerPool {
            threads: threads.max(1),
        }
    }

    /// Applies `work` to every job and returns the results in job order.
    ///
    /// Small batches, or a single-thread pool, run inline on the calling thread.
    pub fn map<T, R, F>(&self, jobs: Vec<T>, work: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        let total = jobs.len();
        let threads = self.threads.min(total);

        if threads <= 1 {
            return jobs.into_iter().map(work).collect();
        }

        let (job_tx, job_rx) = unbounded::<(usize, T)>();
        let (res_tx, res_rx) = unbounded::<(usize, R)>();

        for job in jobs.into_iter().enumerate() {
            // The receiver is still held here, so the send cannot fail.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        thread::scope(|scope| {
            for _ in 0..threads {
                let job_rx = job_rx.clone();
                let res_tx = res_tx.clone();
                let work = &work;

                scope.spawn(move || {
                    for (index, job) in job_rx.iter() {
                        if res_tx.send((index, work(job))).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(res_tx);

        let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();
        for (index, result) in res_rx.iter() {
            slots[index] = Some(result);
        }
        slots.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    #[test]
    fn results_keep_job_order() {
        let pool = WorkerPool::new(4);
        let jobs: Vec<u64> = (0..64).collect();

        let results = pool.map(jobs, |n| {
            // Earlier jobs finish later.
            thread::sleep(Duration::from_micros(64 - n));
            n * 2
        });

        assert_eq!(results, (0..64).map(|n| n * 2).collect::<Vec<_>>());
    }

    #[test]
    fn empty_and_single_batches() {
        let pool = WorkerPool::new(8);
        assert!(pool.map(Vec::<u8>::new(), |n| n).is_empty());
        assert_eq!(pool.map(vec![7], |n| n + 1), vec![8]);
    }

    #[test]
    fn workers_borrow_shared_state() {
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let pool = WorkerPool::new(3);
        let lengths = pool.map(vec![0usize, 1, 2], |i| names[i].len());
        assert_eq!(lengths, vec![1, 1, 1]);
        assert_eq!(WorkerPool::new(0), WorkerPool::new(1));
    }
}
