//! Fixed worker pools that claim work items from a shared atomic cursor.

use std::{
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{GraphletError, Result};

/// Builds a pool with exactly `threads` workers.
pub(crate) fn build_pool(threads: NonZeroUsize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads.get())
        .thread_name(|index| format!("graphlets-worker-{index}"))
        .build()
        .map_err(|err| GraphletError::ThreadPool {
            message: Arc::from(err.to_string()),
        })
}

/// Returns the machine's available parallelism, falling back to one worker.
#[must_use]
pub fn default_threads() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// Hands out indices `0..end` exactly once across all workers.
#[derive(Debug)]
pub(crate) struct WorkCursor {
    next: AtomicUsize,
    end: usize,
}

impl WorkCursor {
    pub(crate) const fn new(end: usize) -> Self {
        Self {
            next: AtomicUsize::new(0),
            end,
        }
    }

    pub(crate) fn claim(&self) -> Option<usize> {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        (index < self.end).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;

    #[test]
    fn cursor_hands_out_each_index_once() {
        let pool = build_pool(NonZeroUsize::new(4).expect("non-zero")).expect("pool must build");
        let cursor = WorkCursor::new(1_000);
        let claimed = pool.broadcast(|_| {
            let mut local = Vec::new();
            while let Some(index) = cursor.claim() {
                local.push(index);
            }
            local
        });
        let flattened: Vec<usize> = claimed.into_iter().flatten().collect();
        let unique: BTreeSet<usize> = flattened.iter().copied().collect();
        assert_eq!(flattened.len(), 1_000);
        assert_eq!(unique.len(), 1_000);
        assert!(cursor.claim().is_none());
    }
}
