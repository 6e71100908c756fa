//! Run tasks in bounded batches.
//!
//! This module uses [`tokio::task::JoinSet`] under the hood.

use std::future::Future;

use thiserror::Error;
use tokio::task::{JoinError, JoinSet};

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum BatchError<E>
where
    E: std::error::Error + 'static,
{
    /// A task returned an error.
    #[error(transparent)]
    Task(E),
    /// A task panicked.
    #[error("task panicked")]
    Join(#[source] JoinError),
}

/// A bounded set of concurrent tasks.
///
/// Tasks are spawned as soon as they are pushed. Once the batch is full, the
/// caller awaits every task with [`TaskBatch::flush`] before pushing more, so
/// that at most `capacity` tasks are in flight at any time.
pub struct TaskBatch<T, E> {
    /// Running tasks.
    tasks: JoinSet<Result<T, E>>,

    /// Maximum number of running tasks.
    capacity: usize,
}

impl<T, E> TaskBatch<T, E>
where
    T: Send + 'static,
    E: std::error::Error + Send + 'static,
{
    /// Create an empty batch of at most `capacity` tasks.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);

        Self {
            tasks: JoinSet::new(),
            capacity,
        }
    }

    /// Spawn a task in the batch.
    pub fn push<F>(&mut self, task: F)
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        debug_assert!(!self.is_full());

        self.tasks.spawn(task);
    }

    /// Number of running tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Return `true` if no task is running.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Return `true` if the batch must be flushed before pushing more tasks.
    pub fn is_full(&self) -> bool {
        self.tasks.len() >= self.capacity
    }

    /// Wait for all tasks of the batch to complete.
    ///
    /// Results are returned in completion order. If any task fails, the other
    /// tasks still run to completion and the first error is returned. The
    /// batch is empty afterwards.
    pub async fn flush(&mut self) -> Result<Vec<T>, BatchError<E>> {
        let mut outputs = Vec::with_capacity(self.tasks.len());
        let mut first_error = None;

        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(Ok(output)) => outputs.push(output),
                Ok(Err(error)) => {
                    first_error.get_or_insert(BatchError::Task(error));
                },
                Err(error) => {
                    first_error.get_or_insert(BatchError::Join(error));
                },
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(outputs),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    use super::{BatchError, TaskBatch};

    #[derive(Debug, thiserror::Error)]
    #[error("task {0} failed")]
    struct TestError(usize);

    #[tokio::test]
    async fn flush_all() {
        let mut batch = TaskBatch::<usize, TestError>::new(3);

        for i in 0..3 {
            batch.push(async move { Ok(i) });
        }

        assert!(batch.is_full());

        let mut result = batch.flush().await.unwrap();
        result.sort();

        assert_eq!(result, vec![0, 1, 2]);
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn bounded_concurrency() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut batch = TaskBatch::<(), TestError>::new(4);

        for _ in 0..10 {
            if batch.is_full() {
                batch.flush().await.unwrap();
            }

            let (running, peak) = (running.clone(), peak.clone());

            batch.push(async move {
                let current = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(current, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            });
        }

        batch.flush().await.unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn wait_for_others_on_error() {
        let completed = Arc::new(AtomicUsize::new(0));
        let mut batch = TaskBatch::<(), TestError>::new(3);

        batch.push(async { Err(TestError(0)) });

        for _ in 1..3 {
            let completed = completed.clone();
            batch.push(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                completed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        let result = batch.flush().await;

        assert!(matches!(result, Err(BatchError::Task(TestError(0)))));
        assert_eq!(completed.load(Ordering::SeqCst), 2);
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn panic() {
        let mut batch = TaskBatch::<(), TestError>::new(1);

        batch.push(async {
            if true {
                panic!("boom");
            }
            Ok(())
        });

        assert!(matches!(batch.flush().await, Err(BatchError::Join(_))));
    }
}
