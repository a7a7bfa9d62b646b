use std::future::Future;

use tokio::sync::Semaphore;

use crate::foundation::error::SteadycamResult;

/// Runs submitted tasks with at most `capacity` of them in flight.
///
/// Admission is first come, first served.
#[derive(Debug)]
pub struct BoundedQueue {
    name: &'static str,
    capacity: usize,
    permits: Semaphore,
}

impl BoundedQueue {
    /// Queue named `name` admitting `capacity` tasks at once (at least one).
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name,
            capacity,
            permits: Semaphore::new(capacity),
        }
    }

    /// Tasks currently running.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    /// Wait for a slot, then run `task` to completion.
    pub async fn submit<T, F>(&self, task: F) -> SteadycamResult<T>
    where
        F: Future<Output = SteadycamResult<T>>,
    {
        let _permit = self.permits.acquire().await.map_err(anyhow::Error::from)?;
        tracing::trace!(queue = self.name, in_flight = self.in_flight(), "task admitted");
        task.await
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/queue.rs"]
mod tests;
