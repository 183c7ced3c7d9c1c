//! Fleet-wide fan-out of device tasks.

use std::collections::HashMap;
use std::sync::Arc;

use log::{error, info};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::RunConfig;
use crate::error::Result;
use crate::output::OutputWriter;
use crate::session::SessionConnector;
use crate::task::{DeviceTask, TaskResult};

/// Runs one [`DeviceTask`] per address concurrently.
///
/// At most `max_concurrency` devices are worked on at once. One device's
/// failure never cancels or blocks the others.
pub struct Orchestrator<C> {
    task: Arc<DeviceTask<C>>,
    max_concurrency: usize,
}

impl<C> Orchestrator<C>
where
    C: SessionConnector + 'static,
{
    pub fn new(task: DeviceTask<C>) -> Self {
        Self {
            task: Arc::new(task),
            max_concurrency: RunConfig::DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Limit how many devices are in flight at once (at least one).
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.clamp(1, Semaphore::MAX_PERMITS);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Deploy to every address and wait for all of them.
    ///
    /// Returns exactly one result per address, in completion order.
    pub async fn run_all(&self, addresses: &[String]) -> Vec<TaskResult> {
        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        let mut in_flight = HashMap::with_capacity(addresses.len());

        for address in addresses {
            let task = Arc::clone(&self.task);
            let permits = Arc::clone(&permits);
            let target = address.clone();

            let handle = tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                task.run(&target).await
            });
            in_flight.insert(handle.id(), address.clone());
        }

        let mut results = Vec::with_capacity(addresses.len());

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, result)) => {
                    in_flight.remove(&id);
                    results.push(result);
                }
                Err(e) => {
                    let address = in_flight.remove(&e.id()).unwrap_or_default();
                    error!("Unable to login to device {address}: task aborted: {e}");
                    results.push(TaskResult::failed(address));
                }
            }
        }

        let deployed = results.iter().filter(|r| r.deployed).count();
        info!("{deployed} of {} devices deployed", results.len());

        results
    }

    /// Deploy to every address, then write each transcript.
    ///
    /// Writes happen one after another once all devices are done, so two
    /// results that map to the same log file append rather than race.
    pub async fn deploy(
        &self,
        addresses: &[String],
        writer: &OutputWriter,
    ) -> Result<Vec<TaskResult>> {
        let results = self.run_all(addresses).await;

        for result in &results {
            writer.write(result).await?;
        }

        Ok(results)
    }
}
