//! Bounded pool running generation calls off the command handler.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use tokio::sync::Semaphore;

use crate::error::{BotError, Result};
use crate::types::Turn;

/// A backend that turns a conversation into a reply.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns `Ok(None)` when the backend produced no usable text.
    async fn generate(&self, turns: &[Turn]) -> Result<Option<String>>;
}

/// Runs generation calls as spawned tasks, at most `size` at a time.
pub struct GenerationPool {
    generator: Arc<dyn Generator>,
    permits: Arc<Semaphore>,
}

impl GenerationPool {
    pub fn new(generator: Arc<dyn Generator>, size: usize) -> Self {
        Self {
            generator,
            permits: Arc::new(Semaphore::new(size.max(1))),
        }
    }

    /// Hand an owned request to a worker and wait for its result.
    ///
    /// # Errors
    ///
    /// Propagates the generator's error, or `Worker` if the task panicked
    /// or the pool was shut down.
    pub async fn submit(&self, request: Vec<Turn>) -> Result<Option<String>> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| BotError::Worker(e.to_string()))?;
        debug!(
            "Dispatching generation with {} turns ({} workers free)",
            request.len(),
            self.permits.available_permits()
        );

        let generator = Arc::clone(&self.generator);
        let task = tokio::spawn(async move {
            let _permit = permit;
            generator.generate(&request).await
        });

        task.await.map_err(|e| BotError::Worker(e.to_string()))?
    }
}
