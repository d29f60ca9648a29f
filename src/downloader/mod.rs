//! Core downloader implementation split into focused submodules.
//!
//! The `MediaDownloader` struct and its methods are organized by domain:
//! - [`pagination`] - Resume loop driving the remote message stream in pages
//! - [`batch`] - Per-page concurrent fan-out and cursor reduction
//! - [`task`] - Per-message download state machine

mod batch;
mod pagination;
mod task;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::registry::FailureRegistry;
use crate::types::{Event, MessageId};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct MediaDownloader {
    /// Configuration (wrapped in Arc for sharing across page tasks)
    pub(crate) config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Run-owned registry of permanently failed message ids
    pub(crate) registry: FailureRegistry,
    /// Stop signal, honored at page boundaries only
    pub(crate) stop: tokio_util::sync::CancellationToken,
}

impl MediaDownloader {
    /// Create a new MediaDownloader instance.
    ///
    /// Validates the configuration and ensures the base download directory
    /// exists. No session is opened here; the source is brought up and torn
    /// down by [`run`](Self::run).
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(&config.download_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download_dir.display(),
                        e
                    ),
                ))
            })?;

        // Buffer of 1000 events; slow subscribers see RecvError::Lagged
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        Ok(Self {
            config: Arc::new(config),
            event_tx,
            registry: FailureRegistry::new(),
            stop: tokio_util::sync::CancellationToken::new(),
        })
    }

    /// Subscribe to download events.
    ///
    /// Multiple subscribers are supported. Each subscriber receives all
    /// events independently. Events are buffered, but a subscriber falling
    /// behind by more than 1000 events will receive `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration.
    ///
    /// The configuration is wrapped in an Arc, so this is a cheap clone.
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Ids recorded as permanently failed so far in this instance's runs
    pub fn failed_ids(&self) -> BTreeSet<MessageId> {
        self.registry.snapshot()
    }

    /// Request a graceful stop.
    ///
    /// The run finishes the page currently in flight, skips the rest of the
    /// stream, and returns its report; the resume cursor stays consistent.
    pub fn request_stop(&self) {
        self.stop.cancel();
    }

    /// Emit an event to all subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped,
    /// which is fine - downloads proceed whether or not anyone listens.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
