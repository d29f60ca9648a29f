//! # telegram-media-dl
//!
//! Resumable batch downloader library for Telegram chat media.
//!
//! ## Design Philosophy
//!
//! telegram-media-dl is designed to be:
//! - **Resumable** - progress is a single message-id cursor, advanced only
//!   after every message in a page reached a terminal outcome
//! - **Failure-tolerant** - per-message failures are classified, retried
//!   where that can help, and otherwise recorded for a later retry pass; a
//!   run always completes
//! - **Library-first** - no CLI or UI, purely a Rust crate for embedding;
//!   the Telegram transport itself lives behind the [`MessageSource`] trait
//! - **Event-driven** - consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use telegram_media_dl::{Config, MediaDownloader, MessageSource};
//!
//! # async fn example(source: impl MessageSource) -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     chat_id: "my_channel".to_string(),
//!     ..Default::default()
//! };
//! let downloader = MediaDownloader::new(config).await?;
//!
//! // Subscribe to events
//! let mut events = downloader.subscribe();
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         println!("Event: {:?}", event);
//!     }
//! });
//!
//! // Drive a full pass over the chat with your MessageSource implementation,
//! // then fold the outcome back into the config you persist
//! let report = downloader.run(&source).await?;
//! let mut updated = downloader.get_config().as_ref().clone();
//! updated.apply_report(&report);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Filesystem collision handling and duplicate reconciliation
pub mod dedup;
/// Core downloader implementation (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Format admission filtering
pub mod filter;
/// Attachment naming rules
pub mod naming;
/// Run-owned failure registry
pub mod registry;
/// Failure classification for retries
pub mod retry;
/// Message Source capability trait
pub mod source;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, RetryConfig};
pub use downloader::MediaDownloader;
pub use error::{Error, Result, SourceError};
pub use registry::FailureRegistry;
pub use retry::{ClassifyFailure, FailureKind};
pub use source::{MessageSource, SourceResult};
pub use types::{Event, Media, MediaKind, Message, MessageId, RunReport};

/// Helper function to run the downloader with graceful signal handling.
///
/// Races the run against a termination signal; on a signal the downloader is
/// asked to stop, it finishes the page in flight, and the partial run's
/// report is still returned so the cursor is not lost.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use telegram_media_dl::{Config, MediaDownloader, MessageSource, run_with_shutdown};
///
/// # async fn example(source: impl MessageSource) -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config {
///     chat_id: "my_channel".to_string(),
///     ..Default::default()
/// };
/// let downloader = MediaDownloader::new(config).await?;
///
/// // Run with automatic signal handling
/// let report = run_with_shutdown(&downloader, &source).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_with_shutdown(
    downloader: &MediaDownloader,
    source: &dyn MessageSource,
) -> Result<RunReport> {
    let run = downloader.run(source);
    tokio::pin!(run);

    tokio::select! {
        report = &mut run => report,
        _ = wait_for_signal() => {
            downloader.request_stop();
            run.await
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
