//! Cancellable, deadline-bounded async waits.
//!
//! The in-page ancestor of this crate waited on page state by polling in
//! `requestAnimationFrame`/`setTimeout` loops with elapsed-time checks.
//! Here waits are real futures: a deadline via `tokio::time::timeout` and
//! an abort path via `CancellationToken`, so a caller can cancel a stuck
//! wait deterministically.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a wait ended without a value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WaitError {
    /// The deadline elapsed.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// The caller's cancellation token fired.
    #[error("cancelled")]
    Cancelled,
}

/// Drive `fut` to completion unless the deadline elapses or the token
/// fires, whichever comes first.
pub async fn run_cancellable<F, T>(deadline: Duration, cancel: &CancellationToken, fut: F) -> Result<T, WaitError>
where
    F: Future<Output = T>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(WaitError::Cancelled),
        outcome = tokio::time::timeout(deadline, fut) => outcome.map_err(|_| WaitError::TimedOut(deadline)),
    }
}

/// Poll `probe` at `interval` until it yields a value, the deadline
/// elapses, or the token fires.
pub async fn poll_until<F, Fut, T>(
    interval: Duration,
    deadline: Duration,
    cancel: &CancellationToken,
    mut probe: F,
) -> Result<T, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    run_cancellable(deadline, cancel, async {
        loop {
            if let Some(value) = probe().await {
                return value;
            }
            tokio::time::sleep(interval).await;
        }
    })
    .await
}
