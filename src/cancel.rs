//! Process-wide cancellation from the interrupt signal.

use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Returned by [`cancellable`] when the token fires before the call completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// A token cancelled on the first interrupt (Ctrl+C).
pub fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let handler_token = token.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!(error = %e, "failed to install interrupt handler");
    }
    token
}

/// Races `fut` against `token`; a cancelled token wins.
pub async fn cancellable<F, T, E>(token: &CancellationToken, fut: F) -> anyhow::Result<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<anyhow::Error>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Cancelled.into()),
        result = fut => result.map_err(Into::into),
    }
}

/// Whether `err` is a cancellation AND `token` has itself been cancelled,
/// i.e. the process is shutting down rather than failing.
pub fn is_shutdown(err: &anyhow::Error, token: &CancellationToken) -> bool {
    err.is::<Cancelled>() && token.is_cancelled()
}
