//! Bounded wait for an in-flight request.
//!
//! The request future is raced against a deadline timer and the caller's
//! cancellation token. The runtime keeps driving other tasks while this
//! waits, so a single-threaded host stays responsive.

use reqwest::Url;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use super::cancel::CancellationToken;
use super::transport::{Transport, TransportError, TransportResponse};
use crate::error::ClientError;

/// How a bounded wait ended
#[derive(Debug)]
pub enum WaitOutcome<T> {
    /// The request finished (successfully or with a transport error)
    Completed(T),
    /// The bound elapsed while the request was still running
    TimedOut(Duration),
    Cancelled,
}

/// Wait for `request` to finish, at most `timeout` (`None` waits forever).
///
/// Completion wins a tie with the deadline, so a request that finished at
/// the last moment is never reported as timed out.
pub async fn wait_for_completion<F>(
    request: F,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> WaitOutcome<F::Output>
where
    F: Future,
{
    let started = Instant::now();
    let deadline = async {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        biased;
        output = request => WaitOutcome::Completed(output),
        () = cancel.cancelled() => WaitOutcome::Cancelled,
        () = deadline => WaitOutcome::TimedOut(started.elapsed()),
    }
}

/// Perform one GET through `transport`, bounded by `timeout`.
///
/// Transport failures and elapsed bounds become classified client errors.
pub async fn get_within(
    transport: &dyn Transport,
    url: Url,
    headers: &[(&str, &str)],
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> Result<TransportResponse, ClientError> {
    let started = Instant::now();
    match wait_for_completion(transport.get(url, headers), timeout, cancel).await {
        WaitOutcome::Completed(Ok(response)) => Ok(response),
        WaitOutcome::Completed(Err(TransportError::TimedOut(message))) => {
            tracing::debug!(%message, "Transport reported timeout");
            Err(ClientError::Timeout {
                elapsed: started.elapsed(),
            })
        }
        WaitOutcome::Completed(Err(TransportError::Connection(message))) => {
            Err(ClientError::Transport(message))
        }
        WaitOutcome::TimedOut(elapsed) => {
            tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "Request wait bound elapsed");
            Err(ClientError::Timeout { elapsed })
        }
        WaitOutcome::Cancelled => Err(ClientError::Cancelled),
    }
}
