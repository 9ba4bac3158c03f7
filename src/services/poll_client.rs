//! Polling for a finished render.
//!
//! The server answers 202 while the render is running, 200 with the image
//! bytes once it is done, and 410 after the image has been collected. A poll
//! session keeps asking, no more often than the poll interval, until it
//! sees a terminal answer or its deadline passes.

use image::DynamicImage;
use reqwest::Url;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::cancel::CancellationToken;
use super::decoder::decode_image_blocking;
use super::request_client::endpoint;
use super::transport::Transport;
use super::wait::{get_within, wait_for_completion, WaitOutcome};
use crate::error::ClientError;
use crate::models::{Disposition, OrderHandle, ServiceStatus};

/// Default minimum spacing between fetch attempts
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Timing state of one `fetch_until_ready` call
#[derive(Debug)]
pub struct PollSession {
    started: Instant,
    last_attempt: Option<Instant>,
    deadline: Option<Instant>,
    attempts: u32,
}

impl PollSession {
    /// Start the clock. `None` means no overall deadline.
    pub fn start(overall_timeout: Option<Duration>) -> Self {
        let started = Instant::now();
        Self {
            started,
            last_attempt: None,
            deadline: overall_timeout.map(|timeout| started + timeout),
            attempts: 0,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline (`None` if unbounded)
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn record_attempt(&mut self) {
        self.last_attempt = Some(Instant::now());
        self.attempts += 1;
    }

    /// Earliest start of the next attempt, clamped to the deadline
    fn next_wake(&self, interval: Duration) -> Instant {
        let next = self.last_attempt.unwrap_or(self.started) + interval;
        match self.deadline {
            Some(deadline) => next.min(deadline),
            None => next,
        }
    }

    /// Bound for one attempt: the request timeout, cut short by the deadline
    fn attempt_bound(&self, request_timeout: Option<Duration>) -> Option<Duration> {
        match (request_timeout, self.remaining()) {
            (Some(timeout), Some(remaining)) => Some(timeout.min(remaining)),
            (timeout, remaining) => timeout.or(remaining),
        }
    }

    fn timeout_error(&self) -> ClientError {
        ClientError::Timeout {
            elapsed: self.elapsed(),
        }
    }
}

enum AttemptOutcome {
    Pending,
    Ready(DynamicImage),
}

/// Fetches a finished render, polling while the server is still working
pub struct PollClient {
    transport: Arc<dyn Transport>,
    base_url: Url,
    request_timeout: Option<Duration>,
    poll_interval: Duration,
}

impl PollClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: Url) -> Self {
        Self {
            transport,
            base_url,
            request_timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Bound on each individual fetch round trip
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Poll until the image is ready, a terminal status arrives, or
    /// `overall_timeout` passes.
    ///
    /// Consumes the handle: whatever the outcome, the server will not hand
    /// out the same image twice.
    pub async fn fetch_until_ready(
        &self,
        handle: OrderHandle,
        overall_timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<DynamicImage, ClientError> {
        let mut session = PollSession::start(overall_timeout);
        let order_id = handle.order_id();
        tracing::debug!(%order_id, "Polling for rendered map");

        loop {
            if session.is_expired() {
                let error = session.timeout_error();
                tracing::warn!(
                    %order_id,
                    attempts = session.attempts(),
                    elapsed_ms = session.elapsed().as_millis() as u64,
                    "Gave up waiting for rendered map"
                );
                return Err(error);
            }

            session.record_attempt();
            match self.attempt(&handle, &session, cancel).await {
                Ok(AttemptOutcome::Ready(image)) => {
                    tracing::info!(
                        %order_id,
                        attempts = session.attempts(),
                        width = image.width(),
                        height = image.height(),
                        "Rendered map fetched"
                    );
                    return Ok(image);
                }
                Ok(AttemptOutcome::Pending) => {
                    tracing::trace!(%order_id, attempts = session.attempts(), "Render still processing");
                }
                Err(ClientError::Timeout { .. }) if session.is_expired() => {
                    tracing::warn!(%order_id, attempts = session.attempts(), "Deadline passed mid-attempt");
                    return Err(session.timeout_error());
                }
                // Only the session deadline is reported as Timeout
                Err(ClientError::Timeout { elapsed }) => {
                    let error = ClientError::Transport(format!(
                        "fetch attempt timed out after {} ms",
                        elapsed.as_millis()
                    ));
                    tracing::warn!(%order_id, error = %error, "Fetching rendered map failed");
                    return Err(error);
                }
                Err(error) => {
                    tracing::warn!(%order_id, error = %error, "Fetching rendered map failed");
                    return Err(error);
                }
            }

            tokio::select! {
                () = tokio::time::sleep_until(session.next_wake(self.poll_interval)) => {}
                () = cancel.cancelled() => return Err(ClientError::Cancelled),
            }
        }
    }

    async fn attempt(
        &self,
        handle: &OrderHandle,
        session: &PollSession,
        cancel: &CancellationToken,
    ) -> Result<AttemptOutcome, ClientError> {
        let url = fetch_url(&self.base_url, handle);
        let bound = session.attempt_bound(self.request_timeout);
        let response = get_within(self.transport.as_ref(), url, &[], bound, cancel).await?;

        let status = ServiceStatus::from_http(response.status).ok_or_else(|| {
            ClientError::Protocol(format!(
                "unexpected status code {}",
                response.status.as_u16()
            ))
        })?;

        match status.disposition() {
            Disposition::Retry => Ok(AttemptOutcome::Pending),
            Disposition::Terminal => Err(ClientError::rejected(status, &response.body)),
            Disposition::Success => {
                let decode = decode_image_blocking(response.content_type, response.body);
                let image = decode_within(decode, session, cancel).await?;
                Ok(AttemptOutcome::Ready(image))
            }
        }
    }
}

/// Decoding counts against the session deadline and stops on cancel
async fn decode_within<F>(
    decode: F,
    session: &PollSession,
    cancel: &CancellationToken,
) -> Result<DynamicImage, ClientError>
where
    F: Future<Output = Result<DynamicImage, ClientError>>,
{
    match wait_for_completion(decode, session.remaining(), cancel).await {
        WaitOutcome::Completed(result) => result,
        WaitOutcome::TimedOut(_) => Err(session.timeout_error()),
        WaitOutcome::Cancelled => Err(ClientError::Cancelled),
    }
}

fn fetch_url(base_url: &Url, handle: &OrderHandle) -> Url {
    let mut url = endpoint(base_url);
    url.query_pairs_mut()
        .append_pair("orderId", &handle.order_id().to_string())
        .append_pair("pincode", handle.pin_code().as_str());
    url
}
