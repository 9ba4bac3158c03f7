use image::DynamicImage;
use std::sync::Arc;
use std::time::Duration;

use super::cancel::CancellationToken;
use super::poll_client::PollClient;
use super::request_client::RequestClient;
use super::transport::{HttpTransport, Transport};
use crate::error::{ClientError, ErrorCode};
use crate::models::{ClientConfig, ImageFormat, OrderHandle, OrderId, PinCode, RenderRequest};

/// Timeout host applications apply to each call
pub const HOST_TIMEOUT: Duration = Duration::from_secs(30);

/// Host-facing entry points: submit a render and collect the result.
///
/// Both halves share one configuration and one cancellation token. Each call
/// is an independent job; nothing is cached between them.
pub struct MapServer {
    config: ClientConfig,
    requests: RequestClient,
    polls: PollClient,
    cancel: CancellationToken,
}

impl MapServer {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new().map_err(|e| ClientError::Transport(e.to_string()))?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        let base_url = config.base_url()?;

        let requests = RequestClient::new(transport.clone(), base_url.clone())
            .with_timeout(config.request_timeout())
            .with_agent(config.agent.clone());
        let polls = PollClient::new(transport, base_url)
            .with_request_timeout(config.request_timeout())
            .with_poll_interval(config.poll_interval());

        Ok(Self {
            config,
            requests,
            polls,
            cancel: CancellationToken::new(),
        })
    }

    /// Token that aborts every in-flight and future call on this facade
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Submit a render job for a host.
    ///
    /// Arguments arrive as the host holds them; non-positive sizes and a
    /// missing format are refused before anything is sent.
    pub async fn request_map(
        &self,
        latitude: f64,
        longitude: f64,
        scale: i32,
        width: i32,
        height: i32,
        format: &str,
    ) -> Result<OrderHandle, ErrorCode> {
        let request = host_request(latitude, longitude, scale, width, height, format)
            .map_err(|e| collapse(e, "Rejected map request arguments"))?;

        self.requests
            .submit(&request, &self.cancel)
            .await
            .map_err(|e| collapse(e, "Map request failed"))
    }

    /// Collect a finished render for a host
    pub async fn get_image(&self, order_id: u64, pin_code: &str) -> Result<DynamicImage, ErrorCode> {
        let pin_code = host_pin_code(pin_code)
            .map_err(|e| collapse(e, "Rejected image request arguments"))?;
        let handle = OrderHandle::new(OrderId::new(order_id), pin_code);

        self.polls
            .fetch_until_ready(handle, self.config.overall_timeout(), &self.cancel)
            .await
            .map_err(|e| collapse(e, "Image request failed"))
    }

    /// Submit `request` and wait for the image, keeping the full error
    pub async fn render(&self, request: &RenderRequest) -> Result<DynamicImage, ClientError> {
        let handle = self.requests.submit(request, &self.cancel).await?;
        self.polls
            .fetch_until_ready(handle, self.config.overall_timeout(), &self.cancel)
            .await
    }
}

fn host_request(
    latitude: f64,
    longitude: f64,
    scale: i32,
    width: i32,
    height: i32,
    format: &str,
) -> Result<RenderRequest, ClientError> {
    let positive = |name: &str, value: i32| {
        u32::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| ClientError::InvalidInput(format!("{name} must be positive, got {value}")))
    };
    let scale = positive("scale", scale)?;
    let width = positive("width", width)?;
    let height = positive("height", height)?;
    let format: ImageFormat = format.parse()?;

    RenderRequest::new(latitude, longitude, scale, width, height, format)
}

/// A bad pin code from a host is a bad argument, not a bad server reply
fn host_pin_code(raw: &str) -> Result<PinCode, ClientError> {
    PinCode::parse(raw).map_err(|e| match e {
        ClientError::Protocol(reason) => ClientError::InvalidInput(reason),
        other => other,
    })
}

fn collapse(error: ClientError, message: &str) -> ErrorCode {
    let code = error.code();
    tracing::warn!(error = %error, code = code.as_i32(), "{message}");
    code
}
