//! Render order submission.
//!
//! One GET against the server root with the render parameters; the server
//! answers synchronously with `orderId=<n>, pincode=<pin>`.

use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

use super::cancel::CancellationToken;
use super::transport::Transport;
use super::wait::get_within;
use crate::error::ClientError;
use crate::models::{OrderHandle, OrderId, PinCode, RenderRequest, ServiceStatus};

const ORDER_ID_TAG: &str = "orderId=";
const PIN_CODE_TAG: &str = "pincode=";

/// Submits render requests and parses the acknowledgment
pub struct RequestClient {
    transport: Arc<dyn Transport>,
    base_url: Url,
    timeout: Option<Duration>,
    agent: String,
}

impl RequestClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: Url) -> Self {
        Self {
            transport,
            base_url,
            timeout: None,
            agent: "gis".to_string(),
        }
    }

    /// Bound the round trip (`None` waits for the server indefinitely)
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    /// Submit one render request. Exactly one HTTP round trip, no retry.
    pub async fn submit(
        &self,
        request: &RenderRequest,
        cancel: &CancellationToken,
    ) -> Result<OrderHandle, ClientError> {
        let url = submit_url(&self.base_url, request);
        tracing::debug!(%url, "Submitting render request");

        let response = get_within(
            self.transport.as_ref(),
            url,
            &[("agent", self.agent.as_str())],
            self.timeout,
            cancel,
        )
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Render request failed"))?;

        let status = ServiceStatus::from_http(response.status).ok_or_else(|| {
            ClientError::Protocol(format!(
                "unexpected status code {}",
                response.status.as_u16()
            ))
        })?;
        if status != ServiceStatus::Ok {
            let error = ClientError::rejected(status, &response.body);
            tracing::warn!(status = status.code(), error = %error, "Render request rejected");
            return Err(error);
        }

        let body = std::str::from_utf8(&response.body).map_err(|_| {
            ClientError::Protocol("acknowledgment is not valid UTF-8".to_string())
        })?;
        let handle = parse_acknowledgment(body)
            .inspect_err(|e| tracing::warn!(error = %e, "Malformed acknowledgment"))?;

        tracing::info!(order_id = %handle.order_id(), "Render request accepted");
        Ok(handle)
    }
}

/// Ensure the base URL addresses the server root with a trailing slash
pub(crate) fn endpoint(base_url: &Url) -> Url {
    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn submit_url(base_url: &Url, request: &RenderRequest) -> Url {
    let mut url = endpoint(base_url);
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in request.query_pairs() {
            query.append_pair(key, &value);
        }
    }
    url
}

/// Parse `orderId=<n>, pincode=<pin>` into an order handle.
pub fn parse_acknowledgment(body: &str) -> Result<OrderHandle, ClientError> {
    let mut fields = body.split(',').map(str::trim);

    let order_field = fields.next().unwrap_or_default();
    let order_text = order_field.strip_prefix(ORDER_ID_TAG).ok_or_else(|| {
        ClientError::Protocol(format!("acknowledgment lacks {ORDER_ID_TAG} tag"))
    })?;
    let order_id = order_text.trim().parse::<u64>().map_err(|_| {
        ClientError::Protocol(format!("order id is not a non-negative integer: {order_text}"))
    })?;

    let pin_field = fields.next().ok_or_else(|| {
        ClientError::Protocol("acknowledgment lacks pin code field".to_string())
    })?;
    let pin_text = pin_field.strip_prefix(PIN_CODE_TAG).ok_or_else(|| {
        ClientError::Protocol(format!("acknowledgment lacks {PIN_CODE_TAG} tag"))
    })?;
    let pin_code = PinCode::parse(pin_text)?;

    Ok(OrderHandle::new(OrderId::new(order_id), pin_code))
}
