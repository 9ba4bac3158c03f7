//! Mock map render server.

use std::time::Duration;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use super::fixtures;

/// Wrapper around wiremock MockServer speaking the render server protocol
pub struct MockMapServer {
    pub server: MockServer,
}

impl MockMapServer {
    /// Start a new mock map server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the base URL of the mock server
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Accept exactly one submit and answer with an acknowledgment
    pub async fn mock_submit_ack(&self, order_id: u64, pin_code: &str) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("format", "png"))
            .and(header("agent", "gis"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(fixtures::ack_body(order_id, pin_code))
                    .insert_header("content-type", "text/plain"),
            )
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Answer every submit with a bare status and body
    pub async fn mock_submit_status(&self, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("format", "png"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Answer submits only after `delay`
    pub async fn mock_submit_delayed(&self, delay: Duration) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("format", "png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(fixtures::ack_body(1, "LATE01"))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Answer fetches for the order with a bare status
    pub async fn mock_fetch_status(&self, order_id: u64, pin_code: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("orderId", order_id.to_string()))
            .and(query_param("pincode", pin_code))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Answer the first `times` fetches with 202, ahead of any other fetch mock
    pub async fn mock_fetch_processing(&self, order_id: u64, times: u64) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("orderId", order_id.to_string()))
            .respond_with(ResponseTemplate::new(202))
            .up_to_n_times(times)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Answer fetches for the order with image bytes
    pub async fn mock_fetch_image(&self, order_id: u64, content_type: &str, bytes: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("orderId", order_id.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(bytes)
                    .insert_header("content-type", content_type),
            )
            .mount(&self.server)
            .await;
    }

    /// Number of requests carrying an `orderId` parameter
    pub async fn fetch_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.query_pairs().any(|(key, _)| key == "orderId"))
            .count()
    }
}
