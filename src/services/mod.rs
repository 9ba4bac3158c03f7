pub mod cancel;
pub mod decoder;
pub mod map_server;
pub mod poll_client;
pub mod request_client;
pub mod transport;
pub mod wait;

pub use cancel::CancellationToken;
pub use decoder::{decode_image, format_hint};
pub use map_server::{MapServer, HOST_TIMEOUT};
pub use poll_client::{PollClient, PollSession, DEFAULT_POLL_INTERVAL};
pub use request_client::{parse_acknowledgment, RequestClient};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};
pub use wait::{get_within, wait_for_completion, WaitOutcome};
