pub mod config;
pub mod order;
pub mod render_request;
pub mod status;

pub use config::{ClientConfig, JobConfig};
pub use order::{OrderHandle, OrderId, PinCode, MAX_PIN_CODE_LEN};
pub use render_request::{ImageFormat, RenderRequest};
pub use status::{Disposition, ServiceStatus};
