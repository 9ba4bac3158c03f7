use reqwest::StatusCode;
use std::fmt;

/// Job state vocabulary spoken by the map server through HTTP status codes.
///
/// This is the domain-level view; the transport keeps its own
/// [`StatusCode`]. The two only meet in [`ServiceStatus::from_http`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceStatus {
    /// Image is ready (or the order was accepted)
    Ok,
    /// Render still running, ask again later
    IsProcessing,
    InvalidParameters,
    /// Server gave up waiting on its own scheduler
    Timeout,
    /// Image was already collected with this order id
    Done,
    NoMemory,
    RenderFailed,
    RequestFailed,
}

/// What a client should do after seeing a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Success,
    Retry,
    Terminal,
}

impl ServiceStatus {
    pub const ALL: [Self; 8] = [
        ServiceStatus::Ok,
        ServiceStatus::IsProcessing,
        ServiceStatus::InvalidParameters,
        ServiceStatus::Timeout,
        ServiceStatus::Done,
        ServiceStatus::NoMemory,
        ServiceStatus::RenderFailed,
        ServiceStatus::RequestFailed,
    ];

    /// Map a transport status onto the service vocabulary.
    ///
    /// Returns `None` for codes the service never sends.
    pub fn from_http(status: StatusCode) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.code() == status.as_u16())
    }

    /// Wire status code for this state
    pub fn code(self) -> u16 {
        match self {
            ServiceStatus::Ok => 200,
            ServiceStatus::IsProcessing => 202,
            ServiceStatus::InvalidParameters => 400,
            ServiceStatus::Timeout => 408,
            ServiceStatus::Done => 410,
            ServiceStatus::NoMemory => 418,
            ServiceStatus::RenderFailed => 500,
            ServiceStatus::RequestFailed => 520,
        }
    }

    /// Human readable description, as the server words it
    pub fn message(self) -> &'static str {
        match self {
            ServiceStatus::Ok => "Request is ready",
            ServiceStatus::IsProcessing => "Request is processing",
            ServiceStatus::InvalidParameters => "Request has invalid parameters",
            ServiceStatus::Timeout => "Request status is unknown, timeout error",
            ServiceStatus::Done => "Request has been already obtained",
            ServiceStatus::NoMemory => "Not enough memory on server",
            ServiceStatus::RenderFailed => "Renderer did not finish successfully",
            ServiceStatus::RequestFailed => "Request is failed",
        }
    }

    pub fn disposition(self) -> Disposition {
        match self {
            ServiceStatus::Ok => Disposition::Success,
            ServiceStatus::IsProcessing => Disposition::Retry,
            _ => Disposition::Terminal,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.message())
    }
}
