use std::time::Duration;
use thiserror::Error;

use crate::models::ServiceStatus;

/// Characters of a rejected response body kept in the error detail
const BODY_PREVIEW_CHAR_LIMIT: usize = 160;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timed out after {} ms", .elapsed.as_millis())]
    Timeout { elapsed: Duration },

    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Service responded {status}: {detail}")]
    Rejected {
        status: ServiceStatus,
        detail: String,
    },

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Cancelled")]
    Cancelled,
}

impl ClientError {
    /// Build a rejection from a non-success status and the response body.
    pub fn rejected(status: ServiceStatus, body: &[u8]) -> Self {
        let preview = body_preview(body);
        let detail = if preview.is_empty() {
            "empty response body".to_string()
        } else {
            preview
        };
        ClientError::Rejected { status, detail }
    }

    /// The service reported the image as already collected (410)
    pub fn is_already_collected(&self) -> bool {
        matches!(
            self,
            ClientError::Rejected {
                status: ServiceStatus::Done,
                ..
            }
        )
    }

    /// Collapse into the code a host application receives
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::InvalidInput(_) => ErrorCode::InvalidArguments,
            ClientError::Timeout { .. } => ErrorCode::TimedOut,
            _ => ErrorCode::RequestFailed,
        }
    }
}

/// Small integer error codes handed to host applications.
///
/// Values match the errno numbers hosts already switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    InvalidArguments = 22,
    RequestFailed = 14,
    TimedOut = 110,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<&ClientError> for ErrorCode {
    fn from(e: &ClientError) -> Self {
        e.code()
    }
}

fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(BODY_PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > BODY_PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
