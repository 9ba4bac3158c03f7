//! GIS map client
//!
//! Talks to the asynchronous GIS map render server: submit a render order,
//! poll until the image is ready, then fetch and decode it.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod services;

pub use error::{ClientError, ErrorCode};
