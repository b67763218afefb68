//! Purpose: Public client surface for talking to an answer endpoint.
//! Exports: `AskClient`, `ClientConfig`, error types, and `to_exit_code`.
//! Role: Stable boundary used by the CLI and integration tests.
pub mod client;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use client::{ApiResult, AskClient, ClientConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
