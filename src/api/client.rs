//! Purpose: Blocking HTTP client that posts a question and decodes the answer fields.
//! Exports: `AskClient`, `ClientConfig`, `DEFAULT_ENDPOINT`.
//! Role: The request collaborator behind `ask` and `explore`.
//! Invariants: Request body is `{"question": <string>}`; response must be a JSON object.
//! Invariants: Non-success status surfaces as `RequestFailed` carrying status and raw body.
//! Notes: No retries and no cancellation; each call is one request.
#![allow(clippy::result_large_err)]

use crate::core::error::{Error, ErrorKind};
use crate::core::value::{Fields, StructuredValue};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/ask";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub type ApiResult<T> = Result<T, Error>;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Clone)]
pub struct AskClient {
    inner: Arc<AskClientInner>,
}

struct AskClientInner {
    endpoint: Url,
    agent: ureq::Agent,
}

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

impl AskClient {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        if config.timeout.is_zero() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("timeout must be greater than zero")
                .with_hint("Use a positive value like 30s."));
        }
        let endpoint = normalize_endpoint(&config.endpoint)?;
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Ok(Self {
            inner: Arc::new(AskClientInner { endpoint, agent }),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    pub fn ask(&self, question: &str) -> ApiResult<Fields> {
        let payload = serde_json::to_string(&AskRequest { question }).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode request json")
                .with_source(err)
        })?;
        tracing::debug!(endpoint = %self.inner.endpoint, "posting question");

        let response = self
            .inner
            .agent
            .post(self.inner.endpoint.as_str())
            .set("Accept", "application/json")
            .set("Content-Type", "application/json")
            .send_string(&payload);

        match response {
            Ok(resp) => read_fields(resp),
            Err(ureq::Error::Status(code, resp)) => Err(request_failed(code, resp)),
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Io)
                .with_message(format!("request failed: {err}"))
                .with_hint("Is the agent server running? Start one with `agent-explorer serve`.")
                .with_source(err)),
        }
    }
}

fn normalize_endpoint(raw: &str) -> ApiResult<Url> {
    let url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid endpoint url: {raw}"))
            .with_hint("Use a full URL like http://127.0.0.1:8000/ask.")
            .with_source(err)
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::new(ErrorKind::Usage)
            .with_message(format!("unsupported endpoint scheme: {scheme}"))
            .with_hint("Use an http:// or https:// endpoint.")),
    }
}

fn read_fields(response: ureq::Response) -> ApiResult<Fields> {
    let body = response.into_string().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read response body")
            .with_source(err)
    })?;
    decode_fields(&body)
}

fn decode_fields(body: &str) -> ApiResult<Fields> {
    let value: StructuredValue = serde_json::from_str(body).map_err(|err| {
        Error::new(ErrorKind::Decode)
            .with_message("invalid response json")
            .with_body(body)
            .with_source(err)
    })?;
    value.into_mapping().ok_or_else(|| {
        Error::new(ErrorKind::Decode)
            .with_message("response body is not a JSON object")
            .with_body(body)
    })
}

fn request_failed(status: u16, response: ureq::Response) -> Error {
    let body = response.into_string().unwrap_or_default();
    tracing::debug!(status, "endpoint returned non-success status");
    Error::request_failed(status, body)
}

#[cfg(test)]
mod tests {
    use super::{AskClient, ClientConfig, decode_fields, normalize_endpoint};
    use crate::core::error::ErrorKind;
    use std::time::Duration;

    #[test]
    fn default_endpoint_is_local_ask_route() {
        let client = AskClient::new(ClientConfig::default()).expect("client");
        assert_eq!(client.endpoint().as_str(), "http://127.0.0.1:8000/ask");
    }

    #[test]
    fn endpoint_rejects_non_http_schemes() {
        let err = normalize_endpoint("ftp://example.com/ask").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
        let err = normalize_endpoint("not a url").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn zero_timeout_is_usage_error() {
        let config = ClientConfig {
            timeout: Duration::ZERO,
            ..ClientConfig::default()
        };
        let err = AskClient::new(config).err().expect("err");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn decode_keeps_field_order() {
        let fields = decode_fields(r#"{"answer":"42","confidence":0.9}"#).expect("fields");
        let keys: Vec<&str> = fields.keys().collect();
        assert_eq!(keys, ["answer", "confidence"]);
    }

    #[test]
    fn decode_rejects_non_object_bodies() {
        let err = decode_fields("[1,2]").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Decode);
        let err = decode_fields("<html>").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.body(), Some("<html>"));
    }
}
