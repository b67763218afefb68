use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    RequestFailed,
    Decode,
    Io,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    status: Option<u16>,
    body: Option<String>,
    path: Option<PathBuf>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            status: None,
            body: None,
            path: None,
            source: None,
        }
    }

    /// A non-success HTTP response. The message embeds the status and the raw
    /// body text so it can be shown to the user verbatim.
    pub fn request_failed(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::new(ErrorKind::RequestFailed)
            .with_message(format!("API {status}: {body}"))
            .with_status(status)
            .with_body(body)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Text suitable for end users: the explicit message, or a generic label
    /// for the kind.
    pub fn display_message(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match self.kind {
            ErrorKind::Internal => "internal error".to_string(),
            ErrorKind::Usage => "usage error".to_string(),
            ErrorKind::RequestFailed => "request failed".to_string(),
            ErrorKind::Decode => "invalid response".to_string(),
            ErrorKind::Io => "i/o error".to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::RequestFailed => 3,
        ErrorKind::Decode => 4,
        ErrorKind::Io => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind, to_exit_code};

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::Internal, 1),
            (ErrorKind::Usage, 2),
            (ErrorKind::RequestFailed, 3),
            (ErrorKind::Decode, 4),
            (ErrorKind::Io, 5),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn request_failed_embeds_status_and_body() {
        let err = Error::request_failed(503, "upstream overloaded");
        assert_eq!(err.kind(), ErrorKind::RequestFailed);
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.body(), Some("upstream overloaded"));
        assert_eq!(err.display_message(), "API 503: upstream overloaded");
    }

    #[test]
    fn display_message_falls_back_to_kind_label() {
        let err = Error::new(ErrorKind::Decode);
        assert_eq!(err.display_message(), "invalid response");
        assert_eq!(err.to_string(), "Decode");
    }
}
