//! Fetch abstraction over the REST backend
//!
//! The store only needs one operation: send a request, get JSON back. The
//! default backend is [`HttpFetch`](crate::http::HttpFetch) (reqwest); tests
//! use [`MockFetch`](crate::testing::MockFetch).

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as the store issues it. `url` is relative to whatever base the
/// backend is configured with.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
        }
    }

    pub fn patch(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Patch,
            url: url.into(),
            body: Some(body),
        }
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            url: url.into(),
            body: None,
        }
    }
}

/// Where error bodies conventionally carry a human-readable message.
const MESSAGE_PATHS: &[&[&str]] = &[
    &["message"],
    &["data", "message"],
    &["response", "message"],
    &["response", "data", "message"],
    &["error", "message"],
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),
    /// Non-success status; `body` is the parsed JSON body, if any.
    #[error("server responded with status {status}")]
    Status { status: u16, body: Option<Value> },
    /// The response body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl FetchError {
    /// Server-provided message, looked up at the conventional paths.
    pub fn message(&self) -> Option<String> {
        let FetchError::Status {
            body: Some(body), ..
        } = self
        else {
            return None;
        };

        MESSAGE_PATHS.iter().find_map(|path| {
            let value = path
                .iter()
                .try_fold(body, |value, segment| value.get(*segment))?;
            match value {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                _ => None,
            }
        })
    }

    /// Text for an error alert: the server message, or this error's own text.
    pub fn user_message(&self) -> String {
        self.message().unwrap_or_else(|| self.to_string())
    }
}

/// Backend the store sends its requests through.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Send a request and return its decoded JSON body.
    ///
    /// An empty success body decodes to `Value::Null` and a success body
    /// that is not JSON (a plain-text acknowledgement) to a JSON string.
    async fn send(&self, request: FetchRequest) -> Result<Value, FetchError>;
}
