//! reqwest-backed [`Fetch`] implementation

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use serde_json::Value;

use crate::config::HttpConfig;
use crate::fetch::{Fetch, FetchError, FetchRequest, Method};

/// Sends store requests over HTTP with JSON bodies.
#[derive(Clone, Debug)]
pub struct HttpFetch {
    client: reqwest::Client,
    base_url: Option<String>,
    bearer_token: Option<String>,
}

impl HttpFetch {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// Absolute URL for a store route. Absolute routes are used as-is.
    pub fn resolve(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !is_absolute(url) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            ),
            _ => url.to_string(),
        }
    }
}

fn success_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes).unwrap_or_else(|_| {
        let text = String::from_utf8_lossy(bytes).trim().to_string();
        tracing::debug!(body = %text, "Success body is not JSON, keeping it as text");
        Value::String(text)
    })
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[async_trait]
impl Fetch for HttpFetch {
    async fn send(&self, request: FetchRequest) -> Result<Value, FetchError> {
        let url = self.resolve(&request.url);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        tracing::debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(method, &url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url = %url, "Request failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: serde_json::from_slice(&bytes).ok(),
            });
        }

        Ok(success_body(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::DeleteRequest;
    use crate::notify::{self, Notification};
    use crate::record::{Record, RecordId};
    use crate::resource::ResourceKey;
    use crate::store::DynamicStore;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer one connection with a canned HTTP response; returns the base URL.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}")
    }

    fn fetch_for(base: String) -> HttpFetch {
        HttpFetch::new(&HttpConfig::default().with_base_url(base)).unwrap()
    }

    const TEXT_ACK: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK";

    #[test]
    fn test_success_body_decoding() {
        assert_eq!(success_body(b""), Value::Null);
        assert_eq!(success_body(b" \n"), Value::Null);
        assert_eq!(success_body(br#"{"id": 1}"#), json!({"id": 1}));
        assert_eq!(success_body(b"OK\n"), json!("OK"));
    }

    #[tokio::test]
    async fn test_text_acknowledgement_is_success() {
        let fetch = fetch_for(serve_once(TEXT_ACK).await);

        let body = fetch.send(FetchRequest::delete("api/users/1")).await;

        assert_eq!(body, Ok(json!("OK")));
    }

    #[tokio::test]
    async fn test_no_content_is_null() {
        let fetch = fetch_for(
            serve_once("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n").await,
        );

        let body = fetch.send(FetchRequest::delete("api/users/1")).await;

        assert_eq!(body, Ok(Value::Null));
    }

    #[tokio::test]
    async fn test_error_status_keeps_json_body() {
        let fetch = fetch_for(
            serve_once(
                "HTTP/1.1 409 Conflict\r\nContent-Type: application/json\r\nContent-Length: 22\r\nConnection: close\r\n\r\n{\"message\":\"in use\"}  ",
            )
            .await,
        );

        let error = fetch
            .send(FetchRequest::delete("api/users/1"))
            .await
            .unwrap_err();

        assert_eq!(error.user_message(), "in use");
    }

    #[tokio::test]
    async fn test_store_delete_with_text_acknowledgement() {
        let (tx, mut rx) = notify::channel();
        let mut store = DynamicStore::new(fetch_for(serve_once(TEXT_ACK).await), tx);
        let users = ResourceKey::new("users").unwrap();
        store.register_route("api/users").unwrap();
        store.set_items(
            &users,
            vec![Record::from_value(json!({"id": 1})).unwrap()],
        );

        store
            .delete_records(&users, DeleteRequest::one(RecordId::from(1)))
            .unwrap();
        store.settle().await;

        assert!(store.state().items(&users).is_empty());
        assert_eq!(rx.try_recv().unwrap(), Notification::success("Deleted successfully"));
    }

    #[test]
    fn test_resolve_against_base() {
        let fetch =
            HttpFetch::new(&HttpConfig::default().with_base_url("https://api.test/")).unwrap();

        assert_eq!(fetch.resolve("/api/users"), "https://api.test/api/users");
        assert_eq!(fetch.resolve("api/users?page=1"), "https://api.test/api/users?page=1");
        assert_eq!(fetch.resolve("http://other/x"), "http://other/x");
    }

    #[test]
    fn test_resolve_without_base() {
        let fetch = HttpFetch::new(&HttpConfig::default()).unwrap();
        assert_eq!(fetch.resolve("api/users"), "api/users");
    }
}
