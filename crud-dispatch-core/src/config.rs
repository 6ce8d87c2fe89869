//! Store and HTTP backend configuration
//!
//! Both structs deserialize with every field optional, so hosts can load
//! partial settings from whatever source they already use.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Alert texts for successful mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub created: String,
    pub updated: String,
    pub deleted: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            created: "Created successfully".into(),
            updated: "Updated successfully".into(),
            deleted: "Deleted successfully".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Query parameter carrying the page number on list calls.
    pub page_param: String,
    pub messages: Messages,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_param: "page".into(),
            messages: Messages::default(),
        }
    }
}

impl StoreConfig {
    pub fn with_page_param(mut self, name: impl Into<String>) -> Self {
        self.page_param = name.into();
        self
    }

    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Prefix for relative routes, e.g. `https://api.example.com/`.
    pub base_url: Option<String>,
    /// Sent as `Authorization: Bearer <token>`.
    pub bearer_token: Option<String>,
    /// Whole-request timeout; none by default.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            bearer_token: None,
            timeout_secs: None,
            user_agent: concat!("crud-dispatch/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl HttpConfig {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs().max(1));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_store_config() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"messages": {"created": "ثبت شد"}}"#).unwrap();
        assert_eq!(config.page_param, "page");
        assert_eq!(config.messages.created, "ثبت شد");
        assert_eq!(config.messages.deleted, "Deleted successfully");
    }

    #[test]
    fn test_http_config_timeout() {
        let config = HttpConfig::default().with_timeout(Duration::from_millis(1500));
        assert_eq!(config.timeout(), Some(Duration::from_secs(1)));
        assert_eq!(HttpConfig::default().timeout(), None);
    }
}
