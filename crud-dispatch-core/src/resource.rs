//! Resource keys and the routes they map to

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::record::RecordId;

/// Canonical name of one CRUD-managed entity type.
///
/// Keys are always PascalCase: `users`, `Users` and `USERS` all normalize to
/// `Users`, and `order-items` / `order_items` / `orderItems` to `OrderItems`.
/// Construction fails when nothing alphanumeric is left to name the resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Normalize a raw key.
    pub fn new(raw: &str) -> Result<Self, StoreError> {
        let normalized = pascal_case(raw);
        if normalized.is_empty() {
            return Err(StoreError::InvalidResourceKey(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    /// Derive a key from the final path segment of a route.
    ///
    /// The query string and trailing slashes are ignored, so
    /// `api/users/?active=1` yields `Users`.
    pub fn from_route(route: &str) -> Result<Self, StoreError> {
        Self::new(last_segment(route))
            .map_err(|_| StoreError::InvalidResourceKey(route.to_string()))
    }

    /// The normalized key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ResourceKey {
    type Error = StoreError;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = StoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(&raw)
    }
}

impl From<ResourceKey> for String {
    fn from(key: ResourceKey) -> Self {
        key.0
    }
}

/// URL path used for the list/create/update/delete calls of one resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(String);

impl Route {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the route already carries a query string.
    pub fn has_query(&self) -> bool {
        self.0.contains('?')
    }

    /// The route without its query string.
    pub fn base(&self) -> &str {
        match self.0.split_once('?') {
            Some((base, _)) => base,
            None => &self.0,
        }
    }

    /// URL for one page of the list, e.g. `api/users?page=2` or
    /// `api/users?active=1&page=2`.
    pub fn list_url(&self, page_param: &str, page: u32) -> String {
        let separator = if self.has_query() { '&' } else { '?' };
        format!("{}{}{}={}", self.0, separator, page_param, page)
    }

    /// URL addressing a single record: query stripped, id percent-encoded.
    pub fn item_url(&self, id: &RecordId) -> String {
        format!(
            "{}/{}",
            self.base().trim_end_matches('/'),
            urlencoding::encode(&id.to_string())
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Route {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for Route {
    fn from(url: String) -> Self {
        Self(url)
    }
}

/// Input accepted by route registration: a bare URL, whose last path segment
/// names the resource, or an explicit key/route pair.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RouteSpec {
    Url(String),
    Keyed { key: String, route: String },
}

impl RouteSpec {
    pub fn keyed(key: impl Into<String>, route: impl Into<String>) -> Self {
        Self::Keyed {
            key: key.into(),
            route: route.into(),
        }
    }

    /// Resolve into the normalized key and the route it registers.
    pub fn resolve(self) -> Result<(ResourceKey, Route), StoreError> {
        match self {
            RouteSpec::Url(url) => Ok((ResourceKey::from_route(&url)?, Route(url))),
            RouteSpec::Keyed { key, route } => Ok((ResourceKey::new(&key)?, Route(route))),
        }
    }
}

impl From<&str> for RouteSpec {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for RouteSpec {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl<K: Into<String>, R: Into<String>> From<(K, R)> for RouteSpec {
    fn from((key, route): (K, R)) -> Self {
        Self::keyed(key, route)
    }
}

fn last_segment(route: &str) -> &str {
    let path = match route.split_once('?') {
        Some((path, _)) => path,
        None => route,
    };
    let path = path.trim_end_matches('/');
    match path.rsplit_once('/') {
        Some((_, segment)) => segment,
        None => path,
    }
}

/// Split an identifier into words on separators and case boundaries.
fn words(raw: &str) -> Vec<String> {
    let chars: Vec<char> = raw.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        // `current` non-empty means chars[i - 1] was alphanumeric
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn pascal_case(raw: &str) -> String {
    words(raw)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalization() {
        assert_eq!(ResourceKey::new("users").unwrap().as_str(), "Users");
        assert_eq!(ResourceKey::new("Users").unwrap().as_str(), "Users");
        assert_eq!(ResourceKey::new("USERS").unwrap().as_str(), "Users");
        assert_eq!(ResourceKey::new("order-items").unwrap().as_str(), "OrderItems");
        assert_eq!(ResourceKey::new("order_items").unwrap().as_str(), "OrderItems");
        assert_eq!(ResourceKey::new("orderItems").unwrap().as_str(), "OrderItems");
        assert_eq!(ResourceKey::new("HTMLPages").unwrap().as_str(), "HtmlPages");
    }

    #[test]
    fn test_key_rejects_empty() {
        assert_eq!(
            ResourceKey::new("--"),
            Err(StoreError::InvalidResourceKey("--".into()))
        );
        assert!(ResourceKey::from_route("api/").is_ok());
        assert!(ResourceKey::from_route("/").is_err());
    }

    #[test]
    fn test_key_from_route() {
        assert_eq!(ResourceKey::from_route("api/users").unwrap().as_str(), "Users");
        assert_eq!(ResourceKey::from_route("/api/v1/orders/").unwrap().as_str(), "Orders");
        assert_eq!(
            ResourceKey::from_route("api/users?active=1").unwrap().as_str(),
            "Users"
        );
        assert_eq!(ResourceKey::from_route("roles").unwrap().as_str(), "Roles");
    }

    #[test]
    fn test_key_deserialize_normalizes() {
        let key: ResourceKey = serde_json::from_str("\"user-roles\"").unwrap();
        assert_eq!(key.as_str(), "UserRoles");
        assert!(serde_json::from_str::<ResourceKey>("\"\"").is_err());
    }

    #[test]
    fn test_list_url_separator() {
        let plain = Route::new("api/users");
        assert_eq!(plain.list_url("page", 2), "api/users?page=2");

        let with_query = Route::new("api/users?active=1");
        assert_eq!(with_query.list_url("page", 2), "api/users?active=1&page=2");
    }

    #[test]
    fn test_item_url_strips_query() {
        let route = Route::new("api/users/?active=1");
        assert_eq!(route.item_url(&RecordId::from(7)), "api/users/7");
        assert_eq!(route.item_url(&RecordId::from("a b")), "api/users/a%20b");
    }

    #[test]
    fn test_route_spec_resolve() {
        let (key, route) = RouteSpec::from("api/users").resolve().unwrap();
        assert_eq!(key.as_str(), "Users");
        assert_eq!(route.as_str(), "api/users");

        let (key, route) = RouteSpec::from(("staff", "api/users?role=staff"))
            .resolve()
            .unwrap();
        assert_eq!(key.as_str(), "Staff");
        assert_eq!(route.as_str(), "api/users?role=staff");
    }

    #[test]
    fn test_route_spec_deserialize() {
        let spec: RouteSpec = serde_json::from_str(r#""api/users""#).unwrap();
        assert_eq!(spec, RouteSpec::Url("api/users".into()));

        let spec: RouteSpec =
            serde_json::from_str(r#"{"key": "staff", "route": "api/users"}"#).unwrap();
        assert_eq!(spec, RouteSpec::keyed("staff", "api/users"));
    }
}
