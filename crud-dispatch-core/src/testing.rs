//! Test utilities for crud-dispatch stores
//!
//! - [`MockFetch`]: scripted [`Fetch`] backend that records every request
//! - [`NotificationProbe`]: collects the notifications a store publishes
//! - Assertion macros for applied actions and notifications
//!
//! # Example
//!
//! ```ignore
//! use crud_dispatch_core::testing::{MockFetch, MockReply, NotificationProbe};
//!
//! let fetch = MockFetch::new()
//!     .on(Method::Post, "api/users", MockReply::ok(json!({"id": 1})));
//! let probe = NotificationProbe::new();
//! let mut store = DynamicStore::new(fetch.clone(), probe.sender());
//!
//! store.register_route("api/users")?;
//! store.main()?.create(Record::new())?;
//! let applied = store.settle().await;
//!
//! assert_emitted!(applied, StoreAction::RecordDidCreate { .. });
//! assert_emitted!(probe.drain(), Notification::DialogForm(false));
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::fetch::{Fetch, FetchError, FetchRequest, Method};
use crate::notify::{Notification, NotificationSender, Notifier};

/// One scripted response.
#[derive(Clone, Debug)]
pub struct MockReply {
    result: Result<Value, FetchError>,
    delay: Option<Duration>,
}

impl MockReply {
    pub fn ok(body: Value) -> Self {
        Self {
            result: Ok(body),
            delay: None,
        }
    }

    pub fn err(error: FetchError) -> Self {
        Self {
            result: Err(error),
            delay: None,
        }
    }

    /// Non-success status with a JSON body.
    pub fn status(status: u16, body: Value) -> Self {
        Self::err(FetchError::Status {
            status,
            body: Some(body),
        })
    }

    /// Wait `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

struct Script {
    method: Method,
    url: String,
    replies: VecDeque<MockReply>,
}

#[derive(Default)]
struct MockInner {
    scripts: Vec<Script>,
    calls: Vec<FetchRequest>,
}

impl MockInner {
    /// Replies for a request are used in order; the last one repeats.
    fn next_reply(&mut self, method: Method, url: &str) -> Option<MockReply> {
        let script = self
            .scripts
            .iter_mut()
            .find(|s| s.method == method && s.url == url)?;
        if script.replies.len() > 1 {
            script.replies.pop_front()
        } else {
            script.replies.front().cloned()
        }
    }
}

/// Scripted fetch backend.
///
/// Clones share their script and call log, so keep one clone for
/// assertions and hand another to the store. Requests nobody scripted get a
/// 404 with a message body.
#[derive(Clone, Default)]
pub struct MockFetch {
    inner: Arc<Mutex<MockInner>>,
}

impl MockFetch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a reply for `method url`. Repeated calls queue more replies.
    pub fn on(self, method: Method, url: impl Into<String>, reply: MockReply) -> Self {
        let url = url.into();
        {
            let mut inner = self.lock();
            match inner
                .scripts
                .iter_mut()
                .find(|s| s.method == method && s.url == url)
            {
                Some(script) => script.replies.push_back(reply),
                None => inner.scripts.push(Script {
                    method,
                    url,
                    replies: VecDeque::from([reply]),
                }),
            }
        }
        self
    }

    /// Every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<FetchRequest> {
        self.lock().calls.clone()
    }

    /// Requests received with `method`.
    pub fn calls_with(&self, method: Method) -> Vec<FetchRequest> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Fetch for MockFetch {
    async fn send(&self, request: FetchRequest) -> Result<Value, FetchError> {
        let reply = {
            let mut inner = self.lock();
            inner.calls.push(request.clone());
            inner.next_reply(request.method, &request.url)
        };

        let Some(reply) = reply else {
            return Err(FetchError::Status {
                status: 404,
                body: Some(json!({
                    "message": format!("no mock for {} {}", request.method, request.url)
                })),
            });
        };
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        reply.result
    }
}

/// Receiving end of a store's notification channel.
pub struct NotificationProbe {
    tx: NotificationSender,
    rx: mpsc::UnboundedReceiver<Notification>,
}

impl Default for NotificationProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationProbe {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Notifier to hand to the store.
    pub fn sender(&self) -> Notifier {
        Notifier::new(self.tx.clone())
    }

    /// Everything published since the last drain.
    pub fn drain(&mut self) -> Vec<Notification> {
        let mut notifications = Vec::new();
        while let Ok(notification) = self.rx.try_recv() {
            notifications.push(notification);
        }
        notifications
    }
}

// ============================================================================
// Assertion Macros
// ============================================================================

/// Assert that an item matching a pattern is present.
///
/// Works on anything with `.iter()`: applied actions from
/// `settle()`, drained notifications, grid events.
///
/// # Example
///
/// ```ignore
/// let applied = store.settle().await;
/// assert_emitted!(applied, StoreAction::ListDidLoad { .. });
/// assert_emitted!(probe.drain(), Notification::Alert { color: AlertColor::Red, .. });
/// ```
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {{
        let actions = &$actions;
        assert!(
            actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            actions
        );
    }};
}

/// Assert that no item matches a pattern.
///
/// # Example
///
/// ```ignore
/// assert_not_emitted!(applied, StoreAction::MutationDidError { .. });
/// ```
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {{
        let actions = &$actions;
        assert!(
            !actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            actions
        );
    }};
}

/// Find and return the first item matching a pattern.
///
/// # Example
///
/// ```ignore
/// if let Some(StoreAction::RecordDidCreate { record, .. }) =
///     find_emitted!(applied, StoreAction::RecordDidCreate { .. })
/// {
///     assert!(record.id().is_some());
/// }
/// ```
#[macro_export]
macro_rules! find_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count how many items match a pattern.
///
/// # Example
///
/// ```ignore
/// assert_eq!(count_emitted!(applied, StoreAction::RecordDidDelete { .. }), 3);
/// ```
#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::AlertColor;

    #[tokio::test]
    async fn test_mock_replies_in_order_then_repeat() {
        let fetch = MockFetch::new()
            .on(Method::Get, "a", MockReply::ok(json!(1)))
            .on(Method::Get, "a", MockReply::ok(json!(2)));

        assert_eq!(fetch.send(FetchRequest::get("a")).await, Ok(json!(1)));
        assert_eq!(fetch.send(FetchRequest::get("a")).await, Ok(json!(2)));
        assert_eq!(fetch.send(FetchRequest::get("a")).await, Ok(json!(2)));
        assert_eq!(fetch.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_unscripted_is_404() {
        let fetch = MockFetch::new();
        let error = fetch.send(FetchRequest::delete("x/1")).await.unwrap_err();

        assert_eq!(error.message().as_deref(), Some("no mock for DELETE x/1"));
        assert_eq!(fetch.calls_with(Method::Delete).len(), 1);
        assert!(fetch.calls_with(Method::Get).is_empty());
    }

    #[test]
    fn test_probe_drains() {
        let mut probe = NotificationProbe::new();
        let notifier = probe.sender();
        notifier.send(Notification::success("ok"));
        notifier.send(Notification::DeleteDialog(false));

        let drained = probe.drain();
        assert_eq!(count_emitted!(drained, Notification::Alert { .. }), 1);
        assert_emitted!(
            drained,
            Notification::Alert {
                color: AlertColor::Green,
                ..
            }
        );
        assert_not_emitted!(drained, Notification::DialogForm(_));
        assert!(probe.drain().is_empty());
    }
}
