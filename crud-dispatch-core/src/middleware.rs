//! Middleware hooks around store dispatch

use crate::action::{Action, StoreAction};

/// Intercepts every action a store dispatches.
pub trait Middleware<A: Action> {
    /// Called before the reducer sees the action
    fn before(&mut self, action: &A);

    /// Called after the reducer ran; `state_changed` is its change flag
    fn after(&mut self, action: &A, state_changed: bool);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<A: Action> Middleware<A> for NoopMiddleware {
    fn before(&mut self, _action: &A) {}
    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

/// Traces store actions with the resource they target.
///
/// Intents are logged at `debug`, request outcomes at `debug` when applied
/// and at `trace` when the reducer dropped them.
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Also log each action before it reaches the reducer
    pub log_before: bool,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self { log_before: true }
    }
}

impl Middleware<StoreAction> for LoggingMiddleware {
    fn before(&mut self, action: &StoreAction) {
        if self.log_before {
            tracing::trace!(action = action.name(), resource = ?action.key(), "Dispatching");
        }
    }

    fn after(&mut self, action: &StoreAction, state_changed: bool) {
        let resource = action.key().map(|key| key.as_str());
        match (action.is_result(), state_changed) {
            (true, false) => {
                tracing::trace!(action = action.name(), resource, "Result dropped by reducer")
            }
            (true, true) => tracing::debug!(action = action.name(), resource, "Result applied"),
            (false, changed) => {
                tracing::debug!(action = action.name(), resource, changed, "Intent processed")
            }
        }
    }
}

/// Records action names, for assertions in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingMiddleware {
    /// Names of processed actions, in dispatch order
    pub processed: Vec<&'static str>,
    /// Names of actions the reducer left state untouched for
    pub unchanged: Vec<&'static str>,
}

impl<A: Action> Middleware<A> for RecordingMiddleware {
    fn before(&mut self, _action: &A) {}

    fn after(&mut self, action: &A, state_changed: bool) {
        self.processed.push(action.name());
        if !state_changed {
            self.unchanged.push(action.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectStore;
    use crate::reducer::reducer;
    use crate::resource::{ResourceKey, Route};
    use crate::state::StoreState;

    #[test]
    fn test_recording_middleware_tracks_unchanged() {
        let mut store = EffectStore::new(
            StoreState::default(),
            reducer,
            RecordingMiddleware::default(),
        );
        let users = ResourceKey::new("users").unwrap();

        store.dispatch(StoreAction::ListFetch {
            key: users.clone(),
            page: 1,
        });
        store.dispatch(StoreAction::RouteRegister {
            key: users,
            route: Route::new("api/users"),
        });

        assert_eq!(store.middleware().processed, vec!["ListFetch", "RouteRegister"]);
        assert_eq!(store.middleware().unchanged, vec!["ListFetch"]);
    }

    #[test]
    fn test_verbose_logging_leaves_dispatch_alone() {
        assert!(!LoggingMiddleware::new().log_before);
        let mut store = EffectStore::new(
            StoreState::default(),
            reducer,
            LoggingMiddleware::verbose(),
        );
        assert!(store.middleware().log_before);

        let result = store.dispatch(StoreAction::RouteRegister {
            key: ResourceKey::new("users").unwrap(),
            route: Route::new("api/users"),
        });

        assert!(result.changed);
        assert!(store.state().main_key().is_some());
    }
}
