//! Effect-based state management
//!
//! The reducer never performs I/O. It mutates state and returns a
//! [`DispatchResult`] listing the side effects the action calls for; the
//! [`DynamicStore`](crate::DynamicStore) driver turns those into requests
//! and notifications.
//!
//! ```ignore
//! fn reducer(state: &mut StoreState, action: StoreAction) -> DispatchResult<CrudEffect> {
//!     match action {
//!         StoreAction::ListFetch { key, page } => {
//!             state.loadings.insert(key.clone(), true);
//!             DispatchResult::changed_with(CrudEffect::List { key, request: 1, url })
//!         }
//!         // ...
//!     }
//! }
//! ```

use std::marker::PhantomData;

use crate::action::Action;
use crate::middleware::Middleware;
use crate::notify::Notification;
use crate::record::{Record, RecordId};
use crate::resource::ResourceKey;

/// Result of dispatching an action to an effect-aware store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult<E> {
    /// Whether the state was modified by this action.
    pub changed: bool,
    /// Effects to be processed after dispatch.
    pub effects: Vec<E>,
}

impl<E> Default for DispatchResult<E> {
    fn default() -> Self {
        Self::unchanged()
    }
}

impl<E> DispatchResult<E> {
    #[inline]
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            effects: vec![],
        }
    }

    #[inline]
    pub fn changed() -> Self {
        Self {
            changed: true,
            effects: vec![],
        }
    }

    /// State changed and one effect is due.
    #[inline]
    pub fn changed_with(effect: E) -> Self {
        Self {
            changed: true,
            effects: vec![effect],
        }
    }

    /// State changed and several effects are due, in order.
    #[inline]
    pub fn changed_with_many(effects: Vec<E>) -> Self {
        Self {
            changed: true,
            effects,
        }
    }

    /// Add an effect to this result.
    #[inline]
    pub fn with(mut self, effect: E) -> Self {
        self.effects.push(effect);
        self
    }

    #[inline]
    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}

/// A reducer function that can emit effects.
pub type EffectReducer<S, A, E> = fn(&mut S, A) -> DispatchResult<E>;

/// Side effects the store reducer can ask for.
#[derive(Debug, Clone, PartialEq)]
pub enum CrudEffect {
    /// GET one page of a resource. `request` tags the response so stale
    /// pages can be discarded.
    List {
        key: ResourceKey,
        request: u64,
        url: String,
    },
    /// POST a new record.
    Create {
        key: ResourceKey,
        url: String,
        body: Record,
    },
    /// PATCH an existing record.
    Update {
        key: ResourceKey,
        url: String,
        body: Record,
    },
    /// DELETE one record, dropping `remove` locally on success.
    Delete {
        key: ResourceKey,
        url: String,
        id: RecordId,
        remove: RecordId,
    },
    /// Publish a notification.
    Notify(Notification),
}

/// State plus an effect reducer, with middleware hooks around each dispatch.
///
/// Middleware sees action references and the change flag, not the effects.
pub struct EffectStore<S, A, E, M>
where
    A: Action,
    M: Middleware<A>,
{
    state: S,
    reducer: EffectReducer<S, A, E>,
    middleware: M,
    _marker: PhantomData<(A, E)>,
}

impl<S, A, E, M> EffectStore<S, A, E, M>
where
    A: Action,
    M: Middleware<A>,
{
    pub fn new(state: S, reducer: EffectReducer<S, A, E>, middleware: M) -> Self {
        Self {
            state,
            reducer,
            middleware,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn state(&self) -> &S {
        &self.state
    }

    #[inline]
    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    #[inline]
    pub fn middleware_mut(&mut self) -> &mut M {
        &mut self.middleware
    }

    /// Dispatch an action through middleware and reducer.
    pub fn dispatch(&mut self, action: A) -> DispatchResult<E> {
        self.middleware.before(&action);
        let result = (self.reducer)(&mut self.state, action.clone());
        self.middleware.after(&action, result.changed);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::NoopMiddleware;

    #[derive(Clone, Debug)]
    enum TestAction {
        Increment,
        NoOp,
        Announce,
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Increment => "Increment",
                TestAction::NoOp => "NoOp",
                TestAction::Announce => "Announce",
            }
        }
    }

    #[derive(Default)]
    struct TestState {
        count: i32,
    }

    fn test_reducer(state: &mut TestState, action: TestAction) -> DispatchResult<CrudEffect> {
        match action {
            TestAction::Increment => {
                state.count += 1;
                DispatchResult::changed()
            }
            TestAction::NoOp => DispatchResult::unchanged(),
            TestAction::Announce => DispatchResult::changed_with(CrudEffect::Notify(
                Notification::success(format!("count is {}", state.count)),
            )),
        }
    }

    #[test]
    fn test_dispatch_result_builders() {
        let r: DispatchResult<CrudEffect> = DispatchResult::unchanged();
        assert!(!r.changed);
        assert!(!r.has_effects());

        let r = DispatchResult::changed_with(CrudEffect::Notify(Notification::DialogForm(false)))
            .with(CrudEffect::Notify(Notification::DeleteDialog(false)));
        assert!(r.changed);
        assert_eq!(r.effects.len(), 2);
    }

    #[test]
    fn test_effect_store_dispatch() {
        let mut store = EffectStore::new(TestState::default(), test_reducer, NoopMiddleware);

        assert!(store.dispatch(TestAction::Increment).changed);
        assert!(!store.dispatch(TestAction::NoOp).changed);
        assert_eq!(store.state().count, 1);

        let result = store.dispatch(TestAction::Announce);
        assert_eq!(
            result.effects,
            vec![CrudEffect::Notify(Notification::success("count is 1"))]
        );
    }
}
