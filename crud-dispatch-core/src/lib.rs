//! Core types for crud-dispatch
//!
//! A data-binding layer between REST resources and table widgets, built as
//! a Redux/Elm-style store: a pure reducer over [`StoreState`], effects for
//! every request it wants made, and a driver that runs those requests and
//! folds their outcomes back in as result actions.
//!
//! # Core Concepts
//!
//! - **ResourceKey / Route**: which resources the store manages and where they live
//! - **Record / FieldSchema**: the rows and how they are shown and sent
//! - **StoreAction**: intents (`ListFetch`) and results (`ListDidLoad`)
//! - **DynamicStore**: the driver; owns state, fetch backend and tasks
//! - **Notification**: alerts and dialog toggles published on a channel
//!
//! # Basic Example
//!
//! ```ignore
//! use crud_dispatch_core::prelude::*;
//!
//! let (tx, mut notifications) = notify::channel();
//! let mut store = DynamicStore::new(HttpFetch::new(&HttpConfig::default())?, tx);
//!
//! store.register_route("api/users")?;
//! store.paginate(1)?;
//! store.settle().await;
//!
//! for user in store.state().main_items() {
//!     println!("{}", user.text("name", None));
//! }
//! ```
//!
//! # Intent and result actions
//!
//! Host code only ever issues intents, through the `DynamicStore` methods.
//! Each request the reducer asks for runs as a tokio task that resolves to a
//! `*Did*` action:
//!
//! - `ListFetch` resolves to `ListDidLoad` or `ListDidError`
//! - `RecordCreate` resolves to `RecordDidCreate` or `MutationDidError`
//! - `RecordDelete` resolves to one `RecordDidDelete` or `MutationDidError` per id
//!
//! [`DynamicStore::process_next`] applies the next result and hands it back,
//! so the host can mirror it into a widget.

pub mod action;
pub mod config;
pub mod effect;
pub mod error;
pub mod fetch;
#[cfg(feature = "http")]
pub mod http;
pub mod middleware;
pub mod notify;
pub mod record;
pub mod reducer;
pub mod resource;
pub mod schema;
pub mod state;
pub mod store;
pub mod tasks;
pub mod testing;

// Core trait exports
pub use action::{Action, DeleteRequest, DeleteTarget, Operation, StoreAction};
pub use fetch::{Fetch, FetchError, FetchRequest, Method};
pub use middleware::{LoggingMiddleware, Middleware, NoopMiddleware, RecordingMiddleware};

// Data exports
pub use record::{Record, RecordId};
pub use resource::{ResourceKey, Route, RouteSpec};
pub use schema::{ColumnConfig, ColumnDef, FieldDescriptor, FieldGroup, FieldSchema, Relation};
pub use state::{ListPage, LoadingKey, Pagination, StoreState};

// Store exports
pub use config::{HttpConfig, Messages, StoreConfig};
pub use effect::{CrudEffect, DispatchResult, EffectReducer, EffectStore};
pub use error::StoreError;
pub use notify::{AlertColor, Notification, NotificationReceiver, NotificationSender, Notifier};
pub use reducer::reducer;
pub use store::{DynamicStore, MainResource};
pub use tasks::{TaskKey, TaskManager};

#[cfg(feature = "http")]
pub use http::HttpFetch;

// Testing exports
pub use testing::{MockFetch, MockReply, NotificationProbe};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, DeleteRequest, Operation, StoreAction};
    pub use crate::config::{HttpConfig, Messages, StoreConfig};
    pub use crate::error::StoreError;
    pub use crate::fetch::{Fetch, FetchError, FetchRequest, Method};
    #[cfg(feature = "http")]
    pub use crate::http::HttpFetch;
    pub use crate::middleware::{LoggingMiddleware, Middleware, NoopMiddleware};
    pub use crate::notify::{self, AlertColor, Notification, Notifier};
    pub use crate::record::{Record, RecordId};
    pub use crate::resource::{ResourceKey, Route, RouteSpec};
    pub use crate::schema::{ColumnConfig, ColumnDef, FieldSchema, Relation};
    pub use crate::state::{LoadingKey, Pagination, StoreState};
    pub use crate::store::{DynamicStore, MainResource};
}
