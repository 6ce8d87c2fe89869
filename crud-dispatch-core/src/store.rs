//! The `DynamicStore` driver
//!
//! Owns the effect store, the fetch backend and the task manager. Intent
//! methods validate their input, dispatch an action and start whatever
//! requests the reducer asks for; [`process_next`](DynamicStore::process_next)
//! folds request outcomes back in.
//!
//! ```ignore
//! let (tx, mut notifications) = notify::channel();
//! let mut store = DynamicStore::new(HttpFetch::new(&HttpConfig::default())?, tx);
//!
//! store.register_route("api/users")?;
//! store.paginate(1)?;
//! let users = store.state().require_main()?.clone();
//!
//! loop {
//!     tokio::select! {
//!         Some(action) = store.process_next() => adapter.mirror(&users, &action)?,
//!         Some(note) = notifications.recv() => show(note),
//!     }
//! }
//! ```

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::action::{DeleteRequest, Operation, StoreAction};
use crate::config::StoreConfig;
use crate::effect::{CrudEffect, EffectStore};
use crate::error::StoreError;
use crate::fetch::{Fetch, FetchError, FetchRequest};
use crate::middleware::{LoggingMiddleware, Middleware};
use crate::notify::Notifier;
use crate::record::Record;
use crate::reducer::reducer;
use crate::resource::{ResourceKey, Route, RouteSpec};
use crate::schema::FieldSchema;
use crate::state::{ListPage, StoreState};
use crate::tasks::{TaskKey, TaskManager};

/// A CRUD store over any number of REST resources.
pub struct DynamicStore<M = LoggingMiddleware>
where
    M: Middleware<StoreAction>,
{
    store: EffectStore<StoreState, StoreAction, CrudEffect, M>,
    fetch: Arc<dyn Fetch>,
    notifier: Notifier,
    tasks: TaskManager<StoreAction>,
    results: mpsc::UnboundedReceiver<StoreAction>,
    in_flight: usize,
}

impl DynamicStore<LoggingMiddleware> {
    pub fn new(fetch: impl Fetch + 'static, notifier: impl Into<Notifier>) -> Self {
        Self::with_config(fetch, notifier, StoreConfig::default())
    }

    pub fn with_config(
        fetch: impl Fetch + 'static,
        notifier: impl Into<Notifier>,
        config: StoreConfig,
    ) -> Self {
        Self::with_parts(Arc::new(fetch), notifier, config, LoggingMiddleware::new())
    }
}

impl<M> DynamicStore<M>
where
    M: Middleware<StoreAction>,
{
    /// Build a store from a shared backend and a custom middleware.
    pub fn with_parts(
        fetch: Arc<dyn Fetch>,
        notifier: impl Into<Notifier>,
        config: StoreConfig,
        middleware: M,
    ) -> Self {
        let (tx, results) = mpsc::unbounded_channel();
        Self {
            store: EffectStore::new(StoreState::new(config), reducer, middleware),
            fetch,
            notifier: notifier.into(),
            tasks: TaskManager::new(tx),
            results,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &StoreState {
        self.store.state()
    }

    pub fn middleware(&self) -> &M {
        self.store.middleware()
    }

    // ===== Setup =====

    /// Register a route from a URL or an explicit `(key, route)` pair.
    ///
    /// The first key ever registered becomes the main key. Registering a
    /// known key again replaces its route.
    pub fn register_route(&mut self, spec: impl Into<RouteSpec>) -> Result<Route, StoreError> {
        let (key, route) = spec.into().resolve()?;
        self.dispatch(StoreAction::RouteRegister {
            key,
            route: route.clone(),
        });
        Ok(route)
    }

    pub fn set_fields(&mut self, schema: FieldSchema) {
        self.dispatch(StoreAction::FieldsSet(schema));
    }

    pub fn set_items(&mut self, key: &ResourceKey, records: Vec<Record>) {
        self.dispatch(StoreAction::ItemsSet {
            key: key.clone(),
            records,
        });
    }

    /// Abandon in-flight requests and forget every resource. The main key
    /// and the field schema are kept.
    pub fn reset(&mut self) {
        self.cancel_all();
        self.dispatch(StoreAction::Reset);
    }

    // ===== CRUD =====

    /// Fetch one page of `key`, replacing its items and pagination.
    pub fn list_resources(&mut self, key: &ResourceKey, page: u32) -> Result<(), StoreError> {
        self.state().require_route(key)?;
        self.dispatch(StoreAction::ListFetch {
            key: key.clone(),
            page,
        });
        Ok(())
    }

    /// Fetch one page of the main resource.
    pub fn paginate(&mut self, page: u32) -> Result<(), StoreError> {
        let key = self.state().require_main()?.clone();
        self.list_resources(&key, page)
    }

    /// POST `data` to `key` and append the created record.
    pub fn create_record(&mut self, key: &ResourceKey, data: Record) -> Result<(), StoreError> {
        self.state().require_route(key)?;
        self.dispatch(StoreAction::RecordCreate {
            key: key.clone(),
            data,
        });
        Ok(())
    }

    /// PATCH the record with `data`'s id and replace it in place.
    pub fn update_record(&mut self, key: &ResourceKey, data: Record) -> Result<(), StoreError> {
        self.state().require_route(key)?;
        let id = data.id().ok_or(StoreError::MissingRecordId)?;
        self.dispatch(StoreAction::RecordUpdate {
            key: key.clone(),
            id,
            data,
        });
        Ok(())
    }

    /// DELETE every id in `request`, one call each.
    pub fn delete_records(
        &mut self,
        key: &ResourceKey,
        request: DeleteRequest,
    ) -> Result<(), StoreError> {
        self.state().require_route(key)?;
        self.dispatch(StoreAction::RecordDelete {
            key: key.clone(),
            request,
        });
        Ok(())
    }

    /// The same operations bound to the main resource.
    pub fn main(&mut self) -> Result<MainResource<'_, M>, StoreError> {
        let key = self.state().require_main()?.clone();
        Ok(MainResource { store: self, key })
    }

    // ===== Driver =====

    /// Requests started and not yet folded back in.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Wait for the next request outcome that changes state and apply it.
    ///
    /// Returns the applied action so the caller can mirror it elsewhere, or
    /// `None` once nothing is in flight. Outcomes the reducer discards, such
    /// as superseded list responses, are consumed without being returned.
    pub async fn process_next(&mut self) -> Option<StoreAction> {
        while self.in_flight > 0 {
            let action = self.results.recv().await?;
            self.in_flight -= 1;
            if self.dispatch(action.clone()) {
                return Some(action);
            }
        }
        None
    }

    /// Apply outcomes until nothing is in flight, returning them in order.
    pub async fn settle(&mut self) -> Vec<StoreAction> {
        let mut applied = Vec::new();
        while let Some(action) = self.process_next().await {
            applied.push(action);
        }
        applied
    }

    /// Abort every request. Their outcomes are never applied and all
    /// loading flags drop.
    pub fn cancel_all(&mut self) {
        self.tasks.cancel_all();
        let (tx, results) = mpsc::unbounded_channel();
        self.tasks = TaskManager::new(tx);
        self.results = results;
        if self.in_flight > 0 {
            tracing::debug!(abandoned = self.in_flight, "Cancelled in-flight requests");
        }
        self.in_flight = 0;
        self.dispatch(StoreAction::RequestsCancel);
    }

    fn dispatch(&mut self, action: StoreAction) -> bool {
        let result = self.store.dispatch(action);
        for effect in result.effects {
            self.run_effect(effect);
        }
        result.changed
    }

    fn run_effect(&mut self, effect: CrudEffect) {
        let fetch = Arc::clone(&self.fetch);
        match effect {
            CrudEffect::List { key, request, url } => {
                tracing::debug!(resource = %key, request, %url, "Fetching list");
                self.in_flight += 1;
                self.tasks.spawn(async move {
                    let page = fetch
                        .send(FetchRequest::get(url))
                        .await
                        .and_then(ListPage::from_value);
                    match page {
                        Ok(page) => StoreAction::ListDidLoad { key, request, page },
                        Err(error) => StoreAction::ListDidError {
                            key,
                            request,
                            error,
                        },
                    }
                });
            }
            CrudEffect::Create { key, url, body } => {
                tracing::debug!(resource = %key, %url, "Creating record");
                self.in_flight += 1;
                self.tasks.enqueue(mutation_lane(&key), async move {
                    let created = fetch
                        .send(FetchRequest::post(url, body.into_value()))
                        .await
                        .and_then(decode_record);
                    match created {
                        Ok(record) => StoreAction::RecordDidCreate { key, record },
                        Err(error) => StoreAction::MutationDidError {
                            key,
                            operation: Operation::Create,
                            error,
                        },
                    }
                });
            }
            CrudEffect::Update { key, url, body } => {
                tracing::debug!(resource = %key, %url, "Updating record");
                self.in_flight += 1;
                self.tasks.enqueue(mutation_lane(&key), async move {
                    let updated = fetch
                        .send(FetchRequest::patch(url, body.into_value()))
                        .await
                        .and_then(decode_record);
                    match updated {
                        Ok(record) => StoreAction::RecordDidUpdate { key, record },
                        Err(error) => StoreAction::MutationDidError {
                            key,
                            operation: Operation::Update,
                            error,
                        },
                    }
                });
            }
            CrudEffect::Delete {
                key,
                url,
                id,
                remove,
            } => {
                tracing::debug!(resource = %key, %url, "Deleting record");
                self.in_flight += 1;
                self.tasks.enqueue(mutation_lane(&key), async move {
                    match fetch.send(FetchRequest::delete(url)).await {
                        Ok(_) => StoreAction::RecordDidDelete { key, id, remove },
                        Err(error) => StoreAction::MutationDidError {
                            key,
                            operation: Operation::Delete,
                            error,
                        },
                    }
                });
            }
            CrudEffect::Notify(notification) => self.notifier.send(notification),
        }
    }
}

fn mutation_lane(key: &ResourceKey) -> TaskKey {
    TaskKey::new(format!("mutate:{key}"))
}

fn decode_record(body: Value) -> Result<Record, FetchError> {
    Record::from_value(body).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Operations on the store's main resource.
///
/// Obtained from [`DynamicStore::main`].
pub struct MainResource<'a, M>
where
    M: Middleware<StoreAction>,
{
    store: &'a mut DynamicStore<M>,
    key: ResourceKey,
}

impl<M> MainResource<'_, M>
where
    M: Middleware<StoreAction>,
{
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn list(&mut self, page: u32) -> Result<(), StoreError> {
        self.store.list_resources(&self.key, page)
    }

    pub fn create(&mut self, data: Record) -> Result<(), StoreError> {
        self.store.create_record(&self.key, data)
    }

    pub fn update(&mut self, data: Record) -> Result<(), StoreError> {
        self.store.update_record(&self.key, data)
    }

    pub fn delete(&mut self, request: DeleteRequest) -> Result<(), StoreError> {
        self.store.delete_records(&self.key, request)
    }

    pub fn items(&self) -> &[Record] {
        self.store.state().items(&self.key)
    }
}
