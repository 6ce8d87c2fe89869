//! Store reducer: (state, action) -> effects
//!
//! All state transitions happen here. Requests and notifications are only
//! declared, as [`CrudEffect`]s, and carried out by the driver.

use crate::action::StoreAction;
use crate::effect::{CrudEffect, DispatchResult};
use crate::notify::Notification;
use crate::state::StoreState;

pub fn reducer(state: &mut StoreState, action: StoreAction) -> DispatchResult<CrudEffect> {
    match action {
        // ===== Setup =====
        StoreAction::RouteRegister { key, route } => {
            if state.main_key.is_none() {
                state.main_key = Some(key.clone());
            }
            state.routes.insert(key, route);
            DispatchResult::changed()
        }

        StoreAction::FieldsSet(schema) => {
            state.fields = schema;
            DispatchResult::changed()
        }

        StoreAction::ItemsSet { key, records } => {
            state.items.insert(key, records);
            DispatchResult::changed()
        }

        StoreAction::Reset => {
            state.reset();
            DispatchResult::changed()
        }

        StoreAction::RequestsCancel => {
            state.clear_loadings();
            DispatchResult::changed()
        }

        // ===== List =====
        StoreAction::ListFetch { key, page } => {
            let Some(route) = state.routes.get(&key) else {
                tracing::warn!(resource = %key, "List requested for unregistered resource");
                return DispatchResult::unchanged();
            };
            let url = route.list_url(&state.config.page_param, page);

            let counter = state.list_requests.entry(key.clone()).or_default();
            *counter += 1;
            let request = *counter;

            state.loadings.insert(key.clone(), true);
            DispatchResult::changed_with(CrudEffect::List { key, request, url })
        }

        StoreAction::ListDidLoad { key, request, page } => {
            if !state.is_latest_list(&key, request) {
                tracing::trace!(resource = %key, request, "Discarding stale list response");
                return DispatchResult::unchanged();
            }
            state.loadings.insert(key.clone(), false);
            state.paginations.insert(key.clone(), page.pagination());
            state.items.insert(key, page.data);
            DispatchResult::changed()
        }

        StoreAction::ListDidError {
            key,
            request,
            error,
        } => {
            if !state.is_latest_list(&key, request) {
                tracing::trace!(resource = %key, request, "Discarding stale list failure");
                return DispatchResult::unchanged();
            }
            tracing::warn!(resource = %key, error = %error, "List request failed");
            state.loadings.insert(key, false);
            DispatchResult::changed_with(CrudEffect::Notify(Notification::error(
                error.user_message(),
            )))
        }

        // ===== Mutations =====
        StoreAction::RecordCreate { key, data } => {
            let Some(route) = state.routes.get(&key) else {
                tracing::warn!(resource = %key, "Create requested for unregistered resource");
                return DispatchResult::unchanged();
            };
            let url = route.as_str().to_string();
            let body = state.fields.to_send_form(&data);
            state.main_in_flight += 1;
            DispatchResult::changed_with(CrudEffect::Create { key, url, body })
        }

        StoreAction::RecordDidCreate { key, record } => {
            state.finish_mutation();
            state.items.entry(key).or_default().push(record);
            DispatchResult::changed_with_many(vec![
                CrudEffect::Notify(Notification::success(state.config.messages.created.clone())),
                CrudEffect::Notify(Notification::DialogForm(false)),
            ])
        }

        StoreAction::RecordUpdate { key, id, data } => {
            let Some(route) = state.routes.get(&key) else {
                tracing::warn!(resource = %key, "Update requested for unregistered resource");
                return DispatchResult::unchanged();
            };
            let url = route.item_url(&id);
            let body = state.fields.to_send_form(&data);
            state.main_in_flight += 1;
            DispatchResult::changed_with(CrudEffect::Update { key, url, body })
        }

        StoreAction::RecordDidUpdate { key, record } => {
            state.finish_mutation();
            match (record.id(), state.items.get_mut(&key)) {
                (Some(id), Some(items)) => {
                    for slot in items.iter_mut().filter(|slot| slot.has_id(&id)) {
                        *slot = record.clone();
                    }
                }
                (None, _) => {
                    tracing::warn!(resource = %key, "Updated record came back without an id");
                }
                (Some(_), None) => {}
            }
            DispatchResult::changed_with_many(vec![
                CrudEffect::Notify(Notification::success(state.config.messages.updated.clone())),
                CrudEffect::Notify(Notification::DialogForm(false)),
            ])
        }

        StoreAction::RecordDelete { key, request } => {
            let Some(route) = state.routes.get(&key) else {
                tracing::warn!(resource = %key, "Delete requested for unregistered resource");
                return DispatchResult::unchanged();
            };
            let effects: Vec<_> = request
                .targets()
                .iter()
                .map(|target| CrudEffect::Delete {
                    key: key.clone(),
                    url: route.item_url(&target.id),
                    id: target.id.clone(),
                    remove: target.remove.clone(),
                })
                .collect();
            if effects.is_empty() {
                return DispatchResult::unchanged();
            }
            state.main_in_flight += effects.len();
            DispatchResult::changed_with_many(effects)
        }

        StoreAction::RecordDidDelete { key, remove, .. } => {
            state.finish_mutation();
            if let Some(items) = state.items.get_mut(&key) {
                items.retain(|record| !record.has_id(&remove));
            }
            DispatchResult::changed_with_many(vec![
                CrudEffect::Notify(Notification::success(state.config.messages.deleted.clone())),
                CrudEffect::Notify(Notification::DeleteDialog(false)),
            ])
        }

        StoreAction::MutationDidError {
            key,
            operation,
            error,
        } => {
            state.finish_mutation();
            tracing::warn!(resource = %key, ?operation, error = %error, "Mutation failed");
            DispatchResult::changed_with(CrudEffect::Notify(Notification::error(
                error.user_message(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{DeleteRequest, Operation};
    use crate::fetch::FetchError;
    use crate::record::{Record, RecordId};
    use crate::resource::{ResourceKey, Route};
    use crate::schema::{ColumnDef, FieldSchema};
    use crate::state::{ListPage, LoadingKey, Pagination};
    use serde_json::json;

    fn key(name: &str) -> ResourceKey {
        ResourceKey::new(name).unwrap()
    }

    fn record(value: serde_json::Value) -> Record {
        Record::from_value(value).unwrap()
    }

    fn registered(names: &[&str]) -> StoreState {
        let mut state = StoreState::default();
        for name in names {
            reducer(
                &mut state,
                StoreAction::RouteRegister {
                    key: key(name),
                    route: Route::new(format!("api/{}", name.to_lowercase())),
                },
            );
        }
        state
    }

    #[test]
    fn test_first_route_becomes_main() {
        let state = registered(&["Users", "Orders"]);
        assert_eq!(state.main_key(), Some(&key("Users")));
        assert_eq!(state.routes().count(), 2);
    }

    #[test]
    fn test_reregister_replaces_route_keeps_main() {
        let mut state = registered(&["Users"]);
        reducer(
            &mut state,
            StoreAction::RouteRegister {
                key: key("Users"),
                route: Route::new("v2/users"),
            },
        );
        assert_eq!(state.route(&key("Users")), Some(&Route::new("v2/users")));
        assert_eq!(state.main_key(), Some(&key("Users")));
    }

    #[test]
    fn test_list_fetch_sets_loading_and_emits_request() {
        let mut state = registered(&["Users"]);

        let result = reducer(
            &mut state,
            StoreAction::ListFetch {
                key: key("Users"),
                page: 2,
            },
        );

        assert!(state.is_loading(&LoadingKey::Resource(key("Users"))));
        assert_eq!(
            result.effects,
            vec![CrudEffect::List {
                key: key("Users"),
                request: 1,
                url: "api/users?page=2".into()
            }]
        );
    }

    #[test]
    fn test_list_did_load_replaces_items_and_pagination() {
        let mut state = registered(&["Users"]);
        reducer(
            &mut state,
            StoreAction::ListFetch {
                key: key("Users"),
                page: 2,
            },
        );

        let page = ListPage {
            data: vec![record(json!({"id": 1})), record(json!({"id": 2}))],
            total: 20,
            current_page: 2,
            last_page: 4,
        };
        reducer(
            &mut state,
            StoreAction::ListDidLoad {
                key: key("Users"),
                request: 1,
                page,
            },
        );

        assert_eq!(state.items(&key("Users")).len(), 2);
        assert_eq!(
            state.pagination(&key("Users")),
            Some(&Pagination {
                total: 20,
                current_page: 2,
                last_page: 4
            })
        );
        assert!(!state.is_loading(&LoadingKey::Resource(key("Users"))));
    }

    #[test]
    fn test_stale_list_response_is_discarded() {
        let mut state = registered(&["Users"]);
        for page in [1, 2] {
            reducer(
                &mut state,
                StoreAction::ListFetch {
                    key: key("Users"),
                    page,
                },
            );
        }

        let stale = reducer(
            &mut state,
            StoreAction::ListDidLoad {
                key: key("Users"),
                request: 1,
                page: ListPage {
                    data: vec![record(json!({"id": "stale"}))],
                    ..ListPage::default()
                },
            },
        );

        assert!(!stale.changed);
        assert!(state.items(&key("Users")).is_empty());
        assert!(state.is_loading(&LoadingKey::Resource(key("Users"))));
    }

    #[test]
    fn test_list_error_clears_loading_and_alerts() {
        let mut state = registered(&["Users"]);
        reducer(
            &mut state,
            StoreAction::ListFetch {
                key: key("Users"),
                page: 1,
            },
        );

        let result = reducer(
            &mut state,
            StoreAction::ListDidError {
                key: key("Users"),
                request: 1,
                error: FetchError::Status {
                    status: 500,
                    body: Some(json!({"message": "db down"})),
                },
            },
        );

        assert!(!state.is_loading(&LoadingKey::Resource(key("Users"))));
        assert_eq!(
            result.effects,
            vec![CrudEffect::Notify(Notification::error("db down"))]
        );
    }

    #[test]
    fn test_create_serializes_through_schema() {
        let mut state = registered(&["Users"]);
        reducer(
            &mut state,
            StoreAction::FieldsSet(
                FieldSchema::default().column(ColumnDef::new("created_at", "Created").readonly()),
            ),
        );

        let result = reducer(
            &mut state,
            StoreAction::RecordCreate {
                key: key("Users"),
                data: record(json!({"name": "Ada", "created_at": "now"})),
            },
        );

        assert!(state.is_main_loading());
        assert_eq!(
            result.effects,
            vec![CrudEffect::Create {
                key: key("Users"),
                url: "api/users".into(),
                body: record(json!({"name": "Ada"})),
            }]
        );
    }

    #[test]
    fn test_did_create_appends_only_to_target() {
        let mut state = registered(&["Users", "Orders"]);
        state.items.insert(key("Orders"), vec![record(json!({"id": 9}))]);
        state.main_in_flight = 1;

        let result = reducer(
            &mut state,
            StoreAction::RecordDidCreate {
                key: key("Users"),
                record: record(json!({"id": 1, "name": "Ada"})),
            },
        );

        assert_eq!(state.items(&key("Users")).len(), 1);
        assert_eq!(state.items(&key("Orders")), &[record(json!({"id": 9}))]);
        assert!(!state.is_main_loading());
        assert_eq!(
            result.effects,
            vec![
                CrudEffect::Notify(Notification::success("Created successfully")),
                CrudEffect::Notify(Notification::DialogForm(false)),
            ]
        );
    }

    #[test]
    fn test_did_update_replaces_in_place_with_tolerant_match() {
        let mut state = registered(&["Users"]);
        state.items.insert(
            key("Users"),
            vec![
                record(json!({"id": 1, "name": "a"})),
                record(json!({"id": 2, "name": "b"})),
                record(json!({"id": 3, "name": "c"})),
            ],
        );

        reducer(
            &mut state,
            StoreAction::RecordDidUpdate {
                key: key("Users"),
                record: record(json!({"id": "2", "name": "B"})),
            },
        );

        let items = state.items(&key("Users"));
        assert_eq!(items[0], record(json!({"id": 1, "name": "a"})));
        assert_eq!(items[1], record(json!({"id": "2", "name": "B"})));
        assert_eq!(items[2], record(json!({"id": 3, "name": "c"})));
    }

    #[test]
    fn test_delete_counts_each_request() {
        let mut state = registered(&["Users"]);

        let result = reducer(
            &mut state,
            StoreAction::RecordDelete {
                key: key("Users"),
                request: DeleteRequest::many([1, 2]),
            },
        );

        assert_eq!(result.effects.len(), 2);
        assert!(matches!(
            &result.effects[1],
            CrudEffect::Delete { url, .. } if url == "api/users/2"
        ));

        reducer(
            &mut state,
            StoreAction::RecordDidDelete {
                key: key("Users"),
                id: RecordId::from(1),
                remove: RecordId::from(1),
            },
        );
        assert!(state.is_main_loading(), "second delete still in flight");

        reducer(
            &mut state,
            StoreAction::MutationDidError {
                key: key("Users"),
                operation: Operation::Delete,
                error: FetchError::Transport("reset".into()),
            },
        );
        assert!(!state.is_main_loading());
    }

    #[test]
    fn test_did_delete_removes_its_own_target() {
        let mut state = registered(&["Users"]);
        state.items.insert(
            key("Users"),
            vec![record(json!({"id": 1})), record(json!({"id": 2}))],
        );

        reducer(
            &mut state,
            StoreAction::RecordDidDelete {
                key: key("Users"),
                id: RecordId::from(2),
                remove: RecordId::from("2"),
            },
        );

        assert_eq!(state.items(&key("Users")), &[record(json!({"id": 1}))]);
    }

    #[test]
    fn test_reset_keeps_fields() {
        let mut state = registered(&["Users"]);
        let schema = FieldSchema::default().column(ColumnDef::new("name", "Name"));
        reducer(&mut state, StoreAction::FieldsSet(schema.clone()));

        reducer(&mut state, StoreAction::Reset);

        assert_eq!(state.main_key(), Some(&key("Users")));
        assert_eq!(state.main_route(), None);
        assert_eq!(state.routes().count(), 0);
        assert_eq!(state.fields(), &schema);
    }

    #[test]
    fn test_unregistered_key_is_ignored() {
        let mut state = StoreState::default();
        let result = reducer(
            &mut state,
            StoreAction::ListFetch {
                key: key("Ghosts"),
                page: 1,
            },
        );
        assert!(!result.changed);
        assert!(!result.has_effects());
    }
}
