//! Store actions
//!
//! Actions follow an intent/result naming convention: intents (`ListFetch`,
//! `RecordCreate`, ...) come from the host and may start requests; results
//! (`ListDidLoad`, `RecordDidCreate`, ...) carry request outcomes back.

use std::fmt::Debug;

use crate::fetch::FetchError;
use crate::record::{Record, RecordId};
use crate::resource::{ResourceKey, Route};
use crate::schema::FieldSchema;
use crate::state::ListPage;

/// Marker trait for actions that can be dispatched to a store
///
/// - Clone: actions are logged and handed back to the host after they apply
/// - Debug: for logging
/// - Send + 'static: result actions cross task boundaries
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Which mutation a result belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

/// One DELETE and the row it removes on success.
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteTarget {
    /// Id sent in the DELETE path.
    pub id: RecordId,
    /// Id of the local row dropped when the DELETE succeeds.
    pub remove: RecordId,
}

/// Ids to delete from one resource.
///
/// By default each successful DELETE drops the row with the deleted id.
/// [`removing`](Self::removing) overrides which row goes, pairing overrides
/// with ids positionally.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeleteRequest {
    targets: Vec<DeleteTarget>,
}

impl DeleteRequest {
    pub fn one(id: impl Into<RecordId>) -> Self {
        Self::many([id])
    }

    pub fn many<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RecordId>,
    {
        Self {
            targets: ids
                .into_iter()
                .map(|id| {
                    let id = id.into();
                    DeleteTarget {
                        remove: id.clone(),
                        id,
                    }
                })
                .collect(),
        }
    }

    pub fn removing<I, T>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RecordId>,
    {
        for (target, row) in self.targets.iter_mut().zip(rows) {
            target.remove = row.into();
        }
        self
    }

    pub fn targets(&self) -> &[DeleteTarget] {
        &self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StoreAction {
    // ===== Setup =====
    RouteRegister { key: ResourceKey, route: Route },
    FieldsSet(FieldSchema),
    ItemsSet { key: ResourceKey, records: Vec<Record> },
    Reset,
    /// In-flight requests were abandoned; lower every loading flag.
    RequestsCancel,

    // ===== List =====
    ListFetch { key: ResourceKey, page: u32 },
    ListDidLoad {
        key: ResourceKey,
        request: u64,
        page: ListPage,
    },
    ListDidError {
        key: ResourceKey,
        request: u64,
        error: FetchError,
    },

    // ===== Mutations =====
    RecordCreate { key: ResourceKey, data: Record },
    RecordDidCreate { key: ResourceKey, record: Record },
    RecordUpdate {
        key: ResourceKey,
        id: RecordId,
        data: Record,
    },
    RecordDidUpdate { key: ResourceKey, record: Record },
    RecordDelete {
        key: ResourceKey,
        request: DeleteRequest,
    },
    RecordDidDelete {
        key: ResourceKey,
        id: RecordId,
        remove: RecordId,
    },
    MutationDidError {
        key: ResourceKey,
        operation: Operation,
        error: FetchError,
    },
}

impl StoreAction {
    /// Resource the action applies to, if any.
    pub fn key(&self) -> Option<&ResourceKey> {
        match self {
            StoreAction::FieldsSet(_) | StoreAction::Reset | StoreAction::RequestsCancel => None,
            StoreAction::RouteRegister { key, .. }
            | StoreAction::ItemsSet { key, .. }
            | StoreAction::ListFetch { key, .. }
            | StoreAction::ListDidLoad { key, .. }
            | StoreAction::ListDidError { key, .. }
            | StoreAction::RecordCreate { key, .. }
            | StoreAction::RecordDidCreate { key, .. }
            | StoreAction::RecordUpdate { key, .. }
            | StoreAction::RecordDidUpdate { key, .. }
            | StoreAction::RecordDelete { key, .. }
            | StoreAction::RecordDidDelete { key, .. }
            | StoreAction::MutationDidError { key, .. } => Some(key),
        }
    }

    /// Whether this carries the outcome of a request.
    pub fn is_result(&self) -> bool {
        self.name().contains("Did")
    }
}

impl Action for StoreAction {
    fn name(&self) -> &'static str {
        match self {
            StoreAction::RouteRegister { .. } => "RouteRegister",
            StoreAction::FieldsSet(_) => "FieldsSet",
            StoreAction::ItemsSet { .. } => "ItemsSet",
            StoreAction::Reset => "Reset",
            StoreAction::RequestsCancel => "RequestsCancel",
            StoreAction::ListFetch { .. } => "ListFetch",
            StoreAction::ListDidLoad { .. } => "ListDidLoad",
            StoreAction::ListDidError { .. } => "ListDidError",
            StoreAction::RecordCreate { .. } => "RecordCreate",
            StoreAction::RecordDidCreate { .. } => "RecordDidCreate",
            StoreAction::RecordUpdate { .. } => "RecordUpdate",
            StoreAction::RecordDidUpdate { .. } => "RecordDidUpdate",
            StoreAction::RecordDelete { .. } => "RecordDelete",
            StoreAction::RecordDidDelete { .. } => "RecordDidDelete",
            StoreAction::MutationDidError { .. } => "MutationDidError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_request_defaults_to_own_id() {
        let request = DeleteRequest::many([1, 2, 3]);
        let removed: Vec<_> = request.targets().iter().map(|t| t.remove.clone()).collect();
        assert_eq!(
            removed,
            vec![RecordId::from(1), RecordId::from(2), RecordId::from(3)]
        );
    }

    #[test]
    fn test_delete_request_removing_pairs_positionally() {
        let request = DeleteRequest::many([10, 11]).removing(["a"]);
        assert_eq!(request.targets()[0].remove, RecordId::from("a"));
        assert_eq!(request.targets()[1].remove, RecordId::from(11));
    }

    #[test]
    fn test_result_actions() {
        let key = ResourceKey::new("users").unwrap();
        assert!(StoreAction::RecordDidCreate {
            key: key.clone(),
            record: Record::new()
        }
        .is_result());
        assert!(!StoreAction::ListFetch { key, page: 1 }.is_result());
    }
}
