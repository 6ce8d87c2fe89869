//! Store state and its read-only views

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::fetch::FetchError;
use crate::record::Record;
use crate::resource::{ResourceKey, Route};
use crate::schema::{ColumnConfig, ColumnDef, FieldSchema};

/// Pagination metadata of the last list fetch for a resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub current_page: u64,
    pub last_page: u64,
}

/// Body of a list response: `{data, total, current_page, last_page}`.
///
/// Missing or `null` counters read as 0.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ListPage {
    pub data: Vec<Record>,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total: u64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub current_page: u64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub last_page: u64,
}

fn zero_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

impl ListPage {
    pub fn from_value(value: Value) -> Result<Self, FetchError> {
        serde_json::from_value(value).map_err(|e| FetchError::Decode(e.to_string()))
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            total: self.total,
            current_page: self.current_page,
            last_page: self.last_page,
        }
    }
}

/// Which loading flag to read.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LoadingKey {
    Resource(ResourceKey),
    /// Raised while any create/update/delete is in flight.
    Main,
}

impl From<ResourceKey> for LoadingKey {
    fn from(key: ResourceKey) -> Self {
        LoadingKey::Resource(key)
    }
}

/// Everything the store knows about its resources.
///
/// Only the reducer mutates this; hosts read it through the accessors.
#[derive(Clone, Debug, Default)]
pub struct StoreState {
    pub(crate) main_key: Option<ResourceKey>,
    pub(crate) routes: BTreeMap<ResourceKey, Route>,
    pub(crate) items: HashMap<ResourceKey, Vec<Record>>,
    pub(crate) loadings: HashMap<ResourceKey, bool>,
    /// Count of mutations in flight; the main flag is `> 0`.
    pub(crate) main_in_flight: usize,
    pub(crate) paginations: HashMap<ResourceKey, Pagination>,
    /// Sequence number of the latest list request per resource.
    pub(crate) list_requests: HashMap<ResourceKey, u64>,
    pub(crate) fields: FieldSchema,
    pub(crate) config: StoreConfig,
}

impl StoreState {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn main_key(&self) -> Option<&ResourceKey> {
        self.main_key.as_ref()
    }

    pub fn require_main(&self) -> Result<&ResourceKey, StoreError> {
        self.main_key.as_ref().ok_or(StoreError::NoMainKey)
    }

    pub fn routes(&self) -> impl Iterator<Item = (&ResourceKey, &Route)> {
        self.routes.iter()
    }

    pub fn route(&self, key: &ResourceKey) -> Option<&Route> {
        self.routes.get(key)
    }

    pub fn require_route(&self, key: &ResourceKey) -> Result<&Route, StoreError> {
        self.routes
            .get(key)
            .ok_or_else(|| StoreError::UnknownResource(key.clone()))
    }

    pub fn main_route(&self) -> Option<&Route> {
        self.main_key.as_ref().and_then(|key| self.routes.get(key))
    }

    /// Records of a resource; empty when nothing was loaded yet.
    pub fn items(&self, key: &ResourceKey) -> &[Record] {
        self.items.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn main_items(&self) -> &[Record] {
        match &self.main_key {
            Some(key) => self.items(key),
            None => &[],
        }
    }

    pub fn is_loading(&self, key: &LoadingKey) -> bool {
        match key {
            LoadingKey::Resource(key) => self.loadings.get(key).copied().unwrap_or(false),
            LoadingKey::Main => self.main_in_flight > 0,
        }
    }

    pub fn is_main_loading(&self) -> bool {
        self.is_loading(&LoadingKey::Main)
    }

    pub fn pagination(&self, key: &ResourceKey) -> Option<&Pagination> {
        self.paginations.get(key)
    }

    pub fn fields(&self) -> &FieldSchema {
        &self.fields
    }

    /// Field list with groups expanded one level.
    pub fn flat_fields(&self) -> Vec<&ColumnDef> {
        self.fields.flat_fields().collect()
    }

    /// Table column configuration for the current fields.
    pub fn columns(&self) -> Vec<ColumnConfig> {
        self.fields.columns()
    }

    pub(crate) fn is_latest_list(&self, key: &ResourceKey, request: u64) -> bool {
        self.list_requests.get(key) == Some(&request)
    }

    pub(crate) fn finish_mutation(&mut self) {
        self.main_in_flight = self.main_in_flight.saturating_sub(1);
    }

    /// Drop all resource state. The main key, field schema and config
    /// survive.
    pub(crate) fn reset(&mut self) {
        self.routes.clear();
        self.items.clear();
        self.loadings.clear();
        self.main_in_flight = 0;
        self.paginations.clear();
        self.list_requests.clear();
    }

    /// Lower every loading flag; in-flight requests were abandoned.
    pub(crate) fn clear_loadings(&mut self) {
        self.loadings.values_mut().for_each(|flag| *flag = false);
        self.main_in_flight = 0;
    }
}
