//! Store boundary errors

use thiserror::Error;

use crate::resource::ResourceKey;

/// Structural errors rejected before any request is issued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("resource '{0}' has no registered route")]
    UnknownResource(ResourceKey),
    #[error("no main resource: register a route first")]
    NoMainKey,
    #[error("cannot derive a resource key from '{0}'")]
    InvalidResourceKey(String),
    #[error("record has no usable id field")]
    MissingRecordId,
    #[error("expected a JSON object for a record, got {0}")]
    NotARecord(&'static str),
}
