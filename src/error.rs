/// Error types for Tab Organizer
use std::time::Duration;

use crate::tab_data::{GroupId, TabId};

/// Failures reported by the browser's tab and group APIs
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TabError {
    #[error("could not list tabs: {0}")]
    Query(String),

    #[error("could not move tab {id}: {reason}")]
    Move { id: TabId, reason: String },

    #[error("could not group tabs: {0}")]
    Group(String),

    #[error("could not ungroup tabs: {0}")]
    Ungroup(String),

    #[error("could not update group {id}: {reason}")]
    UpdateGroup { id: GroupId, reason: String },
}

/// Failures of a single model backend call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("model endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("model endpoint returned status {0}")]
    Status(u16),

    #[error("malformed model response: {0}")]
    Malformed(String),

    #[error("model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("model backend unavailable: {0}")]
    Unavailable(String),
}

/// Failures of the extension's key-value storage
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage access failed: {0}")]
    Access(String),

    #[error("stored value is malformed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors that abort a whole sort, organize or ungroup run
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrganizeError {
    #[error("sort failed: {0}")]
    SortFailed(TabError),

    #[error("nothing to organize")]
    NothingToOrganize,

    #[error("organize failed: {0}")]
    OrganizeFailed(TabError),

    #[error("ungroup failed: {0}")]
    UngroupFailed(TabError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_readable() {
        let err = OrganizeError::SortFailed(TabError::Query("no window".to_string()));
        assert_eq!(err.to_string(), "sort failed: could not list tabs: no window");

        let err = TabError::Move { id: 4, reason: "tab gone".to_string() };
        assert_eq!(err.to_string(), "could not move tab 4: tab gone");

        assert_eq!(OrganizeError::NothingToOrganize.to_string(), "nothing to organize");
    }

    #[test]
    fn test_storage_error_from_serde() {
        let parse_err = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        let err: StorageError = parse_err.into();
        assert!(err.to_string().starts_with("stored value is malformed"));
    }
}
