/// Single-slot store holding the layout captured before the last operation
use std::cell::RefCell;
use std::collections::HashMap;

use log::debug;
use uuid::Uuid;

use crate::directory::TabDirectory;
use crate::error::TabError;
use crate::tab_data::{GroupStyle, Snapshot, SnapshotTab};

#[derive(Debug, Default)]
pub struct SnapshotStore {
    slot: RefCell<Option<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        SnapshotStore::default()
    }

    /// Record the window's current tab order and groups, replacing any
    /// earlier snapshot
    pub async fn capture(&self, directory: &dyn TabDirectory) -> Result<Snapshot, TabError> {
        let mut tabs = directory.query_tabs().await?;
        let groups = directory.query_groups().await?;
        tabs.sort_by_key(|t| t.index);

        let snapshot = Snapshot {
            id: Uuid::new_v4().to_string(),
            timestamp: now_millis(),
            tabs: tabs
                .into_iter()
                .map(|t| SnapshotTab {
                    id: t.id,
                    index: t.index,
                    url: t.url,
                    title: t.title,
                    group: t.group,
                })
                .collect(),
            groups: groups
                .into_iter()
                .map(|g| (g.id, GroupStyle { title: g.title, color: g.color }))
                .collect::<HashMap<_, _>>(),
        };

        debug!(
            "captured snapshot {} ({} tabs, {} groups)",
            snapshot.id,
            snapshot.tabs.len(),
            snapshot.groups.len()
        );
        self.slot.replace(Some(snapshot.clone()));
        Ok(snapshot)
    }

    pub fn has_snapshot(&self) -> bool {
        self.slot.borrow().is_some()
    }

    pub fn peek(&self) -> Option<Snapshot> {
        self.slot.borrow().clone()
    }

    pub fn clear(&self) {
        self.slot.replace(None);
    }
}

#[cfg(target_arch = "wasm32")]
fn now_millis() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_millis() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64() * 1000.0)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::memory::MemoryWindow;
    use crate::tab_data::{GroupColor, GroupRef, TabInfo};
    use futures::executor::block_on;

    fn window() -> MemoryWindow {
        MemoryWindow::new(vec![
            TabInfo::new(1, "https://a.test".to_string(), "A".to_string(), true, 0),
            TabInfo::new(2, "https://b.test".to_string(), "B".to_string(), false, 0).in_group(7),
            TabInfo::new(3, "https://c.test".to_string(), "C".to_string(), false, 0),
        ])
        .with_group(7, "Reading", GroupColor::Purple)
    }

    #[test]
    fn test_capture_records_tabs_and_groups() {
        let window = window();
        let store = SnapshotStore::new();

        let snapshot = block_on(store.capture(&window)).unwrap();

        assert!(store.has_snapshot());
        assert_eq!(snapshot.tabs.len(), 3);
        assert_eq!(snapshot.tabs[1].id, 2);
        assert_eq!(snapshot.tabs[1].index, 1);
        assert_eq!(snapshot.tabs[1].group, GroupRef::Grouped(7));
        assert_eq!(
            snapshot.groups.get(&7),
            Some(&GroupStyle { title: "Reading".to_string(), color: GroupColor::Purple })
        );
        assert!(snapshot.timestamp > 0.0);
    }

    #[test]
    fn test_second_capture_replaces_first() {
        let window = window();
        let store = SnapshotStore::new();

        let first = block_on(store.capture(&window)).unwrap();
        window.close_tab(3);
        let second = block_on(store.capture(&window)).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.peek(), Some(second));
        assert_eq!(store.peek().map(|s| s.tabs.len()), Some(2));
    }

    #[test]
    fn test_failed_capture_keeps_previous() {
        let window = window();
        let store = SnapshotStore::new();
        let first = block_on(store.capture(&window)).unwrap();

        window.fail_queries.set(true);
        assert!(block_on(store.capture(&window)).is_err());

        assert_eq!(store.peek(), Some(first));
    }

    #[test]
    fn test_clear() {
        let window = window();
        let store = SnapshotStore::new();
        block_on(store.capture(&window)).unwrap();

        store.clear();

        assert!(!store.has_snapshot());
        assert_eq!(store.peek(), None);
    }
}
