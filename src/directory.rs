/// Capabilities the organizer needs from the browser
use async_trait::async_trait;

use crate::error::TabError;
use crate::tab_data::{GroupColor, GroupId, GroupInfo, TabId, TabInfo};

/// Tabs and tab groups of the current window
#[async_trait(?Send)]
pub trait TabDirectory {
    /// All tabs of the window, in index order
    async fn query_tabs(&self) -> Result<Vec<TabInfo>, TabError>;

    async fn query_groups(&self) -> Result<Vec<GroupInfo>, TabError>;

    async fn move_tab(&self, id: TabId, index: usize) -> Result<(), TabError>;

    /// Put the tabs into one new group and return its id
    async fn group_tabs(&self, ids: &[TabId]) -> Result<GroupId, TabError>;

    async fn ungroup_tabs(&self, ids: &[TabId]) -> Result<(), TabError>;

    async fn update_group(&self, id: GroupId, title: &str, color: GroupColor) -> Result<(), TabError>;
}

/// Reads a text excerpt from a tab's page
#[async_trait(?Send)]
pub trait ContentExtractor {
    /// Best-effort page text; returns a string starting with
    /// [`EXCERPT_UNAVAILABLE`](crate::gateway::EXCERPT_UNAVAILABLE) instead of failing
    async fn extract_excerpt(&self, tab: &TabInfo) -> String;
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryWindow;
    use super::*;
    use crate::tab_data::GroupRef;
    use futures::executor::block_on;

    fn tab(id: TabId, pinned: bool) -> TabInfo {
        TabInfo::new(id, format!("https://site{}.test", id), format!("Tab {}", id), pinned, 0)
    }

    #[test]
    fn test_move_tab_reorders() {
        let window = MemoryWindow::new(vec![tab(1, false), tab(2, false), tab(3, false)]);

        block_on(window.move_tab(3, 0)).unwrap();
        assert_eq!(window.tab_ids(), vec![3, 1, 2]);

        block_on(window.move_tab(3, 99)).unwrap();
        assert_eq!(window.tab_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_move_tab_keeps_pinned_prefix() {
        let window = MemoryWindow::new(vec![tab(1, true), tab(2, false), tab(3, false)]);

        block_on(window.move_tab(3, 0)).unwrap();

        assert_eq!(window.tab_ids(), vec![1, 3, 2]);
    }

    #[test]
    fn test_group_tabs_makes_members_contiguous() {
        let window = MemoryWindow::new(vec![tab(1, false), tab(2, false), tab(3, false), tab(4, false)]);

        let group = block_on(window.group_tabs(&[2, 4])).unwrap();
        block_on(window.update_group(group, "Reading", GroupColor::Blue)).unwrap();

        assert_eq!(window.tab_ids(), vec![1, 2, 4, 3]);
        assert_eq!(window.members_of("Reading"), vec![2, 4]);
        assert_eq!(window.color_of("Reading"), Some(GroupColor::Blue));
    }

    #[test]
    fn test_ungroup_destroys_empty_groups() {
        let window = MemoryWindow::new(vec![tab(1, false), tab(2, false)]);
        let group = block_on(window.group_tabs(&[1, 2])).unwrap();

        block_on(window.ungroup_tabs(&[1, 2])).unwrap();

        assert!(block_on(window.query_groups()).unwrap().is_empty());
        assert!(window.tabs().iter().all(|t| t.group == GroupRef::Ungrouped));
        assert!(block_on(window.update_group(group, "Gone", GroupColor::Red)).is_err());
    }
}
