/// Tab sorting: by title, URL or domain, within group boundaries
use log::{info, warn};
use serde::Serialize;

use crate::collation::Collation;
use crate::directory::TabDirectory;
use crate::domain::{extract_domain, is_internal_url};
use crate::error::OrganizeError;
use crate::snapshot::SnapshotStore;
use crate::tab_data::{GroupId, TabId, TabInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Url,
    Domain,
}

impl SortKey {
    pub fn from_name(name: &str) -> Option<SortKey> {
        match name.trim().to_ascii_lowercase().as_str() {
            "title" => Some(SortKey::Title),
            "url" => Some(SortKey::Url),
            "domain" => Some(SortKey::Domain),
            _ => None,
        }
    }

    fn collation_key(self, tab: &TabInfo) -> (String, String) {
        match self {
            SortKey::Title => (tab.title.clone(), String::new()),
            SortKey::Url => (tab.url.clone(), String::new()),
            SortKey::Domain => (extract_domain(&tab.url).unwrap_or_default(), tab.url.clone()),
        }
    }
}

/// A single `move_tab` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabMove {
    pub id: TabId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SortReport {
    pub moved: usize,
    pub failed: usize,
}

/// Pinned tabs and browser pages never move
pub fn is_sortable(tab: &TabInfo) -> bool {
    !tab.pinned && !is_internal_url(&tab.url)
}

/// Stable, case-insensitive, locale-aware sort (precompute the key for each tab)
pub fn sort_tabs(tabs: &[TabInfo], key: SortKey) -> Vec<TabInfo> {
    let collation = Collation::new();
    let mut keyed: Vec<((String, String), TabInfo)> = tabs
        .iter()
        .map(|tab| (key.collation_key(tab), tab.clone()))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        collation
            .compare(&a.0, &b.0)
            .then_with(|| collation.compare(&a.1, &b.1))
    });

    keyed.into_iter().map(|(_, tab)| tab).collect()
}

/// Moves that put the window's sortable tabs in order.
///
/// `tabs` is the whole window in index order. Grouped tabs are sorted inside
/// their group's range and ungrouped tabs follow the last grouped tab.
/// Without groups the sorted tabs fill the slots sortable tabs occupy now,
/// so pinned tabs and browser pages end where they started.
pub fn plan_sort(tabs: &[TabInfo], key: SortKey) -> Vec<TabMove> {
    let eligible: Vec<&TabInfo> = tabs.iter().filter(|t| is_sortable(t)).collect();
    let place = |block: Vec<TabInfo>, start: usize| {
        sort_tabs(&block, key)
            .into_iter()
            .enumerate()
            .map(move |(offset, tab)| TabMove {
                id: tab.id,
                index: start + offset,
            })
    };

    let mut groups: Vec<(GroupId, Vec<TabInfo>)> = Vec::new();
    let mut ungrouped: Vec<TabInfo> = Vec::new();
    for tab in &eligible {
        match tab.group.group_id() {
            Some(group_id) => match groups.iter_mut().find(|(id, _)| *id == group_id) {
                Some((_, members)) => members.push((*tab).clone()),
                None => groups.push((group_id, vec![(*tab).clone()])),
            },
            None => ungrouped.push((*tab).clone()),
        }
    }

    if groups.is_empty() {
        return place_around_fixed(tabs, sort_tabs(&ungrouped, key));
    }

    let mut moves = Vec::with_capacity(eligible.len());
    let mut last_grouped = 0;
    for (_, members) in groups {
        let start = members.iter().map(|t| t.index).min().unwrap_or_default();
        last_grouped = last_grouped.max(members.iter().map(|t| t.index).max().unwrap_or_default());
        moves.extend(place(members, start));
    }
    moves.extend(place(ungrouped, last_grouped + 1));
    moves
}

/// Moves that turn `tabs` into the layout where `sorted` takes the sortable
/// slots in order.
///
/// Each tab is moved to sit right after its predecessor in the target layout,
/// replaying the browser's remove-then-insert move on a copy of the order.
/// Tabs that stay put never move and every earlier tab already precedes them.
fn place_around_fixed(tabs: &[TabInfo], sorted: Vec<TabInfo>) -> Vec<TabMove> {
    let mut sorted = sorted.into_iter();
    let target: Vec<(TabId, bool)> = tabs
        .iter()
        .map(|tab| {
            if is_sortable(tab) {
                (sorted.next().map_or(tab.id, |t| t.id), true)
            } else {
                (tab.id, false)
            }
        })
        .collect();

    let mut current: Vec<TabId> = tabs.iter().map(|t| t.id).collect();
    let mut moves = Vec::new();
    for (position, &(id, movable)) in target.iter().enumerate() {
        if !movable {
            continue;
        }
        let Some(from) = current.iter().position(|t| *t == id) else {
            continue;
        };
        current.remove(from);
        let index = match position.checked_sub(1) {
            Some(previous) => current
                .iter()
                .position(|t| *t == target[previous].0)
                .map_or(0, |at| at + 1),
            None => 0,
        };
        current.insert(index, id);
        moves.push(TabMove { id, index });
    }
    moves
}

pub struct SortEngine<'a> {
    directory: &'a dyn TabDirectory,
    snapshots: &'a SnapshotStore,
}

impl<'a> SortEngine<'a> {
    pub fn new(directory: &'a dyn TabDirectory, snapshots: &'a SnapshotStore) -> Self {
        SortEngine { directory, snapshots }
    }

    pub async fn sort_by_title(&self) -> Result<SortReport, OrganizeError> {
        self.sort_by(SortKey::Title).await
    }

    pub async fn sort_by_url(&self) -> Result<SortReport, OrganizeError> {
        self.sort_by(SortKey::Url).await
    }

    pub async fn sort_by(&self, key: SortKey) -> Result<SortReport, OrganizeError> {
        self.snapshots
            .capture(self.directory)
            .await
            .map_err(OrganizeError::SortFailed)?;

        let mut tabs = self
            .directory
            .query_tabs()
            .await
            .map_err(OrganizeError::SortFailed)?;
        tabs.sort_by_key(|t| t.index);

        let mut report = SortReport::default();
        for step in plan_sort(&tabs, key) {
            match self.directory.move_tab(step.id, step.index).await {
                Ok(()) => report.moved += 1,
                Err(e) => {
                    warn!("skipping tab during sort: {}", e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "sorted by {:?}: {} moved, {} failed",
            key, report.moved, report.failed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::memory::MemoryWindow;
    use crate::error::TabError;
    use crate::tab_data::GroupRef;
    use futures::executor::block_on;

    fn create_test_tab(id: TabId, url: &str, title: &str) -> TabInfo {
        TabInfo::new(id, url.to_string(), title.to_string(), false, 0)
    }

    fn titled(id: TabId, title: &str) -> TabInfo {
        create_test_tab(id, &format!("https://example.com/{}", id), title)
    }

    fn pinned(id: TabId, title: &str) -> TabInfo {
        TabInfo { pinned: true, ..titled(id, title) }
    }

    fn titles(window: &MemoryWindow) -> Vec<String> {
        window.tabs().into_iter().map(|t| t.title).collect()
    }

    fn sort(window: &MemoryWindow, key: SortKey) -> SortReport {
        let snapshots = SnapshotStore::new();
        block_on(SortEngine::new(window, &snapshots).sort_by(key)).unwrap()
    }

    #[test]
    fn test_sort_key_from_name() {
        assert_eq!(SortKey::from_name("Title"), Some(SortKey::Title));
        assert_eq!(SortKey::from_name(" url "), Some(SortKey::Url));
        assert_eq!(SortKey::from_name("domain"), Some(SortKey::Domain));
        assert_eq!(SortKey::from_name("size"), None);
    }

    #[test]
    fn test_sort_tabs_by_domain() {
        let tabs = vec![
            create_test_tab(1, "https://github.com/rust", "GitHub Rust"),
            create_test_tab(2, "https://www.google.com", "Google"),
            create_test_tab(3, "https://docs.microsoft.com", "Microsoft Docs"),
            create_test_tab(4, "https://mail.google.com", "Gmail"),
        ];

        let sorted = sort_tabs(&tabs, SortKey::Domain);

        let ids: Vec<TabId> = sorted.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 4, 2, 3]);
    }

    #[test]
    fn test_sort_five_tabs_after_two_pinned() {
        let window = MemoryWindow::new(vec![
            pinned(1, "Zebra"),
            pinned(2, "Aardvark"),
            titled(3, "delta"),
            titled(4, "Bravo"),
            titled(5, "alpha"),
            titled(6, "Echo"),
            titled(7, "charlie"),
        ]);

        let report = sort(&window, SortKey::Title);

        assert_eq!(
            titles(&window),
            vec!["Zebra", "Aardvark", "alpha", "Bravo", "charlie", "delta", "Echo"]
        );
        assert_eq!(report, SortReport { moved: 5, failed: 0 });
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let window = MemoryWindow::new(vec![
            titled(3, "Same"),
            titled(4, "same"),
            titled(5, "Other"),
            titled(6, "SAME"),
        ]);

        sort(&window, SortKey::Title);

        assert_eq!(window.tab_ids(), vec![5, 3, 4, 6]);
    }

    #[test]
    fn test_sort_twice_is_idempotent() {
        let window = MemoryWindow::new(vec![
            titled(1, "kiwi"),
            titled(2, "Apple"),
            titled(3, "fig"),
            titled(4, "apple"),
        ]);

        sort(&window, SortKey::Title);
        let once = window.tab_ids();
        sort(&window, SortKey::Title);

        assert_eq!(window.tab_ids(), once);
    }

    #[test]
    fn test_sort_by_url_ignores_case() {
        let window = MemoryWindow::new(vec![
            create_test_tab(1, "https://Zulu.test", "one"),
            create_test_tab(2, "https://alpha.test", "two"),
            create_test_tab(3, "HTTPS://MIKE.test", "three"),
        ]);

        let snapshots = SnapshotStore::new();
        block_on(SortEngine::new(&window, &snapshots).sort_by_url()).unwrap();

        assert_eq!(window.tab_ids(), vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_within_groups() {
        let window = MemoryWindow::new(vec![
            pinned(1, "Pinned"),
            titled(2, "zeta").in_group(7),
            titled(3, "Alpha").in_group(7),
            titled(4, "Yak").in_group(9),
            titled(5, "bee").in_group(9),
            titled(6, "Melon"),
            titled(7, "apple"),
        ]);

        sort(&window, SortKey::Title);

        assert_eq!(
            titles(&window),
            vec!["Pinned", "Alpha", "zeta", "bee", "Yak", "apple", "Melon"]
        );
        let groups: Vec<GroupRef> = window.tabs().iter().map(|t| t.group).collect();
        assert_eq!(
            groups,
            vec![
                GroupRef::Ungrouped,
                GroupRef::Grouped(7),
                GroupRef::Grouped(7),
                GroupRef::Grouped(9),
                GroupRef::Grouped(9),
                GroupRef::Ungrouped,
                GroupRef::Ungrouped,
            ]
        );
    }

    #[test]
    fn test_ungrouped_tabs_land_after_groups() {
        let window = MemoryWindow::new(vec![
            titled(1, "Kiwi"),
            titled(2, "b").in_group(7),
            titled(3, "a").in_group(7),
            titled(4, "Fig"),
        ]);

        sort(&window, SortKey::Title);

        assert_eq!(titles(&window), vec!["a", "b", "Fig", "Kiwi"]);
    }

    #[test]
    fn test_internal_pages_are_not_planned() {
        let tabs = vec![
            create_test_tab(1, "chrome://settings", "Settings"),
            create_test_tab(2, "https://b.test", "b"),
            create_test_tab(3, "https://a.test", "a"),
        ];

        let moves = plan_sort(&tabs, SortKey::Title);

        assert!(moves.iter().all(|m| m.id != 1));
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn test_accented_titles_sort_by_base_letter() {
        let tabs = vec![titled(1, "Zoe"), titled(2, "Émile"), titled(3, "apple")];

        let sorted: Vec<String> = sort_tabs(&tabs, SortKey::Title)
            .into_iter()
            .map(|t| t.title)
            .collect();

        assert_eq!(sorted, vec!["apple", "Émile", "Zoe"]);
    }

    #[test]
    fn test_internal_pages_keep_their_slot() {
        let window = MemoryWindow::new(vec![
            create_test_tab(1, "chrome://settings", "Settings"),
            create_test_tab(2, "https://b.test", "b"),
            create_test_tab(3, "https://a.test", "a"),
        ]);

        sort(&window, SortKey::Title);

        assert_eq!(window.tab_ids(), vec![1, 3, 2]);
    }

    #[test]
    fn test_internal_page_between_tabs_stays_put() {
        let window = MemoryWindow::new(vec![
            pinned(1, "Mail"),
            titled(2, "cherry"),
            create_test_tab(3, "about:blank", "New Tab"),
            titled(4, "apple"),
            titled(5, "banana"),
        ]);

        let report = sort(&window, SortKey::Title);

        assert_eq!(titles(&window), vec!["Mail", "apple", "New Tab", "banana", "cherry"]);
        assert_eq!(report, SortReport { moved: 3, failed: 0 });
    }

    #[test]
    fn test_failed_move_does_not_stop_sort() {
        let window = MemoryWindow::new(vec![titled(1, "c"), titled(2, "b"), titled(3, "a")]);
        window.fail_moves_for.borrow_mut().insert(2);

        let report = sort(&window, SortKey::Title);

        assert_eq!(report, SortReport { moved: 2, failed: 1 });
        assert_eq!(window.moves.get(), 2);
        assert_eq!(window.tabs()[0].title, "a");
    }

    #[test]
    fn test_sort_fails_when_tabs_cannot_be_listed() {
        let window = MemoryWindow::new(vec![titled(1, "a")]);
        window.fail_queries.set(true);
        let snapshots = SnapshotStore::new();

        let result = block_on(SortEngine::new(&window, &snapshots).sort_by_title());

        assert_eq!(
            result,
            Err(OrganizeError::SortFailed(TabError::Query("window closed".to_string())))
        );
        assert!(!snapshots.has_snapshot());
    }
}
