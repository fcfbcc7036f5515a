/// Undo: put the window back the way the last snapshot saw it
use std::collections::HashSet;

use log::{info, warn};

use crate::directory::TabDirectory;
use crate::snapshot::SnapshotStore;
use crate::tab_data::{GroupId, SnapshotTab, TabId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored { tabs: usize, groups: usize },
    NoOp,
    Failed(String),
}

impl RestoreOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RestoreOutcome::Restored { .. })
    }
}

/// Snapshot tabs batched by their recorded group, in order of first appearance
fn recorded_groups(tabs: &[&SnapshotTab]) -> Vec<(GroupId, Vec<TabId>)> {
    let mut groups: Vec<(GroupId, Vec<TabId>)> = Vec::new();
    for tab in tabs {
        let Some(group_id) = tab.group.group_id() else {
            continue;
        };
        match groups.iter_mut().find(|(id, _)| *id == group_id) {
            Some((_, ids)) => ids.push(tab.id),
            None => groups.push((group_id, vec![tab.id])),
        }
    }
    groups
}

pub struct UndoController<'a> {
    directory: &'a dyn TabDirectory,
    snapshots: &'a SnapshotStore,
}

impl<'a> UndoController<'a> {
    pub fn new(directory: &'a dyn TabDirectory, snapshots: &'a SnapshotStore) -> Self {
        UndoController { directory, snapshots }
    }

    pub fn can_undo(&self) -> bool {
        self.snapshots.has_snapshot()
    }

    /// Best effort: tabs closed since the snapshot are skipped, single move or
    /// group failures are logged, and nothing is rolled back.
    pub async fn restore(&self) -> RestoreOutcome {
        let Some(snapshot) = self.snapshots.peek() else {
            info!("nothing to undo");
            return RestoreOutcome::NoOp;
        };

        let live = match self.directory.query_tabs().await {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!("undo failed: {}", e);
                return RestoreOutcome::Failed(e.to_string());
            }
        };
        let live_ids: HashSet<TabId> = live.iter().map(|t| t.id).collect();
        let valid: Vec<&SnapshotTab> = snapshot
            .tabs
            .iter()
            .filter(|t| live_ids.contains(&t.id))
            .collect();
        if valid.is_empty() {
            warn!("undo failed: every tab in snapshot {} is gone", snapshot.id);
            self.snapshots.clear();
            return RestoreOutcome::Failed("nothing to restore".to_string());
        }

        let grouped: Vec<TabId> = live
            .iter()
            .filter(|t| t.group.is_grouped())
            .map(|t| t.id)
            .collect();
        if !grouped.is_empty() {
            if let Err(e) = self.directory.ungroup_tabs(&grouped).await {
                warn!("undo failed: {}", e);
                return RestoreOutcome::Failed(e.to_string());
            }
        }

        for tab in &valid {
            if let Err(e) = self.directory.move_tab(tab.id, tab.index).await {
                warn!("skipping tab during undo: {}", e);
            }
        }

        let mut groups = 0;
        for (recorded_id, ids) in recorded_groups(&valid) {
            let group_id = match self.directory.group_tabs(&ids).await {
                Ok(group_id) => group_id,
                Err(e) => {
                    warn!("could not recreate group {}: {}", recorded_id, e);
                    continue;
                }
            };
            if let Some(style) = snapshot.groups.get(&recorded_id) {
                if let Err(e) = self
                    .directory
                    .update_group(group_id, &style.title, style.color)
                    .await
                {
                    warn!("could not restyle group {:?}: {}", style.title, e);
                }
            }
            groups += 1;
        }

        self.snapshots.clear();
        info!(
            "restored snapshot {}: {} tabs, {} groups",
            snapshot.id,
            valid.len(),
            groups
        );
        RestoreOutcome::Restored {
            tabs: valid.len(),
            groups,
        }
    }
}
