/// Data structures for Tab Organizer
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Browser-assigned tab identifier, valid for one browser session
pub type TabId = i32;

/// Browser-assigned tab group identifier
pub type GroupId = i32;

/// The value `chrome.tabs` uses for "not in a group"
const TAB_GROUP_ID_NONE: i32 = -1;

/// Group membership of a tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum GroupRef {
    Grouped(GroupId),
    #[default]
    Ungrouped,
}

impl GroupRef {
    pub fn group_id(self) -> Option<GroupId> {
        match self {
            GroupRef::Grouped(id) => Some(id),
            GroupRef::Ungrouped => None,
        }
    }

    pub fn is_grouped(self) -> bool {
        matches!(self, GroupRef::Grouped(_))
    }
}

impl From<i32> for GroupRef {
    fn from(raw: i32) -> Self {
        if raw < 0 {
            GroupRef::Ungrouped
        } else {
            GroupRef::Grouped(raw)
        }
    }
}

impl From<GroupRef> for i32 {
    fn from(group: GroupRef) -> i32 {
        group.group_id().unwrap_or(TAB_GROUP_ID_NONE)
    }
}

/// Loading state reported by the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Loading,
    #[default]
    Complete,
    Unloaded,
}

/// Information about a browser tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    pub index: usize,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(rename = "groupId", default)]
    pub group: GroupRef,
    #[serde(default)]
    pub status: TabStatus,
}

impl TabInfo {
    pub fn new(id: TabId, url: String, title: String, pinned: bool, index: usize) -> TabInfo {
        TabInfo {
            id,
            index,
            url,
            title,
            pinned,
            group: GroupRef::Ungrouped,
            status: TabStatus::Complete,
        }
    }

    pub fn in_group(mut self, group: GroupId) -> TabInfo {
        self.group = GroupRef::Grouped(group);
        self
    }

    pub fn with_status(mut self, status: TabStatus) -> TabInfo {
        self.status = status;
        self
    }
}

/// Fixed tab group palette, in `chrome.tabGroups.Color` order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    #[default]
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

impl GroupColor {
    pub const PALETTE: [GroupColor; 9] = [
        GroupColor::Grey,
        GroupColor::Blue,
        GroupColor::Red,
        GroupColor::Yellow,
        GroupColor::Green,
        GroupColor::Pink,
        GroupColor::Purple,
        GroupColor::Cyan,
        GroupColor::Orange,
    ];

    /// Deterministic color for a category label.
    ///
    /// Hashes the UTF-16 code units with the classic `h * 31 + c` string hash
    /// in wrapping 32-bit arithmetic and reduces `|h|` modulo the palette size,
    /// so a label keeps its color across runs.
    pub fn for_label(label: &str) -> GroupColor {
        let hash = label
            .encode_utf16()
            .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32));
        let slot = hash.unsigned_abs() as usize % Self::PALETTE.len();
        Self::PALETTE[slot]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GroupColor::Grey => "grey",
            GroupColor::Blue => "blue",
            GroupColor::Red => "red",
            GroupColor::Yellow => "yellow",
            GroupColor::Green => "green",
            GroupColor::Pink => "pink",
            GroupColor::Purple => "purple",
            GroupColor::Cyan => "cyan",
            GroupColor::Orange => "orange",
        }
    }
}

/// A live tab group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: GroupId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub color: GroupColor,
}

/// Title and color of a group at capture time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStyle {
    pub title: String,
    pub color: GroupColor,
}

/// A tab as recorded in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTab {
    pub id: TabId,
    pub index: usize,
    pub url: String,
    pub title: String,
    pub group: GroupRef,
}

/// Point-in-time recording of a window's tab order and group layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub timestamp: f64,
    pub tabs: Vec<SnapshotTab>,
    pub groups: HashMap<GroupId, GroupStyle>,
}
