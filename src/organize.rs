/// Content-based grouping: label every eligible tab, then group tabs by label
use std::cell::Cell;
use std::sync::LazyLock;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, info, warn};
use regex::Regex;
use serde::Serialize;

use crate::backend::ModelBackend;
use crate::category::{CategorySet, FALLBACK_LABEL};
use crate::directory::{ContentExtractor, TabDirectory};
use crate::domain::{host_label, is_error_page};
use crate::error::OrganizeError;
use crate::gateway::Gateway;
use crate::snapshot::SnapshotStore;
use crate::sort::is_sortable;
use crate::tab_data::{GroupColor, TabId, TabInfo, TabStatus};
use crate::timer::Timer;

/// Tabs analyzed concurrently
pub const BATCH_SIZE: usize = 5;

static LOAD_ERROR_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(can.t be reached|isn.t available|problem loading page|^\d{3}\s+(not found|internal server error|bad gateway|service unavailable)|^(page )?not found$|\berr_[a-z_]+)",
    )
    .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizePhase {
    Idle,
    Snapshotting,
    Analyzing,
    Grouping,
    Done,
    Failed,
}

pub struct OrganizeRequest<'a> {
    pub backend: &'a dyn ModelBackend,
    pub categories: &'a CategorySet,
    pub custom_prompt: &'a str,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrganizeReport {
    pub analyzed: usize,
    /// Tabs labelled without a model answer
    pub fallbacks: usize,
    /// (label, tab count) of every group created, in creation order
    pub groups: Vec<(String, usize)>,
    pub failed_groups: usize,
}

struct TabLabel {
    id: TabId,
    label: String,
    fallback: bool,
}

/// Label for a tab that is not worth analyzing, if it is one
pub fn unusable_tab_label(tab: &TabInfo) -> Option<String> {
    let unusable = is_error_page(&tab.url)
        || tab.status == TabStatus::Loading
        || LOAD_ERROR_TITLE.is_match(tab.title.trim());
    unusable.then(|| host_label(&tab.url).unwrap_or_else(|| FALLBACK_LABEL.to_string()))
}

/// Tab ids per label, labels in order of first appearance
fn collect_groups(labels: &[TabLabel]) -> Vec<(String, Vec<TabId>)> {
    let mut groups: Vec<(String, Vec<TabId>)> = Vec::new();
    for tab in labels {
        match groups.iter_mut().find(|(label, _)| *label == tab.label) {
            Some((_, ids)) => ids.push(tab.id),
            None => groups.push((tab.label.clone(), vec![tab.id])),
        }
    }
    groups
}

pub struct OrganizeEngine<'a> {
    directory: &'a dyn TabDirectory,
    extractor: &'a dyn ContentExtractor,
    snapshots: &'a SnapshotStore,
    timer: &'a dyn Timer,
    phase: Cell<OrganizePhase>,
}

impl<'a> OrganizeEngine<'a> {
    pub fn new(
        directory: &'a dyn TabDirectory,
        extractor: &'a dyn ContentExtractor,
        snapshots: &'a SnapshotStore,
        timer: &'a dyn Timer,
    ) -> Self {
        OrganizeEngine {
            directory,
            extractor,
            snapshots,
            timer,
            phase: Cell::new(OrganizePhase::Idle),
        }
    }

    pub fn phase(&self) -> OrganizePhase {
        self.phase.get()
    }

    fn enter(&self, phase: OrganizePhase) {
        debug!("organize: {:?} -> {:?}", self.phase.get(), phase);
        self.phase.set(phase);
    }

    fn fail(&self, error: OrganizeError) -> OrganizeError {
        self.enter(OrganizePhase::Failed);
        error
    }

    /// Model calls run five tabs at a time. Only failing to list the window's
    /// tabs aborts the run; a failing tab or group is logged and skipped.
    pub async fn organize_by_content(
        &self,
        request: &OrganizeRequest<'_>,
    ) -> Result<OrganizeReport, OrganizeError> {
        self.enter(OrganizePhase::Snapshotting);
        self.snapshots
            .capture(self.directory)
            .await
            .map_err(|e| self.fail(OrganizeError::OrganizeFailed(e)))?;

        let tabs = self
            .directory
            .query_tabs()
            .await
            .map_err(|e| self.fail(OrganizeError::OrganizeFailed(e)))?;
        let eligible: Vec<TabInfo> = tabs.into_iter().filter(is_sortable).collect();
        if eligible.is_empty() {
            return Err(self.fail(OrganizeError::NothingToOrganize));
        }

        self.enter(OrganizePhase::Analyzing);
        let gateway = Gateway {
            backend: request.backend,
            timer: self.timer,
            categories: request.categories,
            custom_prompt: request.custom_prompt,
            timeout: request.timeout,
        };
        let mut labels = Vec::with_capacity(eligible.len());
        for (number, batch) in eligible.chunks(BATCH_SIZE).enumerate() {
            debug!("analyzing batch {} ({} tabs)", number + 1, batch.len());
            let batch_labels = join_all(batch.iter().map(|tab| self.label_tab(tab, &gateway))).await;
            labels.extend(batch_labels);
        }

        self.enter(OrganizePhase::Grouping);
        let mut report = OrganizeReport {
            analyzed: labels.len(),
            fallbacks: labels.iter().filter(|l| l.fallback).count(),
            ..OrganizeReport::default()
        };
        for (label, ids) in collect_groups(&labels) {
            let group_id = match self.directory.group_tabs(&ids).await {
                Ok(group_id) => group_id,
                Err(e) => {
                    warn!("could not create group {:?}: {}", label, e);
                    report.failed_groups += 1;
                    continue;
                }
            };
            if let Err(e) = self
                .directory
                .update_group(group_id, &label, GroupColor::for_label(&label))
                .await
            {
                warn!("could not style group {:?}: {}", label, e);
            }
            report.groups.push((label, ids.len()));
        }

        self.enter(OrganizePhase::Done);
        info!(
            "organized {} tabs into {} groups ({} fallbacks)",
            report.analyzed,
            report.groups.len(),
            report.fallbacks
        );
        Ok(report)
    }

    async fn label_tab(&self, tab: &TabInfo, gateway: &Gateway<'_>) -> TabLabel {
        if let Some(label) = unusable_tab_label(tab) {
            debug!("tab {} is not analyzable, labelled {}", tab.id, label);
            return TabLabel {
                id: tab.id,
                label,
                fallback: true,
            };
        }

        let excerpt = self.extractor.extract_excerpt(tab).await;
        let categorization = gateway.categorize(&excerpt).await;
        if let Some(reason) = &categorization.fallback {
            debug!("tab {} labelled offline: {}", tab.id, reason);
        }
        TabLabel {
            id: tab.id,
            label: categorization.label,
            fallback: categorization.fallback.is_some(),
        }
    }

    /// Dissolve every group in the window; the previous layout stays undoable
    pub async fn ungroup_all(&self) -> Result<usize, OrganizeError> {
        self.snapshots
            .capture(self.directory)
            .await
            .map_err(OrganizeError::UngroupFailed)?;

        let tabs = self
            .directory
            .query_tabs()
            .await
            .map_err(OrganizeError::UngroupFailed)?;
        let grouped: Vec<TabId> = tabs
            .iter()
            .filter(|t| t.group.is_grouped())
            .map(|t| t.id)
            .collect();
        if grouped.is_empty() {
            return Ok(0);
        }

        self.directory
            .ungroup_tabs(&grouped)
            .await
            .map_err(OrganizeError::UngroupFailed)?;
        info!("ungrouped {} tabs", grouped.len());
        Ok(grouped.len())
    }
}
