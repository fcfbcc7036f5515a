/// Functions the popup and settings page call through wasm-bindgen
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::prelude::*;

use crate::bridge::{ChromeStorage, ChromeTabs, JsTimer, PageExtractor};
use crate::category::CategorySet;
use crate::organize::{OrganizeEngine, OrganizeRequest};
use crate::settings::SettingsStore;
use crate::snapshot::SnapshotStore;
use crate::sort::{SortEngine, SortKey};
use crate::undo::{RestoreOutcome, UndoController};

thread_local! {
    static SNAPSHOTS: Rc<SnapshotStore> = Rc::new(SnapshotStore::new());
}

fn snapshot_store() -> Rc<SnapshotStore> {
    SNAPSHOTS.with(Rc::clone)
}

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn serialize<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&format!("Failed to serialize: {:?}", e)))
}

/// Sort the current window by "title", "url" or "domain"
#[wasm_bindgen]
pub async fn sort_tabs(key: String) -> Result<JsValue, JsValue> {
    let sort_key = SortKey::from_name(&key).ok_or_else(|| JsValue::from_str(&format!("unknown sort key: {}", key)))?;
    let snapshots = snapshot_store();
    let report = SortEngine::new(&ChromeTabs, &snapshots)
        .sort_by(sort_key)
        .await
        .map_err(to_js)?;
    serialize(&report)
}

#[wasm_bindgen]
pub async fn organize_tabs() -> Result<JsValue, JsValue> {
    let settings_store = SettingsStore::new(&ChromeStorage);
    let settings = settings_store.settings().await.map_err(to_js)?;
    let categories = settings_store.categories().await.map_err(to_js)?;
    let backend = settings.backend.connect();
    let request = OrganizeRequest {
        backend: backend.as_ref(),
        categories: &categories,
        custom_prompt: &settings.custom_prompt,
        timeout: settings.timeout(),
    };

    let snapshots = snapshot_store();
    let engine = OrganizeEngine::new(&ChromeTabs, &PageExtractor, &snapshots, &JsTimer);
    let report = engine.organize_by_content(&request).await.map_err(to_js)?;
    serialize(&report)
}

/// Returns how many tabs left their group
#[wasm_bindgen]
pub async fn ungroup_all_tabs() -> Result<u32, JsValue> {
    let snapshots = snapshot_store();
    let engine = OrganizeEngine::new(&ChromeTabs, &PageExtractor, &snapshots, &JsTimer);
    let count = engine.ungroup_all().await.map_err(to_js)?;
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Restore the last snapshot; false when there was nothing to restore or it failed
#[wasm_bindgen]
pub async fn undo_last() -> bool {
    let snapshots = snapshot_store();
    match UndoController::new(&ChromeTabs, &snapshots).restore().await {
        RestoreOutcome::Restored { tabs, groups } => {
            info!("undo restored {} tabs in {} groups", tabs, groups);
            true
        }
        RestoreOutcome::NoOp => false,
        RestoreOutcome::Failed(reason) => {
            warn!("undo failed: {}", reason);
            false
        }
    }
}

#[wasm_bindgen]
pub fn can_undo() -> bool {
    snapshot_store().has_snapshot()
}

#[wasm_bindgen]
pub async fn get_categories() -> Result<JsValue, JsValue> {
    let categories = SettingsStore::new(&ChromeStorage).categories().await.map_err(to_js)?;
    serialize(&categories)
}

/// Store a new category list; returns it normalized
#[wasm_bindgen]
pub async fn set_categories(labels: JsValue) -> Result<JsValue, JsValue> {
    let labels: Vec<String> = serde_wasm_bindgen::from_value(labels)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse categories: {:?}", e)))?;
    let categories = CategorySet::new(labels);
    if categories.is_empty() {
        return Err(JsValue::from_str("at least one category is required"));
    }
    SettingsStore::new(&ChromeStorage)
        .set_categories(&categories)
        .await
        .map_err(to_js)?;
    serialize(&categories)
}

#[wasm_bindgen]
pub async fn reset_categories() -> Result<JsValue, JsValue> {
    let categories = SettingsStore::new(&ChromeStorage)
        .reset_categories()
        .await
        .map_err(to_js)?;
    serialize(&categories)
}
