/// chrome.* adapters for the extension build
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::backend::ModelBackend;
use crate::directory::{ContentExtractor, TabDirectory};
use crate::error::{BackendError, StorageError, TabError};
use crate::gateway::{EXCERPT_UNAVAILABLE, truncate_chars};
use crate::settings::KeyValueStore;
use crate::tab_data::{GroupColor, GroupId, GroupInfo, TabId, TabInfo};
use crate::timer::Timer;

/// Longest page excerpt collected from a tab, in characters
pub const MAX_PAGE_EXCERPT_CHARS: usize = 1000;

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryTabs() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryGroups() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn moveTab(tab_id: i32, index: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn groupTabs(tab_ids: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn ungroupTabs(tab_ids: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateGroup(group_id: i32, title: &str, color: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn extractExcerpt(tab_id: i32, limit: u32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn promptLocalModel(prompt: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn delay(ms: u32) -> Result<(), JsValue>;
}

fn js_error(error: JsValue) -> String {
    error.as_string().unwrap_or_else(|| format!("{:?}", error))
}

fn tab_ids_to_js(ids: &[TabId]) -> Result<JsValue, String> {
    serde_wasm_bindgen::to_value(ids).map_err(|e| format!("Failed to serialize: {:?}", e))
}

/// The current window through chrome.tabs and chrome.tabGroups
pub struct ChromeTabs;

#[async_trait(?Send)]
impl TabDirectory for ChromeTabs {
    async fn query_tabs(&self) -> Result<Vec<TabInfo>, TabError> {
        let tabs_js = queryTabs().await.map_err(|e| TabError::Query(js_error(e)))?;
        let mut tabs: Vec<TabInfo> = serde_wasm_bindgen::from_value(tabs_js)
            .map_err(|e| TabError::Query(format!("Failed to parse tabs: {:?}", e)))?;
        tabs.sort_by_key(|t| t.index);
        Ok(tabs)
    }

    async fn query_groups(&self) -> Result<Vec<GroupInfo>, TabError> {
        let groups_js = queryGroups().await.map_err(|e| TabError::Query(js_error(e)))?;
        serde_wasm_bindgen::from_value(groups_js)
            .map_err(|e| TabError::Query(format!("Failed to parse groups: {:?}", e)))
    }

    async fn move_tab(&self, id: TabId, index: usize) -> Result<(), TabError> {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        moveTab(id, index).await.map_err(|e| TabError::Move {
            id,
            reason: js_error(e),
        })
    }

    async fn group_tabs(&self, ids: &[TabId]) -> Result<GroupId, TabError> {
        let ids_js = tab_ids_to_js(ids).map_err(TabError::Group)?;
        let group_js = groupTabs(ids_js).await.map_err(|e| TabError::Group(js_error(e)))?;
        group_js
            .as_f64()
            .map(|id| id as GroupId)
            .ok_or_else(|| TabError::Group("browser returned no group id".to_string()))
    }

    async fn ungroup_tabs(&self, ids: &[TabId]) -> Result<(), TabError> {
        let ids_js = tab_ids_to_js(ids).map_err(TabError::Ungroup)?;
        ungroupTabs(ids_js).await.map_err(|e| TabError::Ungroup(js_error(e)))
    }

    async fn update_group(&self, id: GroupId, title: &str, color: GroupColor) -> Result<(), TabError> {
        updateGroup(id, title, color.as_str())
            .await
            .map_err(|e| TabError::UpdateGroup {
                id,
                reason: js_error(e),
            })
    }
}

/// Reads page text through chrome.scripting
pub struct PageExtractor;

#[async_trait(?Send)]
impl ContentExtractor for PageExtractor {
    async fn extract_excerpt(&self, tab: &TabInfo) -> String {
        let unavailable = || format!("{} {} {}", EXCERPT_UNAVAILABLE, tab.title, tab.url);
        match extractExcerpt(tab.id, MAX_PAGE_EXCERPT_CHARS as u32).await {
            Ok(text) => match text.as_string().filter(|t| !t.trim().is_empty()) {
                Some(text) => truncate_chars(&text, MAX_PAGE_EXCERPT_CHARS).to_string(),
                None => unavailable(),
            },
            Err(e) => {
                debug!("cannot read tab {}: {}", tab.id, js_error(e));
                unavailable()
            }
        }
    }
}

/// The browser's built-in language model
pub struct LocalModel;

#[async_trait(?Send)]
impl ModelBackend for LocalModel {
    async fn infer(&self, prompt: &str) -> Result<String, BackendError> {
        let answer = promptLocalModel(prompt)
            .await
            .map_err(|e| BackendError::Unavailable(js_error(e)))?;
        answer
            .as_string()
            .ok_or_else(|| BackendError::Malformed("built-in model returned no text".to_string()))
    }

    fn name(&self) -> &str {
        "built-in model"
    }
}

/// setTimeout-backed timer
pub struct JsTimer;

#[async_trait(?Send)]
impl Timer for JsTimer {
    async fn sleep(&self, duration: Duration) {
        let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        if let Err(e) = delay(ms).await {
            debug!("timer failed: {}", js_error(e));
        }
    }
}

/// chrome.storage.local
pub struct ChromeStorage;

#[async_trait(?Send)]
impl KeyValueStore for ChromeStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let value_js = getStorage(key)
            .await
            .map_err(|e| StorageError::Access(js_error(e)))?;
        if value_js.is_null() || value_js.is_undefined() {
            return Ok(None);
        }
        serde_wasm_bindgen::from_value(value_js)
            .map(Some)
            .map_err(|e| StorageError::Access(format!("Failed to parse storage: {:?}", e)))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let value_js = value
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| StorageError::Access(format!("Failed to serialize storage: {:?}", e)))?;
        setStorage(key, value_js)
            .await
            .map_err(|e| StorageError::Access(js_error(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::with_deadline;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    async fn test_js_timer_resolves() {
        JsTimer.sleep(Duration::from_millis(5)).await;
    }

    #[wasm_bindgen_test]
    async fn test_js_timer_bounds_pending_call() {
        let result = with_deadline(
            &JsTimer,
            Duration::from_millis(10),
            futures::future::pending::<()>(),
        )
        .await;
        assert_eq!(result, None);
    }
}
