/// Extension settings and category list, persisted in chrome.storage.local
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::BackendConfig;
use crate::category::CategorySet;
use crate::error::StorageError;

pub const SETTINGS_KEY: &str = "tab_organizer_settings";
pub const CATEGORIES_KEY: &str = "tab_organizer_categories";

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_CUSTOM_PROMPT: &str =
    "You help organize browser tabs by the topic of the page they show.";

/// Durable key-value storage
#[async_trait(?Send)]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// User settings; missing fields fall back to their defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionSettings {
    pub backend: BackendConfig,
    pub custom_prompt: String,
    pub timeout_seconds: u64,
}

impl ExtensionSettings {
    /// Per-call model timeout, never shorter than one second
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        ExtensionSettings {
            backend: BackendConfig::default(),
            custom_prompt: DEFAULT_CUSTOM_PROMPT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

pub struct SettingsStore<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> SettingsStore<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        SettingsStore { store }
    }

    pub async fn settings(&self) -> Result<ExtensionSettings, StorageError> {
        match self.store.get(SETTINGS_KEY).await? {
            Some(value) if !value.is_null() => Ok(serde_json::from_value(value)?),
            _ => Ok(ExtensionSettings::default()),
        }
    }

    pub async fn save_settings(&self, settings: &ExtensionSettings) -> Result<(), StorageError> {
        self.store.set(SETTINGS_KEY, serde_json::to_value(settings)?).await
    }

    /// Configured categories, or the built-in list when none are stored
    pub async fn categories(&self) -> Result<CategorySet, StorageError> {
        let stored = match self.store.get(CATEGORIES_KEY).await? {
            Some(value) if !value.is_null() => serde_json::from_value::<CategorySet>(value)?,
            _ => return Ok(CategorySet::default()),
        };
        if stored.is_empty() {
            Ok(CategorySet::default())
        } else {
            Ok(stored)
        }
    }

    pub async fn set_categories(&self, categories: &CategorySet) -> Result<(), StorageError> {
        self.store
            .set(CATEGORIES_KEY, serde_json::to_value(categories)?)
            .await
    }

    pub async fn reset_categories(&self) -> Result<CategorySet, StorageError> {
        let defaults = CategorySet::default();
        self.set_categories(&defaults).await?;
        Ok(defaults)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    pub struct MemoryStore {
        pub values: RefCell<HashMap<String, Value>>,
    }

    #[async_trait(?Send)]
    impl KeyValueStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
            Ok(self.values.borrow().get(key).cloned())
        }

        async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
            self.values.borrow_mut().insert(key.to_string(), value);
            Ok(())
        }
    }
}
