use std::{collections::HashMap, sync::Arc};

use shoutbox_core::settings::module_settings::{ModuleSettings, SettingsValidationError};
use shoutbox_core::ModuleId;
use tokio::sync::RwLock;
use tracing::{info, instrument};

/// Per-module settings saved at runtime, falling back to the configured defaults.
#[derive(Debug, Clone)]
pub struct ModuleSettingsStore {
    defaults: ModuleSettings,
    saved: Arc<RwLock<HashMap<ModuleId, ModuleSettings>>>,
}

impl ModuleSettingsStore {
    pub fn new(defaults: ModuleSettings) -> Self {
        Self {
            defaults,
            saved: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get(&self, module_id: ModuleId) -> ModuleSettings {
        self.saved
            .read()
            .await
            .get(&module_id)
            .cloned()
            .unwrap_or_else(|| self.defaults.clone())
    }

    #[instrument(skip(self))]
    pub async fn save(
        &self,
        module_id: ModuleId,
        settings: ModuleSettings,
    ) -> Result<(), SettingsValidationError> {
        settings.validate()?;
        self.saved.write().await.insert(module_id, settings);
        info!("Saved settings for module {}", module_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_until_saved() {
        let defaults = ModuleSettings {
            flood_new_post: 4,
            ..Default::default()
        };
        let store = ModuleSettingsStore::new(defaults.clone());
        assert_eq!(store.get(1).await, defaults);

        let saved = ModuleSettings {
            allow_anonymous: true,
            number_of_posts_to_return: 5,
            ..Default::default()
        };
        store.save(1, saved.clone()).await.unwrap();
        assert_eq!(store.get(1).await, saved);
        assert_eq!(store.get(2).await, defaults);
    }

    #[tokio::test]
    async fn test_invalid_settings_are_not_saved() {
        let store = ModuleSettingsStore::new(ModuleSettings::default());
        let invalid = ModuleSettings {
            number_of_posts_to_return: 0,
            ..Default::default()
        };

        assert_eq!(
            store.save(1, invalid).await,
            Err(SettingsValidationError::NoPostsToReturn)
        );
        assert_eq!(store.get(1).await, ModuleSettings::default());
    }
}
