use std::sync::Arc;

use shoutbox_core::flood_control::{Clock, SystemClock};
use shoutbox_core::posts::{InMemoryShoutPostRepository, ShoutPostRepository};
use shoutbox_core::profanity::{FileBanListSource, TextClassifier};
use tracing::info;

use crate::services::{FloodControl, ModuleSettingsStore};
use crate::settings::config::Settings;
use crate::stop_flag;

#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    pub stop_flag: stop_flag::StopFlag,
    pub clock: Arc<dyn Clock>,
    pub posts: Arc<dyn ShoutPostRepository>,
    pub module_settings: ModuleSettingsStore,
    pub flood_control: FloodControl,
    pub classifier: Arc<TextClassifier>,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub async fn new() -> anyhow::Result<SharedAppState> {
        let settings = Settings::new()?;

        let stop_flag = stop_flag::StopFlag::new();
        stop_flag::register_signal_handler(&stop_flag);

        let state = Self::from_parts(settings, Arc::new(SystemClock), stop_flag);
        info!(
            "Profanity word list: {}",
            state.settings.profanity.word_list_path
        );
        Ok(state)
    }

    pub fn new_for_config_only() -> anyhow::Result<SharedAppState> {
        let settings = Settings::new()?;
        Ok(Self::from_parts(
            settings,
            Arc::new(SystemClock),
            stop_flag::StopFlag::new(),
        ))
    }

    /// Wire up the in-memory collaborators around the given settings and clock.
    pub fn from_parts(
        settings: Settings,
        clock: Arc<dyn Clock>,
        stop_flag: stop_flag::StopFlag,
    ) -> SharedAppState {
        let classifier = Arc::new(TextClassifier::new(Arc::new(FileBanListSource::new(
            &settings.profanity.word_list_path,
        ))));

        Arc::new(AppState {
            stop_flag,
            posts: Arc::new(InMemoryShoutPostRepository::new()),
            module_settings: ModuleSettingsStore::new(settings.module_defaults.clone()),
            flood_control: FloodControl::new(clock.clone()),
            classifier,
            clock,
            settings,
        })
    }
}
