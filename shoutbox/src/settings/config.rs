use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use shoutbox_core::settings::{
    api_server::ApiServer, module_settings::ModuleSettings, profanity::ProfanitySettings,
    scheduler_interval::SchedulerInterval,
};
use std::env;

#[derive(Debug, Deserialize, Clone)]
#[allow(unused)]
#[readonly::make]
pub struct Scheduler {
    /// How often idle flood-control histories are swept.
    pub tracker_sweep: SchedulerInterval,
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler {
            tracker_sweep: SchedulerInterval::Minutes(5),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[allow(unused)]
pub struct Settings {
    pub telemetry: Option<String>,
    pub api: ApiServer,
    #[serde(default)]
    pub profanity: ProfanitySettings,
    /// Settings for modules that never saved their own.
    #[serde(default)]
    pub module_defaults: ModuleSettings,
    #[serde(default)]
    pub scheduler: Scheduler,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            telemetry: None,
            api: ApiServer::default(),
            profanity: ProfanitySettings::default(),
            module_defaults: ModuleSettings::default(),
            scheduler: Scheduler::default(),
        }
    }
}

impl Settings {
    pub fn get_environment() -> Environment {
        Environment::default()
            .prefix("SHOUTBOX")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("SHOUTBOX_RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("api.bind_address", "0.0.0.0:21380")?
            .set_default("api.max_body_size", "64K")?
            .set_default("scheduler.tracker_sweep", "5m")?
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Self::get_environment());

        Self::from_config(builder.build()?)
    }

    /// Deserialize and validate an already layered configuration.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let mut settings: Settings = config.try_deserialize()?;

        // Special strings allow disabling telemetry via environment variables,
        // even if it is set in the default config.
        settings.telemetry = settings.check_if_optional(&settings.telemetry);

        settings
            .api
            .rate_limiting
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        settings
            .module_defaults
            .validate()
            .map_err(|e| ConfigError::Message(format!("module_defaults: {e}")))?;

        Ok(settings)
    }

    pub fn traces_enabled(&self) -> bool {
        self.telemetry
            .as_ref()
            .map(|settings| settings.to_lowercase().split(',').any(|s| s == "traces"))
            .unwrap_or(false)
    }

    fn check_if_optional(&self, s: &Option<String>) -> Option<String> {
        match s {
            None => None,
            Some(s) => match s.to_lowercase().as_str() {
                "no" | "false" | "0" | "" => None,
                _ => Some(s.to_string()),
            },
        }
    }
}
