pub mod flood_control;
pub mod module_settings;

pub use flood_control::FloodControl;
pub use module_settings::ModuleSettingsStore;
