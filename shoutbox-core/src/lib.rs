pub mod flood_control;
pub mod posts;
pub mod profanity;
pub mod settings;

/// Identifier of a shoutbox module instance on a page.
pub type ModuleId = i64;
