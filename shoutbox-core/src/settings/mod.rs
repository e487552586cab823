pub mod api_server;
pub mod module_settings;
pub mod profanity;
pub mod rate_limiting;
pub mod scheduler_interval;
pub mod throttle;
pub mod trusted_proxy;
