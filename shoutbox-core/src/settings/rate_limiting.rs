use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Rate limiting configuration error: {message}")]
pub struct RateLimitingValidationError {
    pub message: String,
}

/// Coarse request rate limiting in front of the API.
///
/// This is independent of the per-module flood control, which works on
/// minute-long cooldowns per client and action.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RateLimitingConfig {
    /// Global enable/disable switch for all rate limiting
    #[serde(default)]
    pub enabled: bool,

    /// Limits for reading shouts, keyed by client IP
    #[serde(default)]
    pub public_read: TierConfig,

    /// Limits for posting, replying and voting, keyed by client IP
    #[serde(default)]
    pub public_write: TierConfig,
}

impl RateLimitingConfig {
    pub fn validate(&self) -> Result<(), RateLimitingValidationError> {
        if !self.enabled {
            return Ok(());
        }

        self.public_read
            .validate()
            .map_err(|e| RateLimitingValidationError {
                message: format!("public_read: {}", e.message),
            })?;

        self.public_write
            .validate()
            .map_err(|e| RateLimitingValidationError {
                message: format!("public_write: {}", e.message),
            })?;

        Ok(())
    }
}

/// Configuration for a single rate limiting tier
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TierConfig {
    #[serde(default)]
    pub requests_per_minute: u64,

    /// Maximum requests in a short burst
    #[serde(default)]
    pub burst_size: u32,
}

impl TierConfig {
    /// A tier with a zero rate is switched off.
    pub fn is_enabled(&self) -> bool {
        self.requests_per_minute > 0
    }

    pub fn validate(&self) -> Result<(), RateLimitingValidationError> {
        if self.requests_per_minute == 0 && self.burst_size > 0 {
            return Err(RateLimitingValidationError {
                message: "burst_size must be 0 when requests_per_minute is 0".to_string(),
            });
        }

        if self.requests_per_minute > 0 && self.burst_size == 0 {
            return Err(RateLimitingValidationError {
                message: "burst_size must be greater than 0 when rate limiting is enabled"
                    .to_string(),
            });
        }

        if self.burst_size as u64 > self.requests_per_minute {
            return Err(RateLimitingValidationError {
                message: format!(
                    "burst_size ({}) should not exceed requests_per_minute ({})",
                    self.burst_size, self.requests_per_minute
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(requests_per_minute: u64, burst_size: u32) -> TierConfig {
        TierConfig {
            requests_per_minute,
            burst_size,
        }
    }

    #[test]
    fn test_tier_validation() {
        assert!(tier(60, 10).validate().is_ok());
        assert!(tier(0, 0).validate().is_ok());
        assert!(tier(0, 10).validate().is_err());
        assert!(tier(60, 0).validate().is_err());
        assert!(tier(10, 20).validate().is_err());
    }

    #[test]
    fn test_disabled_config_skips_validation() {
        let config = RateLimitingConfig {
            enabled: false,
            public_write: tier(0, 999),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_error_names_the_failing_tier() {
        let config = RateLimitingConfig {
            enabled: true,
            public_read: tier(600, 100),
            public_write: tier(30, 0),
        };
        let err = config.validate().unwrap_err();
        assert!(err.message.starts_with("public_write:"));
        assert!(!tier(0, 0).is_enabled());
    }
}
