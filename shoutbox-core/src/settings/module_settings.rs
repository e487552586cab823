use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::throttle::{
    ThrottlePolicy, DEFAULT_FLOOD_NEW_POST, DEFAULT_FLOOD_REPLY, DEFAULT_FLOOD_VOTE,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsValidationError {
    #[error("number_of_posts_to_return must be greater than 0")]
    NoPostsToReturn,
}

/// Where avatars next to a shout come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProfileImage {
    #[default]
    Gravatar,
    Host,
}

/// Per-module configuration, editable by editors at runtime.
///
/// Flood values are cooldowns in whole minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ModuleSettings {
    pub allow_anonymous: bool,
    pub flood_new_post: i64,
    pub flood_reply: i64,
    pub flood_voting: i64,
    pub profile_image: ProfileImage,
    pub number_of_posts_to_return: usize,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            allow_anonymous: false,
            flood_new_post: DEFAULT_FLOOD_NEW_POST,
            flood_reply: DEFAULT_FLOOD_REPLY,
            flood_voting: DEFAULT_FLOOD_VOTE,
            profile_image: ProfileImage::default(),
            number_of_posts_to_return: 20,
        }
    }
}

impl ModuleSettings {
    pub fn throttle_policy(&self) -> ThrottlePolicy {
        ThrottlePolicy {
            new_post: self.flood_new_post,
            reply: self.flood_reply,
            vote: self.flood_voting,
        }
    }

    pub fn validate(&self) -> Result<(), SettingsValidationError> {
        if self.number_of_posts_to_return == 0 {
            return Err(SettingsValidationError::NoPostsToReturn);
        }
        Ok(())
    }
}
