use serde::{Deserialize, Serialize};

use crate::flood_control::ActionKind;

pub const DEFAULT_FLOOD_NEW_POST: i64 = 1;
pub const DEFAULT_FLOOD_REPLY: i64 = 2;
pub const DEFAULT_FLOOD_VOTE: i64 = 2;

/// Cooldowns in minutes, one per action kind.
///
/// Negative values are accepted and mean "always permit".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottlePolicy {
    pub new_post: i64,
    pub reply: i64,
    pub vote: i64,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            new_post: DEFAULT_FLOOD_NEW_POST,
            reply: DEFAULT_FLOOD_REPLY,
            vote: DEFAULT_FLOOD_VOTE,
        }
    }
}

impl ThrottlePolicy {
    pub fn threshold(&self, action: ActionKind) -> i64 {
        match action {
            ActionKind::NewPost => self.new_post,
            ActionKind::Reply => self.reply,
            ActionKind::Vote => self.vote,
        }
    }

    pub fn max_threshold(&self) -> i64 {
        self.new_post.max(self.reply).max(self.vote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = ThrottlePolicy::default();
        assert_eq!(policy.threshold(ActionKind::NewPost), 1);
        assert_eq!(policy.threshold(ActionKind::Reply), 2);
        assert_eq!(policy.threshold(ActionKind::Vote), 2);
        assert_eq!(policy.max_threshold(), 2);
    }

    #[test]
    fn test_max_threshold_with_negative_values() {
        let policy = ThrottlePolicy {
            new_post: -5,
            reply: -1,
            vote: -3,
        };
        assert_eq!(policy.max_threshold(), -1);
    }
}
