use std::sync::Arc;
use tracing::debug;

use super::clock::Clock;
use super::registry::{lock_history, ActionKind, FloodEvent, TrackerKey, TrackerRegistry};
use crate::posts::PostId;
use crate::settings::throttle::ThrottlePolicy;

/// Decides whether one client may vote, post or reply right now.
///
/// A limiter is built per request with the client's key, its privilege and
/// the module's throttle policy. The history it reads and writes lives in
/// the shared [`TrackerRegistry`].
#[derive(Debug, Clone)]
pub struct RateLimiter {
    registry: TrackerRegistry,
    clock: Arc<dyn Clock>,
    key: TrackerKey,
    elevated: bool,
    policy: ThrottlePolicy,
}

impl RateLimiter {
    pub fn new(
        registry: TrackerRegistry,
        clock: Arc<dyn Clock>,
        key: TrackerKey,
        elevated: bool,
        policy: ThrottlePolicy,
    ) -> Self {
        Self {
            registry,
            clock,
            key,
            elevated,
            policy,
        }
    }

    pub fn allow_vote(&self, post_id: PostId) -> bool {
        self.allow(ActionKind::Vote, Some(post_id))
    }

    pub fn allow_new_post(&self) -> bool {
        self.allow(ActionKind::NewPost, None)
    }

    pub fn allow_reply(&self, post_id: PostId) -> bool {
        self.allow(ActionKind::Reply, Some(post_id))
    }

    /// Permit and record the action, or deny it without leaving a trace.
    ///
    /// Elapsed time is truncated to whole minutes before it is compared, and
    /// the comparison is strict: waiting exactly the cooldown is not enough.
    pub fn allow(&self, action: ActionKind, target: Option<PostId>) -> bool {
        if self.elevated {
            debug!("Flood control bypassed for {} ({})", self.key, action);
            return true;
        }

        let handle = self.registry.entry(&self.key);
        let mut history = lock_history(&handle);
        let now = self.clock.now();
        let threshold = self.policy.threshold(action);

        let permitted = match history.latest(action, target) {
            None => true,
            Some(last) => last.elapsed_minutes(now) > threshold,
        };

        if permitted {
            history.record(
                FloodEvent::new(action, target, now),
                self.policy.max_threshold(),
            );
        }

        debug!(
            "Flood control {} {} on {:?} for {} (cooldown {}m)",
            if permitted { "permitted" } else { "denied" },
            action,
            target,
            self.key,
            threshold
        );

        permitted
    }

    /// Give back a permit whose action could not be carried out.
    ///
    /// Removes the event the last successful [`allow`](Self::allow) recorded
    /// for this action and target, so the client is not held to a cooldown
    /// for something that never happened.
    pub fn release(&self, action: ActionKind, target: Option<PostId>) {
        if self.elevated {
            return;
        }

        let handle = self.registry.entry(&self.key);
        if lock_history(&handle).withdraw(action, target).is_some() {
            debug!("Flood control released {} on {:?} for {}", action, target, self.key);
        }
    }

    pub fn release_vote(&self, post_id: PostId) {
        self.release(ActionKind::Vote, Some(post_id))
    }
}
