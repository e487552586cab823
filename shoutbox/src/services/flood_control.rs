use std::sync::Arc;

use shoutbox_core::flood_control::{Clock, RateLimiter, TrackerKey, TrackerRegistry};
use shoutbox_core::settings::throttle::ThrottlePolicy;
use shoutbox_core::ModuleId;
use tracing::instrument;

/// Process-wide flood control shared by all request handlers.
#[derive(Debug, Clone)]
pub struct FloodControl {
    registry: TrackerRegistry,
    clock: Arc<dyn Clock>,
}

impl FloodControl {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: TrackerRegistry::new(),
            clock,
        }
    }

    /// A limiter for one request, scoped to the module and client address.
    pub fn limiter_for(
        &self,
        module_id: ModuleId,
        client: &str,
        elevated: bool,
        policy: ThrottlePolicy,
    ) -> RateLimiter {
        RateLimiter::new(
            self.registry.clone(),
            self.clock.clone(),
            TrackerKey::new(module_id, client),
            elevated,
            policy,
        )
    }

    /// Drop expired events and idle histories. Returns the number of evicted events.
    #[instrument(skip(self))]
    pub fn sweep(&self) -> usize {
        self.registry.sweep(self.clock.now())
    }

    pub fn tracked_clients(&self) -> usize {
        self.registry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoutbox_core::flood_control::ManualClock;

    #[test]
    fn test_limiters_share_the_registry() {
        let clock = ManualClock::default();
        let flood_control = FloodControl::new(Arc::new(clock.clone()));
        let policy = ThrottlePolicy::default();

        assert!(flood_control
            .limiter_for(1, "10.0.0.1", false, policy)
            .allow_new_post());
        assert!(!flood_control
            .limiter_for(1, "10.0.0.1", false, policy)
            .allow_new_post());
        assert!(flood_control
            .limiter_for(2, "10.0.0.1", false, policy)
            .allow_new_post());
        assert_eq!(flood_control.tracked_clients(), 2);

        clock.advance(chrono::Duration::minutes(10));
        assert_eq!(flood_control.sweep(), 2);
        assert_eq!(flood_control.tracked_clients(), 0);
    }
}
