use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, info};

use crate::posts::PostId;
use crate::ModuleId;

/// The kind of throttled action a client attempts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Vote,
    NewPost,
    Reply,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Vote => write!(f, "vote"),
            ActionKind::NewPost => write!(f, "new post"),
            ActionKind::Reply => write!(f, "reply"),
        }
    }
}

/// One permitted and recorded action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloodEvent {
    pub action: ActionKind,
    pub target: Option<PostId>,
    pub timestamp: DateTime<Utc>,
}

impl FloodEvent {
    pub fn new(action: ActionKind, target: Option<PostId>, timestamp: DateTime<Utc>) -> Self {
        Self {
            action,
            target,
            timestamp,
        }
    }

    pub fn matches(&self, action: ActionKind, target: Option<PostId>) -> bool {
        self.action == action && self.target == target
    }

    /// Whole minutes between the event and `now`, truncated toward zero.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.timestamp).num_minutes()
    }
}

/// Recorded events of one client inside one module, in insertion order.
///
/// `horizon_minutes` is the largest cooldown of the policy that last wrote
/// to the history. Events older than that can no longer deny anything and
/// are dropped on the next write or sweep.
#[derive(Debug, Clone, Default)]
pub struct ClientActionHistory {
    events: Vec<FloodEvent>,
    horizon_minutes: i64,
}

impl ClientActionHistory {
    pub fn events(&self) -> &[FloodEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn horizon_minutes(&self) -> i64 {
        self.horizon_minutes
    }

    /// The most recent event for exactly this action and target.
    pub fn latest(&self, action: ActionKind, target: Option<PostId>) -> Option<&FloodEvent> {
        self.events
            .iter()
            .filter(|event| event.matches(action, target))
            .max_by_key(|event| event.timestamp)
    }

    /// Append `event`, dropping everything that fell out of `horizon_minutes`.
    pub fn record(&mut self, event: FloodEvent, horizon_minutes: i64) {
        self.horizon_minutes = horizon_minutes;
        self.evict_expired(event.timestamp);
        self.events.push(event);
    }

    /// Remove the most recently recorded event for this action and target.
    pub fn withdraw(&mut self, action: ActionKind, target: Option<PostId>) -> Option<FloodEvent> {
        let position = self
            .events
            .iter()
            .rposition(|event| event.matches(action, target))?;
        Some(self.events.remove(position))
    }

    /// Drop events whose elapsed minutes exceed the horizon. Returns how many were dropped.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) -> usize {
        let horizon = self.horizon_minutes;
        let before = self.events.len();
        self.events
            .retain(|event| event.elapsed_minutes(now) <= horizon);
        before - self.events.len()
    }
}

/// Registry key: one bucket per client address inside one module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackerKey {
    pub module_id: ModuleId,
    pub client: String,
}

impl TrackerKey {
    pub fn new(module_id: ModuleId, client: impl Into<String>) -> Self {
        Self {
            module_id,
            client: client.into(),
        }
    }
}

impl fmt::Display for TrackerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module_id, self.client)
    }
}

pub(crate) type HistoryHandle = Arc<Mutex<ClientActionHistory>>;

pub(crate) fn lock_history(handle: &HistoryHandle) -> MutexGuard<'_, ClientActionHistory> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared store of every client's action history.
///
/// The outer map lock is only held to find or create a history. Deciding and
/// recording happen under the per-history mutex, so concurrent requests of
/// the same client are serialized while different clients proceed in
/// parallel.
#[derive(Debug, Clone, Default)]
pub struct TrackerRegistry {
    histories: Arc<RwLock<HashMap<TrackerKey, HistoryHandle>>>,
}

impl TrackerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn entry(&self, key: &TrackerKey) -> HistoryHandle {
        {
            let histories = self
                .histories
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(handle) = histories.get(key) {
                return handle.clone();
            }
        }

        let mut histories = self
            .histories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        histories
            .entry(key.clone())
            .or_insert_with(|| {
                debug!("Tracking new client {}", key);
                HistoryHandle::default()
            })
            .clone()
    }

    /// Snapshot of the history stored for `key`, if any.
    pub fn history(&self, key: &TrackerKey) -> Option<ClientActionHistory> {
        let histories = self
            .histories
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        histories
            .get(key)
            .map(|handle| lock_history(handle).clone())
    }

    /// Number of tracked client histories.
    pub fn len(&self) -> usize {
        self.histories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict expired events everywhere and forget clients with nothing left.
    ///
    /// A history is only removed while nobody else holds its handle, so a
    /// request that is about to record into it cannot lose its write.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut histories = self
            .histories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let initial_count = histories.len();
        let mut evicted = 0;

        histories.retain(|key, handle| {
            let mut history = lock_history(handle);
            evicted += history.evict_expired(now);
            let keep = !history.is_empty() || Arc::strong_count(handle) > 1;
            if !keep {
                debug!("Forgetting idle client {}", key);
            }
            keep
        });

        let removed = initial_count - histories.len();
        if evicted > 0 || removed > 0 {
            info!(
                "Flood control sweep evicted {} event(s), forgot {} client(s), {} remaining",
                evicted,
                removed,
                histories.len()
            );
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_elapsed_minutes_truncates() {
        let event = FloodEvent::new(ActionKind::NewPost, None, start());
        assert_eq!(event.elapsed_minutes(start() + Duration::seconds(59)), 0);
        assert_eq!(event.elapsed_minutes(start() + Duration::seconds(119)), 1);
        assert_eq!(event.elapsed_minutes(start() + Duration::hours(2)), 120);
    }

    #[test]
    fn test_latest_picks_newest_exact_match() {
        let mut history = ClientActionHistory::default();
        history.record(FloodEvent::new(ActionKind::Vote, Some(1), start()), 60);
        history.record(
            FloodEvent::new(ActionKind::Vote, Some(2), start() + Duration::minutes(1)),
            60,
        );
        history.record(
            FloodEvent::new(ActionKind::Vote, Some(1), start() + Duration::minutes(5)),
            60,
        );

        let latest = history.latest(ActionKind::Vote, Some(1)).unwrap();
        assert_eq!(latest.timestamp, start() + Duration::minutes(5));
        assert!(history.latest(ActionKind::Reply, Some(1)).is_none());
        assert!(history.latest(ActionKind::Vote, None).is_none());
    }

    #[test]
    fn test_record_evicts_events_beyond_horizon() {
        let mut history = ClientActionHistory::default();
        history.record(FloodEvent::new(ActionKind::Vote, Some(1), start()), 2);
        history.record(
            FloodEvent::new(ActionKind::Vote, Some(2), start() + Duration::minutes(2)),
            2,
        );
        assert_eq!(history.len(), 2);

        history.record(
            FloodEvent::new(ActionKind::Vote, Some(3), start() + Duration::minutes(3)),
            2,
        );
        let targets: Vec<_> = history.events().iter().map(|e| e.target).collect();
        assert_eq!(targets, vec![Some(2), Some(3)]);
    }

    #[test]
    fn test_sweep_forgets_idle_clients() {
        let registry = TrackerRegistry::new();
        let idle = TrackerKey::new(1, "10.0.0.1");
        let active = TrackerKey::new(1, "10.0.0.2");

        lock_history(&registry.entry(&idle))
            .record(FloodEvent::new(ActionKind::NewPost, None, start()), 1);
        lock_history(&registry.entry(&active)).record(
            FloodEvent::new(ActionKind::NewPost, None, start() + Duration::minutes(9)),
            1,
        );

        let evicted = registry.sweep(start() + Duration::minutes(10));
        assert_eq!(evicted, 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.history(&idle).is_none());
        assert_eq!(registry.history(&active).unwrap().len(), 1);
    }

    #[test]
    fn test_sweep_keeps_history_that_is_in_use() {
        let registry = TrackerRegistry::new();
        let key = TrackerKey::new(7, "10.0.0.3");
        let handle = registry.entry(&key);

        registry.sweep(start());
        assert_eq!(registry.len(), 1);

        drop(handle);
        registry.sweep(start());
        assert!(registry.is_empty());
    }
}
