//! Flood control for shoutbox actions
//!
//! Every permitted vote, new post and reply is recorded per client and
//! module. A new attempt of the same kind against the same target is only
//! permitted once more whole minutes than the module's cooldown have passed.
//! Editors bypass the check entirely and leave nothing behind.

mod clock;
mod limiter;
mod registry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use limiter::RateLimiter;
pub use registry::{ActionKind, ClientActionHistory, FloodEvent, TrackerKey, TrackerRegistry};
