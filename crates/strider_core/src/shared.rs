//! Shared ownership for state touched by event listeners

use parking_lot::Mutex;
use std::sync::Arc;

/// State reachable both from the tick loop and from bus listeners.
///
/// Everything runs on one logic thread, so the mutex is never contended;
/// it only has to make listeners `Send`.
pub type Shared<T> = Arc<Mutex<T>>;

/// Wrap a value for sharing with listeners
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}
