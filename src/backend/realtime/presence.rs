//! Presence Tracker
//!
//! Reference-counts live sessions per identity. Only the 0→1 and 1→0
//! crossings are transitions: a user with two open tabs who closes one
//! stays online, and no spurious `userOffline` is emitted.

use std::collections::HashMap;
use std::sync::Mutex;

/// Identity → live-session count
///
/// The mutex guards plain counter arithmetic and is never held across an
/// await point.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    counts: Mutex<HashMap<String, usize>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new live session. Returns true when the identity just came
    /// online (count crossed 0→1).
    pub fn connect(&self, user_id: &str) -> bool {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(user_id.to_string()).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Record a closed session. Returns true when the identity just went
    /// offline (count crossed 1→0).
    pub fn disconnect(&self, user_id: &str) -> bool {
        let mut counts = self.counts.lock().unwrap();
        match counts.get_mut(user_id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                counts.remove(user_id);
                true
            }
            // disconnect without a matching connect; nothing to transition
            None => false,
        }
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.counts.lock().unwrap().contains_key(user_id)
    }

    /// Number of identities with at least one live session
    pub fn online_count(&self) -> usize {
        self.counts.lock().unwrap().len()
    }
}
