use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::contract::model::Press;

/// In-memory mirror of the press log: total count and most recent press.
///
/// Lock-free. The two fields are updated independently, so a snapshot may pair
/// a count with a `last_press` from a neighbouring commit.
#[derive(Debug, Default)]
pub struct ButtonStateCache {
    presses: AtomicI64,
    last_press: ArcSwapOption<Press>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    pub press_count: i64,
    pub last_press: Option<Press>,
}

impl ButtonStateCache {
    pub fn seeded(press_count: i64, last_press: Option<Press>) -> Self {
        Self {
            presses: AtomicI64::new(press_count),
            last_press: ArcSwapOption::from(last_press.map(Arc::new)),
        }
    }

    /// Count one more committed press; returns the new count.
    pub fn increment(&self) -> i64 {
        self.presses.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn press_count(&self) -> i64 {
        self.presses.load(Ordering::Acquire)
    }

    /// Replace `last_press` if `press` is strictly newer (or nothing is recorded yet).
    /// Returns whether the candidate was stored.
    pub fn record_if_newer(&self, press: Press) -> bool {
        let new_time = press.time_millis;
        let candidate = Some(Arc::new(press));
        let mut current = self.last_press.load_full();

        loop {
            if let Some(cur) = &current {
                if cur.time_millis >= new_time {
                    return false;
                }
            }

            let prev = self.last_press.compare_and_swap(&current, candidate.clone());
            if same_press(&prev, &current) {
                return true;
            }
            // Lost the race: re-check against whatever won.
            current = (*prev).clone();
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            press_count: self.press_count(),
            last_press: self.last_press.load_full().map(|p| (*p).clone()),
        }
    }
}

fn same_press(a: &Option<Arc<Press>>, b: &Option<Arc<Press>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
