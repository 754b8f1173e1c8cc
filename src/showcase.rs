//! Rotating "Top Picks" banner.
//!
//! Driven by the main loop's clock rather than a timer of its own: call
//! [`Showcase::tick`] with the current instant every frame and the index
//! advances once per elapsed interval.

use std::time::{Duration, Instant};

use crate::source::Movie;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug)]
pub struct Showcase {
    items: Vec<Movie>,
    index: usize,
    interval: Duration,
    next_tick: Option<Instant>,
}

impl Showcase {
    pub fn new(interval: Duration) -> Self {
        Self {
            items: Vec::new(),
            index: 0,
            interval: interval.max(Duration::from_millis(1)),
            next_tick: None,
        }
    }

    /// Replace the sequence, restarting from the first item.  An empty
    /// sequence stops the rotation.
    pub fn set_items(&mut self, items: Vec<Movie>, now: Instant) {
        self.items = items;
        self.index = 0;
        self.next_tick = if self.items.is_empty() {
            None
        } else {
            Some(now + self.interval)
        };
    }

    /// Advance if the interval has elapsed.  Returns whether it moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_tick else {
            return false;
        };
        if now < due || self.items.is_empty() {
            return false;
        }

        self.index = (self.index + 1) % self.items.len();
        let next = due + self.interval;
        // After a stall, resume from now instead of replaying missed ticks.
        self.next_tick = Some(if next <= now { now + self.interval } else { next });
        true
    }

    pub fn current(&self) -> Option<&Movie> {
        self.items.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub fn is_scheduled(&self) -> bool {
        self.next_tick.is_some()
    }
}
