use std::{collections::BTreeMap, time::Duration};

use packet_rush_core::{Command, Timer};

/// Timer that reached its deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Due {
    /// Timer that fired.
    pub timer: Timer,
    /// Virtual time at which it fired.
    pub deadline: Duration,
    /// Time between arming and firing.
    pub elapsed: Duration,
}

impl Due {
    /// Tick command the fired timer delivers to the world.
    #[must_use]
    pub fn command(&self) -> Command {
        match self.timer {
            Timer::Movement => Command::MovementTick,
            Timer::Spawn => Command::SpawnTick {
                elapsed: self.elapsed,
            },
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Armed {
    at: Duration,
    deadline: Duration,
}

/// Virtual-clock scheduler holding at most one pending arm per timer.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    pending: BTreeMap<Timer, Armed>,
}

impl TimerQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `timer` to fire `delay` after `now`, replacing any pending arm.
    pub fn arm(&mut self, timer: Timer, delay: Duration, now: Duration) {
        let armed = Armed {
            at: now,
            deadline: now.saturating_add(delay),
        };
        let _ = self.pending.insert(timer, armed);
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.values().map(|armed| armed.deadline).min()
    }

    /// Removes and returns the earliest timer due at `now`, if any.
    pub fn pop_next(&mut self, now: Duration) -> Option<Due> {
        let (timer, armed) = self
            .pending
            .iter()
            .filter(|(_, armed)| armed.deadline <= now)
            .min_by_key(|(timer, armed)| (armed.deadline, **timer))
            .map(|(timer, armed)| (*timer, *armed))?;
        let _ = self.pending.remove(&timer);
        Some(Due {
            timer,
            deadline: armed.deadline,
            elapsed: armed.deadline.saturating_sub(armed.at),
        })
    }

    /// Drops every pending arm.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
