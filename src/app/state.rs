// SPDX-License-Identifier: GPL-3.0-only

//! Booth state that is not owned by a subsystem

use crate::constants::capture::FLASH_AT_SECONDS;

/// What a countdown step produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// Seconds still to go
    Remaining(u32),
    /// Flash cue, one second before capture
    Flash,
    /// Countdown finished and the still was captured
    Captured,
    /// Countdown finished but capture failed
    CaptureFailed,
}

/// A running capture countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self { remaining: seconds }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advance one second
    ///
    /// Returns the event for the new remaining time; `None` means zero was
    /// reached and the caller should capture.
    pub fn step(&mut self) -> Option<CountdownEvent> {
        self.remaining = self.remaining.saturating_sub(1);
        match self.remaining {
            0 => None,
            r if r == FLASH_AT_SECONDS => Some(CountdownEvent::Flash),
            r => Some(CountdownEvent::Remaining(r)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_second_countdown_sequence() {
        let mut countdown = Countdown::new(5);
        let events: Vec<_> = std::iter::from_fn(|| countdown.step()).collect();
        assert_eq!(
            events,
            vec![
                CountdownEvent::Remaining(4),
                CountdownEvent::Remaining(3),
                CountdownEvent::Remaining(2),
                CountdownEvent::Flash,
            ]
        );
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn test_one_second_countdown_captures_immediately() {
        let mut countdown = Countdown::new(1);
        assert_eq!(countdown.step(), None);
    }
}
