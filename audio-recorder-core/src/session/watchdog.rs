use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Whether the periodic tick should be rescheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    Continue,
    Stop,
}

/// Stops the recording once the playback position passes a limit.
///
/// Polled from the event loop. After returning `Stop` once, the watchdog
/// is disarmed: later ticks return `Stop` without querying the position.
pub struct DurationWatchdog {
    limit: Duration,
    armed: AtomicBool,
    ticks: AtomicU64,
}

impl DurationWatchdog {
    /// `None` for a zero limit; a zero-length recording is not a bound.
    pub fn new(limit: Duration) -> Option<Self> {
        if limit.is_zero() {
            return None;
        }
        Some(Self {
            limit,
            armed: AtomicBool::new(true),
            ticks: AtomicU64::new(0),
        })
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// `query` returns the current position, or `None` if the stream is
    /// not positioned yet (treated as "not exceeded").
    pub fn on_tick<F>(&self, query: F) -> TickDecision
    where
        F: FnOnce() -> Option<Duration>,
    {
        if !self.armed.load(Ordering::Acquire) {
            return TickDecision::Stop;
        }
        self.ticks.fetch_add(1, Ordering::Relaxed);

        let Some(position) = query() else {
            log::debug!("Position not available yet");
            return TickDecision::Continue;
        };
        log::info!("Position: {}", position.as_secs());

        if position > self.limit && self.armed.swap(false, Ordering::AcqRel) {
            log::info!("Recording stopped after {} seconds", self.limit.as_secs());
            return TickDecision::Stop;
        }
        TickDecision::Continue
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Number of ticks that queried the position.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Option<Duration> {
        Some(Duration::from_secs(s))
    }

    #[test]
    fn zero_limit_is_not_armed() {
        assert!(DurationWatchdog::new(Duration::ZERO).is_none());
    }

    #[test]
    fn stops_on_first_tick_past_limit() {
        let watchdog = DurationWatchdog::new(Duration::from_secs(5)).unwrap();
        let positions = [secs(1), secs(2), secs(3), secs(4), secs(5), secs(6)];

        let decisions: Vec<TickDecision> = positions.iter().map(|p| watchdog.on_tick(|| *p)).collect();

        assert!(decisions[..5].iter().all(|d| *d == TickDecision::Continue));
        assert_eq!(decisions[5], TickDecision::Stop);
        assert!(!watchdog.is_armed());
    }

    #[test]
    fn reaching_limit_exactly_is_not_exceeding() {
        let watchdog = DurationWatchdog::new(Duration::from_secs(5)).unwrap();
        assert_eq!(watchdog.on_tick(|| secs(5)), TickDecision::Continue);
    }

    #[test]
    fn unavailable_position_continues() {
        let watchdog = DurationWatchdog::new(Duration::from_secs(1)).unwrap();
        assert_eq!(watchdog.on_tick(|| None), TickDecision::Continue);
        assert!(watchdog.is_armed());
    }

    #[test]
    fn disarmed_watchdog_does_not_query() {
        let watchdog = DurationWatchdog::new(Duration::from_secs(1)).unwrap();
        assert_eq!(watchdog.on_tick(|| secs(2)), TickDecision::Stop);

        let decision = watchdog.on_tick(|| panic!("queried after stop"));

        assert_eq!(decision, TickDecision::Stop);
        assert_eq!(watchdog.ticks(), 1);
    }
}
