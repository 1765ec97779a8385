//! Sustained alarm with a fixed blink period and bounded duration.
//!
//! The alarm always switches itself off once its duration has run, even
//! if nobody clears it.

use std::time::{Duration, Instant};

use rollcall_hardware::Indicator;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
struct Active {
    started: Instant,
    last_toggle: Instant,
    phase: bool,
}

/// Blinking alarm driven through an [`Indicator`].
#[derive(Debug, Clone)]
pub struct AlarmController {
    blink: Duration,
    duration: Duration,
    active: Option<Active>,
}

impl AlarmController {
    pub fn new(blink: Duration, duration: Duration) -> Self {
        Self {
            blink,
            duration,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Current blink phase; `false` while inactive.
    pub fn phase(&self) -> bool {
        self.active.is_some_and(|a| a.phase)
    }

    /// When the running alarm started.
    pub fn started_at(&self) -> Option<Instant> {
        self.active.map(|a| a.started)
    }

    /// Start (or restart) the alarm with the output on.
    pub fn start<I: Indicator>(&mut self, now: Instant, indicator: &mut I) {
        self.active = Some(Active {
            started: now,
            last_toggle: now,
            phase: true,
        });
        drive(indicator, true);
        info!(duration_ms = self.duration.as_millis() as u64, "Alarm started");
    }

    /// Stop the alarm and switch the output off.
    pub fn stop<I: Indicator>(&mut self, indicator: &mut I) {
        if self.active.take().is_some() {
            drive(indicator, false);
            info!("Alarm stopped");
        }
    }

    /// Advance the blink pattern. Stops the alarm once `duration` has
    /// elapsed since [`start`](Self::start).
    pub fn tick<I: Indicator>(&mut self, now: Instant, indicator: &mut I) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        if now.saturating_duration_since(active.started) >= self.duration {
            self.active = None;
            drive(indicator, false);
            info!("Alarm finished");
            return;
        }

        if now.saturating_duration_since(active.last_toggle) >= self.blink {
            active.phase = !active.phase;
            active.last_toggle = now;
            let phase = active.phase;
            drive(indicator, phase);
        }
    }
}

fn drive<I: Indicator>(indicator: &mut I, on: bool) {
    if let Err(e) = indicator.set_alarm_output(on) {
        warn!(error = %e, on, "Failed to drive alarm output");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_hardware::mock::MockIndicator;

    fn alarm() -> AlarmController {
        AlarmController::new(Duration::from_millis(300), Duration::from_secs(10))
    }

    #[test]
    fn test_start_turns_output_on() {
        let (mut indicator, handle) = MockIndicator::new();
        let mut alarm = alarm();
        let t0 = Instant::now();

        alarm.start(t0, &mut indicator);
        assert!(alarm.is_active());
        assert!(alarm.phase());
        assert!(handle.alarm_output());
        assert_eq!(alarm.started_at(), Some(t0));
    }

    #[test]
    fn test_blinks_at_fixed_period() {
        let (mut indicator, handle) = MockIndicator::new();
        let mut alarm = alarm();
        let t0 = Instant::now();
        alarm.start(t0, &mut indicator);

        alarm.tick(t0 + Duration::from_millis(250), &mut indicator);
        assert!(handle.alarm_output());

        alarm.tick(t0 + Duration::from_millis(300), &mut indicator);
        assert!(!handle.alarm_output());

        alarm.tick(t0 + Duration::from_millis(600), &mut indicator);
        assert!(handle.alarm_output());
    }

    #[test]
    fn test_auto_stops_after_duration() {
        let (mut indicator, handle) = MockIndicator::new();
        let mut alarm = alarm();
        let t0 = Instant::now();
        alarm.start(t0, &mut indicator);

        let mut t = t0;
        while t < t0 + Duration::from_millis(9_950) {
            t += Duration::from_millis(50);
            alarm.tick(t, &mut indicator);
            assert!(alarm.is_active(), "stopped early at {:?}", t - t0);
        }

        alarm.tick(t0 + Duration::from_secs(10), &mut indicator);
        assert!(!alarm.is_active());
        assert!(!handle.alarm_output());
    }

    #[test]
    fn test_stop_is_immediate() {
        let (mut indicator, handle) = MockIndicator::new();
        let mut alarm = alarm();
        let t0 = Instant::now();
        alarm.start(t0, &mut indicator);

        alarm.stop(&mut indicator);
        assert!(!alarm.is_active());
        assert!(!handle.alarm_output());

        // Ticking an inactive alarm does nothing.
        alarm.tick(t0 + Duration::from_secs(1), &mut indicator);
        assert!(!handle.alarm_output());
    }
}
