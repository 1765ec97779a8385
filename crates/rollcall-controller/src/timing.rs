//! Timing windows of the controller.

use std::time::Duration;

use rollcall_core::constants::{
    DEFAULT_ALARM_BLINK_MS, DEFAULT_ALARM_DURATION_MS, DEFAULT_APPROVAL_TIMEOUT_MS,
    DEFAULT_GATE_OPEN_MS, DEFAULT_SETTLE_US, DEFAULT_SNEAK_WINDOW_MS, DEFAULT_STATUS_INTERVAL_MS,
    DEFAULT_TICK_MS,
};

use crate::error::{ControllerError, Result};

/// Every duration the controller and its scheduler depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Scheduler loop period.
    pub tick: Duration,
    /// Longest wait for an administrator after a gate tap.
    pub approval_timeout: Duration,
    /// Grace period after the credential leaves the gate reader.
    pub sneak_window: Duration,
    /// How long the gate stays open after approval.
    pub gate_open: Duration,
    /// Total length of a sustained alarm.
    pub alarm_duration: Duration,
    /// Half-period of the alarm blink.
    pub alarm_blink: Duration,
    /// Period of the unsolicited `status` event.
    pub status_interval: Duration,
    /// Reader front-end settle time per poll.
    pub settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            approval_timeout: Duration::from_millis(DEFAULT_APPROVAL_TIMEOUT_MS),
            sneak_window: Duration::from_millis(DEFAULT_SNEAK_WINDOW_MS),
            gate_open: Duration::from_millis(DEFAULT_GATE_OPEN_MS),
            alarm_duration: Duration::from_millis(DEFAULT_ALARM_DURATION_MS),
            alarm_blink: Duration::from_millis(DEFAULT_ALARM_BLINK_MS),
            status_interval: Duration::from_millis(DEFAULT_STATUS_INTERVAL_MS),
            settle: Duration::from_micros(DEFAULT_SETTLE_US),
        }
    }
}

impl Timing {
    /// Check that every window is non-zero. The settle time may be zero.
    ///
    /// # Errors
    /// Returns `ControllerError::InvalidTiming` naming the first zero value.
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("tick", self.tick),
            ("approval_timeout", self.approval_timeout),
            ("sneak_window", self.sneak_window),
            ("gate_open", self.gate_open),
            ("alarm_duration", self.alarm_duration),
            ("alarm_blink", self.alarm_blink),
            ("status_interval", self.status_interval),
        ];
        match windows.into_iter().find(|(_, value)| value.is_zero()) {
            Some((name, _)) => Err(ControllerError::InvalidTiming { name }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let timing = Timing::default();
        assert_eq!(timing.approval_timeout, Duration::from_secs(20));
        assert_eq!(timing.sneak_window, Duration::from_secs(5));
        assert_eq!(timing.alarm_duration, Duration::from_secs(10));
        assert_eq!(timing.alarm_blink, Duration::from_millis(300));
        assert!(timing.validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let timing = Timing {
            sneak_window: Duration::ZERO,
            ..Timing::default()
        };
        assert!(matches!(
            timing.validate(),
            Err(ControllerError::InvalidTiming { name: "sneak_window" })
        ));
    }

    #[test]
    fn test_zero_settle_allowed() {
        let timing = Timing {
            settle: Duration::ZERO,
            ..Timing::default()
        };
        assert!(timing.validate().is_ok());
    }
}
