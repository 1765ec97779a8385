//! Common types shared across hardware device implementations.
//!
//! This module defines reader metadata, feedback patterns for the
//! buzzer/LED indicator, and the notices shown on the local display.

use rollcall_core::SystemMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Reader information reported by the startup probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Reader name (e.g., "MFRC522", "Mock Reader").
    pub name: String,

    /// Optional firmware/version register value.
    pub firmware_version: Option<String>,
}

impl ReaderInfo {
    /// Create a new ReaderInfo.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// One pulse of a feedback burst: indicator on for `on`, then off for `off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub on: Duration,
    pub off: Duration,
}

impl Pulse {
    const fn ms(on: u64, off: u64) -> Self {
        Self {
            on: Duration::from_millis(on),
            off: Duration::from_millis(off),
        }
    }
}

const TAP_PATTERN: &[Pulse] = &[Pulse::ms(80, 0)];
const GATE_SCAN_PATTERN: &[Pulse] = &[Pulse::ms(60, 40), Pulse::ms(60, 0)];
const DENIED_PATTERN: &[Pulse] = &[Pulse::ms(250, 0)];
const WRONG_ZONE_PATTERN: &[Pulse] = &[Pulse::ms(100, 50), Pulse::ms(100, 50), Pulse::ms(100, 0)];
const APPROVED_PATTERN: &[Pulse] = &[Pulse::ms(150, 0)];

/// One-shot feedback burst played by the indicator.
///
/// Bursts block the scheduler loop while they play, so every pattern is
/// kept well below the sneak window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    /// Normal zone tap accepted.
    Tap,

    /// Credential registered at the gate; waiting for approval.
    GateScan,

    /// Unknown credential rejected.
    Denied,

    /// Zone tap that violates the current mode.
    WrongZone,

    /// Exit approved.
    Approved,
}

impl Feedback {
    /// Pulse sequence for this burst.
    #[must_use]
    pub fn pattern(self) -> &'static [Pulse] {
        match self {
            Self::Tap => TAP_PATTERN,
            Self::GateScan => GATE_SCAN_PATTERN,
            Self::Denied => DENIED_PATTERN,
            Self::WrongZone => WRONG_ZONE_PATTERN,
            Self::Approved => APPROVED_PATTERN,
        }
    }

    /// Total time the burst blocks the caller.
    #[must_use]
    pub fn duration(self) -> Duration {
        self.pattern().iter().map(|p| p.on + p.off).sum()
    }
}

/// Transient message for the local display.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Notice {
    /// Approval wait ran out; the session was dropped.
    RequestExpired { student: String },

    /// Administrator stopped a running alarm.
    ClearedByAdmin { student: String },

    /// Exit approved; gate opening.
    Approved { student: String },

    /// Credential left the gate and did not come back in time.
    Sneaked { student: String },

    /// Zone tap outside the current policy.
    WrongZone { student: String },

    /// Unknown credential rejected at a reader.
    Denied { reader: String },

    /// System mode changed by command.
    ModeChanged(SystemMode),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestExpired { student } => write!(f, "Request expired: {student}"),
            Self::ClearedByAdmin { student } => write!(f, "Alarm cleared by admin: {student}"),
            Self::Approved { student } => write!(f, "Approved: {student}"),
            Self::Sneaked { student } => write!(f, "SNEAKED OUT: {student}"),
            Self::WrongZone { student } => write!(f, "Wrong zone: {student}"),
            Self::Denied { reader } => write!(f, "Unknown card at {reader}"),
            Self::ModeChanged(SystemMode::Class) => write!(f, "Class time"),
            Self::ModeChanged(SystemMode::Free) => write!(f, "Free time"),
        }
    }
}
