//! Core constants for the rollcall controller.
//!
//! This module centralizes the timing windows and credential limits used
//! throughout the workspace. Configuration files may override the timing
//! values; the constants here are the defaults applied when a key is absent.
//!
//! # Timing Windows
//!
//! | Constant | Default | Purpose |
//! |----------|---------|---------|
//! | [`DEFAULT_TICK_MS`] | 50 ms | Scheduler loop period |
//! | [`DEFAULT_APPROVAL_TIMEOUT_MS`] | 20 s | Maximum wait for administrative approval |
//! | [`DEFAULT_SNEAK_WINDOW_MS`] | 5 s | Grace period after the credential leaves the gate reader |
//! | [`DEFAULT_GATE_OPEN_MS`] | 5 s | Time the gate actuator stays open after approval |
//! | [`DEFAULT_ALARM_DURATION_MS`] | 10 s | Total duration of a sustained alarm |
//! | [`DEFAULT_ALARM_BLINK_MS`] | 300 ms | Alarm indicator toggle period |
//! | [`DEFAULT_STATUS_INTERVAL_MS`] | 5 s | Periodic status snapshot interval |
//!
//! # Usage
//!
//! ```
//! use rollcall_core::constants::*;
//! use std::time::Duration;
//!
//! let window = Duration::from_millis(DEFAULT_SNEAK_WINDOW_MS);
//! assert_eq!(window.as_secs(), 5);
//! ```

// ============================================================================
// Scheduler
// ============================================================================

/// Scheduler loop period in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 50;

/// Reader settle interval in microseconds.
///
/// Time between enabling a reader's antenna and issuing the wake command.
/// Determined by the reader front-end; shorter values cause missed reads.
pub const DEFAULT_SETTLE_US: u64 = 500;

// ============================================================================
// Gate Authorization Windows
// ============================================================================

/// Maximum time a gate session waits for administrative approval.
pub const DEFAULT_APPROVAL_TIMEOUT_MS: u64 = 20_000;

/// Grace period after the session credential leaves the gate reader.
///
/// The sneak alarm fires only when the elapsed time is strictly greater
/// than this window.
pub const DEFAULT_SNEAK_WINDOW_MS: u64 = 5_000;

/// Duration the gate actuator stays open after an approval.
pub const DEFAULT_GATE_OPEN_MS: u64 = 5_000;

// ============================================================================
// Alarm
// ============================================================================

/// Total duration of a sustained alarm before it stops by itself.
pub const DEFAULT_ALARM_DURATION_MS: u64 = 10_000;

/// Toggle period of the alarm indicator.
pub const DEFAULT_ALARM_BLINK_MS: u64 = 300;

// ============================================================================
// Event Stream
// ============================================================================

/// Interval between periodic status snapshots.
pub const DEFAULT_STATUS_INTERVAL_MS: u64 = 5_000;

/// Maximum accepted length of one inbound command line in bytes.
pub const MAX_COMMAND_LINE: usize = 256;

// ============================================================================
// Credentials
// ============================================================================

/// Minimum credential UID length in bytes (ISO 14443 single size UID).
pub const MIN_UID_LENGTH: usize = 4;

/// Maximum credential UID length in bytes (ISO 14443 triple size UID).
pub const MAX_UID_LENGTH: usize = 10;

// ============================================================================
// Diagnostics
// ============================================================================

/// Number of gate state transitions kept for diagnostics.
pub const MAX_HISTORY_SIZE: usize = 100;
