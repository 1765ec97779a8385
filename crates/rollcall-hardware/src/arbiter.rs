//! Bus arbitration for readers sharing one bus.
//!
//! The [`BusArbiter`] is the sole owner of the [`ReaderBus`]. Each poll runs
//! one exclusive transaction:
//!
//! ```text
//! deselect all ─► select target ─► antenna on ─► settle ─► WUPA
//!                                                           │
//!                 deselect all ◄─ antenna off ◄─ HLTA ◄─────┘ (card found)
//!                       ▲              ▲
//!                       └──────────────┴──────── always, even on error
//! ```
//!
//! An idle reader with its antenna on energizes cards held over a
//! neighboring reader and halts them mid-session. The arbiter therefore
//! never returns with an antenna enabled, and it uses the wake primitive so
//! cards halted by earlier cross-talk are still detected.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rollcall_core::{Credential, ReaderId};
use tracing::{debug, info, trace, warn};

use crate::error::{HardwareError, Result};
use crate::traits::{CardPoller, ReaderBus};
use crate::types::ReaderInfo;

/// Per-reader counters kept by the arbiter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Reader answered the startup probe.
    pub available: bool,

    /// Probe result, if the reader answered.
    pub info: Option<ReaderInfo>,

    /// Poll transactions issued.
    pub polls: u64,

    /// Polls that returned a credential.
    pub detections: u64,

    /// Polls that ended in a hardware error.
    pub errors: u64,

    /// Wall-clock time of the last detection.
    pub last_detection: Option<DateTime<Utc>>,
}

/// Exclusive owner of the reader bus.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use rollcall_core::{Credential, ReaderId};
/// use rollcall_hardware::{BusArbiter, CardPoller};
/// use rollcall_hardware::mock::MockBus;
///
/// let (bus, handle) = MockBus::new();
/// let mut arbiter = BusArbiter::new(bus, Duration::from_micros(500));
///
/// let card = Credential::from_hex("04A1B2C3").unwrap();
/// handle.present(ReaderId::Classroom, card);
///
/// assert_eq!(arbiter.poll(ReaderId::Classroom), Some(card));
/// assert_eq!(arbiter.poll(ReaderId::Gate), None);
/// assert!(!handle.any_antenna_enabled());
/// ```
pub struct BusArbiter<B: ReaderBus> {
    bus: B,
    settle: Duration,
    stats: [ReaderStats; 3],
}

impl<B: ReaderBus> BusArbiter<B> {
    /// Take ownership of `bus`, force every reader idle, and probe each one.
    ///
    /// A reader that fails its probe is marked unavailable and is never
    /// polled again. This is not fatal.
    pub fn new(bus: B, settle: Duration) -> Self {
        let mut arbiter = Self {
            bus,
            settle,
            stats: Default::default(),
        };
        arbiter.reset_all();
        for reader in ReaderId::ALL {
            arbiter.probe(reader);
        }
        arbiter
    }

    /// Returns `true` if `reader` passed its startup probe.
    pub fn is_available(&self, reader: ReaderId) -> bool {
        self.stats[reader.index()].available
    }

    /// Counters for `reader`.
    pub fn stats(&self, reader: ReaderId) -> &ReaderStats {
        &self.stats[reader.index()]
    }

    /// Number of readers that passed the startup probe.
    pub fn available_count(&self) -> usize {
        self.stats.iter().filter(|s| s.available).count()
    }

    fn reset_all(&mut self) {
        self.bus.deselect_all();
        for reader in ReaderId::ALL {
            if let Err(e) = self.bus.set_antenna(reader, false) {
                warn!(reader = %reader, error = %e, "Failed to disable antenna");
            }
        }
    }

    fn probe(&mut self, reader: ReaderId) {
        self.bus.deselect_all();
        self.bus.select(reader);
        let result = self.bus.probe(reader);
        self.bus.deselect_all();

        let stats = &mut self.stats[reader.index()];
        match result {
            Ok(info) => {
                info!(
                    reader = %reader,
                    name = %info.name,
                    firmware = ?info.firmware_version,
                    "Reader ready"
                );
                stats.available = true;
                stats.info = Some(info);
            }
            Err(e) => {
                warn!(reader = %reader, error = %e, "Reader failed probe, disabled");
                stats.available = false;
            }
        }
    }

    /// Run the exclusive part of a poll. Leaves the antenna and select line
    /// to the caller to release.
    fn transact(&mut self, reader: ReaderId) -> Result<Option<Credential>> {
        self.bus.deselect_all();
        self.bus.select(reader);
        self.bus.set_antenna(reader, true)?;
        self.bus.settle(self.settle);

        let Some(uid) = self.bus.wake()? else {
            return Ok(None);
        };
        // Any card that answered is halted, even one with a malformed UID.
        if let Err(e) = self.bus.halt() {
            debug!(reader = %reader, error = %e, "Halt failed");
        }
        let credential =
            Credential::new(&uid).map_err(|e| HardwareError::card_read(e.to_string()))?;
        Ok(Some(credential))
    }

    fn release(&mut self, reader: ReaderId) {
        if let Err(e) = self.bus.set_antenna(reader, false) {
            warn!(reader = %reader, error = %e, "Failed to disable antenna");
        }
        self.bus.deselect_all();
    }
}

impl<B: ReaderBus> CardPoller for BusArbiter<B> {
    fn poll(&mut self, reader: ReaderId) -> Option<Credential> {
        if !self.is_available(reader) {
            return None;
        }

        let result = self.transact(reader);
        self.release(reader);

        let stats = &mut self.stats[reader.index()];
        stats.polls += 1;
        match result {
            Ok(Some(credential)) => {
                let now = Utc::now();
                stats.detections += 1;
                stats.last_detection = Some(now);
                trace!(
                    reader = %reader,
                    credential = %credential,
                    detected_at = %now.to_rfc3339(),
                    "Credential detected"
                );
                Some(credential)
            }
            Ok(None) => None,
            Err(e) => {
                stats.errors += 1;
                debug!(reader = %reader, error = %e, "Poll failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{BusOp, MockBus};

    fn card(hex: &str) -> Credential {
        Credential::from_hex(hex).unwrap()
    }

    fn arbiter() -> (BusArbiter<MockBus>, crate::mock::MockBusHandle) {
        let (bus, handle) = MockBus::new();
        (BusArbiter::new(bus, Duration::from_micros(500)), handle)
    }

    #[test]
    fn test_poll_returns_card_on_target_reader_only() {
        let (mut arbiter, handle) = arbiter();
        handle.present(ReaderId::Hostel, card("0A0B0C0D"));

        assert_eq!(arbiter.poll(ReaderId::Gate), None);
        assert_eq!(arbiter.poll(ReaderId::Classroom), None);
        assert_eq!(arbiter.poll(ReaderId::Hostel), Some(card("0A0B0C0D")));
    }

    #[test]
    fn test_poll_sequence_deselects_before_select() {
        let (mut arbiter, handle) = arbiter();
        handle.present(ReaderId::Gate, card("01020304"));
        handle.clear_ops();

        arbiter.poll(ReaderId::Gate);

        let ops = handle.ops();
        assert_eq!(
            ops,
            vec![
                BusOp::DeselectAll,
                BusOp::Select(ReaderId::Gate),
                BusOp::Antenna(ReaderId::Gate, true),
                BusOp::Settle,
                BusOp::Wake,
                BusOp::Halt,
                BusOp::Antenna(ReaderId::Gate, false),
                BusOp::DeselectAll,
            ]
        );
    }

    #[test]
    fn test_antenna_disabled_after_every_outcome() {
        let (mut arbiter, handle) = arbiter();

        // Nothing present
        arbiter.poll(ReaderId::Classroom);
        assert!(!handle.any_antenna_enabled());

        // Card present
        handle.present(ReaderId::Classroom, card("01020304"));
        arbiter.poll(ReaderId::Classroom);
        assert!(!handle.any_antenna_enabled());

        // Read error
        handle.fail_reads(ReaderId::Classroom, true);
        assert_eq!(arbiter.poll(ReaderId::Classroom), None);
        assert!(!handle.any_antenna_enabled());
        assert_eq!(handle.selected(), None);
        assert_eq!(arbiter.stats(ReaderId::Classroom).errors, 1);
    }

    #[test]
    fn test_halted_card_is_still_detected() {
        let (mut arbiter, handle) = arbiter();
        handle.present(ReaderId::Gate, card("01020304"));

        assert!(arbiter.poll(ReaderId::Gate).is_some());
        assert!(handle.is_halted(ReaderId::Gate));
        assert!(arbiter.poll(ReaderId::Gate).is_some());
    }

    #[test]
    fn test_no_bus_contention_across_readers() {
        let (mut arbiter, handle) = arbiter();
        handle.present(ReaderId::Gate, card("01020304"));
        handle.present(ReaderId::Classroom, card("05060708"));
        handle.present(ReaderId::Hostel, card("090A0B0C"));

        for _ in 0..10 {
            for reader in ReaderId::ALL {
                arbiter.poll(reader);
            }
        }

        assert_eq!(handle.violations(), 0);
        assert_eq!(handle.max_antennas_on(), 1);
    }

    #[test]
    fn test_failed_probe_disables_reader() {
        let (bus, handle) = MockBus::new();
        handle.fail_probe(ReaderId::Hostel);
        let mut arbiter = BusArbiter::new(bus, Duration::ZERO);

        assert!(!arbiter.is_available(ReaderId::Hostel));
        assert_eq!(arbiter.available_count(), 2);

        handle.present(ReaderId::Hostel, card("01020304"));
        handle.clear_ops();
        assert_eq!(arbiter.poll(ReaderId::Hostel), None);
        assert!(handle.ops().is_empty());
    }

    #[test]
    fn test_invalid_uid_length_is_a_miss() {
        let (mut arbiter, handle) = arbiter();
        handle.present_raw(ReaderId::Gate, vec![0x01, 0x02]);

        assert_eq!(arbiter.poll(ReaderId::Gate), None);
        assert_eq!(arbiter.stats(ReaderId::Gate).errors, 1);
        assert!(handle.is_halted(ReaderId::Gate));
        assert!(handle.ops().contains(&BusOp::Halt));
        assert!(!handle.any_antenna_enabled());
    }

    #[test]
    fn test_is_still_present_matches_credential() {
        let (mut arbiter, handle) = arbiter();
        let session = card("01020304");
        handle.present(ReaderId::Gate, session);
        assert!(arbiter.is_still_present(ReaderId::Gate, &session));

        handle.present(ReaderId::Gate, card("AABBCCDD"));
        assert!(!arbiter.is_still_present(ReaderId::Gate, &session));

        handle.remove(ReaderId::Gate);
        assert!(!arbiter.is_still_present(ReaderId::Gate, &session));
    }

    #[test]
    fn test_settle_applied_per_poll() {
        let (bus, handle) = MockBus::new();
        let mut arbiter = BusArbiter::new(bus, Duration::from_micros(500));

        arbiter.poll(ReaderId::Gate);
        arbiter.poll(ReaderId::Classroom);

        assert_eq!(handle.settle_total(), Duration::from_micros(1000));
    }

    #[test]
    fn test_stats_track_detections() {
        let (mut arbiter, handle) = arbiter();
        handle.present(ReaderId::Classroom, card("01020304"));

        arbiter.poll(ReaderId::Classroom);
        arbiter.poll(ReaderId::Classroom);

        let stats = arbiter.stats(ReaderId::Classroom);
        assert_eq!(stats.polls, 2);
        assert_eq!(stats.detections, 2);
        assert!(stats.last_detection.is_some());
        assert_eq!(stats.info.as_ref().map(|i| i.name.as_str()), Some("Mock Reader"));
    }
}
