//! Mock reader bus for testing and simulation.
//!
//! The mock models three readers on one bus. Cards are placed into a
//! reader's field through [`MockBusHandle`]; the bus only reports a card
//! when that reader is selected and its antenna is on. Every bus operation
//! is recorded so tests can check the arbitration sequence, and contention
//! (two readers selected, two antennas on) is counted as a violation.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rollcall_core::{Credential, ReaderId};

use crate::{
    Result,
    error::HardwareError,
    traits::ReaderBus,
    types::ReaderInfo,
};

/// Maximum number of recorded bus operations.
const MAX_RECORDED_OPS: usize = 4096;

/// One recorded bus operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Probe(ReaderId),
    DeselectAll,
    Select(ReaderId),
    Antenna(ReaderId, bool),
    Settle,
    Wake,
    Halt,
}

#[derive(Debug, Default)]
struct BusState {
    cards: [Option<Vec<u8>>; 3],
    halted: [bool; 3],
    antenna: [bool; 3],
    probe_fails: [bool; 3],
    read_fails: [bool; 3],
    selected: Option<ReaderId>,
    violations: u64,
    max_antennas_on: usize,
    settle_total: Duration,
    ops: VecDeque<BusOp>,
}

impl BusState {
    fn record(&mut self, op: BusOp) {
        self.ops.push_back(op);
        if self.ops.len() > MAX_RECORDED_OPS {
            self.ops.pop_front();
        }
    }

    fn antennas_on(&self) -> usize {
        self.antenna.iter().filter(|on| **on).count()
    }
}

/// Mock reader bus.
///
/// # Examples
///
/// ```
/// use rollcall_core::{Credential, ReaderId};
/// use rollcall_hardware::mock::MockBus;
/// use rollcall_hardware::ReaderBus;
///
/// let (mut bus, handle) = MockBus::new();
/// handle.present(ReaderId::Gate, Credential::from_hex("04A1B2C3").unwrap());
///
/// bus.select(ReaderId::Gate);
/// bus.set_antenna(ReaderId::Gate, true).unwrap();
/// assert!(bus.wake().unwrap().is_some());
/// ```
#[derive(Debug)]
pub struct MockBus {
    state: Arc<Mutex<BusState>>,
}

impl MockBus {
    /// Create a new mock bus and its control handle.
    pub fn new() -> (Self, MockBusHandle) {
        let state = Arc::new(Mutex::new(BusState::default()));
        let bus = Self {
            state: Arc::clone(&state),
        };
        (bus, MockBusHandle { state })
    }
}

impl ReaderBus for MockBus {
    fn probe(&mut self, reader: ReaderId) -> Result<ReaderInfo> {
        let mut state = self.state.lock();
        state.record(BusOp::Probe(reader));
        if state.probe_fails[reader.index()] {
            return Err(HardwareError::initialization_failed(format!(
                "{reader} reader did not answer"
            )));
        }
        Ok(ReaderInfo::new("Mock Reader").with_firmware_version("0x92"))
    }

    fn deselect_all(&mut self) {
        let mut state = self.state.lock();
        state.record(BusOp::DeselectAll);
        state.selected = None;
    }

    fn select(&mut self, reader: ReaderId) {
        let mut state = self.state.lock();
        state.record(BusOp::Select(reader));
        if state.selected.is_some_and(|current| current != reader) {
            state.violations += 1;
        }
        state.selected = Some(reader);
    }

    fn set_antenna(&mut self, reader: ReaderId, enabled: bool) -> Result<()> {
        let mut state = self.state.lock();
        state.record(BusOp::Antenna(reader, enabled));
        state.antenna[reader.index()] = enabled;

        let on = state.antennas_on();
        if on > 1 {
            state.violations += 1;
        }
        state.max_antennas_on = state.max_antennas_on.max(on);
        Ok(())
    }

    fn settle(&mut self, duration: Duration) {
        let mut state = self.state.lock();
        state.record(BusOp::Settle);
        state.settle_total += duration;
    }

    fn wake(&mut self) -> Result<Option<Vec<u8>>> {
        let mut state = self.state.lock();
        state.record(BusOp::Wake);

        let selected = state.selected;
        let Some(reader) = selected else {
            state.violations += 1;
            return Err(HardwareError::communication("wake issued with no reader selected"));
        };
        let idx = reader.index();
        if state.read_fails[idx] {
            return Err(HardwareError::card_read("injected read failure"));
        }
        if !state.antenna[idx] {
            return Ok(None);
        }
        Ok(state.cards[idx].clone())
    }

    fn halt(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        state.record(BusOp::Halt);
        let selected = state.selected;
        if let Some(reader) = selected {
            state.halted[reader.index()] = true;
        }
        Ok(())
    }
}

/// Handle for controlling a mock reader bus.
///
/// Cloning the handle shares the same bus state.
#[derive(Debug, Clone)]
pub struct MockBusHandle {
    state: Arc<Mutex<BusState>>,
}

impl MockBusHandle {
    /// Place `credential` in the field of `reader`, replacing any other card.
    pub fn present(&self, reader: ReaderId, credential: Credential) {
        self.present_raw(reader, credential.as_bytes().to_vec());
    }

    /// Place a raw UID in the field of `reader` without validation.
    pub fn present_raw(&self, reader: ReaderId, uid: Vec<u8>) {
        let mut state = self.state.lock();
        state.cards[reader.index()] = Some(uid);
        state.halted[reader.index()] = false;
    }

    /// Take the card away from `reader`.
    pub fn remove(&self, reader: ReaderId) {
        let mut state = self.state.lock();
        state.cards[reader.index()] = None;
        state.halted[reader.index()] = false;
    }

    /// Make the next probes of `reader` fail.
    pub fn fail_probe(&self, reader: ReaderId) {
        self.state.lock().probe_fails[reader.index()] = true;
    }

    /// Make wake commands on `reader` fail while `fail` is set.
    pub fn fail_reads(&self, reader: ReaderId, fail: bool) {
        self.state.lock().read_fails[reader.index()] = fail;
    }

    /// Card currently in the field of `reader`.
    pub fn card_at(&self, reader: ReaderId) -> Option<Vec<u8>> {
        self.state.lock().cards[reader.index()].clone()
    }

    /// Returns `true` if the card on `reader` was halted by the last poll.
    pub fn is_halted(&self, reader: ReaderId) -> bool {
        self.state.lock().halted[reader.index()]
    }

    /// Returns `true` if the antenna of `reader` is on.
    pub fn antenna_enabled(&self, reader: ReaderId) -> bool {
        self.state.lock().antenna[reader.index()]
    }

    /// Returns `true` if any antenna is on.
    pub fn any_antenna_enabled(&self) -> bool {
        self.state.lock().antennas_on() > 0
    }

    /// Reader whose select line is active, if any.
    pub fn selected(&self) -> Option<ReaderId> {
        self.state.lock().selected
    }

    /// Number of contention events observed.
    pub fn violations(&self) -> u64 {
        self.state.lock().violations
    }

    /// Highest number of antennas that were on at the same time.
    pub fn max_antennas_on(&self) -> usize {
        self.state.lock().max_antennas_on
    }

    /// Sum of all settle waits requested.
    pub fn settle_total(&self) -> Duration {
        self.state.lock().settle_total
    }

    /// Recorded bus operations, oldest first.
    pub fn ops(&self) -> Vec<BusOp> {
        self.state.lock().ops.iter().copied().collect()
    }

    /// Forget recorded bus operations.
    pub fn clear_ops(&self) {
        self.state.lock().ops.clear();
    }
}
