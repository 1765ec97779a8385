//! Mock output devices: gate actuator, indicator, and display.
//!
//! None of these block; feedback bursts are recorded instead of played.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    Result,
    traits::{GateActuator, Indicator, NoticeDisplay},
    types::{Feedback, Notice},
};

/// Command sent to the gate actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateCommand {
    Open,
    Close,
}

#[derive(Debug, Default)]
struct GateState {
    open: bool,
    history: Vec<GateCommand>,
}

/// Mock gate actuator.
#[derive(Debug)]
pub struct MockGate {
    state: Arc<Mutex<GateState>>,
}

impl MockGate {
    /// Create a closed mock gate and its inspection handle.
    pub fn new() -> (Self, MockGateHandle) {
        let state = Arc::new(Mutex::new(GateState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockGateHandle { state },
        )
    }
}

impl GateActuator for MockGate {
    fn open(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        state.open = true;
        state.history.push(GateCommand::Open);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        state.open = false;
        state.history.push(GateCommand::Close);
        Ok(())
    }
}

/// Handle for inspecting a mock gate.
#[derive(Debug, Clone)]
pub struct MockGateHandle {
    state: Arc<Mutex<GateState>>,
}

impl MockGateHandle {
    /// Returns `true` if the last command was `Open`.
    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    /// Every command received, oldest first.
    pub fn history(&self) -> Vec<GateCommand> {
        self.state.lock().history.clone()
    }
}

#[derive(Debug, Default)]
struct IndicatorState {
    bursts: Vec<Feedback>,
    alarm_output: bool,
    alarm_toggles: u64,
}

/// Mock buzzer/LED indicator.
#[derive(Debug)]
pub struct MockIndicator {
    state: Arc<Mutex<IndicatorState>>,
}

impl MockIndicator {
    /// Create a silent mock indicator and its inspection handle.
    pub fn new() -> (Self, MockIndicatorHandle) {
        let state = Arc::new(Mutex::new(IndicatorState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockIndicatorHandle { state },
        )
    }
}

impl Indicator for MockIndicator {
    fn burst(&mut self, feedback: Feedback) -> Result<()> {
        self.state.lock().bursts.push(feedback);
        Ok(())
    }

    fn set_alarm_output(&mut self, on: bool) -> Result<()> {
        let mut state = self.state.lock();
        if state.alarm_output != on {
            state.alarm_toggles += 1;
        }
        state.alarm_output = on;
        Ok(())
    }
}

/// Handle for inspecting a mock indicator.
#[derive(Debug, Clone)]
pub struct MockIndicatorHandle {
    state: Arc<Mutex<IndicatorState>>,
}

impl MockIndicatorHandle {
    /// Feedback bursts played, oldest first.
    pub fn bursts(&self) -> Vec<Feedback> {
        self.state.lock().bursts.clone()
    }

    /// Current level of the alarm output.
    pub fn alarm_output(&self) -> bool {
        self.state.lock().alarm_output
    }

    /// Number of level changes of the alarm output.
    pub fn alarm_toggles(&self) -> u64 {
        self.state.lock().alarm_toggles
    }
}

/// Mock display recording every notice shown.
#[derive(Debug)]
pub struct MockDisplay {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MockDisplay {
    /// Create a blank mock display and its inspection handle.
    pub fn new() -> (Self, MockDisplayHandle) {
        let notices = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                notices: Arc::clone(&notices),
            },
            MockDisplayHandle { notices },
        )
    }
}

impl NoticeDisplay for MockDisplay {
    fn show(&mut self, notice: &Notice) -> Result<()> {
        self.notices.lock().push(notice.clone());
        Ok(())
    }
}

/// Handle for inspecting a mock display.
#[derive(Debug, Clone)]
pub struct MockDisplayHandle {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MockDisplayHandle {
    /// Notices shown, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Most recent notice.
    pub fn current(&self) -> Option<Notice> {
        self.notices.lock().last().cloned()
    }
}
