//! Output devices that report through the log.
//!
//! Used by `rollcall run` until real actuator drivers exist. Unlike the mock
//! devices they keep no history, so they are safe for long runs.

use rollcall_hardware::{Feedback, GateActuator, Indicator, Notice, NoticeDisplay, Result};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct ConsoleGate {
    open: bool,
}

impl ConsoleGate {
    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl GateActuator for ConsoleGate {
    fn open(&mut self) -> Result<()> {
        self.open = true;
        info!("Gate opened");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        info!("Gate closed");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConsoleIndicator {
    alarm: bool,
}

impl Indicator for ConsoleIndicator {
    fn burst(&mut self, feedback: Feedback) -> Result<()> {
        debug!(
            feedback = ?feedback,
            duration_ms = feedback.duration().as_millis() as u64,
            "Feedback burst"
        );
        Ok(())
    }

    fn set_alarm_output(&mut self, on: bool) -> Result<()> {
        if on != self.alarm {
            self.alarm = on;
            debug!(on, "Alarm output");
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl NoticeDisplay for ConsoleDisplay {
    fn show(&mut self, notice: &Notice) -> Result<()> {
        info!(target: "rollcall::display", "{notice}");
        Ok(())
    }
}
