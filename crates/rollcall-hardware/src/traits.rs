//! Hardware device trait definitions.
//!
//! Two layers are defined here:
//!
//! - [`ReaderBus`]: raw access to the shared reader bus (select lines,
//!   antennas, ISO 14443 wake/halt). Only [`BusArbiter`](crate::BusArbiter)
//!   holds a value implementing it.
//! - [`CardPoller`]: the opaque "poll this logical reader" capability that
//!   the controller receives. It cannot touch select lines or antennas.
//!
//! The remaining traits cover the output side: gate actuator, buzzer/LED
//! indicator, and the local display.
//!
//! All methods are synchronous. Bus transactions and feedback bursts block
//! the scheduler loop for a bounded, short time; the bus is exclusive for
//! that interval anyway.

use std::time::Duration;

use rollcall_core::{Credential, ReaderId};

use crate::error::Result;
use crate::types::{Feedback, Notice, ReaderInfo};

/// Raw access to the reader bus shared by all three readers.
///
/// Implementations drive chip-select lines and antenna drivers directly.
/// They perform no arbitration of their own: calling [`select`](Self::select)
/// while another reader is selected puts two devices on the bus.
pub trait ReaderBus: Send {
    /// Self-test a reader (reset + version register read).
    ///
    /// # Errors
    ///
    /// Returns an error if the reader does not answer or reports an
    /// unexpected version.
    fn probe(&mut self, reader: ReaderId) -> Result<ReaderInfo>;

    /// Drive every select line to the inactive level.
    fn deselect_all(&mut self);

    /// Drive the select line of `reader` to the active level.
    fn select(&mut self, reader: ReaderId);

    /// Enable or disable the antenna driver of `reader`.
    ///
    /// # Errors
    ///
    /// Returns an error on bus communication failure.
    fn set_antenna(&mut self, reader: ReaderId, enabled: bool) -> Result<()>;

    /// Wait for the reader front-end to settle.
    fn settle(&mut self, duration: Duration);

    /// Issue a wake command (WUPA) on the selected reader and run
    /// anticollision.
    ///
    /// Unlike a plain request (REQA), wake also reaches cards left in the
    /// halted state. Returns the raw UID, or `None` if no card answered.
    ///
    /// # Errors
    ///
    /// Returns an error on collision, CRC failure, or bus failure.
    fn wake(&mut self) -> Result<Option<Vec<u8>>>;

    /// Halt the card session on the selected reader.
    ///
    /// # Errors
    ///
    /// Returns an error on bus communication failure.
    fn halt(&mut self) -> Result<()>;
}

/// Capability to poll a logical reader.
///
/// This is everything the controller may do with the readers. "No
/// credential" is a normal outcome and covers hardware failures as well.
pub trait CardPoller {
    /// Poll `reader` once and return the credential in its field, if any.
    fn poll(&mut self, reader: ReaderId) -> Option<Credential>;

    /// Returns `true` if `credential` is still in the field of `reader`.
    ///
    /// A different credential on the reader does not count as presence.
    fn is_still_present(&mut self, reader: ReaderId, credential: &Credential) -> bool {
        self.poll(reader).is_some_and(|found| found == *credential)
    }
}

/// Physical gate actuator (door strike, barrier motor).
pub trait GateActuator: Send {
    /// Command the gate open.
    ///
    /// # Errors
    ///
    /// Returns an error if the actuator driver fails.
    fn open(&mut self) -> Result<()>;

    /// Command the gate closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the actuator driver fails.
    fn close(&mut self) -> Result<()>;
}

/// Buzzer and LED indicator.
pub trait Indicator: Send {
    /// Play a one-shot feedback burst. Blocks for [`Feedback::duration`].
    ///
    /// # Errors
    ///
    /// Returns an error if the indicator driver fails.
    fn burst(&mut self, feedback: Feedback) -> Result<()>;

    /// Drive the sustained alarm output (buzzer + red LED) on or off.
    ///
    /// # Errors
    ///
    /// Returns an error if the indicator driver fails.
    fn set_alarm_output(&mut self, on: bool) -> Result<()>;
}

/// Local display for transient notices.
pub trait NoticeDisplay: Send {
    /// Show `notice` until the next one replaces it.
    ///
    /// # Errors
    ///
    /// Returns an error if the display driver fails.
    fn show(&mut self, notice: &Notice) -> Result<()>;
}
