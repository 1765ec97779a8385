//! Zone policy: what a tap at the Classroom or Hostel reader means.
//!
//! A tap moves the person to that zone and emits `zone_change`. During
//! class time a move into the hostel also emits an `alarm` with reason
//! `wrong_zone`; that violation is a one-shot feedback burst and never
//! engages the sustained alarm. Every tap ends with a fresh `status`.

use std::time::Instant;

use rollcall_core::{PersonId, ReaderId, SystemMode};
use rollcall_hardware::Feedback;
use rollcall_protocol::{AlarmReason, Event};
use tracing::{info, warn};

use crate::broadcaster::EventBroadcaster;
use crate::error::{ControllerError, Result};
use crate::registry::PersonRegistry;

/// Result of one applied zone tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneTap {
    pub student: String,
    pub zone: ReaderId,
    /// The tap broke the current mode's occupancy rule.
    pub violation: bool,
}

impl ZoneTap {
    /// Feedback burst to play for this tap.
    pub fn feedback(&self) -> Feedback {
        if self.violation {
            Feedback::WrongZone
        } else {
            Feedback::Tap
        }
    }
}

/// Apply a tap of `person` at `reader`.
///
/// # Errors
/// - `NotAZone` if `reader` is the gate reader
/// - `UnknownPerson` if `person` is not enrolled
pub fn apply_tap(
    registry: &mut PersonRegistry,
    broadcaster: &mut EventBroadcaster,
    person: PersonId,
    reader: ReaderId,
    mode: SystemMode,
    now: Instant,
) -> Result<ZoneTap> {
    let location = reader.zone().ok_or(ControllerError::NotAZone(reader))?;
    registry.set_location(person, location)?;

    let student = registry.name(person).to_string();
    broadcaster.push(Event::ZoneChange {
        student: student.clone(),
        zone: reader,
    });

    let violation = !mode.permits(location);
    if violation {
        warn!(student = %student, zone = %reader, mode = %mode, "Zone policy violation");
        broadcaster.push(Event::Alarm {
            student: student.clone(),
            reason: AlarmReason::WrongZone,
        });
    } else {
        info!(student = %student, zone = %reader, "Zone change");
    }

    broadcaster.status(registry, mode, now);

    Ok(ZoneTap {
        student,
        zone: reader,
        violation,
    })
}
