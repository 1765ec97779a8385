//! Outbound events.
//!
//! Every event serializes to a single JSON object whose first key is
//! `"event"`:
//!
//! ```text
//! {"event":"boot","status":"ok"}
//! {"event":"status","classroom":12,"hostel":3,"left":1,"sneaked":0,"mode":"class"}
//! {"event":"scan","student":"Ada","zone":"gate"}
//! {"event":"alarm","student":"Ada","reason":"wrong_zone"}
//! ```

use rollcall_core::{Location, Person, PersonId, ReaderId, SystemMode};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Startup status reported by the `boot` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BootStatus {
    Ok,
}

/// Why an `alarm` event was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmReason {
    /// Zone tap not allowed by the current mode.
    WrongZone,
    /// Credential left the gate without approval.
    Sneaked,
}

/// One message of the outbound event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Sent once at startup.
    Boot { status: BootStatus },

    /// Profile and location of one person (sent on `SYNC`).
    StudentInfo {
        id: PersonId,
        name: String,
        class: String,
        dorm: String,
        contact: String,
        /// Location code, see [`Location::code`].
        location: u8,
    },

    /// Occupancy snapshot.
    Status {
        classroom: usize,
        hostel: usize,
        left: usize,
        sneaked: usize,
        mode: SystemMode,
    },

    /// Credential registered at a reader (always the gate).
    Scan { student: String, zone: ReaderId },

    /// Exit approved by an administrator.
    Approved { student: String },

    /// Credential left the gate without approval.
    Sneaked { student: String },

    /// Person tapped a zone reader.
    ZoneChange { student: String, zone: ReaderId },

    /// Security alarm.
    Alarm { student: String, reason: AlarmReason },

    /// System mode changed.
    ModeChange { mode: SystemMode },

    /// Credential not in the directory.
    UnknownCard { zone: ReaderId },
}

impl Event {
    /// The startup event.
    pub fn boot() -> Self {
        Self::Boot {
            status: BootStatus::Ok,
        }
    }

    /// Build a `student_info` event from a profile and its current location.
    pub fn student_info(person: &Person, location: Location) -> Self {
        Self::StudentInfo {
            id: person.id,
            name: person.name.clone(),
            class: person.class.clone(),
            dorm: person.dorm.clone(),
            contact: person.contact.clone(),
            location: location.code(),
        }
    }

    /// Wire name of this event (the value of the `"event"` key).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boot { .. } => "boot",
            Self::StudentInfo { .. } => "student_info",
            Self::Status { .. } => "status",
            Self::Scan { .. } => "scan",
            Self::Approved { .. } => "approved",
            Self::Sneaked { .. } => "sneaked",
            Self::ZoneChange { .. } => "zone_change",
            Self::Alarm { .. } => "alarm",
            Self::ModeChange { .. } => "mode_change",
            Self::UnknownCard { .. } => "unknown_card",
        }
    }

    /// Serialize to one JSON line without the trailing newline.
    ///
    /// # Errors
    /// Returns `ProtocolError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse one JSON line.
    ///
    /// # Errors
    /// Returns `ProtocolError::Json` on malformed input or unknown events.
    pub fn from_json(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_boot_wire_format() {
        assert_eq!(
            Event::boot().to_json().unwrap(),
            r#"{"event":"boot","status":"ok"}"#
        );
    }

    #[test]
    fn test_student_info_wire_format() {
        let person = Person::new(3, "Ada")
            .with_class("5B")
            .with_dorm("H-12")
            .with_contact("555-0101");
        let event = Event::student_info(&person, Location::Hostel);

        assert_eq!(
            event.to_json().unwrap(),
            r#"{"event":"student_info","id":3,"name":"Ada","class":"5B","dorm":"H-12","contact":"555-0101","location":2}"#
        );
    }

    #[test]
    fn test_status_wire_format() {
        let event = Event::Status {
            classroom: 12,
            hostel: 3,
            left: 1,
            sneaked: 0,
            mode: SystemMode::Class,
        };
        assert_eq!(
            event.to_json().unwrap(),
            r#"{"event":"status","classroom":12,"hostel":3,"left":1,"sneaked":0,"mode":"class"}"#
        );
    }

    #[rstest]
    #[case(
        Event::Scan { student: "Ada".into(), zone: ReaderId::Gate },
        r#"{"event":"scan","student":"Ada","zone":"gate"}"#
    )]
    #[case(
        Event::Approved { student: "Ada".into() },
        r#"{"event":"approved","student":"Ada"}"#
    )]
    #[case(
        Event::Sneaked { student: "Ada".into() },
        r#"{"event":"sneaked","student":"Ada"}"#
    )]
    #[case(
        Event::ZoneChange { student: "Ada".into(), zone: ReaderId::Hostel },
        r#"{"event":"zone_change","student":"Ada","zone":"hostel"}"#
    )]
    #[case(
        Event::Alarm { student: "Ada".into(), reason: AlarmReason::WrongZone },
        r#"{"event":"alarm","student":"Ada","reason":"wrong_zone"}"#
    )]
    #[case(
        Event::Alarm { student: "Ada".into(), reason: AlarmReason::Sneaked },
        r#"{"event":"alarm","student":"Ada","reason":"sneaked"}"#
    )]
    #[case(
        Event::ModeChange { mode: SystemMode::Free },
        r#"{"event":"mode_change","mode":"free"}"#
    )]
    #[case(
        Event::UnknownCard { zone: ReaderId::Classroom },
        r#"{"event":"unknown_card","zone":"classroom"}"#
    )]
    fn test_event_wire_format(#[case] event: Event, #[case] expected: &str) {
        assert_eq!(event.to_json().unwrap(), expected);
        assert_eq!(Event::from_json(expected).unwrap(), event);
    }

    #[test]
    fn test_kind_matches_tag() {
        let event = Event::UnknownCard {
            zone: ReaderId::Gate,
        };
        let json = event.to_json().unwrap();
        assert!(json.starts_with(&format!(r#"{{"event":"{}""#, event.kind())));
    }

    #[test]
    fn test_from_json_rejects_unknown_event() {
        assert!(Event::from_json(r#"{"event":"reboot"}"#).is_err());
    }
}
