use rollcall_core::{PersonId, ReaderId};
use thiserror::Error;

use crate::gate::GateState;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error(transparent)]
    Core(#[from] rollcall_core::Error),

    #[error("Invalid gate transition from {from} to {to}")]
    InvalidTransition { from: GateState, to: GateState },

    #[error("Unknown person id: {0}")]
    UnknownPerson(PersonId),

    #[error("Reader {0} is not bound to a zone")]
    NotAZone(ReaderId),

    #[error("Timing value {name} must be greater than zero")]
    InvalidTiming { name: &'static str },
}

pub type Result<T> = std::result::Result<T, ControllerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ControllerError::InvalidTransition {
            from: GateState::Idle,
            to: GateState::Approved,
        };
        assert_eq!(err.to_string(), "Invalid gate transition from Idle to Approved");

        let err = ControllerError::InvalidTiming {
            name: "sneak_window",
        };
        assert_eq!(
            err.to_string(),
            "Timing value sneak_window must be greater than zero"
        );
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: ControllerError = rollcall_core::Error::DuplicatePerson(7).into();
        assert_eq!(err.to_string(), "Duplicate person id: 7");
    }
}
