//! Gate authorization state machine.
//!
//! # States
//!
//! - `Idle`: no session; waiting for a gate tap
//! - `WaitingApproval`: a person is at the gate, waiting for an administrator
//! - `SneakCountdown`: the credential left the gate reader; grace period runs
//! - `Alarm`: the grace period expired; sustained alarm is running
//! - `Approved`: exit approved; gate is open
//!
//! # Valid Transitions
//!
//! - Idle → WaitingApproval
//! - WaitingApproval → Approved / SneakCountdown / Idle (expired, returned to a zone)
//! - SneakCountdown → WaitingApproval / Approved / Alarm / Idle (returned to a zone)
//! - Alarm → Idle
//! - Approved → Idle
//!
//! A [`GateSession`] exists exactly while the machine is outside `Idle`, so
//! at most one session is ever active.
//!
//! # Examples
//!
//! ```
//! use std::time::Instant;
//! use rollcall_core::{Credential, PersonId};
//! use rollcall_controller::{GateMachine, GateSession, GateState};
//!
//! let now = Instant::now();
//! let mut machine = GateMachine::new();
//! let session = GateSession::new(PersonId(1), "Ada", Credential::from_hex("04A1B2C3").unwrap(), now);
//!
//! machine.begin(session, now).unwrap();
//! assert_eq!(machine.state(), GateState::WaitingApproval);
//!
//! assert!(machine.transition_to(GateState::Alarm, now).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use rollcall_core::constants::MAX_HISTORY_SIZE;
use rollcall_core::{Credential, PersonId};
use serde::Serialize;
use tracing::{error, info};

use crate::error::{ControllerError, Result};

/// State of the gate authorization machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    #[default]
    Idle,
    WaitingApproval,
    SneakCountdown,
    Alarm,
    Approved,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GateState::Idle => "Idle",
            GateState::WaitingApproval => "WaitingApproval",
            GateState::SneakCountdown => "SneakCountdown",
            GateState::Alarm => "Alarm",
            GateState::Approved => "Approved",
        };
        f.write_str(name)
    }
}

impl GateState {
    /// Check if a transition to `target` is allowed from this state.
    ///
    /// ```
    /// use rollcall_controller::GateState;
    ///
    /// assert!(GateState::SneakCountdown.can_transition_to(GateState::WaitingApproval));
    /// assert!(!GateState::Idle.can_transition_to(GateState::Approved));
    /// ```
    pub fn can_transition_to(self, target: GateState) -> bool {
        matches!(
            (self, target),
            (GateState::Idle, GateState::WaitingApproval)
                | (
                    GateState::WaitingApproval,
                    GateState::Approved | GateState::SneakCountdown | GateState::Idle
                )
                | (
                    GateState::SneakCountdown,
                    GateState::WaitingApproval
                        | GateState::Approved
                        | GateState::Alarm
                        | GateState::Idle
                )
                | (GateState::Alarm, GateState::Idle)
                | (GateState::Approved, GateState::Idle)
        )
    }
}

/// One recorded transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: GateState,
    pub to: GateState,
    pub at: Instant,
}

/// Working record of one exit evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSession {
    /// Person under evaluation.
    pub person: PersonId,
    /// Display name, used in events and notices.
    pub student: String,
    /// Credential that opened the session.
    pub credential: Credential,
    /// Start of the current approval wait. Restarted when the credential
    /// comes back during the countdown.
    pub approval_started: Instant,
    /// Start of the sneak countdown.
    pub countdown_started: Option<Instant>,
    /// When the sustained alarm was engaged.
    pub alarm_started: Option<Instant>,
    /// When the exit was approved and the gate opened.
    pub approved_at: Option<Instant>,
}

impl GateSession {
    pub fn new(
        person: PersonId,
        student: impl Into<String>,
        credential: Credential,
        now: Instant,
    ) -> Self {
        Self {
            person,
            student: student.into(),
            credential,
            approval_started: now,
            countdown_started: None,
            alarm_started: None,
            approved_at: None,
        }
    }
}

/// Gate state plus the active session and a bounded transition history.
#[derive(Debug, Clone, Default)]
pub struct GateMachine {
    state: GateState,
    session: Option<GateSession>,
    history: VecDeque<StateTransition>,
}

impl GateMachine {
    pub fn new() -> Self {
        Self {
            state: GateState::Idle,
            session: None,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn session(&self) -> Option<&GateSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut GateSession> {
        self.session.as_mut()
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Open a session and enter `WaitingApproval`.
    ///
    /// # Errors
    /// Returns `InvalidTransition` if a session is already active.
    pub fn begin(&mut self, session: GateSession, now: Instant) -> Result<StateTransition> {
        let transition = self.transition_to(GateState::WaitingApproval, now)?;
        self.session = Some(session);
        Ok(transition)
    }

    /// Move to `target`, validating against the transition table.
    ///
    /// Entering `Idle` drops the session.
    ///
    /// # Errors
    /// Returns `InvalidTransition` if the move is not in the table. The
    /// state is left unchanged.
    pub fn transition_to(&mut self, target: GateState, now: Instant) -> Result<StateTransition> {
        if !self.state.can_transition_to(target) {
            return Err(ControllerError::InvalidTransition {
                from: self.state,
                to: target,
            });
        }

        let transition = StateTransition {
            from: self.state,
            to: target,
            at: now,
        };
        self.state = target;
        if target == GateState::Idle {
            self.session = None;
        }
        self.record(transition);

        info!(from = %transition.from, to = %transition.to, "Gate state transition");
        Ok(transition)
    }

    /// Force the machine back to `Idle` after an invalid transition.
    pub fn reset(&mut self, now: Instant) {
        if self.state != GateState::Idle {
            error!(from = %self.state, "Resetting gate machine to Idle");
            self.record(StateTransition {
                from: self.state,
                to: GateState::Idle,
                at: now,
            });
        }
        self.state = GateState::Idle;
        self.session = None;
    }

    fn record(&mut self, transition: StateTransition) {
        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(transition);
    }
}
