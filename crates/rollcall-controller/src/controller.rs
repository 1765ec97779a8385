//! The scheduler-facing controller.
//!
//! One call to [`Controller::tick`] is one cycle of the scheduler loop:
//!
//! 1. advance the alarm blink pattern
//! 2. observe the gate reader (tap while idle, presence while in session)
//! 3. poll Classroom then Hostel; each card is an admin approval, a zone
//!    tap, or a denial depending on the gate state
//! 4. fire any gate deadline that has passed
//! 5. send the periodic `status` if due
//!
//! Readers are always observed in the order Gate, Classroom, Hostel, so an
//! input seen in a tick is handled before that tick's deadlines.

use std::time::Instant;

use rollcall_core::{Credential, Location, PersonId, ReaderId, SystemMode};
use rollcall_hardware::{CardPoller, Feedback, GateActuator, Indicator, Notice, NoticeDisplay};
use rollcall_protocol::{AlarmReason, Command, Event};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::alarm::AlarmController;
use crate::broadcaster::EventBroadcaster;
use crate::directory::{CredentialDirectory, Resolution, Roster};
use crate::error::Result;
use crate::gate::{GateMachine, GateSession, GateState};
use crate::policy;
use crate::registry::{Counts, PersonRegistry};
use crate::timing::Timing;

/// Hardware the controller drives.
///
/// The poller is the only reader access the controller has; the raw bus
/// stays inside it.
#[derive(Debug)]
pub struct Devices<P, G, I, D> {
    pub poller: P,
    pub gate: G,
    pub indicator: I,
    pub display: D,
}

/// Point-in-time view of the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub counts: Counts,
    pub mode: SystemMode,
    pub gate_state: GateState,
    /// Person under evaluation at the gate.
    pub session: Option<String>,
    pub alarm_active: bool,
}

pub struct Controller<P, G, I, D> {
    devices: Devices<P, G, I, D>,
    directory: CredentialDirectory,
    registry: PersonRegistry,
    mode: SystemMode,
    machine: GateMachine,
    alarm: AlarmController,
    broadcaster: EventBroadcaster,
    timing: Timing,
}

impl<P, G, I, D> Controller<P, G, I, D>
where
    P: CardPoller,
    G: GateActuator,
    I: Indicator,
    D: NoticeDisplay,
{
    /// Build a controller in `Free` mode with the gate idle.
    ///
    /// # Errors
    /// Returns `InvalidTiming` if a timing window is zero.
    pub fn new(devices: Devices<P, G, I, D>, roster: Roster, timing: Timing) -> Result<Self> {
        timing.validate()?;
        let (directory, registry) = roster.into_parts();
        Ok(Self {
            devices,
            directory,
            registry,
            mode: SystemMode::default(),
            machine: GateMachine::new(),
            alarm: AlarmController::new(timing.alarm_blink, timing.alarm_duration),
            broadcaster: EventBroadcaster::new(timing.status_interval),
            timing,
        })
    }

    /// Emit `boot` followed by the first `status`.
    pub fn boot(&mut self, now: Instant) {
        info!(
            people = self.registry.len(),
            credentials = self.directory.len(),
            "Controller started"
        );
        if !self.directory.has_admin() {
            warn!("No administrative credential configured, exits cannot be approved");
        }
        self.broadcaster.push(Event::boot());
        self.broadcaster.status(&self.registry, self.mode, now);
    }

    /// Run one scheduler cycle at monotonic time `now`.
    pub fn tick(&mut self, now: Instant) {
        self.alarm.tick(now, &mut self.devices.indicator);

        self.observe_gate(now);
        for reader in ReaderId::ZONES {
            if let Some(credential) = self.devices.poller.poll(reader) {
                self.on_zone_card(reader, credential, now);
            }
        }

        self.check_deadlines(now);
        self.broadcaster
            .status_if_due(&self.registry, self.mode, now);
    }

    /// Apply an inbound command.
    pub fn handle_command(&mut self, command: Command, now: Instant) {
        match command {
            Command::Mode(mode) => {
                let previous = std::mem::replace(&mut self.mode, mode);
                info!(from = %previous, to = %mode, "System mode changed");
                self.broadcaster.push(Event::ModeChange { mode });
                self.notice(Notice::ModeChanged(mode));
                self.broadcaster.status(&self.registry, self.mode, now);
            }
            Command::Sync => {
                debug!(people = self.registry.len(), "Sync requested");
                self.broadcaster.sync(&self.registry, self.mode, now);
            }
        }
    }

    /// Take every event produced since the last drain.
    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.broadcaster.drain()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            counts: self.registry.counts(),
            mode: self.mode,
            gate_state: self.machine.state(),
            session: self.machine.session().map(|s| s.student.clone()),
            alarm_active: self.alarm.is_active(),
        }
    }

    pub fn mode(&self) -> SystemMode {
        self.mode
    }

    pub fn registry(&self) -> &PersonRegistry {
        &self.registry
    }

    pub fn gate(&self) -> &GateMachine {
        &self.machine
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn devices(&self) -> &Devices<P, G, I, D> {
        &self.devices
    }

    fn observe_gate(&mut self, now: Instant) {
        match self.machine.state() {
            GateState::Idle => {
                if let Some(credential) = self.devices.poller.poll(ReaderId::Gate) {
                    self.on_gate_card(credential, now);
                }
            }
            GateState::WaitingApproval => {
                let Some(session) = self.machine.session() else {
                    self.machine.reset(now);
                    return;
                };
                let credential = session.credential;
                if self
                    .devices
                    .poller
                    .is_still_present(ReaderId::Gate, &credential)
                {
                    return;
                }
                if self.transition(GateState::SneakCountdown, now) {
                    if let Some(session) = self.machine.session_mut() {
                        session.countdown_started = Some(now);
                        info!(student = %session.student, "Credential left the gate, countdown started");
                    }
                }
            }
            GateState::SneakCountdown => {
                let Some(session) = self.machine.session() else {
                    self.machine.reset(now);
                    return;
                };
                let credential = session.credential;
                if !self
                    .devices
                    .poller
                    .is_still_present(ReaderId::Gate, &credential)
                {
                    return;
                }
                if self.transition(GateState::WaitingApproval, now) {
                    if let Some(session) = self.machine.session_mut() {
                        session.countdown_started = None;
                        session.approval_started = now;
                        info!(student = %session.student, "Credential back at the gate");
                    }
                }
            }
            GateState::Alarm | GateState::Approved => {}
        }
    }

    fn on_gate_card(&mut self, credential: Credential, now: Instant) {
        match self.directory.resolve(&credential) {
            Resolution::Person(id) => self.open_session(id, credential, now),
            Resolution::Admin => debug!("Administrative credential at the gate ignored"),
            Resolution::NotFound => self.reject(ReaderId::Gate, &credential),
        }
    }

    fn open_session(&mut self, id: PersonId, credential: Credential, now: Instant) {
        let student = self.registry.name(id).to_string();
        let session = GateSession::new(id, student.clone(), credential, now);
        if let Err(e) = self.machine.begin(session, now) {
            error!(error = %e, "Gate machine fault");
            self.machine.reset(now);
            return;
        }

        info!(student = %student, "Exit requested at the gate");
        self.set_location(id, Location::AtGate);
        self.broadcaster.push(Event::Scan {
            student,
            zone: ReaderId::Gate,
        });
        self.feedback(Feedback::GateScan);
        self.broadcaster.status(&self.registry, self.mode, now);
    }

    fn on_zone_card(&mut self, reader: ReaderId, credential: Credential, now: Instant) {
        match self.directory.resolve(&credential) {
            Resolution::Admin => self.on_admin(reader, now),
            Resolution::Person(id) => self.on_zone_person(reader, id, now),
            Resolution::NotFound => self.reject(reader, &credential),
        }
    }

    fn on_admin(&mut self, reader: ReaderId, now: Instant) {
        match self.machine.state() {
            GateState::WaitingApproval | GateState::SneakCountdown => self.approve(now),
            GateState::Alarm => self.clear_alarm(now),
            state @ (GateState::Idle | GateState::Approved) => {
                debug!(reader = %reader, state = %state, "Administrative credential ignored");
            }
        }
    }

    fn on_zone_person(&mut self, reader: ReaderId, id: PersonId, now: Instant) {
        let in_session = matches!(
            self.machine.state(),
            GateState::WaitingApproval | GateState::SneakCountdown
        );
        let returning = in_session && self.machine.session().is_some_and(|s| s.person == id);
        if returning {
            info!(student = %self.registry.name(id), zone = %reader, "Returned to a zone, session closed");
            self.transition(GateState::Idle, now);
        }

        match policy::apply_tap(
            &mut self.registry,
            &mut self.broadcaster,
            id,
            reader,
            self.mode,
            now,
        ) {
            Ok(tap) => {
                self.feedback(tap.feedback());
                if tap.violation {
                    self.notice(Notice::WrongZone {
                        student: tap.student,
                    });
                }
            }
            Err(e) => error!(reader = %reader, error = %e, "Zone tap failed"),
        }
    }

    fn approve(&mut self, now: Instant) {
        let Some(session) = self.machine.session() else {
            self.machine.reset(now);
            return;
        };
        let (id, student) = (session.person, session.student.clone());
        if !self.transition(GateState::Approved, now) {
            return;
        }
        if let Some(session) = self.machine.session_mut() {
            session.approved_at = Some(now);
        }

        info!(student = %student, "Exit approved");
        self.set_location(id, Location::Left);
        if let Err(e) = self.devices.gate.open() {
            warn!(error = %e, "Failed to open gate");
        }
        self.broadcaster.push(Event::Approved {
            student: student.clone(),
        });
        self.feedback(Feedback::Approved);
        self.notice(Notice::Approved { student });
        self.broadcaster.status(&self.registry, self.mode, now);
    }

    fn clear_alarm(&mut self, now: Instant) {
        let student = self
            .machine
            .session()
            .map(|s| s.student.clone())
            .unwrap_or_default();
        self.alarm.stop(&mut self.devices.indicator);
        self.transition(GateState::Idle, now);
        info!(student = %student, "Alarm cleared by administrator");
        self.notice(Notice::ClearedByAdmin { student });
    }

    fn check_deadlines(&mut self, now: Instant) {
        let Some(session) = self.machine.session() else {
            return;
        };
        let elapsed = |since: Instant| now.saturating_duration_since(since);

        match self.machine.state() {
            GateState::WaitingApproval => {
                if elapsed(session.approval_started) > self.timing.approval_timeout {
                    let student = session.student.clone();
                    self.transition(GateState::Idle, now);
                    info!(student = %student, "Approval request expired");
                    self.notice(Notice::RequestExpired { student });
                }
            }
            GateState::SneakCountdown => {
                let expired = session
                    .countdown_started
                    .is_some_and(|start| elapsed(start) > self.timing.sneak_window);
                if expired {
                    let (id, student) = (session.person, session.student.clone());
                    self.sneaked(id, student, now);
                }
            }
            GateState::Alarm => {
                if !self.alarm.is_active() {
                    debug!(student = %session.student, "Alarm finished, session closed");
                    self.transition(GateState::Idle, now);
                }
            }
            GateState::Approved => {
                let closing = session
                    .approved_at
                    .is_some_and(|at| elapsed(at) > self.timing.gate_open);
                if closing {
                    if let Err(e) = self.devices.gate.close() {
                        warn!(error = %e, "Failed to close gate");
                    }
                    debug!("Gate closed");
                    self.transition(GateState::Idle, now);
                }
            }
            GateState::Idle => {}
        }
    }

    fn sneaked(&mut self, id: PersonId, student: String, now: Instant) {
        if !self.transition(GateState::Alarm, now) {
            return;
        }
        if let Some(session) = self.machine.session_mut() {
            session.alarm_started = Some(now);
        }

        warn!(student = %student, "Credential left the gate without approval");
        self.set_location(id, Location::Sneaked);
        self.broadcaster.push(Event::Sneaked {
            student: student.clone(),
        });
        self.broadcaster.push(Event::Alarm {
            student: student.clone(),
            reason: AlarmReason::Sneaked,
        });
        self.alarm.start(now, &mut self.devices.indicator);
        self.notice(Notice::Sneaked { student });
        self.broadcaster.status(&self.registry, self.mode, now);
    }

    fn reject(&mut self, reader: ReaderId, credential: &Credential) {
        warn!(reader = %reader, credential = %credential, "Unknown credential");
        self.broadcaster.push(Event::UnknownCard { zone: reader });
        self.feedback(Feedback::Denied);
        self.notice(Notice::Denied {
            reader: reader.to_string(),
        });
    }

    /// Move the gate machine; on an invalid move, reset to `Idle`.
    fn transition(&mut self, target: GateState, now: Instant) -> bool {
        match self.machine.transition_to(target, now) {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Gate machine fault");
                self.machine.reset(now);
                false
            }
        }
    }

    fn set_location(&mut self, id: PersonId, location: Location) {
        if let Err(e) = self.registry.set_location(id, location) {
            error!(person = %id, error = %e, "Failed to update location");
        }
    }

    fn feedback(&mut self, feedback: Feedback) {
        if let Err(e) = self.devices.indicator.burst(feedback) {
            warn!(feedback = ?feedback, error = %e, "Feedback burst failed");
        }
    }

    fn notice(&mut self, notice: Notice) {
        info!(notice = %notice, "Notice");
        if let Err(e) = self.devices.display.show(&notice) {
            warn!(error = %e, "Failed to show notice");
        }
    }
}
