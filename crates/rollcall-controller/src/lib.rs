//! Real-time access controller for the rollcall site.
//!
//! The [`Controller`] ties together every decision-making component:
//!
//! - [`CredentialDirectory`]: credential to person (or admin) lookup
//! - [`PersonRegistry`]: per-person location and occupancy counts
//! - [`policy`]: zone taps and the time-of-day occupancy rule
//! - [`GateMachine`]: exit sessions and their transition history
//! - [`AlarmController`]: bounded blinking alarm
//! - [`EventBroadcaster`]: outbound event queue and periodic status
//!
//! The controller never reads a clock. Every time-dependent operation takes
//! the current monotonic [`Instant`](std::time::Instant), so tests advance
//! time synthetically.
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use rollcall_core::{Credential, Person, ReaderId};
//! use rollcall_controller::{Controller, Devices, GateState, Roster, Timing};
//! use rollcall_hardware::BusArbiter;
//! use rollcall_hardware::mock::{MockBus, MockDisplay, MockGate, MockIndicator};
//!
//! let admin = Credential::from_hex("AD000001").unwrap();
//! let ada = Credential::from_hex("04A1B2C3").unwrap();
//! let mut roster = Roster::new(admin);
//! roster.enroll(Person::new(1, "Ada"), ada).unwrap();
//!
//! let (bus, readers) = MockBus::new();
//! let devices = Devices {
//!     poller: BusArbiter::new(bus, Duration::ZERO),
//!     gate: MockGate::new().0,
//!     indicator: MockIndicator::new().0,
//!     display: MockDisplay::new().0,
//! };
//! let mut controller = Controller::new(devices, roster, Timing::default()).unwrap();
//!
//! let start = Instant::now();
//! controller.boot(start);
//! readers.present(ReaderId::Gate, ada);
//! controller.tick(start + Duration::from_millis(50));
//!
//! assert_eq!(controller.snapshot().gate_state, GateState::WaitingApproval);
//! ```

pub mod alarm;
pub mod broadcaster;
pub mod controller;
pub mod directory;
pub mod error;
pub mod gate;
pub mod policy;
pub mod registry;
pub mod timing;

pub use alarm::AlarmController;
pub use broadcaster::EventBroadcaster;
pub use controller::{Controller, Devices, Snapshot};
pub use directory::{CredentialDirectory, Resolution, Roster};
pub use error::{ControllerError, Result};
pub use gate::{GateMachine, GateSession, GateState, StateTransition};
pub use registry::{Counts, PersonRegistry};
pub use timing::Timing;
