//! Hardware layer for the rollcall controller.
//!
//! This crate owns everything that touches physical devices:
//!
//! - [`ReaderBus`]: raw access to the bus shared by the Gate, Classroom and
//!   Hostel readers.
//! - [`BusArbiter`]: the only holder of a [`ReaderBus`]. It serializes reader
//!   access and manages antenna lifecycles so that idle readers never pick up
//!   a neighbor's card.
//! - [`CardPoller`]: the opaque poll capability handed to the controller.
//! - [`GateActuator`], [`Indicator`], [`NoticeDisplay`]: output devices.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use rollcall_core::{Credential, ReaderId};
//! use rollcall_hardware::{BusArbiter, CardPoller};
//! use rollcall_hardware::mock::MockBus;
//!
//! let (bus, handle) = MockBus::new();
//! let mut poller = BusArbiter::new(bus, Duration::from_micros(500));
//!
//! let card = Credential::from_hex("04A1B2C3").unwrap();
//! handle.present(ReaderId::Gate, card);
//!
//! for reader in ReaderId::ALL {
//!     if let Some(found) = poller.poll(reader) {
//!         println!("{reader}: {found}");
//!     }
//! }
//! ```
//!
//! # Mock Implementations
//!
//! The [`mock`] module provides devices with inspection handles for tests and
//! for the simulator binary.

pub mod arbiter;
pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use arbiter::{BusArbiter, ReaderStats};
pub use error::{HardwareError, Result};
pub use traits::{CardPoller, GateActuator, Indicator, NoticeDisplay, ReaderBus};
pub use types::{Feedback, Notice, Pulse, ReaderInfo};
