//! Enum wrappers for hardware device dispatch.
//!
//! The controller is generic over its devices. The binary picks a concrete
//! backend at startup, so it needs one concrete type per device role; these
//! enums provide it without boxing.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use rollcall_hardware::BusArbiter;
//! use rollcall_hardware::devices::AnyReaderBus;
//! use rollcall_hardware::mock::MockBus;
//!
//! let (bus, _handle) = MockBus::new();
//! let arbiter = BusArbiter::new(AnyReaderBus::Mock(bus), Duration::ZERO);
//! assert_eq!(arbiter.available_count(), 3);
//! ```

use std::time::Duration;

use rollcall_core::ReaderId;

use crate::mock::MockBus;
use crate::traits::ReaderBus;
use crate::{ReaderInfo, Result};

/// Enum wrapper for reader bus dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyReaderBus {
    /// Mock bus for development, testing and scenario simulation.
    Mock(MockBus),
    // TODO: add an Spi(Mfrc522Bus) variant behind the `hardware-spi` feature
    // once the SPI driver for the three-reader board lands.
}

impl ReaderBus for AnyReaderBus {
    fn probe(&mut self, reader: ReaderId) -> Result<ReaderInfo> {
        match self {
            Self::Mock(bus) => bus.probe(reader),
        }
    }

    fn deselect_all(&mut self) {
        match self {
            Self::Mock(bus) => bus.deselect_all(),
        }
    }

    fn select(&mut self, reader: ReaderId) {
        match self {
            Self::Mock(bus) => bus.select(reader),
        }
    }

    fn set_antenna(&mut self, reader: ReaderId, enabled: bool) -> Result<()> {
        match self {
            Self::Mock(bus) => bus.set_antenna(reader, enabled),
        }
    }

    fn settle(&mut self, duration: Duration) {
        match self {
            Self::Mock(bus) => bus.settle(duration),
        }
    }

    fn wake(&mut self) -> Result<Option<Vec<u8>>> {
        match self {
            Self::Mock(bus) => bus.wake(),
        }
    }

    fn halt(&mut self) -> Result<()> {
        match self {
            Self::Mock(bus) => bus.halt(),
        }
    }
}
