//! Mock device implementations for testing and simulation.
//!
//! This module provides simulated devices that can be controlled and
//! inspected programmatically without physical hardware. Each device comes
//! with a cloneable handle sharing its state.

pub mod bus;
pub mod outputs;

// Re-export commonly used types
pub use bus::{BusOp, MockBus, MockBusHandle};
pub use outputs::{
    GateCommand, MockDisplay, MockDisplayHandle, MockGate, MockGateHandle, MockIndicator,
    MockIndicatorHandle,
};
