//! Shared test rig: a controller wired to mock hardware and a synthetic clock.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use rollcall_controller::{Controller, Devices, Roster, Timing};
use rollcall_core::{Credential, Person, ReaderId};
use rollcall_hardware::BusArbiter;
use rollcall_hardware::mock::{
    MockBus, MockBusHandle, MockDisplay, MockDisplayHandle, MockGate, MockGateHandle,
    MockIndicator, MockIndicatorHandle,
};
use rollcall_protocol::Event;

pub const TICK: Duration = Duration::from_millis(50);

pub type TestController = Controller<BusArbiter<MockBus>, MockGate, MockIndicator, MockDisplay>;

pub fn card(hex: &str) -> Credential {
    Credential::from_hex(hex).unwrap()
}

pub fn admin() -> Credential {
    card("AD000001")
}

pub fn ada() -> Credential {
    card("04A1B2C3")
}

pub fn bo() -> Credential {
    card("04B0B0B0")
}

pub fn stranger() -> Credential {
    card("DEADBEEF")
}

pub fn roster() -> Roster {
    let mut roster = Roster::new(admin());
    roster
        .enroll(
            Person::new(1, "Ada")
                .with_class("5B")
                .with_dorm("H-12")
                .with_contact("555-0101"),
            ada(),
        )
        .unwrap();
    roster
        .enroll(Person::new(2, "Bo").with_class("4A"), bo())
        .unwrap();
    roster
        .enroll(Person::new(3, "Cy").with_class("4A"), card("04C0C0C0C0C0C0"))
        .unwrap();
    roster
}

pub struct Rig {
    pub controller: TestController,
    pub readers: MockBusHandle,
    pub gate: MockGateHandle,
    pub indicator: MockIndicatorHandle,
    pub display: MockDisplayHandle,
    pub now: Instant,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_absent(&[])
    }

    /// Build a booted rig whose `absent` readers fail their startup probe.
    pub fn with_absent(absent: &[ReaderId]) -> Self {
        let (bus, readers) = MockBus::new();
        for &reader in absent {
            readers.fail_probe(reader);
        }
        let (gate, gate_handle) = MockGate::new();
        let (indicator, indicator_handle) = MockIndicator::new();
        let (display, display_handle) = MockDisplay::new();

        let timing = Timing::default();
        let devices = Devices {
            poller: BusArbiter::new(bus, timing.settle),
            gate,
            indicator,
            display,
        };
        let mut controller = Controller::new(devices, roster(), timing).unwrap();

        let now = Instant::now();
        controller.boot(now);

        Self {
            controller,
            readers,
            gate: gate_handle,
            indicator: indicator_handle,
            display: display_handle,
            now,
        }
    }

    /// Run one tick at `t`.
    pub fn at(&mut self, t: Instant) {
        self.now = t;
        self.controller.tick(t);
    }

    /// Run one tick one period after the last one.
    pub fn step(&mut self) {
        self.at(self.now + TICK);
    }

    /// Keep ticking at the normal period for `duration`.
    pub fn run_for(&mut self, duration: Duration) {
        let end = self.now + duration;
        while self.now + TICK <= end {
            self.step();
        }
        if self.now < end {
            self.at(end);
        }
    }

    /// Hold `credential` on `reader` for exactly one tick.
    pub fn tap(&mut self, reader: ReaderId, credential: Credential) {
        self.readers.present(reader, credential);
        self.step();
        self.readers.remove(reader);
    }

    pub fn events(&mut self) -> Vec<Event> {
        self.controller.drain_events().collect()
    }
}

pub fn kinds(events: &[Event]) -> Vec<&'static str> {
    events.iter().map(Event::kind).collect()
}

pub fn count(events: &[Event], kind: &str) -> usize {
    events.iter().filter(|e| e.kind() == kind).count()
}
