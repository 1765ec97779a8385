//! Outbound event queue.
//!
//! The controller pushes events here as it makes decisions; the runtime
//! drains the queue after every tick and writes the events to the stream.
//! The broadcaster also owns the periodic `status` timer.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rollcall_core::SystemMode;
use rollcall_protocol::Event;
use tracing::debug;

use crate::registry::PersonRegistry;

#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    outbox: VecDeque<Event>,
    status_interval: Duration,
    last_status: Option<Instant>,
}

impl EventBroadcaster {
    pub fn new(status_interval: Duration) -> Self {
        Self {
            outbox: VecDeque::new(),
            status_interval,
            last_status: None,
        }
    }

    /// Queue one event.
    pub fn push(&mut self, event: Event) {
        debug!(event = event.kind(), "Queued event");
        self.outbox.push_back(event);
    }

    /// Queue a `status` snapshot and restart the periodic timer.
    pub fn status(&mut self, registry: &PersonRegistry, mode: SystemMode, now: Instant) {
        let counts = registry.counts();
        self.push(Event::Status {
            classroom: counts.classroom,
            hostel: counts.hostel,
            left: counts.left,
            sneaked: counts.sneaked,
            mode,
        });
        self.last_status = Some(now);
    }

    /// Queue a `status` if `status_interval` has passed since the last one.
    pub fn status_if_due(&mut self, registry: &PersonRegistry, mode: SystemMode, now: Instant) {
        let due = self
            .last_status
            .is_none_or(|last| now.saturating_duration_since(last) >= self.status_interval);
        if due {
            self.status(registry, mode, now);
        }
    }

    /// Queue one `student_info` per person followed by one `status`.
    pub fn sync(&mut self, registry: &PersonRegistry, mode: SystemMode, now: Instant) {
        for (person, location) in registry.iter() {
            self.push(Event::student_info(person, location));
        }
        self.status(registry, mode, now);
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.outbox.drain(..)
    }

    /// Queued events, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Event> {
        self.outbox.iter()
    }

    pub fn len(&self) -> usize {
        self.outbox.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outbox.is_empty()
    }
}
