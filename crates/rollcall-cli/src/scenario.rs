//! Scripted runs against the mock reader bus on a synthetic clock.
//!
//! A scenario is a TOML list of timed steps:
//!
//! ```toml
//! duration_ms = 30000
//!
//! [[step]]
//! at_ms = 0
//! action = "present"
//! reader = "gate"
//! uid = "04A1B2C3"
//!
//! [[step]]
//! at_ms = 1500
//! action = "remove"
//! reader = "gate"
//!
//! [[step]]
//! at_ms = 2000
//! action = "command"
//! line = "MODE:CLASS"
//! ```
//!
//! Steps take effect just before the first tick at or after `at_ms`. The
//! run lasts `duration_ms`, or one second past the last step.

use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rollcall_controller::{Controller, Devices, Snapshot};
use rollcall_core::{Credential, ReaderId};
use rollcall_hardware::{BusArbiter, CardPoller, GateActuator, Indicator, NoticeDisplay};
use rollcall_hardware::mock::{MockBus, MockDisplay, MockGate, MockIndicator};
use rollcall_protocol::{Command, Event};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Config;

/// Run time added after the last step when no duration is given.
const DEFAULT_TAIL_MS: u64 = 1_000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Put a card on a reader and leave it there.
    Present { reader: ReaderId, uid: Credential },
    /// Take the card off a reader.
    Remove { reader: ReaderId },
    /// Feed one inbound command line.
    Command { line: String },
}

/// Outcome of a scenario run.
#[derive(Debug, Clone)]
pub struct Summary {
    pub ticks: u64,
    pub events: usize,
    pub bus_violations: u64,
    pub final_state: Snapshot,
}

impl Scenario {
    /// # Errors
    /// Fails if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// # Errors
    /// Fails on malformed TOML or unknown actions.
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut scenario: Scenario = toml::from_str(text)?;
        scenario.steps.sort_by_key(|s| s.at_ms);
        Ok(scenario)
    }

    fn duration(&self) -> Duration {
        let last = self.steps.last().map_or(0, |s| s.at_ms);
        Duration::from_millis(self.duration_ms.unwrap_or(last.saturating_add(DEFAULT_TAIL_MS)))
    }
}

/// Run `scenario` and write every event to `out` as one JSON line.
///
/// # Errors
/// Fails on invalid configuration or if writing to `out` fails.
pub fn simulate<W: Write>(config: &Config, scenario: &Scenario, out: &mut W) -> Result<Summary> {
    let timing = config.timing()?;
    let roster = config.roster()?;

    let (bus, readers) = MockBus::new();
    for reader in ReaderId::ALL.into_iter().filter(|r| config.is_absent(*r)) {
        readers.fail_probe(reader);
    }
    let devices = Devices {
        poller: BusArbiter::new(bus, timing.settle),
        gate: MockGate::new().0,
        indicator: MockIndicator::new().0,
        display: MockDisplay::new().0,
    };
    let mut controller = Controller::new(devices, roster, timing).context("building controller")?;

    let start = Instant::now();
    let end = scenario.duration();
    let mut steps = scenario.steps.iter().peekable();
    let mut ticks = 0u64;
    let mut events = 0usize;

    controller.boot(start);
    events += write_events(&mut controller, out)?;

    let mut elapsed = Duration::ZERO;
    while elapsed < end {
        elapsed += timing.tick;
        let now = start + elapsed;

        while let Some(step) = steps.next_if(|s| Duration::from_millis(s.at_ms) <= elapsed) {
            debug!(at_ms = step.at_ms, action = ?step.action, "Scenario step");
            match &step.action {
                Action::Present { reader, uid } => readers.present(*reader, *uid),
                Action::Remove { reader } => readers.remove(*reader),
                Action::Command { line } => match Command::parse(line) {
                    Some(command) => controller.handle_command(command, now),
                    None => debug!(line = %line, "Ignoring unrecognized command"),
                },
            }
        }

        controller.tick(now);
        ticks += 1;
        events += write_events(&mut controller, out)?;
    }

    let summary = Summary {
        ticks,
        events,
        bus_violations: readers.violations(),
        final_state: controller.snapshot(),
    };
    info!(
        ticks = summary.ticks,
        events = summary.events,
        bus_violations = summary.bus_violations,
        gate_state = %summary.final_state.gate_state,
        "Scenario finished"
    );
    Ok(summary)
}

fn write_events<P, G, I, D, W>(controller: &mut Controller<P, G, I, D>, out: &mut W) -> Result<usize>
where
    P: CardPoller,
    G: GateActuator,
    I: Indicator,
    D: NoticeDisplay,
    W: Write,
{
    let pending: Vec<Event> = controller.drain_events().collect();
    for event in &pending {
        writeln!(out, "{}", event.to_json()?).context("writing event")?;
    }
    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps_sorted() {
        let scenario = Scenario::from_toml(
            r#"
[[step]]
at_ms = 900
action = "remove"
reader = "gate"

[[step]]
at_ms = 100
action = "present"
reader = "gate"
uid = "04A1B2C3"
"#,
        )
        .unwrap();

        assert_eq!(scenario.steps.len(), 2);
        assert_eq!(scenario.steps[0].at_ms, 100);
        assert!(matches!(
            scenario.steps[0].action,
            Action::Present {
                reader: ReaderId::Gate,
                ..
            }
        ));
        assert_eq!(scenario.duration(), Duration::from_millis(1_900));
    }

    #[test]
    fn test_unknown_action_rejected() {
        let text = "[[step]]\nat_ms = 0\naction = \"shake\"\nreader = \"gate\"\n";
        assert!(Scenario::from_toml(text).is_err());
    }

    #[test]
    fn test_tail_saturates_on_huge_step_time() {
        let scenario = Scenario {
            duration_ms: None,
            steps: vec![Step {
                at_ms: u64::MAX,
                action: Action::Remove {
                    reader: ReaderId::Gate,
                },
            }],
        };
        assert_eq!(scenario.duration(), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_explicit_duration() {
        let scenario = Scenario::from_toml("duration_ms = 250\n").unwrap();
        assert_eq!(scenario.duration(), Duration::from_millis(250));
    }
}
