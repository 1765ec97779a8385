//! Configuration loaded from a TOML file.
//!
//! ```toml
//! [timing]
//! approval_timeout_ms = 20000
//! sneak_window_ms = 5000
//!
//! [roster]
//! admin_uid = "AD000001"
//!
//! [[roster.person]]
//! id = 1
//! name = "Ada"
//! class = "5B"
//! dorm = "H-12"
//! contact = "555-0101"
//! uid = "04A1B2C3"
//!
//! [hardware]
//! absent = ["hostel"]
//! ```
//!
//! Every section and key is optional.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rollcall_controller::{Roster, Timing};
use rollcall_core::constants::{
    DEFAULT_ALARM_BLINK_MS, DEFAULT_ALARM_DURATION_MS, DEFAULT_APPROVAL_TIMEOUT_MS,
    DEFAULT_GATE_OPEN_MS, DEFAULT_SETTLE_US, DEFAULT_SNEAK_WINDOW_MS, DEFAULT_STATUS_INTERVAL_MS,
    DEFAULT_TICK_MS,
};
use rollcall_core::{Credential, Person, ReaderId};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub hardware: HardwareConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub tick_ms: u64,
    pub approval_timeout_ms: u64,
    pub sneak_window_ms: u64,
    pub gate_open_ms: u64,
    pub alarm_duration_ms: u64,
    pub alarm_blink_ms: u64,
    pub status_interval_ms: u64,
    pub settle_us: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            approval_timeout_ms: DEFAULT_APPROVAL_TIMEOUT_MS,
            sneak_window_ms: DEFAULT_SNEAK_WINDOW_MS,
            gate_open_ms: DEFAULT_GATE_OPEN_MS,
            alarm_duration_ms: DEFAULT_ALARM_DURATION_MS,
            alarm_blink_ms: DEFAULT_ALARM_BLINK_MS,
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            settle_us: DEFAULT_SETTLE_US,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterConfig {
    /// Administrative override credential.
    #[serde(default)]
    pub admin_uid: Option<Credential>,
    #[serde(default, rename = "person")]
    pub people: Vec<PersonConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonConfig {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub dorm: String,
    #[serde(default)]
    pub contact: String,
    pub uid: Credential,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HardwareConfig {
    /// Readers to treat as failing their startup probe.
    #[serde(default)]
    pub absent: Vec<ReaderId>,
}

impl Config {
    /// Parse a configuration file.
    ///
    /// # Errors
    /// Fails if the file cannot be read or is not valid configuration.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    /// Fails on malformed TOML, unknown readers or bad credential hex.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load `path`, falling back to built-in defaults if it is not given or
    /// does not exist.
    ///
    /// # Errors
    /// Fails if an existing file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => {
                let config = Self::from_file(path)?;
                info!(
                    path = %path.display(),
                    people = config.roster.people.len(),
                    "Configuration loaded"
                );
                Ok(config)
            }
            Some(path) => {
                warn!(path = %path.display(), "Config file not found, using defaults with an empty roster");
                Ok(Self::default())
            }
            None => {
                info!("No config file given, using defaults with an empty roster");
                Ok(Self::default())
            }
        }
    }

    /// Timing windows, validated.
    ///
    /// # Errors
    /// Fails if any window is zero.
    pub fn timing(&self) -> Result<Timing> {
        let t = &self.timing;
        let timing = Timing {
            tick: Duration::from_millis(t.tick_ms),
            approval_timeout: Duration::from_millis(t.approval_timeout_ms),
            sneak_window: Duration::from_millis(t.sneak_window_ms),
            gate_open: Duration::from_millis(t.gate_open_ms),
            alarm_duration: Duration::from_millis(t.alarm_duration_ms),
            alarm_blink: Duration::from_millis(t.alarm_blink_ms),
            status_interval: Duration::from_millis(t.status_interval_ms),
            settle: Duration::from_micros(t.settle_us),
        };
        timing.validate().context("invalid [timing] section")?;
        Ok(timing)
    }

    /// Build the roster.
    ///
    /// # Errors
    /// Fails on duplicate ids or credentials, or a person holding the
    /// administrative credential.
    pub fn roster(&self) -> Result<Roster> {
        let mut roster = match self.roster.admin_uid {
            Some(admin) => Roster::new(admin),
            None => Roster::without_admin(),
        };
        for entry in &self.roster.people {
            let person = Person::new(entry.id, entry.name.clone())
                .with_class(entry.class.clone())
                .with_dorm(entry.dorm.clone())
                .with_contact(entry.contact.clone());
            roster
                .enroll(person, entry.uid)
                .with_context(|| format!("enrolling person {} ({})", entry.id, entry.name))?;
        }
        Ok(roster)
    }

    /// Returns `true` if `reader` is configured as absent.
    pub fn is_absent(&self, reader: ReaderId) -> bool {
        self.hardware.absent.contains(&reader)
    }
}
