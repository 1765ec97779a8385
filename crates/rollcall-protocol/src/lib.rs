//! Wire format of the rollcall event stream.
//!
//! The controller talks to the dashboard over a line-oriented text channel:
//!
//! - **Outbound**: one JSON object per line ([`Event`]).
//! - **Inbound**: one plain-text command per line ([`Command`]); lines that
//!   are not recognized are ignored.
//!
//! [`EventCodec`] and [`CommandCodec`] plug both directions into
//! `tokio_util::codec::{FramedRead, FramedWrite}`.

pub mod codec;
pub mod command;
pub mod error;
pub mod event;

pub use codec::{CommandCodec, EventCodec};
pub use command::Command;
pub use error::{ProtocolError, Result};
pub use event::{AlarmReason, BootStatus, Event};
