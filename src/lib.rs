//! Monthly shift calendar: roster generation and ingestion, track partitioning and date selection,
//! plus the session-gated console client and the roster/session server around them.

pub mod config;
pub mod display;
pub mod error;
pub mod loader;
pub mod roster;
pub mod selection;
pub mod session;
pub mod source;
pub mod view;
pub mod web;

pub use error::{
    ConfigError, FetchError, GenerateError, LoadError, MalformedRosterError, SessionError,
};
pub use loader::{Clock, FixedClock, LoadOutcome, LoadStatus, ScheduleLoader, SystemClock};
pub use roster::{partition, EventsByTrack, RosterPayload, Shift, ShiftEvent, YearMonth};
pub use selection::{SelectionOutcome, SelectionResolver, SelectionState};
pub use session::{IdentityProvider, SessionContext, User};
pub use source::{HttpRosterSource, RosterSource};
