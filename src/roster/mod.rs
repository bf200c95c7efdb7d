pub mod types;
pub mod parser;
pub mod partition;
pub mod generate;

pub use types::{DayShifts, RosterPayload, Shift, ShiftEvent, YearMonth};
pub use parser::{parse, parse_json};
pub use partition::{partition, EventsByTrack};
pub use generate::{
    generate, generate_for_month, Employee, GeneratedRoster, Level, ShiftRequirements,
    DEFAULT_MAX_CONSECUTIVE_DAYS,
};
