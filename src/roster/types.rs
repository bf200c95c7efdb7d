use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::MalformedRosterError;

/// One of the three shift tracks a roster is split into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Day,
    Swing,
    Night,
}

impl Shift {
    /// All tracks, in tab order
    pub const ALL: [Shift; 3] = [Shift::Day, Shift::Swing, Shift::Night];

    /// Wire identifier used in roster payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Day => "day",
            Shift::Swing => "swing",
            Shift::Night => "night",
        }
    }

    /// Tab label shown above the calendar
    pub fn label(&self) -> &'static str {
        match self {
            Shift::Day => "Day Shift",
            Shift::Swing => "Swing Shift",
            Shift::Night => "Night Shift",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shift {
    type Err = MalformedRosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Shift::Day),
            "swing" => Ok(Shift::Swing),
            "night" => Ok(Shift::Night),
            other => Err(MalformedRosterError::UnknownShift(other.to_string())),
        }
    }
}

/// A shift track staffed by a set of employees on one calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftEvent {
    pub date: NaiveDate,
    pub shift: Shift,
    pub employees: Vec<String>,
    pub title: String,
}

impl ShiftEvent {
    pub fn new(date: NaiveDate, shift: Shift, employees: Vec<String>) -> Self {
        let title = format!(
            "{} Shift: {}",
            shift.as_str().to_uppercase(),
            employees.join(", ")
        );
        Self {
            date,
            shift,
            employees,
            title,
        }
    }
}

/// Employees listed for each shift of one roster day, in payload order
pub type DayShifts = Vec<(String, Vec<String>)>;

/// Raw roster as received from the roster source: `{"Day N": {"<shift>": [names]}}`
///
/// Keys are kept as received, in order and including repeats, so that the parser
/// can reject a payload that lists the same day or shift twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterPayload {
    pub days: Vec<(String, DayShifts)>,
}

impl RosterPayload {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl<'de> Deserialize<'de> for RosterPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PayloadVisitor;

        impl<'de> Visitor<'de> for PayloadVisitor {
            type Value = RosterPayload;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of day labels to shift rosters")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut days = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, shifts)) = map.next_entry::<String, OrderedShifts>()? {
                    days.push((key, shifts.0));
                }
                Ok(RosterPayload { days })
            }
        }

        deserializer.deserialize_map(PayloadVisitor)
    }
}

/// Inner `{"<shift>": [names]}` map, order and repeats preserved
struct OrderedShifts(DayShifts);

impl<'de> Deserialize<'de> for OrderedShifts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ShiftsVisitor;

        impl<'de> Visitor<'de> for ShiftsVisitor {
            type Value = OrderedShifts;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of shift identifiers to employee lists")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut shifts = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Vec<String>>()? {
                    shifts.push(entry);
                }
                Ok(OrderedShifts(shifts))
            }
        }

        deserializer.deserialize_map(ShiftsVisitor)
    }
}

/// Year and month shown by the calendar navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based, January = 1
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Month containing the given date
    pub fn of<D: chrono::Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains<D: chrono::Datelike>(&self, date: &D) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Number of days in the month; 0 for an out-of-range month
    pub fn num_days(&self) -> u32 {
        match (self.first_day(), self.next().first_day()) {
            (Some(first), Some(next)) => (next - first).num_days() as u32,
            _ => 0,
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

