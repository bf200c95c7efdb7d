//! Error types for roster loading, sessions and configuration
//!
//! Nothing here is fatal to the process. A failed load or a failed session query
//! leaves whatever good state was already in place untouched.

use std::time::Duration;

use thiserror::Error;

use crate::roster::Shift;

/// The roster payload broke the data contract
#[derive(Debug, Error)]
pub enum MalformedRosterError {
    #[error("Roster is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid day label {0:?}, expected \"Day <number>\"")]
    DayLabel(String),

    #[error("Day {day} does not exist in {year:04}-{month:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("Unknown shift identifier {0:?}")]
    UnknownShift(String),

    #[error("Day {day} lists the {shift} shift more than once")]
    DuplicateShift { day: u32, shift: String },
}

/// No roster satisfies the staffing rules with the employees available
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("{shift} requirements cover {actual} days, expected {expected}")]
    RequirementLength {
        shift: Shift,
        expected: usize,
        actual: usize,
    },

    #[error("Employee {0:?} is defined more than once")]
    DuplicateEmployee(String),

    #[error("Day {day}: {shift} shift needs {needed} employees, only {available} can work")]
    Understaffed {
        day: u32,
        shift: Shift,
        needed: u32,
        available: usize,
    },

    #[error("Day {day}: no senior employee can work the {shift} shift")]
    NoSenior { day: u32, shift: Shift },
}

/// The roster source could not be reached or answered badly
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Roster source answered with HTTP {0}")]
    Status(u16),

    #[error("Roster fetch timed out after {0:?}")]
    TimedOut(Duration),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Why a schedule load did not replace the current events
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unable to load schedule: {0}")]
    Fetch(#[from] FetchError),

    #[error("Schedule data is malformed: {0}")]
    Malformed(#[from] MalformedRosterError),
}

impl LoadError {
    /// Returns true for transport failures, false for data-contract failures
    pub fn is_transport(&self) -> bool {
        matches!(self, LoadError::Fetch(_))
    }
}

/// Errors from the identity/session provider
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Session provider error: {0}")]
    Provider(String),
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        SessionError::Provider(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}
