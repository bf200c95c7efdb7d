use std::collections::HashSet;

use chrono::NaiveDate;
use log::debug;

use crate::error::MalformedRosterError;
use crate::roster::types::{RosterPayload, Shift, ShiftEvent};

const DAY_PREFIX: &str = "Day ";

/// Parses a day label (e.g., "Day 7") into its day of month
fn parse_day_label(label: &str) -> Result<u32, MalformedRosterError> {
    let digits = label
        .strip_prefix(DAY_PREFIX)
        .ok_or_else(|| MalformedRosterError::DayLabel(label.to_string()))?;

    // `u32::from_str` accepts a leading '+', the roster format does not
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(MalformedRosterError::DayLabel(label.to_string()));
    }

    digits
        .parse()
        .map_err(|_| MalformedRosterError::DayLabel(label.to_string()))
}

/// Converts a roster payload into one shift event per (day, shift) pair
///
/// The payload only carries days of the month, so the caller supplies the year and
/// month (1-based) the roster describes. Employee lists are kept verbatim.
///
/// Fails on the first malformed day label, unknown shift, impossible date or
/// repeated (day, shift) pair. Nothing is skipped.
pub fn parse(
    payload: RosterPayload,
    reference_year: i32,
    reference_month: u32,
) -> Result<Vec<ShiftEvent>, MalformedRosterError> {
    let mut events = Vec::new();
    let mut seen: HashSet<(u32, Shift)> = HashSet::new();

    for (label, shifts) in payload.days {
        let day = parse_day_label(&label)?;
        let date = NaiveDate::from_ymd_opt(reference_year, reference_month, day).ok_or(
            MalformedRosterError::InvalidDate {
                year: reference_year,
                month: reference_month,
                day,
            },
        )?;

        for (shift_key, employees) in shifts {
            let shift: Shift = shift_key.parse()?;
            if !seen.insert((day, shift)) {
                return Err(MalformedRosterError::DuplicateShift {
                    day,
                    shift: shift_key,
                });
            }
            events.push(ShiftEvent::new(date, shift, employees));
        }
    }

    debug!(
        "Parsed {} shift events for {:04}-{:02}",
        events.len(),
        reference_year,
        reference_month
    );
    Ok(events)
}

/// Decodes a JSON roster body and parses it against the given month
pub fn parse_json(
    body: &[u8],
    reference_year: i32,
    reference_month: u32,
) -> Result<Vec<ShiftEvent>, MalformedRosterError> {
    let payload: RosterPayload = serde_json::from_slice(body)?;
    parse(payload, reference_year, reference_month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_single_day() {
        let events = parse_json(br#"{"Day 5": {"day": ["A", "B"]}}"#, 2024, 3).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, date(2024, 3, 5));
        assert_eq!(events[0].shift, Shift::Day);
        assert_eq!(events[0].employees, vec!["A", "B"]);
        assert_eq!(events[0].title, "DAY Shift: A, B");
    }

    #[test]
    fn keeps_employees_verbatim() {
        let events =
            parse_json(br#"{"Day 1": {"night": [" Z ", "A", "A"]}}"#, 2024, 1).unwrap();
        assert_eq!(events[0].employees, vec![" Z ", "A", "A"]);
    }

    #[test]
    fn emits_one_event_per_shift() {
        let body = br#"{
            "Day 2": {"day": ["A"], "swing": [], "night": ["C"]},
            "Day 1": {"swing": ["B"]}
        }"#;
        let events = parse_json(body, 2024, 2).unwrap();

        assert_eq!(events.len(), 4);
        assert_eq!(events[1].shift, Shift::Swing);
        assert!(events[1].employees.is_empty());
        assert_eq!(events[3].date, date(2024, 2, 1));
    }

    #[test]
    fn rejects_non_numeric_day() {
        let err = parse_json(br#"{"Day X": {"day": ["A"]}}"#, 2024, 3).unwrap_err();
        assert!(matches!(err, MalformedRosterError::DayLabel(ref l) if l == "Day X"));
    }

    #[test]
    fn rejects_missing_prefix_and_signs() {
        for label in ["5", "Day", "Day ", "Day +5", "Day -1", "day 5"] {
            assert!(parse_day_label(label).is_err(), "{label} should be rejected");
        }
        assert_eq!(parse_day_label("Day 07").unwrap(), 7);
    }

    #[test]
    fn rejects_unknown_shift() {
        let err = parse_json(br#"{"Day 1": {"graveyard": ["A"]}}"#, 2024, 3).unwrap_err();
        assert!(matches!(err, MalformedRosterError::UnknownShift(ref s) if s == "graveyard"));
    }

    #[test]
    fn rejects_day_outside_month() {
        let err = parse_json(br#"{"Day 30": {"day": ["A"]}}"#, 2023, 2).unwrap_err();
        assert!(matches!(
            err,
            MalformedRosterError::InvalidDate { year: 2023, month: 2, day: 30 }
        ));
        assert!(parse_json(br#"{"Day 0": {"day": []}}"#, 2023, 2).is_err());
    }

    #[test]
    fn rejects_duplicate_day_shift() {
        let repeated_key = br#"{"Day 3": {"day": ["A"]}, "Day 3": {"day": ["B"]}}"#;
        assert!(matches!(
            parse_json(repeated_key, 2024, 3),
            Err(MalformedRosterError::DuplicateShift { day: 3, .. })
        ));

        let same_day_two_labels = br#"{"Day 3": {"day": ["A"]}, "Day 03": {"day": ["B"]}}"#;
        assert!(parse_json(same_day_two_labels, 2024, 3).is_err());

        let repeated_shift = br#"{"Day 3": {"night": ["A"], "night": ["B"]}}"#;
        assert!(parse_json(repeated_shift, 2024, 3).is_err());
    }

    #[test]
    fn same_shift_on_different_days_is_fine() {
        let body = br#"{"Day 3": {"day": ["A"]}, "Day 4": {"day": ["A"]}}"#;
        assert_eq!(parse_json(body, 2024, 3).unwrap().len(), 2);
    }

    #[test]
    fn rejects_bad_json_shapes() {
        assert!(matches!(
            parse_json(b"not json", 2024, 3),
            Err(MalformedRosterError::Json(_))
        ));
        assert!(parse_json(br#"{"Day 1": {"day": [1, 2]}}"#, 2024, 3).is_err());
        assert!(parse_json(br#"["Day 1"]"#, 2024, 3).is_err());
    }

    #[test]
    fn empty_payload_yields_no_events() {
        assert!(parse_json(b"{}", 2024, 3).unwrap().is_empty());
    }
}
