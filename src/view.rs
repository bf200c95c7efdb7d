//! Calendar view adapter
//!
//! Maps events and selection state to cell and event presentation, and turns UI
//! gestures into resolver calls. It holds no state of its own.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;

use crate::roster::{Shift, ShiftEvent, YearMonth};
use crate::selection::{SelectionOutcome, SelectionResolver, SelectionState};

pub const CELL_CLASS: &str = "custom-date-cell";
pub const SELECTED_CELL_CLASS: &str = "selected-date-cell";
pub const DISABLED_CELL_CLASS: &str = "disabled-date-cell";

/// Inline style of an event block on the calendar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventStyle {
    pub background_color: &'static str,
    pub border_radius: &'static str,
    pub opacity: f32,
    pub color: &'static str,
    pub border: &'static str,
    pub display: &'static str,
}

pub fn shift_color(shift: Shift) -> &'static str {
    match shift {
        Shift::Day => "#1e90ff",
        Shift::Swing => "#ff8c00",
        Shift::Night => "#6a5acd",
    }
}

pub fn event_style(event: &ShiftEvent, is_selected: bool) -> EventStyle {
    EventStyle {
        background_color: shift_color(event.shift),
        border_radius: "0px",
        opacity: 0.8,
        color: "white",
        border: if is_selected { "2px solid red" } else { "0px" },
        display: "block",
    }
}

/// CSS classes of a calendar cell: selected date, and disabled outside the visible month
pub fn day_cell_class(date: NaiveDate, state: &SelectionState) -> String {
    let mut class = CELL_CLASS.to_string();

    if state.selected_date == Some(date) {
        class.push(' ');
        class.push_str(SELECTED_CELL_CLASS);
    }

    if !state.visible_month.contains(&date) {
        class.push(' ');
        class.push_str(DISABLED_CELL_CLASS);
    }

    class
}

/// Tab order is day, swing, night
pub fn shift_for_tab(index: usize) -> Option<Shift> {
    Shift::ALL.get(index).copied()
}

pub fn tab_for_shift(shift: Shift) -> usize {
    match shift {
        Shift::Day => 0,
        Shift::Swing => 1,
        Shift::Night => 2,
    }
}

/// A raw gesture coming from the calendar widget
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// An empty cell was clicked; the widget reports the cell's start time
    DateClicked(NaiveDateTime),
    EventClicked(ShiftEvent),
    TabChanged(Shift),
    /// Prev/next/today navigation; any date inside the newly shown month
    Navigated(NaiveDate),
}

/// Forwards a gesture to the resolver
///
/// Returns the selection outcome for clicks, `None` for tab and navigation gestures.
pub fn dispatch(
    resolver: &mut SelectionResolver,
    interaction: Interaction,
) -> Option<SelectionOutcome> {
    match interaction {
        Interaction::DateClicked(at) => Some(resolver.select_date(at)),
        Interaction::EventClicked(event) => Some(resolver.select_event(&event)),
        Interaction::TabChanged(shift) => {
            resolver.change_track(shift);
            None
        }
        Interaction::Navigated(date) => {
            resolver.on_month_navigate(YearMonth::of(&date));
            None
        }
    }
}

/// Dates of the month grid, whole weeks starting on Monday
///
/// Leading and trailing cells belong to the adjacent months.
pub fn month_grid(month: YearMonth) -> Vec<NaiveDate> {
    let Some(first) = month.first_day() else {
        return Vec::new();
    };
    let start = first - Duration::days(first.weekday().num_days_from_monday() as i64);

    let mut cells = Vec::with_capacity(42);
    let mut current = start;
    loop {
        cells.push(current);
        let next = current + Duration::days(1);
        if current.weekday() == Weekday::Sun && !month.contains(&next) {
            break;
        }
        current = next;
    }
    cells
}
