//! Date and track selection over a loaded month of shift events
//!
//! The resolver owns the loaded `EventsByTrack` and every piece of selection state.
//! Each mutating call ends by recomputing the selected employees through
//! [`resolve_employees`], so the cached list never drifts from its inputs.

use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use serde::Serialize;

use crate::roster::{partition, EventsByTrack, Shift, ShiftEvent, YearMonth};

/// Employees staffed on `date` for `track`, flattened in event order
pub fn resolve_employees(events: &EventsByTrack, track: Shift, date: NaiveDate) -> Vec<String> {
    events
        .track(track)
        .iter()
        .filter(|event| event.date == date)
        .flat_map(|event| event.employees.iter().cloned())
        .collect()
}

/// Drops any time-of-day component
fn to_calendar_date<D: Datelike>(date: &D) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), date.day())
}

/// Result of a date or event selection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Selected,
    /// The date lies outside the visible month; nothing changed
    Rejected,
}

/// Whether the resolver holds a loaded month yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready(EventsByTrack),
}

/// Read-only view of the selection, handed to the calendar view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    pub active_track: Shift,
    pub selected_date: Option<NaiveDate>,
    pub selected_employees: Vec<String>,
    pub visible_month: YearMonth,
}

pub struct SelectionResolver {
    state: LoadState,
    active_track: Shift,
    selected_date: Option<NaiveDate>,
    selected_employees: Vec<String>,
    visible_month: YearMonth,
}

impl SelectionResolver {
    /// Creates a resolver in the loading state, showing `visible_month` on the day track
    pub fn new(visible_month: YearMonth) -> Self {
        Self {
            state: LoadState::Loading,
            active_track: Shift::Day,
            selected_date: None,
            selected_employees: Vec::new(),
            visible_month,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, LoadState::Ready(_))
    }

    /// Loaded events, or `None` while still loading
    pub fn events(&self) -> Option<&EventsByTrack> {
        match &self.state {
            LoadState::Ready(events) => Some(events),
            LoadState::Loading => None,
        }
    }

    /// Events of the active track; empty while loading
    pub fn active_events(&self) -> &[ShiftEvent] {
        self.events()
            .map(|events| events.track(self.active_track))
            .unwrap_or(&[])
    }

    pub fn active_track(&self) -> Shift {
        self.active_track
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn selected_employees(&self) -> &[String] {
        &self.selected_employees
    }

    pub fn visible_month(&self) -> YearMonth {
        self.visible_month
    }

    pub fn snapshot(&self) -> SelectionState {
        SelectionState {
            active_track: self.active_track,
            selected_date: self.selected_date,
            selected_employees: self.selected_employees.clone(),
            visible_month: self.visible_month,
        }
    }

    /// Selects `date` on the active track
    pub fn select_date<D: Datelike>(&mut self, date: D) -> SelectionOutcome {
        self.select_date_on(date, self.active_track)
    }

    /// Selects `date` and resolves staffing against `track`
    ///
    /// Dates outside the visible month are rejected and leave the state unchanged.
    /// `track` is only used for this resolution; the active track stays as it is.
    pub fn select_date_on<D: Datelike>(&mut self, date: D, track: Shift) -> SelectionOutcome {
        let Some(date) = to_calendar_date(&date) else {
            return SelectionOutcome::Rejected;
        };

        if !self.visible_month.contains(&date) {
            debug!(
                "Ignoring selection of {} outside visible month {}",
                date, self.visible_month
            );
            return SelectionOutcome::Rejected;
        }

        self.selected_date = Some(date);
        self.selected_employees = self.resolve(track, date);
        debug!(
            "Selected {} on {} track: {} employee(s)",
            date,
            track,
            self.selected_employees.len()
        );
        SelectionOutcome::Selected
    }

    /// Selects the date of a clicked event, resolved against that event's track
    pub fn select_event(&mut self, event: &ShiftEvent) -> SelectionOutcome {
        self.select_date_on(event.date, event.shift)
    }

    /// Switches the active track, keeping the selected date
    pub fn change_track(&mut self, track: Shift) {
        self.active_track = track;
        if let Some(date) = self.selected_date {
            self.selected_employees = self.resolve(track, date);
        }
    }

    /// Records the month now shown; the current selection is left alone
    pub fn on_month_navigate(&mut self, month: YearMonth) {
        self.visible_month = month;
    }

    /// Replaces the loaded events with a freshly parsed month
    ///
    /// If nothing is selected yet, `today` is selected on the active track.
    pub fn on_data_loaded(&mut self, events: Vec<ShiftEvent>, today: NaiveDate) {
        self.state = LoadState::Ready(partition(events));

        match self.selected_date {
            Some(date) => {
                self.selected_employees = self.resolve(self.active_track, date);
            }
            None => {
                // Auto-select bypasses the visible-month guard
                self.selected_date = Some(today);
                self.selected_employees = self.resolve(self.active_track, today);
                info!(
                    "Auto-selected today ({}) on {} track: {} employee(s)",
                    today,
                    self.active_track,
                    self.selected_employees.len()
                );
            }
        }
    }

    fn resolve(&self, track: Shift, date: NaiveDate) -> Vec<String> {
        match &self.state {
            LoadState::Ready(events) => resolve_employees(events, track, date),
            LoadState::Loading => Vec::new(),
        }
    }
}
