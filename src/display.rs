use chrono::Datelike;

use crate::loader::LoadStatus;
use crate::roster::{Shift, YearMonth};
use crate::selection::{SelectionResolver, SelectionState};
use crate::session::SessionContext;
use crate::view::{month_grid, tab_for_shift};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Formats a month as e.g. "March 2024"
pub fn format_month(month: YearMonth) -> String {
    let name = MONTH_NAMES
        .get(month.month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("?");
    format!("{} {}", name, month.year)
}

/// Renders the shift tabs with the active one in brackets, plus the signed-in user
pub fn render_header(active: Shift, session: &SessionContext) -> String {
    let active_tab = tab_for_shift(active);
    let tabs: Vec<String> = Shift::ALL
        .iter()
        .enumerate()
        .map(|(i, shift)| {
            if i == active_tab {
                format!("[{}]", shift.label())
            } else {
                format!(" {} ", shift.label())
            }
        })
        .collect();

    match session.display_name() {
        Some(name) => format!("{}   signed in as {}", tabs.join(" "), name),
        None => tabs.join(" "),
    }
}

/// Renders the month grid of the active track
///
/// `*` marks a day with staff on the active track, brackets mark the selected date,
/// and days of adjacent months are shown as `..`.
pub fn render_month(resolver: &SelectionResolver) -> String {
    let month = resolver.visible_month();
    let selected = resolver.selected_date();
    let events = resolver.active_events();

    let mut out = String::new();
    out.push_str(&format!("{:^35}\n", format_month(month)));
    out.push_str("  Mo   Tu   We   Th   Fr   Sa   Su\n");

    for week in month_grid(month).chunks(7) {
        for date in week {
            let cell = if !month.contains(date) {
                "  .. ".to_string()
            } else {
                let staffed = events
                    .iter()
                    .any(|e| e.date == *date && !e.employees.is_empty());
                let mark = if staffed { '*' } else { ' ' };
                if selected == Some(*date) {
                    format!("[{:>2}]{}", date.day(), mark)
                } else {
                    format!(" {:>2} {}", date.day(), mark)
                }
            };
            out.push_str(&cell);
        }
        out.push('\n');
    }
    out
}

/// Renders who is working on the selected date
pub fn render_staffing(state: &SelectionState) -> String {
    let Some(date) = state.selected_date else {
        return "No date selected.\n".to_string();
    };

    let mut out = format!(
        "{} on {}:\n",
        state.active_track.label(),
        date.format("%Y-%m-%d")
    );
    if state.selected_employees.is_empty() {
        out.push_str("  No staff scheduled.\n");
    } else {
        for employee in &state.selected_employees {
            out.push_str(&format!("  - {}\n", employee));
        }
    }
    out
}

/// Renders the load status line shown above the calendar, if any
pub fn render_status(status: &LoadStatus) -> Option<String> {
    match status {
        LoadStatus::Idle | LoadStatus::Loaded { .. } => None,
        LoadStatus::Loading => Some("Loading schedule...".to_string()),
        LoadStatus::Failed { message, .. } => Some(format!("Unable to load schedule: {}", message)),
    }
}

/// Prints the whole calendar view
pub fn print_calendar(resolver: &SelectionResolver, status: &LoadStatus, session: &SessionContext) {
    println!("{}", render_header(resolver.active_track(), session));
    if let Some(line) = render_status(status) {
        println!("{}", line);
    }
    println!();
    print!("{}", render_month(resolver));
    println!();
    print!("{}", render_staffing(&resolver.snapshot()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::parse_json;
    use crate::session::User;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn loaded() -> SelectionResolver {
        let events = parse_json(
            br#"{"Day 5": {"day": ["Ann", "Bo"], "night": []}, "Day 6": {"day": []}}"#,
            2024,
            3,
        )
        .unwrap();
        let mut resolver = SelectionResolver::new(YearMonth::new(2024, 3));
        resolver.on_data_loaded(events, date(5));
        resolver
    }

    #[test]
    fn month_names() {
        assert_eq!(format_month(YearMonth::new(2024, 3)), "March 2024");
        assert_eq!(format_month(YearMonth::new(2023, 12)), "December 2023");
    }

    #[test]
    fn header_marks_active_tab_and_user() {
        let session = SessionContext::authenticated(User {
            user_id: "U1".into(),
            display_name: "Alice".into(),
            picture_url: None,
            status_message: None,
        });
        let header = render_header(Shift::Swing, &session);
        assert!(header.contains("[Swing Shift]"));
        assert!(header.contains(" Day Shift "));
        assert!(header.ends_with("signed in as Alice"));

        assert!(!render_header(Shift::Day, &SessionContext::anonymous()).contains("signed in"));
    }

    #[test]
    fn grid_marks_selection_and_staffed_days() {
        let grid = render_month(&loaded());
        assert!(grid.contains("[ 5]*"));
        // day 6 has an event but nobody on it
        assert!(grid.contains("  6  "));
        assert!(grid.contains("  .. "));
        assert_eq!(grid.lines().count(), 2 + 5);
    }

    #[test]
    fn staffing_lists_employees() {
        let resolver = loaded();
        let text = render_staffing(&resolver.snapshot());
        assert_eq!(text, "Day Shift on 2024-03-05:\n  - Ann\n  - Bo\n");
    }

    #[test]
    fn staffing_distinguishes_empty_from_unselected() {
        let mut resolver = loaded();
        resolver.change_track(Shift::Night);
        assert!(render_staffing(&resolver.snapshot()).contains("No staff scheduled."));

        let fresh = SelectionResolver::new(YearMonth::new(2024, 3));
        assert_eq!(render_staffing(&fresh.snapshot()), "No date selected.\n");
    }

    #[test]
    fn status_lines() {
        assert_eq!(render_status(&LoadStatus::Loaded { events: 3 }), None);
        let failed = LoadStatus::Failed {
            message: "HTTP 500".into(),
            transport: true,
        };
        assert_eq!(
            render_status(&failed).as_deref(),
            Some("Unable to load schedule: HTTP 500")
        );
    }
}
