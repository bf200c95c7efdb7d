//! Builds a month roster from employee definitions and per-day headcounts
//!
//! Hard rules: every shift gets exactly its required headcount, a staffed shift always has
//! a senior on it, nobody works on one of their off days, and nobody works more than
//! `max_consecutive_days` in a row. Within those rules the employees with the shortest
//! current streak go first, then those who have worked the least, so rest days spread out
//! and streaks do not line up.

use std::collections::HashSet;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::{Shift, YearMonth};
use crate::error::GenerateError;

pub const DEFAULT_MAX_CONSECUTIVE_DAYS: u32 = 5;

const FIVE_DAY_STREAK_PENALTY: u32 = 10;
const ONE_DAY_STREAK_PENALTY: u32 = 5;
const PREFERRED_OFF_PENALTY: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Senior,
    Mid,
    Junior,
}

/// Someone who can be put on the roster; each employee belongs to exactly one shift
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub level: Level,
    pub shift: Shift,
    /// 1-based days of the month the employee cannot work
    #[serde(default)]
    pub off_days: Vec<u32>,
    /// Days the employee would rather not work
    #[serde(default)]
    pub preferred_off_days: Vec<u32>,
}

impl Employee {
    pub fn new(name: &str, level: Level, shift: Shift) -> Self {
        Self {
            name: name.to_string(),
            level,
            shift,
            off_days: Vec::new(),
            preferred_off_days: Vec::new(),
        }
    }

    /// Marks `days` as both required and preferred days off
    pub fn with_off_days(mut self, days: &[u32]) -> Self {
        self.off_days = days.to_vec();
        self.preferred_off_days = days.to_vec();
        self
    }

    fn can_work(&self, shift: Shift, day: u32) -> bool {
        self.shift == shift && !self.off_days.contains(&day)
    }
}

/// Required headcount per shift, one entry per day starting at day 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRequirements {
    pub day: Vec<u32>,
    pub swing: Vec<u32>,
    pub night: Vec<u32>,
}

impl ShiftRequirements {
    pub fn uniform(num_days: usize, day: u32, swing: u32, night: u32) -> Self {
        Self {
            day: vec![day; num_days],
            swing: vec![swing; num_days],
            night: vec![night; num_days],
        }
    }

    pub fn for_shift(&self, shift: Shift) -> &[u32] {
        match shift {
            Shift::Day => &self.day,
            Shift::Swing => &self.swing,
            Shift::Night => &self.night,
        }
    }

    pub fn num_days(&self) -> usize {
        self.day.len()
    }

    /// Drops requirements past `num_days`
    pub fn truncated(mut self, num_days: usize) -> Self {
        self.day.truncate(num_days);
        self.swing.truncate(num_days);
        self.night.truncate(num_days);
        self
    }

    fn validate(&self) -> Result<(), GenerateError> {
        let expected = self.num_days();
        for shift in [Shift::Swing, Shift::Night] {
            let actual = self.for_shift(shift).len();
            if actual != expected {
                return Err(GenerateError::RequirementLength {
                    shift,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

fn shift_index(shift: Shift) -> usize {
    match shift {
        Shift::Day => 0,
        Shift::Swing => 1,
        Shift::Night => 2,
    }
}

/// A generated month: who works which shift on each day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRoster {
    /// Staff per day, shifts in `Shift::ALL` order, employees in definition order
    days: Vec<[Vec<String>; 3]>,
    penalty: u32,
}

impl GeneratedRoster {
    pub fn num_days(&self) -> usize {
        self.days.len()
    }

    /// Staff of `shift` on the 1-based `day`; empty for days outside the roster
    pub fn staff(&self, day: u32, shift: Shift) -> &[String] {
        day.checked_sub(1)
            .and_then(|index| self.days.get(index as usize))
            .map(|shifts| shifts[shift_index(shift)].as_slice())
            .unwrap_or(&[])
    }

    /// Soft-rule cost: five-day streaks, isolated working days and worked preferred days off
    pub fn penalty(&self) -> u32 {
        self.penalty
    }

    /// The roster as a `{"Day N": {"day": [...], ...}}` payload
    pub fn to_json(&self) -> Value {
        let mut days = Map::new();
        for (index, shifts) in self.days.iter().enumerate() {
            let mut by_shift = Map::new();
            for shift in Shift::ALL {
                let staff = shifts[shift_index(shift)]
                    .iter()
                    .cloned()
                    .map(Value::String)
                    .collect();
                by_shift.insert(shift.as_str().to_string(), Value::Array(staff));
            }
            days.insert(format!("Day {}", index + 1), Value::Object(by_shift));
        }
        Value::Object(days)
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.to_json())
    }
}

/// Generates a roster covering every day of `requirements`
pub fn generate(
    employees: &[Employee],
    requirements: &ShiftRequirements,
    max_consecutive_days: u32,
) -> Result<GeneratedRoster, GenerateError> {
    requirements.validate()?;

    let mut names = HashSet::new();
    for employee in employees {
        if !names.insert(employee.name.as_str()) {
            return Err(GenerateError::DuplicateEmployee(employee.name.clone()));
        }
    }

    let num_days = requirements.num_days();
    let mut streaks = vec![0u32; employees.len()];
    let mut worked = vec![0u32; employees.len()];
    let mut schedule = vec![vec![false; num_days]; employees.len()];
    let mut days = Vec::with_capacity(num_days);

    for index in 0..num_days {
        let day = index as u32 + 1;
        let mut staffed: [Vec<String>; 3] = Default::default();

        for shift in Shift::ALL {
            let needed = requirements.for_shift(shift)[index];
            let mut chosen = staff_shift(
                employees,
                shift,
                day,
                needed,
                &streaks,
                &worked,
                max_consecutive_days,
            )?;
            chosen.sort_unstable();
            for &i in &chosen {
                schedule[i][index] = true;
            }
            staffed[shift_index(shift)] = chosen
                .iter()
                .map(|&i| employees[i].name.clone())
                .collect();
        }

        for (i, employee_days) in schedule.iter().enumerate() {
            if employee_days[index] {
                streaks[i] += 1;
                worked[i] += 1;
            } else {
                streaks[i] = 0;
            }
        }
        days.push(staffed);
    }

    let penalty = employees
        .iter()
        .zip(&schedule)
        .map(|(employee, employee_days)| soft_penalty(employee, employee_days))
        .sum();

    info!(
        "Generated {} day roster for {} employees (penalty {})",
        num_days,
        employees.len(),
        penalty
    );
    Ok(GeneratedRoster { days, penalty })
}

/// Generates a roster for `month`, using as many days of `requirements` as the month has
pub fn generate_for_month(
    employees: &[Employee],
    requirements: &ShiftRequirements,
    month: YearMonth,
    max_consecutive_days: u32,
) -> Result<GeneratedRoster, GenerateError> {
    let requirements = requirements.clone().truncated(month.num_days() as usize);
    debug!("Generating roster for {}", month);
    generate(employees, &requirements, max_consecutive_days)
}

fn staff_shift(
    employees: &[Employee],
    shift: Shift,
    day: u32,
    needed: u32,
    streaks: &[u32],
    worked: &[u32],
    max_consecutive_days: u32,
) -> Result<Vec<usize>, GenerateError> {
    if needed == 0 {
        return Ok(Vec::new());
    }

    let mut candidates: Vec<usize> = employees
        .iter()
        .enumerate()
        .filter(|(i, e)| e.can_work(shift, day) && streaks[*i] < max_consecutive_days)
        .map(|(i, _)| i)
        .collect();

    if candidates.len() < needed as usize {
        return Err(GenerateError::Understaffed {
            day,
            shift,
            needed,
            available: candidates.len(),
        });
    }

    candidates.sort_by_key(|&i| {
        (
            streaks[i],
            employees[i].preferred_off_days.contains(&day),
            worked[i],
            i,
        )
    });

    let senior = candidates
        .iter()
        .position(|&i| employees[i].level == Level::Senior)
        .ok_or(GenerateError::NoSenior { day, shift })?;

    let mut chosen = vec![candidates.remove(senior)];
    chosen.extend(candidates.into_iter().take(needed as usize - 1));
    Ok(chosen)
}

fn soft_penalty(employee: &Employee, days: &[bool]) -> u32 {
    let works = |index: usize| days.get(index).copied().unwrap_or(false);

    let preferred = employee
        .preferred_off_days
        .iter()
        .filter(|&&day| day >= 1 && works(day as usize - 1))
        .count() as u32;

    let five_day = days
        .windows(5)
        .filter(|window| window.iter().all(|&w| w))
        .count() as u32;

    let one_day = (0..days.len())
        .filter(|&i| works(i) && (i == 0 || !works(i - 1)) && !works(i + 1))
        .count() as u32;

    preferred * PREFERRED_OFF_PENALTY
        + five_day * FIVE_DAY_STREAK_PENALTY
        + one_day * ONE_DAY_STREAK_PENALTY
}

/// Default staff the server generates rosters for
pub fn sample_staff() -> Vec<Employee> {
    use self::Level::{Junior, Mid, Senior};
    use super::types::Shift::{Day, Night, Swing};

    vec![
        Employee::new("A", Senior, Day).with_off_days(&[2, 3]),
        Employee::new("B", Senior, Day),
        Employee::new("C", Senior, Day),
        Employee::new("D", Mid, Day).with_off_days(&[10, 11, 12, 13]),
        Employee::new("E", Mid, Day),
        Employee::new("F", Mid, Day),
        Employee::new("G", Mid, Day),
        Employee::new("H", Mid, Day),
        Employee::new("I", Mid, Day),
        Employee::new("J", Mid, Day),
        Employee::new("K", Junior, Day).with_off_days(&[13, 14, 15]),
        Employee::new("L", Junior, Day),
        Employee::new("M", Senior, Swing).with_off_days(&[5, 6, 7, 8]),
        Employee::new("N", Senior, Swing),
        Employee::new("O", Mid, Swing).with_off_days(&[12, 13, 14]),
        Employee::new("P", Mid, Swing),
        Employee::new("Q", Mid, Swing),
        Employee::new("R", Junior, Swing).with_off_days(&[20, 21, 22]),
        Employee::new("S", Senior, Night).with_off_days(&[5, 6, 7]),
        Employee::new("T", Senior, Night),
        Employee::new("U", Mid, Night).with_off_days(&[19, 20, 21]),
        Employee::new("V", Mid, Night),
        Employee::new("W", Junior, Night).with_off_days(&[25, 26, 27]),
    ]
}

/// Default headcounts for a 31 day month: a lighter day shift twice a week
pub fn sample_requirements() -> ShiftRequirements {
    ShiftRequirements {
        day: vec![
            7, 7, 7, 7, 6, 6, 7, 7, 7, 7, 7, 6, 6, 7, 7, 7, 7, 7, 6, 6, 7, 7, 7, 7, 7, 6, 6, 7, 7,
            7, 7,
        ],
        swing: vec![4; 31],
        night: vec![3; 31],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{parse_json, partition};
    use chrono::NaiveDate;

    fn assert_hard_rules(
        roster: &GeneratedRoster,
        employees: &[Employee],
        requirements: &ShiftRequirements,
        max_consecutive_days: u32,
    ) {
        for day in 1..=roster.num_days() as u32 {
            for shift in Shift::ALL {
                let staff = roster.staff(day, shift);
                let needed = requirements.for_shift(shift)[day as usize - 1];
                assert_eq!(staff.len(), needed as usize, "day {} {}", day, shift);

                let members: Vec<&Employee> = staff
                    .iter()
                    .map(|name| employees.iter().find(|e| &e.name == name).unwrap())
                    .collect();
                assert!(members.iter().all(|e| e.shift == shift));
                assert!(members.iter().all(|e| !e.off_days.contains(&day)));
                if needed > 0 {
                    assert!(
                        members.iter().any(|e| e.level == Level::Senior),
                        "no senior on day {} {}",
                        day,
                        shift
                    );
                }
            }
        }

        for employee in employees {
            let mut streak = 0;
            for day in 1..=roster.num_days() as u32 {
                if roster.staff(day, employee.shift).contains(&employee.name) {
                    streak += 1;
                    assert!(
                        streak <= max_consecutive_days,
                        "{} works {} days in a row by day {}",
                        employee.name,
                        streak,
                        day
                    );
                } else {
                    streak = 0;
                }
            }
        }
    }

    #[test]
    fn sample_month_meets_every_hard_rule() {
        let staff = sample_staff();
        let requirements = sample_requirements();
        let roster = generate(&staff, &requirements, DEFAULT_MAX_CONSECUTIVE_DAYS).unwrap();

        assert_eq!(roster.num_days(), 31);
        assert_hard_rules(&roster, &staff, &requirements, DEFAULT_MAX_CONSECUTIVE_DAYS);
    }

    #[test]
    fn short_months_use_the_leading_requirements() {
        let staff = sample_staff();
        let requirements = sample_requirements();
        for month in [YearMonth::new(2024, 2), YearMonth::new(2023, 2), YearMonth::new(2024, 4)] {
            let roster =
                generate_for_month(&staff, &requirements, month, DEFAULT_MAX_CONSECUTIVE_DAYS)
                    .unwrap();
            assert_eq!(roster.num_days(), month.num_days() as usize);
            assert_hard_rules(
                &roster,
                &staff,
                &requirements.clone().truncated(roster.num_days()),
                DEFAULT_MAX_CONSECUTIVE_DAYS,
            );
        }
    }

    #[test]
    fn generated_payload_parses_back() {
        let roster = generate_for_month(
            &sample_staff(),
            &sample_requirements(),
            YearMonth::new(2024, 3),
            DEFAULT_MAX_CONSECUTIVE_DAYS,
        )
        .unwrap();

        let events = parse_json(&roster.to_json_bytes().unwrap(), 2024, 3).unwrap();
        assert_eq!(events.len(), 31 * 3);

        let tracks = partition(events);
        let day_9 = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let night = tracks.night.iter().find(|e| e.date == day_9).unwrap();
        assert_eq!(night.employees, roster.staff(9, Shift::Night));
    }

    #[test]
    fn off_days_are_never_worked() {
        let staff = vec![
            Employee::new("Ada", Level::Senior, Shift::Day).with_off_days(&[2]),
            Employee::new("Bea", Level::Senior, Shift::Day),
        ];
        let roster = generate(&staff, &ShiftRequirements::uniform(3, 1, 0, 0), 5).unwrap();

        assert_eq!(roster.staff(1, Shift::Day), ["Ada"]);
        assert_eq!(roster.staff(2, Shift::Day), ["Bea"]);
        assert!(roster.staff(2, Shift::Swing).is_empty());
    }

    #[test]
    fn streak_limit_forces_a_rest_day() {
        let staff = vec![Employee::new("Ada", Level::Senior, Shift::Night)];
        let err = generate(&staff, &ShiftRequirements::uniform(4, 0, 0, 1), 3).unwrap_err();
        assert_eq!(
            err,
            GenerateError::Understaffed {
                day: 4,
                shift: Shift::Night,
                needed: 1,
                available: 0,
            }
        );
    }

    #[test]
    fn rest_is_spread_across_the_team() {
        let staff = vec![
            Employee::new("Ada", Level::Senior, Shift::Swing),
            Employee::new("Bea", Level::Senior, Shift::Swing),
            Employee::new("Cy", Level::Mid, Shift::Swing),
        ];
        let requirements = ShiftRequirements::uniform(12, 0, 2, 0);
        let roster = generate(&staff, &requirements, 2).unwrap();
        assert_hard_rules(&roster, &staff, &requirements, 2);
    }

    #[test]
    fn shift_without_senior_is_refused() {
        let staff = vec![
            Employee::new("Ada", Level::Junior, Shift::Day),
            Employee::new("Bea", Level::Mid, Shift::Day),
        ];
        let err = generate(&staff, &ShiftRequirements::uniform(1, 2, 0, 0), 5).unwrap_err();
        assert_eq!(
            err,
            GenerateError::NoSenior {
                day: 1,
                shift: Shift::Day
            }
        );
    }

    #[test]
    fn understaffed_shift_is_refused() {
        let staff = vec![Employee::new("Ada", Level::Senior, Shift::Day)];
        let err = generate(&staff, &ShiftRequirements::uniform(1, 2, 0, 0), 5).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Understaffed { day: 1, needed: 2, available: 1, .. }
        ));
    }

    #[test]
    fn malformed_inputs_are_refused() {
        let mut requirements = ShiftRequirements::uniform(3, 1, 1, 1);
        requirements.night.pop();
        assert_eq!(
            generate(&[], &requirements, 5).unwrap_err(),
            GenerateError::RequirementLength {
                shift: Shift::Night,
                expected: 3,
                actual: 2,
            }
        );

        let staff = vec![
            Employee::new("Ada", Level::Senior, Shift::Day),
            Employee::new("Ada", Level::Mid, Shift::Night),
        ];
        assert_eq!(
            generate(&staff, &ShiftRequirements::uniform(1, 1, 0, 0), 5).unwrap_err(),
            GenerateError::DuplicateEmployee("Ada".to_string())
        );
    }

    #[test]
    fn penalty_counts_isolated_days_and_long_streaks() {
        let staff = vec![Employee::new("Ada", Level::Senior, Shift::Day)];

        let single = generate(&staff, &ShiftRequirements::uniform(1, 1, 0, 0), 5).unwrap();
        assert_eq!(single.penalty(), ONE_DAY_STREAK_PENALTY);

        let five = generate(&staff, &ShiftRequirements::uniform(5, 1, 0, 0), 5).unwrap();
        assert_eq!(five.penalty(), FIVE_DAY_STREAK_PENALTY);
    }
}
