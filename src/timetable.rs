//! Manual weekly timetable builder.
//!
//! Entries and the lunch rule are collected during a session; slots are the
//! distinct `"start - end"` strings in discovery order. Times are never
//! parsed, so `9:00` and `09:00` are different slots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

pub const LUNCH_BREAK: &str = "Lunch Break";

/// Class standards offered by the timetable form.
pub const CLASS_STANDARDS: [&str; 13] = [
    "Nursery", "LKG", "UKG", "CLASS-1", "CLASS-2", "CLASS-3", "CLASS-4", "CLASS-5", "CLASS-6",
    "CLASS-7", "CLASS-8", "CLASS-9", "CLASS-10",
];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Day {
    #[serde(alias = "Mon")]
    Monday,
    #[serde(alias = "Tue")]
    Tuesday,
    #[serde(alias = "Wed")]
    Wednesday,
    #[serde(alias = "Thu")]
    Thursday,
    #[serde(alias = "Fri")]
    Friday,
    #[serde(alias = "Sat")]
    Saturday,
}

impl Day {
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Day::ALL
            .into_iter()
            .find(|day| day.name().eq_ignore_ascii_case(s) || day.name()[..3].eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown day '{}'", s))
    }
}

/// The slot key of a time range.
pub fn slot_key(start: &str, end: &str) -> String {
    format!("{} - {}", start, end)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub day: Day,
    pub subject: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub student_class: String,
}

impl TimetableEntry {
    pub fn slot(&self) -> String {
        slot_key(&self.start_time, &self.end_time)
    }

    fn occupies(&self, day: Day, slot: &str) -> bool {
        self.day == day && self.slot() == slot
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LunchRule {
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_true")]
    pub apply_to_all_days: bool,
    #[serde(default)]
    pub custom_days: Vec<Day>,
}

fn default_true() -> bool {
    true
}

impl LunchRule {
    pub fn slot(&self) -> String {
        slot_key(&self.start_time, &self.end_time)
    }

    pub fn covers(&self, day: Day, slot: &str) -> bool {
        (self.apply_to_all_days || self.custom_days.contains(&day)) && self.slot() == slot
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum GridCell {
    Subject(String),
    LunchBreak,
    Empty,
}

impl GridCell {
    pub fn text(&self) -> &str {
        match self {
            GridCell::Subject(subject) => subject,
            GridCell::LunchBreak => LUNCH_BREAK,
            GridCell::Empty => "",
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GridRow {
    pub day: Day,
    pub cells: Vec<GridCell>,
}

/// Rendered day × slot table.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TimetableGrid {
    pub slots: Vec<String>,
    pub rows: Vec<GridRow>,
}

impl TimetableGrid {
    /// `["Day", ...slots]`
    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.slots.len() + 1);
        header.push("Day".to_string());
        header.extend(self.slots.iter().cloned());
        header
    }

    /// One `[day, cell...]` row per day, as printed.
    pub fn body(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut line = Vec::with_capacity(row.cells.len() + 1);
                line.push(row.day.name().to_string());
                line.extend(row.cells.iter().map(|cell| cell.text().to_string()));
                line
            })
            .collect()
    }

    pub fn cell(&self, day: Day, slot: &str) -> Option<&GridCell> {
        let column = self.slots.iter().position(|s| s == slot)?;
        self.rows
            .iter()
            .find(|row| row.day == day)
            .and_then(|row| row.cells.get(column))
    }
}

/// Session accumulator for one class timetable.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimetableGridBuilder {
    class_name: String,
    slots: Vec<String>,
    entries: Vec<TimetableEntry>,
    lunch: Option<LunchRule>,
}

impl TimetableGridBuilder {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn entries(&self) -> &[TimetableEntry] {
        &self.entries
    }

    pub fn lunch(&self) -> Option<&LunchRule> {
        self.lunch.as_ref()
    }

    pub fn add_entry(&mut self, mut entry: TimetableEntry) {
        self.remember_slot(entry.slot());
        if entry.student_class.is_empty() {
            entry.student_class = self.class_name.clone();
        }
        debug!("Adding {} on {} at {}", entry.subject, entry.day, entry.slot());
        self.entries.push(entry);
    }

    /// Replaces the active lunch rule.
    pub fn add_lunch(&mut self, rule: LunchRule) {
        self.remember_slot(rule.slot());
        debug!("Lunch break set to {}", rule.slot());
        self.lunch = Some(rule);
    }

    /// Removes the entries of `day` in `slot`; the column stays. Returns the
    /// number of removed entries.
    pub fn delete_entry(&mut self, day: Day, slot: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !entry.occupies(day, slot));
        before - self.entries.len()
    }

    /// Removes the slot column and every entry in it, whatever the day.
    pub fn delete_slot(&mut self, slot: &str) -> usize {
        self.slots.retain(|s| s != slot);
        let before = self.entries.len();
        self.entries.retain(|entry| entry.slot() != slot);
        let removed = before - self.entries.len();
        info!("Deleted slot {} with {} entries", slot, removed);
        removed
    }

    pub fn render_grid(&self, days: &[Day]) -> TimetableGrid {
        let rows = days
            .iter()
            .map(|&day| GridRow {
                day,
                cells: self.slots.iter().map(|slot| self.cell(day, slot)).collect(),
            })
            .collect();

        TimetableGrid {
            slots: self.slots.clone(),
            rows,
        }
    }

    pub fn render_week(&self) -> TimetableGrid {
        self.render_grid(&Day::ALL)
    }

    fn cell(&self, day: Day, slot: &str) -> GridCell {
        if let Some(entry) = self.entries.iter().find(|entry| entry.occupies(day, slot)) {
            return GridCell::Subject(entry.subject.clone());
        }
        match &self.lunch {
            Some(rule) if rule.covers(day, slot) => GridCell::LunchBreak,
            _ => GridCell::Empty,
        }
    }

    fn remember_slot(&mut self, slot: String) {
        if !self.slots.contains(&slot) {
            self.slots.push(slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(day: Day, subject: &str, start: &str, end: &str) -> TimetableEntry {
        TimetableEntry {
            day,
            subject: subject.into(),
            start_time: start.into(),
            end_time: end.into(),
            student_class: String::new(),
        }
    }

    fn lunch(all: bool, days: Vec<Day>) -> LunchRule {
        LunchRule {
            start_time: "12:00".into(),
            end_time: "13:00".into(),
            apply_to_all_days: all,
            custom_days: days,
        }
    }

    #[test]
    fn identical_ranges_share_one_slot_and_first_entry_wins() {
        let mut builder = TimetableGridBuilder::new("CLASS-3");
        builder.add_entry(entry(Day::Monday, "Math", "09:00", "10:00"));
        builder.add_entry(entry(Day::Monday, "English", "09:00", "10:00"));

        assert_eq!(builder.slots(), ["09:00 - 10:00"]);
        assert_eq!(builder.entries().len(), 2);
        assert_eq!(builder.entries()[0].student_class, "CLASS-3");

        let grid = builder.render_week();
        assert_eq!(
            grid.cell(Day::Monday, "09:00 - 10:00"),
            Some(&GridCell::Subject("Math".into()))
        );
        assert_eq!(grid.cell(Day::Tuesday, "09:00 - 10:00"), Some(&GridCell::Empty));
    }

    #[test]
    fn slots_keep_discovery_order_across_lunch() {
        let mut builder = TimetableGridBuilder::new("LKG");
        builder.add_entry(entry(Day::Monday, "Math", "10:00", "11:00"));
        builder.add_lunch(lunch(true, vec![]));
        builder.add_entry(entry(Day::Friday, "Art", "09:00", "10:00"));
        builder.add_lunch(lunch(false, vec![Day::Friday]));

        assert_eq!(
            builder.slots(),
            ["10:00 - 11:00", "12:00 - 13:00", "09:00 - 10:00"]
        );
        assert!(!builder.lunch().unwrap().apply_to_all_days);
    }

    #[test]
    fn time_strings_are_not_normalised() {
        let mut builder = TimetableGridBuilder::new("UKG");
        builder.add_entry(entry(Day::Monday, "Math", "9:00", "10:00"));
        builder.add_entry(entry(Day::Monday, "Math", "09:00", "10:00"));
        assert_eq!(builder.slots().len(), 2);
    }

    #[test]
    fn lunch_for_all_days_fills_every_row() {
        let mut builder = TimetableGridBuilder::new("CLASS-1");
        builder.add_entry(entry(Day::Monday, "Math", "09:00", "10:00"));
        builder.add_lunch(lunch(true, vec![]));

        let grid = builder.render_week();
        for day in Day::ALL {
            assert_eq!(grid.cell(day, "12:00 - 13:00"), Some(&GridCell::LunchBreak));
        }
        assert_eq!(grid.body()[0], vec!["Monday", "Math", LUNCH_BREAK]);
        assert_eq!(grid.body()[1], vec!["Tuesday", "", LUNCH_BREAK]);
    }

    #[test]
    fn custom_lunch_days_only() {
        let mut builder = TimetableGridBuilder::new("CLASS-1");
        builder.add_lunch(lunch(false, vec![Day::Wednesday]));

        let grid = builder.render_week();
        assert_eq!(grid.cell(Day::Wednesday, "12:00 - 13:00"), Some(&GridCell::LunchBreak));
        assert_eq!(grid.cell(Day::Monday, "12:00 - 13:00"), Some(&GridCell::Empty));
    }

    #[test]
    fn class_entry_takes_precedence_over_lunch() {
        let mut builder = TimetableGridBuilder::new("CLASS-1");
        builder.add_lunch(lunch(true, vec![]));
        builder.add_entry(entry(Day::Saturday, "Games", "12:00", "13:00"));

        let grid = builder.render_week();
        assert_eq!(
            grid.cell(Day::Saturday, "12:00 - 13:00"),
            Some(&GridCell::Subject("Games".into()))
        );
    }

    #[test]
    fn delete_entry_keeps_column_and_other_days() {
        let mut builder = TimetableGridBuilder::new("CLASS-2");
        builder.add_entry(entry(Day::Monday, "Math", "09:00", "10:00"));
        builder.add_entry(entry(Day::Tuesday, "Science", "09:00", "10:00"));

        assert_eq!(builder.delete_entry(Day::Monday, "09:00 - 10:00"), 1);
        assert_eq!(builder.slots(), ["09:00 - 10:00"]);

        let grid = builder.render_week();
        assert_eq!(grid.cell(Day::Monday, "09:00 - 10:00"), Some(&GridCell::Empty));
        assert_eq!(
            grid.cell(Day::Tuesday, "09:00 - 10:00"),
            Some(&GridCell::Subject("Science".into()))
        );
    }

    #[test]
    fn delete_slot_removes_column_and_entries_on_every_day() {
        let mut builder = TimetableGridBuilder::new("CLASS-2");
        builder.add_entry(entry(Day::Monday, "Math", "09:00", "10:00"));
        builder.add_entry(entry(Day::Thursday, "Hindi", "09:00", "10:00"));
        builder.add_entry(entry(Day::Monday, "EVS", "10:00", "11:00"));

        assert_eq!(builder.delete_slot("09:00 - 10:00"), 2);
        assert_eq!(builder.slots(), ["10:00 - 11:00"]);
        assert_eq!(builder.entries().len(), 1);
        assert_eq!(builder.render_week().header(), vec!["Day", "10:00 - 11:00"]);
    }

    #[test]
    fn render_grid_follows_given_days() {
        let mut builder = TimetableGridBuilder::new("CLASS-2");
        builder.add_entry(entry(Day::Friday, "Music", "08:00", "09:00"));

        let grid = builder.render_grid(&[Day::Friday, Day::Monday]);
        assert_eq!(grid.body(), vec![vec!["Friday", "Music"], vec!["Monday", ""]]);
    }

    #[test]
    fn day_parses_full_and_short_names() {
        assert_eq!("monday".parse::<Day>(), Ok(Day::Monday));
        assert_eq!("Sat".parse::<Day>(), Ok(Day::Saturday));
        assert!("Sunday".parse::<Day>().is_err());
        let day: Day = serde_json::from_str("\"Wed\"").unwrap();
        assert_eq!(day, Day::Wednesday);
    }
}
