use serde::{Deserialize, Serialize};

use super::de::flexible_string;

/// One row of `/attendance/current/{class}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodayAttendance {
    #[serde(default, deserialize_with = "flexible_string")]
    pub roll_number: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TodaySummary {
    #[serde(default)]
    pub today_summary: Vec<TodayAttendance>,
}

/// Backend-computed per-student attendance totals.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackerRow {
    #[serde(default, deserialize_with = "flexible_string")]
    pub roll_number: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub section: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub total_present: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub total_absent: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub attendance_percentage: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSummary {
    #[serde(default)]
    pub total_students: u64,
    #[serde(default)]
    pub total_present: u64,
    #[serde(default)]
    pub total_absent: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AttendanceTracker {
    #[serde(default)]
    pub tracker: Vec<TrackerRow>,
    #[serde(default)]
    pub summary: Option<TrackerSummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TrackerRequest {
    pub class_sheet: String,
}

/// One student of the full attendance sheet; `statuses[i]` belongs to
/// `dates[i]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FullAttendanceRow {
    #[serde(default, deserialize_with = "flexible_string")]
    pub roll_number: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
}

impl FullAttendanceRow {
    pub fn status_on(&self, date: &str) -> Option<&str> {
        self.dates
            .iter()
            .position(|d| d == date)
            .and_then(|i| self.statuses.get(i))
            .map(String::as_str)
    }

    /// Search of the full-sheet page: name (case-insensitive) or roll number.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty()
            || self
                .student_name
                .to_lowercase()
                .contains(&query.to_lowercase())
            || self.roll_number.contains(query)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FullAttendance {
    #[serde(default)]
    pub attendance_data: Vec<FullAttendanceRow>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SheetRequest {
    pub sheet_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FullAttendanceRow {
        FullAttendanceRow {
            roll_number: "21".into(),
            student_name: "Kavya Rao".into(),
            dates: vec!["2024-06-01".into(), "2024-06-02".into()],
            statuses: vec!["P".into()],
        }
    }

    #[test]
    fn status_lookup_follows_date_position() {
        let row = row();
        assert_eq!(row.status_on("2024-06-01"), Some("P"));
        assert_eq!(row.status_on("2024-06-02"), None);
        assert_eq!(row.status_on("2024-07-01"), None);
    }

    #[test]
    fn search_matches_name_or_roll() {
        let row = row();
        assert!(row.matches("kavya"));
        assert!(row.matches("21"));
        assert!(!row.matches("arjun"));
    }
}
