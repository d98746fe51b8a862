use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which uploaded timetable family a file belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimetableKind {
    Class,
    Exam,
}

impl TimetableKind {
    /// Path segment of the school API (`/api/{segment}/...`).
    pub fn api_segment(&self) -> &'static str {
        match self {
            TimetableKind::Class => "timetables",
            TimetableKind::Exam => "exam-timetables",
        }
    }
}

impl fmt::Display for TimetableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimetableKind::Class => f.write_str("class"),
            TimetableKind::Exam => f.write_str("exam"),
        }
    }
}

impl FromStr for TimetableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" | "timetables" => Ok(TimetableKind::Class),
            "exam" | "exam-timetables" => Ok(TimetableKind::Exam),
            other => Err(format!("Unknown timetable kind '{}'", other)),
        }
    }
}

/// Answer of an upload: where the stored file can be viewed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UploadedTimetable {
    pub url: String,
}
