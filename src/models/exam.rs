use serde::{Deserialize, Serialize};

use super::de::{flexible_string, optional_flexible_string};

/// One row of `/report/{roll}`: a single (student, subject, exam type) mark.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExamRecord {
    #[serde(default, deserialize_with = "flexible_string")]
    pub roll_number: String,
    #[serde(default, deserialize_with = "optional_flexible_string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "optional_flexible_string")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(rename = "typeofexam", alias = "typeOfExam", default)]
    pub type_of_exam: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub marks: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub grade: String,
}

impl ExamRecord {
    pub fn new(
        roll_number: impl Into<String>,
        subject: impl Into<String>,
        type_of_exam: impl Into<String>,
        marks: impl Into<String>,
        grade: impl Into<String>,
    ) -> Self {
        Self {
            roll_number: roll_number.into(),
            first_name: None,
            last_name: None,
            subject: subject.into(),
            type_of_exam: type_of_exam.into(),
            marks: marks.into(),
            grade: grade.into(),
        }
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }
}

/// A single mark row of the "add exam report" form.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExamEntry {
    #[serde(default)]
    pub subject: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub marks: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub grade: String,
    #[serde(default, alias = "typeOfExam")]
    pub typeofexam: String,
}

/// Body of `POST /addexamreport`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExamReportSubmission {
    #[serde(default, deserialize_with = "flexible_string")]
    pub roll_number: String,
    #[serde(default)]
    pub exam_data: Vec<ExamEntry>,
}
