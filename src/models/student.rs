use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::de::flexible_string;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeStatus {
    #[serde(rename = "PAID")]
    Paid,
    #[serde(rename = "UNPAID")]
    Unpaid,
    #[serde(rename = "PARTIALLY PAID")]
    PartiallyPaid,
    #[serde(other)]
    Unknown,
}

impl FeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeStatus::Paid => "PAID",
            FeeStatus::Unpaid => "UNPAID",
            FeeStatus::PartiallyPaid => "PARTIALLY PAID",
            FeeStatus::Unknown => "",
        }
    }
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PAID" => Ok(FeeStatus::Paid),
            "UNPAID" => Ok(FeeStatus::Unpaid),
            "PARTIALLY PAID" | "PARTIALLY_PAID" => Ok(FeeStatus::PartiallyPaid),
            other => Err(format!("Unknown fee status '{}'", other)),
        }
    }
}

/// Registration form payload for `POST /register`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub parent_email: String,
    #[serde(default)]
    pub parent_contact: String,
    #[serde(default)]
    pub cast: String,
    #[serde(default)]
    pub region: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub year_of_admission: String,
}

/// A registered student as listed by `/allstudents`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(deserialize_with = "flexible_string")]
    pub roll_number: String,
    #[serde(flatten)]
    pub details: NewStudent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_status: Option<FeeStatus>,
}

impl Student {
    /// Roll-number filter of the student and fee pages: substring match,
    /// empty filter keeps everyone.
    pub fn matches_roll(&self, filter: &str) -> bool {
        let filter = filter.trim();
        filter.is_empty() || self.roll_number.contains(filter)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct FeeStatusUpdate {
    pub fee_status: FeeStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudentCount {
    #[serde(default)]
    pub student_count: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeeStatusCounts {
    #[serde(default)]
    pub paid: u64,
    #[serde(default)]
    pub unpaid: u64,
    #[serde(default)]
    pub partially_paid: u64,
}

/// Roster entry of a class attendance sheet (`/save`, `/update-student`).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SheetStudent {
    #[serde(default)]
    pub class: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub roll_number: String,
    #[serde(default)]
    pub name_of_the_student: String,
    #[serde(default)]
    pub parent_email: String,
    #[serde(default)]
    pub section: String,
}

/// Body of `POST /search-student`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StudentLookup {
    #[serde(default)]
    pub class: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub roll_number: String,
}

/// What `/search-student` answers for a roster entry.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SheetStudentDetails {
    #[serde(default)]
    pub name_of_the_student: String,
    #[serde(default)]
    pub parent_email: String,
    #[serde(default)]
    pub section: String,
}

impl SheetStudentDetails {
    pub fn into_sheet_student(self, lookup: StudentLookup) -> SheetStudent {
        SheetStudent {
            class: lookup.class,
            roll_number: lookup.roll_number,
            name_of_the_student: self.name_of_the_student,
            parent_email: self.parent_email,
            section: self.section,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_list_entry_parses_with_fee_status() {
        let raw = r#"{"rollNumber": 1042, "firstName": "Ravi", "lastName": "K",
                      "yearOfAdmission": 2021, "feeStatus": "PARTIALLY PAID"}"#;
        let student: Student = serde_json::from_str(raw).unwrap();

        assert_eq!(student.roll_number, "1042");
        assert_eq!(student.details.first_name, "Ravi");
        assert_eq!(student.details.year_of_admission, "2021");
        assert_eq!(student.fee_status, Some(FeeStatus::PartiallyPaid));
    }

    #[test]
    fn unrecognised_fee_status_is_unknown() {
        let raw = r#"{"rollNumber": "7", "feeStatus": "WAIVED"}"#;
        let student: Student = serde_json::from_str(raw).unwrap();
        assert_eq!(student.fee_status, Some(FeeStatus::Unknown));
    }

    #[test]
    fn roll_filter_is_substring() {
        let student: Student = serde_json::from_str(r#"{"rollNumber": 1042}"#).unwrap();
        assert!(student.matches_roll("04"));
        assert!(student.matches_roll(""));
        assert!(!student.matches_roll("99"));
    }

    #[test]
    fn fee_status_parses_from_form_values() {
        assert_eq!("paid".parse::<FeeStatus>(), Ok(FeeStatus::Paid));
        assert_eq!("Partially Paid".parse::<FeeStatus>(), Ok(FeeStatus::PartiallyPaid));
        assert!("later".parse::<FeeStatus>().is_err());
    }

    #[test]
    fn sheet_student_uses_pascal_case_keys() {
        let student = SheetStudent {
            class: "Class4".into(),
            roll_number: "12".into(),
            name_of_the_student: "Meera".into(),
            parent_email: "parent@mail.test".into(),
            section: "B".into(),
        };
        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(json["Class"], "Class4");
        assert_eq!(json["NameOfTheStudent"], "Meera");
        assert_eq!(json["RollNumber"], "12");
    }
}
