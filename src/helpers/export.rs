use csv::Writer;
use indexmap::IndexSet;
use tracing::info;

use crate::error::ConsoleError;
use crate::models::attendance::FullAttendanceRow;
use crate::models::student::Student;

const STUDENT_COLUMNS: [&str; 12] = [
    "rollNumber",
    "firstName",
    "lastName",
    "gender",
    "dob",
    "address",
    "parentName",
    "parentEmail",
    "parentContact",
    "cast",
    "region",
    "yearOfAdmission",
];

pub fn students_file_name() -> &'static str {
    "All_Students.csv"
}

pub fn fee_status_file_name() -> &'static str {
    "students_fee_status.csv"
}

pub fn attendance_file_name(class: &str) -> String {
    format!("Attendance_{}.csv", class)
}

fn student_fields(student: &Student) -> [&str; 12] {
    let d = &student.details;
    [
        &student.roll_number,
        &d.first_name,
        &d.last_name,
        &d.gender,
        &d.dob,
        &d.address,
        &d.parent_name,
        &d.parent_email,
        &d.parent_contact,
        &d.cast,
        &d.region,
        &d.year_of_admission,
    ]
}

fn finish(writer: Writer<Vec<u8>>) -> Result<Vec<u8>, ConsoleError> {
    writer
        .into_inner()
        .map_err(|e| ConsoleError::Export(e.into_error().into()))
}

/// Student list without the fee column.
pub fn students_csv(students: &[Student]) -> Result<Vec<u8>, ConsoleError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(STUDENT_COLUMNS)?;
    for student in students {
        writer.write_record(student_fields(student))?;
    }
    info!("Exported {} student(s)", students.len());
    finish(writer)
}

/// Student list including `feeStatus`.
pub fn fee_status_csv(students: &[Student]) -> Result<Vec<u8>, ConsoleError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(STUDENT_COLUMNS.iter().copied().chain(["feeStatus"]))?;
    for student in students {
        let status = student.fee_status.map(|s| s.as_str()).unwrap_or("");
        writer.write_record(student_fields(student).into_iter().chain([status]))?;
    }
    info!("Exported fee status of {} student(s)", students.len());
    finish(writer)
}

/// Full attendance sheet: roll number, name, then one column per date in
/// the order dates first appear across rows.
pub fn full_attendance_csv(rows: &[FullAttendanceRow]) -> Result<Vec<u8>, ConsoleError> {
    let dates: IndexSet<&str> = rows
        .iter()
        .flat_map(|row| row.dates.iter().map(String::as_str))
        .collect();

    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(["Roll Number", "Student Name"].into_iter().chain(dates.iter().copied()))?;
    for row in rows {
        let cells = dates.iter().map(|date| row.status_on(date).unwrap_or(""));
        writer.write_record(
            [row.roll_number.as_str(), row.student_name.as_str()]
                .into_iter()
                .chain(cells),
        )?;
    }
    info!("Exported attendance of {} student(s) over {} date(s)", rows.len(), dates.len());
    finish(writer)
}
