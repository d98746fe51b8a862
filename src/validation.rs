//! Required-field checks run before a form is submitted. A failing form
//! never reaches the school API.

use chrono::NaiveDate;

use crate::error::{ConsoleError, FieldErrors};
use crate::models::exam::ExamReportSubmission;
use crate::models::notice::NoticeDraft;
use crate::models::student::{NewStudent, SheetStudent, StudentLookup};
use crate::timetable::{LunchRule, TimetableEntry};

pub const MIN_ADMISSION_YEAR: i32 = 1900;
pub const MAX_ADMISSION_YEAR: i32 = 2100;

pub trait Validate {
    fn validate(&self) -> Result<(), ConsoleError>;
}

fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

impl Validate for NewStudent {
    fn validate(&self) -> Result<(), ConsoleError> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "firstName", &self.first_name, "First Name is required");
        require(&mut errors, "lastName", &self.last_name, "Last Name is required");
        require(&mut errors, "gender", &self.gender, "Gender is required");
        require(&mut errors, "dob", &self.dob, "Date of Birth is required");
        require(&mut errors, "address", &self.address, "Address is required");
        require(&mut errors, "parentName", &self.parent_name, "Parent Name is required");
        require(&mut errors, "parentEmail", &self.parent_email, "Parent Email is required");
        require(&mut errors, "parentContact", &self.parent_contact, "Parent Contact is required");
        require(&mut errors, "cast", &self.cast, "Cast is required");
        require(&mut errors, "region", &self.region, "Region is required");
        require(
            &mut errors,
            "yearOfAdmission",
            &self.year_of_admission,
            "Year of Admission is required",
        );

        if !self.parent_email.trim().is_empty() && !self.parent_email.contains('@') {
            errors.add("parentEmail", "Parent Email must be a valid email address");
        }

        if !self.dob.trim().is_empty() && NaiveDate::parse_from_str(self.dob.trim(), "%Y-%m-%d").is_err() {
            errors.add("dob", "Date of Birth must be a date (YYYY-MM-DD)");
        }

        if !self.year_of_admission.trim().is_empty() {
            match self.year_of_admission.trim().parse::<i32>() {
                Ok(year) if (MIN_ADMISSION_YEAR..=MAX_ADMISSION_YEAR).contains(&year) => {}
                _ => errors.add(
                    "yearOfAdmission",
                    format!(
                        "Year of Admission must be between {} and {}",
                        MIN_ADMISSION_YEAR, MAX_ADMISSION_YEAR
                    ),
                ),
            }
        }

        errors.into_result()
    }
}

impl Validate for SheetStudent {
    fn validate(&self) -> Result<(), ConsoleError> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "Class", &self.class, "Class is required");
        require(&mut errors, "RollNumber", &self.roll_number, "Roll Number is required");
        require(
            &mut errors,
            "NameOfTheStudent",
            &self.name_of_the_student,
            "Student Name is required",
        );
        require(&mut errors, "ParentEmail", &self.parent_email, "Parent's Gmail ID is required");
        require(&mut errors, "Section", &self.section, "Section is required");
        errors.into_result()
    }
}

impl Validate for StudentLookup {
    fn validate(&self) -> Result<(), ConsoleError> {
        if self.class.trim().is_empty() || self.roll_number.trim().is_empty() {
            return Err(ConsoleError::invalid(
                "lookup",
                "Please provide Class and Roll Number!",
            ));
        }
        Ok(())
    }
}

impl Validate for ExamReportSubmission {
    fn validate(&self) -> Result<(), ConsoleError> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "rollNumber", &self.roll_number, "Roll Number is required");
        if self.exam_data.is_empty() {
            errors.add("examData", "At least one subject is required");
        }
        for (i, entry) in self.exam_data.iter().enumerate() {
            let row = i + 1;
            require(
                &mut errors,
                &format!("examData[{}].subject", i),
                &entry.subject,
                &format!("Subject is required (row {})", row),
            );
            require(
                &mut errors,
                &format!("examData[{}].marks", i),
                &entry.marks,
                &format!("Marks are required (row {})", row),
            );
            require(
                &mut errors,
                &format!("examData[{}].grade", i),
                &entry.grade,
                &format!("Grade is required (row {})", row),
            );
            require(
                &mut errors,
                &format!("examData[{}].typeofexam", i),
                &entry.typeofexam,
                &format!("Type of exam is required (row {})", row),
            );
        }
        errors.into_result()
    }
}

impl Validate for NoticeDraft {
    fn validate(&self) -> Result<(), ConsoleError> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "title", &self.title, "Title is required");
        require(&mut errors, "description", &self.description, "Description is required");
        errors.into_result()
    }
}

impl Validate for TimetableEntry {
    fn validate(&self) -> Result<(), ConsoleError> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "studentClass", &self.student_class, "Student Class is required");
        require(&mut errors, "subject", &self.subject, "Subject is required");
        require(&mut errors, "startTime", &self.start_time, "Start Time is required");
        require(&mut errors, "endTime", &self.end_time, "End Time is required");
        errors.into_result()
    }
}

impl Validate for LunchRule {
    fn validate(&self) -> Result<(), ConsoleError> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "startTime", &self.start_time, "Start Time is required");
        require(&mut errors, "endTime", &self.end_time, "End Time is required");
        errors.into_result()
    }
}

/// Roll number typed into the report view.
pub fn report_roll_number(roll: &str) -> Result<&str, ConsoleError> {
    let roll = roll.trim();
    if roll.is_empty() {
        return Err(ConsoleError::invalid("rollNumber", "Please enter a valid roll number."));
    }
    Ok(roll)
}

pub fn password_reset_email(email: &str) -> Result<&str, ConsoleError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ConsoleError::invalid(
            "email",
            "Please enter your email address to reset your password.",
        ));
    }
    Ok(email)
}

pub fn credentials(username: &str, password: &str) -> Result<(), ConsoleError> {
    let mut errors = FieldErrors::new();
    require(&mut errors, "Username", username, "Username is required");
    require(&mut errors, "Password", password, "Password is required");
    errors.into_result()
}
