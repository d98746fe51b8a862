//! Exam report aggregation.
//!
//! The school API answers `/report/{roll}` with one flat row per
//! (student, subject, exam type). The report view groups those rows by
//! grade, then by roll number, then by subject, and collects the mark of
//! every exam type. All maps keep first-insertion order.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::ConsoleError;
use crate::generation::{RequestGeneration, Ticket};
use crate::models::exam::ExamRecord;

pub const UNKNOWN_NAME: &str = "Unknown";
pub const MISSING_MARK: &str = "-";

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentMarks {
    pub first_name: String,
    pub last_name: String,
    /// subject -> exam type -> marks
    pub subjects: IndexMap<String, IndexMap<String, String>>,
}

impl StudentMarks {
    fn new(record: &ExamRecord) -> Self {
        Self {
            first_name: record
                .first_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            last_name: record
                .last_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            subjects: IndexMap::new(),
        }
    }

    pub fn mark(&self, subject: &str, exam_type: &str) -> Option<&str> {
        self.subjects
            .get(subject)
            .and_then(|exams| exams.get(exam_type))
            .map(String::as_str)
    }

    /// Rows of the per-student table: serial number, subject, then one
    /// column per exam type of the grade (`-` when there is no mark).
    pub fn table_rows<'a>(&self, exam_types: impl IntoIterator<Item = &'a String> + Clone) -> Vec<Vec<String>> {
        self.subjects
            .iter()
            .enumerate()
            .map(|(index, (subject, exams))| {
                let mut row = vec![(index + 1).to_string(), subject.clone()];
                row.extend(exam_types.clone().into_iter().map(|exam_type| {
                    exams
                        .get(exam_type)
                        .cloned()
                        .unwrap_or_else(|| MISSING_MARK.to_string())
                }));
                row
            })
            .collect()
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GradeBucket {
    pub students: IndexMap<String, StudentMarks>,
    pub exam_types: IndexSet<String>,
}

impl GradeBucket {
    /// Header of the per-student table for this grade.
    pub fn table_header(&self) -> Vec<String> {
        let mut header = vec!["S.No".to_string(), "Subjects".to_string()];
        header.extend(self.exam_types.iter().cloned());
        header
    }
}

/// grade -> bucket, in the order grades were first seen.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct GradeReport(IndexMap<String, GradeBucket>);

impl GradeReport {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, grade: &str) -> Option<&GradeBucket> {
        self.0.get(grade)
    }

    pub fn grades(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GradeBucket)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of (grade, roll, subject, exam type) leaves.
    pub fn leaf_count(&self) -> usize {
        self.0
            .values()
            .flat_map(|bucket| bucket.students.values())
            .flat_map(|student| student.subjects.values())
            .map(IndexMap::len)
            .sum()
    }

    /// Removes the whole grade; the other grades keep their order.
    pub fn delete_grade(&mut self, grade: &str) -> Option<GradeBucket> {
        self.0.shift_remove(grade)
    }

    pub fn without_grade(mut self, grade: &str) -> Self {
        self.delete_grade(grade);
        self
    }

    fn insert(&mut self, record: ExamRecord) {
        let bucket = self.0.entry(record.grade.clone()).or_default();
        let student = bucket
            .students
            .entry(record.roll_number.clone())
            .or_insert_with(|| StudentMarks::new(&record));

        student
            .subjects
            .entry(record.subject)
            .or_default()
            .insert(record.type_of_exam.clone(), record.marks);
        bucket.exam_types.insert(record.type_of_exam);
    }
}

/// Groups flat exam records into a [`GradeReport`]. Duplicated
/// (grade, roll, subject, exam type) rows overwrite, last one wins.
pub fn aggregate<I>(records: I) -> GradeReport
where
    I: IntoIterator<Item = ExamRecord>,
{
    let mut report = GradeReport::default();
    for record in records {
        report.insert(record);
    }
    debug!(
        "Aggregated exam report into {} grade(s), {} mark(s)",
        report.len(),
        report.leaf_count()
    );
    report
}

/// State of the exam report view: the last applied report and the request
/// generation guarding it.
#[derive(Debug, Default)]
pub struct ReportPage {
    generation: RequestGeneration,
    report: Mutex<GradeReport>,
}

impl ReportPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&self) -> Ticket {
        self.generation.begin()
    }

    /// Applies a fetched record list. Returns `Ok(None)` when the ticket has
    /// been superseded; the response is then dropped.
    pub fn apply(
        &self,
        ticket: Ticket,
        records: Vec<ExamRecord>,
    ) -> Result<Option<GradeReport>, ConsoleError> {
        if !self.generation.is_current(&ticket) {
            info!("Dropping stale exam report response");
            return Ok(None);
        }

        if records.is_empty() {
            return Err(ConsoleError::NotFound(
                "No exam report found for the provided roll number.".to_string(),
            ));
        }

        let report = aggregate(records);
        *self.lock() = report.clone();
        Ok(Some(report))
    }

    /// Local removal after the remote delete was confirmed.
    pub fn remove_grade(&self, grade: &str) -> GradeReport {
        let mut report = self.lock();
        if report.delete_grade(grade).is_some() {
            info!("Removed grade {} from the exam report view", grade);
        }
        report.clone()
    }

    pub fn snapshot(&self) -> GradeReport {
        self.lock().clone()
    }

    /// Leaving the view: forget the data and drop in-flight responses.
    pub fn unmount(&self) {
        self.generation.invalidate();
        *self.lock() = GradeReport::default();
    }

    fn lock(&self) -> MutexGuard<'_, GradeReport> {
        self.report.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(grade: &str, roll: &str, subject: &str, exam: &str, marks: &str) -> ExamRecord {
        ExamRecord::new(roll, subject, exam, marks, grade)
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let report = aggregate(Vec::new());
        assert!(report.is_empty());
        assert_eq!(report.leaf_count(), 0);
    }

    #[test]
    fn last_write_wins_for_duplicate_leaf() {
        let report = aggregate(vec![
            record("A", "1", "Math", "Mid", "80"),
            record("A", "1", "Math", "Mid", "90"),
        ]);

        assert_eq!(report.leaf_count(), 1);
        let student = &report.get("A").unwrap().students["1"];
        assert_eq!(student.mark("Math", "Mid"), Some("90"));
    }

    #[test]
    fn grades_and_exam_types_keep_first_seen_order() {
        let report = aggregate(vec![
            record("B", "2", "Science", "Final", "70"),
            record("A", "1", "Math", "Mid", "80"),
            record("B", "3", "Math", "Mid", "65"),
            record("B", "2", "Science", "Final", "75"),
            record("A", "1", "Math", "Final", "88"),
        ]);

        assert_eq!(report.grades().collect::<Vec<_>>(), vec!["B", "A"]);
        let b = report.get("B").unwrap();
        assert_eq!(
            b.exam_types.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["Final", "Mid"]
        );
        assert_eq!(b.students.keys().map(String::as_str).collect::<Vec<_>>(), vec!["2", "3"]);
        assert_eq!(report.leaf_count(), 4);
    }

    #[test]
    fn missing_names_default_to_unknown() {
        let report = aggregate(vec![
            record("A", "9", "Math", "Mid", "50"),
            record("A", "10", "Math", "Mid", "51").with_name("Nila", "S"),
        ]);
        let students = &report.get("A").unwrap().students;
        assert_eq!(students["9"].first_name, UNKNOWN_NAME);
        assert_eq!(students["9"].last_name, UNKNOWN_NAME);
        assert_eq!(students["10"].first_name, "Nila");
    }

    #[test]
    fn same_roll_under_two_grades_is_listed_twice() {
        let report = aggregate(vec![
            record("A", "1", "Math", "Mid", "91"),
            record("B", "1", "Art", "Mid", "72"),
        ]);
        assert!(report.get("A").unwrap().students.contains_key("1"));
        assert!(report.get("B").unwrap().students.contains_key("1"));
    }

    #[test]
    fn delete_grade_leaves_other_grades_untouched() {
        let report = aggregate(vec![
            record("A", "1", "Math", "Mid", "91"),
            record("B", "2", "Math", "Mid", "72"),
            record("C", "3", "Math", "Mid", "55"),
        ]);
        let b_before = report.get("B").cloned();

        let report = report.without_grade("A");
        assert_eq!(report.grades().collect::<Vec<_>>(), vec!["B", "C"]);
        assert_eq!(report.get("B").cloned(), b_before);
    }

    #[test]
    fn table_rows_fill_missing_marks() {
        let report = aggregate(vec![
            record("A", "1", "Math", "Mid", "80"),
            record("A", "1", "Math", "Final", "85"),
            record("A", "1", "Science", "Final", "77"),
        ]);
        let bucket = report.get("A").unwrap();

        assert_eq!(bucket.table_header(), vec!["S.No", "Subjects", "Mid", "Final"]);
        let rows = bucket.students["1"].table_rows(&bucket.exam_types);
        assert_eq!(rows[0], vec!["1", "Math", "80", "85"]);
        assert_eq!(rows[1], vec!["2", "Science", "-", "77"]);
    }

    #[test]
    fn page_drops_stale_responses() {
        let page = ReportPage::new();
        let stale = page.begin_fetch();
        let fresh = page.begin_fetch();

        let applied = page
            .apply(stale, vec![record("A", "1", "Math", "Mid", "10")])
            .unwrap();
        assert!(applied.is_none());
        assert!(page.snapshot().is_empty());

        let applied = page
            .apply(fresh, vec![record("B", "1", "Math", "Mid", "20")])
            .unwrap();
        assert_eq!(applied.unwrap().grades().collect::<Vec<_>>(), vec!["B"]);
    }

    #[test]
    fn page_reports_empty_result_as_not_found() {
        let page = ReportPage::new();
        let ticket = page.begin_fetch();
        let err = page.apply(ticket, Vec::new()).unwrap_err();
        assert!(matches!(err, ConsoleError::NotFound(_)));
    }

    #[test]
    fn unmount_invalidates_in_flight_fetch() {
        let page = ReportPage::new();
        let ticket = page.begin_fetch();
        page.unmount();
        let applied = page
            .apply(ticket, vec![record("A", "1", "Math", "Mid", "10")])
            .unwrap();
        assert!(applied.is_none());
    }
}
