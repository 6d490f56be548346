//! Grade input: `course_id,grade` files and `COURSE=GRADE` arguments

use crate::core::error::InputError;
use csv::{ReaderBuilder, Trim};
use std::path::Path;

/// Read a grade file with `course_id` and `grade` columns
///
/// Rows are returned in file order. Blank rows are skipped; a row with a
/// course id but no grade is kept so request validation can reject it.
///
/// # Errors
/// Returns [`InputError`] when the file cannot be read or lacks a column.
pub fn parse_grades_csv<P: AsRef<Path>>(path: P) -> Result<Vec<(String, String)>, InputError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| InputError::MissingGradeColumn(name.to_string()))
    };
    let id_col = column("course_id")?;
    let grade_col = column("grade")?;

    let mut grades = Vec::new();
    for record in reader.records() {
        let record = record?;
        let id = record.get(id_col).unwrap_or("");
        let grade = record.get(grade_col).unwrap_or("");
        if id.is_empty() && grade.is_empty() {
            continue;
        }
        grades.push((id.to_string(), grade.to_string()));
    }
    Ok(grades)
}

/// Split a `COURSE=GRADE` argument
///
/// # Errors
/// Returns [`InputError::InvalidGradeEntry`] when there is no `=` or no course id.
pub fn parse_grade_entry(raw: &str) -> Result<(String, String), InputError> {
    let (id, grade) = raw
        .split_once('=')
        .ok_or_else(|| InputError::InvalidGradeEntry(raw.to_string()))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(InputError::InvalidGradeEntry(raw.to_string()));
    }
    Ok((id.to_string(), grade.trim().to_string()))
}
