//! CSV sheet loader for curriculum catalogs
//!
//! A catalog directory holds one CSV file per sheet. `Requirements.csv` and
//! `Courses.csv` must exist; the remaining sheets are optional and read as
//! empty when absent.

use crate::core::error::CatalogError;
use crate::core::models::{Catalog, CatalogBuilder, Course, Minor, Requirements};
use crate::{debug, info};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;

/// Credit requirement and per-term bounds
pub const REQUIREMENTS_SHEET: &str = "Requirements";
/// Course table
pub const COURSES_SHEET: &str = "Courses";
/// Minor name → required courses
pub const MINORS_SHEET: &str = "Minors";
/// General-education group
pub const GEN_ED_SHEET: &str = "GenEd";
/// General-education pairs
pub const PAIRED_GEN_ED_SHEET: &str = "pairedGenEd";
/// Project modules
pub const PROJECTS_SHEET: &str = "Projects";
/// Free-elective modules
pub const FREE_ELECTIVES_SHEET: &str = "Free electives";

/// One sheet read into memory
struct Sheet {
    name: &'static str,
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Sheet {
    /// Read `<dir>/<name>.csv`, or `None` when the file does not exist
    fn read_optional(dir: &Path, name: &'static str) -> Result<Option<Self>, CatalogError> {
        let path = dir.join(format!("{name}.csv"));
        if !path.is_file() {
            return Ok(None);
        }

        let csv_err = |source: csv::Error| CatalogError::Csv {
            sheet: name.to_string(),
            source,
        };
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_path(&path)
            .map_err(csv_err)?;
        let headers = reader.headers().map_err(csv_err)?.clone();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            rows.push(record);
        }
        Ok(Some(Self {
            name,
            headers,
            rows,
        }))
    }

    fn read_required(dir: &Path, name: &'static str) -> Result<Self, CatalogError> {
        Self::read_optional(dir, name)?.ok_or_else(|| CatalogError::MissingSheet {
            sheet: name.to_string(),
        })
    }

    /// Position of a column, matched case-insensitively
    fn column(&self, column: &str) -> Result<usize, CatalogError> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(column))
            .ok_or_else(|| CatalogError::MissingColumn {
                sheet: self.name.to_string(),
                column: column.to_string(),
            })
    }

    fn invalid(&self, row: usize, column: &str, value: &str) -> CatalogError {
        CatalogError::InvalidCell {
            sheet: self.name.to_string(),
            row: row + 1,
            column: column.to_string(),
            value: value.to_string(),
        }
    }
}

fn cell(record: &StringRecord, col: usize) -> &str {
    record.get(col).unwrap_or("")
}

/// Split a comma-separated cell into trimmed, non-empty ids
#[must_use]
pub fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Load and validate a catalog from a directory of CSV sheets
///
/// # Errors
/// Returns [`CatalogError`] when a required sheet or column is missing, a
/// cell cannot be parsed, or the assembled catalog fails validation.
pub fn load_catalog_dir<P: AsRef<Path>>(dir: P) -> Result<Catalog, CatalogError> {
    let dir = dir.as_ref();
    debug!("ingest: reading catalog sheets from {}", dir.display());

    let requirements = parse_requirements(&Sheet::read_required(dir, REQUIREMENTS_SHEET)?)?;
    let mut builder = CatalogBuilder::new(requirements);
    builder.courses = parse_courses(&Sheet::read_required(dir, COURSES_SHEET)?)?;

    if let Some(sheet) = Sheet::read_optional(dir, MINORS_SHEET)? {
        builder.minors = parse_minors(&sheet)?;
    }
    if let Some(sheet) = Sheet::read_optional(dir, GEN_ED_SHEET)? {
        builder.general_education_group = parse_id_column(&sheet)?;
    }
    if let Some(sheet) = Sheet::read_optional(dir, PAIRED_GEN_ED_SHEET)? {
        builder.general_education_pairs = parse_pairs(&sheet)?;
    }
    if let Some(sheet) = Sheet::read_optional(dir, PROJECTS_SHEET)? {
        builder.project_modules = parse_id_column(&sheet)?;
    }
    if let Some(sheet) = Sheet::read_optional(dir, FREE_ELECTIVES_SHEET)? {
        builder.free_elective_modules = parse_id_column(&sheet)?;
    }

    let catalog = builder.build()?;
    info!(
        "ingest: loaded {} course(s), {} minor(s) from {}",
        catalog.len(),
        catalog.minors().len(),
        dir.display()
    );
    Ok(catalog)
}

fn parse_requirements(sheet: &Sheet) -> Result<Requirements, CatalogError> {
    const COLUMN: &str = "value";
    let col = sheet.column(COLUMN)?;
    if sheet.rows.len() < 3 {
        return Err(CatalogError::MissingRows {
            sheet: sheet.name.to_string(),
            expected: 3,
            found: sheet.rows.len(),
        });
    }

    let value = |row: usize| -> Result<u32, CatalogError> {
        let raw = cell(&sheet.rows[row], col);
        parse_whole_number(raw).ok_or_else(|| sheet.invalid(row, COLUMN, raw))
    };
    Ok(Requirements {
        credit_requirement: value(0)?,
        min_credits_per_term: value(1)?,
        max_credits_per_term: value(2)?,
    })
}

fn parse_courses(sheet: &Sheet) -> Result<Vec<Course>, CatalogError> {
    let id_col = sheet.column("course_id")?;
    let credits_col = sheet.column("credits")?;
    let prereq_col = sheet.column("prerequisites")?;
    let prior_col = sheet.column("prior_exposure")?;
    let co_col = sheet.column("co_modules")?;
    let slots_col = sheet.column("time_slots")?;
    let offered_col = sheet.column("is_available_term")?;

    let mut courses = Vec::with_capacity(sheet.rows.len());
    for (row, record) in sheet.rows.iter().enumerate() {
        let id = cell(record, id_col);
        if id.is_empty() {
            return Err(sheet.invalid(row, "course_id", id));
        }

        let raw_credits = cell(record, credits_col);
        let credits = parse_whole_number(raw_credits)
            .filter(|c| *c > 0)
            .ok_or_else(|| sheet.invalid(row, "credits", raw_credits))?;

        let raw_offered = cell(record, offered_col);
        let offered = parse_flag(raw_offered)
            .ok_or_else(|| sheet.invalid(row, "is_available_term", raw_offered))?;

        let mut course = Course::new(id.to_string(), credits);
        course.set_offered(offered);
        for prereq in split_ids(cell(record, prereq_col)) {
            course.add_prerequisite(prereq);
        }
        for slot in split_ids(cell(record, slots_col)) {
            course.add_timeslot(slot);
        }
        if let Some(prior) = first_listed(id, "prior_exposure", cell(record, prior_col)) {
            course.set_prior_exposure(prior);
        }
        if let Some(co) = first_listed(id, "co_modules", cell(record, co_col)) {
            course.set_co_module(co);
        }
        courses.push(course);
    }
    Ok(courses)
}

/// Keep the first id of a multi-valued single-id cell
fn first_listed(course: &str, column: &str, raw: &str) -> Option<String> {
    let mut ids = split_ids(raw).into_iter();
    let first = ids.next()?;
    let dropped: Vec<String> = ids.collect();
    if !dropped.is_empty() {
        debug!(
            "ingest: {course} lists several {column} ids; keeping {first}, dropping {}",
            dropped.join(", ")
        );
    }
    Some(first)
}

fn parse_minors(sheet: &Sheet) -> Result<Vec<Minor>, CatalogError> {
    let name_col = sheet.column("minor_name")?;
    let courses_col = sheet.column("required_courses")?;

    let mut minors = Vec::with_capacity(sheet.rows.len());
    for (row, record) in sheet.rows.iter().enumerate() {
        let name = cell(record, name_col);
        if name.is_empty() {
            return Err(sheet.invalid(row, "minor_name", name));
        }
        minors.push(Minor {
            name: name.to_string(),
            courses: split_ids(cell(record, courses_col)),
        });
    }
    Ok(minors)
}

fn parse_id_column(sheet: &Sheet) -> Result<Vec<String>, CatalogError> {
    let col = sheet.column("course_id")?;
    Ok(sheet
        .rows
        .iter()
        .map(|record| cell(record, col))
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .collect())
}

fn parse_pairs(sheet: &Sheet) -> Result<Vec<(String, String)>, CatalogError> {
    let col = sheet.column("Groups")?;

    let mut pairs = Vec::with_capacity(sheet.rows.len());
    for record in &sheet.rows {
        let ids = split_ids(cell(record, col));
        if ids.is_empty() {
            continue;
        }
        let index = pairs.len();
        match <[String; 2]>::try_from(ids) {
            Ok([first, second]) => pairs.push((first, second)),
            Err(ids) => {
                return Err(CatalogError::MalformedPair {
                    index,
                    found: ids.len(),
                })
            }
        }
    }
    Ok(pairs)
}

/// Parse a non-negative whole number, accepting spreadsheet-style `3.0`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_whole_number(raw: &str) -> Option<u32> {
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
        return Some(f as u32);
    }
    None
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" | "y" => Some(true),
        "0" | "0.0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
