//! Error types for catalog construction, planning requests, and the catalog cache.
//!
//! Infeasible and inconclusive solves are not errors; they are reported through
//! [`SolveStatus`](crate::core::planner::SolveStatus).

use thiserror::Error;

/// Structural problems found while building a [`Catalog`](crate::core::models::Catalog).
///
/// These are fatal at startup and must not be swallowed.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A required sheet (CSV file) is absent from the catalog source.
    #[error("missing sheet '{sheet}'")]
    MissingSheet {
        /// Sheet name
        sheet: String,
    },

    /// A required column is absent from a sheet's header row.
    #[error("sheet '{sheet}' is missing column '{column}'")]
    MissingColumn {
        /// Sheet name
        sheet: String,
        /// Column name
        column: String,
    },

    /// A sheet has fewer rows than required.
    #[error("sheet '{sheet}' needs at least {expected} rows, found {found}")]
    MissingRows {
        /// Sheet name
        sheet: String,
        /// Rows required
        expected: usize,
        /// Rows present
        found: usize,
    },

    /// A cell could not be parsed into the expected type.
    #[error("sheet '{sheet}', row {row}: invalid {column} '{value}'")]
    InvalidCell {
        /// Sheet name
        sheet: String,
        /// One-based data row
        row: usize,
        /// Column name
        column: String,
        /// Raw cell contents
        value: String,
    },

    /// The same course id appears twice in the course table.
    #[error("duplicate course id '{0}'")]
    DuplicateCourse(String),

    /// A course is worth no credits.
    #[error("course '{0}' must be worth at least one credit")]
    ZeroCredits(String),

    /// A rule references a course id that is not in the course table.
    #[error("{context} references unknown course '{course}'")]
    UnknownCourse {
        /// Where the reference was found (e.g. "prerequisite of CS101")
        context: String,
        /// The dangling course id
        course: String,
    },

    /// A general-education pair does not hold exactly two courses.
    #[error("general education pair {index} must list exactly two courses, found {found}")]
    MalformedPair {
        /// Zero-based pair index
        index: usize,
        /// Number of ids listed
        found: usize,
    },

    /// The per-term credit bounds are inverted.
    #[error("minimum credits per term ({min}) exceeds maximum ({max})")]
    InvalidCreditBounds {
        /// Minimum credits
        min: u32,
        /// Maximum credits
        max: u32,
    },

    /// Reading a sheet failed.
    #[error("failed to read sheet '{sheet}': {source}")]
    Csv {
        /// Sheet name
        sheet: String,
        /// Underlying CSV error
        #[source]
        source: csv::Error,
    },
}

/// Problems with a single planning request.
///
/// Rejected per request with a diagnosable message; never silently coerced.
#[derive(Error, Debug)]
pub enum InputError {
    /// A grade or proposed selection names a course the catalog does not know.
    #[error("unknown course id '{0}'")]
    UnknownCourse(String),

    /// A grade entry has no grade.
    #[error("empty grade for course '{0}'")]
    EmptyGrade(String),

    /// The term count is outside the accepted range.
    #[error("terms studied must be between 0 and {max}, got {value}")]
    TermsOutOfRange {
        /// Value supplied
        value: u32,
        /// Largest accepted value
        max: u32,
    },

    /// The student record was built against a different catalog.
    #[error(
        "student record was built for a different catalog \
         ({record} courses recorded, {catalog} in the catalog)"
    )]
    RecordMismatch {
        /// Courses in the record
        record: usize,
        /// Courses in the catalog
        catalog: usize,
    },

    /// A `COURSE=GRADE` argument could not be split.
    #[error("invalid grade entry '{0}' (expected COURSE=GRADE)")]
    InvalidGradeEntry(String),

    /// The grade file lacks a required column.
    #[error("grade file is missing column '{0}'")]
    MissingGradeColumn(String),

    /// The grade file could not be read.
    #[error("failed to read grades: {0}")]
    Grades(#[from] csv::Error),
}

/// Problems reading or writing the catalog snapshot.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Filesystem failure.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot is not valid JSON for a catalog.
    #[error("cache serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot was written by an incompatible version.
    #[error("cache format version {found} is not supported (expected {expected})")]
    Version {
        /// Version in the file
        found: u32,
        /// Version this build reads
        expected: u32,
    },

    /// The snapshot decoded but describes an invalid catalog.
    #[error("cached catalog is invalid: {0}")]
    Catalog(#[from] CatalogError),
}

/// Errors surfaced by the planning facade.
#[derive(Error, Debug)]
pub enum PlanError {
    /// The request was malformed.
    #[error(transparent)]
    Input(#[from] InputError),
}
