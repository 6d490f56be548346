//! Catalog and grade ingestion from CSV

pub mod csv_parser;
pub mod grades;

pub use csv_parser::{load_catalog_dir, split_ids};
pub use grades::{parse_grade_entry, parse_grades_csv};
