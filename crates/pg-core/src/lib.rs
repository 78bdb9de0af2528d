//! Grades a tag-filtered test executable against a weighted point schema.
//!
//! The schema (`points.json`) lists tags in display order with their point
//! values. Each tag is run as its own invocation of the executable, and only
//! the exit status is kept. The scores are then rendered as a colored report.

pub mod error;
pub mod grader;
pub mod process;
pub mod report;
pub mod runner;
pub mod schema;

pub use error::GradeError;
pub use grader::Grader;
pub use process::{ProcessRunner, Target};
pub use report::{compute_report, print_report, render, ScoreReport};
pub use runner::{CaseRunner, CaseStatus, TestResults};
pub use schema::{load_schema, TestSchema, DEFAULT_POINTS_FILE};
