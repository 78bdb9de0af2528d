use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures that abort a grading run before any score is reported.
///
/// A test case exiting nonzero is not an error: it is recorded in
/// [`TestResults`](crate::runner::TestResults) and shows up in the report.
#[derive(Debug, Error)]
pub enum GradeError {
  #[error("Couldn't open or parse {}", path.display())]
  Schema { path: PathBuf, reason: String },

  #[error("Couldn't invoke the unit tests. Did it compile? (hint: type 'make' in your terminal)")]
  Invocation {
    target: String,
    #[source]
    source: io::Error,
  },

  #[error("Failed to write the score report")]
  Io(#[from] io::Error),
}

impl GradeError {
  pub fn exit_code(&self) -> i32 {
    match self {
      GradeError::Schema { .. } => 2,
      GradeError::Invocation { .. } => 3,
      GradeError::Io(_) => 1,
    }
  }
}

pub type Result<T, E = GradeError> = std::result::Result<T, E>;
