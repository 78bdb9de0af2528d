use std::{fmt, path::Path};

use crate::{
  error::Result,
  process::Target,
  report::{compute_report, ScoreReport},
  runner::{self, CaseRunner},
  schema::{load_schema, TestSchema},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
  Loading,
  Running,
  Reporting,
  Done,
  Failed,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Stage::Loading => "loading",
        Stage::Running => "running",
        Stage::Reporting => "reporting",
        Stage::Done => "done",
        Stage::Failed => "failed",
      }
    )
  }
}

fn finish<T>(stage: Stage, result: Result<T>) -> Result<T> {
  match &result {
    Ok(_) => tracing::debug!("Grading stage {stage} finished"),
    Err(e) => tracing::debug!("Grading stage {stage} {}: {e}", Stage::Failed),
  }
  result
}

pub struct Grader {
  schema: TestSchema,
  target: Target,
}

impl Grader {
  pub fn new(schema: TestSchema, target: Target) -> Self {
    Grader { schema, target }
  }

  pub fn load(points: &Path, target: Target) -> Result<Self> {
    let schema = finish(Stage::Loading, load_schema(points))?;
    Ok(Grader::new(schema, target))
  }

  pub fn schema(&self) -> &TestSchema {
    &self.schema
  }

  pub fn target(&self) -> &Target {
    &self.target
  }

  /// Runs every case through `runner` and scores the outcome. Fails only if
  /// the runner cannot invoke the cases at all.
  pub fn grade(&self, runner: &mut impl CaseRunner) -> Result<ScoreReport> {
    let results = finish(Stage::Running, runner::run(runner, &self.schema))?;
    let report = finish(
      Stage::Reporting,
      Ok(compute_report(&self.schema, &results, &self.target)),
    )?;
    tracing::debug!(
      "Grading stage {}: {} / {} points",
      Stage::Done,
      report.earned,
      report.possible
    );
    Ok(report)
  }
}
