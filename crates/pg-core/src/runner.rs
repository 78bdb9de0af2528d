use std::fmt;

use crate::{error::Result, schema::TestSchema};

/// Exit status of one test case invocation. Zero means the case passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaseStatus(pub i32);

impl CaseStatus {
  pub const PASSED: CaseStatus = CaseStatus(0);

  /// Recorded for a child that ended without an exit code, e.g. killed by a signal.
  pub const NO_CODE: CaseStatus = CaseStatus(-1);

  pub fn passed(self) -> bool {
    self.0 == 0
  }
}

impl fmt::Display for CaseStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Runs a single tagged case and reports how it exited.
///
/// An `Err` means the cases could not be run at all; a failing case is an
/// `Ok` holding a nonzero status.
pub trait CaseRunner {
  fn run_case(&mut self, tag: &str) -> Result<CaseStatus>;
}

impl<F> CaseRunner for F
where
  F: FnMut(&str) -> Result<CaseStatus>,
{
  fn run_case(&mut self, tag: &str) -> Result<CaseStatus> {
    self(tag)
  }
}

/// Per-tag exit statuses in the order they were run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestResults {
  statuses: Vec<(String, CaseStatus)>,
}

impl TestResults {
  pub fn new() -> Self {
    TestResults::default()
  }

  pub fn record(&mut self, tag: impl Into<String>, status: CaseStatus) {
    let tag = tag.into();
    match self.statuses.iter_mut().find(|(t, _)| *t == tag) {
      Some(entry) => entry.1 = status,
      None => self.statuses.push((tag, status)),
    }
  }

  pub fn status(&self, tag: &str) -> Option<CaseStatus> {
    self
      .statuses
      .iter()
      .find(|(t, _)| t == tag)
      .map(|(_, status)| *status)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, CaseStatus)> + '_ {
    self
      .statuses
      .iter()
      .map(|(tag, status)| (tag.as_str(), *status))
  }

  pub fn len(&self) -> usize {
    self.statuses.len()
  }

  pub fn is_empty(&self) -> bool {
    self.statuses.is_empty()
  }
}

impl<S: Into<String>> FromIterator<(S, CaseStatus)> for TestResults {
  fn from_iter<I: IntoIterator<Item = (S, CaseStatus)>>(iter: I) -> Self {
    let mut results = TestResults::new();
    for (tag, status) in iter {
      results.record(tag, status);
    }
    results
  }
}

/// Runs every tag of `schema`, one after another, in schema order. Stops at
/// the first runner error.
pub fn run(runner: &mut impl CaseRunner, schema: &TestSchema) -> Result<TestResults> {
  let mut results = TestResults::new();
  for tag in schema.tags() {
    let status = runner.run_case(tag)?;
    tracing::debug!("Case {tag:?} exited with {status}");
    results.record(tag, status);
  }
  Ok(results)
}
