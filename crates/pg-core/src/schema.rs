use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;

use crate::error::{GradeError, Result};

pub const DEFAULT_POINTS_FILE: &str = "points.json";

/// On-disk shape of `points.json`. Each entry is its own object so the
/// array fixes the order of the tags.
#[derive(Deserialize)]
struct PointsFile {
  points: Vec<BTreeMap<String, u32>>,
}

/// Ordered tag -> points mapping. Tags are unique: inserting an existing
/// tag replaces its points and leaves it where it first appeared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestSchema {
  entries: Vec<(String, u32)>,
}

impl TestSchema {
  pub fn new() -> Self {
    TestSchema::default()
  }

  pub fn insert(&mut self, tag: impl Into<String>, points: u32) {
    let tag = tag.into();
    match self.entries.iter_mut().find(|(t, _)| *t == tag) {
      Some(entry) => {
        tracing::debug!("Duplicate tag {tag:?}, replacing {} with {points}", entry.1);
        entry.1 = points;
      }
      None => self.entries.push((tag, points)),
    }
  }

  pub fn from_json(text: &str) -> serde_json::Result<Self> {
    let file = serde_json::from_str::<PointsFile>(text)?;
    Ok(
      file
        .points
        .into_iter()
        .flat_map(|entry| entry.into_iter())
        .collect(),
    )
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
    self.entries.iter().map(|(tag, points)| (tag.as_str(), *points))
  }

  pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
    self.iter().map(|(tag, _)| tag)
  }

  pub fn points(&self, tag: &str) -> Option<u32> {
    self.iter().find(|(t, _)| *t == tag).map(|(_, points)| points)
  }

  pub fn total(&self) -> u64 {
    self.iter().map(|(_, points)| u64::from(points)).sum()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl<S: Into<String>> FromIterator<(S, u32)> for TestSchema {
  fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
    let mut schema = TestSchema::new();
    for (tag, points) in iter {
      schema.insert(tag, points);
    }
    schema
  }
}

/// Reads and parses the schema at `path`. Any failure, whether the file is
/// missing or its contents are malformed, is a [`GradeError::Schema`].
pub fn load_schema(path: &Path) -> Result<TestSchema> {
  let schema_error = |reason: String| GradeError::Schema {
    path: path.to_path_buf(),
    reason,
  };
  let contents = fs::read_to_string(path).map_err(|e| schema_error(e.to_string()))?;
  let schema = TestSchema::from_json(&contents).map_err(|e| schema_error(e.to_string()))?;
  tracing::debug!(
    "Loaded {} tags worth {} points from {}",
    schema.len(),
    schema.total(),
    path.display()
  );
  Ok(schema)
}
