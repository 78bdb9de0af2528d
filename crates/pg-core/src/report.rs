use std::io::{self, Write};

use colored::{Color, Colorize};

use crate::{
  process::Target,
  runner::{CaseStatus, TestResults},
  schema::TestSchema,
};

const RULE: &str = "===============================";
const CHECK: &str = "\u{2713}";
const HAPPYGRAM: &str = "\u{1F60E}";
const SUBMIT: &str = "You should be good to submit your assignment now!";
const TROUBLESHOOT: [&str; 2] = [
  "Command line(s) to invoke specific failed unit tests follow this message. They",
  "will give you much more detailed information about what's wrong with your program.",
];

/// Style of a per-tag line. Keyed on points earned, not on pass/fail, so a
/// passing tag worth nothing is still shown as `Zero`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
  Pass,
  Zero,
}

impl LineStyle {
  fn color(self) -> Color {
    match self {
      LineStyle::Pass => Color::Cyan,
      LineStyle::Zero => Color::BrightYellow,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TotalStyle {
  None,
  Partial,
  Complete,
}

impl TotalStyle {
  fn color(self) -> Color {
    match self {
      TotalStyle::None => Color::BrightRed,
      TotalStyle::Partial => Color::BrightYellow,
      TotalStyle::Complete => Color::BrightGreen,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseLine {
  pub tag: String,
  pub earned: u32,
  pub points: u32,
  pub status: Option<CaseStatus>,
}

impl CaseLine {
  pub fn passed(&self) -> bool {
    self.status.is_some_and(CaseStatus::passed)
  }

  pub fn style(&self) -> LineStyle {
    if self.earned > 0 {
      LineStyle::Pass
    } else {
      LineStyle::Zero
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreReport {
  pub cases: Vec<CaseLine>,
  pub earned: u64,
  pub possible: u64,
  pub failing_commands: Vec<String>,
}

impl ScoreReport {
  /// An empty schema is vacuously complete: 0 of 0.
  pub fn is_complete(&self) -> bool {
    self.earned == self.possible
  }

  pub fn style(&self) -> TotalStyle {
    if self.is_complete() {
      TotalStyle::Complete
    } else if self.earned > 0 {
      TotalStyle::Partial
    } else {
      TotalStyle::None
    }
  }
}

/// Scores `results` against `schema`. A tag with no recorded status counts
/// as failed.
pub fn compute_report(schema: &TestSchema, results: &TestResults, target: &Target) -> ScoreReport {
  let cases = schema
    .iter()
    .map(|(tag, points)| {
      let status = results.status(tag);
      let earned = if status.is_some_and(CaseStatus::passed) {
        points
      } else {
        0
      };
      CaseLine {
        tag: tag.to_string(),
        earned,
        points,
        status,
      }
    })
    .collect::<Vec<_>>();

  let failing_commands = cases
    .iter()
    .filter(|case| !case.passed())
    .map(|case| target.rerun_command(&case.tag))
    .collect();

  ScoreReport {
    earned: cases.iter().map(|case| u64::from(case.earned)).sum(),
    possible: schema.total(),
    cases,
    failing_commands,
  }
}

fn paint(text: String, color: Color, colorize: bool) -> String {
  if colorize {
    text.color(color).to_string()
  } else {
    text
  }
}

fn report_lines(report: &ScoreReport, colorize: bool) -> Vec<String> {
  let mut lines = vec![String::new()];

  for case in &report.cases {
    let style = case.style();
    let check = match style {
      LineStyle::Pass => CHECK,
      LineStyle::Zero => "",
    };
    let line = format!("{:<20} {:<2} / {:<2}  {check}", case.tag, case.earned, case.points);
    lines.push(paint(line, style.color(), colorize));
  }
  lines.push(RULE.to_string());

  let style = report.style();
  let happygram = if report.is_complete() { HAPPYGRAM } else { "" };
  let total = format!(
    "{:<20} {:<2} / {:<2} {happygram}",
    "TOTAL", report.earned, report.possible
  );
  lines.push(paint(total, style.color(), colorize));
  lines.push(String::new());

  if report.is_complete() {
    lines.push(SUBMIT.to_string());
  } else {
    lines.extend(TROUBLESHOOT.iter().map(|s| s.to_string()));
    lines.push(String::new());
  }
  lines.extend(report.failing_commands.iter().cloned());
  lines
}

pub fn render(report: &ScoreReport, colorize: bool) -> String {
  let mut text = report_lines(report, colorize).join("\n");
  text.push('\n');
  text
}

pub fn write_report(out: &mut impl Write, report: &ScoreReport, colorize: bool) -> io::Result<()> {
  out.write_all(render(report, colorize).as_bytes())?;
  out.flush()
}

pub fn print_report(report: &ScoreReport, colorize: bool) -> io::Result<()> {
  write_report(&mut io::stdout().lock(), report, colorize)
}
