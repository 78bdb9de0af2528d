use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::{error::ErrorKind, Parser};
use pg_core::{print_report, GradeError, Grader, ProcessRunner, Target, DEFAULT_POINTS_FILE};
use tracing_subscriber::{fmt, layer::SubscriberExt, prelude::*, EnvFilter};

const USAGE_EXIT: u8 = 255;

/// Runs each tagged case of a test executable and prints a score report.
#[derive(Parser)]
#[command(name = "grade", author, version, about, long_about = None)]
struct Cli {
  /// Test executable in the current directory, e.g. `linked_list_test`
  binary: String,

  /// Point schema listing the tags to run and what each is worth
  #[arg(long, env = "GRADE_POINTS", default_value = DEFAULT_POINTS_FILE)]
  points: PathBuf,
}

fn print_usage() {
  println!("Syntax:  grade some_test");
  println!("Example: grade linked_list_test");
}

fn grade(cli: &Cli) -> Result<()> {
  let target = Target::resolve(&cli.binary);
  let grader = Grader::load(&cli.points, target.clone())?;

  // the runner holds the null sink; close it before reporting
  let report = {
    let mut runner = ProcessRunner::new(target)?;
    grader.grade(&mut runner)?
  };

  print_report(&report, true).map_err(GradeError::from)?;
  Ok(())
}

fn main() -> ExitCode {
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(EnvFilter::from_default_env())
    .init();

  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
    Err(e) => {
      tracing::debug!("Bad arguments: {e}");
      print_usage();
      return ExitCode::from(USAGE_EXIT);
    }
  };

  match grade(&cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::debug!("{e:?}");
      println!("{e}");
      let code = e
        .downcast_ref::<GradeError>()
        .map_or(1, GradeError::exit_code);
      ExitCode::from(u8::try_from(code).unwrap_or(1))
    }
  }
}
