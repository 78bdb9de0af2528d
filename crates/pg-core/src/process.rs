use std::{
  fmt,
  fs::{File, OpenOptions},
  path::{Path, PathBuf},
  process::{Command, Stdio},
};

use cfg_if::cfg_if;

use crate::{
  error::{GradeError, Result},
  runner::{CaseRunner, CaseStatus},
};

cfg_if! {
  if #[cfg(windows)] {
    const NULL_DEVICE: &str = "NUL";
  } else {
    const NULL_DEVICE: &str = "/dev/null";
  }
}

/// The filter argument that selects `tag` in the test executable.
pub fn case_filter(tag: &str) -> String {
  format!("[{tag}]")
}

/// The test executable, as named on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
  path: PathBuf,
  shown: String,
}

impl Target {
  /// Relative names are looked up in the working directory, never on `PATH`.
  pub fn resolve(name: &str) -> Self {
    let shown = if Path::new(name).is_absolute() {
      name.to_string()
    } else {
      format!("./{name}")
    };
    Target {
      path: PathBuf::from(&shown),
      shown,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Shell command that reruns only `tag`, with the framework's own output.
  pub fn rerun_command(&self, tag: &str) -> String {
    format!("{} \"{}\"", self.shown, case_filter(tag))
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.shown)
  }
}

/// Runs cases by spawning the target once per tag. Child output goes to a
/// null device that is opened once and closed when the runner is dropped.
pub struct ProcessRunner {
  target: Target,
  sink: File,
}

impl ProcessRunner {
  pub fn new(target: Target) -> Result<Self> {
    let sink = OpenOptions::new().write(true).open(NULL_DEVICE)?;
    Ok(ProcessRunner { target, sink })
  }

  pub fn target(&self) -> &Target {
    &self.target
  }

  fn command(&self, tag: &str) -> Result<Command> {
    let mut cmd = Command::new(self.target.path());
    cmd
      .arg(case_filter(tag))
      .stdout(Stdio::from(self.sink.try_clone()?))
      .stderr(Stdio::from(self.sink.try_clone()?));
    Ok(cmd)
  }
}

impl CaseRunner for ProcessRunner {
  fn run_case(&mut self, tag: &str) -> Result<CaseStatus> {
    tracing::trace!("Running {}", self.target.rerun_command(tag));
    let status = self
      .command(tag)?
      .status()
      .map_err(|source| GradeError::Invocation {
        target: self.target.to_string(),
        source,
      })?;
    Ok(match status.code() {
      Some(code) => CaseStatus(code),
      None => {
        tracing::warn!("Case {tag:?} ended without an exit code: {status}");
        CaseStatus::NO_CODE
      }
    })
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn relative_names_get_dot_slash() {
    let target = Target::resolve("fsm_test");
    assert_eq!(target.path(), Path::new("./fsm_test"));
    assert_eq!(target.to_string(), "./fsm_test");
    assert_eq!(
      target.rerun_command("add get state"),
      r#"./fsm_test "[add get state]""#
    );
  }

  #[cfg(unix)]
  #[test]
  fn absolute_paths_are_kept() {
    let target = Target::resolve("/opt/tests/fsm_test");
    assert_eq!(target.path(), Path::new("/opt/tests/fsm_test"));
    assert_eq!(target.rerun_command("hw"), r#"/opt/tests/fsm_test "[hw]""#);
  }

  #[test]
  fn filter_is_bracketed() {
    assert_eq!(case_filter("brain bag"), "[brain bag]");
    assert_eq!(case_filter(""), "[]");
  }

  #[cfg(unix)]
  mod unix {
    use super::*;
    use std::{fs, os::unix::fs::PermissionsExt, sync::Mutex};

    // Spawning while another test still holds a freshly written script open
    // for writing makes exec fail with ETXTBSY.
    static SPAWN: Mutex<()> = Mutex::new(());

    fn system_target(name: &str) -> anyhow::Result<Target> {
      let path = which::which(name)?;
      Ok(Target::resolve(&path.to_string_lossy()))
    }

    fn script(dir: &Path, body: &str) -> anyhow::Result<Target> {
      let path = dir.join("cases.sh");
      fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
      fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
      Ok(Target::resolve(&path.to_string_lossy()))
    }

    #[test]
    fn exit_status_is_recorded() -> anyhow::Result<()> {
      let _guard = SPAWN.lock().unwrap_or_else(|e| e.into_inner());
      let mut pass = ProcessRunner::new(system_target("true")?)?;
      assert_eq!(pass.run_case("constructor")?, CaseStatus::PASSED);
      let mut fail = ProcessRunner::new(system_target("false")?)?;
      assert!(!fail.run_case("constructor")?.passed());
      Ok(())
    }

    #[test]
    fn filter_arrives_as_one_argument() -> anyhow::Result<()> {
      let _guard = SPAWN.lock().unwrap_or_else(|e| e.into_inner());
      let dir = tempfile::tempdir()?;
      let target = script(
        dir.path(),
        r#"[ "$#" -eq 1 ] || exit 9
echo "lots of output" ; echo "and errors" >&2
[ "$1" = "[add get state]" ] && exit 0
exit 4"#,
      )?;
      let mut runner = ProcessRunner::new(target)?;
      assert_eq!(runner.run_case("add get state")?, CaseStatus::PASSED);
      assert_eq!(runner.run_case("moonman")?, CaseStatus(4));
      Ok(())
    }

    #[test]
    fn killed_case_fails() -> anyhow::Result<()> {
      let _guard = SPAWN.lock().unwrap_or_else(|e| e.into_inner());
      let dir = tempfile::tempdir()?;
      let mut runner = ProcessRunner::new(script(dir.path(), "kill -9 $$")?)?;
      assert_eq!(runner.run_case("segfault")?, CaseStatus::NO_CODE);
      Ok(())
    }

    #[test]
    fn missing_binary_is_invocation_error() -> anyhow::Result<()> {
      let _guard = SPAWN.lock().unwrap_or_else(|e| e.into_inner());
      let dir = tempfile::tempdir()?;
      let target = Target::resolve(&dir.path().join("fsm_test").to_string_lossy());
      let mut runner = ProcessRunner::new(target)?;
      let err = runner.run_case("constructor").unwrap_err();
      assert!(matches!(err, GradeError::Invocation { .. }));
      assert_eq!(err.exit_code(), 3);
      Ok(())
    }
  }
}
