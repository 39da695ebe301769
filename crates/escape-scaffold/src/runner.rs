//! Shell command execution

use std::io;
use std::path::Path;
use std::process::Command;

/// Exit code reported for a process killed by a signal
pub const SIGNALLED: i32 = -1;

/// Runs a shell command line and reports its exit code
pub trait CommandRunner {
    /// Run `command` with `cwd` as working directory
    ///
    /// # Errors
    /// Only when the process cannot be started. A non-zero exit is `Ok`.
    fn run(&mut self, command: &str, cwd: &Path) -> io::Result<i32>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, command: &str, cwd: &Path) -> io::Result<i32> {
        (**self).run(command, cwd)
    }
}

/// Runs commands through the platform shell, sharing this process's stdio
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&mut self, command: &str, cwd: &Path) -> io::Result<i32> {
        tracing::debug!("Running `{}` in {}", command, cwd.display());
        let status = shell(command).current_dir(cwd).status()?;
        Ok(status.code().unwrap_or(SIGNALLED))
    }
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(not(unix))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = ShellRunner;
        assert_eq!(runner.run("true", dir.path()).unwrap(), 0);
        assert_eq!(runner.run("exit 3", dir.path()).unwrap(), 3);
    }

    #[test]
    fn runs_in_cwd() {
        let dir = tempfile::tempdir().unwrap();
        ShellRunner.run("touch marker", dir.path()).unwrap();
        assert!(dir.path().join("marker").is_file());
    }

    #[test]
    fn missing_cwd_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ShellRunner.run("true", &dir.path().join("nope")).is_err());
    }
}
