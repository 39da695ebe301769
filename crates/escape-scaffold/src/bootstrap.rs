//! Sequential execution of bootstrap plans
//!
//! Steps run one after another in the plan root. The first failure stops the
//! run; nothing already done is rolled back.

use crate::error::{Result, ScaffoldError};
use crate::plan::{Action, BootstrapPlan, Step};
use crate::runner::CommandRunner;
use escape_json::{JsonFile, SchemaMode};
use std::path::Path;

/// Executes plans through a [`CommandRunner`]
#[derive(Debug, Clone, Default)]
pub struct Bootstrapper<R> {
    runner: R,
}

impl<R: CommandRunner> Bootstrapper<R> {
    /// Create with the given runner
    #[inline]
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Borrow the runner
    #[inline]
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Take the runner back
    #[inline]
    #[must_use]
    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Run every step of `plan` in order
    ///
    /// Returns the steps that completed, which is all of them on success.
    ///
    /// # Errors
    /// - [`ScaffoldError::Spawn`] if a command cannot be started
    /// - [`ScaffoldError::StepFailed`] on the first non-zero exit
    /// - [`ScaffoldError::Manifest`] if a manifest fails validation
    pub fn run(&mut self, plan: &BootstrapPlan) -> Result<Vec<Step>> {
        let mut done = Vec::with_capacity(plan.len());
        for step in plan.steps() {
            self.execute(step, plan.root())?;
            done.push(step.clone());
        }
        Ok(done)
    }

    /// Run a single step in `cwd`
    ///
    /// # Errors
    /// Same as [`run`](Self::run).
    pub fn execute(&mut self, step: &Step, cwd: &Path) -> Result<()> {
        tracing::info!(" -> {}...", step.label);
        match &step.action {
            Action::Shell(command) => {
                let code = self
                    .runner
                    .run(command, cwd)
                    .map_err(|source| ScaffoldError::Spawn {
                        command: command.clone(),
                        source,
                    })?;
                if code != 0 {
                    tracing::error!("`{}` exited with code {}", command, code);
                    return Err(ScaffoldError::StepFailed {
                        step: command.clone(),
                        code,
                    });
                }
            }
            Action::ValidateManifest(path) => {
                JsonFile::new(cwd.join(path)).validate_schema(SchemaMode::Lax)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[derive(Default)]
    struct Scripted {
        calls: Vec<(String, PathBuf)>,
        fail_on: Option<(&'static str, i32)>,
    }

    impl CommandRunner for Scripted {
        fn run(&mut self, command: &str, cwd: &Path) -> io::Result<i32> {
            self.calls.push((command.to_string(), cwd.to_path_buf()));
            match self.fail_on {
                Some((c, code)) if c == command => Ok(code),
                _ => Ok(0),
            }
        }
    }

    fn plan(root: &Path) -> BootstrapPlan {
        BootstrapPlan::from_steps(
            root,
            vec![
                Step::shell("one", "npm install"),
                Step::shell("two", "composer install"),
                Step::shell("three", "git init"),
            ],
        )
    }

    #[test]
    fn runs_all_in_order() {
        let root = PathBuf::from("/srv/app");
        let mut boot = Bootstrapper::new(Scripted::default());
        let done = boot.run(&plan(&root)).unwrap();
        assert_eq!(done.len(), 3);

        let calls = &boot.runner().calls;
        assert_eq!(calls[0], ("npm install".to_string(), root.clone()));
        assert_eq!(calls[2].0, "git init");
    }

    #[test]
    fn stops_at_first_failure() {
        let mut boot = Bootstrapper::new(Scripted {
            fail_on: Some(("composer install", 1)),
            ..Scripted::default()
        });
        let err = boot.run(&plan(Path::new("/srv/app"))).unwrap_err();
        assert_eq!(err.exit_code(), Some(1));
        assert_eq!(boot.into_runner().calls.len(), 2);
    }

    #[test]
    fn manifest_is_validated_relative_to_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("composer.json"), r#"{"require": {"php": 5}}"#).unwrap();

        let mut boot = Bootstrapper::new(Scripted::default());
        let step = Step::validate("check", "composer.json");
        let err = boot.execute(&step, dir.path()).unwrap_err();
        let ScaffoldError::Manifest(inner) = err else {
            panic!("expected manifest error");
        };
        assert_eq!(inner.violations().len(), 1);
        assert!(boot.runner().calls.is_empty());
    }
}
