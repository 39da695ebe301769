//! Clone-then-bootstrap workflows

use crate::bootstrap::Bootstrapper;
use crate::config::ScaffoldConfig;
use crate::error::Result;
use crate::plan::{BootstrapPlan, Profile, Step};
use crate::project::{validate_name, verify_target_absent, Boilerplate};
use crate::runner::CommandRunner;
use std::path::{Path, PathBuf};

/// Outcome of a successful scaffold run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldReport {
    /// Project directory that was created
    pub directory: PathBuf,
    /// Every step executed, clone included
    pub steps: Vec<Step>,
}

/// Clones projects and bootstraps them
#[derive(Debug)]
pub struct Scaffolder<R> {
    config: ScaffoldConfig,
    bootstrapper: Bootstrapper<R>,
}

impl<R: CommandRunner> Scaffolder<R> {
    /// Create with configuration and runner
    #[must_use]
    pub fn new(config: ScaffoldConfig, runner: R) -> Self {
        Self {
            config,
            bootstrapper: Bootstrapper::new(runner),
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ScaffoldConfig {
        &self.config
    }

    /// Borrow the runner
    #[inline]
    #[must_use]
    pub fn runner(&self) -> &R {
        self.bootstrapper.runner()
    }

    /// Clone team repository `repo` into `parent/repo` and bootstrap it
    ///
    /// # Errors
    /// - [`ScaffoldError::InvalidName`](crate::ScaffoldError::InvalidName) for unsafe names
    /// - [`ScaffoldError::AlreadyExists`](crate::ScaffoldError::AlreadyExists) if the target is there
    /// - any step failure
    pub fn clone_project(
        &mut self,
        parent: &Path,
        repo: &str,
        team: Option<&str>,
    ) -> Result<ScaffoldReport> {
        validate_name(repo)?;
        if let Some(team) = team {
            validate_name(team)?;
        }

        let url = self.config.team_clone_url(repo, team);
        let clone = Step::shell(
            format!("Cloning repository {repo}"),
            format!("git clone {url} {repo}"),
        );
        self.scaffold(parent, repo, clone, Profile::Clone, &[], &[])
    }

    /// Create application `name` in `parent/name` from a boilerplate
    ///
    /// The `.env` file is fetched before the bootstrap plan runs, so
    /// `php artisan key:generate` has a file to write into; `readme.md` is
    /// fetched last.
    ///
    /// # Errors
    /// Same as [`clone_project`](Self::clone_project).
    pub fn install_app(
        &mut self,
        parent: &Path,
        name: &str,
        boilerplate: Boilerplate,
    ) -> Result<ScaffoldReport> {
        validate_name(name)?;

        let url = self.config.boilerplate_url(boilerplate);
        let clone = Step::shell(
            format!("Cloning the {boilerplate} boilerplate"),
            format!("git clone {url} {name}"),
        );
        let dotenv = Step::shell("Creating the .env file", download(&self.config.dotenv_url, ".env"));
        let readme = Step::shell("Creating readme.md", download(&self.config.readme_url, "readme.md"));
        self.scaffold(parent, name, clone, Profile::AppInstall, &[dotenv], &[readme])
    }

    fn scaffold(
        &mut self,
        parent: &Path,
        name: &str,
        clone: Step,
        profile: Profile,
        before: &[Step],
        after: &[Step],
    ) -> Result<ScaffoldReport> {
        let directory = parent.join(name);
        verify_target_absent(&directory)?;

        tracing::info!("Crafting {}...", directory.display());
        self.bootstrapper.execute(&clone, parent)?;
        let mut steps = vec![clone];

        for step in before {
            self.bootstrapper.execute(step, &directory)?;
            steps.push(step.clone());
        }

        let plan = BootstrapPlan::detect(&directory, profile, &self.config);
        steps.extend(self.bootstrapper.run(&plan)?);

        for step in after {
            self.bootstrapper.execute(step, &directory)?;
            steps.push(step.clone());
        }

        tracing::info!("{} ready ({} steps)", directory.display(), steps.len());
        Ok(ScaffoldReport { directory, steps })
    }
}

/// Shell command saving `url` as `file` in the working directory
fn download(url: &str, file: &str) -> String {
    format!("curl -fsSL {url} -o {file}")
}
