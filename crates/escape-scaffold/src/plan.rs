//! Bootstrap planning from marker files
//!
//! A freshly cloned project announces what it needs through the files it
//! contains: `package.json` wants npm, `composer.json` wants composer, a
//! `storage/` directory wants to be writable, and so on. Detection only looks
//! at the filesystem; nothing runs until the plan is handed to a
//! [`Bootstrapper`](crate::Bootstrapper).

use crate::config::ScaffoldConfig;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// Which command the plan is for; they look for different markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// Existing team project
    Clone,
    /// New application from a boilerplate
    AppInstall,
}

/// What a step does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Shell command run in the project root
    Shell(String),
    /// Lax schema check of a JSON manifest
    ValidateManifest(PathBuf),
}

/// One unit of bootstrap work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Progress message shown before the step runs
    pub label: String,
    /// Work to perform
    pub action: Action,
}

impl Step {
    /// Shell command step
    #[must_use]
    pub fn shell(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: Action::Shell(command.into()),
        }
    }

    /// Manifest validation step
    #[must_use]
    pub fn validate(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            action: Action::ValidateManifest(path.into()),
        }
    }

    /// Shell command, if this is a shell step
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match &self.action {
            Action::Shell(command) => Some(command),
            Action::ValidateManifest(_) => None,
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.action {
            Action::Shell(command) => write!(f, "{}", command),
            Action::ValidateManifest(path) => write!(f, "validate {}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Marker {
    File(&'static str),
    Dir(&'static str),
}

impl Marker {
    fn present(self, root: &Path) -> bool {
        match self {
            Self::File(name) => root.join(name).is_file(),
            Self::Dir(name) => root.join(name).is_dir(),
        }
    }
}

type StepsFn = fn(&ScaffoldConfig, &Path) -> Vec<Step>;

const CLONE_RULES: &[(Marker, StepsFn)] = &[
    (Marker::File("package.json"), npm_steps),
    (Marker::File("bower.json"), bower_steps),
    (Marker::File("composer.json"), composer_steps),
    (Marker::Dir("storage"), storage_steps),
    (Marker::Dir("app/storage"), app_storage_steps),
    (Marker::File(".env.example"), env_steps),
];

const APP_INSTALL_RULES: &[(Marker, StepsFn)] = &[
    (Marker::File("package.json"), npm_steps),
    (Marker::File("composer.json"), composer_steps),
    (Marker::File("artisan"), artisan_steps),
    (Marker::Dir(".git"), git_steps),
    (Marker::Dir("storage"), storage_steps),
];

fn npm_steps(config: &ScaffoldConfig, _root: &Path) -> Vec<Step> {
    let command = if config.sudo { "sudo npm install" } else { "npm install" };
    vec![Step::shell("Installing npm dependencies", command)]
}

fn bower_steps(_config: &ScaffoldConfig, _root: &Path) -> Vec<Step> {
    vec![Step::shell("Installing bower dependencies", "bower install")]
}

fn composer_steps(_config: &ScaffoldConfig, root: &Path) -> Vec<Step> {
    vec![
        Step::validate("Checking composer.json", root.join("composer.json")),
        Step::shell("Installing composer dependencies", "composer install"),
    ]
}

fn artisan_steps(_config: &ScaffoldConfig, _root: &Path) -> Vec<Step> {
    vec![Step::shell("Generating laravel key", "php artisan key:generate")]
}

fn git_steps(_config: &ScaffoldConfig, _root: &Path) -> Vec<Step> {
    vec![
        Step::shell("Removing .git directory", "rm -rf .git"),
        Step::shell("Initializing a new .git directory", "git init"),
    ]
}

fn storage_steps(_config: &ScaffoldConfig, _root: &Path) -> Vec<Step> {
    vec![Step::shell("Making storage writable", "chmod -R 777 storage")]
}

fn app_storage_steps(_config: &ScaffoldConfig, _root: &Path) -> Vec<Step> {
    vec![Step::shell("Making app/storage writable", "chmod -R 777 app/storage")]
}

fn env_steps(_config: &ScaffoldConfig, _root: &Path) -> Vec<Step> {
    vec![Step::shell("Creating the .env file", "cp .env.example .env")]
}

/// Ordered steps for one project directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPlan {
    root: PathBuf,
    steps: Vec<Step>,
}

impl BootstrapPlan {
    /// Inspect `root` and build the plan for `profile`
    #[must_use]
    pub fn detect(root: &Path, profile: Profile, config: &ScaffoldConfig) -> Self {
        let rules = match profile {
            Profile::Clone => CLONE_RULES,
            Profile::AppInstall => APP_INSTALL_RULES,
        };

        let steps: Vec<Step> = rules
            .iter()
            .filter(|(marker, _)| marker.present(root))
            .flat_map(|(_, steps)| steps(config, root))
            .collect();

        tracing::debug!(
            "Planned {} bootstrap step(s) for {} ({:?})",
            steps.len(),
            root.display(),
            profile
        );
        Self {
            root: root.to_path_buf(),
            steps,
        }
    }

    /// Plan with explicit steps
    #[must_use]
    pub fn from_steps(root: impl Into<PathBuf>, steps: Vec<Step>) -> Self {
        Self {
            root: root.into(),
            steps,
        }
    }

    /// Directory the steps run in
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Steps in execution order
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there is nothing to do
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Shell commands in order, skipping non-shell steps
    #[must_use]
    pub fn commands(&self) -> Vec<&str> {
        self.steps.iter().filter_map(Step::command).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project(files: &[&str], dirs: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for d in dirs {
            fs::create_dir_all(dir.path().join(d)).unwrap();
        }
        for f in files {
            fs::write(dir.path().join(f), "{}").unwrap();
        }
        dir
    }

    #[test]
    fn empty_project_has_no_steps() {
        let dir = project(&[], &[]);
        let plan = BootstrapPlan::detect(dir.path(), Profile::Clone, &ScaffoldConfig::new());
        assert!(plan.is_empty());
    }

    #[test]
    fn clone_order() {
        let dir = project(
            &["package.json", "bower.json", "composer.json", ".env.example", "artisan"],
            &["storage", "app/storage", ".git"],
        );
        let plan = BootstrapPlan::detect(dir.path(), Profile::Clone, &ScaffoldConfig::new());
        assert_eq!(
            plan.commands(),
            [
                "npm install",
                "bower install",
                "composer install",
                "chmod -R 777 storage",
                "chmod -R 777 app/storage",
                "cp .env.example .env",
            ]
        );
        assert_eq!(
            plan.steps()[2].action,
            Action::ValidateManifest(dir.path().join("composer.json"))
        );
    }

    #[test]
    fn app_install_order() {
        let dir = project(
            &["package.json", "bower.json", "composer.json", "artisan"],
            &["storage", ".git"],
        );
        let config = ScaffoldConfig::new().with_sudo(true);
        let plan = BootstrapPlan::detect(dir.path(), Profile::AppInstall, &config);
        assert_eq!(
            plan.commands(),
            [
                "sudo npm install",
                "composer install",
                "php artisan key:generate",
                "rm -rf .git",
                "git init",
                "chmod -R 777 storage",
            ]
        );
    }

    #[test]
    fn markers_check_kind() {
        // a directory named package.json is not a manifest
        let dir = project(&["storage"], &["package.json"]);
        let plan = BootstrapPlan::detect(dir.path(), Profile::Clone, &ScaffoldConfig::new());
        assert!(plan.is_empty());
    }

    #[test]
    fn step_display() {
        assert_eq!(Step::shell("x", "git init").to_string(), "git init");
        assert_eq!(
            Step::validate("x", "a/composer.json").to_string(),
            "validate a/composer.json"
        );
    }
}
