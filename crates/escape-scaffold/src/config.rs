//! Scaffolding configuration
//!
//! Defaults reproduce the built-in team aliases and boilerplate repositories.
//! A config file may override any subset of fields; missing fields keep
//! their defaults.

use crate::error::{Result, ScaffoldError};
use crate::project::Boilerplate;
use escape_json::{EncodeOptions, JsonFile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const GIST: &str = "https://gist.githubusercontent.com/luisdalmolin/b90f23bb0fc068c6e805/raw";

/// Settings shared by clone and app-install runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScaffoldConfig {
    /// Prefix `npm install` with `sudo`
    pub sudo: bool,
    /// Team used when none is given
    pub default_team: String,
    /// Short alias → hosting workspace name
    pub teams: BTreeMap<String, String>,
    /// SSH host prefix for team repositories
    pub clone_host: String,
    /// Clone URL of the Laravel boilerplate
    pub laravel_repo: String,
    /// Clone URL of the static HTML boilerplate
    pub html_repo: String,
    /// Download URL of the `.env` written into new applications
    pub dotenv_url: String,
    /// Download URL of the `readme.md` written into new applications
    pub readme_url: String,
}

impl ScaffoldConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With sudo for npm
    #[inline]
    #[must_use]
    pub fn with_sudo(mut self, sudo: bool) -> Self {
        self.sudo = sudo;
        self
    }

    /// With an extra (or replaced) team alias
    #[must_use]
    pub fn with_team(mut self, alias: impl Into<String>, workspace: impl Into<String>) -> Self {
        self.teams.insert(alias.into(), workspace.into());
        self
    }

    /// With default team
    #[must_use]
    pub fn with_default_team(mut self, team: impl Into<String>) -> Self {
        self.default_team = team.into();
        self
    }

    /// Workspace for `team`; unknown aliases are used verbatim
    #[must_use]
    pub fn resolve_team<'a>(&'a self, team: Option<&'a str>) -> &'a str {
        let team = team.unwrap_or(self.default_team.as_str());
        self.teams.get(team).map_or(team, String::as_str)
    }

    /// SSH clone URL of `repo` under `team`
    #[must_use]
    pub fn team_clone_url(&self, repo: &str, team: Option<&str>) -> String {
        format!("{}:{}/{}.git", self.clone_host, self.resolve_team(team), repo)
    }

    /// Clone URL of a boilerplate
    #[must_use]
    pub fn boilerplate_url(&self, boilerplate: Boilerplate) -> &str {
        match boilerplate {
            Boilerplate::Laravel => &self.laravel_repo,
            Boilerplate::Html => &self.html_repo,
        }
    }

    /// Load from a JSON file
    ///
    /// # Errors
    /// - [`ScaffoldError::Manifest`] if the file cannot be read or decoded
    /// - [`ScaffoldError::Config`] if it decodes to the wrong shape
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = JsonFile::new(path.as_ref());
        let value = file.read()?;
        let config = serde_json::from_value(value).map_err(|source| ScaffoldError::Config {
            path: file.path().to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded scaffold configuration from {}", file.path().display());
        Ok(config)
    }

    /// Save as pretty-printed JSON
    ///
    /// # Errors
    /// Returns [`ScaffoldError::Manifest`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        JsonFile::new(path.as_ref()).write(self, EncodeOptions::default())?;
        Ok(())
    }
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        let teams = [
            ("escape", "escapecria"),
            ("morgan", "morgan-bbb"),
            ("e-lucre", "elucre"),
            ("idea4", "idea4"),
        ]
        .into_iter()
        .map(|(alias, workspace)| (alias.to_string(), workspace.to_string()))
        .collect();

        Self {
            sudo: false,
            default_team: "escapecria".to_string(),
            teams,
            clone_host: "git@bitbucket.org".to_string(),
            laravel_repo: "git@github.com:EscapeWork/LaravelBoilerplate.git".to_string(),
            html_repo: "git@github.com:EscapeWork/html-boilerplate.git".to_string(),
            dotenv_url: format!("{GIST}/.env"),
            readme_url: format!("{GIST}/readme.md"),
        }
    }
}
