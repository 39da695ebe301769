//! Testing utilities for the Escape workspace
//!
//! Shared fixtures: scratch projects, scripted write sinks, scripted runners.

#![allow(missing_docs)]

use escape_json::{AtomicFileSink, ContentSink};
use escape_scaffold::CommandRunner;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Valid manifest under the strict schema
pub fn sample_manifest() -> Value {
    json!({
        "name": "escapework/site",
        "description": "Company site",
        "type": "project",
        "license": "MIT",
        "authors": [{"name": "Escape", "email": "dev@escape.example"}],
        "require": {"php": ">=5.5.9", "laravel/framework": "5.1.*"},
        "require-dev": {},
        "autoload": {"psr-4": {"App\\": "app/"}},
        "scripts": {"post-install-cmd": ["php artisan clear-compiled"]},
        "minimum-stability": "stable"
    })
}

/// Scratch directory populated with marker files
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn with_file(self, rel: &str, contents: &str) -> Self {
        write_file(&self.join(rel), contents);
        self
    }

    pub fn with_dir(self, rel: &str) -> Self {
        fs::create_dir_all(self.join(rel)).unwrap();
        self
    }
}

impl Default for TempProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `contents` to `path`, creating parents
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Sink that fails a fixed number of times, then writes for real
#[derive(Debug, Default)]
pub struct ScriptedSink {
    failures_left: u32,
    attempts: Vec<Instant>,
}

impl ScriptedSink {
    pub fn failing(times: u32) -> Self {
        Self {
            failures_left: times,
            attempts: Vec::new(),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.len()
    }

    /// Time between consecutive attempts
    pub fn gaps(&self) -> Vec<Duration> {
        self.attempts
            .windows(2)
            .map(|w| w[1].duration_since(w[0]))
            .collect()
    }
}

impl ContentSink for ScriptedSink {
    fn write_all(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.attempts.push(Instant::now());
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("transient failure #{}", self.attempts.len()),
            ));
        }
        AtomicFileSink.write_all(path, contents)
    }
}

type Effect = Box<dyn FnMut(&Path)>;

/// Runner that records commands instead of running them
///
/// Exit codes default to 0. Effects let a test simulate what a command
/// would have done, e.g. `git clone` creating the project directory.
#[derive(Default)]
pub struct RecordingRunner {
    pub calls: Vec<(String, PathBuf)>,
    codes: HashMap<String, i32>,
    effects: HashMap<String, Effect>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exit_with(mut self, command: &str, code: i32) -> Self {
        self.codes.insert(command.to_string(), code);
        self
    }

    pub fn on(mut self, command: &str, effect: impl FnMut(&Path) + 'static) -> Self {
        self.effects.insert(command.to_string(), Box::new(effect));
        self
    }

    pub fn commands(&self) -> Vec<&str> {
        self.calls.iter().map(|(c, _)| c.as_str()).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, command: &str, cwd: &Path) -> io::Result<i32> {
        self.calls.push((command.to_string(), cwd.to_path_buf()));
        if let Some(effect) = self.effects.get_mut(command) {
            effect(cwd);
        }
        Ok(self.codes.get(command).copied().unwrap_or(0))
    }
}
