//! Write attempts and the retry loop around them

use crate::error::{JsonFileError, Result};
use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Destination for encoded file contents
///
/// Each call must write `contents` in full, replacing whatever was at `path`.
/// A failed call may be repeated by [`write_retrying`].
pub trait ContentSink {
    /// Replace the file at `path` with `contents`
    fn write_all(&mut self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

impl<S: ContentSink + ?Sized> ContentSink for &mut S {
    fn write_all(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        (**self).write_all(path, contents)
    }
}

/// Writes to a temporary sibling, then renames it over the target
///
/// Readers see either the old file or the new one, never a prefix.
/// A symlinked target is written through: the link stays and the file it
/// points at is replaced. Permissions of an existing target are carried
/// over; new files get `0o666` less the process umask.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomicFileSink;

impl ContentSink for AtomicFileSink {
    fn write_all(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let target = resolve_target(path)?;
        let dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let existing = fs::metadata(&target).ok().map(|meta| meta.permissions());
        let mut builder = tempfile::Builder::new();
        builder.prefix(".escape-json").suffix(".tmp");
        if existing.is_none() {
            new_file_permissions(&mut builder);
        }

        let mut tmp = builder.tempfile_in(dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        if let Some(permissions) = existing {
            tmp.as_file().set_permissions(permissions)?;
        }

        tmp.persist(&target).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Follow `path` to the file a write should replace
fn resolve_target(path: &Path) -> io::Result<Cow<'_, Path>> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => match fs::canonicalize(path) {
            Ok(target) => Ok(Cow::Owned(target)),
            // dangling: create the file the link names
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let link = fs::read_link(path)?;
                let base = path.parent().unwrap_or_else(|| Path::new(""));
                Ok(Cow::Owned(base.join(link)))
            }
            Err(e) => Err(e),
        },
        _ => Ok(Cow::Borrowed(path)),
    }
}

// The mode is applied at creation, so the umask still masks it.
#[cfg(unix)]
fn new_file_permissions(builder: &mut tempfile::Builder<'_, '_>) {
    use std::os::unix::fs::PermissionsExt;
    builder.permissions(fs::Permissions::from_mode(0o666));
}

#[cfg(not(unix))]
fn new_file_permissions(_builder: &mut tempfile::Builder<'_, '_>) {}

/// Bounded fixed-delay retry for writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Pause between consecutive attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Attempts made by [`JsonFile::write`](crate::JsonFile::write)
    pub const WRITE_ATTEMPTS: u32 = 3;

    /// Pause used by [`JsonFile::write`](crate::JsonFile::write)
    pub const WRITE_DELAY: Duration = Duration::from_millis(500);

    /// Single attempt, no pause
    #[inline]
    #[must_use]
    pub const fn once() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Longest time the policy can spend sleeping
    #[inline]
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        self.delay * self.attempts.saturating_sub(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: Self::WRITE_ATTEMPTS,
            delay: Self::WRITE_DELAY,
        }
    }
}

/// Write `contents` through `sink`, retrying per `policy`
///
/// # Errors
/// Returns [`JsonFileError::Write`] carrying the error of the last attempt
/// once every attempt has failed.
pub fn write_retrying<S>(sink: &mut S, path: &Path, contents: &[u8], policy: RetryPolicy) -> Result<()>
where
    S: ContentSink + ?Sized,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match sink.write_all(path, contents) {
            Ok(()) => return Ok(()),
            Err(source) if attempt < attempts => {
                tracing::warn!(
                    "Write of {} failed (attempt {}/{}): {}",
                    path.display(),
                    attempt,
                    attempts,
                    source
                );
                thread::sleep(policy.delay);
                attempt += 1;
            }
            Err(source) => {
                tracing::error!(
                    "Giving up on {} after {} attempts: {}",
                    path.display(),
                    attempts,
                    source
                );
                return Err(JsonFileError::write(path, source));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing {
        calls: u32,
    }

    impl ContentSink for Failing {
        fn write_all(&mut self, _path: &Path, _contents: &[u8]) -> io::Result<()> {
            self.calls += 1;
            Err(io::Error::new(io::ErrorKind::Other, format!("failure {}", self.calls)))
        }
    }

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.delay, Duration::from_millis(500));
        assert_eq!(policy.max_wait(), Duration::from_secs(1));
    }

    #[test]
    fn once_policy_makes_a_single_attempt() {
        let policy = RetryPolicy::once();
        assert_eq!(policy.max_wait(), Duration::ZERO);

        let mut sink = Failing { calls: 0 };
        assert!(write_retrying(&mut sink, Path::new("x.json"), b"{}", policy).is_err());
        assert_eq!(sink.calls, 1);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let mut sink = Failing { calls: 0 };
        let policy = RetryPolicy {
            attempts: 0,
            delay: Duration::ZERO,
        };
        let err = write_retrying(&mut sink, Path::new("x.json"), b"{}", policy).unwrap_err();
        assert_eq!(sink.calls, 1);
        assert!(err.to_string().contains("failure 1"));
    }

    #[test]
    fn surfaces_last_error() {
        let mut sink = Failing { calls: 0 };
        let policy = RetryPolicy {
            attempts: 4,
            delay: Duration::ZERO,
        };
        let err = write_retrying(&mut sink, Path::new("x.json"), b"{}", policy).unwrap_err();
        assert_eq!(sink.calls, 4);
        let JsonFileError::Write { source, .. } = err else {
            panic!("expected write error");
        };
        assert_eq!(source.to_string(), "failure 4");
    }

    #[test]
    fn atomic_sink_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, "a much longer previous body").unwrap();

        AtomicFileSink.write_all(&path, b"{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn atomic_sink_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        AtomicFileSink.write_all(&path, b"[]").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn new_files_follow_the_umask() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        // std creates files with 0o666 masked by the umask
        let reference = dir.path().join("reference");
        std::fs::write(&reference, "").unwrap();
        let expected = std::fs::metadata(&reference).unwrap().permissions().mode() & 0o777;

        let path = dir.path().join("a.json");
        AtomicFileSink.write_all(&path, b"{}").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, expected);
    }

    #[cfg(unix)]
    #[test]
    fn writes_through_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.json");
        let link = dir.path().join("composer.json");
        std::fs::write(&real, "{}").unwrap();
        std::os::unix::fs::symlink("real.json", &link).unwrap();

        AtomicFileSink.write_all(&link, br#"{"a":1}"#).unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&real).unwrap(), r#"{"a":1}"#);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_creates_its_target() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("composer.json");
        std::os::unix::fs::symlink("real.json", &link).unwrap();

        AtomicFileSink.write_all(&link, b"[]").unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(dir.path().join("real.json")).unwrap(), "[]");
    }
}
