//! Requirements refresh - pin the dependency closure of a packaging tool.
//!
//! Flow (any failing step aborts the run):
//! 1. read the pinned version from the version file
//! 2. create a throwaway virtualenv in a temp dir
//! 3. `pip install <package>==<version>` into it
//! 4. write header + `pip freeze` output to the requirements file

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::ports::{CommandError, CommandRunner};

/// Fixed header written above the frozen requirements.
pub const HEADER: [&str; 3] = [
    "# Generated by `berth refresh-requirements`.",
    "# Re-run that command to refresh the pinned versions.",
    "# DO NOT EDIT MANUALLY.",
];

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("failed to read pinned version from {path}: {source}")]
    ReadVersion {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pinned version file {0} is empty")]
    EmptyVersion(PathBuf),

    #[error("failed to create a temporary environment: {0}")]
    TempDir(#[source] std::io::Error),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("freeze output contained no pinned packages")]
    EmptyFreeze,

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Inputs of one refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSettings {
    /// Package whose version is pinned, e.g. `pex`.
    pub package: String,
    pub version_file: PathBuf,
    pub output: PathBuf,
    /// Interpreter used to create the virtualenv.
    pub python: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub version: String,
    pub pinned: usize,
    pub output: PathBuf,
}

/// Read and trim the version string stored in `path`.
pub async fn read_pinned_version(path: &Path) -> Result<String, RefreshError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RefreshError::ReadVersion {
            path: path.to_path_buf(),
            source,
        })?;
    let version = raw.trim();
    if version.is_empty() {
        return Err(RefreshError::EmptyVersion(path.to_path_buf()));
    }
    Ok(version.to_string())
}

fn is_pinned(line: &str) -> bool {
    match line.split_once("==") {
        Some((name, version)) => {
            !name.trim().is_empty() && !version.trim().is_empty() && !line.contains(' ')
        }
        None => false,
    }
}

/// Replace `path` with `contents` via a sibling temp file and a rename, so
/// readers see either the old file or the complete new one.
fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Header followed by the `name==version` lines of `freeze`.
///
/// Blank lines and comments are dropped; other unpinned lines (editable
/// installs, direct URLs) are skipped with a warning.
pub fn render_requirements(freeze: &str) -> Result<String, RefreshError> {
    let mut pinned = Vec::new();
    for line in freeze.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if is_pinned(line) {
            pinned.push(line);
        } else {
            warn!(line, "skipping unpinned freeze line");
        }
    }
    if pinned.is_empty() {
        return Err(RefreshError::EmptyFreeze);
    }

    let mut out = String::new();
    for line in HEADER.iter().chain(pinned.iter()) {
        out.push_str(line);
        out.push('\n');
    }
    Ok(out)
}

pub struct RequirementsRefresh<R> {
    runner: R,
    settings: RefreshSettings,
}

impl<R: CommandRunner> RequirementsRefresh<R> {
    pub fn new(runner: R, settings: RefreshSettings) -> Self {
        Self { runner, settings }
    }

    pub async fn run(&self) -> Result<RefreshReport, RefreshError> {
        let settings = &self.settings;
        let version = read_pinned_version(&settings.version_file).await?;
        info!(package = %settings.package, %version, "refreshing requirements");

        // Removed on drop, including on early return.
        let env_dir = tempfile::Builder::new()
            .prefix("berth-requirements-")
            .tempdir()
            .map_err(RefreshError::TempDir)?;
        let env_path = env_dir.path().to_string_lossy().into_owned();
        let pip = env_dir.path().join("bin").join("pip");
        let pip = pip.to_string_lossy();

        self.runner
            .run(
                &settings.python,
                &["-m".to_string(), "venv".to_string(), env_path],
            )
            .await?;
        info!("virtualenv created");

        self.runner
            .run(
                &pip,
                &[
                    "install".to_string(),
                    format!("{}=={}", settings.package, version),
                ],
            )
            .await?;
        info!(package = %settings.package, %version, "installed");

        let freeze = self.runner.run(&pip, &["freeze".to_string()]).await?;
        let contents = render_requirements(&freeze)?;
        let pinned = contents.lines().count() - HEADER.len();

        let output = settings.output.clone();
        tokio::task::spawn_blocking(move || write_atomically(&output, &contents))
            .await
            .map_err(std::io::Error::other)
            .and_then(|written| written)
            .map_err(|source| RefreshError::Write {
                path: settings.output.clone(),
                source,
            })?;
        info!(output = %settings.output.display(), pinned, "requirements written");

        Ok(RefreshReport {
            version,
            pinned,
            output: settings.output.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    const FREEZE: &str = "pex==2.1.137\nsetuptools==69.0.3\n\nwheel==0.42.0\n";

    /// Records invocations and answers `freeze` with canned output.
    struct FakeRunner {
        calls: Mutex<Vec<(String, Vec<String>)>>,
        freeze: String,
        fail_on: Option<&'static str>,
    }

    impl FakeRunner {
        fn new(freeze: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                freeze: freeze.to_string(),
                fail_on: None,
            }
        }

        fn failing_on(mut self, arg: &'static str) -> Self {
            self.fail_on = Some(arg);
            self
        }

        fn calls(&self) -> Vec<(String, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            if let Some(arg) = self.fail_on
                && args.first().map(String::as_str) == Some(arg)
            {
                return Err(CommandError::Failed {
                    program: program.to_string(),
                    status: Some(1),
                    stderr: "boom".to_string(),
                });
            }
            if args.first().map(String::as_str) == Some("freeze") {
                return Ok(self.freeze.clone());
            }
            Ok(String::new())
        }
    }

    fn settings(dir: &Path) -> RefreshSettings {
        RefreshSettings {
            package: "pex".to_string(),
            version_file: dir.join("pex_version"),
            output: dir.join("requirements.txt"),
            python: "python3".to_string(),
        }
    }

    #[test]
    fn render_puts_header_first() {
        let rendered = render_requirements(FREEZE).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(&lines[..3], &HEADER[..]);
        assert_eq!(
            &lines[3..],
            &["pex==2.1.137", "setuptools==69.0.3", "wheel==0.42.0"]
        );
    }

    #[test]
    fn render_skips_unpinned_lines() {
        let freeze = concat!(
            "-e git+https://example.com/repo.git#egg=tool\n",
            "foo @ file:///tmp/foo\n",
            "bar==1.0\n",
        );
        let rendered = render_requirements(freeze).unwrap();
        assert_eq!(rendered.lines().skip(3).collect::<Vec<_>>(), vec!["bar==1.0"]);
    }

    #[test]
    fn render_rejects_empty_freeze() {
        assert!(matches!(
            render_requirements("\n# nothing\n"),
            Err(RefreshError::EmptyFreeze)
        ));
    }

    #[tokio::test]
    async fn version_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pex_version");
        std::fs::write(&path, "  2.1.137\n").unwrap();
        assert_eq!(read_pinned_version(&path).await.unwrap(), "2.1.137");
    }

    #[tokio::test]
    async fn empty_version_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pex_version");
        std::fs::write(&path, "\n").unwrap();
        assert!(matches!(
            read_pinned_version(&path).await,
            Err(RefreshError::EmptyVersion(_))
        ));
    }

    #[tokio::test]
    async fn run_installs_pinned_version_and_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pex_version"), "2.1.137\n").unwrap();
        let refresh = RequirementsRefresh::new(FakeRunner::new(FREEZE), settings(dir.path()));

        let report = refresh.run().await.unwrap();

        assert_eq!(report.version, "2.1.137");
        assert_eq!(report.pinned, 3);
        let written = std::fs::read_to_string(dir.path().join("requirements.txt")).unwrap();
        assert_eq!(written, render_requirements(FREEZE).unwrap());

        let calls = refresh.runner.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].0, "python3");
        assert_eq!(&calls[0].1[..2], &["-m", "venv"]);
        assert!(calls[1].0.ends_with("bin/pip"));
        assert_eq!(calls[1].1, vec!["install", "pex==2.1.137"]);
        assert_eq!(calls[2].1, vec!["freeze"]);
    }

    #[tokio::test]
    async fn rerun_keeps_the_same_structure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pex_version"), "2.1.137").unwrap();
        let refresh = RequirementsRefresh::new(FakeRunner::new(FREEZE), settings(dir.path()));

        refresh.run().await.unwrap();
        let first = std::fs::read_to_string(dir.path().join("requirements.txt")).unwrap();
        refresh.run().await.unwrap();
        let second = std::fs::read_to_string(dir.path().join("requirements.txt")).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn failed_install_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pex_version"), "2.1.137").unwrap();
        let refresh = RequirementsRefresh::new(
            FakeRunner::new(FREEZE).failing_on("install"),
            settings(dir.path()),
        );

        let err = refresh.run().await.unwrap_err();

        assert!(matches!(
            err,
            RefreshError::Command(CommandError::Failed { .. })
        ));
        assert!(!dir.path().join("requirements.txt").exists());
        assert_eq!(refresh.runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn write_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pex_version"), "2.1.137").unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "stale\n").unwrap();
        let refresh = RequirementsRefresh::new(FakeRunner::new(FREEZE), settings(dir.path()));

        refresh.run().await.unwrap();

        let mut entries: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        entries.sort();
        assert_eq!(entries, vec!["pex_version", "requirements.txt"]);
        let written = std::fs::read_to_string(dir.path().join("requirements.txt")).unwrap();
        assert!(written.starts_with(HEADER[0]));
    }

    #[tokio::test]
    async fn unwritable_output_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pex_version"), "2.1.137").unwrap();
        let mut settings = settings(dir.path());
        settings.output = dir.path().join("missing-dir").join("requirements.txt");
        let refresh = RequirementsRefresh::new(FakeRunner::new(FREEZE), settings);

        let err = refresh.run().await.unwrap_err();

        assert!(matches!(err, RefreshError::Write { .. }));
        assert!(!dir.path().join("missing-dir").exists());
    }

    #[tokio::test]
    async fn missing_version_file_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let refresh = RequirementsRefresh::new(FakeRunner::new(FREEZE), settings(dir.path()));

        let err = refresh.run().await.unwrap_err();

        assert!(matches!(err, RefreshError::ReadVersion { .. }));
        assert!(refresh.runner.calls().is_empty());
    }
}
