//! Setup Runner
//!
//! Runs the four bootstrap steps in order with fail-fast semantics:
//! interpreter check, dependency install, secrets scaffold, working
//! directory scaffold. No retries, no rollback; artifacts created
//! before a failing step stay on disk for the operator to inspect.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use thiserror::Error;

use super::env_file;
use super::toolchain::{default_installer, default_interpreter_check, CommandSpec};

/// Minimum interpreter version named in the error message.
const MIN_PYTHON_VERSION: &str = "3.8";

/// Failures that terminate the setup run. Both toolchain variants are
/// operator-recoverable; the process exits 1 either way.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Python {min_version} or newer is required, but `{command}` failed ({reason})")]
    InterpreterMissing {
        command: String,
        reason: String,
        min_version: &'static str,
    },

    #[error("Dependency installation failed: `{command}` ({reason})")]
    InstallFailed { command: String, reason: String },

    #[error("Setup could not write {path}: {source}")]
    Scaffold {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Knobs for the setup runner. Defaults match the production layout;
/// tests point the paths at a temp directory and swap the commands.
#[derive(Clone, Debug)]
pub struct SetupOptions {
    pub interpreter_check: CommandSpec,
    pub installer: CommandSpec,
    pub env_path: PathBuf,
    pub incoming_dir: PathBuf,
}

impl Default for SetupOptions {
    fn default() -> Self {
        SetupOptions {
            interpreter_check: default_interpreter_check(),
            installer: default_installer(),
            env_path: PathBuf::from(crate::config::ENV_FILE),
            incoming_dir: PathBuf::from(crate::config::INCOMING_DIR),
        }
    }
}

/// What the run actually did, for the summary and for tests.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SetupReport {
    /// `.env` was written this run.
    pub env_created: bool,
    /// `.env` already existed and was left untouched.
    pub env_preserved: bool,
    /// The working directory was created this run.
    pub dir_created: bool,
}

/// Run the four setup steps in order. Returns at the first failure.
pub fn run_setup(options: &SetupOptions) -> Result<SetupReport, SetupError> {
    let mut report = SetupReport::default();

    // ---- 1. Interpreter check -----------------------------------------------
    println!("{}", "  [1/4] Checking Python interpreter...".cyan());
    options
        .interpreter_check
        .run()
        .map_err(|reason| SetupError::InterpreterMissing {
            command: options.interpreter_check.display(),
            reason,
            min_version: MIN_PYTHON_VERSION,
        })?;
    println!("{}", "  Interpreter found.".green());

    // ---- 2. Dependency installation -----------------------------------------
    println!("{}", "  [2/4] Installing dependencies...".cyan());
    options
        .installer
        .run()
        .map_err(|reason| SetupError::InstallFailed {
            command: options.installer.display(),
            reason,
        })?;
    println!("{}", "  Dependencies installed.".green());

    // ---- 3. Secrets scaffold ------------------------------------------------
    println!("{}", "  [3/4] Scaffolding credentials file...".cyan());
    if options.env_path.exists() {
        report.env_preserved = true;
        println!(
            "{}",
            format!(
                "  {} already exists; keeping it as-is.",
                options.env_path.display()
            )
            .yellow()
        );
    } else {
        env_file::write_template(&options.env_path).map_err(|source| SetupError::Scaffold {
            path: options.env_path.display().to_string(),
            source,
        })?;
        report.env_created = true;
        println!(
            "{}",
            format!("  {} written with placeholder values.", options.env_path.display()).green()
        );
    }

    // ---- 4. Directory scaffold ----------------------------------------------
    println!("{}", "  [4/4] Creating working directory...".cyan());
    if options.incoming_dir.exists() {
        println!(
            "{}",
            format!("  {}/ already exists.", options.incoming_dir.display()).dimmed()
        );
    } else {
        fs::create_dir_all(&options.incoming_dir).map_err(|source| SetupError::Scaffold {
            path: options.incoming_dir.display().to_string(),
            source,
        })?;
        report.dir_created = true;
        println!(
            "{}",
            format!("  {}/ created.", options.incoming_dir.display()).green()
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_options(dir: &std::path::Path) -> SetupOptions {
        SetupOptions {
            interpreter_check: CommandSpec::new("true", &[]),
            installer: CommandSpec::new("true", &[]),
            env_path: dir.join(".env"),
            incoming_dir: dir.join("incoming_pdfs"),
        }
    }

    #[test]
    fn test_fresh_run_creates_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());

        let report = run_setup(&options).unwrap();
        assert!(report.env_created);
        assert!(!report.env_preserved);
        assert!(report.dir_created);
        assert!(options.env_path.exists());
        assert!(options.incoming_dir.is_dir());
    }

    #[test]
    fn test_env_file_written_with_expected_keys() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());
        run_setup(&options).unwrap();

        let body = fs::read_to_string(&options.env_path).unwrap();
        let pairs = crate::config::parse_env_lines(&body);
        assert_eq!(pairs.len(), 3);
        for key in env_file::ENV_KEYS {
            assert!(pairs.contains_key(key), "missing key {}", key);
        }
    }

    #[test]
    fn test_second_run_never_modifies_env() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());

        run_setup(&options).unwrap();
        fs::write(&options.env_path, "GEMINI_API_KEY=real-key\n").unwrap();

        let report = run_setup(&options).unwrap();
        assert!(report.env_preserved);
        assert!(!report.env_created);
        assert_eq!(
            fs::read_to_string(&options.env_path).unwrap(),
            "GEMINI_API_KEY=real-key\n"
        );
    }

    #[test]
    fn test_interpreter_failure_stops_before_install() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = test_options(dir.path());
        options.interpreter_check = CommandSpec::new("false", &[]);
        // An installer that would leave a marker if it ran.
        let marker = dir.path().join("installer-ran");
        options.installer = CommandSpec::new("touch", &[marker.to_str().unwrap()]);

        let err = run_setup(&options).unwrap_err();
        assert!(matches!(err, SetupError::InterpreterMissing { .. }));
        assert!(err.to_string().contains("3.8"));
        assert!(!marker.exists(), "installer ran after interpreter failure");
        assert!(!options.env_path.exists());
        assert!(!options.incoming_dir.exists());
    }

    #[test]
    fn test_install_failure_stops_before_scaffolds() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = test_options(dir.path());
        options.installer = CommandSpec::new("false", &[]);

        let err = run_setup(&options).unwrap_err();
        assert!(matches!(err, SetupError::InstallFailed { .. }));
        assert!(!options.env_path.exists());
        assert!(!options.incoming_dir.exists());
    }

    #[test]
    fn test_existing_incoming_dir_contents_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let options = test_options(dir.path());

        fs::create_dir_all(&options.incoming_dir).unwrap();
        let existing = options.incoming_dir.join("statement.pdf");
        fs::write(&existing, b"pdf bytes").unwrap();

        let report = run_setup(&options).unwrap();
        assert!(!report.dir_created);
        assert_eq!(fs::read(&existing).unwrap(), b"pdf bytes");
    }

    #[test]
    fn test_missing_interpreter_binary_is_interpreter_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = test_options(dir.path());
        options.interpreter_check = CommandSpec::new("no-such-python-binary", &[]);

        let err = run_setup(&options).unwrap_err();
        assert!(matches!(err, SetupError::InterpreterMissing { .. }));
    }
}
