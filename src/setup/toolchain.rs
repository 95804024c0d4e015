//! Toolchain Checks
//!
//! Subprocess probes used by the setup runner: the interpreter version
//! check and the dependency install. Both commands are plain data so
//! tests can substitute harmless stand-ins.

use std::process::{Command, Stdio};

/// A subprocess invocation: program plus arguments.
#[derive(Clone, Debug)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        CommandSpec {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// The invocation rendered for error messages, e.g. `python3 --version`.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// Run the command to completion, inheriting stdout/stderr so the
    /// operator sees installer output. Returns `Err` with a short reason
    /// when the command cannot be spawned or exits nonzero.
    pub fn run(&self) -> Result<(), String> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| format!("could not run: {}", e))?;

        if status.success() {
            Ok(())
        } else {
            match status.code() {
                Some(code) => Err(format!("exited with status {}", code)),
                None => Err("terminated by signal".to_string()),
            }
        }
    }
}

/// Default interpreter version probe.
pub fn default_interpreter_check() -> CommandSpec {
    CommandSpec::new("python3", &["--version"])
}

/// Default dependency install against the requirements manifest.
pub fn default_installer() -> CommandSpec {
    CommandSpec::new("pip3", &["install", "-r", "requirements.txt"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_success() {
        assert!(CommandSpec::new("true", &[]).run().is_ok());
    }

    #[test]
    fn test_run_nonzero_exit() {
        let err = CommandSpec::new("false", &[]).run().unwrap_err();
        assert!(err.contains("status 1"), "unexpected reason: {}", err);
    }

    #[test]
    fn test_run_missing_program() {
        let err = CommandSpec::new("definitely-not-a-real-binary-42", &[])
            .run()
            .unwrap_err();
        assert!(err.contains("could not run"), "unexpected reason: {}", err);
    }

    #[test]
    fn test_display_joins_args() {
        let spec = default_installer();
        assert_eq!(spec.display(), "pip3 install -r requirements.txt");
    }
}
