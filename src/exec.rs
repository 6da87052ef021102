//! Process execution primitive
//!
//! Both executors funnel every `git` and `cleartool` call through a
//! [`CommandRunner`], which only runs a program and captures what it printed.

use std::io;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

/// A single command to run
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub program: &'a str,
    pub args: &'a [String],
    pub cwd: &'a Path,
    /// Extra environment variables layered over the inherited environment
    pub env: &'a [(String, String)],
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (-1 when terminated by a signal)
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failed(exit_code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            exit_code,
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Runs external programs and captures their output
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation<'_>) -> io::Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation<'_>) -> io::Result<CommandOutput> {
        let output = Command::new(invocation.program)
            .args(invocation.args)
            .current_dir(invocation.cwd)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Run a command and turn a non-zero exit into [`Error::CommandFailed`]
pub(crate) fn execute(runner: &dyn CommandRunner, invocation: &Invocation<'_>) -> Result<CommandOutput> {
    debug!(
        program = invocation.program,
        cwd = %invocation.cwd.display(),
        "{} {}",
        invocation.program,
        invocation.args.join(" ")
    );

    let output = runner.run(invocation).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::ToolNotFound(invocation.program.to_string())
        } else {
            Error::Io(e)
        }
    })?;

    if output.success() {
        Ok(output)
    } else {
        Err(Error::CommandFailed {
            program: invocation.program.to_string(),
            args: invocation.args.to_vec(),
            exit_code: output.exit_code,
            stdout: output.stdout_text(),
            stderr: output.stderr_text(),
        })
    }
}

/// Run a command whose failure is known to be benign, returning whatever it printed
pub(crate) fn execute_lenient(runner: &dyn CommandRunner, invocation: &Invocation<'_>) -> Result<String> {
    match execute(runner, invocation) {
        Ok(output) => Ok(output.stdout_text()),
        Err(Error::CommandFailed {
            stdout, stderr, ..
        }) => {
            debug!("ignoring failure of {}: {}", invocation.program, stderr.trim());
            Ok(stdout)
        }
        Err(e) => Err(e),
    }
}

/// Convert borrowed arguments into the owned form [`Invocation`] carries
pub(crate) fn owned_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

#[cfg(test)]
pub(crate) mod scripted {
    //! In-memory runner for unit tests

    use std::cell::RefCell;
    use std::io;

    use super::{CommandOutput, CommandRunner, Invocation};

    type Responder = Box<dyn Fn(&Invocation<'_>) -> CommandOutput>;

    struct Rule {
        program: String,
        prefix: Vec<String>,
        respond: Responder,
    }

    /// Records every call and answers from rules matched by program and argument prefix
    ///
    /// Later rules take precedence. Unmatched calls succeed with empty output.
    #[derive(Default)]
    pub struct ScriptedRunner {
        rules: RefCell<Vec<Rule>>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn on(&self, program: &str, prefix: &[&str], output: CommandOutput) {
            self.on_with(program, prefix, move |_| output.clone());
        }

        pub fn on_with(
            &self,
            program: &str,
            prefix: &[&str],
            respond: impl Fn(&Invocation<'_>) -> CommandOutput + 'static,
        ) {
            self.rules.borrow_mut().push(Rule {
                program: program.to_string(),
                prefix: prefix.iter().map(|s| s.to_string()).collect(),
                respond: Box::new(respond),
            });
        }

        /// Every call so far, formatted as `program arg arg ...`
        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        /// Calls whose formatted command line starts with `prefix`
        pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter(|c| c.starts_with(prefix))
                .collect()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, invocation: &Invocation<'_>) -> io::Result<CommandOutput> {
            self.calls.borrow_mut().push(format!(
                "{} {}",
                invocation.program,
                invocation.args.join(" ")
            ));

            let rules = self.rules.borrow();
            let rule = rules.iter().rev().find(|rule| {
                rule.program == invocation.program && invocation.args.starts_with(&rule.prefix)
            });
            Ok(match rule {
                Some(rule) => (rule.respond)(invocation),
                None => CommandOutput::ok(""),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::scripted::ScriptedRunner;
    use super::*;

    fn invocation<'a>(program: &'a str, args: &'a [String]) -> Invocation<'a> {
        Invocation {
            program,
            args,
            cwd: Path::new("."),
            env: &[],
        }
    }

    #[test]
    fn test_execute_maps_non_zero_exit_to_command_failed() {
        let runner = ScriptedRunner::new();
        runner.on("git", &["status"], CommandOutput::failed(128, "fatal: not a git repository"));

        let args = owned_args(&["status"]);
        let err = execute(&runner, &invocation("git", &args)).unwrap_err();

        match err {
            Error::CommandFailed { exit_code, stderr, .. } => {
                assert_eq!(exit_code, 128);
                assert!(stderr.contains("not a git repository"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_execute_lenient_returns_stdout_of_failed_command() {
        let runner = ScriptedRunner::new();
        runner.on_with("cleartool", &["update"], |_| CommandOutput {
            exit_code: 1,
            stdout: b"Nothing to update".to_vec(),
            stderr: b"cleartool: Warning".to_vec(),
        });

        let args = owned_args(&["update", "."]);
        let out = execute_lenient(&runner, &invocation("cleartool", &args)).unwrap();
        assert_eq!(out, "Nothing to update");
    }

    #[test]
    fn test_command_output_text_is_lossy() {
        let output = CommandOutput::ok(vec![b'o', b'k', 0xff]);
        assert!(output.stdout_text().starts_with("ok"));
        assert!(output.success());
    }
}
