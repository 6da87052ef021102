//! Scripted cleartool for integration tests.
//!
//! git invocations run for real; cleartool invocations are recorded and
//! answered from rules, with just enough behaviour for the view directory
//! to evolve the way a real view would.

use std::cell::RefCell;
use std::fs;
use std::io;

use gitcc::exec::{CommandOutput, CommandRunner, Invocation, ProcessRunner};

struct Rule {
    prefix: Vec<String>,
    output: CommandOutput,
}

/// A [`CommandRunner`] running real git and a fake cleartool.
///
/// Built-in behaviour:
/// - `get -to <dest> <file@@version>` writes `<file@@version>\n` to `dest`
/// - `mkelem -nc -eltype directory <dir>` creates the directory in the view
/// - `describe -fmt %Vn <path>` answers `/main/1`
///
/// Rules registered with [`FakeClearTool::on`] take precedence, later ones first.
#[derive(Default)]
pub struct FakeClearTool {
    rules: RefCell<Vec<Rule>>,
    calls: RefCell<Vec<String>>,
}

impl FakeClearTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer cleartool calls starting with `prefix` with `output`.
    pub fn on(&self, prefix: &[&str], output: CommandOutput) {
        self.rules.borrow_mut().push(Rule {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            output,
        });
    }

    /// Make cleartool calls starting with `prefix` fail.
    pub fn fail(&self, prefix: &[&str], stderr: &str) {
        self.on(prefix, CommandOutput::failed(1, stderr));
    }

    /// Every cleartool call so far, formatted as `arg arg ...`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// cleartool calls whose formatted arguments start with `prefix`.
    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn builtin(&self, invocation: &Invocation<'_>) -> io::Result<CommandOutput> {
        let args: Vec<&str> = invocation.args.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["get", "-to", dest, extended] => {
                fs::write(dest, format!("{}\n", extended))?;
                Ok(CommandOutput::ok(""))
            }
            ["mkelem", "-nc", "-eltype", "directory", dir] => {
                fs::create_dir_all(invocation.cwd.join(dir))?;
                Ok(CommandOutput::ok(""))
            }
            ["describe", "-fmt", "%Vn", _] => Ok(CommandOutput::ok("/main/1")),
            _ => Ok(CommandOutput::ok("")),
        }
    }
}

impl CommandRunner for FakeClearTool {
    fn run(&self, invocation: &Invocation<'_>) -> io::Result<CommandOutput> {
        if invocation.program != "cleartool" {
            return ProcessRunner.run(invocation);
        }

        self.calls.borrow_mut().push(invocation.args.join(" "));
        let rules = self.rules.borrow();
        match rules
            .iter()
            .rev()
            .find(|rule| invocation.args.starts_with(&rule.prefix))
        {
            Some(rule) => Ok(rule.output.clone()),
            None => self.builtin(invocation),
        }
    }
}
