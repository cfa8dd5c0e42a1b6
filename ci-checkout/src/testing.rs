//! Scripted collaborators for unit tests.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::time::Duration;

use ci_checkout_core::{CommandError, DiffSource, FetchOptions, Git, GitCommand, RetryPolicy};

use crate::context::CheckoutContext;
use crate::diff::{DiffError, DiffFetcher};
use crate::runner::{CommandExecutor, Runner};

/// A context over `/repo` with three immediate retries.
pub fn context<'a>(
    executor: &'a ScriptedExecutor,
    diff: &'a ScriptedDiffFetcher,
    options: FetchOptions,
) -> CheckoutContext<'a> {
    CheckoutContext::new(
        Git::new("/repo"),
        Runner::new(executor, RetryPolicy::new(3, Duration::ZERO)),
        options,
        diff,
    )
}

/// Records every command and answers from a script.
///
/// Rules match on the printable command line by prefix, e.g. `"git merge"`.
/// Unscripted commands succeed; `run_for_output` answers the shallow check
/// with `true` and the current-branch query with `HEAD` unless told otherwise.
#[derive(Default)]
pub struct ScriptedExecutor {
    calls: RefCell<Vec<String>>,
    failures: RefCell<Vec<(String, usize)>>,
    outputs: RefCell<Vec<(String, String)>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` commands starting with `prefix`.
    pub fn fail(&self, prefix: &str, times: usize) {
        self.failures.borrow_mut().push((prefix.to_string(), times));
    }

    /// Fail every command starting with `prefix`.
    pub fn always_fail(&self, prefix: &str) {
        self.fail(prefix, usize::MAX);
    }

    /// Output returned by `run_for_output` for commands starting with `prefix`.
    pub fn respond(&self, prefix: &str, output: &str) {
        self.outputs
            .borrow_mut()
            .insert(0, (prefix.to_string(), output.to_string()));
    }

    /// Every command line seen, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Number of command lines starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn outcome(&self, cmd: &GitCommand) -> Result<(), CommandError> {
        let printable = cmd.printable();
        self.calls.borrow_mut().push(printable.clone());

        let mut failures = self.failures.borrow_mut();
        let rule = failures
            .iter_mut()
            .find(|(prefix, remaining)| *remaining > 0 && printable.starts_with(prefix.as_str()));
        match rule {
            Some((_, remaining)) => {
                if *remaining != usize::MAX {
                    *remaining -= 1;
                }
                Err(CommandError::Failed {
                    command: printable,
                    code: Some(1),
                    output: "scripted failure".to_string(),
                })
            }
            None => Ok(()),
        }
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn run(&self, cmd: &GitCommand) -> Result<(), CommandError> {
        self.outcome(cmd)
    }

    fn run_for_output(&self, cmd: &GitCommand) -> Result<String, CommandError> {
        self.outcome(cmd)?;
        let printable = cmd.printable();
        let scripted = self
            .outputs
            .borrow()
            .iter()
            .find(|(prefix, _)| printable.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone());
        Ok(scripted.unwrap_or_else(|| {
            if printable.ends_with("--is-shallow-repository") {
                "true".to_string()
            } else if printable.ends_with("--abbrev-ref HEAD") {
                "HEAD".to_string()
            } else {
                String::new()
            }
        }))
    }
}

/// Diff fetcher returning a fixed path, or failing with a fixed status.
pub struct ScriptedDiffFetcher {
    result: Option<PathBuf>,
    calls: Cell<usize>,
}

impl ScriptedDiffFetcher {
    pub fn serving(path: impl Into<PathBuf>) -> Self {
        Self {
            result: Some(path.into()),
            calls: Cell::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            result: None,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl DiffFetcher for ScriptedDiffFetcher {
    fn fetch_diff(&self, source: &DiffSource) -> Result<PathBuf, DiffError> {
        self.calls.set(self.calls.get() + 1);
        self.result.clone().ok_or_else(|| DiffError::Status {
            url: source.diff_url(),
            status: 404,
        })
    }
}
