//! Command execution with optional retry.
//!
//! A [`CommandExecutor`] turns a [`GitCommand`] into a process; [`Runner`]
//! wraps one with logging and the process-wide [`RetryPolicy`]. Strategies
//! only ever talk to a `Runner`, so tests swap the executor for a scripted one.

use std::io::{BufRead, BufReader};
use std::process::Stdio;
use std::thread;

use ci_checkout_core::{CommandError, GitCommand, RetryPolicy};
use tracing::{debug, info};

/// Executes git commands.
pub trait CommandExecutor {
    /// Run the command, letting its output through to the terminal.
    fn run(&self, cmd: &GitCommand) -> Result<(), CommandError>;

    /// Run the command and return its trimmed combined stdout and stderr.
    fn run_for_output(&self, cmd: &GitCommand) -> Result<String, CommandError>;
}

/// Executes commands as child processes of the current one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl CommandExecutor for ProcessExecutor {
    fn run(&self, cmd: &GitCommand) -> Result<(), CommandError> {
        let printable = cmd.printable();
        let mut child = cmd
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: printable.clone(),
                source,
            })?;

        // Forward stderr as it arrives and keep a copy for the error message.
        let stderr_reader = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                let mut captured = String::new();
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    eprintln!("{}", line);
                    captured.push_str(&line);
                    captured.push('\n');
                }
                captured
            })
        });

        let status = child.wait().map_err(|source| CommandError::Spawn {
            command: printable.clone(),
            source,
        })?;
        let captured = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed {
                command: printable,
                code: status.code(),
                output: captured.trim().to_string(),
            })
        }
    }

    fn run_for_output(&self, cmd: &GitCommand) -> Result<String, CommandError> {
        let printable = cmd.printable();
        let output = cmd
            .to_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CommandError::Spawn {
                command: printable.clone(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let combined = combined.trim().to_string();

        if output.status.success() {
            Ok(combined)
        } else {
            Err(CommandError::Failed {
                command: printable,
                code: output.status.code(),
                output: combined,
            })
        }
    }
}

/// Runs commands through an executor, retrying where asked.
pub struct Runner<'a> {
    executor: &'a dyn CommandExecutor,
    policy: RetryPolicy,
}

impl<'a> Runner<'a> {
    pub fn new(executor: &'a dyn CommandExecutor, policy: RetryPolicy) -> Self {
        Self { executor, policy }
    }

    /// The retry policy applied by [`Runner::run_with_retry`].
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run once.
    pub fn run(&self, cmd: &GitCommand) -> Result<(), CommandError> {
        info!(command = %cmd, "running");
        self.executor.run(cmd)
    }

    /// Run once and return trimmed combined output.
    pub fn run_for_output(&self, cmd: &GitCommand) -> Result<String, CommandError> {
        debug!(command = %cmd, "running for output");
        self.executor.run_for_output(cmd)
    }

    /// Run under the retry policy. Every failure is retried, whatever its
    /// cause, until the attempts run out.
    pub fn run_with_retry(&self, cmd: &GitCommand) -> Result<(), CommandError> {
        self.run_with_retry_each(|_| cmd.clone())
    }

    /// Like [`Runner::run_with_retry`], building the command for each
    /// zero-based attempt.
    pub fn run_with_retry_each<F>(&self, mut build: F) -> Result<(), CommandError>
    where
        F: FnMut(u32) -> GitCommand,
    {
        self.policy.retry(|attempt| self.run(&build(attempt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedExecutor;
    use ci_checkout_core::Git;
    use std::time::Duration;

    fn policy(count: u32) -> RetryPolicy {
        RetryPolicy::new(count, Duration::ZERO)
    }

    #[test]
    fn test_retry_recovers_after_transient_failures() {
        let executor = ScriptedExecutor::new();
        executor.fail("git fetch", 2);
        let runner = Runner::new(&executor, policy(3));

        let result = runner.run_with_retry(&Git::new("/repo").fetch(["--no-tags"]));

        assert!(result.is_ok());
        assert_eq!(executor.count("git fetch"), 3);
    }

    #[test]
    fn test_retry_gives_up_after_count_attempts() {
        let executor = ScriptedExecutor::new();
        executor.always_fail("git fetch");
        let runner = Runner::new(&executor, policy(3));

        let err = runner
            .run_with_retry(&Git::new("/repo").fetch(["--no-tags"]))
            .unwrap_err();

        assert_eq!(err.command(), "git fetch --no-tags");
        assert_eq!(executor.count("git fetch"), 3);
    }

    #[test]
    fn test_run_does_not_retry() {
        let executor = ScriptedExecutor::new();
        executor.fail("git checkout", 1);
        let runner = Runner::new(&executor, policy(5));

        assert!(runner.run(&Git::new("/repo").checkout("main")).is_err());
        assert_eq!(executor.count("git checkout"), 1);
    }

    #[test]
    fn test_retry_each_sees_attempt_numbers() {
        let executor = ScriptedExecutor::new();
        executor.fail("git fetch", 1);
        let runner = Runner::new(&executor, policy(2));
        let git = Git::new("/repo");

        runner
            .run_with_retry_each(|attempt| git.fetch([format!("--depth={}", attempt + 1)]))
            .unwrap();

        assert_eq!(
            executor.calls(),
            vec!["git fetch --depth=1", "git fetch --depth=2"]
        );
    }

    #[test]
    fn test_run_for_output_returns_scripted_text() {
        let executor = ScriptedExecutor::new();
        executor.respond("git log", "abc123");
        let runner = Runner::new(&executor, policy(1));

        let output = runner.run_for_output(&Git::new("/repo").log("%H")).unwrap();
        assert_eq!(output, "abc123");
    }
}
