//! Structured git operations.
//!
//! [`Git`] turns the operations the checkout engine needs into [`GitCommand`]
//! values: a working directory plus an argument vector. Nothing here runs a
//! process; execution belongs to the runner in the `ci-checkout` crate, which
//! keeps strategies testable against a scripted executor.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The git executable name.
const GIT: &str = "git";

/// A single git invocation, not yet executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    dir: PathBuf,
    args: Vec<String>,
}

impl GitCommand {
    /// Arguments passed after `git`.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Directory the command runs in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Human-readable command line, e.g. `git fetch --depth=1 origin main`.
    ///
    /// Arguments containing whitespace (or empty ones) are double-quoted.
    pub fn printable(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(GIT.to_string());
        for arg in &self.args {
            if arg.is_empty() || arg.chars().any(char::is_whitespace) {
                parts.push(format!("\"{}\"", arg));
            } else {
                parts.push(arg.clone());
            }
        }
        parts.join(" ")
    }

    /// Build a `std::process::Command` for this invocation.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(GIT);
        cmd.current_dir(&self.dir);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.printable())
    }
}

/// Builder of git commands bound to one working directory.
#[derive(Debug, Clone)]
pub struct Git {
    dir: PathBuf,
}

impl Git {
    /// Create a builder for commands run in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The working directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn command<I, S>(&self, args: I) -> GitCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GitCommand {
            dir: self.dir.clone(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `git init`
    pub fn init(&self) -> GitCommand {
        self.command(["init"])
    }

    /// `git remote add <name> <url>`
    pub fn remote_add(&self, name: &str, url: &str) -> GitCommand {
        self.command(["remote", "add", name, url])
    }

    /// `git remote remove <name>`
    pub fn remote_remove(&self, name: &str) -> GitCommand {
        self.command(["remote", "remove", name])
    }

    /// `git remote -v`
    pub fn remote_list(&self) -> GitCommand {
        self.command(["remote", "-v"])
    }

    /// `git fetch <args...>`
    pub fn fetch<I, S>(&self, args: I) -> GitCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all = vec!["fetch".to_string()];
        all.extend(args.into_iter().map(Into::into));
        self.command(all)
    }

    /// `git fetch --unshallow`
    pub fn fetch_unshallow(&self) -> GitCommand {
        self.command(["fetch", "--unshallow"])
    }

    /// `git checkout <arg>`
    pub fn checkout(&self, arg: &str) -> GitCommand {
        self.command(["checkout", arg])
    }

    /// `git checkout -B <branch> <start_point>`: create or reset `branch` at
    /// `start_point` and switch to it.
    pub fn checkout_branch_at(&self, branch: &str, start_point: &str) -> GitCommand {
        self.command(["checkout", "-B", branch, start_point])
    }

    /// `git checkout --detach`
    pub fn checkout_detach(&self) -> GitCommand {
        self.command(["checkout", "--detach"])
    }

    /// `git merge <arg>`
    pub fn merge(&self, arg: &str) -> GitCommand {
        self.command(["merge", arg])
    }

    /// `git reset --<mode> <rev>`
    pub fn reset(&self, mode: &str, rev: &str) -> GitCommand {
        self.command(["reset".to_string(), format!("--{}", mode), rev.to_string()])
    }

    /// `git clean <flags...>`
    pub fn clean(&self, flags: &[&str]) -> GitCommand {
        let mut args = vec!["clean"];
        args.extend_from_slice(flags);
        self.command(args)
    }

    /// `git submodule foreach "<inner>"`: run `inner` in every submodule.
    pub fn submodule_foreach(&self, inner: &GitCommand) -> GitCommand {
        self.command(["submodule".to_string(), "foreach".to_string(), inner.printable()])
    }

    /// `git log -1 --format=<format>`
    pub fn log(&self, format: &str) -> GitCommand {
        self.command(["log".to_string(), "-1".to_string(), format!("--format={}", format)])
    }

    /// `git apply <patch>`
    pub fn apply(&self, patch: &Path) -> GitCommand {
        self.command(["apply".to_string(), patch.display().to_string()])
    }

    /// `git rev-parse --is-shallow-repository`
    pub fn is_shallow(&self) -> GitCommand {
        self.command(["rev-parse", "--is-shallow-repository"])
    }

    /// `git rev-parse --abbrev-ref HEAD`: prints `HEAD` when detached.
    pub fn current_branch(&self) -> GitCommand {
        self.command(["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// `git rev-parse --verify --quiet HEAD`; fails while HEAD is unborn.
    pub fn head_commit(&self) -> GitCommand {
        self.command(["rev-parse", "--verify", "--quiet", "HEAD"])
    }
}
