//! What ended up checked out.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use ci_checkout_core::{CommandError, Git};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::error::CheckoutError;
use crate::runner::Runner;

const FIELD_SEPARATOR: char = '\u{1f}';
const LOG_FORMAT: &str = "%H%x1f%an%x1f%ae%x1f%ct%x1f%s";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The commit HEAD points at after a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReport {
    pub strategy: String,
    pub commit_hash: String,
    pub author_name: String,
    pub author_email: String,
    /// Committer date, seconds since the epoch.
    pub commit_timestamp: i64,
    pub subject: String,
    /// Checked out branch; `None` when HEAD is detached.
    pub branch: Option<String>,
}

impl CheckoutReport {
    pub fn is_detached(&self) -> bool {
        self.branch.is_none()
    }

    /// Read HEAD of `git`'s repository; `None` while HEAD has no commit yet.
    pub fn collect(
        runner: &Runner<'_>,
        git: &Git,
        strategy: &str,
    ) -> Result<Option<Self>, CheckoutError> {
        match runner.run_for_output(&git.head_commit()) {
            Ok(_) => {}
            Err(CommandError::Failed { .. }) => {
                info!("HEAD has no commit, nothing to report");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        }
        let log = runner.run_for_output(&git.log(LOG_FORMAT))?;
        let branch = runner.run_for_output(&git.current_branch())?;
        Self::parse(strategy, &log, &branch).map(Some)
    }

    fn parse(strategy: &str, log: &str, branch: &str) -> Result<Self, CheckoutError> {
        let fields: Vec<&str> = log.splitn(5, FIELD_SEPARATOR).collect();
        let [hash, name, email, timestamp, subject] = fields.as_slice() else {
            return Err(CheckoutError::Report(format!("unexpected log output: {:?}", log)));
        };
        let commit_timestamp = timestamp.trim().parse().map_err(|_| {
            CheckoutError::Report(format!("invalid commit timestamp: {:?}", timestamp))
        })?;
        let branch = branch.trim();

        Ok(Self {
            strategy: strategy.to_string(),
            commit_hash: hash.trim().to_string(),
            author_name: name.to_string(),
            author_email: email.to_string(),
            commit_timestamp,
            subject: subject.to_string(),
            branch: (!branch.is_empty() && branch != "HEAD").then(|| branch.to_string()),
        })
    }
}

pub trait Reporter {
    fn report(&self, report: &CheckoutReport) -> Result<(), ReportError>;
}

/// Writes the report as pretty-printed JSON to a file.
#[derive(Debug, Clone)]
pub struct JsonReporter {
    path: PathBuf,
}

impl JsonReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Reporter for JsonReporter {
    fn report(&self, report: &CheckoutReport) -> Result<(), ReportError> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

mod terminal;
pub use terminal::TerminalReporter;
