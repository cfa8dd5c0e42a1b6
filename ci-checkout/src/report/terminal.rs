use std::io::{self, Write};

use colored::Colorize;

use super::{CheckoutReport, ReportError, Reporter};

/// A reporter that prints the checked out commit to the terminal.
#[derive(Debug, Clone, Default)]
pub struct TerminalReporter {
    /// Whether to use colors in output (defaults to true).
    use_colors: bool,
}

impl TerminalReporter {
    /// Create a new terminal reporter with default settings.
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    /// Create a terminal reporter with color output disabled.
    pub fn without_colors() -> Self {
        Self { use_colors: false }
    }

    fn label(&self, text: &str) -> String {
        let text = format!("{:<10}", text);
        if self.use_colors {
            text.bold().to_string()
        } else {
            text
        }
    }

    /// Where HEAD is: the branch name, or `detached` highlighted.
    fn format_head(&self, report: &CheckoutReport) -> String {
        match &report.branch {
            Some(branch) if self.use_colors => branch.green().to_string(),
            Some(branch) => branch.clone(),
            None if self.use_colors => "detached".yellow().to_string(),
            None => "detached".to_string(),
        }
    }

    fn write_report(&self, writer: &mut impl Write, report: &CheckoutReport) -> io::Result<()> {
        writeln!(writer)?;
        let hash = if self.use_colors {
            report.commit_hash.cyan().bold().to_string()
        } else {
            report.commit_hash.clone()
        };
        writeln!(writer, "{} {}", self.label("Commit:"), hash)?;
        writeln!(writer, "{} {}", self.label("Strategy:"), report.strategy)?;
        writeln!(writer, "{} {}", self.label("HEAD:"), self.format_head(report))?;
        writeln!(
            writer,
            "{} {} <{}>",
            self.label("Author:"),
            report.author_name,
            report.author_email
        )?;
        writeln!(writer, "{} {}", self.label("Date:"), report.commit_timestamp)?;
        writeln!(writer, "{} {}", self.label("Subject:"), report.subject)?;
        writeln!(writer)?;
        Ok(())
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, report: &CheckoutReport) -> Result<(), ReportError> {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        self.write_report(&mut writer, report)?;
        Ok(())
    }
}
