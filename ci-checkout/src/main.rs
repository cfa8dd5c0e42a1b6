use anyhow::{Context, Result};
use ci_checkout::{
    Checkout, Cli, Config, Git, HttpDiffFetcher, JsonReporter, ProcessExecutor, Reporter,
    TerminalReporter,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_directive = if cli.verbose {
        "ci_checkout=debug"
    } else {
        "ci_checkout=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load config and apply CLI overrides
    let mut config = Config::load_from(cli.config.as_deref())?;
    cli.apply_to_config(&mut config);
    info!(?config, "configuration");

    let diff_fetcher = HttpDiffFetcher::new().context("Failed to set up diff download")?;
    let checkout = Checkout::new(
        Git::new(&cli.dir),
        &ProcessExecutor,
        &diff_fetcher,
        &config,
    );

    let report = checkout
        .run(&cli.inputs(&config))
        .with_context(|| format!("Checkout failed in {}", cli.dir.display()))?;

    let Some(report) = report else {
        info!("nothing checked out");
        return Ok(());
    };

    TerminalReporter::new().report(&report)?;
    if let Some(path) = &cli.report {
        JsonReporter::new(path)
            .report(&report)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    Ok(())
}
