//! Command-line interface for ci-checkout.

use crate::config::Config;
use crate::selector::CheckoutInputs;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ci-checkout")]
#[command(about = "Check out the revision a CI build asks for, merging pull requests as needed")]
#[command(version)]
pub struct Cli {
    /// Working directory of the checkout
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Repository to clone; the directory is initialised if it is not a repository yet
    #[arg(long)]
    pub repository_url: Option<String>,

    /// Commit hash to check out (head commit of a pull request)
    #[arg(long)]
    pub commit: Option<String>,

    /// Tag to check out
    #[arg(long)]
    pub tag: Option<String>,

    /// Branch to check out (head branch of a pull request)
    #[arg(long)]
    pub branch: Option<String>,

    /// Base branch a pull request merges into
    #[arg(long)]
    pub branch_dest: Option<String>,

    /// Pull request identifier
    #[arg(long)]
    pub pr_id: Option<String>,

    /// Repository the pull request head lives in
    #[arg(long)]
    pub pr_repository_url: Option<String>,

    /// Merge ref published by the hosting provider, e.g. pull/5/merge
    #[arg(long)]
    pub pr_merge_branch: Option<String>,

    /// Build URL the pull request diff is downloaded from
    #[arg(long)]
    pub build_url: Option<String>,

    /// API token for the diff download
    #[arg(long)]
    pub build_api_token: Option<String>,

    /// Fetch depth (0 fetches full history)
    #[arg(long)]
    pub clone_depth: Option<u32>,

    /// Fetch all tags
    #[arg(long)]
    pub fetch_tags: bool,

    /// Fail instead of merging by hand when the provider's merge is unavailable
    #[arg(long)]
    pub no_manual_merge_fallback: bool,

    /// Total attempts for network commands
    #[arg(long)]
    pub retry_count: Option<u32>,

    /// Seconds to wait between attempts
    #[arg(long)]
    pub retry_wait_secs: Option<u64>,

    /// Hard reset and clean the working tree before checking out
    #[arg(long)]
    pub reset_repository: bool,

    /// Path to config file (defaults to .ci-checkout.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write a JSON report of the checked out commit to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply CLI overrides to the configuration.
    ///
    /// CLI arguments take precedence over config file values. Only options
    /// that were given override the config.
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(depth) = self.clone_depth {
            config.fetch.depth = depth;
        }
        if self.fetch_tags {
            config.fetch.tags = true;
        }
        if self.no_manual_merge_fallback {
            config.merge.fallback_to_manual = false;
        }
        if let Some(count) = self.retry_count {
            config.retry.count = count;
        }
        if let Some(wait_secs) = self.retry_wait_secs {
            config.retry.wait_secs = wait_secs;
        }
        if self.reset_repository {
            config.repository.reset_before_checkout = true;
        }
    }

    /// The build parameters for strategy selection.
    pub fn inputs(&self, config: &Config) -> CheckoutInputs {
        CheckoutInputs {
            repository_url: self.repository_url.clone(),
            commit: self.commit.clone(),
            tag: self.tag.clone(),
            branch: self.branch.clone(),
            branch_dest: self.branch_dest.clone(),
            pr_id: self.pr_id.clone(),
            pr_repository_url: self.pr_repository_url.clone(),
            pr_merge_branch: self.pr_merge_branch.clone(),
            build_url: self.build_url.clone(),
            build_api_token: self.build_api_token.clone(),
            manual_merge_fallback: config.merge.fallback_to_manual,
        }
    }
}
