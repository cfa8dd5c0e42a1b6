//! One checkout, end to end.

use ci_checkout_core::Git;
use tracing::info;

use crate::config::Config;
use crate::context::CheckoutContext;
use crate::diff::DiffFetcher;
use crate::error::CheckoutError;
use crate::repo;
use crate::report::CheckoutReport;
use crate::runner::{CommandExecutor, Runner};
use crate::selector::{select_strategy, CheckoutInputs};
use crate::unshallow::reset_repository;

/// Runs a checkout in one working directory.
///
/// The strategy is selected (and its parameters validated) before any command
/// runs. If a repository URL is given the directory is prepared first. The
/// report is `None` when HEAD still has no commit, as after a no-op checkout
/// of a fresh directory.
pub struct Checkout<'a> {
    git: Git,
    executor: &'a dyn CommandExecutor,
    diff_fetcher: &'a dyn DiffFetcher,
    config: &'a Config,
}

impl<'a> Checkout<'a> {
    pub fn new(
        git: Git,
        executor: &'a dyn CommandExecutor,
        diff_fetcher: &'a dyn DiffFetcher,
        config: &'a Config,
    ) -> Self {
        Self {
            git,
            executor,
            diff_fetcher,
            config,
        }
    }

    pub fn run(&self, inputs: &CheckoutInputs) -> Result<Option<CheckoutReport>, CheckoutError> {
        let strategy = select_strategy(inputs)?;
        info!(strategy = strategy.name(), dir = %self.git.dir().display(), "selected checkout strategy");

        let runner = Runner::new(self.executor, self.config.retry.policy());
        if let Some(url) = inputs.repository_url.as_deref().filter(|u| !u.trim().is_empty()) {
            repo::prepare(&runner, &self.git, url)?;
        }
        if self.config.repository.reset_before_checkout {
            reset_repository(&runner, &self.git)?;
        }

        let ctx = CheckoutContext::new(
            self.git.clone(),
            runner,
            self.config.fetch.options(),
            self.diff_fetcher,
        );
        strategy.checkout(&ctx)?;

        CheckoutReport::collect(&ctx.runner, &ctx.git, strategy.name())
    }
}
