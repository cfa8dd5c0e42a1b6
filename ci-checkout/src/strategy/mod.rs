//! Checkout strategies.
//!
//! A [`CheckoutStrategy`] is chosen once per build by the selector and run
//! once with [`CheckoutStrategy::checkout`]. Each variant carries validated
//! parameters, so nothing is checked again once commands start running.

use ci_checkout_core::{
    BranchParams, BuildTarget, CommitParams, ForkPrManualMergeParams, PrManualMergeParams,
    TagParams,
};
use tracing::info;

use crate::context::CheckoutContext;
use crate::error::CheckoutError;

mod pr_auto;
mod pr_manual;
mod simple;

pub use pr_auto::PrAutoMerge;

/// How the requested revision is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStrategy {
    /// Leave the clone as it is.
    None,
    Commit(CommitParams),
    Branch(BranchParams),
    Tag(TagParams),
    /// Merge a same-repository pull request head into its base.
    PrManualMerge(PrManualMergeParams),
    /// Merge a pull request head from a fork into its base.
    PrForkManualMerge(ForkPrManualMergeParams),
    /// Use the merge computed by the hosting provider.
    PrAutoMerge(PrAutoMerge),
}

impl CheckoutStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutStrategy::None => "none",
            CheckoutStrategy::Commit(_) => "commit",
            CheckoutStrategy::Branch(_) => "branch",
            CheckoutStrategy::Tag(_) => "tag",
            CheckoutStrategy::PrManualMerge(_) => "pr-manual-merge",
            CheckoutStrategy::PrForkManualMerge(_) => "pr-fork-manual-merge",
            CheckoutStrategy::PrAutoMerge(_) => "pr-auto-merge",
        }
    }

    /// Whether a successful run ends on a detached HEAD.
    pub fn detaches_head(&self) -> bool {
        matches!(
            self,
            CheckoutStrategy::PrManualMerge(_)
                | CheckoutStrategy::PrForkManualMerge(_)
                | CheckoutStrategy::PrAutoMerge(_)
        )
    }

    /// Run the strategy in `ctx`'s repository.
    pub fn checkout(&self, ctx: &CheckoutContext<'_>) -> Result<(), CheckoutError> {
        info!(strategy = self.name(), "checking out");
        match self {
            CheckoutStrategy::None => Ok(()),
            CheckoutStrategy::Commit(params) => simple::checkout_commit(ctx, params),
            CheckoutStrategy::Branch(params) => simple::checkout_branch(ctx, params),
            CheckoutStrategy::Tag(params) => simple::checkout_tag(ctx, params),
            CheckoutStrategy::PrManualMerge(params) => pr_manual::checkout_manual_merge(ctx, params),
            CheckoutStrategy::PrForkManualMerge(params) => {
                pr_manual::checkout_fork_manual_merge(ctx, params)
            }
            CheckoutStrategy::PrAutoMerge(auto) => auto.checkout(ctx),
        }
    }
}

impl From<BuildTarget> for CheckoutStrategy {
    fn from(target: BuildTarget) -> Self {
        match target {
            BuildTarget::None => CheckoutStrategy::None,
            BuildTarget::Commit(params) => CheckoutStrategy::Commit(params),
            BuildTarget::Tag(params) => CheckoutStrategy::Tag(params),
            BuildTarget::Branch(params) => CheckoutStrategy::Branch(params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, ScriptedDiffFetcher, ScriptedExecutor};
    use ci_checkout_core::FetchOptions;

    #[test]
    fn test_none_runs_nothing() {
        let executor = ScriptedExecutor::new();
        let diff = ScriptedDiffFetcher::unavailable();
        let ctx = context(&executor, &diff, FetchOptions::new(1, false));

        CheckoutStrategy::None.checkout(&ctx).unwrap();

        assert!(executor.calls().is_empty());
    }

    #[test]
    fn test_from_build_target() {
        let target = BuildTarget::from_inputs(None, None, Some("main")).unwrap();
        let strategy = CheckoutStrategy::from(target);

        assert_eq!(strategy.name(), "branch");
        assert!(!strategy.detaches_head());
        assert_eq!(CheckoutStrategy::from(BuildTarget::None), CheckoutStrategy::None);
    }

    #[test]
    fn test_pr_strategies_detach() {
        let manual = CheckoutStrategy::PrManualMerge(
            PrManualMergeParams::new("feat", "abc", "main").unwrap(),
        );
        assert!(manual.detaches_head());
        assert_eq!(manual.name(), "pr-manual-merge");
    }
}
