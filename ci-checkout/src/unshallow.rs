//! Deepening a shallow clone after a history-dependent operation failed.

use ci_checkout_core::Git;
use tracing::warn;

use crate::context::CheckoutContext;
use crate::error::CheckoutError;
use crate::runner::Runner;

/// A way of bringing in full history. Which one to use is the caller's
/// decision, based on what failed.
pub trait UnshallowFallback {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn unshallow(&self, ctx: &CheckoutContext<'_>) -> Result<(), CheckoutError>;
}

/// `fetch --unshallow` on the clone as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleUnshallow;

impl UnshallowFallback for SimpleUnshallow {
    fn name(&self) -> &'static str {
        "unshallow"
    }

    fn unshallow(&self, ctx: &CheckoutContext<'_>) -> Result<(), CheckoutError> {
        warn!("Unshallow...");
        ctx.runner
            .run_with_retry(&ctx.git.fetch_unshallow())
            .map_err(CheckoutError::Unshallow)
    }
}

/// Hard reset and clean the working tree (submodules included), then
/// `fetch --unshallow`. For clones a failed merge may have left half-done.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetUnshallow;

impl UnshallowFallback for ResetUnshallow {
    fn name(&self) -> &'static str {
        "reset and unshallow"
    }

    fn unshallow(&self, ctx: &CheckoutContext<'_>) -> Result<(), CheckoutError> {
        warn!("Reset repository, then unshallow...");
        reset_repository(&ctx.runner, &ctx.git)?;
        ctx.runner
            .run_with_retry(&ctx.git.fetch_unshallow())
            .map_err(CheckoutError::Unshallow)
    }
}

/// Discard local changes and untracked files in the repository and in every
/// submodule.
pub fn reset_repository(runner: &Runner<'_>, git: &Git) -> Result<(), CheckoutError> {
    let reset = git.reset("hard", "HEAD");
    let clean = git.clean(&["-x", "-d", "-f"]);

    for cmd in [
        reset.clone(),
        clean.clone(),
        git.submodule_foreach(&reset),
        git.submodule_foreach(&clean),
    ] {
        runner.run(&cmd).map_err(CheckoutError::Reset)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, ScriptedDiffFetcher, ScriptedExecutor};
    use ci_checkout_core::FetchOptions;

    #[test]
    fn test_simple_unshallow_only_fetches() {
        let executor = ScriptedExecutor::new();
        let diff = ScriptedDiffFetcher::unavailable();
        let ctx = context(&executor, &diff, FetchOptions::new(1, false));

        SimpleUnshallow.unshallow(&ctx).unwrap();

        assert_eq!(executor.calls(), vec!["git fetch --unshallow"]);
    }

    #[test]
    fn test_reset_unshallow_cleans_first() {
        let executor = ScriptedExecutor::new();
        let diff = ScriptedDiffFetcher::unavailable();
        let ctx = context(&executor, &diff, FetchOptions::new(1, false));

        ResetUnshallow.unshallow(&ctx).unwrap();

        assert_eq!(
            executor.calls(),
            vec![
                "git reset --hard HEAD",
                "git clean -x -d -f",
                "git submodule foreach \"git reset --hard HEAD\"",
                "git submodule foreach \"git clean -x -d -f\"",
                "git fetch --unshallow",
            ]
        );
    }

    #[test]
    fn test_unshallow_fetch_is_retried() {
        let executor = ScriptedExecutor::new();
        executor.fail("git fetch --unshallow", 2);
        let diff = ScriptedDiffFetcher::unavailable();
        let ctx = context(&executor, &diff, FetchOptions::new(1, false));

        SimpleUnshallow.unshallow(&ctx).unwrap();

        assert_eq!(executor.count("git fetch --unshallow"), 3);
    }

    #[test]
    fn test_reset_failure_stops_before_fetch() {
        let executor = ScriptedExecutor::new();
        executor.fail("git clean", 1);
        let diff = ScriptedDiffFetcher::unavailable();
        let ctx = context(&executor, &diff, FetchOptions::new(1, false));

        let err = ResetUnshallow.unshallow(&ctx).unwrap_err();

        assert!(matches!(err, CheckoutError::Reset(_)));
        assert_eq!(executor.count("git fetch"), 0);
    }
}
