//! Fetch planning.
//!
//! Every fetch goes through the runner's retry wrapper. A shallow fetch that
//! keeps failing is retried with a doubled depth each time, so a clone that
//! was cut too short for the server to serve can still converge.

use ci_checkout_core::FetchRef;
use tracing::debug;

use crate::context::CheckoutContext;
use crate::error::CheckoutError;

/// Fetch `target`, or the remote's default refs when `target` is `None`.
pub fn fetch(ctx: &CheckoutContext<'_>, target: Option<&FetchRef>) -> Result<(), CheckoutError> {
    ctx.runner
        .run_with_retry_each(|attempt| {
            let options = ctx.fetch_options.for_attempt(attempt);
            if attempt > 0 {
                debug!(attempt, depth = ?options.depth, "retrying fetch");
            }
            ctx.git.fetch(options.fetch_args(target))
        })
        .map_err(|source| CheckoutError::Fetch {
            target: describe(target),
            source,
        })
}

/// Fetch exactly one branch of `remote` and put HEAD on its tip.
///
/// This seeds the working branch of a (possibly shallow) clone: only that
/// branch is fetched, then the local branch of the same name is created or
/// reset to the fetched tip and checked out.
pub fn fetch_initial_branch(
    ctx: &CheckoutContext<'_>,
    remote: &str,
    branch: &str,
) -> Result<(), CheckoutError> {
    let target = FetchRef::branch(remote, branch);
    fetch(ctx, Some(&target))?;

    let tracking = format!("{}/{}", remote, branch);
    ctx.runner
        .run(&ctx.git.checkout_branch_at(branch, &tracking))
        .map_err(|source| CheckoutError::Checkout {
            arg: branch.to_string(),
            source,
        })
}

fn describe(target: Option<&FetchRef>) -> String {
    match target {
        Some(target) => format!("{} {}", target.remote, target.reference),
        None => "default refs".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, ScriptedDiffFetcher, ScriptedExecutor};
    use ci_checkout_core::FetchOptions;

    #[test]
    fn test_fetch_without_target() {
        let executor = ScriptedExecutor::new();
        let diff = ScriptedDiffFetcher::unavailable();
        let ctx = context(&executor, &diff, FetchOptions::new(0, true));

        fetch(&ctx, None).unwrap();

        assert_eq!(executor.calls(), vec!["git fetch --tags"]);
    }

    #[test]
    fn test_shallow_fetch_deepens_on_retry() {
        let executor = ScriptedExecutor::new();
        executor.fail("git fetch", 2);
        let diff = ScriptedDiffFetcher::unavailable();
        let ctx = context(&executor, &diff, FetchOptions::new(1, false));

        fetch(&ctx, Some(&FetchRef::origin("refs/tags/v1"))).unwrap();

        assert_eq!(
            executor.calls(),
            vec![
                "git fetch --depth=1 --no-tags origin refs/tags/v1:refs/tags/v1",
                "git fetch --depth=2 --no-tags origin refs/tags/v1:refs/tags/v1",
                "git fetch --depth=4 --no-tags origin refs/tags/v1:refs/tags/v1",
            ]
        );
    }

    #[test]
    fn test_fetch_error_names_target() {
        let executor = ScriptedExecutor::new();
        executor.always_fail("git fetch");
        let diff = ScriptedDiffFetcher::unavailable();
        let ctx = context(&executor, &diff, FetchOptions::default());

        let err = fetch(&ctx, Some(&FetchRef::branch("origin", "main"))).unwrap_err();

        assert!(matches!(err, CheckoutError::Fetch { .. }));
        assert!(err.to_string().contains("origin refs/heads/main"));
        assert_eq!(executor.count("git fetch"), 3);
    }

    #[test]
    fn test_initial_branch_positions_head() {
        let executor = ScriptedExecutor::new();
        let diff = ScriptedDiffFetcher::unavailable();
        let ctx = context(&executor, &diff, FetchOptions::new(1, false));

        fetch_initial_branch(&ctx, "origin", "develop").unwrap();

        assert_eq!(
            executor.calls(),
            vec![
                "git fetch --depth=1 --no-tags origin refs/heads/develop:refs/remotes/origin/develop",
                "git checkout -B develop origin/develop",
            ]
        );
    }
}
