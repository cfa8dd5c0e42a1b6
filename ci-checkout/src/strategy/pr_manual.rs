use ci_checkout_core::{
    CommandError, FetchRef, ForkPrManualMergeParams, PrManualMergeParams, DEFAULT_REMOTE,
    FORK_REMOTE,
};
use tracing::{error, info, warn};

use crate::context::CheckoutContext;
use crate::error::CheckoutError;
use crate::fetch::{fetch, fetch_initial_branch};
use crate::merge::{detach_head, merge_with_fallback};
use crate::unshallow::ResetUnshallow;

/// Where the head branch lives and what gets merged.
struct HeadSource<'p> {
    branch: &'p str,
    /// Fork repository to add as a remote; `None` for `origin`.
    fork_url: Option<&'p str>,
    merge_arg: String,
}

pub(super) fn checkout_manual_merge(
    ctx: &CheckoutContext<'_>,
    params: &PrManualMergeParams,
) -> Result<(), CheckoutError> {
    fetch_initial_branch(ctx, DEFAULT_REMOTE, &params.base_branch)?;
    manual_merge(
        ctx,
        HeadSource {
            branch: &params.head_branch,
            fork_url: None,
            merge_arg: params.commit.clone(),
        },
    )?;
    detach_head(ctx)
}

pub(super) fn checkout_fork_manual_merge(
    ctx: &CheckoutContext<'_>,
    params: &ForkPrManualMergeParams,
) -> Result<(), CheckoutError> {
    fetch_initial_branch(ctx, DEFAULT_REMOTE, &params.base_branch)?;
    manual_merge(
        ctx,
        HeadSource {
            branch: &params.head_branch,
            fork_url: Some(&params.head_repo_url),
            merge_arg: format!("{}/{}", FORK_REMOTE, params.head_branch),
        },
    )?;
    detach_head(ctx)
}

/// Fetch the head branch and merge it into the checked out base branch.
fn manual_merge(ctx: &CheckoutContext<'_>, head: HeadSource<'_>) -> Result<(), CheckoutError> {
    match ctx.runner.run_for_output(&ctx.git.log("%H")) {
        Ok(hash) => info!(commit = %hash, "base commit"),
        Err(err) => error!(error = %err, "could not read base commit hash"),
    }

    let remote = match head.fork_url {
        Some(url) => {
            add_fork_remote(ctx, url)?;
            FORK_REMOTE
        }
        None => DEFAULT_REMOTE,
    };

    let merged = fetch(ctx, Some(&FetchRef::branch(remote, head.branch)))
        .and_then(|()| merge_with_fallback(ctx, &head.merge_arg, Some(&ResetUnshallow)));
    if head.fork_url.is_some() {
        remove_fork_remote(ctx);
    }
    merged
}

/// Add the fork remote, replacing one left behind by an earlier checkout.
fn add_fork_remote(ctx: &CheckoutContext<'_>, url: &str) -> Result<(), CheckoutError> {
    let remote_error = |source: CommandError| CheckoutError::RemoteAdd {
        url: url.to_string(),
        source,
    };

    let remotes = ctx
        .runner
        .run_for_output(&ctx.git.remote_list())
        .map_err(remote_error)?;
    let stale = remotes
        .lines()
        .any(|line| line.split_whitespace().next() == Some(FORK_REMOTE));
    if stale {
        warn!(remote = FORK_REMOTE, "replacing existing remote");
        ctx.runner
            .run(&ctx.git.remote_remove(FORK_REMOTE))
            .map_err(remote_error)?;
    }

    ctx.runner
        .run(&ctx.git.remote_add(FORK_REMOTE, url))
        .map_err(remote_error)
}

fn remove_fork_remote(ctx: &CheckoutContext<'_>) {
    if let Err(err) = ctx.runner.run(&ctx.git.remote_remove(FORK_REMOTE)) {
        warn!(remote = FORK_REMOTE, error = %err, "could not remove remote");
    }
}
