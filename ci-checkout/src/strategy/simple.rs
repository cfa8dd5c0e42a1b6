use ci_checkout_core::{BranchParams, CommitParams, FetchRef, TagParams, DEFAULT_REMOTE};

use crate::context::CheckoutContext;
use crate::error::CheckoutError;
use crate::fetch::{fetch, fetch_initial_branch};
use crate::merge::checkout_with_fallback;
use crate::unshallow::SimpleUnshallow;

/// Fetch the default refs, then check out the commit.
pub(super) fn checkout_commit(
    ctx: &CheckoutContext<'_>,
    params: &CommitParams,
) -> Result<(), CheckoutError> {
    fetch(ctx, None)?;
    checkout_with_fallback(ctx, &params.commit, Some(&SimpleUnshallow))
}

/// The initial branch fetch already leaves HEAD on the branch tip.
pub(super) fn checkout_branch(
    ctx: &CheckoutContext<'_>,
    params: &BranchParams,
) -> Result<(), CheckoutError> {
    fetch_initial_branch(ctx, DEFAULT_REMOTE, &params.branch)
}

/// Fetch the tag's source branch when known, then the tag, then check the tag
/// out.
pub(super) fn checkout_tag(
    ctx: &CheckoutContext<'_>,
    params: &TagParams,
) -> Result<(), CheckoutError> {
    if let Some(branch) = &params.branch {
        fetch(ctx, Some(&FetchRef::branch(DEFAULT_REMOTE, branch)))?;
    }
    fetch(ctx, Some(&FetchRef::tag(DEFAULT_REMOTE, &params.tag)))?;
    checkout_with_fallback(ctx, &params.tag, Some(&SimpleUnshallow))
}
