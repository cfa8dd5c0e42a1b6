use std::fs;
use std::path::Path;

use ci_checkout_core::{FetchRef, PrAutoMergeParams, DEFAULT_REMOTE};
use tracing::{debug, info, warn};

use super::CheckoutStrategy;
use crate::context::CheckoutContext;
use crate::error::CheckoutError;
use crate::fetch::{fetch, fetch_initial_branch};
use crate::merge::{checkout_with_fallback, detach_head};

/// Pull request checkout using the hosting provider's merge.
///
/// The merge ref is tried first, then the downloadable diff. When neither can
/// be obtained the optional fallback strategy (a manual merge) runs instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrAutoMerge {
    pub params: PrAutoMergeParams,
    pub fallback: Option<Box<CheckoutStrategy>>,
    /// Why a wanted manual merge fallback could not be set up.
    pub fallback_skipped: Option<String>,
}

impl PrAutoMerge {
    pub fn new(params: PrAutoMergeParams, fallback: Option<CheckoutStrategy>) -> Self {
        Self {
            params,
            fallback: fallback.map(Box::new),
            fallback_skipped: None,
        }
    }

    /// Record that the fallback was wanted but not possible.
    pub fn with_skipped_fallback(mut self, reason: impl Into<String>) -> Self {
        self.fallback_skipped = Some(reason.into());
        self
    }

    pub(super) fn checkout(&self, ctx: &CheckoutContext<'_>) -> Result<(), CheckoutError> {
        let mut unavailable = Vec::new();

        if let (Some(merge_ref), Some(local_ref)) =
            (self.params.merge_ref(), self.params.local_merge_ref())
        {
            match checkout_merge_ref(ctx, &merge_ref, &local_ref) {
                Ok(()) => return detach_head(ctx),
                Err(err) => {
                    warn!(merge_ref = %merge_ref, error = %err, "merge ref unavailable");
                    unavailable.push(format!("merge ref {}: {}", merge_ref, err));
                }
            }
        }

        if let Some(source) = &self.params.diff {
            match ctx.diff_fetcher.fetch_diff(source) {
                Ok(patch) => {
                    let applied = apply_diff(ctx, &self.params.base_branch, &patch);
                    remove_patch(&patch);
                    applied?;
                    return detach_head(ctx);
                }
                Err(err) => {
                    warn!(url = %source.diff_url(), error = %err, "diff unavailable");
                    unavailable.push(err.to_string());
                }
            }
        }

        if let Some(reason) = &self.fallback_skipped {
            unavailable.push(format!("manual merge fallback skipped: {}", reason));
        }
        let details = if unavailable.is_empty() {
            "no merge ref or diff source".to_string()
        } else {
            unavailable.join("; ")
        };

        match &self.fallback {
            Some(fallback) => {
                warn!(
                    fallback = fallback.name(),
                    details = %details,
                    "no auto merge available, falling back to manual merge"
                );
                fallback
                    .checkout(ctx)
                    .map_err(|err| CheckoutError::ManualMergeFallback(Box::new(err)))
            }
            None => Err(CheckoutError::AutoMergeUnavailable { details }),
        }
    }
}

/// Fetch the provider's merge ref under its local name and check that out.
fn checkout_merge_ref(
    ctx: &CheckoutContext<'_>,
    merge_ref: &str,
    local_ref: &str,
) -> Result<(), CheckoutError> {
    let refspec = format!("{}:{}", merge_ref, local_ref);
    fetch(ctx, Some(&FetchRef::new(DEFAULT_REMOTE, refspec)))?;
    checkout_with_fallback(ctx, local_ref, None)
}

fn apply_diff(
    ctx: &CheckoutContext<'_>,
    base_branch: &str,
    patch: &Path,
) -> Result<(), CheckoutError> {
    info!(patch = %patch.display(), base = base_branch, "applying pull request diff");
    fetch_initial_branch(ctx, DEFAULT_REMOTE, base_branch)?;
    ctx.runner
        .run(&ctx.git.apply(patch))
        .map_err(|source| CheckoutError::Apply {
            patch: patch.to_path_buf(),
            source,
        })
}

fn remove_patch(patch: &Path) {
    if let Err(err) = fs::remove_file(patch) {
        debug!(patch = %patch.display(), error = %err, "could not remove diff file");
    }
}
