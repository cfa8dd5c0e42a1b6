//! Choosing a checkout strategy from CI inputs.

use ci_checkout_core::{
    BuildTarget, DiffSource, ForkPrManualMergeParams, ParameterValidationError,
    PrAutoMergeParams, PrManualMergeParams,
};
use tracing::warn;

use crate::strategy::{CheckoutStrategy, PrAutoMerge};

/// Build parameters as handed over by the CI system. Blank strings count as
/// absent everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutInputs {
    pub repository_url: Option<String>,
    pub commit: Option<String>,
    pub tag: Option<String>,
    /// Branch to build; the head branch of a pull request.
    pub branch: Option<String>,
    /// Base branch a pull request merges into.
    pub branch_dest: Option<String>,
    pub pr_id: Option<String>,
    /// Repository the pull request head lives in.
    pub pr_repository_url: Option<String>,
    /// Provider merge ref, e.g. `pull/5/merge`.
    pub pr_merge_branch: Option<String>,
    pub build_url: Option<String>,
    pub build_api_token: Option<String>,
    /// Degrade an unavailable auto merge to a manual merge.
    pub manual_merge_fallback: bool,
}

impl CheckoutInputs {
    /// Any pull request field set.
    pub fn is_pull_request(&self) -> bool {
        present(&self.pr_id).is_some()
            || present(&self.pr_repository_url).is_some()
            || present(&self.pr_merge_branch).is_some()
    }

    /// The pull request head lives in a different repository.
    pub fn is_fork(&self) -> bool {
        match (present(&self.repository_url), present(&self.pr_repository_url)) {
            (Some(repo), Some(pr_repo)) => normalize_repo_url(repo) != normalize_repo_url(pr_repo),
            _ => false,
        }
    }

    fn diff_source(&self) -> Option<DiffSource> {
        let build_url = present(&self.build_url)?;
        let token = present(&self.build_api_token)?;
        DiffSource::new(build_url, token, present(&self.pr_id).map(str::to_string)).ok()
    }

    fn manual_merge(&self) -> Result<CheckoutStrategy, ParameterValidationError> {
        let head = present(&self.branch).unwrap_or_default();
        let base = present(&self.branch_dest).unwrap_or_default();
        if self.is_fork() {
            let url = present(&self.pr_repository_url).unwrap_or_default();
            ForkPrManualMergeParams::new(head, url, base).map(CheckoutStrategy::PrForkManualMerge)
        } else {
            let commit = present(&self.commit).unwrap_or_default();
            PrManualMergeParams::new(head, commit, base).map(CheckoutStrategy::PrManualMerge)
        }
    }
}

/// Pick the strategy for a build.
///
/// Non pull request builds check out a commit, tag, branch or nothing. Pull
/// requests use the provider's merge (merge ref or diff) when one is given,
/// with a manual merge as fallback if enabled and possible; otherwise they are
/// merged by hand.
pub fn select_strategy(
    inputs: &CheckoutInputs,
) -> Result<CheckoutStrategy, ParameterValidationError> {
    if !inputs.is_pull_request() {
        let target = BuildTarget::from_inputs(
            inputs.commit.as_deref(),
            inputs.tag.as_deref(),
            inputs.branch.as_deref(),
        )?;
        return Ok(target.into());
    }

    let merge_branch = present(&inputs.pr_merge_branch).map(str::to_string);
    let diff = inputs.diff_source();
    if merge_branch.is_none() && diff.is_none() {
        return inputs.manual_merge();
    }

    let base = present(&inputs.branch_dest).unwrap_or_default();
    let params = PrAutoMergeParams::new(merge_branch, diff, base)?;
    if !inputs.manual_merge_fallback {
        return Ok(CheckoutStrategy::PrAutoMerge(PrAutoMerge::new(params, None)));
    }
    let auto = match inputs.manual_merge() {
        Ok(fallback) => PrAutoMerge::new(params, Some(fallback)),
        Err(err) => {
            warn!(reason = %err, "manual merge fallback disabled: parameters incomplete");
            PrAutoMerge::new(params, None).with_skipped_fallback(err.to_string())
        }
    };
    Ok(CheckoutStrategy::PrAutoMerge(auto))
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Reduce a clone URL to `host/path` so that HTTPS, SSH and scp-style forms
/// of the same repository compare equal.
pub fn normalize_repo_url(url: &str) -> String {
    let url = url.trim().to_lowercase();
    let (rest, has_scheme) = match url.split_once("://") {
        Some((_, rest)) => (rest.to_string(), true),
        None => (url.clone(), false),
    };

    let rest = match rest.split_once('@') {
        Some((user, host_path)) if !user.contains('/') => host_path.to_string(),
        _ => rest,
    };

    // scp-like `host:path`
    let rest = if has_scheme {
        rest
    } else {
        match rest.split_once(':') {
            Some((host, path)) if !host.contains('/') => format!("{}/{}", host, path),
            _ => rest,
        }
    };

    let rest = rest.trim_end_matches('/');
    rest.strip_suffix(".git").unwrap_or(rest).to_string()
}
