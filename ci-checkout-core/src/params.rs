//! Validated checkout parameters.
//!
//! Every constructor rejects blank required fields with a
//! [`ParameterValidationError`], so a strategy built from these types never
//! starts running commands with a missing ref.

use crate::error::ParameterValidationError;

/// Suffix of provider merge refs, e.g. `refs/pull/5/merge`.
const MERGE_REF_SUFFIX: &str = "/merge";

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !is_blank(v))
}

/// Checkout of a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitParams {
    pub commit: String,
}

impl CommitParams {
    pub fn new(commit: impl Into<String>) -> Result<Self, ParameterValidationError> {
        let commit = commit.into();
        if is_blank(&commit) {
            return Err(ParameterValidationError::new(
                "commit checkout strategy can not be used: no commit hash specified",
            ));
        }
        Ok(Self { commit })
    }
}

/// Checkout of a branch tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchParams {
    pub branch: String,
}

impl BranchParams {
    pub fn new(branch: impl Into<String>) -> Result<Self, ParameterValidationError> {
        let branch = branch.into();
        if is_blank(&branch) {
            return Err(ParameterValidationError::new(
                "branch checkout strategy can not be used: no branch specified",
            ));
        }
        Ok(Self { branch })
    }
}

/// Checkout of a tag, optionally with the branch it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagParams {
    pub tag: String,
    pub branch: Option<String>,
}

impl TagParams {
    pub fn new(
        tag: impl Into<String>,
        branch: Option<String>,
    ) -> Result<Self, ParameterValidationError> {
        let tag = tag.into();
        if is_blank(&tag) {
            return Err(ParameterValidationError::new(
                "tag checkout strategy can not be used: no tag specified",
            ));
        }
        let branch = branch.filter(|b| !is_blank(b));
        Ok(Self { tag, branch })
    }
}

/// What a non pull request build checks out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildTarget {
    /// Nothing requested; the clone is already on the right ref.
    None,
    Commit(CommitParams),
    Tag(TagParams),
    Branch(BranchParams),
}

impl BuildTarget {
    /// Classify CI inputs. Blank values count as absent; a commit wins over a
    /// tag, a tag over a branch. A branch given alongside a tag is kept as the
    /// tag's source branch.
    pub fn from_inputs(
        commit: Option<&str>,
        tag: Option<&str>,
        branch: Option<&str>,
    ) -> Result<Self, ParameterValidationError> {
        let branch = non_blank(branch);
        if let Some(commit) = non_blank(commit) {
            return Ok(BuildTarget::Commit(CommitParams::new(commit)?));
        }
        if let Some(tag) = non_blank(tag) {
            return Ok(BuildTarget::Tag(TagParams::new(
                tag,
                branch.map(str::to_string),
            )?));
        }
        if let Some(branch) = branch {
            return Ok(BuildTarget::Branch(BranchParams::new(branch)?));
        }
        Ok(BuildTarget::None)
    }
}

/// A same-repository pull request merged by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrManualMergeParams {
    pub head_branch: String,
    pub commit: String,
    pub base_branch: String,
}

impl PrManualMergeParams {
    pub fn new(
        head_branch: impl Into<String>,
        commit: impl Into<String>,
        base_branch: impl Into<String>,
    ) -> Result<Self, ParameterValidationError> {
        let (head_branch, commit, base_branch) =
            (head_branch.into(), commit.into(), base_branch.into());
        if is_blank(&head_branch) {
            return Err(ParameterValidationError::new(
                "manual PR merge checkout strategy can not be used: no head branch specified",
            ));
        }
        if is_blank(&commit) {
            return Err(ParameterValidationError::new(
                "manual PR merge checkout strategy can not be used: no head branch commit hash specified",
            ));
        }
        if is_blank(&base_branch) {
            return Err(ParameterValidationError::new(
                "manual PR merge checkout strategy can not be used: no base branch specified",
            ));
        }
        Ok(Self {
            head_branch,
            commit,
            base_branch,
        })
    }
}

/// A pull request opened from a fork, merged by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkPrManualMergeParams {
    pub head_branch: String,
    pub head_repo_url: String,
    pub base_branch: String,
}

impl ForkPrManualMergeParams {
    pub fn new(
        head_branch: impl Into<String>,
        head_repo_url: impl Into<String>,
        base_branch: impl Into<String>,
    ) -> Result<Self, ParameterValidationError> {
        let (head_branch, head_repo_url, base_branch) =
            (head_branch.into(), head_repo_url.into(), base_branch.into());
        if is_blank(&head_branch) {
            return Err(ParameterValidationError::new(
                "manual PR (fork) merge checkout strategy can not be used: no head branch specified",
            ));
        }
        if is_blank(&head_repo_url) {
            return Err(ParameterValidationError::new(
                "manual PR (fork) merge checkout strategy can not be used: no head repository URL specified",
            ));
        }
        if is_blank(&base_branch) {
            return Err(ParameterValidationError::new(
                "manual PR (fork) merge checkout strategy can not be used: no base branch specified",
            ));
        }
        Ok(Self {
            head_branch,
            head_repo_url,
            base_branch,
        })
    }
}

/// Where a pull request's unified diff can be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSource {
    pub build_url: String,
    pub api_token: String,
    /// Used to name the downloaded patch file.
    pub pr_id: Option<String>,
}

impl DiffSource {
    pub fn new(
        build_url: impl Into<String>,
        api_token: impl Into<String>,
        pr_id: Option<String>,
    ) -> Result<Self, ParameterValidationError> {
        let (build_url, api_token) = (build_url.into(), api_token.into());
        if is_blank(&build_url) {
            return Err(ParameterValidationError::new(
                "PR diff download can not be used: no build URL specified",
            ));
        }
        if is_blank(&api_token) {
            return Err(ParameterValidationError::new(
                "PR diff download can not be used: no build API token specified",
            ));
        }
        Ok(Self {
            build_url,
            api_token,
            pr_id: pr_id.filter(|id| !is_blank(id)),
        })
    }

    /// `{build_url}/diff.txt`, without the token query.
    pub fn diff_url(&self) -> String {
        format!("{}/diff.txt", self.build_url.trim_end_matches('/'))
    }
}

/// A pull request whose merge was computed by the hosting provider, either as
/// a merge ref or as a downloadable patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrAutoMergeParams {
    pub merge_branch: Option<String>,
    pub diff: Option<DiffSource>,
    pub base_branch: String,
}

impl PrAutoMergeParams {
    pub fn new(
        merge_branch: Option<String>,
        diff: Option<DiffSource>,
        base_branch: impl Into<String>,
    ) -> Result<Self, ParameterValidationError> {
        let merge_branch = merge_branch.filter(|b| !is_blank(b));
        let base_branch = base_branch.into();
        if merge_branch.is_none() && diff.is_none() {
            return Err(ParameterValidationError::new(
                "auto PR merge checkout strategy can not be used: no merge branch or diff source specified",
            ));
        }
        if diff.is_some() && is_blank(&base_branch) {
            return Err(ParameterValidationError::new(
                "auto PR merge checkout strategy can not be used: no base branch specified for applying the diff",
            ));
        }
        Ok(Self {
            merge_branch,
            diff,
            base_branch,
        })
    }

    /// The provider merge ref as a full ref name (`pull/5/merge` becomes
    /// `refs/pull/5/merge`).
    pub fn merge_ref(&self) -> Option<String> {
        self.merge_branch.as_deref().map(|branch| {
            if branch.starts_with("refs/") {
                branch.to_string()
            } else {
                format!("refs/{}", branch)
            }
        })
    }

    /// Local ref the merge ref is fetched into: the merge ref without its
    /// `/merge` suffix.
    pub fn local_merge_ref(&self) -> Option<String> {
        self.merge_ref().map(|merge_ref| {
            merge_ref
                .strip_suffix(MERGE_REF_SUFFIX)
                .map(str::to_string)
                .unwrap_or(merge_ref)
        })
    }
}
