//! Fetch options and refspec construction.

/// Remote the repository was cloned from.
pub const DEFAULT_REMOTE: &str = "origin";
/// Remote added on demand for pull requests opened from a fork.
pub const FORK_REMOTE: &str = "fork";
/// Prefix of branch refs.
pub const BRANCH_REF_PREFIX: &str = "refs/heads/";
/// Prefix of tag refs.
pub const TAG_REF_PREFIX: &str = "refs/tags/";

/// Governs how much history a fetch brings in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchOptions {
    /// Number of commits to fetch from each tip; `None` fetches full history.
    pub depth: Option<u32>,
    /// Fetch all tags (`--tags`) instead of none (`--no-tags`).
    pub tags: bool,
}

impl FetchOptions {
    /// Create fetch options. A depth of `0` means unbounded.
    pub fn new(depth: u32, tags: bool) -> Self {
        Self {
            depth: (depth > 0).then_some(depth),
            tags,
        }
    }

    /// Whether fetches made with these options produce a shallow clone.
    pub fn is_shallow(&self) -> bool {
        self.depth.is_some()
    }

    /// Options for a zero-based retry attempt: a shallow depth doubles with
    /// every retry, full-history fetches stay unbounded.
    pub fn for_attempt(&self, attempt: u32) -> Self {
        let factor = 2u32.saturating_pow(attempt);
        Self {
            depth: self.depth.map(|depth| depth.saturating_mul(factor)),
            tags: self.tags,
        }
    }

    /// Arguments following `git fetch` for an optional target.
    ///
    /// Without a target the remote's default refspecs are fetched.
    pub fn fetch_args(&self, target: Option<&FetchRef>) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(depth) = self.depth {
            args.push(format!("--depth={}", depth));
        }
        if self.tags {
            args.push("--tags".to_string());
        } else {
            args.push("--no-tags".to_string());
        }
        if let Some(target) = target {
            args.push(target.remote.clone());
            args.push(target.refspec());
        }
        args
    }
}

/// A ref to fetch from a named remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRef {
    /// Remote name, e.g. `origin`.
    pub remote: String,
    /// Full ref name, e.g. `refs/heads/main`.
    pub reference: String,
}

impl FetchRef {
    pub fn new(remote: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            reference: reference.into(),
        }
    }

    /// A ref on `origin`.
    pub fn origin(reference: impl Into<String>) -> Self {
        Self::new(DEFAULT_REMOTE, reference)
    }

    /// The branch `name` on `remote`.
    pub fn branch(remote: impl Into<String>, name: &str) -> Self {
        Self::new(remote, format!("{}{}", BRANCH_REF_PREFIX, name))
    }

    /// The tag `name` on `remote`.
    pub fn tag(remote: impl Into<String>, name: &str) -> Self {
        Self::new(remote, format!("{}{}", TAG_REF_PREFIX, name))
    }

    /// Branch name if this is a branch ref.
    pub fn branch_name(&self) -> Option<&str> {
        self.reference.strip_prefix(BRANCH_REF_PREFIX)
    }

    /// The refspec passed to `git fetch`.
    ///
    /// Branches land in `refs/remotes/<remote>/<branch>`, tags keep their own
    /// name, explicit `src:dst` specs and any other ref are passed verbatim.
    pub fn refspec(&self) -> String {
        if self.reference.contains(':') {
            return self.reference.clone();
        }
        if let Some(branch) = self.branch_name() {
            return format!(
                "{}:refs/remotes/{}/{}",
                self.reference, self.remote, branch
            );
        }
        if self.reference.starts_with(TAG_REF_PREFIX) {
            return format!("{}:{}", self.reference, self.reference);
        }
        self.reference.clone()
    }
}
