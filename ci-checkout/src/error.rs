use std::path::PathBuf;

use ci_checkout_core::{CommandError, ParameterValidationError};
use thiserror::Error;

/// Terminal failures of a checkout.
///
/// Recoverable failures (transient fetch errors, shallow history) are handled
/// before one of these is produced; every variant names the operation and the
/// ref, commit, URL or path involved.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Required input missing for the selected strategy.
    #[error(transparent)]
    Parameter(#[from] ParameterValidationError),

    /// Fetch still failing after every retry.
    #[error("Fetch failed ({target}): {source}")]
    Fetch {
        target: String,
        #[source]
        source: CommandError,
    },

    /// Checkout failed, including after any unshallow fallback.
    #[error("Checkout failed ({arg}): {source}")]
    Checkout {
        arg: String,
        #[source]
        source: CommandError,
    },

    /// Merge failed, including after any unshallow fallback.
    #[error("Merge failed ({arg}): {source}")]
    Merge {
        arg: String,
        #[source]
        source: CommandError,
    },

    #[error("Detaching HEAD failed: {0}")]
    DetachHead(#[source] CommandError),

    #[error("Unshallow failed: {0}")]
    Unshallow(#[source] CommandError),

    #[error("Reset repository failed: {0}")]
    Reset(#[source] CommandError),

    #[error("Adding remote fork repository failed ({url}): {source}")]
    RemoteAdd {
        url: String,
        #[source]
        source: CommandError,
    },

    #[error("Can't apply patch ({}): {source}", .patch.display())]
    Apply {
        patch: PathBuf,
        #[source]
        source: CommandError,
    },

    /// Neither the merge ref nor the diff could be used and falling back to a
    /// manual merge is disabled.
    #[error("There is no Pull Request branch and can't download diff file ({details})")]
    AutoMergeUnavailable { details: String },

    #[error("Manual merge fallback failed: {0}")]
    ManualMergeFallback(#[source] Box<CheckoutError>),

    /// The working directory can not be used for this repository.
    #[error("Repository setup failed in {}: {message}", .dir.display())]
    Workspace { dir: PathBuf, message: String },

    #[error("Git command failed: {0}")]
    Git(#[from] CommandError),

    #[error("Failed to read checkout result: {0}")]
    Report(String),
}
