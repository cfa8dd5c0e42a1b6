//! Core types and utilities for ci-checkout.
//!
//! This crate holds the pieces of the checkout engine that do not execute
//! anything themselves: the structured git operation model, the validated
//! build parameters, fetch options and refspecs, and the retry policy.

pub mod error;
pub mod fetch;
pub mod git;
pub mod params;
pub mod retry;

// Re-export main types for convenience
pub use error::{CommandError, ParameterValidationError};
pub use fetch::{FetchOptions, FetchRef, BRANCH_REF_PREFIX, DEFAULT_REMOTE, FORK_REMOTE, TAG_REF_PREFIX};
pub use git::{Git, GitCommand};
pub use params::{
    BranchParams, BuildTarget, CommitParams, DiffSource, ForkPrManualMergeParams,
    PrAutoMergeParams, PrManualMergeParams, TagParams,
};
pub use retry::RetryPolicy;
