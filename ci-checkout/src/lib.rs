//! ci-checkout: check out the revision a CI build asks for.
//!
//! Plain builds check out a commit, tag or branch; pull request builds are
//! merged, either with the hosting provider's merge ref or diff or by hand.
//! Fetches retry on transient failures and checkouts or merges that fail on a
//! shallow clone are retried once with full history.

pub mod checkout;
pub mod cli;
pub mod config;
pub mod context;
pub mod diff;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod repo;
pub mod report;
pub mod runner;
pub mod selector;
pub mod strategy;
pub mod unshallow;

#[cfg(test)]
mod testing;

// Re-export core types for convenience
pub use ci_checkout_core::{
    BuildTarget, CommandError, FetchOptions, FetchRef, Git, GitCommand,
    ParameterValidationError, RetryPolicy,
};

pub use checkout::Checkout;
pub use cli::Cli;
pub use config::Config;
pub use context::CheckoutContext;
pub use diff::{DiffError, DiffFetcher, HttpDiffFetcher};
pub use error::CheckoutError;
pub use report::{CheckoutReport, JsonReporter, ReportError, Reporter, TerminalReporter};
pub use runner::{CommandExecutor, ProcessExecutor, Runner};
pub use selector::{select_strategy, CheckoutInputs};
pub use strategy::{CheckoutStrategy, PrAutoMerge};
pub use unshallow::{ResetUnshallow, SimpleUnshallow, UnshallowFallback};
