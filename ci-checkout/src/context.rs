use std::cell::Cell;

use ci_checkout_core::{FetchOptions, Git};

use crate::diff::DiffFetcher;
use crate::runner::Runner;

/// Everything a strategy needs for one checkout call.
///
/// A context lives for exactly one call: it also tracks whether the clone has
/// already been unshallowed, so the fallback escalates at most once.
pub struct CheckoutContext<'a> {
    pub git: Git,
    pub runner: Runner<'a>,
    pub fetch_options: FetchOptions,
    pub diff_fetcher: &'a dyn DiffFetcher,
    unshallowed: Cell<bool>,
}

impl<'a> CheckoutContext<'a> {
    pub fn new(
        git: Git,
        runner: Runner<'a>,
        fetch_options: FetchOptions,
        diff_fetcher: &'a dyn DiffFetcher,
    ) -> Self {
        Self {
            git,
            runner,
            fetch_options,
            diff_fetcher,
            unshallowed: Cell::new(false),
        }
    }

    /// Whether an unshallow fallback already ran during this call.
    pub fn unshallowed(&self) -> bool {
        self.unshallowed.get()
    }

    pub(crate) fn mark_unshallowed(&self) {
        self.unshallowed.set(true);
    }
}
