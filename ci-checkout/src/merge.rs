//! Checkout and merge with one unshallow-and-retry.
//!
//! Most checkout and merge failures on CI clones come from history cut off by
//! a shallow fetch. The primary operation runs once; on failure the given
//! fallback deepens the clone and the operation runs exactly once more.

use ci_checkout_core::{CommandError, GitCommand};
use tracing::{info, warn};

use crate::context::CheckoutContext;
use crate::error::CheckoutError;
use crate::unshallow::UnshallowFallback;

#[derive(Debug, Clone, Copy)]
enum Operation {
    Checkout,
    Merge,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Checkout => "checkout",
            Operation::Merge => "merge",
        }
    }

    fn command(self, ctx: &CheckoutContext<'_>, arg: &str) -> GitCommand {
        match self {
            Operation::Checkout => ctx.git.checkout(arg),
            Operation::Merge => ctx.git.merge(arg),
        }
    }

    fn error(self, arg: &str, source: CommandError) -> CheckoutError {
        let arg = arg.to_string();
        match self {
            Operation::Checkout => CheckoutError::Checkout { arg, source },
            Operation::Merge => CheckoutError::Merge { arg, source },
        }
    }
}

/// `git checkout <arg>`, unshallowing with `fallback` and retrying once on
/// failure.
pub fn checkout_with_fallback(
    ctx: &CheckoutContext<'_>,
    arg: &str,
    fallback: Option<&dyn UnshallowFallback>,
) -> Result<(), CheckoutError> {
    attempt(ctx, Operation::Checkout, arg, fallback)
}

/// `git merge <arg>`, unshallowing with `fallback` and retrying once on
/// failure.
pub fn merge_with_fallback(
    ctx: &CheckoutContext<'_>,
    arg: &str,
    fallback: Option<&dyn UnshallowFallback>,
) -> Result<(), CheckoutError> {
    attempt(ctx, Operation::Merge, arg, fallback)
}

/// Point HEAD straight at the current commit.
pub fn detach_head(ctx: &CheckoutContext<'_>) -> Result<(), CheckoutError> {
    ctx.runner
        .run(&ctx.git.checkout_detach())
        .map_err(CheckoutError::DetachHead)
}

fn attempt(
    ctx: &CheckoutContext<'_>,
    operation: Operation,
    arg: &str,
    fallback: Option<&dyn UnshallowFallback>,
) -> Result<(), CheckoutError> {
    let cmd = operation.command(ctx, arg);
    let first = match ctx.runner.run(&cmd) {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };

    let Some(fallback) = fallback else {
        return Err(operation.error(arg, first));
    };
    if ctx.unshallowed() {
        warn!(operation = operation.name(), arg, "history already unshallowed in this checkout, not retrying");
        return Err(operation.error(arg, first));
    }
    if !is_shallow(ctx) {
        info!(operation = operation.name(), arg, "repository is not shallow, not retrying");
        return Err(operation.error(arg, first));
    }

    warn!(
        operation = operation.name(),
        arg,
        error = %first,
        fallback = fallback.name(),
        "failed on a shallow clone, retrying with full history"
    );
    fallback.unshallow(ctx)?;
    ctx.mark_unshallowed();

    ctx.runner
        .run(&cmd)
        .map_err(|source| operation.error(arg, source))
}

/// Anything other than a plain `false` counts as shallow, so a git too old to
/// answer still gets the fallback.
fn is_shallow(ctx: &CheckoutContext<'_>) -> bool {
    match ctx.runner.run_for_output(&ctx.git.is_shallow()) {
        Ok(output) => output.trim() != "false",
        Err(err) => {
            warn!(error = %err, "could not tell whether the repository is shallow");
            true
        }
    }
}
