//! Build pipeline.
//!
//! A pipeline is a [`Family`] of stage descriptors driven by [`run`]: the
//! runner repeatedly asks [`select`] for the next applicable stage, executes
//! it and excludes it from further selection, until nothing is left.
//!
//! The document pipeline ([`document_family`]) is one such family:
//! 1. Setup build directory (mirror the source tree)
//! 2. Redirect output streams
//! 3. Expand templates
//! 4. Cross references
//! 5. Check document (missing docs, doctests)
//! 6. Restore output streams
//! 7. Render document
//!
//! New stages can be added to a family by registering another descriptor;
//! the runner does not change.

mod context;
mod dispatch;
mod error;
mod stages;

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

pub use context::BuildContext;
pub use dispatch::{DispatchError, Family, Selection, Variant, select};
pub use error::PipelineError;
pub use stages::{DocumentFamily, DocumentStage, document_family};

/// Run a family to completion.
///
/// Each matching variant executes at most once, in non-decreasing order.
/// The first error (from dispatch or from an action) aborts the run; side
/// effects of earlier variants are kept.
pub fn run<C, T, E>(family: &Family<C, T, E>, ctx: &mut C) -> Result<(), E>
where
    T: Copy + Eq + Hash + Debug,
    E: From<DispatchError>,
{
    let mut visited: HashSet<T> = HashSet::new();

    loop {
        let variant = match select(family, ctx, &visited)? {
            Selection::Variant(variant) => variant,
            Selection::Terminal => return Ok(()),
        };

        tracing::debug!(
            family = family.name(),
            stage = ?variant.tag,
            order = variant.order,
            "running stage"
        );
        variant.execute(ctx)?;
        visited.insert(variant.tag);
    }
}

/// Run the document pipeline over `ctx`.
///
/// If the run fails while output is redirected, the capture is released
/// before the error is returned.
pub fn build_document(ctx: &mut BuildContext) -> Result<(), PipelineError> {
    let family = document_family();
    let result = run(&family, ctx);

    if result.is_err()
        && let Some(capture) = ctx.capture.take()
    {
        ctx.captured_output = capture.release();
        tracing::debug!(
            bytes = ctx.captured_output.len(),
            "released output capture after failure"
        );
    }

    result
}
