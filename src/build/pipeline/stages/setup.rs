//! Build directory setup stage.

use crate::build::mirror::mirror;
use crate::build::pipeline::{BuildContext, PipelineError};

/// Mirror the source tree and register its pages.
pub fn run(ctx: &mut BuildContext) -> Result<(), PipelineError> {
    let stats = mirror(ctx)?;
    tracing::debug!(
        directories = stats.directories,
        files = stats.files,
        pages = stats.pages,
        "mirrored source tree"
    );
    ctx.mirror = stats;
    Ok(())
}
