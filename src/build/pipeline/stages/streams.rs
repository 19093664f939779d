//! Output redirection stages.
//!
//! The capture handle lives in the context between the two stages. If a
//! stage in between fails, [`crate::build::pipeline::build_document`]
//! releases the handle before returning the error.

use crate::build::capture::OutputCapture;
use crate::build::pipeline::{BuildContext, PipelineError};

/// Acquire the process-wide output capture.
pub fn redirect(ctx: &mut BuildContext) -> Result<(), PipelineError> {
    if ctx.capture.is_some() {
        return Err(PipelineError::stage(
            "RedirectOutputStreams",
            "output is already redirected for this build",
        ));
    }
    ctx.capture = Some(OutputCapture::acquire()?);
    Ok(())
}

/// Release the capture acquired by [`redirect`].
pub fn restore(ctx: &mut BuildContext) -> Result<(), PipelineError> {
    match ctx.capture.take() {
        Some(capture) => {
            ctx.captured_output = capture.release();
            tracing::debug!(bytes = ctx.captured_output.len(), "released output capture");
        }
        None => tracing::warn!("no output capture to release"),
    }
    Ok(())
}
