//! Document pipeline stages.
//!
//! The document family runs seven stages, each once, in this order:
//!
//! 1. **SetupBuildDirectory** - Mirror the source tree into the build tree
//! 2. **RedirectOutputStreams** - Start capturing collaborator output
//! 3. **ExpandTemplates** - Expand Tera syntax in every registered page
//! 4. **CrossReferences** - Resolve `@ref` links between pages
//! 5. **CheckDocument** - Missing-documentation check, then doctests
//! 6. **RestoreOutputStreams** - Stop capturing output
//! 7. **RenderDocument** - Write every registered page to the build tree

mod check;
mod expand;
mod render;
mod setup;
mod streams;
mod xref;

use std::fmt;

use super::dispatch::{Family, Variant};
use super::{BuildContext, PipelineError};

type StageFn = fn(&mut BuildContext) -> Result<(), PipelineError>;

/// Tags of the document family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentStage {
    SetupBuildDirectory,
    RedirectOutputStreams,
    ExpandTemplates,
    CrossReferences,
    CheckDocument,
    RestoreOutputStreams,
    RenderDocument,
}

impl DocumentStage {
    /// Every stage, in registration order.
    pub const ALL: [DocumentStage; 7] = [
        DocumentStage::SetupBuildDirectory,
        DocumentStage::RedirectOutputStreams,
        DocumentStage::ExpandTemplates,
        DocumentStage::CrossReferences,
        DocumentStage::CheckDocument,
        DocumentStage::RestoreOutputStreams,
        DocumentStage::RenderDocument,
    ];

    pub fn order(self) -> f64 {
        match self {
            DocumentStage::SetupBuildDirectory => 1.0,
            DocumentStage::RedirectOutputStreams => 2.0,
            DocumentStage::ExpandTemplates => 3.0,
            DocumentStage::CrossReferences => 4.0,
            DocumentStage::CheckDocument => 5.0,
            DocumentStage::RestoreOutputStreams => 6.0,
            DocumentStage::RenderDocument => 7.0,
        }
    }

    /// Message logged when the stage starts.
    pub fn description(self) -> &'static str {
        match self {
            DocumentStage::SetupBuildDirectory => "setting up build directory",
            DocumentStage::RedirectOutputStreams => "redirecting output streams",
            DocumentStage::ExpandTemplates => "expanding templates",
            DocumentStage::CrossReferences => "resolving cross references",
            DocumentStage::CheckDocument => "checking document",
            DocumentStage::RestoreOutputStreams => "restoring output streams",
            DocumentStage::RenderDocument => "rendering document",
        }
    }

    fn action(self) -> StageFn {
        match self {
            DocumentStage::SetupBuildDirectory => setup::run,
            DocumentStage::RedirectOutputStreams => streams::redirect,
            DocumentStage::ExpandTemplates => expand::run,
            DocumentStage::CrossReferences => xref::run,
            DocumentStage::CheckDocument => check::run,
            DocumentStage::RestoreOutputStreams => streams::restore,
            DocumentStage::RenderDocument => render::run,
        }
    }
}

impl fmt::Display for DocumentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The document pipeline's dispatch family.
pub type DocumentFamily = Family<BuildContext, DocumentStage, PipelineError>;

/// Build the document family: every stage applies unconditionally and
/// nothing is strict, so a run executes all seven once, in order.
pub fn document_family() -> DocumentFamily {
    let mut family = Family::new("document");
    for stage in DocumentStage::ALL {
        let action = stage.action();
        family.register(Variant::new(stage, stage.order(), move |ctx: &mut BuildContext| {
            ctx.log(&format!("{stage}: {}.", stage.description()));
            action(ctx)
        }));
    }
    family
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_registers_all_stages_in_order() {
        let family = document_family();
        let tags: Vec<_> = family.variants().iter().map(|v| v.tag).collect();
        assert_eq!(tags, DocumentStage::ALL.to_vec());

        let orders: Vec<_> = family.variants().iter().map(|v| v.order).collect();
        assert_eq!(orders, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert!(family.variants().iter().all(|v| !v.strict));
    }

    #[test]
    fn test_every_stage_matches_any_context() {
        let family = document_family();
        let ctx = BuildContext::new("/nowhere", "/nowhere-build");
        assert!(family.variants().iter().all(|v| v.matches(&ctx)));
    }
}
