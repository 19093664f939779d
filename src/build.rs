pub mod anchors;
pub mod capture;
pub mod document;
pub mod doctest;
pub mod markdown;
pub mod mirror;
pub mod page;
pub mod paths;
pub mod pipeline;
pub mod render;

pub use mirror::{MirrorStats, mirror};
pub use page::{Page, PageRegistry};
pub use paths::base_path_from_config;
pub use pipeline::{BuildContext, PipelineError, build_document};
