//! Staged documentation builder.
//!
//! A build mirrors a source tree into a build tree, then runs each markdown
//! page through an ordered pipeline of stages (template expansion, cross
//! references, checks, rendering). The pipeline itself is a generic ordered
//! dispatch table, see [`build::pipeline`].

pub mod build;
pub mod config;
