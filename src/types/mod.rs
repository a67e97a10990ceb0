//! Core types shared by the analysis pipeline.
//!
//! - [`RenderedPage`] - DOM and timing captured by a browser session
//! - [`Report`] - the per-request analysis result

mod page;
mod report;

pub use page::RenderedPage;
pub use report::Report;
