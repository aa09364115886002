//! Core types for Portar: artifact location, status classification and
//! aggregate reporting for a port-migration workspace.
//!
//! Everything here is synchronous, re-derived from the filesystem on every
//! query, and total — no filesystem state makes classification fail. The
//! external pipeline (builders, renderers, comparators) owns the artifacts;
//! this crate only reads them.

mod error;
pub mod layout;
pub mod report;
pub mod status;

pub use error::CoreError;
pub use layout::{
    artifact_stem, output_ext, Artifact, ArtifactSet, Freshness, Layout, LayoutConfig,
    MACRO_EXAMPLE,
};
pub use report::{all_examples, summarize, AggregateReport, ExampleRow};
pub use status::{
    classify, classify_set, scan_result_text, Classification, Signals, Status, Verdict,
    MATCH_KEYWORDS,
};
