//! # Tracebench Types
//!
//! Shared data model for the tracebench workspace: the test cases a sweep is
//! made of, their results, the metrics reconciled from a fetched trace and the
//! comparative report built at the end of a sweep.

pub mod metrics;
pub mod report;
pub mod runner;

pub use metrics::*;
pub use report::*;
pub use runner::*;

/// Raw trace record as returned by the observability backend.
///
/// The document is schema-less: any map value or sequence element may hold
/// further observations, so it is kept as a generic JSON tree.
pub type TraceDocument = serde_json::Value;
