//! # Tracebench Trace
//!
//! Interprets the hierarchical traces an observability backend records for
//! one agent execution.
//!
//! - [`locator`] walks a schema-less trace document and collects observation
//!   nodes at any depth.
//! - [`duration`] resolves a single observation's duration through a fixed
//!   fallback ladder.
//! - [`execution_time`] computes covered wall-clock time as the union of all
//!   observation intervals.
//! - [`metrics`] folds everything into one [`TraceMetrics`] record.
//! - [`fetcher`] retrieves trace documents over HTTP.

pub mod duration;
pub mod error;
pub mod execution_time;
pub mod fetcher;
pub mod locator;
pub mod metrics;
pub mod timestamp;

pub use duration::reconcile_duration_ms;
pub use error::FetchError;
pub use execution_time::{reconcile_execution_time, ExecutionTime, Interval};
pub use fetcher::{LangfuseClient, LangfuseConfig, TraceSource};
pub use locator::{find_generations, find_observations};
pub use metrics::parse_trace_metrics;

pub use tracebench_types::{ReconciledGeneration, TraceDocument, TraceMetrics};
