//! Call-latency measurement
//!
//! - [`Tracer`]: thread-safe ledger of named durations
//! - [`NoopTracer`]: silent sink for uninstrumented call sites
//! - [`Trace`]: value snapshot with per-entry, per-name average and overall figures

pub mod model;
pub mod tracer;

pub use model::{Average, Trace, TracedEntry, format_duration};
pub use tracer::{LatencyTracer, NoopTracer, Tracer, or_noop};
