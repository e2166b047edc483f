// # Latency Tracer
//
// Append-only ledger of named durations.
//
// ## Concurrency
//
// A single mutex serialises `record`, `get` and `clear`. Indexes are
// handed out in lock-acquisition order, so concurrent appenders never
// share an index. `get` copies the ledger under the lock and returns an
// owned `Trace`; later appends or clears never reach an earlier snapshot.
//
// ## Optional tracers
//
// Call sites that may or may not be instrumented hold an
// `Option<Arc<dyn LatencyTracer>>` and resolve it with [`or_noop`]; the
// `NoopTracer` silently drops everything.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::model::{Average, Trace, TracedEntry, format_duration};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Capability shared by real and silent tracers
pub trait LatencyTracer: Send + Sync {
    /// Record the time elapsed since `start` under `entity`
    fn log_time(&self, entity: &str, start: Instant) {
        self.record(entity, start.elapsed());
    }

    /// Record an already measured duration under `entity`
    fn record(&self, entity: &str, duration: Duration);

    /// Snapshot the ledger
    fn get(&self) -> Trace;

    /// Drop all entries; the index counter keeps counting
    fn clear(&self);
}

#[derive(Debug, Clone)]
struct TraceEntry {
    index: u32,
    name: String,
    duration: Duration,
}

#[derive(Debug)]
struct Ledger {
    next_index: u32,
    entries: Vec<TraceEntry>,
}

/// In-memory latency tracer
///
/// # Index limit
///
/// Indexes are `u32`, matching the wire form. The first `u32::MAX`
/// entries get distinct, increasing indexes. After that the counter
/// stays at `u32::MAX`, and every later entry repeats that index
/// instead of wrapping back to 1. Create a fresh tracer before that
/// point if unique indexes matter.
///
/// # Example
///
/// ```rust
/// use agentkit_core::measure::{LatencyTracer, Tracer};
/// use std::time::Instant;
///
/// let tracer = Tracer::new("vpp-calls");
/// let start = Instant::now();
/// // ... timed work ...
/// tracer.log_time("interface-dump", start);
///
/// let trace = tracer.get();
/// assert_eq!(trace.traced_entries.len(), 1);
/// assert_eq!(trace.traced_entries[0].index, 1);
/// ```
#[derive(Debug)]
pub struct Tracer {
    name: String,
    ledger: Mutex<Ledger>,
}

impl Tracer {
    /// Create an empty tracer owned by `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ledger: Mutex::new(Ledger {
                next_index: 1,
                entries: Vec::new(),
            }),
        }
    }

    /// Owner label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries currently in the ledger
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if the ledger is empty
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        // No operation can leave the ledger half-updated, so a poisoned
        // lock still guards consistent data.
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LatencyTracer for Tracer {
    fn record(&self, entity: &str, duration: Duration) {
        let mut ledger = self.lock();
        let index = ledger.next_index;
        // Saturates at u32::MAX rather than wrapping back onto issued indexes
        ledger.next_index = ledger.next_index.saturating_add(1);
        ledger.entries.push(TraceEntry {
            index,
            name: entity.to_string(),
            duration,
        });
        trace!(tracer = %self.name, entity, index, ?duration, "Recorded latency");
    }

    fn get(&self) -> Trace {
        let ledger = self.lock();

        let mut traced_entries = Vec::with_capacity(ledger.entries.len());
        let mut totals: Vec<(&str, u128, u128)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut overall: u128 = 0;

        for entry in &ledger.entries {
            let nanos = entry.duration.as_nanos();
            overall = overall.saturating_add(nanos);

            traced_entries.push(TracedEntry {
                index: entry.index,
                msg_name: entry.name.clone(),
                duration: format_duration(entry.duration),
            });

            let pos = *positions.entry(entry.name.as_str()).or_insert_with(|| {
                totals.push((entry.name.as_str(), 0, 0));
                totals.len() - 1
            });
            let (_, sum, count) = &mut totals[pos];
            *sum = sum.saturating_add(nanos);
            *count += 1;
        }

        let average_times = totals
            .into_iter()
            .map(|(name, sum, count)| Average {
                msg_name: name.to_string(),
                average_time: format_duration(duration_from_nanos(sum / count)),
            })
            .collect();

        Trace {
            traced_entries,
            average_times,
            overall: format_duration(duration_from_nanos(overall)),
        }
    }

    fn clear(&self) {
        let mut ledger = self.lock();
        let dropped = ledger.entries.len();
        ledger.entries.clear();
        debug!(tracer = %self.name, dropped, "Cleared latency ledger");
    }
}

fn duration_from_nanos(nanos: u128) -> Duration {
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    // Remainder is always below one second
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    Duration::new(secs, subsec)
}

/// Tracer that records nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl LatencyTracer for NoopTracer {
    fn record(&self, _entity: &str, _duration: Duration) {}

    fn get(&self) -> Trace {
        Trace::empty()
    }

    fn clear(&self) {}
}

/// Resolve an optional tracer handle, falling back to [`NoopTracer`]
pub fn or_noop(tracer: Option<Arc<dyn LatencyTracer>>) -> Arc<dyn LatencyTracer> {
    tracer.unwrap_or_else(|| Arc::new(NoopTracer))
}
