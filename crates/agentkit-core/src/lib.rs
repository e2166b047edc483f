// # agentkit-core
//
// Shared building blocks for agent plugins.
//
// ## Overview
//
// - **Plugin / PostInit**: lifecycle hooks the host framework calls
// - **KeyValWatcher / KeyValPublisher**: data synchronisation contract
// - **LocalTransport**: in-process implementation of that contract
// - **parse_ip_with_prefix / diff_addresses**: interface address
//   reconciliation against a live network stack
// - **Tracer**: thread-safe latency ledger with average/overall reporting
//
// ## Design Principles
//
// 1. **Contracts first**: the host framework depends on traits, not types
// 2. **No global state**: tracers are per-instance, parsers are pure
// 3. **Owned snapshots**: nothing returned to a caller aliases internal state

pub mod addr;
pub mod config;
pub mod datasync;
pub mod error;
pub mod measure;
pub mod traits;

// Re-export core types for convenience
pub use addr::{AddressDiff, IpVersion, NetAddr, diff_addresses, mac_int_to_string, parse_ip_with_prefix};
pub use config::TlsConfig;
pub use datasync::LocalTransport;
pub use error::{Error, Result};
pub use measure::{LatencyTracer, NoopTracer, Trace, Tracer};
pub use traits::{KeyValPublisher, KeyValWatcher, Plugin, PostInit, PutDel};
