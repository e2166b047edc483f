// # Data Sync Transports
//
// Implementations of the data synchronisation traits.

pub mod memory;

pub use memory::{LocalRegistration, LocalTransport};
