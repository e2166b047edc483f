//! Contracts for the host framework
//!
//! This module defines the abstract interfaces that plugins and
//! transports implement.
//!
//! - [`Plugin`] / [`PostInit`]: plugin lifecycle hooks
//! - [`KeyValWatcher`] / [`KeyValPublisher`]: data synchronisation transport
//! - [`PutDel`]: create-or-update versus delete

pub mod datasync;
pub mod plugin;

pub use datasync::{
    ChangeEvent, DataSyncTransport, DoneCallback, KeyValPublisher, KeyValWatcher, KeyValue,
    PutDel, ResyncEvent, WatchRegistration,
};
pub use plugin::{Plugin, PostInit};
