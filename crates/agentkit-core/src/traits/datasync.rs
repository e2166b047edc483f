// # Data Synchronisation Traits
//
// Defines the transport contract plugins use to watch and publish
// key/value data.
//
// ## Event sinks
//
// A watcher delivers two kinds of events on separate channels:
// - `ChangeEvent`: one key was put or deleted
// - `ResyncEvent`: the full current state under the subscribed prefixes
//
// No ordering is promised between the two channels. Payloads are opaque
// protobuf-encoded bytes; this crate never decodes them.
//
// ## Subscriptions
//
// `watch_data` returns a `WatchRegistration`. Releasing it revokes the
// subscription; no event is delivered afterwards.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};

/// Kind of change carried by an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PutDel {
    /// Create or update
    Put,
    /// Delete
    Delete,
}

/// Completion callback attached to an event
///
/// The receiving side reports how it handled the event; the sender may
/// await the outcome or ignore it.
pub type DoneCallback = oneshot::Sender<Result<(), String>>;

/// A single key changed
#[derive(Debug)]
pub struct ChangeEvent {
    /// Full key of the changed value
    pub key: String,
    /// Whether the key was put or deleted
    pub change_type: PutDel,
    /// New value (`None` on delete)
    pub value: Option<Vec<u8>>,
    /// Value before the change, if there was one
    pub prev_value: Option<Vec<u8>>,
    /// Transport revision of the change
    pub revision: i64,
    done: Option<DoneCallback>,
}

impl ChangeEvent {
    /// Create a change event without a completion callback
    pub fn new(
        key: impl Into<String>,
        change_type: PutDel,
        value: Option<Vec<u8>>,
        prev_value: Option<Vec<u8>>,
        revision: i64,
    ) -> Self {
        Self {
            key: key.into(),
            change_type,
            value,
            prev_value,
            revision,
            done: None,
        }
    }

    /// Attach a completion callback
    pub fn with_done(mut self, done: DoneCallback) -> Self {
        self.done = Some(done);
        self
    }

    /// Report the outcome of handling this event
    pub fn done(self, result: Result<(), crate::Error>) {
        report(self.done, result);
    }
}

/// A key and its current value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// Full key
    pub key: String,
    /// Encoded value
    pub value: Vec<u8>,
    /// Revision at which the value was written
    pub revision: i64,
}

/// Full state for every subscribed prefix
#[derive(Debug, Default)]
pub struct ResyncEvent {
    /// Current values grouped by the prefix that matched them
    pub values: HashMap<String, Vec<KeyValue>>,
    done: Option<DoneCallback>,
}

impl ResyncEvent {
    /// Create a resync event without a completion callback
    pub fn new(values: HashMap<String, Vec<KeyValue>>) -> Self {
        Self { values, done: None }
    }

    /// Attach a completion callback
    pub fn with_done(mut self, done: DoneCallback) -> Self {
        self.done = Some(done);
        self
    }

    /// Report the outcome of handling this event
    pub fn done(self, result: Result<(), crate::Error>) {
        report(self.done, result);
    }
}

fn report(done: Option<DoneCallback>, result: Result<(), crate::Error>) {
    if let Some(tx) = done {
        // The sender may have stopped waiting
        let _ = tx.send(result.map_err(|e| e.to_string()));
    }
}

/// Handle for an active subscription
#[async_trait]
pub trait WatchRegistration: Send + Sync {
    /// Revoke the subscription
    async fn release(self: Box<Self>) -> Result<(), crate::Error>;
}

/// Watches keys under a set of prefixes
#[async_trait]
pub trait KeyValWatcher: Send + Sync {
    /// Subscribe to changes under `key_prefixes`
    ///
    /// # Parameters
    ///
    /// - `resync_name`: subscriber name used in logs
    /// - `change_sink`: receives a `ChangeEvent` per changed key
    /// - `resync_sink`: receives a `ResyncEvent` with the full state
    /// - `key_prefixes`: prefixes to watch
    ///
    /// Fails with `Error::DataSync` if `resync_sink` is already closed; no
    /// subscription is created in that case.
    async fn watch_data(
        &self,
        resync_name: &str,
        change_sink: mpsc::Sender<ChangeEvent>,
        resync_sink: mpsc::Sender<ResyncEvent>,
        key_prefixes: &[String],
    ) -> Result<Box<dyn WatchRegistration>, crate::Error>;
}

/// Publishes values under keys
#[async_trait]
pub trait KeyValPublisher: Send + Sync {
    /// Publish an encoded message under `key`; `None` deletes the key
    async fn publish_data(&self, key: &str, message: Option<&[u8]>) -> Result<(), crate::Error>;
}

/// A transport that can both watch and publish
pub trait DataSyncTransport: KeyValWatcher + KeyValPublisher {}

impl<T: KeyValWatcher + KeyValPublisher> DataSyncTransport for T {}
