// # Local Transport
//
// In-process implementation of the data synchronisation contract.
//
// ## Purpose
//
// Lets plugins in the same process exchange key/value data without an
// external store. Useful for embedding, tests, and single-node setups.
//
// ## Delivery
//
// - Watching delivers one resync with the current values, then changes.
//   A watch whose resync sink is already closed fails and registers nothing
// - Events are delivered with `try_send`: a full sink loses that event
//   (logged), a closed sink ends its subscription
// - Nothing is persisted; all data is lost when the transport is dropped

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::Error;
use crate::traits::datasync::{
    ChangeEvent, KeyValPublisher, KeyValWatcher, KeyValue, PutDel, ResyncEvent, WatchRegistration,
};
use crate::traits::plugin::Plugin;

const PLUGIN_NAME: &str = "local-transport";

#[derive(Debug)]
struct Subscription {
    name: String,
    prefixes: Vec<String>,
    change_sink: mpsc::Sender<ChangeEvent>,
}

impl Subscription {
    fn matches(&self, key: &str) -> bool {
        self.prefixes.iter().any(|prefix| key.starts_with(prefix.as_str()))
    }
}

#[derive(Debug, Default)]
struct Inner {
    values: BTreeMap<String, KeyValue>,
    revision: i64,
    subscriptions: HashMap<u64, Subscription>,
    next_id: u64,
    closed: bool,
}

impl Inner {
    fn notify(&mut self, key: &str, change_type: PutDel, value: Option<Vec<u8>>, prev_value: Option<Vec<u8>>) {
        let revision = self.revision;
        let mut gone = Vec::new();

        for (id, sub) in self.subscriptions.iter().filter(|(_, sub)| sub.matches(key)) {
            let event = ChangeEvent::new(key, change_type, value.clone(), prev_value.clone(), revision);
            match sub.change_sink.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(subscriber = %sub.name, key, "Change sink full, dropping event");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(subscriber = %sub.name, "Change sink closed, removing subscription");
                    gone.push(*id);
                }
            }
        }

        for id in gone {
            self.subscriptions.remove(&id);
        }
    }
}

/// In-memory data synchronisation transport
///
/// # Example
///
/// ```rust,no_run
/// use agentkit_core::datasync::LocalTransport;
/// use agentkit_core::traits::{KeyValPublisher, KeyValWatcher};
/// use tokio::sync::mpsc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let transport = LocalTransport::new();
///     let (change_tx, mut change_rx) = mpsc::channel(16);
///     let (resync_tx, _resync_rx) = mpsc::channel(1);
///
///     let registration = transport
///         .watch_data("example", change_tx, resync_tx, &["config/".to_string()])
///         .await?;
///
///     transport.publish_data("config/iface", Some(b"\x08\x01")).await?;
///     let change = change_rx.recv().await;
///     assert!(change.is_some());
///
///     registration.release().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalTransport {
    inner: Arc<RwLock<Inner>>,
}

impl LocalTransport {
    /// Create an empty transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value stored under `key`
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let guard = self.inner.read().await;
        guard.values.get(key).map(|kv| kv.value.clone())
    }

    /// Number of active subscriptions
    pub async fn subscription_count(&self) -> usize {
        self.inner.read().await.subscriptions.len()
    }

    /// Latest revision issued
    pub async fn revision(&self) -> i64 {
        self.inner.read().await.revision
    }
}

#[async_trait]
impl KeyValWatcher for LocalTransport {
    async fn watch_data(
        &self,
        resync_name: &str,
        change_sink: mpsc::Sender<ChangeEvent>,
        resync_sink: mpsc::Sender<ResyncEvent>,
        key_prefixes: &[String],
    ) -> Result<Box<dyn WatchRegistration>, Error> {
        let mut guard = self.inner.write().await;
        if guard.closed {
            return Err(Error::plugin(PLUGIN_NAME, "transport is closed"));
        }

        let mut snapshot = HashMap::new();
        for prefix in key_prefixes {
            let values: Vec<KeyValue> = guard
                .values
                .range(prefix.clone()..)
                .take_while(|(key, _)| key.starts_with(prefix.as_str()))
                .map(|(_, kv)| kv.clone())
                .collect();
            snapshot.insert(prefix.clone(), values);
        }

        match resync_sink.try_send(ResyncEvent::new(snapshot)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(subscriber = resync_name, "Resync sink full, initial snapshot dropped");
            }
            Err(TrySendError::Closed(_)) => {
                return Err(Error::data_sync(format!(
                    "resync sink for {resync_name} is closed"
                )));
            }
        }

        let id = guard.next_id;
        guard.next_id += 1;
        guard.subscriptions.insert(
            id,
            Subscription {
                name: resync_name.to_string(),
                prefixes: key_prefixes.to_vec(),
                change_sink,
            },
        );
        debug!(subscriber = resync_name, id, prefixes = ?key_prefixes, "Registered watcher");

        Ok(Box::new(LocalRegistration {
            id,
            inner: Arc::downgrade(&self.inner),
        }))
    }
}

#[async_trait]
impl KeyValPublisher for LocalTransport {
    async fn publish_data(&self, key: &str, message: Option<&[u8]>) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        if guard.closed {
            return Err(Error::plugin(PLUGIN_NAME, "transport is closed"));
        }

        match message {
            Some(bytes) => {
                guard.revision += 1;
                let record = KeyValue {
                    key: key.to_string(),
                    value: bytes.to_vec(),
                    revision: guard.revision,
                };
                let prev = guard.values.insert(key.to_string(), record).map(|kv| kv.value);
                guard.notify(key, PutDel::Put, Some(bytes.to_vec()), prev);
            }
            None => {
                let Some(prev) = guard.values.remove(key) else {
                    return Ok(());
                };
                guard.revision += 1;
                guard.notify(key, PutDel::Delete, None, Some(prev.value));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Plugin for LocalTransport {
    async fn init(&self) -> Result<(), Error> {
        self.inner.write().await.closed = false;
        Ok(())
    }

    async fn close(&self) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        let dropped = guard.subscriptions.len();
        guard.subscriptions.clear();
        guard.closed = true;
        debug!(dropped, "Closed local transport");
        Ok(())
    }

    fn name(&self) -> &str {
        PLUGIN_NAME
    }
}

/// Registration handle returned by [`LocalTransport::watch_data`]
#[derive(Debug)]
pub struct LocalRegistration {
    id: u64,
    inner: Weak<RwLock<Inner>>,
}

#[async_trait]
impl WatchRegistration for LocalRegistration {
    async fn release(self: Box<Self>) -> Result<(), Error> {
        let Some(inner) = self.inner.upgrade() else {
            return Ok(());
        };
        let removed = inner.write().await.subscriptions.remove(&self.id);
        if let Some(sub) = removed {
            debug!(subscriber = %sub.name, id = self.id, "Released watcher");
        }
        Ok(())
    }
}
