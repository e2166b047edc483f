//! Contract Test: Data Sync Transport & Plugin Hooks
//!
//! Constraints verified:
//! - Watching delivers a resync with the current state under each prefix
//! - Published changes reach matching subscribers with put/delete tags
//! - Releasing a registration stops delivery
//! - Plugins see init before after_init, and close on shutdown
//!
//! If this test fails, plugins cannot rely on the transport contract.

mod common;

use agentkit_core::datasync::LocalTransport;
use agentkit_core::measure::{LatencyTracer, Tracer};
use agentkit_core::traits::{DataSyncTransport, KeyValPublisher, KeyValWatcher, Plugin, PutDel};
use common::*;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

fn prefixes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn resync_carries_existing_state() {
    let transport = LocalTransport::new();
    transport.publish_data("config/if/eth0", Some(b"a")).await.unwrap();
    transport.publish_data("config/if/eth1", Some(b"b")).await.unwrap();
    transport.publish_data("config/route/r1", Some(b"c")).await.unwrap();
    transport.publish_data("configx/other", Some(b"d")).await.unwrap();

    let (change_tx, _change_rx) = mpsc::channel(8);
    let (resync_tx, mut resync_rx) = mpsc::channel(1);
    let _reg = transport
        .watch_data("resync", change_tx, resync_tx, &prefixes(&["config/if/", "config/route/"]))
        .await
        .unwrap();

    let resync = resync_rx.recv().await.unwrap();
    let ifaces: Vec<&str> = resync.values["config/if/"].iter().map(|kv| kv.key.as_str()).collect();
    assert_eq!(ifaces, vec!["config/if/eth0", "config/if/eth1"]);
    assert_eq!(resync.values["config/route/"].len(), 1);
    assert_eq!(resync.values["config/route/"][0].value, b"c".to_vec());
}

#[tokio::test]
async fn release_stops_delivery() {
    let transport = LocalTransport::new();
    let (change_tx, mut change_rx) = mpsc::channel(8);
    let (resync_tx, _resync_rx) = mpsc::channel(1);

    let reg = transport
        .watch_data("release", change_tx, resync_tx, &prefixes(&["k/"]))
        .await
        .unwrap();
    transport.publish_data("k/1", Some(b"x")).await.unwrap();
    assert!(change_rx.recv().await.is_some());

    reg.release().await.unwrap();
    assert_eq!(transport.subscription_count().await, 0);

    transport.publish_data("k/2", Some(b"y")).await.unwrap();
    // The sender was dropped with the subscription
    assert!(change_rx.recv().await.is_none());
}

#[tokio::test]
async fn plugin_applies_changes_through_transport() {
    let transport: Arc<LocalTransport> = Arc::new(LocalTransport::new());
    let tracer = Arc::new(Tracer::new("apply"));
    let plugin = ApplyingPlugin::new(tracer.clone());

    // Host-side lifecycle: every init, then post-init hooks
    let plugins: Vec<&dyn Plugin> = vec![&*transport as &dyn Plugin, &plugin];
    for p in &plugins {
        p.init().await.unwrap();
    }
    for p in &plugins {
        if let Some(post) = p.as_post_init() {
            post.after_init().await.unwrap();
        }
    }
    assert_eq!(plugin.init_calls(), 1);
    assert_eq!(plugin.after_init_calls(), 1);

    let sync: Arc<dyn DataSyncTransport> = transport.clone();
    let (change_tx, mut change_rx) = mpsc::channel(8);
    let (resync_tx, mut resync_rx) = mpsc::channel(1);
    let reg = sync
        .watch_data("apply", change_tx, resync_tx, &prefixes(&["vpp/"]))
        .await
        .unwrap();
    resync_rx.recv().await.unwrap().done(Ok(()));

    sync.publish_data("vpp/if/loop0", Some(b"\x0a\x05loop0")).await.unwrap();
    sync.publish_data("vpp/if/loop0", None).await.unwrap();
    sync.publish_data("other/key", Some(b"ignored")).await.unwrap();

    let first = change_rx.recv().await.unwrap();
    assert_eq!(first.change_type, PutDel::Put);
    plugin.apply(first);

    let second = change_rx.recv().await.unwrap();
    assert_eq!(second.change_type, PutDel::Delete);
    plugin.apply(second);

    assert_eq!(plugin.drain(&mut change_rx), 0);
    assert_eq!(plugin.applied(), 2);

    let trace = tracer.get();
    assert_eq!(trace.traced_entries.len(), 2);
    assert!(trace.traced_entries.iter().all(|e| e.msg_name == "vpp/if/loop0"));

    reg.release().await.unwrap();
    for p in plugins.iter().rev() {
        p.close().await.unwrap();
    }
    assert_eq!(plugin.close_calls(), 1);
    assert!(transport.publish_data("vpp/x", Some(b"z")).await.is_err());
}

#[tokio::test]
async fn done_callback_reaches_publisher_side() {
    let (tx, rx) = oneshot::channel();
    let event = agentkit_core::traits::ChangeEvent::new("k", PutDel::Put, Some(vec![1]), None, 1).with_done(tx);

    let plugin = ApplyingPlugin::new(Arc::new(Tracer::new("done")));
    plugin.apply(event);

    assert_eq!(rx.await.unwrap(), Ok(()));
}

#[tokio::test]
async fn close_drops_all_subscriptions() {
    let transport = LocalTransport::new();
    for name in ["a", "b", "c"] {
        let (change_tx, _change_rx) = mpsc::channel(1);
        let (resync_tx, _resync_rx) = mpsc::channel(1);
        // Registration handles are intentionally leaked; close() must clean up
        let reg = transport
            .watch_data(name, change_tx, resync_tx, &prefixes(&[""]))
            .await
            .unwrap();
        std::mem::forget(reg);
    }
    assert_eq!(transport.subscription_count().await, 3);

    transport.close().await.unwrap();
    assert_eq!(transport.subscription_count().await, 0);
    assert_eq!(transport.name(), "local-transport");
}

#[test]
fn tracer_is_usable_as_trait_object() {
    let tracer: Arc<dyn LatencyTracer> = Arc::new(Tracer::new("dyn"));
    tracer.record("x", std::time::Duration::from_nanos(1));
    assert_eq!(tracer.get().traced_entries.len(), 1);
}
