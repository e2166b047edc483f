//! Test doubles and common utilities for contract tests

#![allow(dead_code)]

use agentkit_core::addr::{NetAddr, parse_addresses};
use agentkit_core::error::Result;
use agentkit_core::measure::LatencyTracer;
use agentkit_core::traits::{ChangeEvent, Plugin, PostInit};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::sync::mpsc;

/// Parse a list of textual addresses, panicking on bad input
pub fn addrs(list: &[&str]) -> Vec<NetAddr> {
    parse_addresses(list.iter().copied()).expect("test addresses parse")
}

/// Sort a list for order-insensitive comparison
pub fn sorted(mut list: Vec<NetAddr>) -> Vec<NetAddr> {
    list.sort();
    list
}

/// A plugin that applies change events and times each one
///
/// Tracks lifecycle calls so tests can verify hook ordering.
pub struct ApplyingPlugin {
    tracer: Arc<dyn LatencyTracer>,
    init_calls: AtomicUsize,
    after_init_calls: AtomicUsize,
    close_calls: AtomicUsize,
    applied: AtomicUsize,
}

impl ApplyingPlugin {
    pub fn new(tracer: Arc<dyn LatencyTracer>) -> Self {
        Self {
            tracer,
            init_calls: AtomicUsize::new(0),
            after_init_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
            applied: AtomicUsize::new(0),
        }
    }

    /// Apply one change event and report success on its callback
    pub fn apply(&self, event: ChangeEvent) {
        let start = Instant::now();
        self.applied.fetch_add(1, Ordering::SeqCst);
        self.tracer.log_time(&event.key, start);
        event.done(Ok(()));
    }

    /// Drain and apply everything currently queued
    pub fn drain(&self, rx: &mut mpsc::Receiver<ChangeEvent>) -> usize {
        let mut count = 0;
        while let Ok(event) = rx.try_recv() {
            self.apply(event);
            count += 1;
        }
        count
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn after_init_calls(&self) -> usize {
        self.after_init_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Plugin for ApplyingPlugin {
    async fn init(&self) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "applying-plugin"
    }

    fn as_post_init(&self) -> Option<&dyn PostInit> {
        Some(self)
    }
}

#[async_trait::async_trait]
impl PostInit for ApplyingPlugin {
    async fn after_init(&self) -> Result<()> {
        self.after_init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
