// # Plugin Trait
//
// Lifecycle contract between plugins and the host framework.
//
// ## Lifecycle
//
// 1. The host calls `init()` on every plugin
// 2. Once all of them succeeded, it calls `after_init()` on plugins that
//    expose the `PostInit` capability
// 3. On shutdown it calls `close()`
//
// The host owns the ordering; plugins only implement the hooks.
//
// ## Usage
//
// ```rust,ignore
// use agentkit_core::traits::{Plugin, PostInit};
//
// struct Watcher;
//
// #[async_trait::async_trait]
// impl Plugin for Watcher {
//     async fn init(&self) -> agentkit_core::Result<()> { Ok(()) }
//     async fn close(&self) -> agentkit_core::Result<()> { Ok(()) }
//     fn name(&self) -> &str { "watcher" }
//     fn as_post_init(&self) -> Option<&dyn PostInit> { Some(self) }
// }
//
// #[async_trait::async_trait]
// impl PostInit for Watcher {
//     async fn after_init(&self) -> agentkit_core::Result<()> { Ok(()) }
// }
// ```

use async_trait::async_trait;

/// A unit of functionality managed by the host framework
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Prepare the plugin for use
    ///
    /// Called once, before any other plugin's `after_init()`.
    async fn init(&self) -> Result<(), crate::Error>;

    /// Release all resources held by the plugin
    async fn close(&self) -> Result<(), crate::Error>;

    /// Name used by the host for logging and lookups
    fn name(&self) -> &str;

    /// Expose the optional post-init capability
    ///
    /// Plugins implementing [`PostInit`] return `Some(self)`.
    fn as_post_init(&self) -> Option<&dyn PostInit> {
        None
    }
}

/// Optional second initialisation phase
///
/// Called by the host once every plugin's `init()` has succeeded, so
/// implementations can rely on their dependencies being initialised.
#[async_trait]
pub trait PostInit: Plugin {
    /// Finish initialisation
    async fn after_init(&self) -> Result<(), crate::Error>;
}
