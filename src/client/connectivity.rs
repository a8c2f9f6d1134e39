//! Network reachability check consulted before every request.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Answers whether the device currently has a network.
pub trait Connectivity: Send + Sync {
    /// Checked before each request; `false` fails it with `Offline`.
    fn is_online(&self) -> bool;
}

/// For platforms without a reachability API; requests fail on their own when offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// A flag the platform layer flips from its network-change callback.
#[derive(Debug, Clone)]
pub struct NetworkStatus {
    online: Arc<AtomicBool>,
}

impl NetworkStatus {
    /// Status starting at `online`.
    #[must_use]
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    /// Records a reachability change.
    pub fn set_online(&self, online: bool) {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous != online {
            tracing::info!(online, "Network status changed");
        }
    }
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for NetworkStatus {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
