use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag telling in-flight work whether its screen is still mounted.
///
/// Results that complete after `unmount` are dropped instead of applied.
#[derive(Debug, Clone)]
pub struct MountGuard(Arc<AtomicBool>);

impl MountGuard {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for MountGuard {
    fn default() -> Self {
        Self::new()
    }
}
