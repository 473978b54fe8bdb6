use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone, Default)]
pub struct AppState {
    /// Hand-off requests accepted since startup
    requests_served: Arc<AtomicU64>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::SeqCst)
    }

    pub(super) fn record_request(&self) -> u64 {
        self.requests_served.fetch_add(1, Ordering::SeqCst) + 1
    }
}
