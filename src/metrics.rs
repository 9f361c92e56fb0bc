//! Server metrics
//!
//! Connection and traffic counters, shared across all connection threads.
//! The counters are advisory (exposed to the admin surface); they never
//! participate in protocol correctness.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::Serialize;

/// Counters owned by a [`Server`](crate::network::Server) instance.
///
/// Every connection thread holds an `Arc` to the same instance. All updates
/// are relaxed atomics; readers may observe slightly stale values.
#[derive(Debug, Default)]
pub struct ServerMetrics {
    connected_clients: AtomicUsize,
    total_requests: AtomicU64,
    total_responses: AtomicU64,
    files_served: AtomicU64,
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_connected(&self) -> usize {
        self.connected_clients.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn client_disconnected(&self) -> usize {
        self.connected_clients.fetch_sub(1, Ordering::Relaxed) - 1
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_response(&self) {
        self.total_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file_served(&self) -> u64 {
        self.files_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn connected_clients(&self) -> usize {
        self.connected_clients.load(Ordering::Relaxed)
    }

    /// Point-in-time copy for the administrative surface.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connected_clients: self.connected_clients.load(Ordering::Relaxed),
            total_requests: self.total_requests.load(Ordering::Relaxed),
            total_responses: self.total_responses.load(Ordering::Relaxed),
            files_served: self.files_served.load(Ordering::Relaxed),
        }
    }
}

/// Serializable view of [`ServerMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub connected_clients: usize,
    pub total_requests: u64,
    pub total_responses: u64,
    pub files_served: u64,
}
