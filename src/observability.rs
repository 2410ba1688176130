use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Coordination counters for one swarm
#[derive(Debug, Default)]
pub struct SwarmMetrics {
    pub tasks_enqueued: AtomicU64,
    pub tasks_assigned: AtomicU64,
    pub tasks_completed: AtomicU64,
    pub messages_delivered: AtomicU64,
    pub delivery_failures: AtomicU64,
}

impl SwarmMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_enqueued(&self) {
        self.tasks_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_assigned(&self) {
        self.tasks_assigned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self, count: usize) {
        self.messages_delivered
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> SwarmStats {
        SwarmStats {
            tasks_enqueued: self.tasks_enqueued.load(Ordering::Relaxed),
            tasks_assigned: self.tasks_assigned.load(Ordering::Relaxed),
            tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Swarm metrics: enqueued={}, assigned={}, completed={}, delivered={}, delivery_failures={}",
            stats.tasks_enqueued,
            stats.tasks_assigned,
            stats.tasks_completed,
            stats.messages_delivered,
            stats.delivery_failures
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SwarmStats {
    pub tasks_enqueued: u64,
    pub tasks_assigned: u64,
    pub tasks_completed: u64,
    pub messages_delivered: u64,
    pub delivery_failures: u64,
}

/// Time an operation and log its duration on finish
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}
