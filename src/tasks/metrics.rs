// src/tasks/metrics.rs

//! Task metrics tracking

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

#[derive(Default)]
struct TaskStats {
    runs: usize,
    processed: usize,
    errors: usize,
    total_duration: Duration,
}

#[derive(Default)]
pub struct TaskMetrics {
    stats: RwLock<HashMap<String, TaskStats>>,
}

impl TaskMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// One completed run that handled `count` items
    pub fn record_run(&self, task: &str, count: usize, duration: Duration) {
        let mut map = self.stats.write();
        let stats = map.entry(task.to_string()).or_default();
        stats.runs += 1;
        stats.processed += count;
        stats.total_duration += duration;
    }

    pub fn record_error(&self, task: &str) {
        let mut map = self.stats.write();
        map.entry(task.to_string()).or_default().errors += 1;
    }

    pub fn processed(&self, task: &str) -> usize {
        self.stats.read().get(task).map(|s| s.processed).unwrap_or(0)
    }

    pub fn errors(&self, task: &str) -> usize {
        self.stats.read().get(task).map(|s| s.errors).unwrap_or(0)
    }

    pub fn report(&self) {
        let stats = self.stats.read();
        for (task, s) in stats.iter() {
            let avg = if s.runs > 0 {
                s.total_duration / s.runs as u32
            } else {
                Duration::ZERO
            };
            info!(
                "Task '{}': runs={}, processed={}, errors={}, avg={:?}",
                task, s.runs, s.processed, s.errors, avg
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate_per_task() {
        let metrics = TaskMetrics::new();
        metrics.record_run("eviction", 3, Duration::from_millis(2));
        metrics.record_run("eviction", 1, Duration::from_millis(4));
        metrics.record_error("eviction");

        assert_eq!(metrics.processed("eviction"), 4);
        assert_eq!(metrics.errors("eviction"), 1);
        assert_eq!(metrics.processed("other"), 0);
        metrics.report();
    }
}
