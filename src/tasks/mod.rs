// src/tasks/mod.rs

//! Background task management: the periodic eviction sweep and a metrics
//! reporter. Sweeps run independently of request handling.

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, info};

use crate::rotation::PoolRotator;

pub mod metrics;

use metrics::TaskMetrics;

const EVICTION_TASK: &str = "eviction";
const METRICS_REPORT_INTERVAL: Duration = Duration::from_secs(3600);
const MIN_EVICTION_INTERVAL: Duration = Duration::from_secs(1);

/// Manages all background tasks
pub struct TaskManager {
    rotator: Arc<PoolRotator>,
    eviction_interval: Duration,
    metrics: Arc<TaskMetrics>,
    handles: Vec<JoinHandle<()>>,
}

impl TaskManager {
    pub fn new(rotator: Arc<PoolRotator>, eviction_interval: Duration) -> Self {
        Self {
            rotator,
            // tokio intervals panic on a zero period
            eviction_interval: eviction_interval.max(MIN_EVICTION_INTERVAL),
            metrics: Arc::new(TaskMetrics::new()),
            handles: Vec::new(),
        }
    }

    pub fn metrics(&self) -> Arc<TaskMetrics> {
        self.metrics.clone()
    }

    /// Starts all background tasks
    pub fn start(&mut self) {
        info!("Starting background task manager");

        let handle = self.spawn_eviction_sweep();
        self.handles.push(handle);

        let handle = self.spawn_metrics_reporter();
        self.handles.push(handle);

        info!("Started {} background tasks", self.handles.len());
    }

    /// Spawns the pool eviction sweep
    fn spawn_eviction_sweep(&self) -> JoinHandle<()> {
        let rotator = self.rotator.clone();
        let interval = self.eviction_interval;
        let metrics = self.metrics.clone();

        tokio::spawn(async move {
            info!("Eviction sweep started (interval: {:?}, lifetime: {:?})", interval, rotator.lifetime());

            let mut interval_timer = time::interval(interval);
            interval_timer.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

            loop {
                interval_timer.tick().await;
                run_eviction(&rotator, &metrics).await;
            }
        })
    }

    /// Spawns the metrics reporter task
    fn spawn_metrics_reporter(&self) -> JoinHandle<()> {
        let metrics = self.metrics.clone();

        tokio::spawn(async move {
            let mut interval_timer = time::interval(METRICS_REPORT_INTERVAL);
            interval_timer.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

            loop {
                interval_timer.tick().await;
                metrics.report();
            }
        })
    }

    /// Gracefully shuts down all tasks
    pub async fn shutdown(self) {
        info!("Shutting down {} background tasks", self.handles.len());

        for handle in self.handles {
            handle.abort();
        }

        info!("All background tasks terminated");
    }
}

/// One sweep over the pool; failures are logged and retried next tick
pub async fn run_eviction(rotator: &PoolRotator, metrics: &TaskMetrics) -> usize {
    let start = Instant::now();
    match rotator.evict(Utc::now()).await {
        Ok(count) => {
            metrics.record_run(EVICTION_TASK, count, start.elapsed());
            if count == 0 {
                debug!("Eviction sweep found nothing to remove");
            }
            count
        }
        Err(e) => {
            error!("Eviction sweep failed: {}", e);
            metrics.record_error(EVICTION_TASK);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_eviction_records_metrics() {
        let rotator = PoolRotator::new(Duration::from_secs(60));
        rotator
            .insert_at("old", Utc::now() - chrono::Duration::minutes(5))
            .await
            .unwrap();
        rotator.insert("fresh").await.unwrap();

        let metrics = TaskMetrics::new();
        assert_eq!(run_eviction(&rotator, &metrics).await, 1);
        assert_eq!(metrics.processed(EVICTION_TASK), 1);
        assert_eq!(rotator.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_runs_on_interval() {
        let rotator = Arc::new(PoolRotator::new(Duration::from_secs(60)));
        rotator
            .insert_at("old", Utc::now() - chrono::Duration::minutes(5))
            .await
            .unwrap();

        let mut manager = TaskManager::new(rotator.clone(), Duration::from_secs(3600));
        let metrics = manager.metrics();
        manager.start();

        // The first tick fires immediately
        for _ in 0..100 {
            if rotator.is_empty().await {
                break;
            }
            time::sleep(Duration::from_millis(10)).await;
        }
        assert!(rotator.is_empty().await);
        assert_eq!(metrics.processed(EVICTION_TASK), 1);

        manager.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let rotator = Arc::new(PoolRotator::new(Duration::from_secs(60)));
        rotator
            .insert_at("old", Utc::now() - chrono::Duration::minutes(5))
            .await
            .unwrap();

        let mut manager = TaskManager::new(rotator.clone(), Duration::ZERO);
        assert_eq!(manager.eviction_interval, MIN_EVICTION_INTERVAL);

        let metrics = manager.metrics();
        manager.start();
        time::sleep(Duration::from_millis(2500)).await;

        assert!(rotator.is_empty().await);
        assert_eq!(metrics.processed(EVICTION_TASK), 1);
        assert_eq!(metrics.errors(EVICTION_TASK), 0);
        manager.shutdown().await;
    }
}
