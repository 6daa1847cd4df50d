use crate::types::TestResult;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Retention for results appended one at a time outside continuous mode.
pub const SINGLE_SHOT_CAPACITY: usize = 50;

/// Retention for results appended by the continuous stream.
pub const STREAM_CAPACITY: usize = 100;

/// Derived view over the current buffer, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub count: usize,
    pub mean_execution_ms: f64,
    pub mean_cpu_ms: f64,
}

/// Newest-first buffer of completed test outcomes.
///
/// Capacity is a property of the insertion site, not the buffer: each
/// `append` caps retention at the capacity its mode passes in, while a
/// wholesale `replace` after a successful batch is uncapped.
#[derive(Debug, Clone, Default)]
pub struct ResultLog {
    entries: VecDeque<TestResult>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends a result, evicting the oldest entries beyond `capacity`.
    pub fn append(&mut self, result: TestResult, capacity: usize) {
        self.entries.push_front(result);
        self.entries.truncate(capacity);
    }

    /// Replaces the whole buffer with `results`, preserving their order.
    pub fn replace(&mut self, results: Vec<TestResult>) {
        self.entries = results.into();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest-first iteration over the buffer.
    pub fn iter(&self) -> impl Iterator<Item = &TestResult> {
        self.entries.iter()
    }

    /// Up to `k` most recent results, newest first.
    pub fn latest(&self, k: usize) -> Vec<TestResult> {
        self.entries.iter().take(k).cloned().collect()
    }

    pub fn summary(&self) -> ResultSummary {
        if self.entries.is_empty() {
            return ResultSummary {
                count: 0,
                mean_execution_ms: 0.0,
                mean_cpu_ms: 0.0,
            };
        }

        let count = self.entries.len();
        let total_execution: f64 = self.entries.iter().map(|r| r.execution_time_ms).sum();
        let total_cpu: f64 = self.entries.iter().map(TestResult::cpu_total_ms).sum();

        ResultSummary {
            count,
            mean_execution_ms: total_execution / count as f64,
            mean_cpu_ms: total_cpu / count as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CpuUsage;
    use chrono::Utc;

    fn result(execution_ms: f64, cpu_user: f64, cpu_system: f64) -> TestResult {
        TestResult {
            execution_time_ms: execution_ms,
            intensity: 1000,
            cpu_usage: CpuUsage {
                user: cpu_user,
                system: cpu_system,
            },
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_empty_summary_is_zero() {
        let log = ResultLog::new();
        let summary = log.summary();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean_execution_ms, 0.0);
        assert_eq!(summary.mean_cpu_ms, 0.0);
    }

    #[test]
    fn test_summary_means_are_exact() {
        let mut log = ResultLog::new();
        log.append(result(10.0, 8.0, 1.0), SINGLE_SHOT_CAPACITY);
        log.append(result(20.0, 16.0, 3.0), SINGLE_SHOT_CAPACITY);
        log.append(result(30.0, 24.0, 8.0), SINGLE_SHOT_CAPACITY);

        let summary = log.summary();
        assert_eq!(summary.count, 3);
        assert!((summary.mean_execution_ms - 20.0).abs() < f64::EPSILON);
        assert!((summary.mean_cpu_ms - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_append_is_newest_first() {
        let mut log = ResultLog::new();
        log.append(result(1.0, 0.0, 0.0), SINGLE_SHOT_CAPACITY);
        log.append(result(2.0, 0.0, 0.0), SINGLE_SHOT_CAPACITY);

        let newest: Vec<f64> = log.iter().map(|r| r.execution_time_ms).collect();
        assert_eq!(newest, vec![2.0, 1.0]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut log = ResultLog::new();
        for i in 0..120 {
            log.append(result(f64::from(i), 0.0, 0.0), STREAM_CAPACITY);
        }

        assert_eq!(log.len(), STREAM_CAPACITY);
        // Newest entry retained, entries 0..20 evicted.
        assert_eq!(log.iter().next().unwrap().execution_time_ms, 119.0);
        assert_eq!(log.iter().last().unwrap().execution_time_ms, 20.0);
    }

    #[test]
    fn test_single_shot_capacity() {
        let mut log = ResultLog::new();
        for i in 0..60 {
            log.append(result(f64::from(i), 0.0, 0.0), SINGLE_SHOT_CAPACITY);
        }
        assert_eq!(log.len(), SINGLE_SHOT_CAPACITY);
    }

    #[test]
    fn test_replace_is_uncapped_and_ordered() {
        let mut log = ResultLog::new();
        log.append(result(99.0, 0.0, 0.0), SINGLE_SHOT_CAPACITY);

        let batch: Vec<TestResult> = (0..75).map(|i| result(f64::from(i), 0.0, 0.0)).collect();
        log.replace(batch);

        assert_eq!(log.len(), 75);
        let front: Vec<f64> = log.iter().take(3).map(|r| r.execution_time_ms).collect();
        assert_eq!(front, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_latest_view() {
        let mut log = ResultLog::new();
        for i in 0..10 {
            log.append(result(f64::from(i), 0.0, 0.0), SINGLE_SHOT_CAPACITY);
        }

        let latest = log.latest(3);
        assert_eq!(latest.len(), 3);
        assert_eq!(latest[0].execution_time_ms, 9.0);
        assert_eq!(latest[2].execution_time_ms, 7.0);
    }

    #[test]
    fn test_clear() {
        let mut log = ResultLog::new();
        log.append(result(1.0, 0.0, 0.0), SINGLE_SHOT_CAPACITY);
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.summary().count, 0);
    }
}
