use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shape of one test request: how much work the endpoint should perform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestRequestSpec {
    pub intensity: u64,
    pub complexity: u32,
}

impl TestRequestSpec {
    pub fn new(intensity: u64) -> Self {
        Self {
            intensity,
            complexity: 1,
        }
    }

    pub fn with_complexity(mut self, complexity: u32) -> Self {
        self.complexity = complexity;
        self
    }
}

/// CPU time the endpoint spent on one request, in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CpuUsage {
    pub user: f64,
    pub system: f64,
}

/// Completed test outcome as reported by the compute endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub execution_time_ms: f64,
    pub intensity: u64,
    pub cpu_usage: CpuUsage,
    pub timestamp: DateTime<Utc>,
}

impl TestResult {
    pub fn cpu_total_ms(&self) -> f64 {
        self.cpu_usage.user + self.cpu_usage.system
    }
}

/// Host telemetry snapshot from the endpoint's system-info route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSnapshot {
    pub platform: String,
    pub arch: String,
    pub hostname: String,
    pub node_version: String,
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuInfo {
    pub cpu_count: u32,
    pub cpu_model: String,
    pub load_average: Vec<f64>,
    pub cpu_utilization: Option<String>,
    pub load_average1min: Option<f64>,
    pub load_average5min: Option<f64>,
    pub load_average10min: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryInfo {
    pub total: u64,
    pub free: u64,
    pub used: u64,
    pub usage_percent: String,
}

impl MemoryInfo {
    pub fn total_gb(&self) -> f64 {
        self.total as f64 / 1024.0 / 1024.0 / 1024.0
    }

    pub fn used_gb(&self) -> f64 {
        self.used as f64 / 1024.0 / 1024.0 / 1024.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_builder() {
        let spec = TestRequestSpec::new(500_000);
        assert_eq!(spec.intensity, 500_000);
        assert_eq!(spec.complexity, 1);

        let spec = TestRequestSpec::new(1_000_000).with_complexity(3);
        assert_eq!(spec.complexity, 3);
    }

    #[test]
    fn test_result_cpu_total() {
        let result = TestResult {
            execution_time_ms: 12.5,
            intensity: 1000,
            cpu_usage: CpuUsage {
                user: 10.0,
                system: 2.25,
            },
            timestamp: Utc::now(),
        };
        assert!((result.cpu_total_ms() - 12.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_result_wire_format() {
        let json = r#"{
            "executionTimeMs": 41.7,
            "intensity": 1000000,
            "cpuUsage": { "user": 39.1, "system": 1.9 },
            "timestamp": "2024-05-01T12:00:00Z"
        }"#;

        let result: TestResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.intensity, 1_000_000);
        assert!((result.execution_time_ms - 41.7).abs() < f64::EPSILON);
        assert!((result.cpu_usage.system - 1.9).abs() < f64::EPSILON);

        let round = serde_json::to_value(&result).unwrap();
        assert!(round.get("executionTimeMs").is_some());
        assert!(round.get("cpuUsage").is_some());
    }

    #[test]
    fn test_snapshot_wire_format() {
        let json = r#"{
            "platform": "linux",
            "arch": "x64",
            "hostname": "perf-host",
            "nodeVersion": "v20.11.0",
            "cpu": {
                "cpuCount": 8,
                "cpuModel": "AMD EPYC 7B13",
                "loadAverage": [0.5, 0.4, 0.3],
                "cpuUtilization": "12.5",
                "loadAverage1min": 0.5,
                "loadAverage5min": 0.4,
                "loadAverage10min": 0.3
            },
            "memory": {
                "total": 34359738368,
                "free": 17179869184,
                "used": 17179869184,
                "usagePercent": "50.0"
            }
        }"#;

        let snapshot: SystemSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.cpu.cpu_count, 8);
        assert_eq!(snapshot.memory.usage_percent, "50.0");
        assert!((snapshot.memory.total_gb() - 32.0).abs() < 0.01);
        assert!((snapshot.memory.used_gb() - 16.0).abs() < 0.01);
    }
}
