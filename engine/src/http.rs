use crate::backend::{ComputeBackend, ComputeError, ComputeResult};
use crate::config::ComputeConfig;
use crate::types::{SystemSnapshot, TestRequestSpec, TestResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Request body for the endpoint's compute route
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ComputeRequestBody {
    intensity: u64,
    complexity: u32,
}

pub struct HttpComputeClient {
    client: reqwest::Client,
    config: ComputeConfig,
}

impl HttpComputeClient {
    pub fn new(config: ComputeConfig) -> ComputeResult<Self> {
        config
            .validate()
            .map_err(|msg| ComputeError::InvalidConfig { message: msg })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ComputeError::Network)?;

        Ok(Self { client, config })
    }

    pub fn with_default_config() -> ComputeResult<Self> {
        Self::new(ComputeConfig::default())
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn handle_http_error(err: reqwest::Error) -> ComputeError {
        if err.is_timeout() {
            ComputeError::ServiceUnavailable {
                message: "Request timeout".to_string(),
            }
        } else if err.is_connect() {
            ComputeError::ServiceUnavailable {
                message: "Cannot connect to compute endpoint".to_string(),
            }
        } else {
            ComputeError::Network(err)
        }
    }
}

#[async_trait]
impl ComputeBackend for HttpComputeClient {
    async fn run_compute(&self, spec: &TestRequestSpec) -> ComputeResult<TestResult> {
        debug!(
            "Issuing compute request: intensity={}, complexity={}",
            spec.intensity, spec.complexity
        );

        let body = ComputeRequestBody {
            intensity: spec.intensity,
            complexity: spec.complexity,
        };

        let url = format!("{}/api/compute", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(Self::handle_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ComputeError::Endpoint {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let result: TestResult = response.json().await.map_err(Self::handle_http_error)?;

        debug!(
            "Compute request completed in {:.2} ms",
            result.execution_time_ms
        );

        Ok(result)
    }

    async fn system_info(&self) -> ComputeResult<SystemSnapshot> {
        let url = format!("{}/api/system-info", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::handle_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ComputeError::Endpoint {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let snapshot: SystemSnapshot = response.json().await.map_err(Self::handle_http_error)?;

        info!("Fetched system snapshot from {}", snapshot.hostname);
        Ok(snapshot)
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
