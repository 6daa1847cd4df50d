use crate::types::{SystemSnapshot, TestRequestSpec, TestResult};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Endpoint error ({status}): {message}")]
    Endpoint { status: u16, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

pub type ComputeResult<T> = Result<T, ComputeError>;

#[async_trait]
pub trait ComputeBackend: Send + Sync {
    async fn run_compute(&self, spec: &TestRequestSpec) -> ComputeResult<TestResult>;

    async fn system_info(&self) -> ComputeResult<SystemSnapshot>;

    fn backend_name(&self) -> &'static str;
}
