pub mod backend;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod quota;
pub mod results;
pub mod types;

pub use backend::{ComputeBackend, ComputeError, ComputeResult};
pub use config::{ComputeConfig, QuotaConfig};
pub use dispatch::{
    DispatchError, Dispatcher, StreamStats, DISPATCH_INTERVAL, RATE_SAMPLE_INTERVAL,
};
pub use http::HttpComputeClient;
pub use quota::{Admission, DenialReason, QuotaPolicy, UnlockOutcome};
pub use results::{ResultLog, ResultSummary, SINGLE_SHOT_CAPACITY, STREAM_CAPACITY};
pub use types::{
    CpuInfo, CpuUsage, MemoryInfo, SystemSnapshot, TestRequestSpec, TestResult,
};

pub mod prelude {
    pub use crate::backend::*;
    pub use crate::config::*;
    pub use crate::dispatch::*;
    pub use crate::http::*;
    pub use crate::quota::*;
    pub use crate::results::*;
    pub use crate::types::*;
}
