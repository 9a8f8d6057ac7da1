pub mod api;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod observer;
pub mod retry;

pub use api::{CoverClient, ImageClient, PromptClient};
pub use config::{Config, ImageConfig, LlmConfig};
pub use error::{PipelineError, Result, Stage};
pub use models::*;
pub use observer::{DebugObserver, NoopObserver, RequestObserver};
pub use retry::{ApiResponse, RequestSpec, RetryPolicy, RetryingRequester};
