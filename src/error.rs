use thiserror::Error;

use crate::{batch::BatchError, config::LoadError, samples::SampleError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] LoadError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error(transparent)]
    Samples(#[from] SampleError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error("failed to write output: {0}")]
    Output(String),
}

impl AppError {
    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::Output(message.into())
    }
}
