//! samplegen: batch-render formula samples to vector and raster images by
//! driving an external renderer and an external converter.

pub mod batch;
pub mod config;
pub mod error;
pub mod samples;
pub mod telemetry;
pub mod tools;
