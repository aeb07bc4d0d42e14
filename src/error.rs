//! Error types for sampling, dispatch and normalization.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid view window: x [{x_min}, {x_max}), y [{y_min}, {y_max})")]
    InvalidWindow {
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    },

    #[error("invalid resolution: {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("maximum iterations must be greater than zero")]
    InvalidMaxIter,

    #[error("no compute device available: {0}")]
    DeviceUnavailable(String),

    #[error("failed to prepare horizons kernel: {0}")]
    KernelCompile(String),

    #[error("device execution failed: {0}")]
    DeviceExecution(String),
}

impl From<wgpu::RequestDeviceError> for Error {
    fn from(error: wgpu::RequestDeviceError) -> Self {
        Error::DeviceUnavailable(error.to_string())
    }
}

impl From<wgpu::BufferAsyncError> for Error {
    fn from(error: wgpu::BufferAsyncError) -> Self {
        Error::DeviceExecution(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
