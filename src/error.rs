//! Custom error types for the ToastShift application

use thiserror::Error;

/// Main error type for ToastShift operations
#[derive(Error, Debug)]
pub enum ToastShiftError {
    #[error("Window creation failed: {0}")]
    WindowCreation(String),

    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApi(#[from] windows::core::Error),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Locale error: {0}")]
    Locale(String),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ToastShift operations
pub type ToastShiftResult<T> = Result<T, ToastShiftError>;
