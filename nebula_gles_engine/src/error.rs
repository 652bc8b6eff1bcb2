//! Error types for the Nebula GLES engine
//!
//! This module defines the error types used throughout the engine,
//! including device creation, resource loading, and framebuffer validation.

use std::fmt;

/// Result type for Nebula GLES engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nebula GLES engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (GL error codes, context loss, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (program, buffer, texture, framebuffer, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, device, lesson)
    InitializationFailed(String),

    /// An optional GPU feature required by a resource plan is absent
    UnsupportedFeature(String),

    /// A framebuffer failed its completeness check
    IncompleteFramebuffer(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::UnsupportedFeature(msg) => write!(f, "Unsupported feature: {}", msg),
            Error::IncompleteFramebuffer(msg) => write!(f, "Incomplete framebuffer: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
