//! Error types and handling for the trip planner

use std::time::Duration;

use thiserror::Error;

/// Main error type for the planning service
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Reference dataset could not be read or parsed
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    /// Missing or rejected model provider credentials
    #[error("Credentials error: {message}")]
    Credentials { message: String },

    /// Model provider rejected the request or answered with garbage
    #[error("Model provider error: {message}")]
    Provider { message: String },

    /// Network failure talking to an outbound service
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// An outbound call exceeded its time budget
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The caller aborted the request
    #[error("Planning was cancelled")]
    Cancelled,

    /// The reasoning loop hit its step cap without producing an answer
    #[error("Max iterations exceeded: no final answer after {limit} reasoning steps")]
    MaxIterations { limit: u32 },
}

impl PlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new catalog error
    pub fn catalog<S: Into<String>>(message: S) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a new credentials error
    pub fn credentials<S: Into<String>>(message: S) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }

    /// Create a new provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    #[must_use]
    pub fn timeout(operation: &'static str, after: Duration) -> Self {
        Self::Timeout { operation, after }
    }
}
