//! Dashboard errors

use thiserror::Error;

/// Errors that can occur while talking to the device or decoding its replies
#[derive(Error, Debug)]
pub enum DashError {
    /// The HTTP request itself failed (connect, send or body read)
    #[error("Request to {endpoint} failed: {source}")]
    Request {
        /// Device path that was requested
        endpoint: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// No answer within the configured request timeout
    #[error("Request to {endpoint} timed out after {timeout_ms}ms")]
    Timeout {
        /// Device path that was requested
        endpoint: String,
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// Non-2xx HTTP status
    #[error("Device answered {endpoint} with HTTP {status}")]
    Status {
        /// Device path that was requested
        endpoint: String,
        /// HTTP status code
        status: u16,
    },

    /// Reply body is not the expected JSON object
    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedBody {
        /// Device path that was requested
        endpoint: String,
        /// Decoder message
        reason: String,
    },

    /// A field the gauges need is absent or not numeric
    #[error("Telemetry field '{0}' is missing or not a number")]
    MissingField(String),

    /// Lock code contains something other than a digit 0-5
    #[error("Invalid lock pin character {character:?} at position {position}")]
    InvalidPin {
        /// Offending character
        character: char,
        /// Zero-based index in the code
        position: usize,
    },

    /// Speed limit outside what the firmware accepts
    #[error("Max speed {0} km/h is outside {min}..={max}", min = crate::actions::MIN_MAX_SPEED, max = crate::actions::MAX_MAX_SPEED)]
    MaxSpeedOutOfRange(u32),

    /// Failure reported by a device implementation
    #[error("Device error: {0}")]
    Device(String),
}

impl DashError {
    /// Whether the failure happened on the wire (as opposed to decoding or validation)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DashError::Request { .. }
                | DashError::Timeout { .. }
                | DashError::Status { .. }
                | DashError::MalformedBody { .. }
                | DashError::Device(_)
        )
    }
}
