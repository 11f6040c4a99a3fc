//! Response definitions
//!
//! Represents responses to clients.

use crate::error::FlatError;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
    NameExists = 0x03,
    NoSpace = 0x04,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (content for READ, error message for failures)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            payload: None,
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self::with_message(Status::Error, message)
    }

    /// Map an engine error to the status a client can act on
    pub fn from_error(err: &FlatError) -> Self {
        match err {
            FlatError::NotFound(_) => Self::not_found(),
            FlatError::NameExists(_) => Self::with_message(Status::NameExists, &err.to_string()),
            FlatError::InsufficientSpace { .. } => {
                Self::with_message(Status::NoSpace, &err.to_string())
            }
            _ => Self::error(&err.to_string()),
        }
    }

    /// Payload interpreted as UTF-8 text (error messages)
    pub fn message(&self) -> Option<String> {
        self.payload
            .as_ref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
    }

    fn with_message(status: Status, message: &str) -> Self {
        Self {
            status,
            payload: Some(message.as_bytes().to_vec()),
        }
    }
}
