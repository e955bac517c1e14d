use serde::Serialize;
use std::fmt::Display;

/// The outcome of an operation in the shape callers outside Rust consume.
///
/// A successful result has an empty message and carries its data; a failed
/// one carries a non-empty message and no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> OperationResult<T> {
    pub fn successful(data: T) -> Self {
        Self {
            success: true,
            message: String::new(),
            data: Some(data),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = String::from("operation failed");
        }
        Self {
            success: false,
            message,
            data: None,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.success
    }
}

impl<T, E: Display> From<Result<T, E>> for OperationResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::successful(data),
            Err(err) => Self::failed(err.to_string()),
        }
    }
}
