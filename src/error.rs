// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected our credential. Stored credentials are already
    /// cleared and the user was sent to login by the time this is returned.
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    #[error("Server returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status { status: u16, message: Option<String> },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    /// Message suitable for a form or notice line.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status {
                message: Some(m), ..
            } => m.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid date '{value}' for {field}, expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("Unknown field '{0}'")]
    UnknownField(String),
}
