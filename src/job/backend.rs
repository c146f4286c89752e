// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The generative video backend seam.
//!
//! The job driver only needs three calls: submit a request, poll the
//! returned operation, and fetch the finished asset. Anything that can do
//! those (the REST client, or a scripted fake in tests) implements
//! [`VideoBackend`].

use async_trait::async_trait;

use crate::models::generation::GenerationRequest;

/// Error text the backend returns when the selected API key is not usable.
pub const CREDENTIAL_ERROR_SIGNATURE: &str = "Requested entity was not found";

/// Handle to a long-running generation operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Server-assigned operation name, used for polling
    pub name: String,
    pub done: bool,
    /// Download locator for the finished video, present once done
    pub video_uri: Option<String>,
}

/// Errors from the backend layer.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or the raw body.
        message: String,
    },

    /// The operation completed with an error.
    #[error("{0}")]
    Operation(String),

    #[error("generation finished without a downloadable video")]
    MissingVideo,

    #[error("no API key selected")]
    MissingKey,

    #[error("failed to store the generated video: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// Whether this failure means the active credential must be reselected.
    pub fn is_credential_error(&self) -> bool {
        self.to_string().contains(CREDENTIAL_ERROR_SIGNATURE)
    }
}

#[async_trait]
pub trait VideoBackend: Send + Sync {
    /// Submit a generation request and return its operation handle.
    async fn submit(&self, request: &GenerationRequest) -> Result<Operation, BackendError>;

    /// Fetch the latest state of an operation.
    async fn poll(&self, operation: &Operation) -> Result<Operation, BackendError>;

    /// Download the finished asset.
    async fn fetch(&self, video_uri: &str) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_signature_is_detected_in_api_and_operation_errors() {
        let api = BackendError::Api {
            status: 404,
            message: "Requested entity was not found.".to_string(),
        };
        assert!(api.is_credential_error());

        let op = BackendError::Operation("Requested entity was not found.".to_string());
        assert!(op.is_credential_error());

        let quota = BackendError::Api {
            status: 429,
            message: "Resource has been exhausted".to_string(),
        };
        assert!(!quota.is_credential_error());
        assert!(!BackendError::MissingVideo.is_credential_error());
    }

    #[test]
    fn api_errors_display_raw_message() {
        let err = BackendError::Api {
            status: 400,
            message: "Image too large".to_string(),
        };
        assert_eq!(err.to_string(), "Image too large");
    }
}
