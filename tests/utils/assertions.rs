//! Test assertion helpers - fluent API for verifying HTTP responses
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{http::StatusCode, response::Response};
use serde_json::Value;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct ResponseAssertion {
    status: StatusCode,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl ResponseAssertion {
    /// Buffer the response so it can be inspected more than once
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        Self {
            status,
            content_type,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Assert the response has a specific status
    pub fn has_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status,
            expected,
            "unexpected status, body: {}",
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    pub fn assert_ok(self) -> Self {
        self.has_status(StatusCode::OK)
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "body is not JSON ({}): {}",
                e,
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    /// Assert the body has a specific field value
    pub fn with_field(self, key: &str, expected: Value) -> Self {
        assert_eq!(self.json()[key], expected, "field `{}` differs", key);
        self
    }

    /// Verify the 401 body produced by the authentication entry point
    pub fn verify_unauthorized_for(self, path: &str) -> Self {
        let this = self.has_status(StatusCode::UNAUTHORIZED);
        assert_eq!(this.content_type.as_deref(), Some("application/json"));

        let body = this.json();
        let object = body.as_object().expect("401 body must be a JSON object");
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["error", "message", "path", "status"]);

        assert_eq!(body["status"], 401);
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["path"], path);
        assert!(body["message"].is_string());
        this
    }
}
