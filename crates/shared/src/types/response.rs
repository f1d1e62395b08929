//! Uniform response envelope returned by every operation exposed over HTTP.

use serde::{Deserialize, Serialize};

/// Either the operation's result or an error description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Result payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Machine-readable error code on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human-readable error message on failure, shown verbatim by clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Wraps a successful result.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    /// Builds a failure envelope.
    #[must_use]
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(code.into()),
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_omits_error_fields() {
        let json = serde_json::to_value(ApiResponse::ok(42)).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": 42 }));
    }

    #[test]
    fn test_failure_envelope() {
        let json = serde_json::to_value(ApiResponse::<()>::failure(
            "INVALID_TRANSITION",
            "Invalid status transition from pending to delivered",
        ))
        .unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "INVALID_TRANSITION");
        assert_eq!(
            json["message"],
            "Invalid status transition from pending to delivered"
        );
        assert!(json.get("data").is_none());
    }
}
