//! The backend's response envelope.
//!
//! Backends answer with `{ status | success, user?, access_token?, csrf_token?, ... }`
//! where `status` may be a string (`"success"`, `"error"`) or a boolean.

use serde_json::{Map, Value};

use portcullis_core::types::User;

/// Loosely-typed view of a backend response body.
#[derive(Debug, Clone, Default)]
pub struct ApiEnvelope {
    /// `"success"` / `"ok"` / `"error"` / boolean.
    pub status: Option<Value>,
    /// Boolean success flag.
    pub success: Option<bool>,
    /// User profile (login / verify).
    pub user: Option<User>,
    /// Bearer token (login), also sent as `token`.
    pub access_token: Option<String>,
    /// CSRF token (csrf endpoint), also sent as `csrfToken`.
    pub csrf_token: Option<String>,
    /// Remote permission check result, also sent as `allowed`.
    pub has_permission: Option<bool>,
}

impl ApiEnvelope {
    /// Parse a body; anything that is not an object yields an empty envelope.
    ///
    /// Each field is read on its own, so a key of the wrong shape only
    /// leaves that field empty.
    pub fn from_body(body: &Value) -> Self {
        let Some(object) = body.as_object() else {
            return Self::default();
        };

        Self {
            status: object.get("status").filter(|v| !v.is_null()).cloned(),
            success: object.get("success").and_then(Value::as_bool),
            user: object
                .get("user")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
            access_token: string_field(object, &["access_token", "token"]),
            csrf_token: string_field(object, &["csrf_token", "csrfToken"]),
            has_permission: bool_field(object, &["has_permission", "allowed"]),
        }
    }

    /// Whether the envelope reports success. Absent flags count as success.
    pub fn is_ok(&self) -> bool {
        if self.success == Some(false) {
            return false;
        }
        match &self.status {
            Some(Value::Bool(ok)) => *ok,
            Some(Value::String(s)) => !matches!(
                s.to_ascii_lowercase().as_str(),
                "error" | "fail" | "failed" | "failure"
            ),
            _ => true,
        }
    }
}

fn string_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn bool_field(object: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_bool))
}

/// Machine-readable error code from an error body (`code`, `error_code`,
/// or a string `error`).
pub fn error_code(body: &Value) -> Option<&str> {
    ["code", "error_code", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
}

/// Human-readable message from an error body.
pub fn error_message(body: &Value) -> Option<&str> {
    if let Some(s) = body.as_str() {
        return Some(s);
    }
    ["message", "detail", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
}
