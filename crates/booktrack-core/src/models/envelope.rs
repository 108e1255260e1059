//! The backend's JSON response wrappers.

use serde::Deserialize;
use serde_json::Value;

/// Successful response: `{ message, data }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub message: String,
    pub data: T,
}

/// Successful response whose `data` is absent or unused.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageOnly {
    #[serde(default)]
    pub message: String,
}

/// Field errors are reported in this order when several are present.
const PREFERRED_ERROR_FIELDS: [&str; 3] = ["password", "username", "email"];

/// Failed response: `{ message?, errors? }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<Value>,
}

impl ErrorBody {
    /// The first field-level error, if the server sent any.
    pub fn field_error(&self) -> Option<String> {
        let errors = self.errors.as_ref()?.as_object()?;
        PREFERRED_ERROR_FIELDS
            .iter()
            .filter_map(|field| errors.get(*field))
            .chain(errors.values())
            .find_map(error_text)
    }

    /// `"{message}: {field error}"`, or whichever part is present.
    pub fn summary(&self) -> Option<String> {
        let message = self.message.as_deref().filter(|m| !m.trim().is_empty());
        match (message, self.field_error()) {
            (Some(m), Some(e)) => Some(format!("{}: {}", m, e)),
            (Some(m), None) => Some(m.to_string()),
            (None, Some(e)) => Some(e),
            (None, None) => None,
        }
    }
}

/// Field errors arrive either as plain strings or as `{ msg }`/`{ message }` objects.
fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::Array(items) => items.iter().find_map(error_text),
        _ => None,
    }
}
