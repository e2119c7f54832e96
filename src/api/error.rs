//! Error values stored in cache entries when a fetch or mutation fails.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Failure of a single request against the backend.
///
/// These are values, not control flow: the orchestrator stores them in the
/// affected cache entry and views render from there.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum FetchError {
  /// Non-2xx HTTP status.
  #[error("{status} {status_text}")]
  #[serde(rename_all = "camelCase")]
  Transport { status: u16, status_text: String },

  /// 2xx response whose JSON body carried an `error` field.
  #[error("{}", describe_value(.0))]
  Application(Value),

  /// Raised locally before any request was made.
  #[error("{0}")]
  Precondition(String),

  /// The request never produced a response.
  #[error("network error: {0}")]
  Network(String),

  /// The response body was not the JSON we expected.
  #[error("invalid response body: {0}")]
  Decode(String),
}

impl FetchError {
  pub fn transport(status: u16, status_text: impl Into<String>) -> Self {
    Self::Transport {
      status,
      status_text: status_text.into(),
    }
  }

  pub fn precondition(message: impl Into<String>) -> Self {
    Self::Precondition(message.into())
  }

  /// HTTP status for transport errors.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Transport { status, .. } => Some(*status),
      _ => None,
    }
  }

  pub fn is_unauthorized(&self) -> bool {
    self.status() == Some(401)
  }
}

fn describe_value(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Object(map) => match map.get("message") {
      Some(Value::String(message)) => message.clone(),
      _ => value.to_string(),
    },
    other => other.to_string(),
  }
}

/// Extract an in-band application error from a response body.
///
/// Mirrors a truthiness check: `null`, `false`, `0` and `""` do not count as errors.
pub fn application_error(body: &Value) -> Option<FetchError> {
  let error = body.as_object()?.get("error")?;
  let present = match error {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  };
  present.then(|| FetchError::Application(error.clone()))
}
