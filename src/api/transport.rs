//! The fetch capability: issue a request, get back a status and a body.

use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use url::Url;

use super::error::{application_error, FetchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
  Get,
  Post,
  Put,
  Delete,
}

impl Method {
  pub fn as_str(&self) -> &'static str {
    match self {
      Method::Get => "GET",
      Method::Post => "POST",
      Method::Put => "PUT",
      Method::Delete => "DELETE",
    }
  }
}

/// A request relative to the API origin, e.g. `GET /api/stocks`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
  pub method: Method,
  /// Path plus query string
  pub path: String,
  pub body: Option<Value>,
}

impl ApiRequest {
  pub fn get(path: impl Into<String>) -> Self {
    Self {
      method: Method::Get,
      path: path.into(),
      body: None,
    }
  }

  pub fn post(path: impl Into<String>, body: Value) -> Self {
    Self {
      method: Method::Post,
      path: path.into(),
      body: Some(body),
    }
  }

  pub fn put(path: impl Into<String>, body: Value) -> Self {
    Self {
      method: Method::Put,
      path: path.into(),
      body: Some(body),
    }
  }

  pub fn delete(path: impl Into<String>) -> Self {
    Self {
      method: Method::Delete,
      path: path.into(),
      body: None,
    }
  }
}

/// Raw response as seen by the orchestrator.
#[derive(Debug, Clone)]
pub struct ApiResponse {
  pub status: u16,
  pub status_text: String,
  pub body: Vec<u8>,
}

impl ApiResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  /// Turn a non-2xx status into a transport error.
  pub fn error_for_status(self) -> Result<Self, FetchError> {
    if self.is_success() {
      Ok(self)
    } else {
      Err(FetchError::transport(self.status, self.status_text))
    }
  }

  /// Check the status, parse the body as JSON and honor an in-band `error` field.
  pub fn json<T: DeserializeOwned>(self) -> Result<T, FetchError> {
    let response = self.error_for_status()?;
    let value: Value =
      serde_json::from_slice(&response.body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if let Some(error) = application_error(&value) {
      return Err(error);
    }

    serde_json::from_value(value).map_err(|e| FetchError::Decode(e.to_string()))
  }
}

/// Anything that can carry an [`ApiRequest`] to the backend.
pub trait Transport: Send + Sync + 'static {
  fn send(
    &self,
    request: ApiRequest,
  ) -> impl Future<Output = Result<ApiResponse, FetchError>> + Send;
}

/// reqwest-backed transport with a cookie jar for the session cookie.
#[derive(Clone)]
pub struct HttpTransport {
  client: reqwest::Client,
  base: Url,
}

impl HttpTransport {
  /// `base_url` may carry a path prefix (e.g. `https://host/stockdb`); request
  /// paths are resolved below it.
  pub fn new(base_url: &str) -> Result<Self> {
    let mut base =
      Url::parse(base_url).map_err(|e| eyre!("Invalid server url '{}': {}", base_url, e))?;
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }

    let client = reqwest::Client::builder()
      .cookie_store(true)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, base })
  }

  fn url_for(&self, path: &str) -> Result<Url, FetchError> {
    self
      .base
      .join(path.trim_start_matches('/'))
      .map_err(|e| FetchError::Network(format!("invalid request path '{}': {}", path, e)))
  }
}

impl Transport for HttpTransport {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse, FetchError> {
    let url = self.url_for(&request.path)?;

    let builder = match request.method {
      Method::Get => self.client.get(url),
      Method::Post => self.client.post(url),
      Method::Put => self.client.put(url),
      Method::Delete => self.client.delete(url),
    };
    let builder = match &request.body {
      Some(body) => builder.json(body),
      None => builder,
    };

    let response = builder
      .send()
      .await
      .map_err(|e| FetchError::Network(e.to_string()))?;

    let status = response.status();
    let body = response
      .bytes()
      .await
      .map_err(|e| FetchError::Network(e.to_string()))?;

    Ok(ApiResponse {
      status: status.as_u16(),
      status_text: status.canonical_reason().unwrap_or_default().to_string(),
      body: body.to_vec(),
    })
  }
}
