//! The per-resource cache entry and its transition function.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::FetchError;

/// Lifecycle events of a cache entry.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent<T> {
  /// Mark the entry stale; the next access refetches.
  Invalidate,
  FetchRequested,
  FetchSucceeded { data: T, at: DateTime<Utc> },
  FetchFailed { error: FetchError, at: DateTime<Utc> },
}

/// Cached state of one remote value.
///
/// An entry is either in flight (`is_fetching`) or settled. `data` survives
/// refetches and failures so stale content stays renderable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
  pub is_fetching: bool,
  pub did_invalidate: bool,
  pub data: Option<T>,
  pub error: Option<FetchError>,
  /// When the last fetch attempt completed, successful or not
  pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Default for CacheEntry<T> {
  /// Fresh entries are stale, so the first access always fetches.
  fn default() -> Self {
    Self {
      is_fetching: false,
      did_invalidate: true,
      data: None,
      error: None,
      last_updated: None,
    }
  }
}

impl<T> CacheEntry<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Apply an event in place.
  pub fn apply(&mut self, event: CacheEvent<T>) {
    match event {
      CacheEvent::Invalidate => {
        self.did_invalidate = true;
      }
      CacheEvent::FetchRequested => {
        self.is_fetching = true;
      }
      CacheEvent::FetchSucceeded { data, at } => {
        self.is_fetching = false;
        self.did_invalidate = false;
        self.data = Some(data);
        self.error = None;
        self.last_updated = Some(at);
      }
      CacheEvent::FetchFailed { error, at } => {
        // Data is kept; the entry re-arms itself for a retry.
        self.is_fetching = false;
        self.did_invalidate = true;
        self.error = Some(error);
        self.last_updated = Some(at);
      }
    }
  }

  /// Pure form of [`apply`](Self::apply).
  pub fn reduce(mut self, event: CacheEvent<T>) -> Self {
    self.apply(event);
    self
  }

  pub fn data(&self) -> Option<&T> {
    self.data.as_ref()
  }

  pub fn error(&self) -> Option<&FetchError> {
    self.error.as_ref()
  }

  pub fn is_settled(&self) -> bool {
    !self.is_fetching && self.last_updated.is_some()
  }
}
