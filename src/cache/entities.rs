//! Store for mutable domain entities (accounts, transactions).
//!
//! The list itself is an ordinary [`CacheEntry`]; on top of it we track
//! whether a create/update/delete is in flight and how the last one ended.

use serde::Serialize;

use super::entry::{CacheEntry, CacheEvent};
use crate::api::FetchError;

#[derive(Debug, Clone, PartialEq)]
pub enum ModifyEvent {
  Requested,
  Succeeded,
  Failed(FetchError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyState {
  pub is_modifying: bool,
  pub modify_error: Option<FetchError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStore<T> {
  #[serde(flatten)]
  pub list: CacheEntry<Vec<T>>,
  #[serde(flatten)]
  pub modify: ModifyState,
}

impl<T> Default for EntityStore<T> {
  fn default() -> Self {
    Self {
      list: CacheEntry::new(),
      modify: ModifyState::default(),
    }
  }
}

impl<T> EntityStore<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Loaded items, empty until the first successful fetch.
  pub fn items(&self) -> &[T] {
    self.list.data.as_deref().unwrap_or_default()
  }

  pub fn apply(&mut self, event: CacheEvent<Vec<T>>) {
    self.list.apply(event);
  }

  /// Any settled mutation, successful or not, invalidates the list so the
  /// next read comes from the server rather than a local edit.
  pub fn apply_modify(&mut self, event: ModifyEvent) {
    match event {
      ModifyEvent::Requested => {
        self.modify.is_modifying = true;
      }
      ModifyEvent::Succeeded => {
        self.modify.is_modifying = false;
        self.modify.modify_error = None;
        self.list.apply(CacheEvent::Invalidate);
      }
      ModifyEvent::Failed(error) => {
        self.modify.is_modifying = false;
        self.modify.modify_error = Some(error);
        self.list.apply(CacheEvent::Invalidate);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn loaded() -> EntityStore<&'static str> {
    let mut store = EntityStore::new();
    store.apply(CacheEvent::FetchSucceeded {
      data: vec!["a", "b"],
      at: Utc::now(),
    });
    store
  }

  #[test]
  fn items_are_empty_before_first_fetch() {
    let store = EntityStore::<u8>::new();
    assert!(store.items().is_empty());
  }

  #[test]
  fn modify_success_invalidates_list() {
    let mut store = loaded();
    assert!(!store.list.did_invalidate);

    store.apply_modify(ModifyEvent::Requested);
    assert!(store.modify.is_modifying);

    store.apply_modify(ModifyEvent::Succeeded);
    assert!(!store.modify.is_modifying);
    assert!(store.list.did_invalidate);
    assert_eq!(store.items(), &["a", "b"]);
  }

  #[test]
  fn modify_failure_records_error_and_invalidates() {
    let mut store = loaded();
    store.apply_modify(ModifyEvent::Requested);
    store.apply_modify(ModifyEvent::Failed(FetchError::transport(404, "Not Found")));

    assert!(!store.modify.is_modifying);
    assert_eq!(
      store.modify.modify_error,
      Some(FetchError::transport(404, "Not Found"))
    );
    assert!(store.list.did_invalidate);
  }

  #[test]
  fn success_clears_previous_modify_error() {
    let mut store = loaded();
    store.apply_modify(ModifyEvent::Failed(FetchError::transport(500, "")));
    store.apply_modify(ModifyEvent::Succeeded);
    assert_eq!(store.modify.modify_error, None);
  }
}
