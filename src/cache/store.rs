//! Resource store for parameterized resources.

use super::entry::{CacheEntry, CacheEvent};

/// Ordered, append-only collection of cache entries keyed by a composite key.
///
/// Keys are compared structurally. Writes go through lookup-or-insert, so a
/// key never owns more than one entry; entries are never removed.
#[derive(Debug, Clone)]
pub struct KeyedStore<K, T> {
  items: Vec<(K, CacheEntry<T>)>,
}

impl<K, T> Default for KeyedStore<K, T> {
  fn default() -> Self {
    Self { items: Vec::new() }
  }
}

impl<K: PartialEq + Clone, T> KeyedStore<K, T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, key: &K) -> Option<&CacheEntry<T>> {
    self.items.iter().find(|(k, _)| k == key).map(|(_, e)| e)
  }

  /// Entry for `key`, appending a fresh one if the key is new.
  pub fn entry(&mut self, key: &K) -> &mut CacheEntry<T> {
    let idx = match self.items.iter().position(|(k, _)| k == key) {
      Some(idx) => idx,
      None => {
        self.items.push((key.clone(), CacheEntry::new()));
        self.items.len() - 1
      }
    };
    &mut self.items[idx].1
  }

  pub fn dispatch(&mut self, key: &K, event: CacheEvent<T>) {
    self.entry(key).apply(event);
  }

  pub fn invalidate_all(&mut self) {
    for (_, entry) in &mut self.items {
      entry.apply(CacheEvent::Invalidate);
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (&K, &CacheEntry<T>)> {
    self.items.iter().map(|(k, e)| (k, e))
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}
