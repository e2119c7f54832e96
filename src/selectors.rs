//! Lookups over cached state used when rendering.

use crate::api::types::{Account, StockInfo};
use crate::cache::{CacheEntry, EntityStore};

pub fn find_account(accounts: &EntityStore<Account>, id: i32) -> Option<&Account> {
  accounts.items().iter().find(|a| a.id == id)
}

/// Case-insensitive match on the trimmed account name.
pub fn find_account_by_name<'a>(accounts: &'a EntityStore<Account>, name: &str) -> Option<&'a Account> {
  let wanted = name.trim().to_uppercase();
  accounts
    .items()
    .iter()
    .find(|a| a.name.trim().to_uppercase() == wanted)
}

pub fn find_stock<'a>(stocks: &'a CacheEntry<Vec<StockInfo>>, isin: &str) -> Option<&'a StockInfo> {
  stocks.data()?.iter().find(|s| s.isin == isin)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheEvent;
  use chrono::Utc;
  use serde_json::Map;

  fn accounts() -> EntityStore<Account> {
    let mut store = EntityStore::new();
    store.apply(CacheEvent::FetchSucceeded {
      data: vec![
        Account {
          id: 1,
          user_id: 1,
          name: "Depot ".to_string(),
          iban: None,
        },
        Account {
          id: 2,
          user_id: 1,
          name: "Tagesgeld".to_string(),
          iban: Some("DE02120300000000202051".to_string()),
        },
      ],
      at: Utc::now(),
    });
    store
  }

  #[test]
  fn finds_account_by_id() {
    let store = accounts();
    assert_eq!(find_account(&store, 2).map(|a| a.name.as_str()), Some("Tagesgeld"));
    assert!(find_account(&store, 3).is_none());
  }

  #[test]
  fn finds_account_by_name_ignoring_case_and_whitespace() {
    let store = accounts();
    assert_eq!(find_account_by_name(&store, "  depot").map(|a| a.id), Some(1));
    assert!(find_account_by_name(&store, "Giro").is_none());
  }

  #[test]
  fn finds_stock_only_once_loaded() {
    let mut stocks = CacheEntry::new();
    assert!(find_stock(&stocks, "IE00B4L5Y983").is_none());

    stocks.apply(CacheEvent::FetchSucceeded {
      data: vec![StockInfo {
        isin: "IE00B4L5Y983".to_string(),
        wkn: "A0RPWH".to_string(),
        title: "ISHARES CORE MSCI WORLD".to_string(),
        kind: "ETF".to_string(),
        company: "BlackRock".to_string(),
        extra: Map::new(),
      }],
      at: Utc::now(),
    });
    assert_eq!(find_stock(&stocks, "IE00B4L5Y983").unwrap().wkn, "A0RPWH");
  }
}
