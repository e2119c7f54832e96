//! Fetch orchestration on top of the [`Store`].
//!
//! `update_*` calls are cheap when nothing is due: the staleness check runs
//! under the store lock and only an entry that needs a refetch causes a
//! request. Request and response are separate transitions, so the caller is
//! never blocked beyond the returned future and subscribers see the in-flight
//! state.
//!
//! Fetch errors are stored in the affected entry, never returned. The only
//! `Err` these methods produce is a poisoned store lock.

mod mutations;
mod session;

use color_eyre::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{ApiRequest, FetchError, Transport};
use crate::cache::{CacheEntry, CacheEvent, Clock, StalenessPolicy, SystemClock};
use crate::resources::{
  AccountsKey, PerformanceKey, PortfolioPlotKey, ResourceKey, ResourceKind, StockPlotKey,
  StocksKey, TransactionsKey,
};
use crate::state::Store;

/// Client for the portfolio backend with a shared resource cache.
pub struct Client<T: Transport, C: Clock = SystemClock> {
  store: Store,
  transport: Arc<T>,
  clock: Arc<C>,
  policy: StalenessPolicy,
}

impl<T: Transport> Client<T, SystemClock> {
  pub fn new(store: Store, transport: T) -> Self {
    Self::with_clock(store, transport, SystemClock)
  }
}

impl<T: Transport, C: Clock> Client<T, C> {
  pub fn with_clock(store: Store, transport: T, clock: C) -> Self {
    Self {
      store,
      transport: Arc::new(transport),
      clock: Arc::new(clock),
      policy: StalenessPolicy::default(),
    }
  }

  pub fn store(&self) -> &Store {
    &self.store
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }

  pub fn clock(&self) -> &C {
    &self.clock
  }

  /// Fetch `key` if its entry is missing, stale, errored or expired.
  pub async fn update<K: ResourceKey>(&self, key: &K) -> Result<()> {
    let now = self.clock.now();
    let policy = self.policy;

    let due = self.store.mutate(|state| {
      let entry = key.entry(state);
      if !policy.check(entry, now) {
        return false;
      }
      entry.apply(CacheEvent::FetchRequested);
      true
    })?;

    if !due {
      debug!(resource = %key.resource(), "Cache entry is fresh, skipping fetch");
      return Ok(());
    }

    self.store.notify();
    self.fetch(key).await
  }

  /// Issue the request for `key` and settle its entry. Assumes the entry is
  /// already marked in flight.
  async fn fetch<K: ResourceKey>(&self, key: &K) -> Result<()> {
    let resource = key.resource();
    debug!(resource = %resource, "Fetching");

    let result = self
      .transport
      .send(ApiRequest::get(resource.endpoint()))
      .await
      .and_then(|response| response.json::<K::Wire>())
      .map(K::post_process);

    let at = self.clock.now();
    let event = match result {
      Ok(data) => CacheEvent::FetchSucceeded { data, at },
      Err(error) => {
        warn!(resource = %resource, error = %error, "Fetch failed");
        CacheEvent::FetchFailed { error, at }
      }
    };

    self.store.dispatch(|state| key.entry(state).apply(event))
  }

  /// Current entry for `key`, if one exists.
  pub fn entry<K: ResourceKey>(&self, key: &K) -> Result<Option<CacheEntry<K::Data>>>
  where
    K::Data: Clone,
  {
    self.store.read(|state| key.get(state).cloned())
  }

  pub fn invalidate(&self, kind: ResourceKind) -> Result<()> {
    info!(resource = kind.name(), "Invalidating");
    self.store.dispatch(|state| state.invalidate(kind))
  }

  pub async fn update_stocks(&self) -> Result<()> {
    self.update(&StocksKey).await
  }

  pub async fn update_performance(&self) -> Result<()> {
    self.update(&PerformanceKey).await
  }

  pub async fn update_accounts(&self) -> Result<()> {
    self.update(&AccountsKey).await
  }

  pub async fn update_transactions(&self) -> Result<()> {
    self.update(&TransactionsKey).await
  }

  pub async fn update_portfolio_plot(&self, key: &PortfolioPlotKey) -> Result<()> {
    self.update(key).await
  }

  pub async fn update_stock_plot(&self, key: &StockPlotKey) -> Result<()> {
    self.update(key).await
  }

  pub fn invalidate_stocks(&self) -> Result<()> {
    self.invalidate(ResourceKind::Stocks)
  }

  pub fn invalidate_performance(&self) -> Result<()> {
    self.invalidate(ResourceKind::Performance)
  }

  pub fn invalidate_accounts(&self) -> Result<()> {
    self.invalidate(ResourceKind::Accounts)
  }

  pub fn invalidate_transactions(&self) -> Result<()> {
    self.invalidate(ResourceKind::Transactions)
  }

  /// Send a request whose response body is ignored beyond its status.
  async fn send_status(&self, request: ApiRequest) -> Result<(), FetchError> {
    self.transport.send(request).await?.error_for_status()?;
    Ok(())
  }
}

impl<T: Transport, C: Clock> Clone for Client<T, C> {
  fn clone(&self) -> Self {
    Self {
      store: self.store.clone(),
      transport: Arc::clone(&self.transport),
      clock: Arc::clone(&self.clock),
      policy: self.policy,
    }
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::api::transport::mock::{json_response, ScriptedTransport};
  use crate::api::Method;
  use crate::cache::ManualClock;
  use crate::resources::PlotSource;
  use chrono::{DateTime, Duration, TimeZone, Utc};
  use serde_json::json;

  pub(crate) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 6, 1, 8, 0, 0).unwrap()
  }

  pub(crate) fn client(transport: ScriptedTransport) -> Client<ScriptedTransport, ManualClock> {
    Client::with_clock(Store::new(), transport, ManualClock::new(start()))
  }

  fn stocks_body() -> serde_json::Value {
    json!([{ "isin": "IE00B4L5Y983", "wkn": "A0RPWH", "title": "ISHARES CORE MSCI WORLD",
             "kind": "ETF", "company": "BlackRock" }])
  }

  #[tokio::test]
  async fn first_update_fetches_and_second_is_served_from_cache() {
    let client = client(ScriptedTransport::new().json(Method::Get, "/api/stocks", 200, stocks_body()));

    client.update_stocks().await.unwrap();
    client.update_stocks().await.unwrap();

    assert_eq!(client.transport().request_count(Method::Get, "/api/stocks"), 1);
    let entry = client.entry(&StocksKey).unwrap().unwrap();
    assert!(!entry.is_fetching);
    assert!(!entry.did_invalidate);
    assert_eq!(entry.last_updated, Some(start()));
    assert_eq!(entry.data.unwrap()[0].isin, "IE00B4L5Y983");
  }

  #[tokio::test]
  async fn in_flight_entry_is_not_refetched() {
    let client = client(ScriptedTransport::new().json(Method::Get, "/api/stocks", 200, stocks_body()));
    client
      .store()
      .mutate(|s| s.stocks.apply(CacheEvent::FetchRequested))
      .unwrap();

    client.clock().advance(Duration::days(2));
    client.update_stocks().await.unwrap();

    assert!(client.transport().requests().is_empty());
  }

  #[tokio::test]
  async fn concurrent_updates_issue_one_request() {
    let client = client(ScriptedTransport::new().json(Method::Get, "/api/stocks", 200, stocks_body()));

    let (a, b) = tokio::join!(client.update_stocks(), client.update_stocks());
    a.unwrap();
    b.unwrap();

    assert_eq!(client.transport().request_count(Method::Get, "/api/stocks"), 1);
  }

  #[tokio::test]
  async fn expired_entry_is_refetched() {
    let client = client(ScriptedTransport::new().json(Method::Get, "/api/stocks", 200, stocks_body()));
    client.update_stocks().await.unwrap();

    client.clock().advance(Duration::milliseconds(crate::cache::TTL_MILLIS - 1));
    client.update_stocks().await.unwrap();
    assert_eq!(client.transport().request_count(Method::Get, "/api/stocks"), 1);

    client.clock().advance(Duration::milliseconds(2));
    client.update_stocks().await.unwrap();
    assert_eq!(client.transport().request_count(Method::Get, "/api/stocks"), 2);
  }

  #[tokio::test]
  async fn transport_error_is_stored_and_data_kept() {
    let transport = ScriptedTransport::new()
      .json(Method::Get, "/api/stocks", 200, stocks_body())
      .json(Method::Get, "/api/stocks", 500, json!({}));
    let client = client(transport);

    client.update_stocks().await.unwrap();
    let before = client.entry(&StocksKey).unwrap().unwrap();

    client.invalidate_stocks().unwrap();
    client.clock().advance(Duration::seconds(1));
    client.update_stocks().await.unwrap();

    let after = client.entry(&StocksKey).unwrap().unwrap();
    assert_eq!(after.data, before.data);
    assert_eq!(
      after.error,
      Some(FetchError::transport(500, "Internal Server Error"))
    );
    assert!(after.did_invalidate);
    assert_eq!(after.last_updated, Some(start() + Duration::seconds(1)));
  }

  #[tokio::test]
  async fn failing_resource_is_retried_on_every_access() {
    let client = client(ScriptedTransport::new().json(
      Method::Get,
      "/api/analysis/performance",
      200,
      json!({ "error": "portfolio computation failed" }),
    ));

    for _ in 0..3 {
      client.update_performance().await.unwrap();
    }

    assert_eq!(
      client
        .transport()
        .request_count(Method::Get, "/api/analysis/performance"),
      3
    );
    let entry = client.entry(&PerformanceKey).unwrap().unwrap();
    assert_eq!(
      entry.error,
      Some(FetchError::Application(json!("portfolio computation failed")))
    );
  }

  #[tokio::test]
  async fn network_failure_is_stored() {
    let client = client(ScriptedTransport::new().respond(
      Method::Get,
      "/api/accounts",
      Err(FetchError::Network("connection refused".into())),
    ));

    client.update_accounts().await.unwrap();

    let accounts = client.store().snapshot(|s| &s.accounts).unwrap();
    assert!(accounts.items().is_empty());
    assert_eq!(
      accounts.list.error,
      Some(FetchError::Network("connection refused".into()))
    );
  }

  #[tokio::test]
  async fn plot_entries_are_unique_per_key_and_post_processed() {
    let path = "/api/analysis/plots/IE00B4L5Y983?start=2021-01-01&end=2021-01-31&source=auto";
    let transport = ScriptedTransport::new().respond(
      Method::Get,
      path,
      Ok(json_response(
        200,
        json!({
          "points": [
            { "date": "2021-01-01T00:00:00Z", "units": 1.0, "invested": 100.0,
              "priceDate": null, "price": 100.0, "value": 100.0 },
            { "date": "2021-01-02T00:00:00Z", "units": 1.0, "invested": 100.0,
              "priceDate": null, "price": null, "value": null }
          ],
          "exchange": {}
        }),
      )),
    );
    let client = client(transport);
    let key = StockPlotKey::new("IE00B4L5Y983", "2021-01-01", "2021-01-31", PlotSource::Auto);

    client.update_stock_plot(&key).await.unwrap();
    client.invalidate(ResourceKind::StockPlot).unwrap();
    client.update_stock_plot(&key.clone()).await.unwrap();

    assert_eq!(client.transport().request_count(Method::Get, path), 2);
    let (count, entry) = client
      .store()
      .read(|s| (s.stock_plots.len(), s.stock_plot(&key).cloned()))
      .unwrap();
    assert_eq!(count, 1);
    let plot = entry.unwrap().data.unwrap();
    assert_eq!(plot.points.len(), 1);
    assert_eq!(plot.points[0].price_rel_start, Some(0.0));
  }

  #[tokio::test]
  async fn distinct_plot_keys_get_distinct_entries() {
    let client = client(ScriptedTransport::new());
    let a = PortfolioPlotKey::new("2021-01-01", "2021-02-01", PlotSource::Auto);
    let b = PortfolioPlotKey::new("2021-01-01", "2021-02-01", PlotSource::Historical);

    client.update_portfolio_plot(&a).await.unwrap();
    client.update_portfolio_plot(&b).await.unwrap();

    let len = client.store().read(|s| s.portfolio_plots.len()).unwrap();
    assert_eq!(len, 2);
  }

  #[tokio::test]
  async fn update_notifies_subscribers_twice_per_fetch() {
    let client = client(ScriptedTransport::new().json(Method::Get, "/api/stocks", 200, stocks_body()));

    client.update_stocks().await.unwrap();
    assert_eq!(client.store().revision(), 2);

    // Fresh entry: no transition, no notification.
    client.update_stocks().await.unwrap();
    assert_eq!(client.store().revision(), 2);
  }
}
