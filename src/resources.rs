//! Resource kinds, their keys and endpoints.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::form_urlencoded;

use crate::api::types::{
  Account, PortfolioPerformance, PortfolioPlot, StockInfo, StockPlot, Transaction,
};
use crate::cache::CacheEntry;
use crate::plot;
use crate::state::AppState;

/// Price source used by the backend when computing a plot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotSource {
  #[default]
  Auto,
  Realtime,
  Historical,
}

impl PlotSource {
  pub fn as_str(&self) -> &'static str {
    match self {
      PlotSource::Auto => "auto",
      PlotSource::Realtime => "realtime",
      PlotSource::Historical => "historical",
    }
  }
}

impl std::str::FromStr for PlotSource {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "auto" | "automatic" => Ok(PlotSource::Auto),
      "realtime" => Ok(PlotSource::Realtime),
      "historical" => Ok(PlotSource::Historical),
      other => Err(format!("unknown plot source '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPlotKey {
  pub start_date: String,
  pub end_date: String,
  pub source: PlotSource,
}

impl PortfolioPlotKey {
  pub fn new(start_date: impl Into<String>, end_date: impl Into<String>, source: PlotSource) -> Self {
    Self {
      start_date: start_date.into(),
      end_date: end_date.into(),
      source,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPlotKey {
  pub isin: String,
  pub start_date: String,
  pub end_date: String,
  pub source: PlotSource,
}

impl StockPlotKey {
  pub fn new(
    isin: impl Into<String>,
    start_date: impl Into<String>,
    end_date: impl Into<String>,
    source: PlotSource,
  ) -> Self {
    Self {
      isin: isin.into(),
      start_date: start_date.into(),
      end_date: end_date.into(),
      source,
    }
  }
}

/// Every fetchable resource, with the parameters that identify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
  Stocks,
  Performance,
  Accounts,
  Transactions,
  PortfolioPlot(PortfolioPlotKey),
  StockPlot(StockPlotKey),
}

impl Resource {
  pub fn kind(&self) -> ResourceKind {
    match self {
      Resource::Stocks => ResourceKind::Stocks,
      Resource::Performance => ResourceKind::Performance,
      Resource::Accounts => ResourceKind::Accounts,
      Resource::Transactions => ResourceKind::Transactions,
      Resource::PortfolioPlot(_) => ResourceKind::PortfolioPlot,
      Resource::StockPlot(_) => ResourceKind::StockPlot,
    }
  }

  /// Request path, query string included.
  pub fn endpoint(&self) -> String {
    match self {
      Resource::Stocks => "/api/stocks".to_string(),
      Resource::Performance => "/api/analysis/performance".to_string(),
      Resource::Accounts => "/api/accounts".to_string(),
      Resource::Transactions => "/api/transactions".to_string(),
      Resource::PortfolioPlot(key) => format!(
        "/api/analysis/plots/portfolio?{}",
        plot_query(&key.start_date, &key.end_date, key.source)
      ),
      Resource::StockPlot(key) => format!(
        "/api/analysis/plots/{}?{}",
        key.isin,
        plot_query(&key.start_date, &key.end_date, key.source)
      ),
    }
  }
}

impl fmt::Display for Resource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Resource::PortfolioPlot(key) => write!(
        f,
        "portfolio plot {}..{} ({})",
        key.start_date,
        key.end_date,
        key.source.as_str()
      ),
      Resource::StockPlot(key) => write!(
        f,
        "stock plot {} {}..{} ({})",
        key.isin,
        key.start_date,
        key.end_date,
        key.source.as_str()
      ),
      other => f.write_str(other.kind().name()),
    }
  }
}

fn plot_query(start: &str, end: &str, source: PlotSource) -> String {
  form_urlencoded::Serializer::new(String::new())
    .append_pair("start", start)
    .append_pair("end", end)
    .append_pair("source", source.as_str())
    .finish()
}

/// Resource identity without parameters; the unit of invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
  Stocks,
  Performance,
  Accounts,
  Transactions,
  PortfolioPlot,
  StockPlot,
}

impl ResourceKind {
  pub fn name(&self) -> &'static str {
    match self {
      ResourceKind::Stocks => "stocks",
      ResourceKind::Performance => "performance",
      ResourceKind::Accounts => "accounts",
      ResourceKind::Transactions => "transactions",
      ResourceKind::PortfolioPlot => "portfolio plot",
      ResourceKind::StockPlot => "stock plot",
    }
  }
}

// ============================================================================
// Typed keys
// ============================================================================

/// Binds a resource to its slot in [`AppState`] and its payload type.
pub trait ResourceKey: Send + Sync {
  /// What gets cached
  type Data: Send + 'static;
  /// What the endpoint returns
  type Wire: DeserializeOwned + Send;

  fn resource(&self) -> Resource;

  /// The cache entry for this key, created on first use.
  fn entry<'a>(&self, state: &'a mut AppState) -> &'a mut CacheEntry<Self::Data>;

  fn get<'a>(&self, state: &'a AppState) -> Option<&'a CacheEntry<Self::Data>>;

  /// Shaping applied to a successful response before it is cached.
  fn post_process(wire: Self::Wire) -> Self::Data;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StocksKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountsKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionsKey;

impl ResourceKey for StocksKey {
  type Data = Vec<StockInfo>;
  type Wire = Vec<StockInfo>;

  fn resource(&self) -> Resource {
    Resource::Stocks
  }

  fn entry<'a>(&self, state: &'a mut AppState) -> &'a mut CacheEntry<Self::Data> {
    &mut state.stocks
  }

  fn get<'a>(&self, state: &'a AppState) -> Option<&'a CacheEntry<Self::Data>> {
    Some(&state.stocks)
  }

  fn post_process(wire: Self::Wire) -> Self::Data {
    wire
  }
}

impl ResourceKey for PerformanceKey {
  type Data = Vec<PortfolioPerformance>;
  type Wire = Vec<PortfolioPerformance>;

  fn resource(&self) -> Resource {
    Resource::Performance
  }

  fn entry<'a>(&self, state: &'a mut AppState) -> &'a mut CacheEntry<Self::Data> {
    &mut state.performance
  }

  fn get<'a>(&self, state: &'a AppState) -> Option<&'a CacheEntry<Self::Data>> {
    Some(&state.performance)
  }

  fn post_process(wire: Self::Wire) -> Self::Data {
    wire
  }
}

impl ResourceKey for AccountsKey {
  type Data = Vec<Account>;
  type Wire = Vec<Account>;

  fn resource(&self) -> Resource {
    Resource::Accounts
  }

  fn entry<'a>(&self, state: &'a mut AppState) -> &'a mut CacheEntry<Self::Data> {
    &mut state.accounts.list
  }

  fn get<'a>(&self, state: &'a AppState) -> Option<&'a CacheEntry<Self::Data>> {
    Some(&state.accounts.list)
  }

  fn post_process(wire: Self::Wire) -> Self::Data {
    wire
  }
}

impl ResourceKey for TransactionsKey {
  type Data = Vec<Transaction>;
  type Wire = Vec<Transaction>;

  fn resource(&self) -> Resource {
    Resource::Transactions
  }

  fn entry<'a>(&self, state: &'a mut AppState) -> &'a mut CacheEntry<Self::Data> {
    &mut state.transactions.list
  }

  fn get<'a>(&self, state: &'a AppState) -> Option<&'a CacheEntry<Self::Data>> {
    Some(&state.transactions.list)
  }

  fn post_process(wire: Self::Wire) -> Self::Data {
    wire
  }
}

impl ResourceKey for PortfolioPlotKey {
  type Data = PortfolioPlot;
  type Wire = PortfolioPlot;

  fn resource(&self) -> Resource {
    Resource::PortfolioPlot(self.clone())
  }

  fn entry<'a>(&self, state: &'a mut AppState) -> &'a mut CacheEntry<Self::Data> {
    state.portfolio_plots.entry(self)
  }

  fn get<'a>(&self, state: &'a AppState) -> Option<&'a CacheEntry<Self::Data>> {
    state.portfolio_plots.get(self)
  }

  fn post_process(wire: Self::Wire) -> Self::Data {
    plot::process_portfolio_plot(wire)
  }
}

impl ResourceKey for StockPlotKey {
  type Data = StockPlot;
  type Wire = StockPlot;

  fn resource(&self) -> Resource {
    Resource::StockPlot(self.clone())
  }

  fn entry<'a>(&self, state: &'a mut AppState) -> &'a mut CacheEntry<Self::Data> {
    state.stock_plots.entry(self)
  }

  fn get<'a>(&self, state: &'a AppState) -> Option<&'a CacheEntry<Self::Data>> {
    state.stock_plots.get(self)
  }

  fn post_process(wire: Self::Wire) -> Self::Data {
    plot::process_stock_plot(wire)
  }
}
