//! Process-wide client state and the container that guards it.

pub mod push;
pub mod receipts;
pub mod session;

use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use crate::api::types::{
  Account, PortfolioPerformance, PortfolioPlot, StockInfo, StockPlot, Transaction,
};
use crate::cache::{CacheEntry, CacheEvent, EntityStore, KeyedStore, ModifyEvent};
use crate::resources::{PortfolioPlotKey, ResourceKind, StockPlotKey};

pub use push::{PushEvent, PushState};
pub use receipts::{ReceiptsEvent, ReceiptsState};
pub use session::{SessionEvent, SessionState};

/// Which entity store a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
  Account,
  Transaction,
}

/// All cached client state.
#[derive(Debug, Default)]
pub struct AppState {
  pub stocks: CacheEntry<Vec<StockInfo>>,
  pub performance: CacheEntry<Vec<PortfolioPerformance>>,
  pub portfolio_plots: KeyedStore<PortfolioPlotKey, PortfolioPlot>,
  pub stock_plots: KeyedStore<StockPlotKey, StockPlot>,
  pub accounts: EntityStore<Account>,
  pub transactions: EntityStore<Transaction>,
  pub receipts: ReceiptsState,
  pub session: SessionState,
  pub push: PushState,
}

impl AppState {
  pub fn new() -> Self {
    Self::default()
  }

  /// Mark every entry of `kind` stale.
  pub fn invalidate(&mut self, kind: ResourceKind) {
    match kind {
      ResourceKind::Stocks => self.stocks.apply(CacheEvent::Invalidate),
      ResourceKind::Performance => self.performance.apply(CacheEvent::Invalidate),
      ResourceKind::Accounts => self.accounts.apply(CacheEvent::Invalidate),
      ResourceKind::Transactions => self.transactions.apply(CacheEvent::Invalidate),
      ResourceKind::PortfolioPlot => self.portfolio_plots.invalidate_all(),
      ResourceKind::StockPlot => self.stock_plots.invalidate_all(),
    }
  }

  pub fn apply_modify(&mut self, entity: EntityKind, event: ModifyEvent) {
    match entity {
      EntityKind::Account => self.accounts.apply_modify(event),
      EntityKind::Transaction => self.transactions.apply_modify(event),
    }
  }

  pub fn is_authenticated(&self) -> bool {
    self.session.is_authenticated()
  }

  pub fn portfolio_plot(&self, key: &PortfolioPlotKey) -> Option<&CacheEntry<PortfolioPlot>> {
    self.portfolio_plots.get(key)
  }

  pub fn stock_plot(&self, key: &StockPlotKey) -> Option<&CacheEntry<StockPlot>> {
    self.stock_plots.get(key)
  }
}

/// Shared, injectable handle to the [`AppState`].
///
/// Every transition runs under the lock as one read-compute-replace step.
/// Readers get a revision counter through [`Store::subscribe`] that moves
/// whenever a dispatched event changed something observable.
#[derive(Clone)]
pub struct Store {
  state: Arc<Mutex<AppState>>,
  revision: Arc<watch::Sender<u64>>,
}

impl Default for Store {
  fn default() -> Self {
    Self::new()
  }
}

impl Store {
  pub fn new() -> Self {
    let (tx, _rx) = watch::channel(0);
    Self {
      state: Arc::new(Mutex::new(AppState::default())),
      revision: Arc::new(tx),
    }
  }

  /// Run `f` against the state without notifying subscribers.
  pub fn mutate<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> Result<R> {
    let mut state = self
      .state
      .lock()
      .map_err(|e| eyre!("State lock poisoned: {}", e))?;
    Ok(f(&mut state))
  }

  /// Apply a transition and notify subscribers.
  pub fn dispatch<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> Result<R> {
    let result = self.mutate(f)?;
    self.notify();
    Ok(result)
  }

  pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> Result<R> {
    let state = self
      .state
      .lock()
      .map_err(|e| eyre!("State lock poisoned: {}", e))?;
    Ok(f(&state))
  }

  /// Clone out a piece of state, e.g. one cache entry for rendering.
  pub fn snapshot<R: Clone>(&self, f: impl FnOnce(&AppState) -> &R) -> Result<R> {
    self.read(|state| f(state).clone())
  }

  pub fn notify(&self) {
    self.revision.send_modify(|revision| *revision += 1);
  }

  pub fn revision(&self) -> u64 {
    *self.revision.borrow()
  }

  /// Receiver that changes on every dispatched event.
  pub fn subscribe(&self) -> watch::Receiver<u64> {
    self.revision.subscribe()
  }
}

/// Serializable view of one entry, used by the CLI.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyed<'a, K: Serialize, T: Serialize> {
  pub key: &'a K,
  #[serde(flatten)]
  pub entry: &'a CacheEntry<T>,
}
