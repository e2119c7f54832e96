//! Types matching the backend's JSON payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Accounts and transactions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
  pub id: i32,
  #[serde(default)]
  pub user_id: i32,
  pub name: String,
  pub iban: Option<String>,
}

/// Account as sent on creation; the server assigns id and owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
  pub name: String,
  pub iban: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
  pub id: i32,
  pub account_id: i32,
  pub isin: String,
  pub date: DateTime<Utc>,
  pub units: f64,
  /// Cents; negative means money left the account. Excludes fees.
  pub amount: i64,
  /// Cents, normally negative
  pub fees: i64,
  pub onvista_exchange_id: Option<i32>,
  #[serde(default)]
  pub comments: String,
  pub exchange: Option<String>,
  pub receipt_number: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
  pub account_id: i32,
  pub isin: String,
  pub date: DateTime<Utc>,
  pub units: f64,
  pub amount: i64,
  pub fees: i64,
  pub onvista_exchange_id: Option<i32>,
  #[serde(default)]
  pub comments: String,
  /// Trading venue, e.g. "Tradegate"
  #[serde(default)]
  pub exchange: Option<String>,
  #[serde(default)]
  pub receipt_number: Option<i64>,
}

// ============================================================================
// Stocks and performance
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInfo {
  pub isin: String,
  pub wkn: String,
  pub title: String,
  pub kind: String,
  #[serde(default)]
  pub company: String,
  // Breakdowns, holdings, exchange metadata etc.
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// One performance period (total, year to date, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPerformance {
  pub kind: String,
  pub irr_annual: Option<f64>,
  pub irr_period: Option<f64>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

// ============================================================================
// Plot series
// ============================================================================
//
// The derived fields are absent on the wire and filled in by `plot::process_*`.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPlotPoint {
  pub date: String,
  pub invested: f64,
  pub value: Option<f64>,
  #[serde(default)]
  pub earnings: Option<f64>,
  #[serde(default)]
  pub earnings_rel_invested: Option<f64>,
  #[serde(default)]
  pub epoch: Option<i64>,
  #[serde(default)]
  pub value_rel_start: Option<f64>,
  #[serde(default)]
  pub invested_rel_start: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPlot {
  pub points: Vec<PortfolioPlotPoint>,
  #[serde(default)]
  pub exchanges: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPlotPoint {
  pub date: String,
  #[serde(default)]
  pub units: f64,
  pub invested: f64,
  pub price_date: Option<String>,
  pub price: Option<f64>,
  pub value: Option<f64>,
  #[serde(default)]
  pub earnings: Option<f64>,
  #[serde(default)]
  pub earnings_rel_invested: Option<f64>,
  #[serde(default)]
  pub epoch: Option<i64>,
  #[serde(default)]
  pub value_rel_start: Option<f64>,
  #[serde(default)]
  pub invested_rel_start: Option<f64>,
  #[serde(default)]
  pub price_rel_start: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPlot {
  pub points: Vec<StockPlotPoint>,
  #[serde(default)]
  pub exchange: Value,
}

// ============================================================================
// Session, receipts, push
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
  pub id: i32,
  pub name: String,
  pub full_name: String,
  #[serde(default)]
  pub application_server_key: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData<'a> {
  pub user_name: &'a str,
  pub password: &'a str,
}

/// A receipt file as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptFile {
  pub name: String,
  pub bytes: Vec<u8>,
}

/// Upload form of a receipt: base64 encoded contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedReceipt {
  pub name: String,
  pub bytes: String,
}

impl ReceiptFile {
  pub fn encode(&self) -> EncodedReceipt {
    use base64::Engine;

    EncodedReceipt {
      name: self.name.clone(),
      bytes: base64::engine::general_purpose::STANDARD.encode(&self.bytes),
    }
  }
}
