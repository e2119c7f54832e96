//! Derived analytics for plot series.
//!
//! Runs once on every successful plot fetch, before the result is cached.
//! Pure: the output depends only on the input series.

use chrono::{DateTime, NaiveDate};

use crate::api::types::{PortfolioPlot, StockPlot};

/// At most this many trailing points without a value are hidden.
pub const MAX_TRAILING_TRIM: usize = 5;

/// `value - invested`, or `None` without a value.
pub fn earnings(value: Option<f64>, invested: f64) -> Option<f64> {
  value.map(|v| v - invested)
}

/// Earnings in percent of the invested amount.
pub fn earnings_rel_invested(value: Option<f64>, invested: f64) -> Option<f64> {
  match value {
    Some(v) if invested != 0.0 => Some(((v - invested) / invested) * 100.0),
    _ => None,
  }
}

/// Change in percent relative to the first point's value; requires `first > 0`.
///
/// A missing current value yields `None`, not -100%: a gap in the series is
/// unknown, not a total loss.
pub fn rel_start(current: Option<f64>, first: Option<f64>) -> Option<f64> {
  match (current, first) {
    (Some(c), Some(f)) if f > 0.0 => Some(((c - f) / f) * 100.0),
    _ => None,
  }
}

/// Milliseconds since the epoch for an RFC 3339 timestamp or a bare
/// `YYYY-MM-DD` date (taken as UTC midnight).
pub fn epoch_millis(date: &str) -> Option<i64> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
    return Some(dt.timestamp_millis());
  }
  NaiveDate::parse_from_str(date, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc().timestamp_millis())
}

/// Drop trailing points without a value, at most [`MAX_TRAILING_TRIM`] of them.
pub fn trim_trailing_gaps<P>(points: &mut Vec<P>, value: impl Fn(&P) -> Option<f64>) {
  let mut trimmed = 0;
  while trimmed < MAX_TRAILING_TRIM && points.last().is_some_and(|p| value(p).is_none()) {
    points.pop();
    trimmed += 1;
  }
}

pub fn process_portfolio_plot(mut plot: PortfolioPlot) -> PortfolioPlot {
  for p in &mut plot.points {
    p.earnings = earnings(p.value, p.invested);
    p.earnings_rel_invested = earnings_rel_invested(p.value, p.invested);
    p.epoch = epoch_millis(&p.date);
  }

  if let Some(first) = plot.points.first() {
    let (first_value, first_invested) = (first.value, first.invested);
    for p in &mut plot.points {
      p.value_rel_start = rel_start(p.value, first_value);
      p.invested_rel_start = rel_start(Some(p.invested), Some(first_invested));
    }
  }

  trim_trailing_gaps(&mut plot.points, |p| p.value);
  plot
}

pub fn process_stock_plot(mut plot: StockPlot) -> StockPlot {
  for p in &mut plot.points {
    p.earnings = earnings(p.value, p.invested);
    p.earnings_rel_invested = earnings_rel_invested(p.value, p.invested);
    p.epoch = epoch_millis(&p.date);
  }

  if let Some(first) = plot.points.first() {
    let (first_value, first_invested, first_price) = (first.value, first.invested, first.price);
    for p in &mut plot.points {
      p.value_rel_start = rel_start(p.value, first_value);
      p.invested_rel_start = rel_start(Some(p.invested), Some(first_invested));
      p.price_rel_start = rel_start(p.price, first_price);
    }
  }

  trim_trailing_gaps(&mut plot.points, |p| p.value);
  plot
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::{PortfolioPlotPoint, StockPlotPoint};
  use serde_json::{json, Value};

  fn portfolio_point(date: &str, value: Option<f64>, invested: f64) -> PortfolioPlotPoint {
    PortfolioPlotPoint {
      date: date.to_string(),
      invested,
      value,
      earnings: None,
      earnings_rel_invested: None,
      epoch: None,
      value_rel_start: None,
      invested_rel_start: None,
    }
  }

  fn portfolio(points: Vec<PortfolioPlotPoint>) -> PortfolioPlot {
    PortfolioPlot {
      points,
      exchanges: Vec::new(),
    }
  }

  #[test]
  fn trailing_null_point_is_dropped() {
    let plot = process_portfolio_plot(portfolio(vec![
      portfolio_point("2021-01-01", Some(100.0), 100.0),
      portfolio_point("2021-01-02", None, 100.0),
    ]));

    assert_eq!(plot.points.len(), 1);
    let p = &plot.points[0];
    assert_eq!(p.date, "2021-01-01");
    assert_eq!(p.value, Some(100.0));
    assert_eq!(p.invested, 100.0);
    assert_eq!(p.earnings, Some(0.0));
    assert_eq!(p.earnings_rel_invested, Some(0.0));
    assert_eq!(p.value_rel_start, Some(0.0));
    assert_eq!(p.invested_rel_start, Some(0.0));
    assert_eq!(p.epoch, Some(1_609_459_200_000));
  }

  #[test]
  fn trimming_stops_after_five_points() {
    let mut points = vec![portfolio_point("2021-01-01", Some(10.0), 10.0)];
    for day in 2..=7 {
      points.push(portfolio_point(&format!("2021-01-0{}", day), None, 10.0));
    }

    let plot = process_portfolio_plot(portfolio(points));

    assert_eq!(plot.points.len(), 2);
    assert_eq!(plot.points[1].value, None);
    assert_eq!(plot.points[1].date, "2021-01-02");
  }

  #[test]
  fn all_null_series_of_five_is_emptied() {
    let points = (1..=5)
      .map(|d| portfolio_point(&format!("2021-01-0{}", d), None, 0.0))
      .collect();
    assert!(process_portfolio_plot(portfolio(points)).points.is_empty());
  }

  // A gap inside the series keeps its point, and its relative values stay
  // empty instead of collapsing to -100%.
  #[test]
  fn inner_gaps_are_kept() {
    let plot = process_portfolio_plot(portfolio(vec![
      portfolio_point("2021-01-01", Some(100.0), 100.0),
      portfolio_point("2021-01-02", None, 100.0),
      portfolio_point("2021-01-03", Some(110.0), 100.0),
    ]));

    assert_eq!(plot.points.len(), 3);
    assert_eq!(plot.points[1].earnings, None);
    assert_eq!(plot.points[1].value_rel_start, None);
    assert_eq!(plot.points[1].invested_rel_start, Some(0.0));
    assert_eq!(plot.points[2].value_rel_start, Some(10.0));
  }

  #[test]
  fn relative_values_follow_the_first_point() {
    let plot = process_portfolio_plot(portfolio(vec![
      portfolio_point("2021-01-01", Some(200.0), 100.0),
      portfolio_point("2021-01-02", Some(250.0), 150.0),
    ]));

    let p = &plot.points[1];
    assert_eq!(p.earnings, Some(100.0));
    assert!((p.earnings_rel_invested.unwrap() - 66.666_666).abs() < 1e-4);
    assert_eq!(p.value_rel_start, Some(25.0));
    assert_eq!(p.invested_rel_start, Some(50.0));
  }

  #[test]
  fn zero_start_disables_relative_values() {
    let plot = process_portfolio_plot(portfolio(vec![
      portfolio_point("2021-01-01", Some(0.0), 0.0),
      portfolio_point("2021-01-02", Some(50.0), 40.0),
    ]));

    assert_eq!(plot.points[0].earnings_rel_invested, None);
    assert_eq!(plot.points[1].value_rel_start, None);
    assert_eq!(plot.points[1].invested_rel_start, None);
    assert_eq!(plot.points[1].earnings, Some(10.0));
  }

  #[test]
  fn empty_series_is_left_alone() {
    assert!(process_portfolio_plot(portfolio(Vec::new())).points.is_empty());
  }

  #[test]
  fn stock_plot_computes_price_relative_to_start() {
    let raw: Value = json!({
      "points": [
        { "date": "2021-03-01T00:00:00Z", "units": 2.0, "invested": 100.0,
          "priceDate": "2021-03-01T00:00:00Z", "price": 50.0, "value": 100.0 },
        { "date": "2021-03-02T00:00:00Z", "units": 2.0, "invested": 100.0,
          "priceDate": "2021-03-02T00:00:00Z", "price": 55.0, "value": 110.0 },
        { "date": "2021-03-03T00:00:00Z", "units": 2.0, "invested": 100.0,
          "priceDate": null, "price": null, "value": null }
      ],
      "exchange": { "code": "GAT" }
    });
    let plot = process_stock_plot(serde_json::from_value(raw).unwrap());

    assert_eq!(plot.points.len(), 2);
    let p: &StockPlotPoint = &plot.points[1];
    assert!((p.price_rel_start.unwrap() - 10.0).abs() < 1e-9);
    assert!((p.value_rel_start.unwrap() - 10.0).abs() < 1e-9);
    assert_eq!(p.earnings, Some(10.0));
    assert_eq!(p.epoch, Some(1_614_643_200_000));
    assert_eq!(plot.exchange, json!({ "code": "GAT" }));
  }

  #[test]
  fn missing_price_inside_stock_series_has_no_relative_price() {
    let raw: Value = json!({
      "points": [
        { "date": "2021-03-01", "units": 1.0, "invested": 50.0,
          "priceDate": "2021-03-01", "price": 50.0, "value": 50.0 },
        { "date": "2021-03-02", "units": 1.0, "invested": 50.0,
          "priceDate": null, "price": null, "value": null },
        { "date": "2021-03-03", "units": 1.0, "invested": 50.0,
          "priceDate": "2021-03-03", "price": 60.0, "value": 60.0 }
      ],
      "exchange": null
    });
    let plot = process_stock_plot(serde_json::from_value(raw).unwrap());

    assert_eq!(plot.points.len(), 3);
    assert_eq!(plot.points[1].price_rel_start, None);
    assert_eq!(plot.points[1].value_rel_start, None);
    assert_eq!(plot.points[2].price_rel_start, Some(20.0));
  }

  #[test]
  fn epoch_handles_both_date_forms() {
    assert_eq!(epoch_millis("1970-01-02"), Some(86_400_000));
    assert_eq!(epoch_millis("1970-01-01T00:00:01+00:00"), Some(1_000));
    assert_eq!(epoch_millis("yesterday"), None);
  }

  #[test]
  fn derived_fields_serialize_in_camel_case() {
    let plot = process_portfolio_plot(portfolio(vec![portfolio_point(
      "2021-01-01",
      Some(100.0),
      100.0,
    )]));
    let value = serde_json::to_value(&plot.points[0]).unwrap();
    assert_eq!(value["earningsRelInvested"], json!(0.0));
    assert_eq!(value["valueRelStart"], json!(0.0));
    assert_eq!(value["epoch"], json!(1_609_459_200_000i64));
  }
}
