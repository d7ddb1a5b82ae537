//! Analytics payload validation
//!
//! The backend payload is treated as untrusted. Each chart section is checked
//! on its own; a malformed section is rejected without touching the others.
//!
//! Expected sections (all optional):
//! ```text
//! { "dates": [str], "balances": [num],
//!   "daily_pnl": [{"date": str, "pnl": num}],
//!   "win_loss": {"wins": int, "losses": int},
//!   "risk_metrics": {"max_drawdown", "risk_per_trade", "daily_risk",
//!                    "win_rate", "sharpe_ratio"} }
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

use super::registry::{ChartKind, ChartUpdate, GREEN, RED, RISK_AXES};

/// Balance points kept for the history chart
pub const MAX_HISTORY_POINTS: usize = 100;

/// Risk-manager limits the radar is scaled against
pub const MAX_DRAWDOWN: f64 = 0.15;
pub const MAX_RISK_PER_TRADE: f64 = 0.02;
pub const MAX_DAILY_RISK: f64 = 0.06;
pub const SHARPE_TARGET: f64 = 3.0;

/// Why a payload or section was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("`{field}` should be {expected}")]
    WrongType { field: String, expected: &'static str },

    #[error("`{left}` has {left_len} entries but `{right}` has {right_len}")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("`{field}` has a non-finite value")]
    NonFinite { field: String },

    #[error("`{field}` must not be negative")]
    Negative { field: String },
}

fn wrong_type(field: impl Into<String>, expected: &'static str) -> ShapeError {
    ShapeError::WrongType {
        field: field.into(),
        expected,
    }
}

/// Outcome of validating one payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedPayload {
    /// Updates in display order
    pub updates: Vec<ChartUpdate>,
    /// Sections that were present but malformed
    pub rejected: Vec<(ChartKind, ShapeError)>,
    /// Sections the backend actually sent (derived charts excluded)
    pub sections_present: usize,
}

impl ValidatedPayload {
    /// Every section the backend sent was unusable
    pub fn all_rejected(&self) -> bool {
        self.sections_present > 0 && self.rejected.len() == self.sections_present
    }
}

/// Validate a raw analytics payload into chart updates
pub fn validate_payload(value: &Value) -> Result<ValidatedPayload, ShapeError> {
    let obj = value.as_object().ok_or(ShapeError::NotAnObject)?;
    let mut out = ValidatedPayload::default();

    let history = if obj.contains_key("dates") || obj.contains_key("balances") {
        out.sections_present += 1;
        match balance_history(obj) {
            Ok(points) => Some(points),
            Err(e) => {
                out.rejected.push((ChartKind::BalanceHistory, e));
                None
            }
        }
    } else {
        None
    };
    if let Some(points) = &history {
        out.updates.push(ChartUpdate {
            chart: ChartKind::BalanceHistory,
            labels: points.iter().map(|(d, _)| d.clone()).collect(),
            series: vec![points.iter().map(|(_, b)| *b).collect()],
            bar_colors: None,
        });
    }

    let daily = match obj.get("daily_pnl") {
        Some(raw) => {
            out.sections_present += 1;
            match daily_pnl(raw) {
                Ok(days) => Some(days),
                Err(e) => {
                    out.rejected.push((ChartKind::DailyPnl, e));
                    None
                }
            }
        }
        None => history
            .as_deref()
            .map(derive_daily_pnl)
            .filter(|days| !days.is_empty()),
    };
    if let Some(days) = &daily {
        out.updates.push(ChartUpdate {
            chart: ChartKind::DailyPnl,
            labels: days.iter().map(|(d, _)| d.clone()).collect(),
            series: vec![days.iter().map(|(_, p)| *p).collect()],
            bar_colors: Some(
                days.iter()
                    .map(|(_, p)| (if *p >= 0.0 { GREEN } else { RED }).to_string())
                    .collect(),
            ),
        });
    }

    let counts = match obj.get("win_loss") {
        Some(raw) => {
            out.sections_present += 1;
            match win_loss(raw) {
                Ok(counts) => Some(counts),
                Err(e) => {
                    out.rejected.push((ChartKind::WinLoss, e));
                    None
                }
            }
        }
        None => daily.as_deref().and_then(derive_win_loss),
    };
    if let Some((wins, losses)) = counts {
        out.updates.push(ChartUpdate {
            chart: ChartKind::WinLoss,
            labels: vec!["Wins".to_string(), "Losses".to_string()],
            series: vec![vec![wins as f64, losses as f64]],
            bar_colors: None,
        });
    }

    if let Some(raw) = obj.get("risk_metrics") {
        out.sections_present += 1;
        match risk_radar(raw) {
            Ok(scores) => out.updates.push(ChartUpdate {
                chart: ChartKind::RiskRadar,
                labels: RISK_AXES.iter().map(|a| (*a).to_string()).collect(),
                series: vec![scores.to_vec()],
                bar_colors: None,
            }),
            Err(e) => out.rejected.push((ChartKind::RiskRadar, e)),
        }
    }

    Ok(out)
}

fn finite(value: &Value, field: impl Into<String>) -> Result<f64, ShapeError> {
    let field = field.into();
    let n = value.as_f64().ok_or_else(|| wrong_type(field.clone(), "a number"))?;
    if n.is_finite() {
        Ok(n)
    } else {
        Err(ShapeError::NonFinite { field })
    }
}

fn balance_history(obj: &Map<String, Value>) -> Result<Vec<(String, f64)>, ShapeError> {
    let dates = obj
        .get("dates")
        .and_then(Value::as_array)
        .ok_or_else(|| wrong_type("dates", "an array of strings"))?;
    let balances = obj
        .get("balances")
        .and_then(Value::as_array)
        .ok_or_else(|| wrong_type("balances", "an array of numbers"))?;

    if dates.len() != balances.len() {
        return Err(ShapeError::LengthMismatch {
            left: "dates",
            left_len: dates.len(),
            right: "balances",
            right_len: balances.len(),
        });
    }

    // Every point is checked; only the newest MAX_HISTORY_POINTS are kept
    let mut points = dates
        .iter()
        .zip(balances)
        .enumerate()
        .map(|(i, (d, b))| -> Result<(String, f64), ShapeError> {
            let date = d
                .as_str()
                .ok_or_else(|| wrong_type(format!("dates[{i}]"), "a string"))?;
            Ok((date.to_string(), finite(b, format!("balances[{i}]"))?))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let skip = points.len().saturating_sub(MAX_HISTORY_POINTS);
    points.drain(..skip);
    Ok(points)
}

fn daily_pnl(raw: &Value) -> Result<Vec<(String, f64)>, ShapeError> {
    let entries = raw
        .as_array()
        .ok_or_else(|| wrong_type("daily_pnl", "an array of {date, pnl}"))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| -> Result<(String, f64), ShapeError> {
            let date = entry
                .get("date")
                .and_then(Value::as_str)
                .ok_or_else(|| wrong_type(format!("daily_pnl[{i}].date"), "a string"))?;
            let pnl = entry
                .get("pnl")
                .ok_or_else(|| wrong_type(format!("daily_pnl[{i}].pnl"), "a number"))?;
            Ok((date.to_string(), finite(pnl, format!("daily_pnl[{i}].pnl"))?))
        })
        .collect()
}

/// Day key of a timestamp such as `2024-03-05 14:00`
fn day_of(date: &str) -> &str {
    date.get(..10).unwrap_or(date)
}

/// Per-day P/L from balance snapshots: each day's closing balance minus the
/// previous day's closing balance (first day: minus its own opening balance)
fn derive_daily_pnl(points: &[(String, f64)]) -> Vec<(String, f64)> {
    // (day, open, close)
    let mut days: Vec<(&str, f64, f64)> = Vec::new();
    for (date, balance) in points {
        let day = day_of(date);
        match days.last_mut() {
            Some(last) if last.0 == day => last.2 = *balance,
            _ => days.push((day, *balance, *balance)),
        }
    }

    let mut prev_close: Option<f64> = None;
    days.into_iter()
        .map(|(day, open, close)| {
            let pnl = close - prev_close.unwrap_or(open);
            prev_close = Some(close);
            (day.to_string(), round2(pnl))
        })
        .collect()
}

fn derive_win_loss(days: &[(String, f64)]) -> Option<(u64, u64)> {
    let wins = days.iter().filter(|(_, p)| *p > 0.0).count() as u64;
    let losses = days.iter().filter(|(_, p)| *p < 0.0).count() as u64;
    (wins + losses > 0).then_some((wins, losses))
}

fn count(obj: &Map<String, Value>, field: &'static str) -> Result<u64, ShapeError> {
    let value = obj
        .get(field)
        .ok_or_else(|| wrong_type(format!("win_loss.{field}"), "a non-negative integer"))?;
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(n) if n < 0.0 => Err(ShapeError::Negative {
            field: format!("win_loss.{field}"),
        }),
        _ => Err(wrong_type(format!("win_loss.{field}"), "a non-negative integer")),
    }
}

fn win_loss(raw: &Value) -> Result<(u64, u64), ShapeError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| wrong_type("win_loss", "an object {wins, losses}"))?;
    Ok((count(obj, "wins")?, count(obj, "losses")?))
}

/// Fractions above 1 are taken as percentages
fn as_fraction(value: f64) -> f64 {
    if value > 1.0 { value / 100.0 } else { value }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn score(value: f64) -> f64 {
    round2(value.clamp(0.0, 100.0))
}

fn risk_radar(raw: &Value) -> Result<[f64; 5], ShapeError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| wrong_type("risk_metrics", "an object"))?;

    let metric = |key: &'static str, allow_negative: bool| -> Result<f64, ShapeError> {
        let Some(value) = obj.get(key) else {
            return Ok(0.0);
        };
        let field = format!("risk_metrics.{key}");
        let n = finite(value, field.clone())?;
        if n < 0.0 && !allow_negative {
            return Err(ShapeError::Negative { field });
        }
        Ok(n)
    };

    let drawdown = as_fraction(metric("max_drawdown", false)?);
    let per_trade = as_fraction(metric("risk_per_trade", false)?);
    let daily = as_fraction(metric("daily_risk", false)?);
    let win_rate = as_fraction(metric("win_rate", false)?);
    let sharpe = metric("sharpe_ratio", true)?;

    // Same order as RISK_AXES
    Ok([
        score(drawdown / MAX_DRAWDOWN * 100.0),
        score(per_trade / MAX_RISK_PER_TRADE * 100.0),
        score(daily / MAX_DAILY_RISK * 100.0),
        score(win_rate * 100.0),
        score(sharpe / SHARPE_TARGET * 100.0),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(payload: &ValidatedPayload, kind: ChartKind) -> Option<&ChartUpdate> {
        payload.updates.iter().find(|u| u.chart == kind)
    }

    #[test]
    fn test_rejects_non_object() {
        assert_eq!(validate_payload(&json!([1, 2])), Err(ShapeError::NotAnObject));
        assert_eq!(validate_payload(&json!(null)), Err(ShapeError::NotAnObject));
    }

    #[test]
    fn test_empty_object_is_no_data() {
        let payload = validate_payload(&json!({})).expect("object accepted");
        assert!(payload.updates.is_empty());
        assert!(!payload.all_rejected());
    }

    #[test]
    fn test_balance_history_derives_other_charts() {
        let payload = validate_payload(&json!({
            "dates": ["2024-03-04 09:00", "2024-03-04 18:00", "2024-03-05 09:00", "2024-03-05 18:00"],
            "balances": [1000.0, 1010.0, 1005.0, 990.0]
        }))
        .expect("valid payload");

        assert_eq!(payload.sections_present, 1);
        assert!(payload.rejected.is_empty());

        let balance = update(&payload, ChartKind::BalanceHistory).expect("balance chart");
        assert_eq!(balance.labels.len(), 4);
        assert_eq!(balance.series[0], vec![1000.0, 1010.0, 1005.0, 990.0]);

        let daily = update(&payload, ChartKind::DailyPnl).expect("derived daily chart");
        assert_eq!(daily.labels, vec!["2024-03-04", "2024-03-05"]);
        assert_eq!(daily.series[0], vec![10.0, -20.0]);
        assert_eq!(
            daily.bar_colors.as_deref(),
            Some(&[GREEN.to_string(), RED.to_string()][..])
        );

        let wl = update(&payload, ChartKind::WinLoss).expect("derived win/loss");
        assert_eq!(wl.series[0], vec![1.0, 1.0]);
        assert!(update(&payload, ChartKind::RiskRadar).is_none());
    }

    #[test]
    fn test_history_keeps_last_hundred_points() {
        let dates: Vec<String> = (0..150).map(|i| format!("2024-01-01 {i:03}")).collect();
        let balances: Vec<f64> = (0..150).map(f64::from).collect();
        let payload = validate_payload(&json!({"dates": dates, "balances": balances})).expect("valid");

        let balance = update(&payload, ChartKind::BalanceHistory).expect("balance chart");
        assert_eq!(balance.labels.len(), MAX_HISTORY_POINTS);
        assert_eq!(balance.labels[0], "2024-01-01 050");
        assert!((balance.series[0][99] - 149.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bad_point_outside_window_still_rejects() {
        let dates: Vec<String> = (0..150).map(|i| format!("2024-01-01 {i:03}")).collect();
        let mut balances: Vec<Value> = (0..150).map(|i| json!(f64::from(i))).collect();
        balances[0] = json!("garbage");
        let payload = validate_payload(&json!({"dates": dates, "balances": balances})).expect("object");

        assert!(payload.updates.is_empty());
        assert_eq!(payload.rejected.len(), 1);
        assert_eq!(payload.rejected[0].0, ChartKind::BalanceHistory);
        assert!(payload.all_rejected());
    }

    #[test]
    fn test_length_mismatch_rejects_only_balance() {
        let payload = validate_payload(&json!({
            "dates": ["2024-03-04"],
            "balances": [1.0, 2.0],
            "win_loss": {"wins": 7, "losses": 3}
        }))
        .expect("object accepted");

        assert_eq!(payload.sections_present, 2);
        assert!(matches!(
            payload.rejected[0],
            (ChartKind::BalanceHistory, ShapeError::LengthMismatch { left_len: 1, right_len: 2, .. })
        ));
        assert!(update(&payload, ChartKind::BalanceHistory).is_none());
        // No history to derive from, so no daily chart either
        assert!(update(&payload, ChartKind::DailyPnl).is_none());
        assert_eq!(update(&payload, ChartKind::WinLoss).expect("win/loss").series[0], vec![7.0, 3.0]);
        assert!(!payload.all_rejected());
    }

    #[test]
    fn test_string_balance_is_wrong_type() {
        let payload = validate_payload(&json!({"dates": ["a"], "balances": ["100"]})).expect("object");
        assert_eq!(
            payload.rejected,
            vec![(
                ChartKind::BalanceHistory,
                ShapeError::WrongType {
                    field: "balances[0]".into(),
                    expected: "a number"
                }
            )]
        );
        assert!(payload.all_rejected());
    }

    #[test]
    fn test_explicit_daily_pnl_wins_over_derived() {
        let payload = validate_payload(&json!({
            "dates": ["2024-03-04", "2024-03-05"],
            "balances": [1000.0, 2000.0],
            "daily_pnl": [{"date": "Mon", "pnl": -5.5}]
        }))
        .expect("valid");

        let daily = update(&payload, ChartKind::DailyPnl).expect("daily chart");
        assert_eq!(daily.labels, vec!["Mon"]);
        assert_eq!(daily.series[0], vec![-5.5]);
        assert_eq!(update(&payload, ChartKind::WinLoss).expect("derived").series[0], vec![0.0, 1.0]);
    }

    #[test]
    fn test_malformed_daily_pnl_entry() {
        let payload = validate_payload(&json!({"daily_pnl": [{"date": "Mon"}]})).expect("object");
        assert!(matches!(
            &payload.rejected[0],
            (ChartKind::DailyPnl, ShapeError::WrongType { field, .. }) if field == "daily_pnl[0].pnl"
        ));
        // A rejected explicit section is not replaced by derived data
        assert!(update(&payload, ChartKind::WinLoss).is_none());
    }

    #[test]
    fn test_win_loss_negative_and_fractional() {
        let negative = validate_payload(&json!({"win_loss": {"wins": -1, "losses": 0}})).expect("object");
        assert_eq!(
            negative.rejected[0].1,
            ShapeError::Negative {
                field: "win_loss.wins".into()
            }
        );

        let fractional = validate_payload(&json!({"win_loss": {"wins": 1, "losses": 0.5}})).expect("object");
        assert!(matches!(fractional.rejected[0].1, ShapeError::WrongType { .. }));
    }

    #[test]
    fn test_risk_radar_normalisation() {
        let payload = validate_payload(&json!({
            "risk_metrics": {
                "max_drawdown": 0.075,
                "risk_per_trade": 2.0,
                "daily_risk": 0.09,
                "win_rate": 55,
                "sharpe_ratio": -0.4
            }
        }))
        .expect("valid");

        let radar = update(&payload, ChartKind::RiskRadar).expect("radar chart");
        assert_eq!(radar.labels.len(), RISK_AXES.len());
        // drawdown half the limit, per-trade at limit, daily over limit (clamped),
        // win rate given as a percentage, negative sharpe floors at 0
        assert_eq!(radar.series[0], vec![50.0, 100.0, 100.0, 55.0, 0.0]);
    }

    #[test]
    fn test_risk_radar_missing_keys_are_zero() {
        let payload = validate_payload(&json!({"risk_metrics": {"sharpe_ratio": 1.5}})).expect("valid");
        let radar = update(&payload, ChartKind::RiskRadar).expect("radar chart");
        assert_eq!(radar.series[0], vec![0.0, 0.0, 0.0, 0.0, 50.0]);
    }

    #[test]
    fn test_risk_radar_rejects_text() {
        let payload = validate_payload(&json!({"risk_metrics": {"win_rate": "high"}})).expect("object");
        assert!(payload.all_rejected());
        assert_eq!(payload.rejected[0].0, ChartKind::RiskRadar);
    }
}
