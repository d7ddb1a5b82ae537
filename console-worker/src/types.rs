//! Common types for the operator console
//!
//! Shapes exchanged with the trading backend. Field names follow the
//! OANDA-style payloads the backend forwards (camelCase, `unrealizedPL`),
//! and numbers are accepted either as JSON numbers or numeric strings.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accept `1.5`, `"1.5"` or null (as 0.0)
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_f64(deserializer)?.unwrap_or(0.0))
}

/// Like [`lenient_f64`] but keeps null/absent as `None`
pub(crate) fn lenient_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| D::Error::custom("number out of range")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("not a number: {s:?}"))),
        Some(other) => Err(D::Error::custom(format!("expected number, got {other}"))),
    }
}

/// Accept ids sent as strings or bare integers
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected trade id, got {other}"))),
    }
}

/// Account summary shown in the header cards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub balance: f64,
    #[serde(rename = "unrealizedPL", default, deserialize_with = "lenient_f64")]
    pub unrealized_pl: f64,
    #[serde(rename = "marginUsed", default, deserialize_with = "lenient_f64")]
    pub margin_used: f64,
    #[serde(rename = "NAV", default, deserialize_with = "lenient_f64")]
    pub nav: f64,
    #[serde(rename = "openTradeCount", default)]
    pub open_trade_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Trade / signal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[serde(alias = "long", alias = "BUY", alias = "buy")]
    Long,
    #[serde(alias = "short", alias = "SELL", alias = "sell")]
    Short,
    #[serde(alias = "flat")]
    Flat,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
            Direction::Flat => write!(f, "FLAT"),
        }
    }
}

/// An open trade as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenTrade {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    pub instrument: String,
    #[serde(rename = "currentUnits", alias = "units", default, deserialize_with = "lenient_f64")]
    pub current_units: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(rename = "unrealizedPL", default, deserialize_with = "lenient_f64")]
    pub unrealized_pl: f64,
    #[serde(rename = "openTime", default, skip_serializing_if = "Option::is_none")]
    pub open_time: Option<String>,
    #[serde(rename = "stopLoss", default, deserialize_with = "lenient_opt_f64")]
    pub stop_loss: Option<f64>,
    #[serde(rename = "takeProfit", default, deserialize_with = "lenient_opt_f64")]
    pub take_profit: Option<f64>,
}

impl OpenTrade {
    /// Direction implied by the sign of the open units
    pub fn direction(&self) -> Direction {
        if self.current_units > 0.0 {
            Direction::Long
        } else if self.current_units < 0.0 {
            Direction::Short
        } else {
            Direction::Flat
        }
    }

    /// Open time as `YYYY-MM-DD HH:MM` UTC, or the raw value if unparseable
    pub fn opened_display(&self) -> String {
        match self.open_time.as_deref() {
            Some(raw) => chrono::DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&chrono::Utc).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|_| raw.to_string()),
            None => "--".to_string(),
        }
    }
}

/// Indicator votes for one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    pub instrument: String,
    #[serde(default)]
    pub lorentzian: Option<Direction>,
    #[serde(default)]
    pub ema: Option<Direction>,
    #[serde(default)]
    pub sma: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl SignalSet {
    /// Direction all three indicators agree on, if any.
    ///
    /// The classifier alone never decides; EMA and SMA filters must confirm it.
    pub fn consensus(&self) -> Option<Direction> {
        match (self.lorentzian, self.ema, self.sma) {
            (Some(l), Some(e), Some(s)) if l == e && e == s && l != Direction::Flat => Some(l),
            _ => None,
        }
    }
}

/// Outcome of a close-trade request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseTradeResult {
    pub success: bool,
    #[serde(default)]
    pub trade_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One step of the backend's self-test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCheck {
    pub name: String,
    #[serde(default)]
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Report returned by "test trading operations"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestTradingReport {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub checks: Vec<TestCheck>,
}

impl TestTradingReport {
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub backend: String,
    pub timestamp: String,
}
