//! Trading backend API client
//!
//! Implements the backend calls the console needs:
//! - Account summary, open trades, indicator signals
//! - Analytics payload for the charts (left untyped for the validator)
//! - Close trade and the trading self-test

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ConsoleError, Result};
use crate::poller::AnalyticsSource;
use crate::types::{AccountSummary, CloseTradeResult, OpenTrade, SignalSet, TestTradingReport};

const ACCOUNT_PATH: &str = "/api/account";
const TRADES_PATH: &str = "/api/trades";
const SIGNALS_PATH: &str = "/api/signals";
const PERFORMANCE_PATH: &str = "/api/performance";
const TEST_TRADING_PATH: &str = "/api/test_trading";

/// Longest trade id accepted before anything is sent to the backend
pub const MAX_TRADE_ID_LEN: usize = 32;

/// Trade ids travel in a URL path segment; only plain alphanumerics pass
pub fn validate_trade_id(trade_id: &str) -> Result<&str> {
    let ok = !trade_id.is_empty()
        && trade_id.len() <= MAX_TRADE_ID_LEN
        && trade_id.chars().all(|c| c.is_ascii_alphanumeric());
    if ok {
        Ok(trade_id)
    } else {
        Err(ConsoleError::InvalidTradeId(trade_id.to_string()))
    }
}

/// Account summary from `{ "account": {...} }` or the bare summary. A bare
/// object must at least carry `balance`; anything else is an error reply.
fn parse_account(reply: Value) -> Result<AccountSummary> {
    let Some(obj) = reply.as_object() else {
        return Err(ConsoleError::InvalidResponse("account reply is not a JSON object".into()));
    };
    if let Some(inner) = obj.get("account") {
        return Ok(AccountSummary::deserialize(inner)?);
    }
    if !obj.contains_key("balance") {
        return Err(ConsoleError::InvalidResponse("reply carries no account information".into()));
    }
    Ok(serde_json::from_value(reply)?)
}

/// `{ "trades": [...] }` or a bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum TradesEnvelope {
    Wrapped { trades: Vec<OpenTrade> },
    Bare(Vec<OpenTrade>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SignalsEnvelope {
    Wrapped { signals: Vec<SignalSet> },
    Bare(Vec<SignalSet>),
}

#[derive(Deserialize)]
struct CloseTradeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Backend API client
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
}

impl BackendClient {
    /// Create a client for the backend at `base_url` (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Get the account summary
    pub async fn get_account(&self) -> Result<AccountSummary> {
        parse_account(self.get(ACCOUNT_PATH).await?)
    }

    /// Get all open trades
    pub async fn get_open_trades(&self) -> Result<Vec<OpenTrade>> {
        Ok(match self.get::<TradesEnvelope>(TRADES_PATH).await? {
            TradesEnvelope::Wrapped { trades } | TradesEnvelope::Bare(trades) => trades,
        })
    }

    /// Get the latest indicator votes per instrument
    pub async fn get_signals(&self) -> Result<Vec<SignalSet>> {
        Ok(match self.get::<SignalsEnvelope>(SIGNALS_PATH).await? {
            SignalsEnvelope::Wrapped { signals } | SignalsEnvelope::Bare(signals) => signals,
        })
    }

    /// Raw analytics payload
    pub async fn get_performance(&self) -> Result<Value> {
        self.get(PERFORMANCE_PATH).await
    }

    /// Close one trade
    pub async fn close_trade(&self, trade_id: &str) -> Result<CloseTradeResult> {
        let trade_id = validate_trade_id(trade_id)?;
        let path = format!("/api/close_trade/{trade_id}");
        let response: CloseTradeResponse = self.post(&path).await?;
        Ok(CloseTradeResult {
            success: response.success,
            trade_id: trade_id.to_string(),
            message: response.message,
        })
    }

    /// Run the backend's trading self-test
    pub async fn test_trading(&self) -> Result<TestTradingReport> {
        self.post(TEST_TRADING_PATH).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// POST with an empty JSON body and a fresh request id
    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .post(self.url(path))
            .header("Accept", "application/json")
            .header("X-Request-Id", uuid::Uuid::new_v4().to_string())
            .json(&serde_json::json!({}))
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Handle API response, checking for errors
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            return Err(ConsoleError::Backend {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(ConsoleError::from)
    }
}

impl AnalyticsSource for BackendClient {
    async fn fetch_analytics(&self) -> Result<Value> {
        self.get_performance().await
    }
}

/// Keep error bodies short enough for an alert banner
fn truncate(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_id_validation() {
        assert_eq!(validate_trade_id("6411").ok(), Some("6411"));
        assert!(validate_trade_id("").is_err());
        assert!(validate_trade_id("12/../admin").is_err());
        assert!(validate_trade_id("12 34").is_err());
        assert!(validate_trade_id(&"9".repeat(MAX_TRADE_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_url_building() {
        let client = BackendClient::new("http://localhost:5000");
        assert_eq!(client.url(PERFORMANCE_PATH), "http://localhost:5000/api/performance");
    }

    #[test]
    fn test_account_wrapped_and_bare() {
        let wrapped = parse_account(serde_json::json!({"account": {"balance": "10.5"}})).expect("wrapped parses");
        let bare = parse_account(serde_json::json!({"balance": 10.5})).expect("bare parses");
        for account in [wrapped, bare] {
            assert!((account.balance - 10.5).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_account_error_replies_are_not_zero_balances() {
        let no_account = parse_account(serde_json::json!({"error": "invalid credentials"}));
        assert!(matches!(no_account, Err(ConsoleError::InvalidResponse(_))));

        let bad_inner = parse_account(serde_json::json!({"account": {"balance": "lots"}}));
        assert!(matches!(bad_inner, Err(ConsoleError::Json(_))));

        assert!(parse_account(serde_json::json!([])).is_err());
    }

    #[test]
    fn test_trades_envelopes() {
        let wrapped: TradesEnvelope = serde_json::from_str(
            r#"{"trades": [{"id": "1", "instrument": "EUR_USD", "currentUnits": "1000"}]}"#,
        )
        .expect("wrapped parses");
        let TradesEnvelope::Wrapped { trades } = wrapped else {
            panic!("expected wrapped trades");
        };
        assert_eq!(trades.len(), 1);

        let bare: TradesEnvelope = serde_json::from_str("[]").expect("bare parses");
        assert!(matches!(bare, TradesEnvelope::Bare(t) if t.is_empty()));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("  short  ", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }
}
