//! Console Worker - operator console for a trading bot on Cloudflare Workers
//!
//! Renders account state, open trades and indicator signals from the trading
//! backend, and keeps four analytics charts fresh.
//!
//! # Architecture
//! - Main entry point routes HTTP requests; no state is kept between requests
//! - Backend client for the trading service (account, trades, analytics, actions)
//! - Chart poller: one fetch/validate/retry step per `/api/charts` call, with the
//!   retry counter round-tripped by the browser
//!
//! # Endpoints
//! - `GET /`, `/dashboard`: server-rendered console
//! - `GET /api/charts?attempt=n`: validated chart updates plus poll status
//! - `GET /api/performance`: raw analytics passthrough
//! - `POST /api/close_trade/{id}`, `POST /api/test_trading`: operator actions

// Clippy configuration for dashboard code patterns
#![allow(clippy::cast_precision_loss)] // Float casts OK for display
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)] // Doc style flexibility
#![allow(clippy::needless_pass_by_value)] // Worker framework patterns
#![allow(clippy::if_not_else)] // Readability preference
#![allow(clippy::map_unwrap_or)] // Explicit error handling preference

mod charts;
mod client;
mod config;
mod dashboard;
mod error;
mod format;
mod poller;
mod status;
mod types;

use worker::{
    Context, Env, Method, Request, Response, Router, Url, console_error, console_log, console_warn, event,
};

pub use charts::{ChartKind, ChartRegistry, ChartSpec, ChartUpdate, ShapeError, ValidatedPayload, validate_payload};
pub use client::{BackendClient, validate_trade_id};
pub use config::Config;
pub use dashboard::{DashboardView, dashboard_html};
pub use error::ConsoleError;
pub use poller::{AnalyticsSource, ChartPoller, ChartsSnapshot, RetryController, RetryPolicy, Transition};
pub use status::{Alert, AlertLevel, PollState, PollStatus};
pub use types::*;

/// Result type alias for worker operations
type WResult<T> = std::result::Result<T, worker::Error>;

const CLOSE_TRADE_PREFIX: &str = "/api/close_trade/";

/// Main Worker entry point
#[event(fetch)]
async fn fetch(req: Request, env: Env, _ctx: Context) -> WResult<Response> {
    console_error_panic_hook::set_once();

    // Trade id lives in the path; matched ahead of the router
    if req.method() == Method::Post {
        let path = req.path();
        if let Some(trade_id) = path.strip_prefix(CLOSE_TRADE_PREFIX) {
            return close_trade(&env, trade_id).await;
        }
    }

    let router = Router::new();

    let response = router
        // Health check
        .get_async("/health", |_req, ctx| async move {
            let config = match Config::from_env(&ctx.env) {
                Ok(c) => c,
                Err(e) => return json_error(&e),
            };

            Response::from_json(&HealthResponse {
                status: "healthy".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                environment: config.environment,
                backend: config.backend_url,
                timestamp: chrono::Utc::now().to_rfc3339(),
            })
        })
        // Dashboard UI
        .get_async("/", |_req, ctx| async move { render_dashboard(&ctx.env).await })
        .get_async("/dashboard", |_req, ctx| async move { render_dashboard(&ctx.env).await })
        // One chart poll step
        .get_async("/api/charts", |req, ctx| async move { poll_charts(&req, &ctx.env).await })
        // Raw analytics payload
        .get_async("/api/performance", |_req, ctx| async move {
            let config = match Config::from_env(&ctx.env) {
                Ok(c) => c,
                Err(e) => return json_error(&e),
            };
            match BackendClient::new(&config.backend_url).get_performance().await {
                Ok(payload) => Response::from_json(&payload),
                Err(e) => {
                    console_warn!("Performance passthrough failed: {}", e);
                    json_error(&e)
                }
            }
        })
        // Backend self-test
        .post_async("/api/test_trading", |_req, ctx| async move {
            let config = match Config::from_env(&ctx.env) {
                Ok(c) => c,
                Err(e) => return json_error(&e),
            };
            match BackendClient::new(&config.backend_url).test_trading().await {
                Ok(report) => {
                    console_log!(
                        "Trading self-test: success={} ({}/{} checks passed)",
                        report.success,
                        report.passed_count(),
                        report.checks.len()
                    );
                    Response::from_json(&report)
                }
                Err(e) => {
                    console_error!("Trading self-test failed: {}", e);
                    json_error(&e)
                }
            }
        })
        .run(req, env)
        .await?;

    // Handlers never answer 404 themselves, so this is the router's miss
    if response.status_code() == 404 {
        return Ok(Response::from_json(&serde_json::json!({
            "error": true,
            "message": "Not found",
        }))?
        .with_status(404));
    }
    Ok(response)
}

/// JSON error body with the status matching the error
fn json_error(err: &ConsoleError) -> WResult<Response> {
    Ok(Response::from_json(&serde_json::json!({
        "success": false,
        "error": true,
        "message": err.to_string(),
    }))?
    .with_status(err.status_code()))
}

/// Render the console; a backend outage still yields a page with a banner
async fn render_dashboard(env: &Env) -> WResult<Response> {
    let config = match Config::from_env(env) {
        Ok(c) => c,
        Err(e) => return Response::error(format!("{e}"), 500),
    };
    let client = BackendClient::new(&config.backend_url);

    let (account, trades, signals) = futures::join!(
        client.get_account(),
        client.get_open_trades(),
        client.get_signals()
    );

    let mut view = DashboardView {
        title: config.dashboard_title.clone(),
        ..DashboardView::default()
    };

    match account {
        Ok(account) => view.account = account,
        Err(e) => {
            console_error!("Account fetch failed: {}", e);
            view.api_error = Some(format!(
                "Unable to load account information from {}: {e}",
                client.base_url()
            ));
        }
    }
    match trades {
        Ok(trades) => view.trades = trades,
        Err(e) => console_warn!("Open trades fetch failed: {}", e),
    }
    match signals {
        Ok(signals) => view.signals = signals,
        Err(e) => console_warn!("Signals fetch failed: {}", e),
    }

    if config.is_debug() {
        console_log!(
            "Dashboard rendered: {} trades, {} signals, backend_ok={}",
            view.trades.len(),
            view.signals.len(),
            view.api_error.is_none()
        );
    }

    Response::from_html(dashboard_html(&view, &ChartRegistry::standard(), &config.retry_policy()))
}

/// `attempt` query parameter; missing or garbage means a fresh cycle
fn attempt_param(url: &Url) -> u32 {
    url.query_pairs()
        .find(|(key, _)| key == "attempt")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(0)
}

/// Run one poll step for the browser
async fn poll_charts(req: &Request, env: &Env) -> WResult<Response> {
    let config = match Config::from_env(env) {
        Ok(c) => c,
        Err(e) => return json_error(&e),
    };
    let attempt = attempt_param(&req.url()?);

    let client = BackendClient::new(&config.backend_url);
    let registry = ChartRegistry::standard();
    let controller = RetryController::resume(config.retry_policy(), attempt);
    let snapshot = ChartPoller::new(&client, &registry, controller).poll().await;

    match snapshot.status.state {
        PollState::Live if config.is_debug() => {
            console_log!("Chart poll ok: {} charts updated", snapshot.charts.len());
        }
        PollState::Live => {}
        PollState::Retrying | PollState::Offline => {
            let reasons: Vec<&str> = snapshot.status.alerts.iter().map(|a| a.message.as_str()).collect();
            console_warn!("Chart poll {}: {}", snapshot.status.badge, reasons.join(" | "));
        }
    }

    Response::from_json(&snapshot)
}

/// Close one trade through the backend
async fn close_trade(env: &Env, trade_id: &str) -> WResult<Response> {
    if let Err(e) = validate_trade_id(trade_id) {
        console_warn!("Rejected close request: {}", e);
        return json_error(&e);
    }
    let config = match Config::from_env(env) {
        Ok(c) => c,
        Err(e) => return json_error(&e),
    };

    match BackendClient::new(&config.backend_url).close_trade(trade_id).await {
        Ok(result) => {
            if result.success {
                console_log!("Trade {} closed", trade_id);
            } else {
                console_warn!("Backend refused to close trade {}", trade_id);
            }
            Response::from_json(&result)
        }
        Err(e) => {
            console_error!("Error closing trade {}: {}", trade_id, e);
            json_error(&e)
        }
    }
}
