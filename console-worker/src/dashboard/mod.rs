//! Dashboard module - operator console web interface
//!
//! Separated into HTML, CSS, and JS submodules for maintainability.
//!
//! # Architecture
//! - `html.rs`: server-rendered sections (account, trades, signals, charts)
//! - `css.rs`: styling with CSS custom properties
//! - `js.rs`: chart widgets, the poll timer, button actions
//!
//! The chart registry and retry policy are embedded as JSON so the script
//! never hard-codes canvas ids or backoff constants.

mod css;
mod html;
mod js;

use serde_json::json;

use crate::charts::ChartRegistry;
use crate::poller::RetryPolicy;
use crate::types::{AccountSummary, OpenTrade, SignalSet};

const CHART_JS_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

/// Everything the page shows at render time
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub title: String,
    pub account: AccountSummary,
    pub trades: Vec<OpenTrade>,
    pub signals: Vec<SignalSet>,
    /// Shown as a banner when the backend could not be reached
    pub api_error: Option<String>,
}

/// JSON safe to place inside a `<script>` element
fn script_json(value: &str) -> String {
    value.replace("</", "<\\/")
}

fn policy_json(policy: &RetryPolicy) -> String {
    let millis = |d: std::time::Duration| u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
    json!({
        "pollIntervalMs": millis(policy.poll_interval),
        "baseDelayMs": millis(policy.base_delay),
        "maxDelayMs": millis(policy.max_delay),
        "maxAttempts": policy.max_attempts,
    })
    .to_string()
}

/// Generate the complete dashboard HTML page
pub fn dashboard_html(view: &DashboardView, registry: &ChartRegistry, policy: &RetryPolicy) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}
    </style>
    <script src="{chart_js}"></script>
</head>
<body>
    <div class="container">
{header}
        {alerts}
        <div class="grid">
{account}
{charts}
{trades}
{signals}
{results}
        </div>
    </div>
    <script>
const CHART_SPECS = {specs};
const POLL_POLICY = {policy};
    </script>
    <script>
{js}
    </script>
</body>
</html>"#,
        title = crate::format::escape_html(&view.title),
        css = css::STYLES,
        chart_js = CHART_JS_URL,
        header = html::header(&view.title),
        alerts = html::alerts(view.api_error.as_deref()),
        account = html::account_cards(&view.account),
        charts = html::chart_cards(registry),
        trades = html::trades_table(&view.trades),
        signals = html::signals_table(&view.signals),
        results = html::test_results_panel(),
        specs = script_json(&registry.to_json()),
        policy = policy_json(policy),
        js = js::SCRIPT,
    )
}
