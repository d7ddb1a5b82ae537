//! Dashboard HTML fragments
//!
//! Server-rendered sections of the page:
//! - Header with poll status badge and the self-test button
//! - Account cards
//! - Chart canvases (from the registry)
//! - Open trades with close buttons
//! - Indicator signals with consensus
//!
//! Every value that came from the backend goes through `escape_html`.

use std::fmt::Write as _;

use crate::charts::ChartRegistry;
use crate::format::{escape_html, format_money, format_signed_money, format_units, pnl_class};
use crate::types::{AccountSummary, Direction, OpenTrade, SignalSet};

pub fn header(title: &str) -> String {
    format!(
        r#"
        <header>
            <div>
                <h1>📊 {title}</h1>
                <span class="refresh-time" id="refreshTime">Waiting for first refresh...</span>
            </div>
            <div class="header-controls">
                <span class="status-badge status-retrying" id="statusBadge">Connecting</span>
                <button class="btn btn-secondary" onclick="refreshNow()" id="refreshBtn">🔄 Refresh</button>
                <button class="btn btn-primary" onclick="testTrading()" id="testTradingBtn">🧪 Test Trading Operations</button>
            </div>
        </header>"#,
        title = escape_html(title)
    )
}

/// Alert area; a server-side backend error is rendered into it up front
pub fn alerts(api_error: Option<&str>) -> String {
    let banner = api_error.map_or_else(String::new, |message| {
        format!(
            r#"
            <div class="alert alert-error" data-alert-id="backend-error">
                <span>{}</span>
                <button class="alert-close" onclick="dismissAlert(this)" aria-label="Dismiss">×</button>
            </div>"#,
            escape_html(message)
        )
    });
    format!(r#"<div class="alerts" id="alerts">{banner}</div>"#)
}

fn metric(label: &str, value: &str, class: &str) -> String {
    format!(
        r#"
                    <div class="metric">
                        <div class="metric-label">{label}</div>
                        <div class="metric-value {class}">{value}</div>
                    </div>"#
    )
}

pub fn account_cards(account: &AccountSummary) -> String {
    let currency = account
        .currency
        .as_deref()
        .map(|c| format!(" <span class=\"currency\">{}</span>", escape_html(c)))
        .unwrap_or_default();

    format!(
        r#"
            <div class="card">
                <div class="card-header">
                    <span class="card-title">💰 Balance{currency}</span>
                </div>
                <div class="card-value" id="accountBalance">{balance}</div>
                <div class="metrics">{nav}{margin}</div>
            </div>

            <div class="card">
                <div class="card-header">
                    <span class="card-title">📈 Unrealized P/L</span>
                </div>
                <div class="card-value {pl_class}" id="unrealizedPl">{pl}</div>
                <div class="metrics">{open}</div>
            </div>"#,
        balance = format_money(account.balance),
        nav = metric("NAV", &format_money(account.nav), ""),
        margin = metric("Margin Used", &format_money(account.margin_used), ""),
        pl_class = pnl_class(account.unrealized_pl),
        pl = format_signed_money(account.unrealized_pl),
        open = metric("Open Trades", &account.open_trade_count.to_string(), ""),
    )
}

pub fn chart_cards(registry: &ChartRegistry) -> String {
    registry
        .specs()
        .iter()
        .map(|spec| {
            format!(
                r#"
            <div class="card chart-card">
                <div class="card-header">
                    <span class="card-title">{title}</span>
                </div>
                <div class="chart-wrap"><canvas id="{canvas}"></canvas></div>
            </div>"#,
                title = spec.title,
                canvas = spec.canvas_id
            )
        })
        .collect()
}

fn direction_class(direction: Option<Direction>) -> &'static str {
    match direction {
        Some(Direction::Long) => "signal-buy",
        Some(Direction::Short) => "signal-sell",
        Some(Direction::Flat) | None => "signal-hold",
    }
}

fn direction_label(direction: Option<Direction>) -> String {
    direction.map_or_else(|| "--".to_string(), |d| d.to_string())
}

fn price(value: Option<f64>) -> String {
    value.map_or_else(|| "--".to_string(), |p| format!("{p:.5}"))
}

pub fn trades_table(trades: &[OpenTrade]) -> String {
    let body = if trades.is_empty() {
        r#"<tr><td colspan="8" class="empty-row">No open trades</td></tr>"#.to_string()
    } else {
        trades.iter().fold(String::new(), |mut rows, trade| {
            let direction = trade.direction();
            let id = escape_html(&trade.id);
            let _ = write!(
                rows,
                r#"
                        <tr id="trade-{id}">
                            <td><strong>{instrument}</strong></td>
                            <td><span class="scan-signal {dir_class}">{direction}</span></td>
                            <td>{units}</td>
                            <td>{entry}</td>
                            <td class="{pl_class}">{pl}</td>
                            <td>{sl} / {tp}</td>
                            <td>{opened}</td>
                            <td><button class="btn btn-danger btn-small" data-trade-id="{id}" onclick="closeTrade(this)">Close</button></td>
                        </tr>"#,
                instrument = escape_html(&trade.instrument),
                dir_class = direction_class(Some(direction)),
                units = format_units(trade.current_units),
                entry = price(Some(trade.price)),
                pl_class = pnl_class(trade.unrealized_pl),
                pl = format_signed_money(trade.unrealized_pl),
                sl = price(trade.stop_loss),
                tp = price(trade.take_profit),
                opened = escape_html(&trade.opened_display()),
            );
            rows
        })
    };

    format!(
        r#"
            <div class="card wide">
                <div class="card-header">
                    <span class="card-title">📋 Open Trades</span>
                </div>
                <table class="positions-table">
                    <thead>
                        <tr>
                            <th>Instrument</th>
                            <th>Side</th>
                            <th>Units</th>
                            <th>Entry</th>
                            <th>P/L</th>
                            <th>SL / TP</th>
                            <th>Opened</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody id="tradesBody">{body}
                    </tbody>
                </table>
            </div>"#
    )
}

pub fn signals_table(signals: &[SignalSet]) -> String {
    let body = if signals.is_empty() {
        r#"<tr><td colspan="5" class="empty-row">No signals yet</td></tr>"#.to_string()
    } else {
        signals.iter().fold(String::new(), |mut rows, set| {
            let consensus = set.consensus();
            let _ = write!(
                rows,
                r#"
                        <tr>
                            <td><strong>{instrument}</strong></td>
                            <td class="{lc}">{l}</td>
                            <td class="{ec}">{e}</td>
                            <td class="{sc}">{s}</td>
                            <td><span class="scan-signal {cc}">{c}</span></td>
                        </tr>"#,
                instrument = escape_html(&set.instrument),
                lc = direction_class(set.lorentzian),
                l = direction_label(set.lorentzian),
                ec = direction_class(set.ema),
                e = direction_label(set.ema),
                sc = direction_class(set.sma),
                s = direction_label(set.sma),
                cc = direction_class(consensus),
                c = consensus.map_or_else(|| "NO TRADE".to_string(), |d| d.to_string()),
            );
            rows
        })
    };

    format!(
        r#"
            <div class="card wide">
                <div class="card-header">
                    <span class="card-title">🧭 Signals</span>
                </div>
                <table class="positions-table">
                    <thead>
                        <tr>
                            <th>Instrument</th>
                            <th>Lorentzian</th>
                            <th>EMA</th>
                            <th>SMA</th>
                            <th>Consensus</th>
                        </tr>
                    </thead>
                    <tbody>{body}
                    </tbody>
                </table>
            </div>"#
    )
}

pub fn test_results_panel() -> &'static str {
    r#"
            <div class="card wide">
                <div class="card-header">
                    <span class="card-title">🧪 Test Results</span>
                </div>
                <div class="test-results" id="testResults">
                    <span class="neutral">Run "Test Trading Operations" to check the backend.</span>
                </div>
            </div>"#
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(id: &str, units: f64, pl: f64) -> OpenTrade {
        OpenTrade {
            id: id.to_string(),
            instrument: "EUR_USD".to_string(),
            current_units: units,
            price: 1.085_12,
            unrealized_pl: pl,
            open_time: None,
            stop_loss: Some(1.08),
            take_profit: None,
        }
    }

    #[test]
    fn test_trades_table_rows() {
        let html = trades_table(&[trade("17", 1000.0, 4.1), trade("18", -500.0, -2.0)]);
        assert!(html.contains(r#"data-trade-id="17""#));
        assert!(html.contains("1.08512"));
        assert!(html.contains("+$4.10"));
        assert!(html.contains(r#"<td class="negative">-$2.00</td>"#));
        assert!(html.contains("1.08000 / --"));
        assert!(html.contains(">SHORT<"));
    }

    #[test]
    fn test_empty_tables() {
        assert!(trades_table(&[]).contains("No open trades"));
        assert!(signals_table(&[]).contains("No signals yet"));
    }

    #[test]
    fn test_backend_strings_are_escaped() {
        let mut evil = trade("1", 1.0, 0.0);
        evil.instrument = "<script>alert(1)</script>".to_string();
        let html = trades_table(&[evil]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));

        assert!(alerts(Some("<b>down</b>")).contains("&lt;b&gt;down&lt;/b&gt;"));
        assert!(!alerts(None).contains("alert-error"));
    }

    #[test]
    fn test_signals_consensus_column() {
        let set = SignalSet {
            instrument: "GBP_USD".to_string(),
            lorentzian: Some(Direction::Short),
            ema: Some(Direction::Short),
            sma: Some(Direction::Short),
            updated_at: None,
        };
        let html = signals_table(&[set]);
        assert!(html.contains(r#"<span class="scan-signal signal-sell">SHORT</span>"#));
    }

    #[test]
    fn test_chart_cards_follow_registry() {
        let html = chart_cards(&ChartRegistry::standard());
        for canvas in ["balanceChart", "dailyPnlChart", "winLossChart", "riskRadarChart"] {
            assert!(html.contains(&format!(r#"<canvas id="{canvas}">"#)));
        }
    }
}
