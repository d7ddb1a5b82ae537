//! Chart registry
//!
//! The four dashboard charts and their fixed visual schema. The browser
//! builds its Chart.js widgets from [`ChartRegistry::to_json`], so canvas ids,
//! dataset styling and axis bounds are owned here rather than in the script.

use serde::{Deserialize, Serialize};

pub const GREEN: &str = "#3fb950";
pub const RED: &str = "#f85149";
pub const BLUE: &str = "#58a6ff";
pub const PURPLE: &str = "#a371f7";

/// Fixed axes of the risk radar, in display order
pub const RISK_AXES: [&str; 5] = ["Drawdown", "Risk / Trade", "Daily Risk", "Win Rate", "Sharpe"];

/// The dashboard's charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    BalanceHistory,
    DailyPnl,
    WinLoss,
    RiskRadar,
}

impl ChartKind {
    /// Display order
    pub const ALL: [ChartKind; 4] = [
        ChartKind::BalanceHistory,
        ChartKind::DailyPnl,
        ChartKind::WinLoss,
        ChartKind::RiskRadar,
    ];

    /// Stable id used in JSON and alert ids
    pub fn id(self) -> &'static str {
        match self {
            ChartKind::BalanceHistory => "balance_history",
            ChartKind::DailyPnl => "daily_pnl",
            ChartKind::WinLoss => "win_loss",
            ChartKind::RiskRadar => "risk_radar",
        }
    }

    pub fn canvas_id(self) -> &'static str {
        match self {
            ChartKind::BalanceHistory => "balanceChart",
            ChartKind::DailyPnl => "dailyPnlChart",
            ChartKind::WinLoss => "winLossChart",
            ChartKind::RiskRadar => "riskRadarChart",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::BalanceHistory => "Balance History",
            ChartKind::DailyPnl => "Daily P/L",
            ChartKind::WinLoss => "Win / Loss",
            ChartKind::RiskRadar => "Risk Profile",
        }
    }

    /// Chart.js chart type
    pub fn chart_type(self) -> &'static str {
        match self {
            ChartKind::BalanceHistory => "line",
            ChartKind::DailyPnl => "bar",
            ChartKind::WinLoss => "doughnut",
            ChartKind::RiskRadar => "radar",
        }
    }
}

/// Styling of one dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStyle {
    pub label: &'static str,
    pub border_color: Vec<&'static str>,
    pub background_color: Vec<&'static str>,
    pub fill: bool,
    pub tension: f64,
}

/// Value-axis bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

/// Fixed visual schema of one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: ChartKind,
    pub canvas_id: &'static str,
    pub chart_type: &'static str,
    pub title: &'static str,
    pub datasets: Vec<DatasetStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_labels: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_axis: Option<AxisBounds>,
}

impl ChartSpec {
    fn for_kind(kind: ChartKind) -> Self {
        let (datasets, fixed_labels, value_axis) = match kind {
            ChartKind::BalanceHistory => (
                vec![DatasetStyle {
                    label: "Balance",
                    border_color: vec![BLUE],
                    background_color: vec!["rgba(88, 166, 255, 0.15)"],
                    fill: true,
                    tension: 0.3,
                }],
                None,
                None,
            ),
            ChartKind::DailyPnl => (
                vec![DatasetStyle {
                    label: "P/L",
                    border_color: vec![GREEN],
                    background_color: vec![GREEN],
                    fill: false,
                    tension: 0.0,
                }],
                None,
                None,
            ),
            ChartKind::WinLoss => (
                vec![DatasetStyle {
                    label: "Trades",
                    border_color: vec![GREEN, RED],
                    background_color: vec![GREEN, RED],
                    fill: false,
                    tension: 0.0,
                }],
                Some(vec!["Wins", "Losses"]),
                None,
            ),
            ChartKind::RiskRadar => (
                vec![DatasetStyle {
                    label: "Risk utilisation",
                    border_color: vec![PURPLE],
                    background_color: vec!["rgba(163, 113, 247, 0.2)"],
                    fill: true,
                    tension: 0.0,
                }],
                Some(RISK_AXES.to_vec()),
                Some(AxisBounds { min: 0.0, max: 100.0 }),
            ),
        };

        Self {
            id: kind,
            canvas_id: kind.canvas_id(),
            chart_type: kind.chart_type(),
            title: kind.title(),
            datasets,
            fixed_labels,
            value_axis,
        }
    }
}

/// New data for one chart, produced from a validated payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartUpdate {
    pub chart: ChartKind,
    pub labels: Vec<String>,
    /// One series per dataset in the chart's spec
    pub series: Vec<Vec<f64>>,
    /// Per-point bar colours, overriding the dataset background
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bar_colors: Option<Vec<String>>,
}

/// All charts on the dashboard
#[derive(Debug, Clone)]
pub struct ChartRegistry {
    specs: Vec<ChartSpec>,
}

impl ChartRegistry {
    /// The standard four-chart layout
    pub fn standard() -> Self {
        Self {
            specs: ChartKind::ALL.iter().map(|k| ChartSpec::for_kind(*k)).collect(),
        }
    }

    pub fn specs(&self) -> &[ChartSpec] {
        &self.specs
    }

    pub fn get(&self, kind: ChartKind) -> Option<&ChartSpec> {
        self.specs.iter().find(|s| s.id == kind)
    }

    /// Check an update fits its chart's schema (dataset count, fixed labels)
    pub fn accepts(&self, update: &ChartUpdate) -> bool {
        let Some(spec) = self.get(update.chart) else {
            return false;
        };
        if update.series.len() != spec.datasets.len() {
            return false;
        }
        if let Some(fixed) = &spec.fixed_labels {
            if update.labels.len() != fixed.len() {
                return false;
            }
        }
        update.series.iter().all(|s| s.len() == update.labels.len())
    }

    /// Specs as JSON for embedding in the page
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.specs).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Default for ChartRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
