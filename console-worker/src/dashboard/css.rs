//! Dashboard CSS styles
//!
//! Dark theme driven by CSS custom properties.

pub const STYLES: &str = r"
* { box-sizing: border-box; margin: 0; padding: 0; }

:root {
    --bg: #0d1117;
    --card: #161b22;
    --border: #30363d;
    --text: #c9d1d9;
    --text-dim: #8b949e;
    --green: #3fb950;
    --red: #f85149;
    --blue: #58a6ff;
    --yellow: #d29922;
    --purple: #a371f7;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: var(--bg);
    color: var(--text);
    padding: 20px;
    min-height: 100vh;
}

.container { max-width: 1280px; margin: 0 auto; }

header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 20px;
    padding-bottom: 16px;
    border-bottom: 1px solid var(--border);
}

h1 { font-size: 24px; font-weight: 600; }

.header-controls { display: flex; align-items: center; gap: 12px; }
.refresh-time { font-size: 12px; color: var(--text-dim); }

/* Poll status badge */
.status-badge {
    padding: 6px 12px;
    border-radius: 20px;
    font-size: 12px;
    font-weight: 600;
    text-transform: uppercase;
}
.status-live { background: rgba(63, 185, 80, 0.2); color: var(--green); }
.status-retrying { background: rgba(210, 153, 34, 0.2); color: var(--yellow); }
.status-offline { background: rgba(248, 81, 73, 0.2); color: var(--red); }

/* Alert banners */
.alerts { display: flex; flex-direction: column; gap: 8px; margin-bottom: 16px; }
.alert {
    display: flex;
    justify-content: space-between;
    align-items: center;
    padding: 10px 14px;
    border-radius: 8px;
    font-size: 13px;
    border: 1px solid transparent;
}
.alert-warning { background: rgba(210, 153, 34, 0.1); border-color: var(--yellow); }
.alert-error { background: rgba(248, 81, 73, 0.1); border-color: var(--red); }
.alert-close {
    background: none;
    border: none;
    color: var(--text-dim);
    font-size: 18px;
    cursor: pointer;
    margin-left: 12px;
}

/* Buttons */
.btn {
    padding: 8px 16px;
    border-radius: 6px;
    border: none;
    font-size: 13px;
    font-weight: 500;
    cursor: pointer;
    transition: all 0.2s;
}
.btn:disabled { opacity: 0.6; cursor: not-allowed; }
.btn-primary { background: var(--blue); color: #fff; }
.btn-secondary { background: var(--border); color: var(--text); }
.btn-danger { background: rgba(248, 81, 73, 0.8); color: #fff; }
.btn-small { padding: 4px 10px; font-size: 12px; }

.grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
    gap: 16px;
}
.wide { grid-column: 1 / -1; }

.card {
    background: var(--card);
    border: 1px solid var(--border);
    border-radius: 12px;
    padding: 20px;
}
.card-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 16px;
}
.card-title {
    font-size: 14px;
    color: var(--text-dim);
    text-transform: uppercase;
    letter-spacing: 0.5px;
}
.card-value { font-size: 28px; font-weight: 700; }
.currency { font-size: 11px; }

.metrics { display: flex; flex-wrap: wrap; gap: 16px; margin-top: 12px; }
.metric { flex: 1; min-width: 100px; }
.metric-label { font-size: 11px; color: var(--text-dim); text-transform: uppercase; }
.metric-value { font-size: 18px; font-weight: 600; margin-top: 2px; }

.positive { color: var(--green); }
.negative { color: var(--red); }
.neutral { color: var(--text-dim); }

/* Charts */
.chart-wrap { position: relative; height: 260px; }

/* Tables */
.positions-table { width: 100%; border-collapse: collapse; }
.positions-table th,
.positions-table td {
    text-align: left;
    padding: 10px 8px;
    border-bottom: 1px solid var(--border);
}
.positions-table th {
    color: var(--text-dim);
    font-weight: 500;
    font-size: 12px;
    text-transform: uppercase;
}
.positions-table tr:last-child td { border-bottom: none; }
.empty-row { text-align: center; color: var(--text-dim); }

.scan-signal {
    font-size: 11px;
    padding: 3px 8px;
    border-radius: 4px;
    display: inline-block;
}
.signal-buy { color: var(--green); }
.signal-sell { color: var(--red); }
.signal-hold { color: var(--text-dim); }
.scan-signal.signal-buy { background: rgba(63, 185, 80, 0.2); }
.scan-signal.signal-sell { background: rgba(248, 81, 73, 0.2); }
.scan-signal.signal-hold { background: rgba(139, 148, 158, 0.2); }

/* Self-test results */
.test-results { font-size: 13px; }
.test-results ul { list-style: none; margin-top: 8px; }
.test-results li { padding: 4px 0; }

@media (max-width: 600px) {
    .grid { grid-template-columns: 1fr; }
    header { flex-direction: column; gap: 12px; }
    .header-controls { flex-wrap: wrap; justify-content: center; }
}
";
