//! Dashboard JavaScript
//!
//! Thin client: builds Chart.js widgets from the embedded `CHART_SPECS`,
//! runs the single poll timer against `/api/charts`, and wires the close-trade
//! and self-test buttons. Validation and the retry decision happen in the
//! Worker; the script only echoes back the attempt counter and waits
//! `next_poll_ms`. If the Worker itself is unreachable it backs off locally
//! with the same `POLL_POLICY`.

pub const SCRIPT: &str = r#"
// ============================================================================
// State
// ============================================================================
const charts = {};
const dismissed = new Map();   // alert id -> message text when dismissed
let attempt = 0;
let localFailures = 0;
let pollTimer = null;

// ============================================================================
// Charts
// ============================================================================
function buildConfig(spec) {
    const config = {
        type: spec.chart_type,
        data: {
            labels: spec.fixed_labels ? spec.fixed_labels.slice() : [],
            datasets: spec.datasets.map(d => ({
                label: d.label,
                data: [],
                borderColor: d.border_color.length === 1 ? d.border_color[0] : d.border_color,
                backgroundColor: d.background_color.length === 1 ? d.background_color[0] : d.background_color,
                fill: d.fill,
                tension: d.tension
            }))
        },
        options: {
            responsive: true,
            maintainAspectRatio: false,
            animation: { duration: 300 },
            plugins: { legend: { labels: { color: '#c9d1d9' } } }
        }
    };
    if (spec.chart_type === 'radar') {
        config.options.scales = {
            r: {
                min: spec.value_axis ? spec.value_axis.min : 0,
                max: spec.value_axis ? spec.value_axis.max : 100,
                ticks: { display: false },
                grid: { color: '#30363d' },
                angleLines: { color: '#30363d' },
                pointLabels: { color: '#8b949e' }
            }
        };
    } else if (spec.chart_type !== 'doughnut') {
        config.options.scales = {
            x: { ticks: { color: '#8b949e', maxTicksLimit: 8 }, grid: { color: '#21262d' } },
            y: { ticks: { color: '#8b949e' }, grid: { color: '#21262d' } }
        };
    }
    return config;
}

function initCharts() {
    if (typeof Chart === 'undefined') {
        showAlerts([{ id: 'chartjs-missing', level: 'error', message: 'Chart library failed to load', dismissible: true }]);
        return;
    }
    CHART_SPECS.forEach(spec => {
        const canvas = document.getElementById(spec.canvas_id);
        if (canvas) charts[spec.id] = new Chart(canvas, buildConfig(spec));
    });
}

function applyUpdate(update) {
    const chart = charts[update.chart];
    if (!chart) return;
    chart.data.labels = update.labels;
    update.series.forEach((values, i) => {
        if (chart.data.datasets[i]) chart.data.datasets[i].data = values;
    });
    if (update.bar_colors && chart.data.datasets[0]) {
        chart.data.datasets[0].backgroundColor = update.bar_colors;
        chart.data.datasets[0].borderColor = update.bar_colors;
    }
    chart.update();
}

// ============================================================================
// Status badge and alerts
// ============================================================================
function renderBadge(state, text) {
    const badge = document.getElementById('statusBadge');
    badge.textContent = text;
    badge.className = 'status-badge status-' + state;
}

function escapeHtml(text) {
    const div = document.createElement('div');
    div.textContent = text;
    return div.innerHTML;
}

function showAlerts(alerts) {
    const box = document.getElementById('alerts');
    // Server-rendered banners (backend-error) stay until dismissed
    box.querySelectorAll('[data-alert-id]:not([data-alert-id="backend-error"])').forEach(el => el.remove());
    alerts
        .filter(a => dismissed.get(a.id) !== a.message)
        .forEach(a => {
            const el = document.createElement('div');
            el.className = 'alert alert-' + a.level;
            el.dataset.alertId = a.id;
            el.dataset.message = a.message;
            el.innerHTML = '<span>' + escapeHtml(a.message) + '</span>' +
                (a.dismissible ? '<button class="alert-close" onclick="dismissAlert(this)" aria-label="Dismiss">×</button>' : '');
            box.appendChild(el);
        });
}

function dismissAlert(button) {
    const el = button.closest('.alert');
    if (!el) return;
    dismissed.set(el.dataset.alertId, el.dataset.message || null);
    el.remove();
}

// ============================================================================
// Poll loop (single timer)
// ============================================================================
function schedule(delayMs) {
    clearTimeout(pollTimer);
    pollTimer = setTimeout(pollCharts, delayMs);
}

async function pollCharts() {
    let snapshot = null;
    try {
        const res = await fetch('/api/charts?attempt=' + attempt);
        if (!res.ok) throw new Error('HTTP ' + res.status);
        snapshot = await res.json();
    } catch (e) {
        // The Worker itself is unreachable: back off locally with the same policy
        localFailures += 1;
        if (localFailures > POLL_POLICY.maxAttempts) {
            localFailures = 0;
            renderBadge('offline', 'Offline');
            showAlerts([{ id: 'console-offline', level: 'error', dismissible: true,
                message: 'Console unreachable: ' + e.message + '. Next refresh in ' + POLL_POLICY.pollIntervalMs / 1000 + 's.' }]);
            schedule(POLL_POLICY.pollIntervalMs);
        } else {
            const delay = Math.min(POLL_POLICY.baseDelayMs * 2 ** (localFailures - 1), POLL_POLICY.maxDelayMs);
            renderBadge('retrying', 'Retrying (' + localFailures + '/' + POLL_POLICY.maxAttempts + ')');
            showAlerts([{ id: 'console-retry', level: 'warning', dismissible: true,
                message: 'Console unreachable: ' + e.message + '. Retrying in ' + delay / 1000 + 's.' }]);
            schedule(delay);
        }
        return;
    }

    localFailures = 0;
    attempt = snapshot.status.attempt;
    snapshot.charts.forEach(applyUpdate);
    renderBadge(snapshot.status.state, snapshot.status.badge);
    showAlerts(snapshot.status.alerts);
    document.getElementById('refreshTime').textContent =
        'Updated: ' + new Date(snapshot.polled_at).toLocaleTimeString();
    schedule(snapshot.status.next_poll_ms);
}

async function refreshNow() {
    const btn = document.getElementById('refreshBtn');
    btn.disabled = true;
    await pollCharts();
    btn.disabled = false;
}

// ============================================================================
// Actions
// ============================================================================
async function closeTrade(button) {
    const tradeId = button.dataset.tradeId;
    if (!confirm('Close trade ' + tradeId + '?')) return;

    button.disabled = true;
    button.textContent = '⏳';
    try {
        const res = await fetch('/api/close_trade/' + encodeURIComponent(tradeId), { method: 'POST' });
        const data = await res.json();
        if (data.success) {
            location.reload();
            return;
        }
        showAlerts([{ id: 'close-' + tradeId, level: 'error', dismissible: true,
            message: 'Failed to close trade ' + tradeId + (data.message ? ': ' + data.message : '') }]);
    } catch (e) {
        showAlerts([{ id: 'close-' + tradeId, level: 'error', dismissible: true,
            message: 'Failed to close trade ' + tradeId + ': ' + e.message }]);
    }
    button.disabled = false;
    button.textContent = 'Close';
}

async function testTrading() {
    const btn = document.getElementById('testTradingBtn');
    const panel = document.getElementById('testResults');
    btn.disabled = true;
    btn.textContent = '⏳ Testing...';
    panel.innerHTML = '<span class="neutral">Running...</span>';

    try {
        const res = await fetch('/api/test_trading', { method: 'POST' });
        const data = await res.json();
        const checks = (data.checks || []).map(c =>
            '<li>' + (c.passed ? '✅ ' : '❌ ') + escapeHtml(c.name) +
            (c.detail ? ' <span class="neutral">' + escapeHtml(c.detail) + '</span>' : '') + '</li>'
        ).join('');
        panel.innerHTML =
            '<strong class="' + (data.success ? 'positive' : 'negative') + '">' +
            (data.success ? '✅ ' : '❌ ') + escapeHtml(data.message || (data.success ? 'All checks passed' : 'Test failed')) +
            '</strong>' + (checks ? '<ul>' + checks + '</ul>' : '');
    } catch (e) {
        panel.innerHTML = '<strong class="negative">❌ ' + escapeHtml(e.message) + '</strong>';
    } finally {
        btn.disabled = false;
        btn.textContent = '🧪 Test Trading Operations';
    }
}

// ============================================================================
// Initialization
// ============================================================================
initCharts();
pollCharts();
"#;
