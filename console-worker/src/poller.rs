//! Chart poller - one fetch/validate/retry step per call
//!
//! The console is stateless: the browser's timer owns the waiting and sends
//! back the attempt counter it was handed, and [`RetryController::resume`]
//! picks up from there. A step never sleeps.
//!
//! Backoff with the default policy:
//! ```text
//! ok ─▶ Healthy (30s) ─▶ ...
//! fail #1 ─▶ Retrying 5s ─▶ fail #2 ─▶ Retrying 10s ─▶ fail #3 ─▶ Retrying 20s
//!        ─▶ fail #4 ─▶ Exhausted (attempt reset, next poll in 30s)
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::charts::{ChartKind, ChartRegistry, ChartUpdate, ShapeError, ValidatedPayload, validate_payload};
use crate::error::{ConsoleError, Result};
use crate::status::PollStatus;

/// Poll cadence and retry bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub poll_interval: Duration,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            base_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(30),
            max_attempts: 3,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`, capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

/// Result of feeding one poll outcome into the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Poll succeeded; come back after the normal interval
    Healthy { next: Duration },
    /// Poll failed; retry `attempt` of `max_attempts` after `delay`
    Retrying {
        attempt: u32,
        max_attempts: u32,
        delay: Duration,
    },
    /// Retries used up; counter reset, normal polling resumes
    Exhausted { attempts: u32, next: Duration },
}

impl Transition {
    pub fn next_delay(&self) -> Duration {
        match *self {
            Transition::Healthy { next } | Transition::Exhausted { next, .. } => next,
            Transition::Retrying { delay, .. } => delay,
        }
    }
}

/// Consecutive-failure counter with bounded exponential backoff
#[derive(Debug, Clone)]
pub struct RetryController {
    policy: RetryPolicy,
    attempt: u32,
}

impl RetryController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Continue from an attempt count carried by the client, clamped into range
    pub fn resume(policy: RetryPolicy, attempt: u32) -> Self {
        Self {
            attempt: attempt.min(policy.max_attempts),
            policy,
        }
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn record_success(&mut self) -> Transition {
        self.attempt = 0;
        Transition::Healthy {
            next: self.policy.poll_interval,
        }
    }

    pub fn record_failure(&mut self) -> Transition {
        let attempt = self.attempt + 1;
        if attempt <= self.policy.max_attempts {
            self.attempt = attempt;
            Transition::Retrying {
                attempt,
                max_attempts: self.policy.max_attempts,
                delay: self.policy.backoff(attempt),
            }
        } else {
            self.attempt = 0;
            Transition::Exhausted {
                attempts: self.policy.max_attempts,
                next: self.policy.poll_interval,
            }
        }
    }
}

type Rejected = Vec<(ChartKind, ShapeError)>;

/// Where analytics payloads come from
#[allow(async_fn_in_trait)] // single-threaded Workers runtime, no Send bound wanted
pub trait AnalyticsSource {
    async fn fetch_analytics(&self) -> Result<Value>;
}

/// What the browser receives after each step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsSnapshot {
    pub polled_at: String,
    pub charts: Vec<ChartUpdate>,
    pub status: PollStatus,
}

/// Runs poll steps against a source and the chart registry
pub struct ChartPoller<'a, S> {
    source: &'a S,
    registry: &'a ChartRegistry,
    controller: RetryController,
}

impl<'a, S: AnalyticsSource> ChartPoller<'a, S> {
    pub fn new(source: &'a S, registry: &'a ChartRegistry, controller: RetryController) -> Self {
        Self {
            source,
            registry,
            controller,
        }
    }

    pub fn controller(&self) -> &RetryController {
        &self.controller
    }

    /// Fetch, validate and classify the payload. Failures carry whatever
    /// sections were rejected so they still surface as alerts.
    async fn fetch_validated(&self) -> std::result::Result<ValidatedPayload, (ConsoleError, Rejected)> {
        let raw = self.source.fetch_analytics().await.map_err(|e| (e, Vec::new()))?;
        let validated = validate_payload(&raw)
            .map_err(|e| (ConsoleError::InvalidPayload(e.to_string()), Vec::new()))?;
        if validated.all_rejected() {
            return Err((
                ConsoleError::InvalidPayload("no chart section could be used".into()),
                validated.rejected,
            ));
        }
        Ok(validated)
    }

    /// Run exactly one poll step
    pub async fn poll(&mut self) -> ChartsSnapshot {
        let max_attempts = self.controller.policy().max_attempts;
        let (charts, status) = match self.fetch_validated().await {
            Ok(validated) => {
                let transition = self.controller.record_success();
                let charts = validated
                    .updates
                    .into_iter()
                    .filter(|u| self.registry.accepts(u))
                    .collect();
                (charts, PollStatus::after(&transition, max_attempts, None, &validated.rejected))
            }
            Err((error, rejected)) => {
                let transition = self.controller.record_failure();
                let message = error.to_string();
                (Vec::new(), PollStatus::after(&transition, max_attempts, Some(&message), &rejected))
            }
        };

        ChartsSnapshot {
            polled_at: chrono::Utc::now().to_rfc3339(),
            charts,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::PollState;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned responses in order
    struct Scripted {
        responses: RefCell<VecDeque<Result<Value>>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<Value>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
            }
        }
    }

    impl AnalyticsSource for Scripted {
        async fn fetch_analytics(&self) -> Result<Value> {
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ConsoleError::Http("script exhausted".into())))
        }
    }

    fn down() -> Result<Value> {
        Err(ConsoleError::Http("connection refused".into()))
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(5));
        assert_eq!(policy.backoff(2), Duration::from_secs(10));
        assert_eq!(policy.backoff(3), Duration::from_secs(20));
        assert_eq!(policy.backoff(4), Duration::from_secs(30));
        assert_eq!(policy.backoff(40), Duration::from_secs(30));
    }

    #[test]
    fn test_controller_exhausts_and_resets() {
        let mut controller = RetryController::new(RetryPolicy::default());

        let delays: Vec<_> = (0..3).map(|_| controller.record_failure().next_delay()).collect();
        assert_eq!(
            delays,
            vec![Duration::from_secs(5), Duration::from_secs(10), Duration::from_secs(20)]
        );
        assert_eq!(controller.attempt(), 3);

        assert_eq!(
            controller.record_failure(),
            Transition::Exhausted {
                attempts: 3,
                next: Duration::from_secs(30)
            }
        );
        assert_eq!(controller.attempt(), 0);

        // Next failure starts a fresh cycle
        assert!(matches!(controller.record_failure(), Transition::Retrying { attempt: 1, .. }));
    }

    #[test]
    fn test_success_resets_attempts() {
        let mut controller = RetryController::resume(RetryPolicy::default(), 2);
        assert_eq!(
            controller.record_success(),
            Transition::Healthy {
                next: Duration::from_secs(30)
            }
        );
        assert_eq!(controller.attempt(), 0);
    }

    #[test]
    fn test_resume_clamps_client_attempt() {
        let controller = RetryController::resume(RetryPolicy::default(), 99);
        assert_eq!(controller.attempt(), 3);
    }

    #[tokio::test]
    async fn test_poll_success_updates_charts() {
        let source = Scripted::new(vec![Ok(json!({
            "dates": ["2024-03-04 09:00", "2024-03-05 09:00"],
            "balances": [1000.0, 1012.5],
            "risk_metrics": {"max_drawdown": 0.03, "win_rate": 0.6}
        }))]);
        let registry = ChartRegistry::standard();
        let mut poller = ChartPoller::new(&source, &registry, RetryController::new(RetryPolicy::default()));

        let snapshot = poller.poll().await;
        let kinds: Vec<_> = snapshot.charts.iter().map(|c| c.chart).collect();
        assert_eq!(
            kinds,
            vec![ChartKind::BalanceHistory, ChartKind::DailyPnl, ChartKind::WinLoss, ChartKind::RiskRadar]
        );
        assert_eq!(snapshot.status.state, PollState::Live);
        assert_eq!(snapshot.status.badge, "Live");
        assert_eq!(snapshot.status.next_poll_ms, 30_000);
        assert_eq!(snapshot.status.max_attempts, 3);
        assert!(snapshot.status.alerts.is_empty());

        // win_rate 0.6 is a fraction: the radar's fourth axis scores 60
        let radar = snapshot
            .charts
            .iter()
            .find(|c| c.chart == ChartKind::RiskRadar)
            .expect("radar updated");
        assert!((radar.series[0][3] - 60.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_snapshot_wire_shape() {
        let source = Scripted::new(vec![down()]);
        let registry = ChartRegistry::standard();
        let mut poller = ChartPoller::new(&source, &registry, RetryController::new(RetryPolicy::default()));

        let json = serde_json::to_value(poller.poll().await).expect("serializable");
        let polled_at = json["polled_at"].as_str().expect("timestamp string");
        assert!(chrono::DateTime::parse_from_rfc3339(polled_at).is_ok());
        assert_eq!(json["charts"], json!([]));
        assert_eq!(json["status"]["state"], "retrying");
        assert_eq!(json["status"]["attempt"], 1);
        assert_eq!(json["status"]["max_attempts"], 3);
        assert_eq!(json["status"]["next_poll_ms"], 5_000);
    }

    #[tokio::test]
    async fn test_poll_failure_walks_backoff_then_resets() {
        let source = Scripted::new(vec![down(), down(), down(), down(), Ok(json!({}))]);
        let registry = ChartRegistry::standard();
        let mut attempt = 0;
        let mut seen = Vec::new();

        // Each request builds a fresh poller from the attempt the client echoes back
        for _ in 0..5 {
            let controller = RetryController::resume(RetryPolicy::default(), attempt);
            let mut poller = ChartPoller::new(&source, &registry, controller);
            let snapshot = poller.poll().await;
            attempt = snapshot.status.attempt;
            seen.push((snapshot.status.state, snapshot.status.badge.clone(), snapshot.status.next_poll_ms));
        }

        assert_eq!(
            seen,
            vec![
                (PollState::Retrying, "Retrying (1/3)".to_string(), 5_000),
                (PollState::Retrying, "Retrying (2/3)".to_string(), 10_000),
                (PollState::Retrying, "Retrying (3/3)".to_string(), 20_000),
                (PollState::Offline, "Offline".to_string(), 30_000),
                (PollState::Live, "Live".to_string(), 30_000),
            ]
        );
        assert_eq!(attempt, 0);
    }

    #[tokio::test]
    async fn test_non_object_payload_counts_as_failure() {
        let source = Scripted::new(vec![Ok(json!("maintenance"))]);
        let registry = ChartRegistry::standard();
        let mut poller = ChartPoller::new(&source, &registry, RetryController::new(RetryPolicy::default()));

        let snapshot = poller.poll().await;
        assert!(snapshot.charts.is_empty());
        assert_eq!(snapshot.status.state, PollState::Retrying);
        assert!(snapshot.status.alerts[0].message.contains("not a JSON object"));
    }

    #[tokio::test]
    async fn test_partial_rejection_still_live() {
        let source = Scripted::new(vec![Ok(json!({
            "win_loss": {"wins": 4, "losses": 1},
            "risk_metrics": "n/a"
        }))]);
        let registry = ChartRegistry::standard();
        let mut poller = ChartPoller::new(&source, &registry, RetryController::new(RetryPolicy::default()));

        let snapshot = poller.poll().await;
        assert_eq!(snapshot.charts.len(), 1);
        assert_eq!(snapshot.status.state, PollState::Live);
        assert_eq!(snapshot.status.alerts.len(), 1);
        assert_eq!(snapshot.status.alerts[0].id, "chart-risk_radar");
    }

    #[tokio::test]
    async fn test_all_sections_rejected_counts_as_failure() {
        let source = Scripted::new(vec![Ok(json!({"win_loss": [], "risk_metrics": 3}))]);
        let registry = ChartRegistry::standard();
        let mut poller = ChartPoller::new(&source, &registry, RetryController::new(RetryPolicy::default()));

        let snapshot = poller.poll().await;
        assert!(snapshot.charts.is_empty());
        assert_eq!(snapshot.status.state, PollState::Retrying);
        assert_eq!(poller.controller().attempt(), 1);
        let ids: Vec<_> = snapshot.status.alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["analytics-retry", "chart-win_loss", "chart-risk_radar"]);
    }
}
