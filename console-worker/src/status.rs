//! Poll status shown to the operator
//!
//! Badge text plus alert banners. Alert ids are stable so the browser can
//! remember which banners were dismissed across polls.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::charts::{ChartKind, ShapeError};
use crate::poller::Transition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    Live,
    Retrying,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Warning,
    Error,
}

/// A dismissible banner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub level: AlertLevel,
    pub message: String,
    pub dismissible: bool,
}

impl Alert {
    fn new(id: impl Into<String>, level: AlertLevel, message: String) -> Self {
        Self {
            id: id.into(),
            level,
            message,
            dismissible: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollStatus {
    pub state: PollState,
    pub badge: String,
    /// Attempt counter the client must echo on its next poll
    pub attempt: u32,
    pub max_attempts: u32,
    pub next_poll_ms: u64,
    pub alerts: Vec<Alert>,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl PollStatus {
    /// Status after a poll step ended in `transition`; `max_attempts` comes
    /// from the policy and is reported in every state
    pub fn after(
        transition: &Transition,
        max_attempts: u32,
        error: Option<&str>,
        rejected: &[(ChartKind, ShapeError)],
    ) -> Self {
        let error = error.unwrap_or("unknown error");
        let mut alerts = Vec::new();

        let (state, badge, attempt) = match *transition {
            Transition::Healthy { .. } => (PollState::Live, "Live".to_string(), 0),
            Transition::Retrying { attempt, delay, .. } => {
                alerts.push(Alert::new(
                    "analytics-retry",
                    AlertLevel::Warning,
                    format!(
                        "Analytics refresh failed (attempt {attempt}/{max_attempts}): {error}. Retrying in {}s.",
                        delay.as_secs()
                    ),
                ));
                (
                    PollState::Retrying,
                    format!("Retrying ({attempt}/{max_attempts})"),
                    attempt,
                )
            }
            Transition::Exhausted { attempts, next } => {
                alerts.push(Alert::new(
                    "analytics-offline",
                    AlertLevel::Error,
                    format!(
                        "Analytics unavailable after {attempts} attempts: {error}. Next refresh in {}s.",
                        next.as_secs()
                    ),
                ));
                (PollState::Offline, "Offline".to_string(), 0)
            }
        };

        alerts.extend(rejected.iter().map(|(kind, err)| {
            Alert::new(
                format!("chart-{}", kind.id()),
                AlertLevel::Warning,
                format!("{} not updated: {err}", kind.title()),
            )
        }));

        Self {
            state,
            badge,
            attempt,
            max_attempts,
            next_poll_ms: millis(transition.next_delay()),
            alerts,
        }
    }
}
