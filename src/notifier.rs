//! Resident alert-evaluation loop
//!
//! Scans subscribed users on a fixed cadence, fetches forecast and current
//! weather through the cached gateway, derives alerts and hands each user
//! at most one notification batch per cycle. Per-user failures are isolated
//! at the user boundary; the loop itself never terminates on error.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::alerts::{Alert, evaluate_alerts};
use crate::config::AlertConfig;
use crate::gateway::CachedWeatherGateway;
use crate::profiles::{ProfileStore, UserProfile};

/// Delivery collaborator (chat transport, mail, ...)
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification text to one user
    async fn deliver(&self, user_id: i64, text: &str) -> crate::Result<()>;
}

/// Summary of one scan cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    /// Subscribed users enumerated
    pub scanned: usize,
    /// Users that received a notification
    pub notified: usize,
    /// Users skipped (no coordinates, no data, no alerts, or a failure)
    pub skipped: usize,
}

/// The periodic alert evaluator
pub struct AlertScheduler {
    gateway: Arc<CachedWeatherGateway>,
    profiles: Arc<dyn ProfileStore>,
    sink: Arc<dyn NotificationSink>,
    policy: AlertConfig,
}

impl AlertScheduler {
    /// Create a scheduler over its collaborators
    pub fn new(
        gateway: Arc<CachedWeatherGateway>,
        profiles: Arc<dyn ProfileStore>,
        sink: Arc<dyn NotificationSink>,
        policy: AlertConfig,
    ) -> Self {
        Self {
            gateway,
            profiles,
            sink,
            policy,
        }
    }

    /// Build the notification text for one user's alert batch
    #[must_use]
    pub fn format_notification(city: &str, alerts: &[Alert]) -> String {
        let mut text = format!("⚠️ Weather alert for {city}\n\n");
        for alert in alerts {
            text.push_str(&alert.message);
            text.push('\n');
        }
        text.push_str("\nDisable notifications: /unsubscribe");
        text
    }

    /// Evaluate one user; returns true when a notification was delivered.
    ///
    /// A failed forecast fetch skips the user for this cycle entirely; no
    /// partial alerting. Delivery failure is logged and the user counts as
    /// skipped (the recipient may have blocked the bot).
    async fn process_user(&self, user_id: i64, profile: &UserProfile) -> crate::Result<bool> {
        let Some((lat, lon)) = profile.coordinates() else {
            debug!("User {} has no coordinates, skipping", user_id);
            return Ok(false);
        };

        let Some(forecast) = self.gateway.hourly_forecast(lat, lon).await.into_option() else {
            debug!("No forecast for user {} this cycle, skipping", user_id);
            return Ok(false);
        };
        let current = self.gateway.current_weather(lat, lon).await.into_option();

        let alerts = evaluate_alerts(current.as_ref(), &forecast, &self.policy);
        if alerts.is_empty() {
            return Ok(false);
        }

        let city = profile
            .city
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| {
                if forecast.city.is_empty() {
                    "your location".to_string()
                } else {
                    forecast.city.clone()
                }
            });

        let text = Self::format_notification(&city, &alerts);
        if let Err(e) = self.sink.deliver(user_id, &text).await {
            warn!("Delivery to user {} failed: {}", user_id, e);
            return Ok(false);
        }
        Ok(true)
    }

    /// Run one scan over all subscribed users
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        let subscribed = match self.profiles.list_subscribed().await {
            Ok(subscribed) => subscribed,
            Err(e) => {
                warn!("Could not enumerate subscribed users: {}", e);
                return report;
            }
        };

        for (user_id, profile) in subscribed {
            report.scanned += 1;
            match self.process_user(user_id, &profile).await {
                Ok(true) => report.notified += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    // Per-user failure boundary: log and move on
                    warn!("Alert evaluation failed for user {}: {}", user_id, e);
                    report.skipped += 1;
                }
            }
        }

        info!(
            "Alert cycle done: {} scanned, {} notified, {} skipped",
            report.scanned, report.notified, report.skipped
        );
        report
    }

    /// Run scan cycles on the fixed cadence until cancelled.
    ///
    /// Per-user custom intervals stored in the profiles are not honored;
    /// this cadence is the only scheduling granularity.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            "Alert loop started, cadence {}s",
            self.policy.scan_interval().as_secs()
        );

        loop {
            self.run_cycle().await;

            tokio::select! {
                () = cancel.cancelled() => {
                    info!("Alert loop stopping");
                    break;
                }
                () = tokio::time::sleep(self.policy.scan_interval()) => {}
            }
        }
    }
}
