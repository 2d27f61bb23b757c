//! Alert derivation from forecast deltas
//!
//! Pure functions: the look-ahead window of forecast slots is scanned for
//! rain, snow and thunderstorm conditions, and the current temperature is
//! compared against the slot ~9 hours out for an abrupt swing. One alert
//! per condition kind per cycle, first matching slot wins; the final list
//! is deduplicated by exact message and capped.

use serde::Serialize;

use crate::config::AlertConfig;
use crate::models::{ConditionGroup, HourlyForecast, WeatherSnapshot};

/// Category of a derived alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertKind {
    Rain,
    Snow,
    Thunderstorm,
    TemperatureSwing,
}

/// One human-readable alert condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    fn condition(kind: AlertKind, time_label: &str) -> Self {
        let message = match kind {
            AlertKind::Rain => format!("🌧️ Rain expected at {time_label}"),
            AlertKind::Snow => format!("❄️ Snow expected at {time_label}"),
            AlertKind::Thunderstorm => format!("⛈️ Thunderstorm expected at {time_label}"),
            AlertKind::TemperatureSwing => format!("🌡️ Temperature swing at {time_label}"),
        };
        Self { kind, message }
    }

    fn temperature_swing(delta: f64, hours_ahead: usize) -> Self {
        let direction = if delta > 0.0 { "Warming" } else { "Cooling" };
        Self {
            kind: AlertKind::TemperatureSwing,
            message: format!(
                "🌡️ {direction} by {:.0}°C within the next {hours_ahead} hours",
                delta.abs()
            ),
        }
    }
}

fn condition_alert_kind(condition: ConditionGroup) -> Option<AlertKind> {
    match condition {
        ConditionGroup::Rain => Some(AlertKind::Rain),
        ConditionGroup::Snow => Some(AlertKind::Snow),
        ConditionGroup::Thunderstorm => Some(AlertKind::Thunderstorm),
        _ => None,
    }
}

/// Remove exact-duplicate messages (order preserving, first occurrence
/// wins) and truncate to `max` alerts.
#[must_use]
pub fn dedupe_and_cap(alerts: Vec<Alert>, max: usize) -> Vec<Alert> {
    let mut seen = Vec::new();
    let mut result = Vec::new();

    for alert in alerts {
        if seen.contains(&alert.message) {
            continue;
        }
        seen.push(alert.message.clone());
        result.push(alert);
        if result.len() == max {
            break;
        }
    }

    result
}

/// Derive the alert list for one user from current weather and forecast.
///
/// The first `look_ahead_slots` forecast slots are scanned for alertable
/// conditions; each condition kind fires at most once, labeled with the
/// first matching slot's local time. Independently, the current temperature
/// is compared with the last slot of the window and a swing of at least
/// `temp_swing_threshold` degrees adds a single temperature alert. The
/// result is deduplicated and capped at `max_alerts`.
#[must_use]
pub fn evaluate_alerts(
    current: Option<&WeatherSnapshot>,
    forecast: &HourlyForecast,
    policy: &AlertConfig,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for slot in forecast.slots.iter().take(policy.look_ahead_slots) {
        let Some(kind) = condition_alert_kind(slot.condition) else {
            continue;
        };
        if alerts.iter().any(|a: &Alert| a.kind == kind) {
            continue;
        }
        alerts.push(Alert::condition(kind, &slot.time_label()));
    }

    // Compare against the slot at the end of the window (~9 hours out at
    // 3-hour granularity)
    let swing_index = policy.look_ahead_slots.saturating_sub(1);
    if let (Some(current), Some(future)) = (current, forecast.slots.get(swing_index)) {
        let delta = future.temperature - current.temperature;
        if delta.abs() >= policy.temp_swing_threshold {
            alerts.push(Alert::temperature_swing(delta, swing_index * 3));
        }
    }

    dedupe_and_cap(alerts, policy.max_alerts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    use crate::models::{ConditionGroup, ForecastSlot};

    fn slot(offset_hours: i64, condition: ConditionGroup, temperature: f64) -> ForecastSlot {
        let base: DateTime<Utc> = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        ForecastSlot {
            timestamp: base + Duration::hours(offset_hours),
            temperature,
            condition,
            description: String::new(),
        }
    }

    fn forecast(slots: Vec<ForecastSlot>) -> HourlyForecast {
        HourlyForecast {
            city: "Testville".to_string(),
            slots,
        }
    }

    fn snapshot(temperature: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            city: "Testville".to_string(),
            temperature,
            feels_like: temperature,
            condition: ConditionGroup::Clear,
            description: "clear sky".to_string(),
            humidity: 50,
            pressure: 1013,
            wind_speed: 2.0,
            wind_direction: 180,
            observed_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_rain_fires_once_with_first_slot_time() {
        let slots = vec![
            slot(0, ConditionGroup::Rain, 10.0),
            slot(3, ConditionGroup::Rain, 10.0),
            slot(6, ConditionGroup::Rain, 10.0),
            slot(9, ConditionGroup::Rain, 10.0),
        ];
        let first_label = slots[0].time_label();
        let alerts = evaluate_alerts(None, &forecast(slots), &AlertConfig::default());

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Rain);
        assert!(alerts[0].message.contains(&first_label));
    }

    #[test]
    fn test_each_condition_kind_fires() {
        let slots = vec![
            slot(0, ConditionGroup::Rain, 10.0),
            slot(3, ConditionGroup::Snow, 1.0),
            slot(6, ConditionGroup::Thunderstorm, 12.0),
            slot(9, ConditionGroup::Clouds, 11.0),
        ];
        let alerts = evaluate_alerts(None, &forecast(slots), &AlertConfig::default());

        let kinds: Vec<_> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![AlertKind::Rain, AlertKind::Snow, AlertKind::Thunderstorm]
        );
    }

    #[test]
    fn test_conditions_beyond_window_are_ignored() {
        let slots = vec![
            slot(0, ConditionGroup::Clear, 10.0),
            slot(3, ConditionGroup::Clear, 10.0),
            slot(6, ConditionGroup::Clear, 10.0),
            slot(9, ConditionGroup::Clear, 10.0),
            slot(12, ConditionGroup::Thunderstorm, 10.0),
        ];
        let alerts = evaluate_alerts(None, &forecast(slots), &AlertConfig::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_temperature_swing_warming() {
        let slots = vec![
            slot(0, ConditionGroup::Clear, 10.0),
            slot(3, ConditionGroup::Clear, 12.0),
            slot(6, ConditionGroup::Clear, 14.0),
            slot(9, ConditionGroup::Clear, 17.0),
        ];
        let alerts = evaluate_alerts(
            Some(&snapshot(10.0)),
            &forecast(slots),
            &AlertConfig::default(),
        );

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::TemperatureSwing);
        assert!(alerts[0].message.contains("Warming by 7°C"));
    }

    #[test]
    fn test_temperature_swing_cooling() {
        let slots = vec![
            slot(0, ConditionGroup::Clear, 10.0),
            slot(3, ConditionGroup::Clear, 8.0),
            slot(6, ConditionGroup::Clear, 5.0),
            slot(9, ConditionGroup::Clear, 2.0),
        ];
        let alerts = evaluate_alerts(
            Some(&snapshot(10.0)),
            &forecast(slots),
            &AlertConfig::default(),
        );

        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("Cooling by 8°C"));
    }

    #[test]
    fn test_small_delta_is_not_a_swing() {
        let slots = vec![
            slot(0, ConditionGroup::Clear, 10.0),
            slot(3, ConditionGroup::Clear, 11.0),
            slot(6, ConditionGroup::Clear, 12.0),
            slot(9, ConditionGroup::Clear, 14.0),
        ];
        let alerts = evaluate_alerts(
            Some(&snapshot(10.0)),
            &forecast(slots),
            &AlertConfig::default(),
        );
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_no_current_weather_skips_swing() {
        let slots = vec![
            slot(0, ConditionGroup::Clear, 10.0),
            slot(3, ConditionGroup::Clear, 10.0),
            slot(6, ConditionGroup::Clear, 10.0),
            slot(9, ConditionGroup::Clear, 30.0),
        ];
        let alerts = evaluate_alerts(None, &forecast(slots), &AlertConfig::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_short_forecast_skips_swing() {
        let slots = vec![slot(0, ConditionGroup::Clear, 10.0)];
        let alerts = evaluate_alerts(
            Some(&snapshot(30.0)),
            &forecast(slots),
            &AlertConfig::default(),
        );
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_dedupe_preserves_first_occurrence() {
        let alerts = vec![
            Alert::condition(AlertKind::Rain, "09:00"),
            Alert::condition(AlertKind::Snow, "12:00"),
            Alert::condition(AlertKind::Rain, "09:00"),
        ];
        let deduped = dedupe_and_cap(alerts, 5);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].kind, AlertKind::Rain);
        assert_eq!(deduped[1].kind, AlertKind::Snow);
    }

    #[test]
    fn test_cap_at_five() {
        let alerts: Vec<Alert> = (0..8)
            .map(|i| Alert::condition(AlertKind::Rain, &format!("{i:02}:00")))
            .collect();
        let capped = dedupe_and_cap(alerts.clone(), 5);

        assert_eq!(capped.len(), 5);
        assert_eq!(capped, alerts[..5]);
    }
}
