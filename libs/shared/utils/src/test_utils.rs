use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::{json, Map, Value};

use shared_config::AppConfig;

pub struct TestConfig {
    pub timezone: String,
    pub lead_time_minutes: i64,
    pub default_limit: usize,
    pub horizon_days: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            lead_time_minutes: 60,
            default_limit: 2,
            horizon_days: 14,
        }
    }
}

impl TestConfig {
    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = timezone.to_string();
        self
    }

    pub fn with_lead_time_minutes(mut self, minutes: i64) -> Self {
        self.lead_time_minutes = minutes;
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            business_timezone: self.timezone.parse::<Tz>().unwrap_or(Tz::UTC),
            lead_time_minutes: self.lead_time_minutes,
            default_limit: self.default_limit,
            horizon_days: self.horizon_days,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Builds availability payloads in the `{ day: { availableSlots: [...] } }` shape.
#[derive(Default)]
pub struct TemplateFixture {
    days: Map<String, Value>,
}

impl TemplateFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(mut self, day: &str, slots: &[&str]) -> Self {
        self.days.insert(day.to_string(), json!({ "availableSlots": slots }));
        self
    }

    /// Every weekday offering the same times.
    pub fn every_day(slots: &[&str]) -> Self {
        ["sunday", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday"]
            .into_iter()
            .fold(Self::new(), |fixture, day| fixture.day(day, slots))
    }

    pub fn build(self) -> Value {
        Value::Object(self.days)
    }
}

/// Calendar fixtures. 2024-10-21 is a Monday.
pub struct TestClock;

impl TestClock {
    pub const MONDAY: (i32, u32, u32) = (2024, 10, 21);

    pub fn monday_at(hour: u32, minute: u32) -> DateTime<Utc> {
        let (year, month, day) = Self::MONDAY;
        Self::utc(year, month, day, hour, minute)
    }

    pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .single()
            .unwrap_or_else(|| panic!("invalid fixture time {year}-{month}-{day} {hour}:{minute}"))
    }

    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap_or_else(|| panic!("invalid fixture date {year}-{month}-{day}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Weekday};

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default().with_timezone("Europe/Berlin").to_app_config();

        assert_eq!(config.business_timezone, chrono_tz::Europe::Berlin);
        assert_eq!(config.lead_time_minutes, 60);
        assert!(config.is_valid());
    }

    #[test]
    fn test_template_fixture_shape() {
        let template = TemplateFixture::new().day("monday", &["10:00"]).build();

        assert_eq!(template, json!({ "monday": { "availableSlots": ["10:00"] } }));
        assert_eq!(TemplateFixture::every_day(&["09:00"]).build().as_object().unwrap().len(), 7);
    }

    #[test]
    fn test_clock_monday() {
        assert_eq!(TestClock::monday_at(8, 0).weekday(), Weekday::Mon);
    }
}
