use std::env;
use std::str::FromStr;

use chrono_tz::Tz;
use tracing::warn;

pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_LEAD_TIME_MINUTES: i64 = 60;
pub const DEFAULT_SLOT_LIMIT: usize = 2;
pub const DEFAULT_HORIZON_DAYS: u32 = 14;
pub const DEFAULT_PORT: u16 = 3000;
/// One year of notice.
pub const MAX_LEAD_TIME_MINUTES: i64 = 366 * 24 * 60;
pub const MAX_HORIZON_DAYS: u32 = 366;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Timezone the business operates in; "now" is evaluated here.
    pub business_timezone: Tz,
    pub lead_time_minutes: i64,
    pub default_limit: usize,
    pub horizon_days: u32,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            business_timezone: Tz::UTC,
            lead_time_minutes: DEFAULT_LEAD_TIME_MINUTES,
            default_limit: DEFAULT_SLOT_LIMIT,
            horizon_days: DEFAULT_HORIZON_DAYS,
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let business_timezone = match lookup("SLOT_TIMEZONE") {
            Some(name) => name.trim().parse::<Tz>().unwrap_or_else(|_| {
                warn!("SLOT_TIMEZONE '{}' is not a known timezone, using {}", name, DEFAULT_TIMEZONE);
                Tz::UTC
            }),
            None => {
                warn!("SLOT_TIMEZONE not set, using {}", DEFAULT_TIMEZONE);
                Tz::UTC
            }
        };

        let config = Self {
            business_timezone,
            lead_time_minutes: parse_or_default(&lookup, "SLOT_LEAD_TIME_MINUTES", DEFAULT_LEAD_TIME_MINUTES),
            default_limit: parse_or_default(&lookup, "SLOT_DEFAULT_LIMIT", DEFAULT_SLOT_LIMIT),
            horizon_days: parse_or_default(&lookup, "SLOT_HORIZON_DAYS", DEFAULT_HORIZON_DAYS),
            port: parse_or_default(&lookup, "PORT", DEFAULT_PORT),
        };

        if !config.is_valid() {
            warn!("Slot configuration out of range, falling back to defaults for invalid values");
            return config.sanitized();
        }

        config
    }

    pub fn is_valid(&self) -> bool {
        (0..=MAX_LEAD_TIME_MINUTES).contains(&self.lead_time_minutes)
            && self.default_limit > 0
            && (1..=MAX_HORIZON_DAYS).contains(&self.horizon_days)
    }

    /// Negative or zero values fall back to defaults; oversized ones are clamped.
    fn sanitized(self) -> Self {
        let lead_time_minutes = if self.lead_time_minutes < 0 {
            DEFAULT_LEAD_TIME_MINUTES
        } else {
            self.lead_time_minutes.min(MAX_LEAD_TIME_MINUTES)
        };
        let horizon_days = if self.horizon_days == 0 {
            DEFAULT_HORIZON_DAYS
        } else {
            self.horizon_days.min(MAX_HORIZON_DAYS)
        };

        Self {
            lead_time_minutes,
            default_limit: if self.default_limit == 0 { DEFAULT_SLOT_LIMIT } else { self.default_limit },
            horizon_days,
            ..self
        }
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(|_| None);

        assert_eq!(config.business_timezone, Tz::UTC);
        assert_eq!(config.lead_time_minutes, 60);
        assert_eq!(config.default_limit, 2);
        assert_eq!(config.horizon_days, 14);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_reads_all_values() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SLOT_TIMEZONE", "Europe/Paris"),
            ("SLOT_LEAD_TIME_MINUTES", "1440"),
            ("SLOT_DEFAULT_LIMIT", "5"),
            ("SLOT_HORIZON_DAYS", "7"),
            ("PORT", "8080"),
        ]));

        assert_eq!(config.business_timezone, chrono_tz::Europe::Paris);
        assert_eq!(config.lead_time_minutes, 1440);
        assert_eq!(config.default_limit, 5);
        assert_eq!(config.horizon_days, 7);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_utc() {
        let config = AppConfig::from_lookup(lookup_from(&[("SLOT_TIMEZONE", "Mars/Olympus")]));

        assert_eq!(config.business_timezone, Tz::UTC);
        assert_eq!(config.business_timezone.name(), "UTC");
    }

    #[test]
    fn test_garbage_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SLOT_LEAD_TIME_MINUTES", "soon"),
            ("SLOT_DEFAULT_LIMIT", "0"),
            ("SLOT_HORIZON_DAYS", "-3"),
        ]));

        assert_eq!(config.lead_time_minutes, 60);
        assert_eq!(config.default_limit, 2);
        assert_eq!(config.horizon_days, 14);
        assert!(config.is_valid());
    }

    #[test]
    fn test_oversized_numbers_are_clamped() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SLOT_LEAD_TIME_MINUTES", "10000000000000"),
            ("SLOT_HORIZON_DAYS", "4000000000"),
        ]));

        assert_eq!(config.lead_time_minutes, MAX_LEAD_TIME_MINUTES);
        assert_eq!(config.horizon_days, MAX_HORIZON_DAYS);
        assert!(config.is_valid());
    }
}
