use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, NaiveTime, Weekday};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use shared_config::{AppConfig, MAX_LEAD_TIME_MINUTES};

use crate::error::SlotError;
use crate::services::formatting::format_price;
use crate::services::template::parse_template;

static SLOT_TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]?[0-9]|2[0-3]):([0-5][0-9])$").expect("slot time pattern is valid")
});

// ==============================================================================
// WEEKDAYS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    /// Template key for this weekday.
    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "sunday",
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
        }
    }

    pub fn to_chrono(self) -> Weekday {
        match self {
            DayOfWeek::Sunday => Weekday::Sun,
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

impl FromStr for DayOfWeek {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.as_str() == key)
            .ok_or_else(|| SlotError::UnknownWeekday(s.to_string()))
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// TEMPLATE
// ==============================================================================

/// A candidate time-of-day: the `HH:mm` text as supplied plus its parsed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTime {
    label: String,
    time: NaiveTime,
}

impl SlotTime {
    /// Parses a 24-hour `HH:mm` string. `day` only feeds the error.
    pub fn parse(day: &str, raw: &str) -> Result<Self, SlotError> {
        let trimmed = raw.trim();
        let malformed = |reason: &str| SlotError::MalformedTemplateEntry {
            day: day.to_string(),
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        let captures = SLOT_TIME_PATTERN
            .captures(trimmed)
            .ok_or_else(|| malformed("expected 24-hour HH:mm"))?;

        let hour: u32 = captures[1].parse().map_err(|_| malformed("invalid hour"))?;
        let minute: u32 = captures[2].parse().map_err(|_| malformed("invalid minute"))?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| malformed("time out of range"))?;

        Ok(Self {
            label: trimmed.to_string(),
            time,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DaySchedule {
    #[serde(rename = "availableSlots")]
    pub available_slots: Vec<SlotTime>,
}

/// Recurring weekly schedule of offered times, keyed by weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AvailabilityTemplate {
    days: BTreeMap<DayOfWeek, DaySchedule>,
}

impl AvailabilityTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by callers assembling a template in code. Unparsable times are skipped.
    pub fn with_day(mut self, day: DayOfWeek, times: &[&str]) -> Self {
        let schedule = self.days.entry(day).or_default();
        for raw in times {
            match SlotTime::parse(day.as_str(), raw) {
                Ok(slot) => schedule.available_slots.push(slot),
                Err(e) => warn!("Skipping availability entry: {}", e),
            }
        }
        self
    }

    pub(crate) fn push(&mut self, day: DayOfWeek, slot: SlotTime) {
        self.days.entry(day).or_default().available_slots.push(slot);
    }

    pub(crate) fn ensure_day(&mut self, day: DayOfWeek) {
        self.days.entry(day).or_default();
    }

    /// Candidate times for a weekday in template order.
    pub fn slots_for(&self, day: DayOfWeek) -> &[SlotTime] {
        self.days
            .get(&day)
            .map(|schedule| schedule.available_slots.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(|schedule| schedule.available_slots.is_empty())
    }
}

impl<'de> Deserialize<'de> for AvailabilityTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let parsed = parse_template(&value);

        for issue in &parsed.issues {
            warn!("Ignoring availability entry for {}: '{}' ({})", issue.day, issue.value, issue.reason);
        }

        Ok(parsed.template)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateIssue {
    pub day: String,
    pub value: String,
    pub reason: String,
}

impl From<SlotError> for TemplateIssue {
    fn from(err: SlotError) -> Self {
        match err {
            SlotError::MalformedTemplateEntry { day, value, reason } => Self { day, value, reason },
            SlotError::UnknownWeekday(day) => Self {
                day,
                value: String::new(),
                reason: "unknown weekday".to_string(),
            },
            other => Self {
                day: String::new(),
                value: String::new(),
                reason: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedTemplate {
    pub template: AvailabilityTemplate,
    pub issues: Vec<TemplateIssue>,
}

impl ParsedTemplate {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

// ==============================================================================
// RESOLUTION
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSlot {
    pub label: String,
    pub day: DayOfWeek,
    pub date: NaiveDate,
    pub time: String,
}

impl ResolvedSlot {
    pub fn display_text(&self) -> String {
        format!("{}, {}", self.label, self.time)
    }
}

/// Minimum notice before a same-day slot is bookable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadTimePolicy {
    /// One hour.
    #[default]
    Standard,
    /// Twenty-four hours; same-day slots are never offered.
    Strict,
    Custom { minutes: i64 },
}

impl LeadTimePolicy {
    pub const STANDARD_MINUTES: i64 = 60;
    pub const STRICT_MINUTES: i64 = 24 * 60;
    pub const MAX_MINUTES: i64 = MAX_LEAD_TIME_MINUTES;

    pub fn from_minutes(minutes: i64) -> Self {
        match minutes {
            Self::STANDARD_MINUTES => LeadTimePolicy::Standard,
            Self::STRICT_MINUTES => LeadTimePolicy::Strict,
            other => LeadTimePolicy::Custom {
                minutes: other.clamp(0, Self::MAX_MINUTES),
            },
        }
    }

    /// Rejects custom lead times outside `0..=MAX_MINUTES`.
    pub fn checked(self) -> Result<Self, SlotError> {
        match self {
            LeadTimePolicy::Custom { minutes } if !(0..=Self::MAX_MINUTES).contains(&minutes) => {
                Err(SlotError::InvalidLeadTime {
                    minutes,
                    max: Self::MAX_MINUTES,
                })
            }
            policy => Ok(policy),
        }
    }

    /// Effective minutes, clamped to `0..=MAX_MINUTES`.
    pub fn minutes(&self) -> i64 {
        match self {
            LeadTimePolicy::Standard => Self::STANDARD_MINUTES,
            LeadTimePolicy::Strict => Self::STRICT_MINUTES,
            LeadTimePolicy::Custom { minutes } => (*minutes).clamp(0, Self::MAX_MINUTES),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::try_minutes(self.minutes()).unwrap_or(Duration::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    pub lead_time: LeadTimePolicy,
    pub limit: usize,
    pub horizon_days: u32,
}

impl ResolverOptions {
    pub const DEFAULT_LIMIT: usize = 2;
    pub const DEFAULT_HORIZON_DAYS: u32 = 14;

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            lead_time: LeadTimePolicy::from_minutes(config.lead_time_minutes),
            limit: config.default_limit,
            horizon_days: config.horizon_days,
        }
    }

    pub fn with_lead_time(mut self, lead_time: LeadTimePolicy) -> Self {
        self.lead_time = lead_time;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_horizon_days(mut self, horizon_days: u32) -> Self {
        self.horizon_days = horizon_days;
        self
    }
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            lead_time: LeadTimePolicy::Standard,
            limit: Self::DEFAULT_LIMIT,
            horizon_days: Self::DEFAULT_HORIZON_DAYS,
        }
    }
}

/// A resolved slot as shown in a booking list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingOption {
    #[serde(flatten)]
    pub slot: ResolvedSlot,
    pub display: String,
    pub price: Option<f64>,
    pub price_display: Option<String>,
}

impl BookingOption {
    pub fn new(slot: ResolvedSlot, price: Option<f64>) -> Self {
        Self {
            display: slot.display_text(),
            price_display: format_price(price),
            price,
            slot,
        }
    }
}
