use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use shared_config::AppConfig;

use crate::models::{AvailabilityTemplate, DayOfWeek, ResolvedSlot, ResolverOptions};
use crate::services::formatting::slot_label;

/// Past a week and a day every weekday has been offered without a lead-time filter.
const FULL_CYCLE_DAYS: u32 = 8;

/// Resolves the soonest bookable slots from a weekly template, relative to `now`.
///
/// Walks `options.horizon_days` calendar days starting at `now`'s local date and
/// surfaces at most one slot per day (the first candidate in template order) and
/// at most one slot per weekday. Only today's candidates are held to the lead
/// time; later days offer their first candidate unconditionally.
///
/// Pure: the same inputs always produce the same output.
pub fn resolve_next_slots<Z: TimeZone>(
    template: &AvailabilityTemplate,
    now: &DateTime<Z>,
    options: &ResolverOptions,
) -> Vec<ResolvedSlot> {
    let mut slots = Vec::new();
    if options.limit == 0 || template.is_empty() {
        return slots;
    }

    let timezone = now.timezone();
    let today = now.date_naive();
    // A cutoff past the representable range leaves nothing bookable today.
    let cutoff = now.clone().checked_add_signed(options.lead_time.duration());
    let mut surfaced: BTreeSet<DayOfWeek> = BTreeSet::new();

    for offset in 0..options.horizon_days.min(FULL_CYCLE_DAYS) {
        if slots.len() >= options.limit {
            break;
        }

        let Some(date) = today.checked_add_days(Days::new(u64::from(offset))) else {
            break;
        };
        let day = DayOfWeek::from(date.weekday());
        if surfaced.contains(&day) {
            continue;
        }

        let candidates = template.slots_for(day);
        if candidates.is_empty() {
            continue;
        }

        let selected = if offset == 0 {
            cutoff.as_ref().and_then(|cutoff| {
                candidates
                    .iter()
                    .find(|candidate| starts_at_or_after(&timezone, date, candidate.time(), cutoff))
            })
        } else {
            candidates.first()
        };

        let Some(selected) = selected else {
            debug!("No {} slot on {} clears the lead time", day, date);
            continue;
        };

        surfaced.insert(day);
        slots.push(ResolvedSlot {
            label: slot_label(offset, date),
            day,
            date,
            time: selected.label().to_string(),
        });
    }

    debug!("Resolved {} slot(s) from {}", slots.len(), today);
    slots
}

/// Local times skipped by a DST gap never qualify; repeated ones use the earlier instant.
fn starts_at_or_after<Z: TimeZone>(timezone: &Z, date: NaiveDate, time: NaiveTime, cutoff: &DateTime<Z>) -> bool {
    match timezone.from_local_datetime(&date.and_time(time)).earliest() {
        Some(start) => start >= *cutoff,
        None => false,
    }
}

/// Resolver bound to a business timezone, so callers only supply a UTC instant.
#[derive(Debug, Clone)]
pub struct SlotResolver {
    options: ResolverOptions,
    timezone: Tz,
}

impl SlotResolver {
    pub fn new(options: ResolverOptions, timezone: Tz) -> Self {
        Self { options, timezone }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ResolverOptions::from_config(config), config.business_timezone)
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn resolve(&self, template: &AvailabilityTemplate, now: DateTime<Utc>) -> Vec<ResolvedSlot> {
        let local_now = now.with_timezone(&self.timezone);
        resolve_next_slots(template, &local_now, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadTimePolicy;

    // 2024-10-21 is a Monday.
    fn monday_at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 21, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_today_slot_after_lead_time() {
        let template = AvailabilityTemplate::new().with_day(DayOfWeek::Monday, &["10:00", "14:00"]);
        let slots = resolve_next_slots(&template, &monday_at(8, 0), &ResolverOptions::default());

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].label, "Today");
        assert_eq!(slots[0].time, "10:00");
    }

    #[test]
    fn test_lead_time_boundary_is_inclusive() {
        let template = AvailabilityTemplate::new().with_day(DayOfWeek::Monday, &["10:00"]);
        let slots = resolve_next_slots(&template, &monday_at(9, 0), &ResolverOptions::default());

        assert_eq!(slots[0].label, "Today");
        assert_eq!(slots[0].time, "10:00");
    }

    #[test]
    fn test_tomorrow_ignores_lead_time() {
        let template = AvailabilityTemplate::new().with_day(DayOfWeek::Tuesday, &["00:15"]);
        let options = ResolverOptions::default().with_lead_time(LeadTimePolicy::Strict);
        let slots = resolve_next_slots(&template, &monday_at(23, 30), &options);

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].label, "Tomorrow");
        assert_eq!(slots[0].day, DayOfWeek::Tuesday);
    }

    #[test]
    fn test_unrepresentable_cutoff_skips_today() {
        let mut template = AvailabilityTemplate::new();
        for day in DayOfWeek::ALL {
            template = template.with_day(day, &["10:00"]);
        }
        let last_instant = Utc.from_utc_datetime(&NaiveDate::MAX.and_hms_opt(8, 0, 0).unwrap());
        let options = ResolverOptions::default().with_lead_time(LeadTimePolicy::Strict);

        assert!(resolve_next_slots(&template, &last_instant, &options).is_empty());
    }

    #[test]
    fn test_huge_horizon_still_terminates() {
        let template = AvailabilityTemplate::new().with_day(DayOfWeek::Friday, &["16:00"]);
        let options = ResolverOptions::default().with_horizon_days(u32::MAX).with_limit(usize::MAX);
        let slots = resolve_next_slots(&template, &monday_at(8, 0), &options);

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].date, NaiveDate::from_ymd_opt(2024, 10, 25).unwrap());
    }

    #[test]
    fn test_zero_limit_is_empty() {
        let template = AvailabilityTemplate::new().with_day(DayOfWeek::Monday, &["10:00"]);
        let options = ResolverOptions::default().with_limit(0);

        assert!(resolve_next_slots(&template, &monday_at(8, 0), &options).is_empty());
    }

    #[test]
    fn test_resolver_uses_business_timezone() {
        // 23:30 UTC Monday is already Tuesday 01:30 in Paris (CEST, UTC+2).
        let template = AvailabilityTemplate::new()
            .with_day(DayOfWeek::Monday, &["09:00"])
            .with_day(DayOfWeek::Tuesday, &["09:00"]);
        let resolver = SlotResolver::new(ResolverOptions::default().with_limit(1), chrono_tz::Europe::Paris);
        let slots = resolver.resolve(&template, monday_at(23, 30));

        assert_eq!(slots[0].label, "Today");
        assert_eq!(slots[0].day, DayOfWeek::Tuesday);
        assert_eq!(slots[0].date, NaiveDate::from_ymd_opt(2024, 10, 22).unwrap());
    }

    #[test]
    fn test_resolver_from_config() {
        let config = AppConfig {
            lead_time_minutes: 1440,
            default_limit: 3,
            ..AppConfig::default()
        };
        let resolver = SlotResolver::from_config(&config);

        assert_eq!(resolver.options().lead_time, LeadTimePolicy::Strict);
        assert_eq!(resolver.options().limit, 3);
        assert_eq!(resolver.timezone(), Tz::UTC);
    }
}
