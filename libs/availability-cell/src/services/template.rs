use serde_json::Value;
use tracing::debug;

use crate::error::SlotError;
use crate::models::{AvailabilityTemplate, DayOfWeek, ParsedTemplate, SlotTime, TemplateIssue};

const SLOTS_FIELD: &str = "availableSlots";

/// Leniently parses an availability payload of the shape
/// `{ "<weekday>": { "availableSlots": ["HH:mm", ...] } }`.
///
/// Anything that cannot be understood is dropped and reported as a
/// [`TemplateIssue`]; parsing itself never fails. `null` (at the top level,
/// for a weekday, or for its slot list) means "nothing offered" and is not an issue.
pub fn parse_template(value: &Value) -> ParsedTemplate {
    let mut parsed = ParsedTemplate::default();

    let entries = match value {
        Value::Null => return parsed,
        Value::Object(entries) => entries,
        other => {
            parsed.issues.push(malformed("*", other, "availability must be an object keyed by weekday"));
            return parsed;
        }
    };

    for (key, entry) in entries {
        let day = match key.parse::<DayOfWeek>() {
            Ok(day) => day,
            Err(e) => {
                parsed.issues.push(e.into());
                continue;
            }
        };

        let slots = match entry {
            Value::Null => {
                parsed.template.ensure_day(day);
                continue;
            }
            Value::Object(fields) => match fields.get(SLOTS_FIELD) {
                None | Some(Value::Null) => {
                    parsed.template.ensure_day(day);
                    continue;
                }
                Some(Value::Array(slots)) => slots,
                Some(other) => {
                    parsed.issues.push(malformed(key, other, "availableSlots must be a list of HH:mm strings"));
                    continue;
                }
            },
            other => {
                parsed.issues.push(malformed(key, other, "expected an object with availableSlots"));
                continue;
            }
        };

        parsed.template.ensure_day(day);
        for raw in slots {
            match raw.as_str() {
                Some(text) => match SlotTime::parse(key, text) {
                    Ok(slot) => parsed.template.push(day, slot),
                    Err(e) => parsed.issues.push(e.into()),
                },
                None => parsed.issues.push(malformed(key, raw, "time must be a string")),
            }
        }
    }

    debug!(
        "Parsed availability template with {} issue(s), empty: {}",
        parsed.issues.len(),
        parsed.template.is_empty()
    );

    parsed
}

/// Returns every entry [`parse_template`] would drop.
pub fn validate_template(value: &Value) -> Vec<TemplateIssue> {
    parse_template(value).issues
}

fn malformed(day: &str, value: &Value, reason: &str) -> TemplateIssue {
    SlotError::MalformedTemplateEntry {
        day: day.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
