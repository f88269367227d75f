use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::error::SlotError;
use crate::models::{AvailabilityTemplate, BookingOption, LeadTimePolicy, ResolverOptions};
use crate::services::{template::validate_template, SlotResolver};

#[derive(Debug, Deserialize)]
pub struct NextSlotsRequest {
    #[serde(default)]
    pub availability: AvailabilityTemplate,
    pub limit: Option<usize>,
    pub lead_time: Option<LeadTimePolicy>,
    /// Defaults to the current time.
    pub now: Option<DateTime<Utc>>,
    /// IANA name overriding the configured business timezone.
    pub timezone: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateAvailabilityRequest {
    #[serde(default)]
    pub availability: Value,
}

#[axum::debug_handler]
pub async fn get_next_slots(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<NextSlotsRequest>,
) -> Result<Json<Value>, AppError> {
    let mut options = ResolverOptions::from_config(&state);

    if let Some(limit) = request.limit {
        check_limit(limit, options.horizon_days)?;
        options.limit = limit;
    }
    if let Some(lead_time) = request.lead_time {
        options.lead_time = lead_time.checked()?;
    }

    let timezone = match request.timezone.as_deref() {
        Some(name) => parse_timezone(name)?,
        None => state.business_timezone,
    };

    let now = request.now.unwrap_or_else(Utc::now);
    debug!(
        "Resolving next {} slot(s) at {} in {} with {} min lead time",
        options.limit,
        now,
        timezone.name(),
        options.lead_time.minutes()
    );

    let lead_time_minutes = options.lead_time.minutes();
    let resolver = SlotResolver::new(options, timezone);
    let booking_options: Vec<BookingOption> = resolver
        .resolve(&request.availability, now)
        .into_iter()
        .map(|slot| BookingOption::new(slot, request.price))
        .collect();

    if booking_options.is_empty() {
        info!("No bookable slots within the horizon");
    }

    Ok(Json(json!({
        "slots": booking_options,
        "total": booking_options.len(),
        "next_available": booking_options.first(),
        "timezone": timezone.name(),
        "lead_time_minutes": lead_time_minutes
    })))
}

#[axum::debug_handler]
pub async fn validate_availability(
    Json(request): Json<ValidateAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let issues = validate_template(&request.availability);

    Ok(Json(json!({
        "valid": issues.is_empty(),
        "issues": issues
    })))
}

fn check_limit(limit: usize, horizon_days: u32) -> Result<(), SlotError> {
    let max = horizon_days as usize;
    if limit == 0 || limit > max {
        return Err(SlotError::InvalidLimit { limit, max });
    }
    Ok(())
}

fn parse_timezone(name: &str) -> Result<Tz, SlotError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| SlotError::InvalidTimezone(name.to_string()))
}
