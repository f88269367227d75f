pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::SlotError;
pub use models::{
    AvailabilityTemplate, BookingOption, DayOfWeek, DaySchedule, LeadTimePolicy,
    ParsedTemplate, ResolvedSlot, ResolverOptions, SlotTime, TemplateIssue,
};
pub use router::availability_routes;
pub use services::{parse_template, resolve_next_slots, validate_template, SlotResolver};
