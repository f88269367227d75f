pub mod formatting;
pub mod resolver;
pub mod template;

pub use resolver::{resolve_next_slots, SlotResolver};
pub use template::{parse_template, validate_template};
