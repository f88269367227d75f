use chrono::NaiveDate;

pub const TODAY_LABEL: &str = "Today";
pub const TOMORROW_LABEL: &str = "Tomorrow";

/// Display hint for a slot `offset` days after today, e.g. "Today", "Tomorrow", "Oct 23".
pub fn slot_label(offset: u32, date: NaiveDate) -> String {
    match offset {
        0 => TODAY_LABEL.to_string(),
        1 => TOMORROW_LABEL.to_string(),
        _ => date.format("%b %-d").to_string(),
    }
}

pub fn format_price(price: Option<f64>) -> Option<String> {
    price
        .filter(|value| value.is_finite())
        .map(|value| format!("{:.2}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_labels() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 21).unwrap();

        assert_eq!(slot_label(0, date), "Today");
        assert_eq!(slot_label(1, date), "Tomorrow");
    }

    #[test]
    fn test_short_date_label() {
        assert_eq!(slot_label(2, NaiveDate::from_ymd_opt(2024, 10, 23).unwrap()), "Oct 23");
        assert_eq!(slot_label(9, NaiveDate::from_ymd_opt(2024, 11, 1).unwrap()), "Nov 1");
    }

    #[test]
    fn test_price_rendering() {
        assert_eq!(format_price(Some(29.0)), Some("29.00".to_string()));
        assert_eq!(format_price(Some(12.346)), Some("12.35".to_string()));
        assert_eq!(format_price(None), None);
        assert_eq!(format_price(Some(f64::NAN)), None);
    }
}
