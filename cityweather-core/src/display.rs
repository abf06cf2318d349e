//! Display strings for readings.

use crate::model::Reading;

pub const NOT_AVAILABLE: &str = "N/A";

/// `21.999` → `"22.0°C"`.
pub fn format_temperature(temp_c: Reading<&f64>) -> String {
    match temp_c {
        Reading::Reported(t) => format!("{t:.1}°C"),
        Reading::Missing => NOT_AVAILABLE.to_string(),
    }
}

/// `63` → `"63%"`.
pub fn format_humidity(humidity_pct: Reading<&i64>) -> String {
    match humidity_pct {
        Reading::Reported(h) => format!("{h}%"),
        Reading::Missing => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_description(description: Reading<&String>) -> String {
    match description {
        Reading::Reported(d) => d.clone(),
        Reading::Missing => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_rounds_to_one_decimal() {
        assert_eq!(format_temperature(Reading::Reported(&21.999)), "22.0°C");
        assert_eq!(format_temperature(Reading::Reported(&-3.04)), "-3.0°C");
        assert_eq!(format_temperature(Reading::Reported(&0.0)), "0.0°C");
    }

    #[test]
    fn humidity_is_integer_percent() {
        assert_eq!(format_humidity(Reading::Reported(&63)), "63%");
    }

    #[test]
    fn missing_readings_show_not_available() {
        assert_eq!(format_temperature(Reading::Missing), "N/A");
        assert_eq!(format_humidity(Reading::Missing), "N/A");
        assert_eq!(format_description(Reading::Missing), "N/A");
    }
}
