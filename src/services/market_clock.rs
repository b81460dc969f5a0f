use crate::constants::{DISPLAY_TIMEZONE, MARKET_TIMEZONE};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

fn zone(name: &str) -> Tz {
    match name.parse() {
        Ok(tz) => tz,
        Err(e) => {
            tracing::warn!("Failed to parse timezone '{}': {}", name, e);
            Tz::UTC
        }
    }
}

/// Session date on the exchange clock (New York)
pub fn trade_date(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&zone(MARKET_TIMEZONE)).date_naive()
}

/// Update stamp shown on the dashboard, e.g. `2024.06.03 06:10 KST`
pub fn display_timestamp(now: DateTime<Utc>) -> String {
    now.with_timezone(&zone(DISPLAY_TIMEZONE))
        .format("%Y.%m.%d %H:%M KST")
        .to_string()
}
