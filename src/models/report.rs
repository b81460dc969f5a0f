use crate::models::Rankings;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Unranked quote shown in the index bar or as a featured card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteCard {
    pub symbol: String,
    pub name: String,
    pub last_price: Option<f64>,
    pub percent_change: Option<f64>,
}

/// Everything one dashboard render needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    /// Session date on the exchange clock
    pub trade_date: NaiveDate,
    pub overview: Vec<QuoteCard>,
    pub featured: Vec<QuoteCard>,
    pub rankings: Rankings,
}
