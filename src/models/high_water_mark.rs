use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highest close observed for one symbol and the day it happened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighWaterMark {
    pub highest: f64,
    pub date: NaiveDate,
}

impl HighWaterMark {
    pub fn new(highest: f64, date: NaiveDate) -> Self {
        Self { highest, date }
    }

    /// Percent by which `price` sits above this mark
    pub fn percent_above(&self, price: f64) -> Option<f64> {
        if self.highest > 0.0 {
            let pct = (price - self.highest) / self.highest * 100.0;
            pct.is_finite().then_some(pct)
        } else {
            None
        }
    }
}

/// Symbol -> mark, sorted so the serialized store is stable
pub type HighWaterMarks = BTreeMap<String, HighWaterMark>;

/// Whether a symbol's first observed price is reported as a new high
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FirstObservation {
    /// No prior record means any price is a high
    #[default]
    CountsAsHigh,
    /// First price only seeds the record
    Baseline,
}

impl FirstObservation {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "counts-as-high" | "high" => Ok(FirstObservation::CountsAsHigh),
            "baseline" | "seed" => Ok(FirstObservation::Baseline),
            _ => Err(format!(
                "Invalid first-observation policy: '{}'. Valid values: counts-as-high, baseline",
                s
            )),
        }
    }

    pub fn counts_as_high(&self) -> bool {
        matches!(self, FirstObservation::CountsAsHigh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_above() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mark = HighWaterMark::new(200.0, date);
        assert_eq!(mark.percent_above(210.0), Some(5.0));
        assert_eq!(mark.percent_above(200.0), Some(0.0));
        assert_eq!(HighWaterMark::new(0.0, date).percent_above(1.0), None);
    }

    #[test]
    fn test_serialized_shape() {
        let mut marks = HighWaterMarks::new();
        marks.insert(
            "AAPL".to_string(),
            HighWaterMark::new(150.0, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
        );
        let json = serde_json::to_string(&marks).unwrap();
        assert_eq!(json, r#"{"AAPL":{"highest":150.0,"date":"2024-03-01"}}"#);
    }

    #[test]
    fn test_first_observation_from_str() {
        assert_eq!(FirstObservation::from_str("baseline").unwrap(), FirstObservation::Baseline);
        assert_eq!(
            FirstObservation::from_str("Counts-As-High").unwrap(),
            FirstObservation::CountsAsHigh
        );
        assert!(FirstObservation::from_str("maybe").is_err());
        assert!(FirstObservation::default().counts_as_high());
    }
}
