//! Severity tiers for Wazuh rule levels
//!
//! Rule levels run 0-15. Tiers are inclusive on their lower bound, so a
//! level sitting on a boundary lands in the higher tier.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity tier of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Below 5, or no level at all
    #[default]
    Low = 0,
    /// 5-7
    Medium = 1,
    /// 8-11
    High = 2,
    /// 12 and up
    Critical = 3,
}

impl Severity {
    /// Tier for a rule level
    pub fn from_level(level: i64) -> Self {
        match level {
            l if l >= 12 => Severity::Critical,
            8..=11 => Severity::High,
            5..=7 => Severity::Medium,
            _ => Severity::Low,
        }
    }

    /// Read a level out of a JSON value. Accepts integers, floats (truncated)
    /// and numeric strings; anything else has no level.
    pub fn level_from_value(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            }
            _ => None,
        }
    }

    /// Tier for a JSON level value; unreadable levels are `Low`.
    pub fn from_level_value(value: &Value) -> Self {
        classify_severity(Self::level_from_value(value))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
            Severity::Critical => write!(f, "Critical"),
        }
    }
}

/// Map an optional rule level to its tier. Total: `None` is `Low`.
pub fn classify_severity(level: Option<i64>) -> Severity {
    level.map(Severity::from_level).unwrap_or(Severity::Low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tiers_over_full_range() {
        for level in -5..=20 {
            let expected = if level >= 12 {
                Severity::Critical
            } else if level >= 8 {
                Severity::High
            } else if level >= 5 {
                Severity::Medium
            } else {
                Severity::Low
            };
            assert_eq!(classify_severity(Some(level)), expected, "level {}", level);
        }
    }

    #[test]
    fn test_boundaries_go_to_higher_tier() {
        assert_eq!(classify_severity(Some(12)), Severity::Critical);
        assert_eq!(classify_severity(Some(11)), Severity::High);
        assert_eq!(classify_severity(Some(8)), Severity::High);
        assert_eq!(classify_severity(Some(7)), Severity::Medium);
        assert_eq!(classify_severity(Some(5)), Severity::Medium);
        assert_eq!(classify_severity(Some(4)), Severity::Low);
    }

    #[test]
    fn test_missing_level_is_low() {
        assert_eq!(classify_severity(None), Severity::Low);
        assert_eq!(Severity::from_level_value(&json!(null)), Severity::Low);
        assert_eq!(Severity::from_level_value(&json!({"level": 14})), Severity::Low);
    }

    #[test]
    fn test_level_value_forms() {
        assert_eq!(Severity::level_from_value(&json!(14)), Some(14));
        assert_eq!(Severity::level_from_value(&json!(9.8)), Some(9));
        assert_eq!(Severity::level_from_value(&json!("10")), Some(10));
        assert_eq!(Severity::level_from_value(&json!("high")), None);
        assert_eq!(Severity::from_level_value(&json!("12")), Severity::Critical);
    }

    #[test]
    fn test_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Medium > Severity::Low);
    }
}
