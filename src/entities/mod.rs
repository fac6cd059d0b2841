//! Record types served by the MAO backend
//!
//! **Onboarding:**
//! - [`Farmer`] - Registered abaca farmers
//! - [`Buyer`] - Licensed fiber buyers
//! - [`AssociationOfficer`] - Officers of farmer associations (e.g. CUSAFA)
//!
//! **Supply chain:**
//! - [`Harvest`] - Harvest submissions awaiting verification
//! - [`SalesReport`] - Farmer-to-buyer sales awaiting review
//! - [`FiberDelivery`] - Fiber deliveries to buyers
//! - [`Distribution`] - Seedling distributions to associations and farmers
//!
//! **Content and administration:**
//! - [`TeamMember`] - Office team bios
//! - [`Article`] - News articles
//! - [`ActivityLog`] / [`BlockedAddress`] - Audit trail and blocklist
//! - [`MaintenanceStatus`] - Maintenance mode flag
//! - [`DashboardReport`] - Production, sales and user statistics

pub mod activity;
pub mod article;
pub mod buyer;
pub mod delivery;
pub mod distribution;
pub mod farmer;
pub mod harvest;
pub mod maintenance;
pub mod officer;
pub mod report;
pub mod sales;
pub mod team;

pub use activity::{ActivityLog, BlockKind, BlockedAddress};
pub use article::{Article, ArticleStatus};
pub use buyer::Buyer;
pub use delivery::{DeliveryStatus, FiberDelivery};
pub use distribution::{Distribution, RecipientType};
pub use farmer::Farmer;
pub use harvest::Harvest;
pub use maintenance::MaintenanceStatus;
pub use officer::AssociationOfficer;
pub use report::DashboardReport;
pub use sales::SalesReport;
pub use team::TeamMember;

/// Deserializers tolerant of how the backend encodes numbers and dates
///
/// Numeric columns sometimes arrive as strings ("12.50") and dates as either
/// RFC 3339 timestamps or bare `YYYY-MM-DD` values.
pub(crate) mod lenient {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Number(f64),
        Text(String),
    }

    /// Number or numeric string; null and "" become 0
    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Option::<Wire>::deserialize(deserializer)? {
            None => Ok(0.0),
            Some(Wire::Number(n)) => Ok(n),
            Some(Wire::Text(s)) if s.trim().is_empty() => Ok(0.0),
            Some(Wire::Text(s)) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid number: {}", s))),
        }
    }

    /// Non-negative whole count (rounded), from a number or numeric string
    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let n = number(deserializer)?;
        if n < 0.0 {
            return Err(D::Error::custom(format!("negative count: {}", n)));
        }
        Ok(n.round() as u64)
    }

    /// Parse the date formats the backend emits
    pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt.and_utc());
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    /// Optional timestamp; unparseable values become None
    pub fn timestamp<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?
            .as_deref()
            .and_then(parse_timestamp))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use serde::Deserialize;

        #[derive(Deserialize)]
        struct Probe {
            #[serde(default, deserialize_with = "number")]
            kg: f64,
            #[serde(default, deserialize_with = "count")]
            qty: u64,
            #[serde(default, deserialize_with = "timestamp")]
            at: Option<DateTime<Utc>>,
        }

        #[test]
        fn test_numbers_from_strings() {
            let p: Probe = serde_json::from_str(r#"{"kg": "12.50", "qty": "300"}"#).unwrap();
            assert_eq!(p.kg, 12.5);
            assert_eq!(p.qty, 300);

            let p: Probe = serde_json::from_str(r#"{"kg": null, "qty": 4}"#).unwrap();
            assert_eq!(p.kg, 0.0);
            assert_eq!(p.qty, 4);
        }

        #[test]
        fn test_missing_fields_default() {
            let p: Probe = serde_json::from_str("{}").unwrap();
            assert_eq!(p.kg, 0.0);
            assert!(p.at.is_none());
        }

        #[test]
        fn test_timestamp_formats() {
            assert!(parse_timestamp("2024-05-01T08:30:00Z").is_some());
            assert!(parse_timestamp("2024-05-01T08:30:00.123").is_some());
            assert!(parse_timestamp("2024-05-01 08:30:00").is_some());
            let day = parse_timestamp("2024-05-01").unwrap();
            assert_eq!(day.format("%Y-%m-%d %H:%M").to_string(), "2024-05-01 00:00");
            assert!(parse_timestamp("yesterday").is_none());
        }

        #[test]
        fn test_bad_number_is_error() {
            assert!(serde_json::from_str::<Probe>(r#"{"kg": "lots"}"#).is_err());
        }
    }
}
