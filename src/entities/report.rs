//! Dashboard statistics from the three admin report endpoints
//!
//! The three reports are fetched in parallel and merged. A report that
//! fails to load leaves its cards at zero and is listed in
//! [`DashboardReport::failures`]; the others still render.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::core::api::{ApiClient, ApiError, Transport};
use crate::core::fetch::fetch_parallel;
use crate::core::summary::{format_number, trend_label};
use crate::entities::lenient;

pub const PRODUCTION_PATH: &str = "/admin/production-report";
pub const SALES_PATH: &str = "/admin/sales-report";
pub const USERS_PATH: &str = "/admin/users-report";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionReport {
    #[serde(alias = "totalHarvests", deserialize_with = "lenient::count")]
    pub total_harvests: u64,

    #[serde(alias = "totalKg", alias = "total_fiber_kg", alias = "totalFiberKg", deserialize_with = "lenient::number")]
    pub total_kg: f64,

    #[serde(alias = "verifiedHarvests", deserialize_with = "lenient::count")]
    pub verified_harvests: u64,

    #[serde(alias = "pendingHarvests", deserialize_with = "lenient::count")]
    pub pending_harvests: u64,

    /// Previous-period total, when the backend reports one
    #[serde(alias = "previousTotalKg")]
    pub previous_total_kg: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesSummary {
    #[serde(alias = "totalSales", alias = "total_reports", deserialize_with = "lenient::count")]
    pub total_sales: u64,

    #[serde(alias = "totalRevenue", alias = "total_amount", deserialize_with = "lenient::number")]
    pub total_revenue: f64,

    #[serde(alias = "totalKgSold", alias = "total_quantity", deserialize_with = "lenient::number")]
    pub total_kg_sold: f64,

    #[serde(alias = "averagePrice", alias = "average_price", deserialize_with = "lenient::number")]
    pub average_price_per_kg: f64,

    #[serde(alias = "previousTotalRevenue")]
    pub previous_total_revenue: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersReport {
    #[serde(alias = "totalFarmers", deserialize_with = "lenient::count")]
    pub total_farmers: u64,

    #[serde(alias = "totalBuyers", deserialize_with = "lenient::count")]
    pub total_buyers: u64,

    #[serde(alias = "totalOfficers", alias = "total_association_officers", deserialize_with = "lenient::count")]
    pub total_officers: u64,

    #[serde(alias = "pendingVerifications", deserialize_with = "lenient::count")]
    pub pending_verifications: u64,

    #[serde(alias = "newUsersThisMonth", alias = "new_users", deserialize_with = "lenient::count")]
    pub new_this_month: u64,

    #[serde(alias = "previousNewUsers")]
    pub previous_new_users: Option<f64>,
}

/// Unwrap `{statistics: {...}}` (or take the body as-is) and decode it
pub fn decode_statistics<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    let stats = match value {
        Value::Object(mut map) if map.contains_key("statistics") => {
            map.remove("statistics").unwrap_or(Value::Null)
        }
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(stats).map_err(|e| ApiError::Decode(e.to_string()))
}

/// One summary card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub label: &'static str,
    pub value: String,
    /// Change against the previous period; absent when there is no real previous value
    pub trend: Option<String>,
}

impl Card {
    fn new(label: &'static str, value: f64) -> Self {
        Self {
            label,
            value: format_number(value),
            trend: None,
        }
    }

    fn with_trend(mut self, current: f64, previous: Option<f64>) -> Self {
        self.trend = previous.map(|p| trend_label(current, p));
        self
    }
}

/// Merged dashboard statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardReport {
    pub production: ProductionReport,
    pub sales: SalesSummary,
    pub users: UsersReport,
    /// Reports that failed to load, with the user-facing message
    pub failures: Vec<(String, String)>,
}

impl DashboardReport {
    /// Merge three report results; failures default their section to zero
    pub fn merge(
        production: Result<ProductionReport, ApiError>,
        sales: Result<SalesSummary, ApiError>,
        users: Result<UsersReport, ApiError>,
    ) -> Self {
        let mut failures = Vec::new();
        let mut take = |name: &str, error: ApiError| {
            warn!(report = name, error = %error, "dashboard report failed");
            failures.push((name.to_string(), error.user_message()));
        };
        let production = production.unwrap_or_else(|e| {
            take("production", e);
            ProductionReport::default()
        });
        let sales = sales.unwrap_or_else(|e| {
            take("sales", e);
            SalesSummary::default()
        });
        let users = users.unwrap_or_else(|e| {
            take("users", e);
            UsersReport::default()
        });
        Self {
            production,
            sales,
            users,
            failures,
        }
    }

    /// Fetch all three reports in parallel and merge them
    pub fn fetch<X: Transport>(client: &ApiClient<X>) -> Self {
        let get = |path: &str| client.get(path, &[]);
        let (production, sales, users) = fetch_parallel(
            || get(PRODUCTION_PATH).and_then(decode_statistics::<ProductionReport>),
            || get(SALES_PATH).and_then(decode_statistics::<SalesSummary>),
            || get(USERS_PATH).and_then(decode_statistics::<UsersReport>),
        );
        Self::merge(production, sales, users)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn cards(&self) -> Vec<Card> {
        let p = &self.production;
        let s = &self.sales;
        let u = &self.users;
        vec![
            Card::new("Harvests", p.total_harvests as f64),
            Card::new("Fiber produced (kg)", p.total_kg).with_trend(p.total_kg, p.previous_total_kg),
            Card::new("Pending harvests", p.pending_harvests as f64),
            Card::new("Sales reports", s.total_sales as f64),
            Card::new("Revenue (PHP)", s.total_revenue)
                .with_trend(s.total_revenue, s.previous_total_revenue),
            Card::new("Fiber sold (kg)", s.total_kg_sold),
            Card::new("Avg price/kg", s.average_price_per_kg),
            Card::new("Farmers", u.total_farmers as f64),
            Card::new("Buyers", u.total_buyers as f64),
            Card::new("Association officers", u.total_officers as f64),
            Card::new("Pending verifications", u.pending_verifications as f64),
            Card::new("New users this month", u.new_this_month as f64)
                .with_trend(u.new_this_month as f64, u.previous_new_users),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_statistics_wrapper_and_bare() {
        let p: ProductionReport = decode_statistics(json!({
            "statistics": {"totalHarvests": "12", "total_kg": 1500.5}
        }))
        .unwrap();
        assert_eq!(p.total_harvests, 12);
        assert_eq!(p.total_kg, 1500.5);

        let u: UsersReport = decode_statistics(json!({"total_farmers": 40})).unwrap();
        assert_eq!(u.total_farmers, 40);
        assert_eq!(u.total_buyers, 0);

        let s: SalesSummary = decode_statistics(Value::Null).unwrap();
        assert_eq!(s, SalesSummary::default());
    }

    #[test]
    fn test_partial_failure_defaults_to_zero() {
        let report = DashboardReport::merge(
            Ok(ProductionReport {
                total_harvests: 3,
                ..Default::default()
            }),
            Err(ApiError::StatusNoBody { status: 502 }),
            Ok(UsersReport::default()),
        );
        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "sales");
        assert_eq!(report.sales, SalesSummary::default());
        assert_eq!(report.production.total_harvests, 3);
    }

    #[test]
    fn test_trend_only_with_real_previous() {
        let mut report = DashboardReport::default();
        report.production.total_kg = 110.0;
        report.sales.total_revenue = 500.0;
        report.sales.previous_total_revenue = Some(0.0);
        report.production.previous_total_kg = Some(100.0);

        let cards = report.cards();
        let kg = cards.iter().find(|c| c.label == "Fiber produced (kg)").unwrap();
        assert_eq!(kg.trend.as_deref(), Some("+10.0%"));
        let revenue = cards.iter().find(|c| c.label == "Revenue (PHP)").unwrap();
        assert_eq!(revenue.trend.as_deref(), Some("+500"));
        let users = cards.iter().find(|c| c.label == "New users this month").unwrap();
        assert!(users.trend.is_none());
    }
}
