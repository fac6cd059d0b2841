//! Sales reports - farmer-to-buyer fiber sales submitted for MAO review

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Record, ReviewStatus};
use crate::core::export::FieldSpec;
use crate::core::fetch::ListSource;
use crate::core::identity::RecordId;
use crate::core::summary::{count_where, sum_by};
use crate::entities::lenient;

pub const ENDPOINT: &str = "sales/reports";

/// A reported sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    #[serde(alias = "report_id", alias = "reportId")]
    pub id: RecordId,

    #[serde(default, alias = "farmerName")]
    pub farmer_name: String,

    #[serde(default, alias = "buyerName")]
    pub buyer_name: String,

    #[serde(default, alias = "fiberGrade", alias = "grade")]
    pub fiber_grade: String,

    #[serde(default, alias = "quantityKg", alias = "quantity", deserialize_with = "lenient::number")]
    pub quantity_kg: f64,

    #[serde(default, alias = "pricePerKg", deserialize_with = "lenient::number")]
    pub price_per_kg: f64,

    /// Amount as reported; zero when the backend leaves it out
    #[serde(default, alias = "totalAmount", deserialize_with = "lenient::number")]
    pub total_amount: f64,

    #[serde(default)]
    pub status: ReviewStatus,

    #[serde(default, alias = "saleDate", deserialize_with = "lenient::timestamp")]
    pub sale_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub remarks: Option<String>,
}

impl SalesReport {
    /// Reported total, or quantity x price when none was reported
    pub fn amount(&self) -> f64 {
        if self.total_amount > 0.0 {
            self.total_amount
        } else {
            self.quantity_kg * self.price_per_kg
        }
    }
}

impl Record for SalesReport {
    const RESOURCE: &'static str = "sales_reports";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.farmer_name.as_str(),
            self.buyer_name.as_str(),
            self.fiber_grade.as_str(),
        ]
    }

    fn category(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.status.to_string()),
            _ => None,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.sale_date
    }
}

pub fn source() -> ListSource {
    ListSource::new(format!("/{}", ENDPOINT), "reports")
}

/// Local status change applied after a successful approve/reject
pub fn set_status(reports: &mut [SalesReport], id: &RecordId, status: ReviewStatus) {
    for report in reports.iter_mut().filter(|r| &r.id == id) {
        report.status = status;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesSummaryCards {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub total_kg: f64,
    pub total_amount: f64,
}

impl SalesSummaryCards {
    pub fn compute<'a>(reports: impl IntoIterator<Item = &'a SalesReport> + Clone) -> Self {
        let status_is = |wanted: ReviewStatus| {
            count_where(reports.clone(), move |r: &SalesReport| r.status == wanted)
        };
        Self {
            total: reports.clone().into_iter().count(),
            pending: status_is(ReviewStatus::Pending),
            approved: status_is(ReviewStatus::Approved),
            rejected: status_is(ReviewStatus::Rejected),
            total_kg: sum_by(reports.clone(), |r: &SalesReport| r.quantity_kg),
            total_amount: sum_by(reports, SalesReport::amount),
        }
    }
}

pub fn export_fields() -> Vec<FieldSpec<SalesReport>> {
    vec![
        FieldSpec::new("ID", |r: &SalesReport| r.id.to_string()),
        FieldSpec::new("Farmer", |r: &SalesReport| r.farmer_name.clone()),
        FieldSpec::new("Buyer", |r: &SalesReport| r.buyer_name.clone()),
        FieldSpec::new("Grade", |r: &SalesReport| r.fiber_grade.clone()),
        FieldSpec::new("Quantity (kg)", |r: &SalesReport| r.quantity_kg.to_string()),
        FieldSpec::new("Price/kg", |r: &SalesReport| r.price_per_kg.to_string()),
        FieldSpec::new("Total", |r: &SalesReport| r.amount().to_string()),
        FieldSpec::new("Status", |r: &SalesReport| r.status.to_string()),
        FieldSpec::new("Sale Date", |r: &SalesReport| {
            r.sale_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reports() -> Vec<SalesReport> {
        serde_json::from_str(
            r#"[
                {"id": 1, "farmer_name": "Ana Reyes", "buyer_name": "Catarman Fiber",
                 "fiber_grade": "S2", "quantity_kg": 100, "price_per_kg": "85.50",
                 "total_amount": "8550", "status": "approved"},
                {"id": 2, "farmerName": "Ben Cruz", "buyerName": "Laoang Hemp",
                 "fiberGrade": "JK", "quantityKg": 40, "pricePerKg": 60},
                {"id": 3, "farmer_name": "Carla Santos", "buyer_name": "Catarman Fiber",
                 "quantity_kg": 10, "price_per_kg": 70, "status": "Rejected"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_amount_falls_back_to_quantity_times_price() {
        let r = reports();
        assert_eq!(r[0].amount(), 8550.0);
        assert_eq!(r[1].amount(), 2400.0);
    }

    #[test]
    fn test_summary() {
        let r = reports();
        let s = SalesSummaryCards::compute(&r);
        assert_eq!(s.total, 3);
        assert_eq!((s.pending, s.approved, s.rejected), (1, 1, 1));
        assert_eq!(s.total_kg, 150.0);
        assert_eq!(s.total_amount, 8550.0 + 2400.0 + 700.0);
    }

    #[test]
    fn test_set_status() {
        let mut r = reports();
        set_status(&mut r, &RecordId::from(2u64), ReviewStatus::Approved);
        assert_eq!(r[1].status, ReviewStatus::Approved);
        assert_eq!(r[2].status, ReviewStatus::Rejected);
    }
}
