//! Fiber deliveries from farmers to buyers (read-only)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Record;
use crate::core::export::FieldSpec;
use crate::core::fetch::ListSource;
use crate::core::identity::RecordId;
use crate::core::summary::{count_where, sum_by};
use crate::entities::lenient;

pub const ENDPOINT: &str = "fiber-deliveries/all";

/// Delivery progress
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "in-transit", alias = "In Transit", alias = "in transit")]
    InTransit,
    #[serde(alias = "Delivered", alias = "completed")]
    Delivered,
    #[serde(alias = "Cancelled", alias = "canceled")]
    Cancelled,
    #[serde(other)]
    #[value(skip)]
    Unknown,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Pending => write!(f, "pending"),
            DeliveryStatus::InTransit => write!(f, "in_transit"),
            DeliveryStatus::Delivered => write!(f, "delivered"),
            DeliveryStatus::Cancelled => write!(f, "cancelled"),
            DeliveryStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiberDelivery {
    #[serde(alias = "delivery_id", alias = "deliveryId")]
    pub id: RecordId,

    #[serde(default, alias = "buyerName")]
    pub buyer_name: String,

    #[serde(default, alias = "farmerName")]
    pub farmer_name: String,

    #[serde(default, alias = "fiberGrade", alias = "grade")]
    pub fiber_grade: String,

    #[serde(default, alias = "quantityKg", alias = "quantity", deserialize_with = "lenient::number")]
    pub quantity_kg: f64,

    #[serde(default, alias = "deliveryLocation", alias = "location")]
    pub delivery_location: String,

    #[serde(default)]
    pub status: DeliveryStatus,

    #[serde(default, alias = "deliveryDate", deserialize_with = "lenient::timestamp")]
    pub delivery_date: Option<DateTime<Utc>>,
}

impl Record for FiberDelivery {
    const RESOURCE: &'static str = "fiber_deliveries";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.buyer_name.as_str(),
            self.farmer_name.as_str(),
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
        self.delivery_date
    }
}

pub fn source() -> ListSource {
    ListSource::new(format!("/{}", ENDPOINT), "deliveries")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeliverySummary {
    pub total: usize,
    pub delivered: usize,
    pub pending: usize,
    pub in_transit: usize,
    pub total_kg: f64,
}

impl DeliverySummary {
    pub fn compute<'a>(deliveries: impl IntoIterator<Item = &'a FiberDelivery> + Clone) -> Self {
        let status_is = |wanted: DeliveryStatus| {
            count_where(deliveries.clone(), move |d: &FiberDelivery| d.status == wanted)
        };
        Self {
            total: deliveries.clone().into_iter().count(),
            delivered: status_is(DeliveryStatus::Delivered),
            pending: status_is(DeliveryStatus::Pending),
            in_transit: status_is(DeliveryStatus::InTransit),
            total_kg: sum_by(deliveries, |d: &FiberDelivery| d.quantity_kg),
        }
    }
}

pub fn export_fields() -> Vec<FieldSpec<FiberDelivery>> {
    vec![
        FieldSpec::new("ID", |d: &FiberDelivery| d.id.to_string()),
        FieldSpec::new("Buyer", |d: &FiberDelivery| d.buyer_name.clone()),
        FieldSpec::new("Farmer", |d: &FiberDelivery| d.farmer_name.clone()),
        FieldSpec::new("Grade", |d: &FiberDelivery| d.fiber_grade.clone()),
        FieldSpec::new("Quantity (kg)", |d: &FiberDelivery| d.quantity_kg.to_string()),
        FieldSpec::new("Location", |d: &FiberDelivery| d.delivery_location.clone()),
        FieldSpec::new("Status", |d: &FiberDelivery| d.status.to_string()),
        FieldSpec::new("Delivery Date", |d: &FiberDelivery| {
            d.delivery_date
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::view::{filter_records, DateBucket, FilterState};
    use chrono::TimeZone;

    #[test]
    fn test_status_aliases_and_date_bucket() {
        let deliveries: Vec<FiberDelivery> = serde_json::from_str(
            r#"[
                {"id": 1, "buyer_name": "Catarman Fiber", "status": "in-transit",
                 "quantity_kg": 200, "delivery_date": "2024-06-10"},
                {"id": 2, "buyerName": "Laoang Hemp", "status": "Delivered",
                 "quantityKg": "50.5", "deliveryDate": "2024-04-01T09:00:00Z"}
            ]"#,
        )
        .unwrap();
        assert_eq!(deliveries[0].status, DeliveryStatus::InTransit);
        assert_eq!(deliveries[1].status, DeliveryStatus::Delivered);

        let now = Utc.with_ymd_and_hms(2024, 6, 12, 12, 0, 0).unwrap();
        let week = filter_records(&deliveries, &FilterState::new().with_date(DateBucket::Week), now);
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].buyer_name, "Catarman Fiber");

        let s = DeliverySummary::compute(&deliveries);
        assert_eq!((s.total, s.delivered, s.in_transit, s.pending), (2, 1, 1, 0));
        assert_eq!(s.total_kg, 250.5);
    }
}
