//! Harvest submissions awaiting MAO verification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Record, VerificationStatus};
use crate::core::export::FieldSpec;
use crate::core::fetch::ListSource;
use crate::core::identity::RecordId;
use crate::core::summary::{count_where, distinct_count, sum_by};
use crate::entities::lenient;

pub const ENDPOINT: &str = "harvests/mao/harvests";

/// A farmer's harvest report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harvest {
    #[serde(alias = "harvest_id", alias = "harvestId")]
    pub id: RecordId,

    #[serde(default, alias = "farmerId")]
    pub farmer_id: Option<RecordId>,

    #[serde(default, alias = "farmerName")]
    pub farmer_name: String,

    #[serde(default, alias = "abacaVariety", alias = "variety")]
    pub abaca_variety: String,

    #[serde(default, alias = "farmLocation", alias = "farm_location")]
    pub location: String,

    #[serde(
        default,
        alias = "quantityKg",
        alias = "dry_fiber_output_kg",
        deserialize_with = "lenient::number"
    )]
    pub quantity_kg: f64,

    /// Fiber grade (e.g. S2, JK, Grade A)
    #[serde(default, alias = "fiberGrade", alias = "grade")]
    pub fiber_grade: String,

    #[serde(default)]
    pub status: VerificationStatus,

    #[serde(default, alias = "harvestDate", deserialize_with = "lenient::timestamp")]
    pub harvest_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub remarks: Option<String>,
}

impl Record for Harvest {
    const RESOURCE: &'static str = "harvests";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.farmer_name.as_str(),
            self.abaca_variety.as_str(),
            self.location.as_str(),
        ]
    }

    fn category(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.status.to_string()),
            "grade" => Some(self.fiber_grade.clone()),
            _ => None,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.harvest_date
    }
}

pub fn source() -> ListSource {
    ListSource::new(format!("/{}", ENDPOINT), "harvests")
}

/// Summary cards for the harvest screen
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HarvestSummary {
    pub total: usize,
    pub pending: usize,
    pub verified: usize,
    pub rejected: usize,
    pub total_kg: f64,
    pub verified_kg: f64,
    pub farmers: usize,
}

impl HarvestSummary {
    pub fn compute<'a>(harvests: impl IntoIterator<Item = &'a Harvest> + Clone) -> Self {
        let status_is = |wanted: VerificationStatus| {
            count_where(harvests.clone(), move |h: &Harvest| h.status == wanted)
        };
        Self {
            total: harvests.clone().into_iter().count(),
            pending: status_is(VerificationStatus::Pending),
            verified: status_is(VerificationStatus::Verified),
            rejected: status_is(VerificationStatus::Rejected),
            total_kg: sum_by(harvests.clone(), |h: &Harvest| h.quantity_kg),
            verified_kg: sum_by(
                harvests.clone().into_iter().filter(|h| h.status == VerificationStatus::Verified),
                |h: &Harvest| h.quantity_kg,
            ),
            farmers: distinct_count(harvests, |h: &Harvest| {
                h.farmer_id
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| h.farmer_name.clone())
            }),
        }
    }
}

pub fn export_fields() -> Vec<FieldSpec<Harvest>> {
    vec![
        FieldSpec::new("ID", |h: &Harvest| h.id.to_string()),
        FieldSpec::new("Farmer", |h: &Harvest| h.farmer_name.clone()),
        FieldSpec::new("Variety", |h: &Harvest| h.abaca_variety.clone()),
        FieldSpec::new("Location", |h: &Harvest| h.location.clone()),
        FieldSpec::new("Quantity (kg)", |h: &Harvest| h.quantity_kg.to_string()),
        FieldSpec::new("Grade", |h: &Harvest| h.fiber_grade.clone()),
        FieldSpec::new("Status", |h: &Harvest| h.status.to_string()),
        FieldSpec::new("Harvest Date", |h: &Harvest| {
            h.harvest_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::view::{filter_records, FilterState};

    fn harvests() -> Vec<Harvest> {
        serde_json::from_str(
            r#"[
                {"id": 1, "farmer_id": 10, "farmer_name": "Ana Reyes", "variety": "Tangongon",
                 "quantity_kg": "150", "fiber_grade": "S2", "status": "verified"},
                {"id": 2, "farmer_id": 10, "farmer_name": "Ana Reyes", "variety": "Laylay",
                 "quantity_kg": 60, "fiber_grade": "JK", "status": "pending"},
                {"id": 3, "farmerName": "Ben Cruz", "abacaVariety": "Tangongon",
                 "quantityKg": 90.5, "fiberGrade": "S2", "status": "rejected"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_summary() {
        let h = harvests();
        let s = HarvestSummary::compute(&h);
        assert_eq!(s.total, 3);
        assert_eq!((s.pending, s.verified, s.rejected), (1, 1, 1));
        assert!((s.total_kg - 300.5).abs() < 1e-9);
        assert!((s.verified_kg - 150.0).abs() < 1e-9);
        assert_eq!(s.farmers, 2);
    }

    #[test]
    fn test_grade_and_status_filters() {
        let h = harvests();
        let filter = FilterState::new()
            .with_category("grade", "S2")
            .with_category("status", "rejected");
        let out = filter_records(&h, &filter, Utc::now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].farmer_name, "Ben Cruz");
    }
}
