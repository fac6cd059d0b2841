//! Farmer records - registered abaca farmers awaiting or holding verification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Record, VerificationStatus};
use crate::core::export::FieldSpec;
use crate::core::fetch::ListSource;
use crate::core::identity::RecordId;
use crate::core::summary::{count_where, distinct_count, sum_by};
use crate::entities::lenient;

/// Collection endpoint
pub const ENDPOINT: &str = "mao/farmers";

/// A registered farmer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farmer {
    #[serde(alias = "farmer_id", alias = "farmerId")]
    pub id: RecordId,

    #[serde(default, alias = "fullName", alias = "name")]
    pub full_name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default, alias = "contactNumber")]
    pub contact_number: String,

    /// Association the farmer belongs to, if any
    #[serde(default, alias = "associationName")]
    pub association_name: Option<String>,

    #[serde(default)]
    pub barangay: String,

    #[serde(default)]
    pub municipality: String,

    #[serde(default, alias = "farmArea", alias = "farm_area", deserialize_with = "lenient::number")]
    pub farm_area_hectares: f64,

    #[serde(default, alias = "abacaVariety", alias = "variety")]
    pub abaca_variety: Option<String>,

    #[serde(default, alias = "verificationStatus", alias = "status")]
    pub verification_status: VerificationStatus,

    #[serde(default, alias = "createdAt", deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Farmer {
    /// "barangay, municipality" with empty parts left out
    pub fn location(&self) -> String {
        [self.barangay.as_str(), self.municipality.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Record for Farmer {
    const RESOURCE: &'static str = "farmers";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.full_name.as_str(),
            self.barangay.as_str(),
            self.municipality.as_str(),
        ];
        fields.extend(self.association_name.as_deref());
        fields.extend(self.abaca_variety.as_deref());
        fields
    }

    fn category(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.verification_status.to_string()),
            "association" => self.association_name.clone(),
            _ => None,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// Default collection source
pub fn source() -> ListSource {
    ListSource::new(format!("/{}", ENDPOINT), "farmers")
}

/// Summary cards for the farmer screen
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FarmerSummary {
    pub total: usize,
    pub verified: usize,
    pub pending: usize,
    pub rejected: usize,
    pub total_hectares: f64,
    pub associations: usize,
}

impl FarmerSummary {
    pub fn compute<'a>(farmers: impl IntoIterator<Item = &'a Farmer> + Clone) -> Self {
        let status_is = |wanted: VerificationStatus| {
            count_where(farmers.clone(), move |f: &Farmer| f.verification_status == wanted)
        };
        Self {
            total: farmers.clone().into_iter().count(),
            verified: status_is(VerificationStatus::Verified),
            pending: status_is(VerificationStatus::Pending),
            rejected: status_is(VerificationStatus::Rejected),
            total_hectares: sum_by(farmers.clone(), |f: &Farmer| f.farm_area_hectares),
            associations: distinct_count(
                farmers.into_iter().filter(|f| f.association_name.is_some()),
                |f: &Farmer| f.association_name.clone(),
            ),
        }
    }
}

/// Columns written by `mao farmer list --export`
pub fn export_fields() -> Vec<FieldSpec<Farmer>> {
    vec![
        FieldSpec::new("ID", |f: &Farmer| f.id.to_string()),
        FieldSpec::new("Name", |f: &Farmer| f.full_name.clone()),
        FieldSpec::new("Email", |f: &Farmer| f.email.clone()),
        FieldSpec::new("Contact", |f: &Farmer| f.contact_number.clone()),
        FieldSpec::new("Association", |f: &Farmer| {
            f.association_name.clone().unwrap_or_default()
        }),
        FieldSpec::new("Barangay", |f: &Farmer| f.barangay.clone()),
        FieldSpec::new("Municipality", |f: &Farmer| f.municipality.clone()),
        FieldSpec::new("Farm Area (ha)", |f: &Farmer| f.farm_area_hectares.to_string()),
        FieldSpec::new("Status", |f: &Farmer| f.verification_status.to_string()),
        FieldSpec::new("Registered", |f: &Farmer| {
            f.created_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::view::{filter_records, FilterState};

    fn farmers() -> Vec<Farmer> {
        serde_json::from_str(
            r#"[
                {"id": 1, "full_name": "Ana Reyes", "association_name": "CUSAFA",
                 "barangay": "San Isidro", "municipality": "Catarman",
                 "farm_area_hectares": "2.5", "verification_status": "verified"},
                {"farmerId": "2", "fullName": "Ben Cruz", "barangay": "Poblacion",
                 "municipality": "Catarman", "farmArea": 1.0, "status": "pending",
                 "createdAt": "2024-05-01"},
                {"id": 3, "full_name": "Carla Santos", "association_name": "CUSAFA",
                 "farm_area_hectares": 0.75}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_deserialize_both_casings() {
        let farmers = farmers();
        assert_eq!(farmers[0].farm_area_hectares, 2.5);
        assert_eq!(farmers[1].id.as_str(), "2");
        assert_eq!(farmers[1].full_name, "Ben Cruz");
        assert_eq!(farmers[1].verification_status, VerificationStatus::Pending);
        assert!(farmers[1].created_at.is_some());
        assert_eq!(farmers[2].verification_status, VerificationStatus::Pending);
    }

    #[test]
    fn test_search_association_and_location() {
        let farmers = farmers();
        let now = Utc::now();
        let by_assoc = filter_records(&farmers, &FilterState::new().with_search("cusafa"), now);
        assert_eq!(by_assoc.len(), 2);
        let by_place = filter_records(&farmers, &FilterState::new().with_search("poblacion"), now);
        assert_eq!(by_place[0].full_name, "Ben Cruz");
    }

    #[test]
    fn test_summary() {
        let farmers = farmers();
        let summary = FarmerSummary::compute(&farmers);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.verified, 1);
        assert_eq!(summary.pending, 2);
        assert!((summary.total_hectares - 4.25).abs() < 1e-9);
        assert_eq!(summary.associations, 1);
    }

    #[test]
    fn test_summary_empty() {
        let summary = FarmerSummary::compute(&Vec::<Farmer>::new());
        assert_eq!(summary, FarmerSummary::default());
    }

    #[test]
    fn test_unrecognized_status_keeps_the_collection() {
        let body = serde_json::json!({
            "farmers": [
                {"id": 1, "full_name": "Ana Reyes", "status": "verified"},
                {"id": 2, "full_name": "Ben Cruz", "status": "suspended"},
                {"id": 3, "full_name": "Carla Santos", "status": "pending"}
            ]
        });
        let farmers = crate::core::api::decode_listing::<Farmer>(body, "farmers")
            .unwrap()
            .items;
        assert_eq!(farmers.len(), 3);
        assert_eq!(farmers[1].verification_status, VerificationStatus::Unknown);

        let verified = filter_records(
            &farmers,
            &FilterState::new().with_category("status", "verified"),
            Utc::now(),
        );
        assert_eq!(verified.len(), 1);

        let summary = FarmerSummary::compute(&farmers);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.verified + summary.pending + summary.rejected, 2);
    }

    #[test]
    fn test_location() {
        let farmers = farmers();
        assert_eq!(farmers[0].location(), "San Isidro, Catarman");
        assert_eq!(farmers[2].location(), "");
    }
}
