//! Buyer records - licensed abaca fiber buyers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Record, VerificationStatus};
use crate::core::export::FieldSpec;
use crate::core::fetch::ListSource;
use crate::core::identity::RecordId;
use crate::core::summary::count_where;
use crate::entities::lenient;

pub const ENDPOINT: &str = "mao/buyers";

/// A fiber buyer (trader or processor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buyer {
    #[serde(alias = "buyer_id", alias = "buyerId")]
    pub id: RecordId,

    #[serde(default, alias = "businessName")]
    pub business_name: String,

    #[serde(default, alias = "contactPerson", alias = "full_name", alias = "fullName")]
    pub contact_person: String,

    #[serde(default)]
    pub email: String,

    #[serde(default, alias = "contactNumber")]
    pub contact_number: String,

    #[serde(default, alias = "businessAddress", alias = "address")]
    pub location: String,

    #[serde(default, alias = "licenseNumber")]
    pub license_number: Option<String>,

    #[serde(default, alias = "verificationStatus", alias = "status")]
    pub verification_status: VerificationStatus,

    #[serde(default, alias = "createdAt", deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Buyer {
    const RESOURCE: &'static str = "buyers";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.business_name.as_str(),
            self.contact_person.as_str(),
            self.location.as_str(),
            self.email.as_str(),
        ]
    }

    fn category(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.verification_status.to_string()),
            _ => None,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

pub fn source() -> ListSource {
    ListSource::new(format!("/{}", ENDPOINT), "buyers")
}

/// Summary cards for the buyer screen
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuyerSummary {
    pub total: usize,
    pub verified: usize,
    pub pending: usize,
    pub rejected: usize,
}

impl BuyerSummary {
    pub fn compute<'a>(buyers: impl IntoIterator<Item = &'a Buyer> + Clone) -> Self {
        let status_is = |wanted: VerificationStatus| {
            count_where(buyers.clone(), move |b: &Buyer| b.verification_status == wanted)
        };
        Self {
            total: buyers.clone().into_iter().count(),
            verified: status_is(VerificationStatus::Verified),
            pending: status_is(VerificationStatus::Pending),
            rejected: status_is(VerificationStatus::Rejected),
        }
    }
}

pub fn export_fields() -> Vec<FieldSpec<Buyer>> {
    vec![
        FieldSpec::new("ID", |b: &Buyer| b.id.to_string()),
        FieldSpec::new("Business", |b: &Buyer| b.business_name.clone()),
        FieldSpec::new("Contact Person", |b: &Buyer| b.contact_person.clone()),
        FieldSpec::new("Email", |b: &Buyer| b.email.clone()),
        FieldSpec::new("Contact", |b: &Buyer| b.contact_number.clone()),
        FieldSpec::new("Location", |b: &Buyer| b.location.clone()),
        FieldSpec::new("Status", |b: &Buyer| b.verification_status.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_by_status() {
        let buyers: Vec<Buyer> = serde_json::from_str(
            r#"[
                {"id": 1, "businessName": "Catarman Fiber Trading", "status": "verified"},
                {"id": 2, "business_name": "Northern Samar Abaca Co", "status": "rejected"},
                {"id": 3, "business_name": "Laoang Hemp"}
            ]"#,
        )
        .unwrap();

        let summary = BuyerSummary::compute(&buyers);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.verified, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(buyers[0].category("status").as_deref(), Some("verified"));
    }
}
