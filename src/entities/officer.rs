//! Association officer records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Record, VerificationStatus};
use crate::core::export::FieldSpec;
use crate::core::fetch::ListSource;
use crate::core::identity::RecordId;
use crate::entities::lenient;

pub const ENDPOINT: &str = "mao/association-officers";

/// An officer representing a farmer association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationOfficer {
    #[serde(alias = "officer_id", alias = "officerId")]
    pub id: RecordId,

    #[serde(default, alias = "fullName", alias = "name")]
    pub full_name: String,

    #[serde(default, alias = "associationName")]
    pub association_name: String,

    #[serde(default)]
    pub position: String,

    #[serde(default)]
    pub email: String,

    #[serde(default, alias = "contactNumber")]
    pub contact_number: String,

    #[serde(default, alias = "verificationStatus", alias = "status")]
    pub verification_status: VerificationStatus,

    #[serde(default, alias = "createdAt", deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for AssociationOfficer {
    const RESOURCE: &'static str = "association_officers";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.full_name.as_str(),
            self.association_name.as_str(),
            self.position.as_str(),
        ]
    }

    fn category(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.verification_status.to_string()),
            "association" => Some(self.association_name.clone()),
            _ => None,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

pub fn source() -> ListSource {
    ListSource::new(format!("/{}", ENDPOINT), "officers")
}

pub fn export_fields() -> Vec<FieldSpec<AssociationOfficer>> {
    vec![
        FieldSpec::new("ID", |o: &AssociationOfficer| o.id.to_string()),
        FieldSpec::new("Name", |o: &AssociationOfficer| o.full_name.clone()),
        FieldSpec::new("Association", |o: &AssociationOfficer| o.association_name.clone()),
        FieldSpec::new("Position", |o: &AssociationOfficer| o.position.clone()),
        FieldSpec::new("Email", |o: &AssociationOfficer| o.email.clone()),
        FieldSpec::new("Status", |o: &AssociationOfficer| o.verification_status.to_string()),
    ]
}
