//! Seedling distributions to associations and individual farmers

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::api::ApiError;
use crate::core::entity::Record;
use crate::core::export::FieldSpec;
use crate::core::fetch::ListSource;
use crate::core::identity::RecordId;
use crate::core::mutation::require_fields;
use crate::core::summary::distinct_count;
use crate::entities::lenient;

pub const ENDPOINT: &str = "association-seedlings/distributions";

/// Path for recording a new distribution
pub const CREATE_ENDPOINT: &str = "association-seedlings/distribute";

/// Who received the seedlings
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
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    #[default]
    #[serde(alias = "Association")]
    Association,
    #[serde(alias = "Farmer")]
    Farmer,
}

impl std::fmt::Display for RecipientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipientType::Association => write!(f, "association"),
            RecipientType::Farmer => write!(f, "farmer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    #[serde(alias = "distribution_id", alias = "distributionId")]
    pub id: RecordId,

    #[serde(default, alias = "recipientType")]
    pub recipient_type: RecipientType,

    #[serde(default, alias = "recipientName", alias = "association_name", alias = "associationName")]
    pub recipient_name: String,

    #[serde(default, alias = "seedlingVariety", alias = "variety")]
    pub seedling_variety: String,

    #[serde(default, alias = "quantityDistributed", alias = "quantity", deserialize_with = "lenient::count")]
    pub quantity_distributed: u64,

    #[serde(default, alias = "dateDistributed", alias = "distribution_date", deserialize_with = "lenient::timestamp")]
    pub date_distributed: Option<DateTime<Utc>>,

    #[serde(default)]
    pub remarks: Option<String>,
}

impl Record for Distribution {
    const RESOURCE: &'static str = "seedling_distributions";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.recipient_name.as_str(), self.seedling_variety.as_str()]
    }

    fn category(&self, name: &str) -> Option<String> {
        match name {
            "recipient" => Some(self.recipient_type.to_string()),
            _ => None,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date_distributed
    }
}

pub fn source() -> ListSource {
    ListSource::new(format!("/{}", ENDPOINT), "distributions")
}

/// Input for `POST /association-seedlings/distribute`
#[derive(Debug, Clone, PartialEq)]
pub struct NewDistribution {
    pub recipient_type: RecipientType,
    pub recipient_id: String,
    pub seedling_variety: String,
    pub quantity: u64,
    pub date: NaiveDate,
    pub remarks: Option<String>,
}

impl NewDistribution {
    /// JSON body, validated before it leaves the process
    pub fn to_body(&self) -> Result<Value, ApiError> {
        if self.quantity == 0 {
            return Err(ApiError::Validation(
                "Quantity must be greater than zero".to_string(),
            ));
        }
        let recipient_key = match self.recipient_type {
            RecipientType::Association => "association_id",
            RecipientType::Farmer => "farmer_id",
        };
        let body = json!({
            "recipient_type": self.recipient_type,
            recipient_key: self.recipient_id,
            "seedling_variety": self.seedling_variety,
            "quantity_distributed": self.quantity,
            "date_distributed": self.date.format("%Y-%m-%d").to_string(),
            "remarks": self.remarks,
        });
        require_fields(&body, &[recipient_key, "seedling_variety", "date_distributed"])?;
        Ok(body)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub total: usize,
    pub seedlings: u64,
    pub recipients: usize,
}

impl DistributionSummary {
    pub fn compute<'a>(items: impl IntoIterator<Item = &'a Distribution> + Clone) -> Self {
        Self {
            total: items.clone().into_iter().count(),
            seedlings: items.clone().into_iter().map(|d| d.quantity_distributed).sum(),
            recipients: distinct_count(items, |d: &Distribution| {
                (d.recipient_type, d.recipient_name.to_lowercase())
            }),
        }
    }
}

pub fn export_fields() -> Vec<FieldSpec<Distribution>> {
    vec![
        FieldSpec::new("ID", |d: &Distribution| d.id.to_string()),
        FieldSpec::new("Recipient Type", |d: &Distribution| d.recipient_type.to_string()),
        FieldSpec::new("Recipient", |d: &Distribution| d.recipient_name.clone()),
        FieldSpec::new("Variety", |d: &Distribution| d.seedling_variety.clone()),
        FieldSpec::new("Quantity", |d: &Distribution| d.quantity_distributed.to_string()),
        FieldSpec::new("Date", |d: &Distribution| {
            d.date_distributed
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        }),
    ]
}
