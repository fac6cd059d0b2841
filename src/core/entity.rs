//! Record trait - common interface for all backend collections

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::RecordId;

/// Common trait for every record type a screen lists
///
/// The collection view only ever sees records through this trait: the free
/// text search runs over `search_fields`, categorical filters look values up
/// through `category`, and the date bucket filter reads `timestamp`.
pub trait Record: Serialize + DeserializeOwned {
    /// Resource name used for export filenames (e.g. "farmers")
    const RESOURCE: &'static str;

    /// Get the record's backend identifier
    fn id(&self) -> &RecordId;

    /// String fields searched by the case-insensitive substring filter
    fn search_fields(&self) -> Vec<&str>;

    /// Value of a named categorical field, compared by exact string equality
    fn category(&self, _name: &str) -> Option<String> {
        None
    }

    /// Timestamp used for date bucket filtering
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Onboarding/verification state of farmers, buyers, officers and harvests
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Verified", alias = "approved")]
    Verified,
    #[serde(alias = "Rejected")]
    Rejected,
    /// Any status this client does not know about
    #[serde(other)]
    #[value(skip)]
    Unknown,
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationStatus::Pending => write!(f, "pending"),
            VerificationStatus::Verified => write!(f, "verified"),
            VerificationStatus::Rejected => write!(f, "rejected"),
            VerificationStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(VerificationStatus::Pending),
            "verified" => Ok(VerificationStatus::Verified),
            "rejected" => Ok(VerificationStatus::Rejected),
            _ => Err(format!("Unknown verification status: {}", s)),
        }
    }
}

/// Review state of submitted sales reports
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Approved")]
    Approved,
    #[serde(alias = "Rejected")]
    Rejected,
    /// Any status this client does not know about
    #[serde(other)]
    #[value(skip)]
    Unknown,
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewStatus::Pending => write!(f, "pending"),
            ReviewStatus::Approved => write!(f, "approved"),
            ReviewStatus::Rejected => write!(f, "rejected"),
            ReviewStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReviewStatus::Pending),
            "approved" => Ok(ReviewStatus::Approved),
            "rejected" => Ok(ReviewStatus::Rejected),
            _ => Err(format!("Unknown review status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_status_accepts_capitalized() {
        let s: VerificationStatus = serde_json::from_str("\"Verified\"").unwrap();
        assert_eq!(s, VerificationStatus::Verified);
        assert_eq!(s.to_string(), "verified");
    }

    #[test]
    fn test_review_status_round_trips_through_display() {
        for status in [ReviewStatus::Pending, ReviewStatus::Approved, ReviewStatus::Rejected] {
            let parsed: ReviewStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("maybe".parse::<ReviewStatus>().is_err());
    }

    #[test]
    fn test_unrecognized_status_decodes_as_unknown() {
        let s: VerificationStatus = serde_json::from_str("\"suspended\"").unwrap();
        assert_eq!(s, VerificationStatus::Unknown);
        assert_eq!(s.to_string(), "unknown");

        let r: ReviewStatus = serde_json::from_str("\"on_hold\"").unwrap();
        assert_eq!(r, ReviewStatus::Unknown);
        assert!("unknown".parse::<ReviewStatus>().is_err());
    }
}
