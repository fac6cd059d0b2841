//! Activity logs and the IP/MAC blocklist
//!
//! Unlike the other screens, activity logs are paged and searched on the
//! server: the query parameters travel with the request and the backend
//! returns one page plus its pagination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::api::ApiError;
use crate::core::entity::Record;
use crate::core::export::FieldSpec;
use crate::core::fetch::ListSource;
use crate::core::identity::RecordId;
use crate::entities::lenient;

pub const ENDPOINT: &str = "activity-logs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    #[serde(alias = "log_id", alias = "logId")]
    pub id: RecordId,

    #[serde(default, alias = "userName", alias = "user")]
    pub user_name: String,

    #[serde(default, alias = "userType")]
    pub user_type: String,

    #[serde(default, alias = "actionType")]
    pub action_type: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, alias = "ipAddress")]
    pub ip_address: Option<String>,

    #[serde(default, alias = "macAddress")]
    pub mac_address: Option<String>,

    #[serde(default, alias = "createdAt", alias = "timestamp", deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for ActivityLog {
    const RESOURCE: &'static str = "activity_logs";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.user_name.as_str(),
            self.action_type.as_str(),
            self.description.as_str(),
        ]
    }

    fn category(&self, name: &str) -> Option<String> {
        match name {
            "user_type" => Some(self.user_type.clone()),
            "action_type" => Some(self.action_type.clone()),
            _ => None,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// Server-side query for one page of logs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogQuery {
    pub page: usize,
    pub limit: usize,
    pub search: Option<String>,
    pub user_type: Option<String>,
    pub action_type: Option<String>,
}

impl LogQuery {
    pub fn source(&self) -> ListSource {
        ListSource::new(format!("/{}", ENDPOINT), "logs")
            .param("page", self.page.max(1))
            .param("limit", self.limit.max(1))
            .param("search", self.search.as_deref().unwrap_or_default())
            .param("userType", self.user_type.as_deref().unwrap_or_default())
            .param("actionType", self.action_type.as_deref().unwrap_or_default())
    }
}

/// Kind of blocked address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum BlockKind {
    Ip,
    Mac,
}

impl BlockKind {
    /// Path listing blocked addresses of this kind
    pub fn list_path(&self) -> String {
        format!("/{}/blocked/{}", ENDPOINT, self.plural())
    }

    /// Response field holding the blocked addresses
    pub fn field(&self) -> &'static str {
        match self {
            BlockKind::Ip => "blockedIPs",
            BlockKind::Mac => "blockedMACs",
        }
    }

    /// Path for adding a block
    pub fn block_path(&self) -> String {
        match self {
            BlockKind::Ip => format!("/{}/block-ip", ENDPOINT),
            BlockKind::Mac => format!("/{}/block-mac", ENDPOINT),
        }
    }

    /// Resource under which individual blocks are deleted
    pub fn unblock_resource(&self) -> String {
        format!("{}/blocked/{}", ENDPOINT, self.plural())
    }

    pub fn source(&self) -> ListSource {
        ListSource::new(self.list_path(), self.field())
    }

    fn plural(&self) -> &'static str {
        match self {
            BlockKind::Ip => "ips",
            BlockKind::Mac => "macs",
        }
    }

    /// Body for a new block
    pub fn block_body(&self, address: &str, reason: Option<&str>) -> Result<Value, ApiError> {
        let key = match self {
            BlockKind::Ip => "ip_address",
            BlockKind::Mac => "mac_address",
        };
        let body = json!({ key: address.trim(), "reason": reason });
        crate::core::mutation::require_fields(&body, &[key])?;
        Ok(body)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockKind::Ip => write!(f, "IP"),
            BlockKind::Mac => write!(f, "MAC"),
        }
    }
}

/// A blocked IP or MAC address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedAddress {
    pub id: RecordId,

    #[serde(alias = "ip_address", alias = "ipAddress", alias = "mac_address", alias = "macAddress")]
    pub address: String,

    #[serde(default)]
    pub reason: Option<String>,

    #[serde(default, alias = "blockedBy")]
    pub blocked_by: Option<String>,

    #[serde(default, alias = "createdAt", alias = "blocked_at", deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for BlockedAddress {
    const RESOURCE: &'static str = "blocked_addresses";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.address.as_str()];
        fields.extend(self.reason.as_deref());
        fields
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

pub fn export_fields() -> Vec<FieldSpec<ActivityLog>> {
    vec![
        FieldSpec::new("ID", |l: &ActivityLog| l.id.to_string()),
        FieldSpec::new("User", |l: &ActivityLog| l.user_name.clone()),
        FieldSpec::new("User Type", |l: &ActivityLog| l.user_type.clone()),
        FieldSpec::new("Action", |l: &ActivityLog| l.action_type.clone()),
        FieldSpec::new("Description", |l: &ActivityLog| l.description.clone()),
        FieldSpec::new("IP", |l: &ActivityLog| l.ip_address.clone().unwrap_or_default()),
        FieldSpec::new("Time", |l: &ActivityLog| {
            l.created_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default()
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_query_params() {
        let q = LogQuery {
            page: 0,
            limit: 20,
            search: Some("login".into()),
            user_type: None,
            action_type: Some("LOGIN".into()),
        };
        let source = q.source();
        assert_eq!(source.path, "/activity-logs");
        assert_eq!(source.field, "logs");
        assert_eq!(
            source.query,
            vec![
                ("page".to_string(), "1".to_string()),
                ("limit".to_string(), "20".to_string()),
                ("search".to_string(), "login".to_string()),
                ("actionType".to_string(), "LOGIN".to_string()),
            ]
        );
    }

    #[test]
    fn test_block_paths() {
        assert_eq!(BlockKind::Ip.list_path(), "/activity-logs/blocked/ips");
        assert_eq!(BlockKind::Mac.block_path(), "/activity-logs/block-mac");
        assert_eq!(BlockKind::Mac.field(), "blockedMACs");
        assert_eq!(BlockKind::Ip.unblock_resource(), "activity-logs/blocked/ips");
    }

    #[test]
    fn test_block_body() {
        let body = BlockKind::Ip.block_body(" 10.0.0.5 ", Some("brute force")).unwrap();
        assert_eq!(body["ip_address"], "10.0.0.5");
        assert_eq!(body["reason"], "brute force");
        assert!(BlockKind::Mac.block_body("  ", None).is_err());
    }

    #[test]
    fn test_blocked_address_aliases() {
        let blocked: Vec<BlockedAddress> = serde_json::from_str(
            r#"[{"id": 1, "ip_address": "10.0.0.5"}, {"id": 2, "macAddress": "AA:BB:CC:DD:EE:FF"}]"#,
        )
        .unwrap();
        assert_eq!(blocked[0].address, "10.0.0.5");
        assert_eq!(blocked[1].address, "AA:BB:CC:DD:EE:FF");
    }
}
