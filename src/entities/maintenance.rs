//! Maintenance mode flag

use serde::{Deserialize, Serialize};

pub const STATUS_PATH: &str = "/maintenance/status";
pub const TOGGLE_PATH: &str = "/maintenance/toggle";

/// Whether the public site is in maintenance mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceStatus {
    #[serde(default, alias = "isMaintenanceMode", alias = "maintenance_mode", alias = "enabled")]
    pub is_maintenance_mode: bool,

    #[serde(default)]
    pub message: Option<String>,
}

impl MaintenanceStatus {
    /// Body for a toggle request that flips the current state
    pub fn toggle_body(&self, message: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "enabled": !self.is_maintenance_mode,
            "message": message.or(self.message.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_body_flips() {
        let status: MaintenanceStatus =
            serde_json::from_str(r#"{"isMaintenanceMode": true, "message": "Upgrading"}"#).unwrap();
        let body = status.toggle_body(None);
        assert_eq!(body["enabled"], false);
        assert_eq!(body["message"], "Upgrading");
        assert_eq!(MaintenanceStatus::default().toggle_body(Some("Back soon"))["enabled"], true);
    }
}
