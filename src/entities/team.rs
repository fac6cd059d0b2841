//! Office team members shown on the public site

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::core::api::ApiError;
use crate::core::entity::Record;
use crate::core::fetch::ListSource;
use crate::core::identity::RecordId;
use crate::core::mutation::require_fields;
use crate::core::summary::count_where;

pub const ENDPOINT: &str = "team";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(alias = "member_id", alias = "memberId")]
    pub id: RecordId,

    #[serde(default, alias = "fullName", alias = "full_name")]
    pub name: String,

    #[serde(default)]
    pub position: String,

    #[serde(default)]
    pub bio: String,

    /// Photo URL or data URL
    #[serde(default, alias = "photo_url", alias = "photoUrl", alias = "image")]
    pub photo: Option<String>,

    #[serde(default = "default_active", alias = "isActive")]
    pub is_active: bool,

    #[serde(default, alias = "displayOrder")]
    pub display_order: i64,
}

fn default_active() -> bool {
    true
}

impl Record for TeamMember {
    const RESOURCE: &'static str = "team";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.position.as_str()]
    }

    fn category(&self, name: &str) -> Option<String> {
        match name {
            "active" => Some(self.is_active.to_string()),
            _ => None,
        }
    }
}

pub fn source() -> ListSource {
    ListSource::new(format!("/{}", ENDPOINT), "team")
}

/// Fields for adding or editing a member
///
/// On update only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamMemberInput {
    pub name: Option<String>,
    pub position: Option<String>,
    pub bio: Option<String>,
    /// Already-encoded data URL
    pub photo: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i64>,
}

impl TeamMemberInput {
    fn to_map(&self) -> Map<String, Value> {
        let mut body = Map::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(v) = value {
                body.insert(key.to_string(), v);
            }
        };
        put("name", self.name.as_ref().map(|v| json!(v)));
        put("position", self.position.as_ref().map(|v| json!(v)));
        put("bio", self.bio.as_ref().map(|v| json!(v)));
        put("photo", self.photo.as_ref().map(|v| json!(v)));
        put("is_active", self.is_active.map(|v| json!(v)));
        put("display_order", self.display_order.map(|v| json!(v)));
        body
    }

    /// Body for a new member; name, position and photo are required
    pub fn create_body(&self) -> Result<Value, ApiError> {
        let body = Value::Object(self.to_map());
        require_fields(&body, &["name", "position", "photo"])?;
        Ok(body)
    }

    /// Body for an update; at least one field must be set
    pub fn update_body(&self) -> Result<Value, ApiError> {
        let map = self.to_map();
        if map.is_empty() {
            return Err(ApiError::Validation("Nothing to update".to_string()));
        }
        Ok(Value::Object(map))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamSummary {
    pub total: usize,
    pub active: usize,
}

impl TeamSummary {
    pub fn compute<'a>(members: impl IntoIterator<Item = &'a TeamMember> + Clone) -> Self {
        Self {
            total: members.clone().into_iter().count(),
            active: count_where(members, |m: &TeamMember| m.is_active),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_defaults_active() {
        let m: TeamMember =
            serde_json::from_str(r#"{"id": 4, "name": "Lito Dela Cruz", "position": "MAO"}"#).unwrap();
        assert!(m.is_active);
        assert!(m.photo.is_none());
        assert_eq!(m.category("active").as_deref(), Some("true"));
    }

    #[test]
    fn test_create_requires_photo() {
        let input = TeamMemberInput {
            name: Some("Lito".into()),
            position: Some("Agricultural Technician".into()),
            ..Default::default()
        };
        let err = input.create_body().unwrap_err();
        assert!(err.user_message().ends_with("photo"));
    }

    #[test]
    fn test_update_sends_only_set_fields() {
        let input = TeamMemberInput {
            bio: Some("Extension worker".into()),
            is_active: Some(false),
            ..Default::default()
        };
        let body = input.update_body().unwrap();
        assert_eq!(body, json!({"bio": "Extension worker", "is_active": false}));
        assert!(TeamMemberInput::default().update_body().is_err());
    }
}
