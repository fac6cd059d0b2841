//! Mutations against the backend
//!
//! Every write goes to the backend first. On success the screen either
//! refetches its whole collection or, for the few actions that opt in,
//! applies the same change to its local copy. On failure local state is left
//! exactly as it was.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::core::api::{resource_path, ApiClient, ApiError, Method, ApiRequest, Transport};
use crate::core::entity::Record;
use crate::core::fetch::Screen;

/// A user action on a record (or on the collection, for `Create`)
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Verify,
    Reject { reason: Option<String> },
    Approve,
    Delete,
    Create(Value),
    Update(Value),
    ToggleStatus,
}

impl Action {
    pub fn method(&self) -> Method {
        match self {
            Action::Create(_) => Method::Post,
            Action::Delete => Method::Delete,
            Action::Verify
            | Action::Reject { .. }
            | Action::Approve
            | Action::Update(_)
            | Action::ToggleStatus => Method::Put,
        }
    }

    /// Trailing path segment, if the action has one
    pub fn segment(&self) -> Option<&'static str> {
        match self {
            Action::Verify => Some("verify"),
            Action::Reject { .. } => Some("reject"),
            Action::Approve => Some("approve"),
            Action::ToggleStatus => Some("toggle-status"),
            Action::Delete | Action::Create(_) | Action::Update(_) => None,
        }
    }

    pub fn body(&self) -> Option<Value> {
        match self {
            Action::Create(body) | Action::Update(body) => Some(body.clone()),
            Action::Reject { reason: Some(reason) } => Some(json!({ "reason": reason })),
            _ => None,
        }
    }

    /// Irreversible actions need explicit confirmation
    pub fn is_destructive(&self) -> bool {
        matches!(self, Action::Delete)
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Action::Verify => "verify",
            Action::Reject { .. } => "reject",
            Action::Approve => "approve",
            Action::Delete => "delete",
            Action::Create(_) => "create",
            Action::Update(_) => "update",
            Action::ToggleStatus => "toggle",
        }
    }

    /// Build the request for a record under `resource`
    pub fn request(&self, resource: &str, id: Option<&str>) -> ApiRequest {
        let path = resource_path(resource, id, self.segment());
        let mut request = ApiRequest::new(self.method(), path);
        request.body = self.body();
        request
    }
}

/// Asks the user before an irreversible action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirmation already given (e.g. `--yes`)
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// What to do to local state after a successful mutation
pub enum RefreshPolicy<T> {
    /// Refetch the whole collection from the backend
    Refetch,
    /// Apply the same change locally without a round trip
    Optimistic(Box<dyn FnOnce(&mut Vec<T>)>),
}

impl<T> RefreshPolicy<T> {
    pub fn optimistic(change: impl FnOnce(&mut Vec<T>) + 'static) -> Self {
        RefreshPolicy::Optimistic(Box::new(change))
    }
}

/// Fail before any network call when a required JSON field is missing or blank
pub fn require_fields(body: &Value, fields: &[&str]) -> Result<(), ApiError> {
    let missing: Vec<&str> = fields
        .iter()
        .copied()
        .filter(|field| match body.get(*field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "Please fill in all required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Issues actions and keeps a screen consistent with the backend
pub struct MutationDispatcher<'a, X: Transport> {
    client: &'a ApiClient<X>,
    confirm: &'a dyn Confirm,
}

impl<'a, X: Transport> MutationDispatcher<'a, X> {
    pub fn new(client: &'a ApiClient<X>, confirm: &'a dyn Confirm) -> Self {
        Self { client, confirm }
    }

    /// Send an action without touching any screen
    pub fn send(&self, resource: &str, id: Option<&str>, action: &Action) -> Result<Value, ApiError> {
        if action.is_destructive() {
            let target = id.unwrap_or(resource);
            if !self.confirm.confirm(&format!("Permanently {} {}?", action.verb(), target)) {
                return Err(ApiError::Cancelled);
            }
        }

        let request = action.request(resource, id);
        match self.client.execute(request) {
            Ok(value) => {
                info!(resource, id = id.unwrap_or("-"), action = action.verb(), "mutation succeeded");
                Ok(value)
            }
            Err(e) => {
                warn!(resource, id = id.unwrap_or("-"), action = action.verb(), error = %e, "mutation failed");
                Err(e)
            }
        }
    }

    /// Send an action, then refresh the screen per `policy`
    ///
    /// A refetch failure after a successful write is logged and leaves the
    /// screen's stale data in place; the write itself still counts as done.
    pub fn dispatch<T>(
        &self,
        screen: &mut Screen<T>,
        resource: &str,
        id: Option<&str>,
        action: Action,
        policy: RefreshPolicy<T>,
    ) -> Result<Value, ApiError>
    where
        T: Record + Clone + DeserializeOwned,
    {
        let previous = screen.begin_mutation();
        let response = match self.send(resource, id, &action) {
            Ok(value) => value,
            Err(ApiError::Cancelled) => {
                screen.cancel_mutation(previous);
                return Err(ApiError::Cancelled);
            }
            Err(e) => {
                screen.finish_mutation(Some(&e));
                return Err(e);
            }
        };

        match policy {
            RefreshPolicy::Refetch => {
                if let Err(e) = screen.load(self.client) {
                    warn!(resource, error = %e, "refetch after mutation failed");
                }
            }
            RefreshPolicy::Optimistic(change) => {
                screen.view.apply(change);
                screen.finish_mutation(None);
            }
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_requests() {
        let r = Action::Verify.request("mao/farmers", Some("12"));
        assert_eq!(r.method, Method::Put);
        assert_eq!(r.path, "/mao/farmers/12/verify");
        assert!(r.body.is_none());

        let r = Action::Delete.request("team", Some("3"));
        assert_eq!(r.method, Method::Delete);
        assert_eq!(r.path, "/team/3");

        let r = Action::Create(json!({"title": "x"})).request("articles", None);
        assert_eq!(r.method, Method::Post);
        assert_eq!(r.path, "/articles");
        assert_eq!(r.body, Some(json!({"title": "x"})));

        let r = Action::Reject {
            reason: Some("blurry photo".into()),
        }
        .request("harvests/mao/harvests", Some("9"));
        assert_eq!(r.path, "/harvests/mao/harvests/9/reject");
        assert_eq!(r.body, Some(json!({"reason": "blurry photo"})));
    }

    #[test]
    fn test_only_delete_is_destructive() {
        assert!(Action::Delete.is_destructive());
        assert!(!Action::Verify.is_destructive());
        assert!(!Action::ToggleStatus.is_destructive());
    }

    #[test]
    fn test_require_fields() {
        let body = json!({"name": "Ana", "position": "  ", "bio": null});
        let err = require_fields(&body, &["name", "position", "bio", "photo"]).unwrap_err();
        assert_eq!(
            err.user_message(),
            "Please fill in all required fields: position, bio, photo"
        );
        assert!(require_fields(&body, &["name"]).is_ok());
    }
}
