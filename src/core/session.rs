//! Auth session - the single process-wide source of the bearer token
//!
//! A session is created by `mao login`, persisted next to the config file,
//! and removed by `mao logout`. Everything else reads the token and the
//! current user through [`AuthContext`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::Config;
use crate::core::identity::RecordId;

/// Errors that can occur while managing the session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not logged in. Run `mao login` first")]
    NotLoggedIn,

    #[error("No configuration directory available")]
    NoConfigDir,

    #[error("Failed to write session: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed session file: {0}")]
    Format(String),
}

/// The logged-in MAO user as returned by the login endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default, alias = "fullName", alias = "full_name")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "userType", alias = "user_type")]
    pub role: String,
}

/// A stored login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: CurrentUser,
    pub api_url: String,
    pub logged_in_at: DateTime<Utc>,
}

/// Access to the current session with an explicit set/clear lifecycle
#[derive(Debug, Clone)]
pub struct AuthContext {
    path: PathBuf,
    session: Option<Session>,
}

impl AuthContext {
    /// Load the session from the default config directory
    pub fn load() -> Result<Self, SessionError> {
        let dir = Config::config_dir().ok_or(SessionError::NoConfigDir)?;
        Self::load_from(&dir)
    }

    /// Load the session stored in `dir` (missing file means logged out)
    pub fn load_from(dir: &Path) -> Result<Self, SessionError> {
        let path = dir.join("session.yaml");
        let session = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Some(
                serde_yml::from_str::<Session>(&contents)
                    .map_err(|e| SessionError::Format(e.to_string()))?,
            )
        } else {
            None
        };
        Ok(Self { path, session })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Bearer token for API calls
    pub fn token(&self) -> Result<&str, SessionError> {
        self.session
            .as_ref()
            .map(|s| s.token.as_str())
            .ok_or(SessionError::NotLoggedIn)
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.session.as_ref().map(|s| &s.user)
    }

    /// Store a new session (replacing any existing one)
    pub fn login(&mut self, session: Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents =
            serde_yml::to_string(&session).map_err(|e| SessionError::Format(e.to_string()))?;
        std::fs::write(&self.path, contents)?;
        self.session = Some(session);
        Ok(())
    }

    /// Forget the session; returns whether one existed
    pub fn logout(&mut self) -> Result<bool, SessionError> {
        let existed = self.session.take().is_some() || self.path.exists();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session() -> Session {
        Session {
            token: "abc.def".to_string(),
            user: CurrentUser {
                id: RecordId::from("1"),
                name: "Maria Santos".to_string(),
                email: "mao@example.gov.ph".to_string(),
                role: "mao".to_string(),
            },
            api_url: "http://localhost:5000".to_string(),
            logged_in_at: Utc::now(),
        }
    }

    #[test]
    fn test_logged_out_by_default() {
        let tmp = TempDir::new().unwrap();
        let auth = AuthContext::load_from(tmp.path()).unwrap();
        assert!(!auth.is_logged_in());
        assert!(matches!(auth.token(), Err(SessionError::NotLoggedIn)));
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn test_login_persists_and_logout_clears() {
        let tmp = TempDir::new().unwrap();
        let mut auth = AuthContext::load_from(tmp.path()).unwrap();
        auth.login(session()).unwrap();
        assert_eq!(auth.token().unwrap(), "abc.def");

        let reloaded = AuthContext::load_from(tmp.path()).unwrap();
        assert_eq!(reloaded.current_user().unwrap().name, "Maria Santos");

        let mut reloaded = reloaded;
        assert!(reloaded.logout().unwrap());
        assert!(!reloaded.is_logged_in());
        assert!(!AuthContext::load_from(tmp.path()).unwrap().is_logged_in());
        assert!(!reloaded.logout().unwrap());
    }

    #[test]
    fn test_user_accepts_camel_case_aliases() {
        let user: CurrentUser =
            serde_json::from_str(r#"{"id": 5, "fullName": "Jose Cruz", "userType": "mao"}"#).unwrap();
        assert_eq!(user.id.as_str(), "5");
        assert_eq!(user.name, "Jose Cruz");
        assert_eq!(user.role, "mao");
    }
}
