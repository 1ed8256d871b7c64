use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Storage;

/// Storage key for the persisted session. Deliberately outside the
/// cache namespace: cache clears must never log the user out.
const SESSION_KEY: &str = "carlot.auth_token";

/// Token expiry time in minutes.
const TOKEN_EXPIRY_MINUTES: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: String) -> Self {
        Self {
            token,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        let expiry = self.created_at + Duration::minutes(TOKEN_EXPIRY_MINUTES);
        Utc::now() > expiry
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        let expiry = self.created_at + Duration::minutes(TOKEN_EXPIRY_MINUTES);
        (expiry - Utc::now()).num_minutes().max(0)
    }
}

/// Persisted auth session backed by the shared key-value storage.
pub struct Session {
    storage: Arc<dyn Storage>,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            data: None,
        }
    }

    /// Load the session from storage. Returns true if a non-expired
    /// session was found.
    pub fn load(&mut self) -> Result<bool> {
        if let Some(raw) = self.storage.get_item(SESSION_KEY)? {
            let data: SessionData =
                serde_json::from_str(&raw).context("Failed to parse stored session")?;
            if !data.is_expired() {
                self.data = Some(data);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Persist the current session
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let raw = serde_json::to_string(data)?;
            self.storage.set_item(SESSION_KEY, &raw)?;
        }
        Ok(())
    }

    /// Clear session data, in memory and in storage
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        self.storage.remove_item(SESSION_KEY)
    }

    /// Update session with new data
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// Get the bearer token if a session is held
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    /// Check if session is valid (exists and not expired)
    pub fn is_valid(&self) -> bool {
        self.data.as_ref().map(|d| !d.is_expired()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStorage;

    #[test]
    fn test_session_round_trip() {
        let storage = Arc::new(MemoryStorage::default());

        let mut session = Session::new(storage.clone());
        session.update(SessionData::new("jwt-token".to_string()));
        session.save().unwrap();

        let mut reloaded = Session::new(storage);
        assert!(reloaded.load().unwrap());
        assert_eq!(reloaded.token(), Some("jwt-token"));
        assert!(reloaded.is_valid());
    }

    #[test]
    fn test_expired_session_not_loaded() {
        let storage = Arc::new(MemoryStorage::default());

        let stale = SessionData {
            token: "old".to_string(),
            created_at: Utc::now() - Duration::minutes(TOKEN_EXPIRY_MINUTES + 1),
        };
        storage
            .set_item(SESSION_KEY, &serde_json::to_string(&stale).unwrap())
            .unwrap();

        let mut session = Session::new(storage);
        assert!(!session.load().unwrap());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_clear_removes_stored_session() {
        let storage = Arc::new(MemoryStorage::default());

        let mut session = Session::new(storage.clone());
        session.update(SessionData::new("jwt-token".to_string()));
        session.save().unwrap();
        session.clear().unwrap();

        assert!(storage.get_item(SESSION_KEY).unwrap().is_none());
        assert!(!session.is_valid());
    }

    #[test]
    fn test_minutes_until_expiry() {
        let data = SessionData::new("t".to_string());
        let remaining = data.minutes_until_expiry();
        assert!(remaining > 0 && remaining <= TOKEN_EXPIRY_MINUTES);
    }
}
