//! Persisted client session.
//!
//! Remembers the connected wallet and the profile being viewed between runs.
//! The file is advisory: every value in it is re-checked against the chain
//! before use.

use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::SessionError;

/// Contents of the session file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_address: Option<Address>,
    /// Present only while the connected wallet is known to be registered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_registered: Option<bool>,
    /// User ID of the profile opened in view mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_user_id: Option<u64>,
}

/// JSON session file, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the session; a missing file is an empty session.
    pub async fn load(&self) -> Result<SessionData, SessionError> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(SessionData::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn save(&self, data: &SessionData) -> Result<(), SessionError> {
        let encoded = serde_json::to_vec_pretty(data)?;
        let temp = self.path.with_extension("tmp");

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = tokio::fs::File::create(&temp).await?;
        file.write_all(&encoded).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&temp, &self.path).await?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Record the connected wallet and whether it is registered.
    pub async fn remember_connected(
        &self,
        address: Address,
        registered: bool,
    ) -> Result<SessionData, SessionError> {
        self.update(|data| {
            data.user_address = Some(address);
            data.is_registered = registered.then_some(true);
        })
        .await
    }

    /// Record the profile opened in view mode.
    pub async fn remember_viewed(
        &self,
        address: Address,
        user_id: u64,
    ) -> Result<SessionData, SessionError> {
        self.update(|data| {
            data.user_address = Some(address);
            data.view_user_id = Some(user_id);
        })
        .await
    }

    /// Leave view mode.
    pub async fn clear_viewed(&self) -> Result<SessionData, SessionError> {
        self.update(|data| {
            data.user_address = None;
            data.view_user_id = None;
        })
        .await
    }

    /// Forget the connected wallet on disconnect.
    pub async fn forget_connected(&self) -> Result<SessionData, SessionError> {
        self.update(|data| {
            data.user_address = None;
            data.is_registered = None;
        })
        .await
    }

    async fn update(
        &self,
        apply: impl FnOnce(&mut SessionData),
    ) -> Result<SessionData, SessionError> {
        let mut data = self.load().await?;
        apply(&mut data);
        self.save(&data).await?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> SessionFile {
        SessionFile::new(dir.path().join("session.json"))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_session() {
        let dir = TempDir::new().unwrap();
        assert_eq!(session(&dir).load().await.unwrap(), SessionData::default());
    }

    #[tokio::test]
    async fn test_remember_connected() {
        let dir = TempDir::new().unwrap();
        let file = session(&dir);
        let wallet = Address::repeat_byte(0x11);

        file.remember_connected(wallet, true).await.unwrap();
        let data = file.load().await.unwrap();
        assert_eq!(data.user_address, Some(wallet));
        assert_eq!(data.is_registered, Some(true));

        let data = file.remember_connected(wallet, false).await.unwrap();
        assert_eq!(data.is_registered, None);
        assert!(!dir.path().join("session.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_uses_wire_keys() {
        let dir = TempDir::new().unwrap();
        let file = session(&dir);
        file.remember_viewed(Address::repeat_byte(0x22), 9).await.unwrap();

        let raw = tokio::fs::read_to_string(file.path()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["viewUserId"], 9);
        assert!(value.get("userAddress").is_some());
        assert!(value.get("isRegistered").is_none());
    }

    #[tokio::test]
    async fn test_clear_viewed_keeps_registration_flag() {
        let dir = TempDir::new().unwrap();
        let file = session(&dir);
        file.remember_connected(Address::repeat_byte(0x11), true).await.unwrap();
        file.remember_viewed(Address::repeat_byte(0x22), 4).await.unwrap();

        let data = file.clear_viewed().await.unwrap();
        assert_eq!(data.user_address, None);
        assert_eq!(data.view_user_id, None);
        assert_eq!(data.is_registered, Some(true));

        let data = file.forget_connected().await.unwrap();
        assert_eq!(data, SessionData::default());
    }

    #[tokio::test]
    async fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let file = session(&dir);
        tokio::fs::write(file.path(), b"not json").await.unwrap();
        assert!(matches!(file.load().await, Err(SessionError::Json(_))));
    }
}
