//! Locally cached identity. Self-declared; the server does not authenticate it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::model::{Role, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

impl From<User> for Identity {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            role: u.role,
        }
    }
}

/// JSON file holding the current [`Identity`].
#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `{config_dir}/cleaning-ops/identity.json`, or the working directory when
    /// the platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cleaning-ops")
            .join("identity.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Identity>> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ClientError::Identity {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| ClientError::CorruptIdentity {
                path: self.path.clone(),
                source,
            })
    }

    /// The cached identity, or [`ClientError::NotLoggedIn`].
    pub fn require(&self) -> Result<Identity> {
        self.load()?.ok_or(ClientError::NotLoggedIn)
    }

    pub fn save(&self, identity: &Identity) -> Result<()> {
        let io_err = |source| ClientError::Identity {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        let json = serde_json::to_vec_pretty(identity).map_err(|source| {
            ClientError::CorruptIdentity {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, json).map_err(io_err)
    }

    /// Remove the cache; `false` when there was nothing to remove.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(ClientError::Identity {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            role: Role::Cleaner,
        }
    }

    #[test]
    fn missing_cache_means_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = IdentityStore::new(dir.path().join("identity.json"));
        assert_eq!(store.load().unwrap(), None);
        assert!(matches!(store.require(), Err(ClientError::NotLoggedIn)));
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = IdentityStore::new(dir.path().join("nested/cfg/identity.json"));
        let who = ana();

        store.save(&who).unwrap();
        assert_eq!(store.require().unwrap(), who);

        assert!(store.clear().unwrap());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn garbage_cache_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity.json");
        std::fs::write(&path, "not json").unwrap();

        let err = IdentityStore::new(&path).load().unwrap_err();
        assert!(matches!(err, ClientError::CorruptIdentity { .. }));
    }
}
