//! Participant identity
//!
//! Every request carries a participant identifier that stays the same for the
//! lifetime of the tab. The identifier lives in tab-scoped storage; when that
//! storage is unusable the store keeps an in-memory identity for the current
//! page load instead of failing the conversation.

mod storage;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use storage::{MemoryTabStorage, StorageError, TabStorage};

/// Default storage key for the participant identity
pub const DEFAULT_IDENTITY_KEY: &str = "chat_user_id";

/// Opaque identifier for one tab's conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse a stored value, accepting only well-formed UUIDs
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim())
            .ok()
            .map(|uuid| Self(uuid.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Obtains or creates the participant identity
pub struct IdentityStore {
    storage: Box<dyn TabStorage>,
    key: String,
    /// In-memory identity used when storage cannot hold one
    ephemeral: Option<ParticipantId>,
}

impl IdentityStore {
    pub fn new(storage: Box<dyn TabStorage>) -> Self {
        Self::with_key(storage, DEFAULT_IDENTITY_KEY)
    }

    pub fn with_key(storage: Box<dyn TabStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            ephemeral: None,
        }
    }

    /// Return the stored identity, creating and storing one on first use
    pub fn get_or_create(&mut self) -> ParticipantId {
        if let Some(id) = &self.ephemeral {
            return id.clone();
        }

        match self.storage.get(&self.key) {
            Ok(Some(stored)) => {
                if let Some(id) = ParticipantId::parse(&stored) {
                    return id;
                }
                tracing::warn!(key = %self.key, "Stored participant id is not a UUID, regenerating");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Tab storage unreadable, using in-memory identity");
                return self.ephemeral_identity();
            }
        }

        let id = ParticipantId::generate();
        match self.storage.set(&self.key, id.as_str()) {
            Ok(()) => {
                tracing::debug!(participant = %id, "Created participant identity");
                id
            }
            Err(e) => {
                tracing::warn!(error = %e, "Tab storage unwritable, using in-memory identity");
                self.ephemeral = Some(id.clone());
                id
            }
        }
    }

    /// Drop the current identity so the next call generates a new one
    pub fn forget(&mut self) {
        self.ephemeral = None;
        if let Err(e) = self.storage.remove(&self.key) {
            tracing::warn!(error = %e, "Failed to remove participant id from tab storage");
        }
    }

    /// Whether the current identity only lives in memory
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral.is_some()
    }

    fn ephemeral_identity(&mut self) -> ParticipantId {
        self.ephemeral
            .get_or_insert_with(ParticipantId::generate)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Storage that fails every operation
    struct UnavailableStorage;

    impl TabStorage for UnavailableStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }
    }

    /// Storage that reads fine but rejects writes
    struct ReadOnlyStorage;

    impl TabStorage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::QuotaExceeded)
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_identity_is_stable() {
        let mut store = IdentityStore::new(Box::new(MemoryTabStorage::new()));

        let first = store.get_or_create();
        for _ in 0..10 {
            assert_eq!(store.get_or_create(), first);
        }
        assert!(Uuid::parse_str(first.as_str()).is_ok());
        assert!(!store.is_ephemeral());
    }

    #[test]
    fn test_reuses_previously_stored_identity() {
        let existing = ParticipantId::generate();
        let mut storage = MemoryTabStorage::new();
        storage.set(DEFAULT_IDENTITY_KEY, existing.as_str()).unwrap();

        let mut store = IdentityStore::new(Box::new(storage));
        assert_eq!(store.get_or_create(), existing);
    }

    #[test]
    fn test_invalid_stored_value_is_replaced() {
        let mut storage = MemoryTabStorage::new();
        storage.set(DEFAULT_IDENTITY_KEY, "test_user").unwrap();

        let mut store = IdentityStore::new(Box::new(storage));
        let id = store.get_or_create();
        assert_ne!(id.as_str(), "test_user");
        assert!(Uuid::parse_str(id.as_str()).is_ok());
        assert_eq!(store.get_or_create(), id);
    }

    #[test]
    fn test_unavailable_storage_falls_back_to_memory() {
        let mut store = IdentityStore::new(Box::new(UnavailableStorage));

        let id = store.get_or_create();
        assert!(store.is_ephemeral());
        assert_eq!(store.get_or_create(), id);
    }

    #[test]
    fn test_unwritable_storage_falls_back_to_memory() {
        let mut store = IdentityStore::new(Box::new(ReadOnlyStorage));

        let id = store.get_or_create();
        assert!(store.is_ephemeral());
        assert_eq!(store.get_or_create(), id);
    }

    #[test]
    fn test_forget_rotates_identity() {
        let mut store = IdentityStore::new(Box::new(MemoryTabStorage::new()));

        let before = store.get_or_create();
        store.forget();
        let after = store.get_or_create();
        assert_ne!(before, after);
        assert_eq!(store.get_or_create(), after);
    }

    #[test]
    fn test_custom_key() {
        let mut store = IdentityStore::with_key(Box::new(MemoryTabStorage::new()), "tab_id");
        let id = store.get_or_create();
        assert_eq!(store.get_or_create(), id);
    }
}
