//! Profile document contract.
//!
//! Profiles live in an external document store; the engine only reads them
//! for enrichment and increments balances for awards. Updates follow
//! document-store semantics: incrementing a missing profile is a silent
//! no-op, never an upsert.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The externally-owned profile document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub balance: i64,
}

#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up one profile by member id.
    async fn find(&self, member: &str) -> Result<Option<Profile>>;

    /// Add `amount` to a member's balance. A miss is a silent no-op.
    async fn add_balance(&self, member: &str, amount: i64) -> Result<()>;
}

/// In-memory [`ProfileStore`] for tests and the demo server.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    inner: RwLock<HashMap<String, Profile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: Profile) {
        self.inner
            .write()
            .unwrap()
            .insert(profile.id.clone(), profile);
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn find(&self, member: &str) -> Result<Option<Profile>> {
        Ok(self.inner.read().unwrap().get(member).cloned())
    }

    async fn add_balance(&self, member: &str, amount: i64) -> Result<()> {
        if let Some(profile) = self.inner.write().unwrap().get_mut(member) {
            profile.balance += amount;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn odin() -> Profile {
        Profile {
            id: "Odin".to_string(),
            name: "Odin Allfather".to_string(),
            age: 52,
            balance: 1000,
        }
    }

    #[tokio::test]
    async fn find_returns_inserted_profile() {
        let store = MemoryProfileStore::new();
        store.insert(odin());
        assert_eq!(store.find("Odin").await.unwrap(), Some(odin()));
        assert_eq!(store.find("Loki").await.unwrap(), None);
    }

    #[tokio::test]
    async fn add_balance_increments_existing() {
        let store = MemoryProfileStore::new();
        store.insert(odin());
        store.add_balance("Odin", 250).await.unwrap();
        assert_eq!(store.find("Odin").await.unwrap().unwrap().balance, 1250);
    }

    #[tokio::test]
    async fn add_balance_miss_is_silent() {
        let store = MemoryProfileStore::new();
        store.add_balance("nobody", 99).await.unwrap();
        assert_eq!(store.find("nobody").await.unwrap(), None);
    }
}
