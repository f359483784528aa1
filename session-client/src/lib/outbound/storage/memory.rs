use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::domain::token::errors::TokenStoreError;
use crate::domain::token::models::TokenPair;
use crate::domain::token::ports::TokenStore;
use crate::domain::token::ports::ACCESS_TOKEN_KEY;
use crate::domain::token::ports::REFRESH_TOKEN_KEY;

/// Process-local token store.
///
/// Keeps the same two-entry layout as the durable store so partial state can
/// be reproduced in tests. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a token pair.
    pub fn with_pair(pair: &TokenPair) -> Self {
        let store = Self::new();
        store.insert_entry(ACCESS_TOKEN_KEY, &pair.access_token);
        store.insert_entry(REFRESH_TOKEN_KEY, &pair.refresh_token);
        store
    }

    /// Write a single raw entry.
    pub fn insert_entry(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    /// Whether the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<TokenPair> {
        let entries = self.entries();
        let access_token = entries.get(ACCESS_TOKEN_KEY)?;
        let refresh_token = entries.get(REFRESH_TOKEN_KEY)?;
        Some(TokenPair::new(access_token.clone(), refresh_token.clone()))
    }

    fn set(&self, pair: &TokenPair) -> Result<(), TokenStoreError> {
        let mut entries = self.entries();
        entries.insert(ACCESS_TOKEN_KEY.to_string(), pair.access_token.clone());
        entries.insert(REFRESH_TOKEN_KEY.to_string(), pair.refresh_token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let mut entries = self.entries();
        entries.remove(ACCESS_TOKEN_KEY);
        entries.remove(REFRESH_TOKEN_KEY);
        Ok(())
    }
}
