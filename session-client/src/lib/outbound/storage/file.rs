use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::domain::token::errors::TokenStoreError;
use crate::domain::token::models::TokenPair;
use crate::domain::token::ports::TokenStore;
use crate::domain::token::ports::ACCESS_TOKEN_KEY;
use crate::domain::token::ports::REFRESH_TOKEN_KEY;

/// Token store backed by a JSON file.
///
/// The file is a flat object of string entries keyed by `jwt_token` and
/// `refresh_token`. Writes go to a uniquely named sibling temporary file that
/// is then renamed over the original, so a crash never leaves a half-written
/// file. The file is readable by its owner only.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store persisting to `path`.
    ///
    /// Nothing is touched until the first write; a missing file is an empty
    /// store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_entries(&self) -> Result<HashMap<String, String>, TokenStoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &HashMap<&str, &str>) -> Result<(), TokenStoreError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        // Created with mode 0600 on unix; the rename keeps it.
        let mut staging = NamedTempFile::new_in(dir)?;
        staging.write_all(&serde_json::to_vec_pretty(entries)?)?;
        staging.as_file().sync_all()?;
        staging.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<TokenPair> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Token file unreadable, treating as empty"
                );
                return None;
            }
        };

        let access_token = entries.remove(ACCESS_TOKEN_KEY)?;
        let refresh_token = entries.remove(REFRESH_TOKEN_KEY)?;
        Some(TokenPair::new(access_token, refresh_token))
    }

    fn set(&self, pair: &TokenPair) -> Result<(), TokenStoreError> {
        let entries = HashMap::from([
            (ACCESS_TOKEN_KEY, pair.access_token.as_str()),
            (REFRESH_TOKEN_KEY, pair.refresh_token.as_str()),
        ]);

        self.write_entries(&entries)?;
        tracing::debug!(path = %self.path.display(), "Token pair persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Token file removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
