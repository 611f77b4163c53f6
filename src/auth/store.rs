//! Token storage keyed by (user id, token kind)
//!
//! The file backend keeps records in a single TOML file, load-mutate-save
//! per operation. Concurrent refreshes for the same user are last-write-wins.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use super::tokens::{TokenKind, TokenRecord};

/// Key-value token store. Records are overwritten on put; there is no
/// deletion path, stale records persist.
pub trait TokenStore {
    fn get(&self, user_id: &str, kind: TokenKind) -> Result<Option<TokenRecord>>;
    fn put(&self, record: TokenRecord) -> Result<()>;
}

fn store_key(user_id: &str, kind: TokenKind) -> String {
    format!("{}/{}", user_id, kind.as_str())
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    tokens: BTreeMap<String, TokenRecord>,
}

/// TOML-file-backed store under the project config dir (or an explicit path).
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default store location under the platform config directory.
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = directories::ProjectDirs::from("com", "plant-ranger", "plant-ranger")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("tokens.toml"))
    }

    fn load(&self) -> Result<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let content = fs::read_to_string(&self.path).context("Failed to read token store")?;
        toml::from_str(&content).context("Failed to parse token store")
    }

    fn save(&self, file: &StoreFile) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).context("Failed to create token store directory")?;
        }
        let content = toml::to_string_pretty(file).context("Failed to serialize token store")?;
        fs::write(&self.path, content).context("Failed to write token store")?;

        // Restrictive permissions, the file contains tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, perms)
                .context("Failed to set token store permissions")?;
        }

        Ok(())
    }

    /// All stored records, for the `status` subcommand.
    pub fn list(&self) -> Result<Vec<TokenRecord>> {
        Ok(self.load()?.tokens.into_values().collect())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, user_id: &str, kind: TokenKind) -> Result<Option<TokenRecord>> {
        Ok(self.load()?.tokens.get(&store_key(user_id, kind)).cloned())
    }

    fn put(&self, record: TokenRecord) -> Result<()> {
        let mut file = self.load()?;
        file.tokens
            .insert(store_key(&record.user_id, record.kind), record);
        self.save(&file)
    }
}

/// In-memory store for tests. Counts get calls so tests can assert the
/// store was (or was not) consulted.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: std::sync::Mutex<BTreeMap<String, TokenRecord>>,
    gets: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: TokenRecord) -> Self {
        let store = Self::default();
        store
            .inner
            .lock()
            .unwrap()
            .insert(store_key(&record.user_id, record.kind), record);
        store
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl TokenStore for MemoryTokenStore {
    fn get(&self, user_id: &str, kind: TokenKind) -> Result<Option<TokenRecord>> {
        self.gets.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.inner.lock().unwrap().get(&store_key(user_id, kind)).cloned())
    }

    fn put(&self, record: TokenRecord) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .insert(store_key(&record.user_id, record.kind), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get_roundtrip() {
        let dir = std::env::temp_dir().join(format!("plant-ranger-test-{}", std::process::id()));
        let store = FileTokenStore::new(dir.join("tokens.toml"));

        let rec = TokenRecord::new("amzn1.user.abc".into(), "tok-1".into(), Some(3600));
        store.put(rec).unwrap();

        let got = store.get("amzn1.user.abc", TokenKind::Access).unwrap().unwrap();
        assert_eq!(got.token, "tok-1");
        assert_eq!(got.user_id, "amzn1.user.abc");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_get_missing_user_is_none() {
        let store = MemoryTokenStore::new();
        assert!(store.get("nobody", TokenKind::Access).unwrap().is_none());
    }

    #[test]
    fn test_put_overwrites_existing() {
        let store =
            MemoryTokenStore::with_record(TokenRecord::new("u".into(), "old".into(), None));
        store
            .put(TokenRecord::new("u".into(), "new".into(), None))
            .unwrap();
        let got = store.get("u", TokenKind::Access).unwrap().unwrap();
        assert_eq!(got.token, "new");
    }
}
