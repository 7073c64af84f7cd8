//! Account Store (C2): persists credential hashes, role flags, login
//! bookkeeping, and per-player channel preferences to a single JSON file
//! under a file lock. Every successful mutation serializes the whole
//! record set to a temp file and atomically renames it over the
//! destination, the same write-then-rename discipline the pack uses for
//! its other flat-file persistence.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use fd_lock::RwLock as FileLock;
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::model::{Account, Channel, Role, StoredChannelPrefs};

pub struct AccountStore {
    path: PathBuf,
    records: RwLock<HashMap<String, Account>>,
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl AccountStore {
    /// Loads the store from `path`, creating an empty one if the file does
    /// not yet exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                HashMap::new()
            } else {
                let list: Vec<Account> = serde_json::from_str(&raw)?;
                list.into_iter().map(|a| (a.name.to_ascii_lowercase(), a)).collect()
            }
        } else {
            HashMap::new()
        };
        Ok(AccountStore {
            path,
            records: RwLock::new(records),
        })
    }

    fn persist(&self, records: &HashMap<String, Account>) -> Result<(), StoreError> {
        let mut list: Vec<&Account> = records.values().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));

        let tmp_path = self.path.with_extension("json.tmp");
        {
            // Take an exclusive file lock on the temp file while we write
            // it, then atomically rename over the real path.
            let file = File::create(&tmp_path)?;
            let mut lock = FileLock::new(file);
            let mut guard = lock.write().map_err(std::io::Error::other)?;
            serde_json::to_writer_pretty(&mut *guard, &list)?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.records.read().contains_key(&name.to_ascii_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<Account> {
        self.records.read().get(&name.to_ascii_lowercase()).cloned()
    }

    /// Fails if the account exists or the password is under 6 characters.
    pub fn register(&self, name: &str, password: &str) -> Result<Account, StoreError> {
        if password.len() < 6 {
            return Err(StoreError::WeakPassword);
        }
        let key = name.to_ascii_lowercase();
        let mut records = self.records.write();
        if records.contains_key(&key) {
            return Err(StoreError::AccountExists(name.to_string()));
        }
        let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| StoreError::Io(std::io::Error::other(e)))?;
        let account = Account {
            name: name.to_string(),
            password_hash: hash,
            created_at: now(),
            last_login: None,
            total_logins: 0,
            roles: Vec::new(),
            home: None,
            channel_prefs: HashMap::new(),
        };
        records.insert(key, account.clone());
        self.persist(&records)?;
        Ok(account)
    }

    /// Constant-time-verified (via bcrypt's own comparison) password check.
    pub fn authenticate(&self, name: &str, password: &str) -> Result<bool, StoreError> {
        let records = self.records.read();
        let account = records
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| StoreError::AccountNotFound(name.to_string()))?;
        Ok(bcrypt::verify(password, &account.password_hash).unwrap_or(false))
    }

    pub fn record_login(&self, name: &str, at: i64) -> Result<(), StoreError> {
        let mut records = self.records.write();
        let key = name.to_ascii_lowercase();
        let account = records.get_mut(&key).ok_or_else(|| StoreError::AccountNotFound(name.to_string()))?;
        account.last_login = Some(at);
        account.total_logins += 1;
        self.persist(&records)
    }

    pub fn set_home(&self, name: &str, room: &str) -> Result<(), StoreError> {
        let mut records = self.records.write();
        let key = name.to_ascii_lowercase();
        let account = records.get_mut(&key).ok_or_else(|| StoreError::AccountNotFound(name.to_string()))?;
        account.home = Some(room.to_string());
        self.persist(&records)
    }

    pub fn set_channel_prefs(&self, name: &str, channel: Channel, prefs: StoredChannelPrefs) -> Result<(), StoreError> {
        let mut records = self.records.write();
        let key = name.to_ascii_lowercase();
        let account = records.get_mut(&key).ok_or_else(|| StoreError::AccountNotFound(name.to_string()))?;
        account.channel_prefs.insert(channel, prefs);
        self.persist(&records)
    }

    pub fn set_role(&self, name: &str, role: Role, enabled: bool) -> Result<(), StoreError> {
        let mut records = self.records.write();
        let key = name.to_ascii_lowercase();
        let account = records.get_mut(&key).ok_or_else(|| StoreError::AccountNotFound(name.to_string()))?;
        if enabled {
            if !account.roles.contains(&role) {
                account.roles.push(role);
            }
        } else {
            account.roles.retain(|r| *r != role);
        }
        self.persist(&records)
    }

    /// Resolves the stored, canonical casing for a case-insensitive account
    /// name lookup (used by the offline-tell queue).
    pub fn canonical_name(&self, name: &str) -> Option<String> {
        self.records.read().get(&name.to_ascii_lowercase()).map(|a| a.name.clone())
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn register_then_authenticate_round_trips() {
        let dir = tempdir().unwrap();
        let store = AccountStore::load(dir.path().join("accounts.json")).unwrap();
        store.register("Hero", "password1").unwrap();
        assert!(store.authenticate("hero", "password1").unwrap());
        assert!(!store.authenticate("hero", "wrong").unwrap());
    }

    #[test]
    fn register_rejects_short_password() {
        let dir = tempdir().unwrap();
        let store = AccountStore::load(dir.path().join("accounts.json")).unwrap();
        assert!(matches!(store.register("Hero", "abcde"), Err(StoreError::WeakPassword)));
        store.register("Hero", "abcdef").unwrap();
    }

    #[test]
    fn register_rejects_duplicate_case_insensitive() {
        let dir = tempdir().unwrap();
        let store = AccountStore::load(dir.path().join("accounts.json")).unwrap();
        store.register("Hero", "password1").unwrap();
        assert!(matches!(store.register("HERO", "password2"), Err(StoreError::AccountExists(_))));
    }

    #[test]
    fn save_and_reload_produces_equal_record_set() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        {
            let store = AccountStore::load(&path).unwrap();
            store.register("Hero", "password1").unwrap();
            store.record_login("Hero", 1000).unwrap();
        }
        let reloaded = AccountStore::load(&path).unwrap();
        let account = reloaded.get("hero").unwrap();
        assert_eq!(account.total_logins, 1);
        assert_eq!(account.last_login, Some(1000));
    }
}
