//! Mail Store (C7, board half): public board posts, persisted to a single
//! JSON file with the same write-then-rename discipline as the account
//! store.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::error::StoreError;
use crate::model::MailMessage;

pub struct MailStore {
    path: PathBuf,
    boards: RwLock<HashMap<String, Vec<MailMessage>>>,
}

impl MailStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let boards = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                HashMap::new()
            } else {
                let all: Vec<MailMessage> = serde_json::from_str(&raw)?;
                let mut map: HashMap<String, Vec<MailMessage>> = HashMap::new();
                for msg in all {
                    map.entry(msg.board.to_ascii_lowercase()).or_default().push(msg);
                }
                map
            }
        } else {
            HashMap::new()
        };
        Ok(MailStore { path, boards: RwLock::new(boards) })
    }

    fn persist(&self, boards: &HashMap<String, Vec<MailMessage>>) -> Result<(), StoreError> {
        let mut all: Vec<&MailMessage> = boards.values().flatten().collect();
        all.sort_by(|a, b| (a.board.as_str(), a.id).cmp(&(b.board.as_str(), b.id)));
        let tmp_path = self.path.with_extension("json.tmp");
        let raw = serde_json::to_string_pretty(&all)?;
        fs::write(&tmp_path, raw)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Assigns a new per-board ID, deduplicates recipients case-
    /// insensitively preserving the first spelling, and persists.
    pub fn write(
        &self,
        board: &str,
        author: &str,
        recipients: Vec<String>,
        body: &str,
        at: i64,
    ) -> Result<MailMessage, StoreError> {
        if body.trim().is_empty() {
            return Err(StoreError::EmptyBody);
        }
        let mut seen = std::collections::HashSet::new();
        let mut deduped = Vec::new();
        for r in recipients {
            let key = r.to_ascii_lowercase();
            if seen.insert(key) {
                deduped.push(r);
            }
        }

        let mut boards = self.boards.write();
        let key = board.to_ascii_lowercase();
        let entries = boards.entry(key).or_default();
        let id = entries.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        let message = MailMessage {
            board: board.to_string(),
            id,
            author: author.to_string(),
            recipients: deduped,
            body: body.to_string(),
            created_at: at,
        };
        entries.push(message.clone());
        self.persist(&boards)?;
        Ok(message)
    }

    /// Returns posts for `board` in insertion order.
    pub fn messages(&self, board: &str) -> Vec<MailMessage> {
        self.boards.read().get(&board.to_ascii_lowercase()).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_dedupes_recipients_case_insensitively() {
        let dir = tempdir().unwrap();
        let store = MailStore::load(dir.path().join("mail.json")).unwrap();
        let msg = store
            .write("news", "Hero", vec!["Watcher".into(), "watcher".into(), "Greeter".into()], "hi", 1)
            .unwrap();
        assert_eq!(msg.recipients, vec!["Watcher".to_string(), "Greeter".to_string()]);
    }

    #[test]
    fn ids_are_monotonic_per_board() {
        let dir = tempdir().unwrap();
        let store = MailStore::load(dir.path().join("mail.json")).unwrap();
        let a = store.write("news", "Hero", vec![], "first", 1).unwrap();
        let b = store.write("news", "Hero", vec![], "second", 2).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn empty_body_rejected() {
        let dir = tempdir().unwrap();
        let store = MailStore::load(dir.path().join("mail.json")).unwrap();
        assert!(matches!(store.write("news", "Hero", vec![], "  ", 1), Err(StoreError::EmptyBody)));
    }

    #[test]
    fn save_and_reload_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mail.json");
        {
            let store = MailStore::load(&path).unwrap();
            store.write("news", "Hero", vec![], "hello", 1).unwrap();
        }
        let reloaded = MailStore::load(&path).unwrap();
        assert_eq!(reloaded.messages("news").len(), 1);
    }
}
