//! Offline Tell Store (C7, tell half): queued player-to-player messages,
//! delivered on next login. Enforces `OfflineTellLimitPerSender` pending
//! messages per (sender, recipient) pair.

use std::fs;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::error::StoreError;
use crate::model::OfflineTell;

pub const OFFLINE_TELL_LIMIT_PER_SENDER: usize = 5;

pub struct TellStore {
    path: PathBuf,
    queue: RwLock<Vec<OfflineTell>>,
}

impl TellStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let queue = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() { Vec::new() } else { serde_json::from_str(&raw)? }
        } else {
            Vec::new()
        };
        Ok(TellStore { path, queue: RwLock::new(queue) })
    }

    fn persist(&self, queue: &[OfflineTell]) -> Result<(), StoreError> {
        let tmp_path = self.path.with_extension("json.tmp");
        let raw = serde_json::to_string_pretty(queue)?;
        fs::write(&tmp_path, raw)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// `recipient` must already be the canonicalized (stored-casing)
    /// account name; the caller resolves that through the Account Store.
    pub fn queue(&self, sender: &str, recipient: &str, body: &str, at: i64) -> Result<(), StoreError> {
        let mut queue = self.queue.write();
        let pending = queue
            .iter()
            .filter(|t| t.sender.eq_ignore_ascii_case(sender) && t.recipient.eq_ignore_ascii_case(recipient))
            .count();
        if pending >= OFFLINE_TELL_LIMIT_PER_SENDER {
            return Err(StoreError::OfflineTellLimit(OFFLINE_TELL_LIMIT_PER_SENDER, recipient.to_string()));
        }
        queue.push(OfflineTell {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            body: body.to_string(),
            queued_at: at,
        });
        self.persist(&queue)
    }

    /// Returns and clears all tells queued for `recipient`, intended to be
    /// called on successful login.
    pub fn pending_for(&self, recipient: &str) -> Vec<OfflineTell> {
        let mut queue = self.queue.write();
        let (mine, rest): (Vec<_>, Vec<_>) = queue.drain(..).partition(|t| t.recipient.eq_ignore_ascii_case(recipient));
        *queue = rest;
        let _ = self.persist(&queue);
        mine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn limit_enforced_per_sender_recipient_pair() {
        let dir = tempdir().unwrap();
        let store = TellStore::load(dir.path().join("tells.json")).unwrap();
        for i in 0..OFFLINE_TELL_LIMIT_PER_SENDER {
            store.queue("Speaker", "Listener", &format!("msg {i}"), i as i64).unwrap();
        }
        let err = store.queue("Speaker", "Listener", "one too many", 99).unwrap_err();
        assert!(matches!(err, StoreError::OfflineTellLimit(5, _)));
    }

    #[test]
    fn pending_for_drains_only_matching_recipient() {
        let dir = tempdir().unwrap();
        let store = TellStore::load(dir.path().join("tells.json")).unwrap();
        store.queue("Speaker", "Listener", "hi", 1).unwrap();
        store.queue("Speaker", "Other", "hey", 2).unwrap();
        let mine = store.pending_for("listener");
        assert_eq!(mine.len(), 1);
        assert_eq!(store.pending_for("listener").len(), 0);
        assert_eq!(store.pending_for("other").len(), 1);
    }
}
