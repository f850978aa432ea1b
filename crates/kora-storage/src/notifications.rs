//! Notification persistence

use chrono::{DateTime, Utc};
use kora_core::{KoraError, Result, UserId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A message shown in the user's notification tray
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: UserId,
    /// Short machine tag, e.g. "submission_reviewed"
    pub kind: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: UserId, kind: &str, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind: kind.to_string(),
            message,
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// Store for notifications
#[derive(Default)]
pub struct NotificationStore {
    records: RwLock<HashMap<Uuid, Notification>>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, notification: Notification) {
        self.records.write().insert(notification.id, notification);
    }

    /// A user's notifications, newest first
    pub fn list_for_user(&self, user_id: &UserId) -> Vec<Notification> {
        let mut results: Vec<Notification> = self
            .records
            .read()
            .values()
            .filter(|n| n.user_id == *user_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        results
    }

    pub fn mark_read(&self, id: &Uuid) -> Result<()> {
        let mut records = self.records.write();
        let notification = records.get_mut(id).ok_or_else(|| KoraError::NotFound {
            entity: "notification",
            id: id.to_string(),
        })?;
        notification.read = true;
        Ok(())
    }

    pub fn unread_count(&self, user_id: &UserId) -> usize {
        self.records
            .read()
            .values()
            .filter(|n| n.user_id == *user_id && !n.read)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_mark_read() {
        let store = NotificationStore::new();
        let user = UserId::generate();
        let note = Notification::new(user, "submission_reviewed", "Approved!".to_string());
        let id = note.id;
        store.push(note);

        assert_eq!(store.unread_count(&user), 1);
        store.mark_read(&id).unwrap();
        assert_eq!(store.unread_count(&user), 0);
    }

    #[test]
    fn test_list_is_scoped_to_user() {
        let store = NotificationStore::new();
        let a = UserId::generate();
        let b = UserId::generate();
        store.push(Notification::new(a, "x", "for a".to_string()));
        store.push(Notification::new(b, "x", "for b".to_string()));

        assert_eq!(store.list_for_user(&a).len(), 1);
    }
}
