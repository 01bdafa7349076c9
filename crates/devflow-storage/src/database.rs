//! Typed persistence facade
//!
//! Three records live in the key-value store:
//! - the whole workspace tree (JSON)
//! - the flat notification list for every user (JSON)
//! - the current session's user id (raw string, absent when logged out)
//!
//! Each write replaces a whole record. Per-user notification views are a
//! read-time filter; nothing is scoped at rest.

use crate::error::StorageError;
use crate::kv::KeyValueStore;
use devflow_model::{
    Notification, PhaseId, ProjectId, Task, TaskId, TaskStatus, User, UserId, Workspace,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Default record key prefix
pub const DEFAULT_KEY_PREFIX: &str = "devflow";

/// Names of the three persisted records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKeys {
    /// Workspace tree record
    pub workspace: String,
    /// Notification list record
    pub notifications: String,
    /// Current user id record
    pub current_user: String,
}

impl RecordKeys {
    /// Keys under a prefix (`<prefix>_workspace`, `<prefix>_notifications`, `<prefix>_currentUser`)
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            workspace: format!("{prefix}_workspace"),
            notifications: format!("{prefix}_notifications"),
            current_user: format!("{prefix}_currentUser"),
        }
    }
}

impl Default for RecordKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}

/// Persistence adapter over a key-value backend
#[derive(Debug)]
pub struct Database<S> {
    store: S,
    keys: RecordKeys,
}

impl<S: KeyValueStore> Database<S> {
    /// Wrap a backend with default keys
    #[inline]
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_keys(store, RecordKeys::default())
    }

    /// Wrap a backend with custom keys
    #[inline]
    #[must_use]
    pub fn with_keys(store: S, keys: RecordKeys) -> Self {
        Self { store, keys }
    }

    /// Underlying backend
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record keys in use
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &RecordKeys {
        &self.keys
    }

    /// Seed the workspace and an empty notification list on first run
    ///
    /// No-op when a workspace record already exists. Returns whether seeding happened.
    pub fn initialize(&self, seed: &Workspace) -> Result<bool, StorageError> {
        if self.store.get(&self.keys.workspace)?.is_some() {
            tracing::debug!("workspace record present, skipping seed");
            return Ok(false);
        }
        self.save_workspace(seed)?;
        self.save_json(&self.keys.notifications, &Vec::<Notification>::new())?;
        tracing::info!(workspace = %seed.id, "seeded workspace");
        Ok(true)
    }

    // --- session ---

    /// Persist the logged-in user id
    pub fn login(&self, user_id: &UserId) -> Result<(), StorageError> {
        self.store
            .set(&self.keys.current_user, user_id.as_str().to_string())?;
        tracing::info!(user = %user_id, "session stored");
        Ok(())
    }

    /// Forget the logged-in user id
    pub fn logout(&self) -> Result<(), StorageError> {
        self.store.remove(&self.keys.current_user)?;
        tracing::info!("session cleared");
        Ok(())
    }

    /// Persisted logged-in user id
    pub fn current_user_id(&self) -> Result<Option<UserId>, StorageError> {
        Ok(self
            .store
            .get(&self.keys.current_user)?
            .filter(|id| !id.is_empty())
            .map(UserId::from))
    }

    // --- reads ---

    /// Persisted workspace tree
    pub fn workspace(&self) -> Result<Option<Workspace>, StorageError> {
        self.load_json(&self.keys.workspace)
    }

    /// Every team member across every project, deduplicated by id
    pub fn users(&self) -> Result<Vec<User>, StorageError> {
        Ok(self
            .workspace()?
            .map(|ws| ws.team_roster())
            .unwrap_or_default())
    }

    /// Look up a team member by id
    pub fn user_by_id(&self, user_id: &UserId) -> Result<Option<User>, StorageError> {
        Ok(self.users()?.into_iter().find(|u| &u.id == user_id))
    }

    /// Every stored notification, in storage order
    pub fn all_notifications(&self) -> Result<Vec<Notification>, StorageError> {
        Ok(self.load_json(&self.keys.notifications)?.unwrap_or_default())
    }

    /// Notifications addressed to `user_id`, newest first
    pub fn notifications_for(&self, user_id: &UserId) -> Result<Vec<Notification>, StorageError> {
        let mut mine: Vec<Notification> = self
            .all_notifications()?
            .into_iter()
            .filter(|n| &n.user_id == user_id)
            .collect();
        mine.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(mine)
    }

    // --- writes ---

    /// Replace the workspace record
    pub fn save_workspace(&self, workspace: &Workspace) -> Result<(), StorageError> {
        self.save_json(&self.keys.workspace, workspace)
    }

    /// Append a notification to the stored list
    pub fn add_notification(&self, notification: &Notification) -> Result<(), StorageError> {
        let mut all = self.all_notifications()?;
        all.push(notification.clone());
        self.save_json(&self.keys.notifications, &all)?;
        tracing::info!(
            notification = %notification.id,
            user = %notification.user_id,
            "notification stored"
        );
        Ok(())
    }

    /// Mark every stored notification addressed to `user_id` as read
    ///
    /// Returns how many notifications changed.
    pub fn mark_notifications_read(&self, user_id: &UserId) -> Result<usize, StorageError> {
        let mut all = self.all_notifications()?;
        let mut changed = 0;
        for n in all.iter_mut().filter(|n| &n.user_id == user_id && !n.is_read) {
            n.is_read = true;
            changed += 1;
        }
        self.save_json(&self.keys.notifications, &all)?;
        tracing::info!(user = %user_id, changed, "notifications marked read");
        Ok(changed)
    }

    /// Append tasks to a stored phase
    ///
    /// Returns `false` without writing when there is no workspace or the address misses.
    pub fn add_tasks(
        &self,
        project_id: &ProjectId,
        phase_id: &PhaseId,
        tasks: &[Task],
    ) -> Result<bool, StorageError> {
        self.update_workspace(|ws| ws.add_tasks(project_id, phase_id, tasks.iter().cloned()))
    }

    /// Overwrite the status of a stored task
    ///
    /// Returns `false` without writing when there is no workspace or the address misses.
    pub fn update_task_status(
        &self,
        project_id: &ProjectId,
        phase_id: &PhaseId,
        task_id: &TaskId,
        status: TaskStatus,
    ) -> Result<bool, StorageError> {
        self.update_workspace(|ws| ws.set_task_status(project_id, phase_id, task_id, status))
    }

    fn update_workspace<F>(&self, apply: F) -> Result<bool, StorageError>
    where
        F: FnOnce(&mut Workspace) -> bool,
    {
        let Some(mut workspace) = self.workspace()? else {
            tracing::warn!("no workspace record to update");
            return Ok(false);
        };
        if !apply(&mut workspace) {
            return Ok(false);
        }
        self.save_workspace(&workspace)?;
        Ok(true)
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        self.store
            .get(key)?
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use devflow_model::seed::demo_workspace;
    use devflow_model::NotificationType;

    fn db() -> Database<MemoryStore> {
        Database::new(MemoryStore::new())
    }

    #[test]
    fn default_keys_match_record_names() {
        let keys = RecordKeys::default();
        assert_eq!(keys.workspace, "devflow_workspace");
        assert_eq!(keys.notifications, "devflow_notifications");
        assert_eq!(keys.current_user, "devflow_currentUser");
    }

    #[test]
    fn initialize_seeds_once() {
        let db = db();
        let now = Utc::now();
        assert!(db.initialize(&demo_workspace(now)).unwrap());
        assert!(db.all_notifications().unwrap().is_empty());

        let mut other = demo_workspace(now);
        other.name = "Other".to_string();
        assert!(!db.initialize(&other).unwrap());
        assert_eq!(db.workspace().unwrap().unwrap().name, "Phoenix Digital");
    }

    #[test]
    fn session_round_trip() {
        let db = db();
        assert!(db.current_user_id().unwrap().is_none());
        db.login(&"user-2".into()).unwrap();
        assert_eq!(db.current_user_id().unwrap(), Some(UserId::from("user-2")));
        db.logout().unwrap();
        assert!(db.current_user_id().unwrap().is_none());
    }

    #[test]
    fn current_user_is_stored_as_raw_string() {
        let db = db();
        db.login(&"user-2".into()).unwrap();
        assert_eq!(db.store().peek("devflow_currentUser").as_deref(), Some("user-2"));
    }

    #[test]
    fn notifications_for_filters_and_sorts_newest_first() {
        let db = db();
        let t0 = Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap();
        let older = Notification::new(NotificationType::TaskCompleted, "old", "user-1", t0);
        let newer = Notification::new(
            NotificationType::TaskCompleted,
            "new",
            "user-1",
            t0 + Duration::hours(1),
        );
        let foreign = Notification::new(NotificationType::TaskCompleted, "x", "user-2", t0);
        for n in [&older, &newer, &foreign] {
            db.add_notification(n).unwrap();
        }

        let mine = db.notifications_for(&"user-1".into()).unwrap();
        let messages: Vec<_> = mine.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["new", "old"]);
        assert_eq!(db.all_notifications().unwrap().len(), 3);
    }

    #[test]
    fn mark_read_at_rest_is_scoped_to_user() {
        let db = db();
        let t0 = Utc::now();
        db.add_notification(&Notification::new(NotificationType::TaskCompleted, "a", "user-1", t0))
            .unwrap();
        db.add_notification(&Notification::new(NotificationType::TaskCompleted, "b", "user-2", t0))
            .unwrap();

        assert_eq!(db.mark_notifications_read(&"user-1".into()).unwrap(), 1);
        let all = db.all_notifications().unwrap();
        assert!(all.iter().find(|n| n.user_id == "user-1").unwrap().is_read);
        assert!(!all.iter().find(|n| n.user_id == "user-2").unwrap().is_read);
    }

    #[test]
    fn update_status_miss_writes_nothing() {
        let db = db();
        db.initialize(&demo_workspace(Utc::now())).unwrap();
        let writes = db.store().write_count();
        let hit = db
            .update_task_status(&"proj-1".into(), &"phase-1".into(), &"nope".into(), TaskStatus::Done)
            .unwrap();
        assert!(!hit);
        assert_eq!(db.store().write_count(), writes);
    }

    #[test]
    fn update_status_persists() {
        let db = db();
        db.initialize(&demo_workspace(Utc::now())).unwrap();
        assert!(db
            .update_task_status(&"proj-1".into(), &"phase-3".into(), &"task-3-1".into(), TaskStatus::Blocked)
            .unwrap());
        let ws = db.workspace().unwrap().unwrap();
        let task = ws
            .find_task(&"proj-1".into(), &"phase-3".into(), &"task-3-1".into())
            .unwrap();
        assert_eq!(task.status, TaskStatus::Blocked);
    }

    #[test]
    fn add_tasks_without_workspace_is_a_miss() {
        let db = db();
        let task = Task::new("t", "T", Utc::now());
        assert!(!db.add_tasks(&"p".into(), &"ph".into(), &[task]).unwrap());
    }

    #[test]
    fn corrupt_workspace_is_reported() {
        let db = db();
        db.store().set("devflow_workspace", "{not json".to_string()).unwrap();
        assert!(matches!(db.workspace(), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn user_lookup_uses_roster() {
        let db = db();
        db.initialize(&demo_workspace(Utc::now())).unwrap();
        assert_eq!(db.users().unwrap().len(), 5);
        assert_eq!(db.user_by_id(&"user-4".into()).unwrap().unwrap().name, "Aisha");
        assert!(db.user_by_id(&"ghost".into()).unwrap().is_none());
    }
}
