use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use super::form::{Capabilities, ReviewForm};
use crate::errors::{AppError, AppResult};

pub type SharedForm = Arc<Mutex<ReviewForm>>;

struct Entry {
    user_id: String,
    form: SharedForm,
    touched: Instant,
}

/// Live form sessions, keyed by form id. Each user may hold at most
/// `max_per_user` open forms; forms nobody has touched for a while are
/// dropped by [`FormRegistry::evict_idle`].
pub struct FormRegistry {
    forms: RwLock<HashMap<Uuid, Entry>>,
    max_per_user: usize,
}

impl FormRegistry {
    pub fn new(max_per_user: usize) -> Self {
        Self {
            forms: RwLock::new(HashMap::new()),
            max_per_user,
        }
    }

    pub async fn create(
        &self,
        user_id: &str,
        user_name: &str,
        capabilities: Capabilities,
    ) -> AppResult<Uuid> {
        let mut forms = self.forms.write().await;
        let open = forms.values().filter(|e| e.user_id == user_id).count();
        if open >= self.max_per_user {
            tracing::warn!(user_id, open, "open form limit reached");
            return Err(AppError::Conflict(format!(
                "at most {} review forms may be open at once",
                self.max_per_user
            )));
        }

        let form_id = Uuid::new_v4();
        forms.insert(
            form_id,
            Entry {
                user_id: user_id.to_string(),
                form: Arc::new(Mutex::new(ReviewForm::new(user_id, user_name, capabilities))),
                touched: Instant::now(),
            },
        );
        tracing::debug!(%form_id, user_id, ?capabilities, "review form created");
        Ok(form_id)
    }

    /// Returns the form if it exists and belongs to `user_id`, and marks it
    /// as recently used.
    pub async fn get(&self, form_id: Uuid, user_id: &str) -> AppResult<SharedForm> {
        let mut forms = self.forms.write().await;
        let entry = forms
            .get_mut(&form_id)
            .ok_or_else(|| AppError::NotFound(format!("form {}", form_id)))?;

        if entry.user_id != user_id {
            return Err(AppError::Forbidden(form_id));
        }
        entry.touched = Instant::now();
        Ok(entry.form.clone())
    }

    pub async fn remove(&self, form_id: Uuid) -> bool {
        self.forms.write().await.remove(&form_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.forms.read().await.len()
    }

    /// Drops every form not fetched within `max_idle`. A request already
    /// holding the form keeps its handle until it finishes.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut forms = self.forms.write().await;
        let before = forms.len();
        forms.retain(|_, entry| now.duration_since(entry.touched) < max_idle);
        before - forms.len()
    }

    /// Runs [`FormRegistry::evict_idle`] on a fixed period, forever.
    pub async fn sweep(&self, max_idle: Duration, every: Duration) {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let evicted = self.evict_idle(max_idle).await;
            if evicted > 0 {
                let open_forms = self.len().await;
                tracing::info!(evicted, open_forms, "idle review forms evicted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn forms_are_scoped_to_their_owner() {
        let registry = FormRegistry::new(5);
        let id = registry
            .create("alice", "Alice", Capabilities::default())
            .await
            .unwrap();

        assert!(registry.get(id, "alice").await.is_ok());
        assert!(matches!(registry.get(id, "bob").await, Err(AppError::Forbidden(_))));
        assert!(matches!(
            registry.get(Uuid::new_v4(), "alice").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn removed_forms_are_gone() {
        let registry = FormRegistry::new(5);
        let id = registry
            .create("alice", "Alice", Capabilities::default())
            .await
            .unwrap();
        assert_eq!(registry.len().await, 1);
        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn open_forms_are_capped_per_user() {
        let registry = FormRegistry::new(2);
        for _ in 0..2 {
            registry.create("alice", "Alice", Capabilities::default()).await.unwrap();
        }

        let refused = registry.create("alice", "Alice", Capabilities::default()).await;
        assert!(matches!(refused, Err(AppError::Conflict(_))));
        assert!(registry.create("bob", "Bob", Capabilities::default()).await.is_ok());
        assert_eq!(registry.len().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_forms_are_evicted_and_used_ones_kept() {
        let registry = FormRegistry::new(100);
        let idle = registry
            .create("alice", "Alice", Capabilities::default())
            .await
            .unwrap();
        let busy = registry
            .create("alice", "Alice", Capabilities::default())
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(40 * 60)).await;
        registry.get(busy, "alice").await.unwrap();
        tokio::time::advance(Duration::from_secs(30 * 60)).await;

        assert_eq!(registry.evict_idle(Duration::from_secs(60 * 60)).await, 1);
        assert!(matches!(registry.get(idle, "alice").await, Err(AppError::NotFound(_))));
        assert!(registry.get(busy, "alice").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn flood_of_abandoned_forms_is_reclaimed_by_the_sweep() {
        let registry = Arc::new(FormRegistry::new(usize::MAX));
        for i in 0..500 {
            let user = format!("user-{}", i % 50);
            registry.create(&user, &user, Capabilities::default()).await.unwrap();
        }

        let sweeper = registry.clone();
        tokio::spawn(async move {
            sweeper
                .sweep(Duration::from_secs(60), Duration::from_secs(10))
                .await
        });

        tokio::time::sleep(Duration::from_secs(75)).await;
        assert_eq!(registry.len().await, 0);
    }
}
