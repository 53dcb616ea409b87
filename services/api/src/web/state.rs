//! services/api/src/web/state.rs
//!
//! Defines the application's shared state: the advisor, the persisted course
//! collections, the course URL cache and the live chat sessions.

use course_advisor_core::{
    ports::{CompletionService, KeyValueStore, PortError, PortResult},
    AdvisorModels, ChatSession, Course, CourseAdvisor, CourseCollection, CourseKey,
    IdentityPolicy,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Namespace of the active saved-course list.
pub const SAVED_COURSES_NAMESPACE: &str = "saved-courses-storage";
/// Namespace of the legacy bookmark list.
pub const BOOKMARKS_NAMESPACE: &str = "course-bookmarks";

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub advisor: CourseAdvisor,
    pub url_cache: Arc<UrlCache>,
    pub saved_courses: Arc<CollectionStore>,
    pub bookmarks: Arc<CollectionStore>,
    pub chats: Arc<ChatSessions>,
}

impl AppState {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        store: Arc<dyn KeyValueStore>,
        models: AdvisorModels,
    ) -> Self {
        Self {
            advisor: CourseAdvisor::new(completion, models),
            url_cache: Arc::new(UrlCache::default()),
            saved_courses: Arc::new(CollectionStore::new(
                store.clone(),
                SAVED_COURSES_NAMESPACE,
                IdentityPolicy::Exact,
            )),
            bookmarks: Arc::new(CollectionStore::new(
                store,
                BOOKMARKS_NAMESPACE,
                IdentityPolicy::Slug,
            )),
            chats: Arc::new(ChatSessions::default()),
        }
    }
}

//=========================================================================================
// UrlCache
//=========================================================================================

/// Course URLs keyed by `(provider, title)`. Lives for the whole process and is
/// never evicted.
#[derive(Default)]
pub struct UrlCache {
    urls: RwLock<HashMap<CourseKey, String>>,
}

impl UrlCache {
    pub fn get(&self, title: &str, provider: &str) -> Option<String> {
        self.urls
            .read()
            .ok()?
            .get(&CourseKey::new(title, provider))
            .cloned()
    }

    pub fn insert(&self, title: &str, provider: &str, url: String) {
        if let Ok(mut urls) = self.urls.write() {
            urls.insert(CourseKey::new(title, provider), url);
        }
    }

    /// Forgets every cached URL. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        match self.urls.write() {
            Ok(mut urls) => urls.drain().count(),
            Err(_) => 0,
        }
    }
}

//=========================================================================================
// CollectionStore
//=========================================================================================

/// A course collection persisted as one JSON blob in a key-value namespace.
///
/// Every operation is a full read-modify-write, serialized by `write_lock`.
pub struct CollectionStore {
    store: Arc<dyn KeyValueStore>,
    namespace: &'static str,
    policy: IdentityPolicy,
    write_lock: Mutex<()>,
}

impl CollectionStore {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        namespace: &'static str,
        policy: IdentityPolicy,
    ) -> Self {
        Self {
            store,
            namespace,
            policy,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> PortResult<CourseCollection> {
        let courses = match self.store.get(self.namespace).await? {
            Some(blob) => serde_json::from_str::<Vec<Course>>(&blob).map_err(|e| {
                PortError::Unexpected(format!(
                    "Stored collection '{}' is unreadable: {}",
                    self.namespace, e
                ))
            })?,
            None => Vec::new(),
        };
        Ok(CourseCollection::from_courses(self.policy, courses))
    }

    async fn save(&self, collection: &CourseCollection) -> PortResult<()> {
        let blob = serde_json::to_string(collection.courses())
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.store.put(self.namespace, &blob).await
    }

    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut CourseCollection) -> T,
    ) -> PortResult<(T, Vec<Course>)> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.load().await?;
        let result = op(&mut collection);
        self.save(&collection).await?;
        debug!(namespace = self.namespace, size = collection.len(), "Collection updated");
        Ok((result, collection.into_courses()))
    }

    pub async fn courses(&self) -> PortResult<Vec<Course>> {
        Ok(self.load().await?.into_courses())
    }

    pub async fn is_saved(&self, course: &Course) -> PortResult<bool> {
        Ok(self.load().await?.is_saved(course))
    }

    pub async fn add(&self, course: Course) -> PortResult<Vec<Course>> {
        Ok(self.mutate(|c| c.add(course)).await?.1)
    }

    pub async fn remove(&self, course: &Course) -> PortResult<Vec<Course>> {
        Ok(self.mutate(|c| c.remove(course)).await?.1)
    }

    /// Returns whether the course is saved after the toggle, plus the new list.
    pub async fn toggle(&self, course: Course) -> PortResult<(bool, Vec<Course>)> {
        self.mutate(|c| c.toggle(course)).await
    }

    pub async fn clear(&self) -> PortResult<()> {
        self.mutate(|c| c.clear()).await?;
        info!(namespace = self.namespace, "Collection cleared");
        Ok(())
    }
}

//=========================================================================================
// ChatSessions
//=========================================================================================

/// One live chat session.
///
/// `session` is only locked for short reads and commits, never across a model
/// call. `turn` is held for a whole user turn so turns of one session run in order.
pub struct ChatSessionHandle {
    pub session: Mutex<ChatSession>,
    pub turn: Mutex<()>,
}

struct SessionEntry {
    handle: Arc<ChatSessionHandle>,
    last_active: Instant,
}

/// Live chat sessions. Held in memory only; idle ones are dropped by
/// [`ChatSessions::remove_idle`].
#[derive(Default)]
pub struct ChatSessions {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl ChatSessions {
    pub fn create(&self) -> Arc<ChatSessionHandle> {
        let session = ChatSession::new();
        let id = session.id;
        let handle = Arc::new(ChatSessionHandle {
            session: Mutex::new(session),
            turn: Mutex::new(()),
        });
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(
                id,
                SessionEntry {
                    handle: handle.clone(),
                    last_active: Instant::now(),
                },
            );
        }
        info!("Created chat session {}", id);
        handle
    }

    /// Looks up a session and marks it active.
    pub fn get(&self, id: Uuid) -> Option<Arc<ChatSessionHandle>> {
        let mut sessions = self.sessions.write().ok()?;
        let entry = sessions.get_mut(&id)?;
        entry.last_active = Instant::now();
        Some(entry.handle.clone())
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions
            .write()
            .map(|mut sessions| sessions.remove(&id).is_some())
            .unwrap_or(false)
    }

    /// Drops sessions unused for at least `max_idle`. Returns how many were dropped.
    pub fn remove_idle(&self, max_idle: Duration) -> usize {
        let Ok(mut sessions) = self.sessions.write() else {
            return 0;
        };
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_active.elapsed() < max_idle);
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "Swept idle chat sessions");
        }
        removed
    }
}
