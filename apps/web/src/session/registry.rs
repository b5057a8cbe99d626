use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::{HeaderMap, HeaderName, COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::search::SearchParams;
use crate::notify::ToastQueue;
use crate::session::store::SessionStore;

pub const TAB_COOKIE: &str = "jt_tab";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(Uuid);

impl TabId {
    fn new() -> Self {
        TabId(Uuid::new_v4())
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Logical operations that may only have one request in flight per tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flight {
    Upload,
    Search,
}

/// Everything a tab owns that handlers read or mutate.
#[derive(Debug)]
pub struct TabState {
    pub store: SessionStore,
    pub toasts: ToastQueue,
    /// Last search submitted from this tab, used to prefill the form.
    pub draft: SearchParams,
    last_seen: Instant,
}

impl TabState {
    fn new() -> Self {
        Self {
            store: SessionStore::default(),
            toasts: ToastQueue::default(),
            draft: SearchParams::default(),
            last_seen: Instant::now(),
        }
    }
}

/// One browser tab's slice of server-side state.
///
/// The state mutex is never held across a backend call: handlers snapshot
/// what they need, release it, await the network, then lock again.
#[derive(Debug)]
pub struct Tab {
    id: TabId,
    state: Mutex<TabState>,
    uploading: AtomicBool,
    searching: AtomicBool,
}

impl Tab {
    fn new() -> Self {
        Self {
            id: TabId::new(),
            state: Mutex::new(TabState::new()),
            uploading: AtomicBool::new(false),
            searching: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    /// Locks the tab state and marks the tab as recently used.
    pub async fn lock(&self) -> MutexGuard<'_, TabState> {
        let mut state = self.state.lock().await;
        state.last_seen = Instant::now();
        state
    }

    fn flag(&self, flight: Flight) -> &AtomicBool {
        match flight {
            Flight::Upload => &self.uploading,
            Flight::Search => &self.searching,
        }
    }

    pub fn is_busy(&self, flight: Flight) -> bool {
        self.flag(flight).load(Ordering::Acquire)
    }

    /// Claims the single-flight slot for `flight`, or `None` if a request of
    /// that kind is already running for this tab. The slot is released when
    /// the guard drops, including when the owning request is cancelled.
    pub fn try_begin(self: &Arc<Self>, flight: Flight) -> Option<FlightGuard> {
        self.flag(flight)
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                tab: Arc::clone(self),
                flight,
            })
    }

    pub fn set_cookie(&self) -> String {
        format!("{TAB_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.id)
    }

    /// No upload or search is running for this tab.
    fn is_idle(&self) -> bool {
        !self.is_busy(Flight::Upload) && !self.is_busy(Flight::Search)
    }

    async fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.state.lock().await.last_seen)
    }
}

#[derive(Debug)]
pub struct FlightGuard {
    tab: Arc<Tab>,
    flight: Flight,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.tab.flag(self.flight).store(false, Ordering::Release);
    }
}

/// Owns every live tab, keyed by the `jt_tab` cookie.
#[derive(Debug, Default)]
pub struct TabRegistry {
    tabs: RwLock<HashMap<TabId, Arc<Tab>>>,
}

impl TabRegistry {
    /// Returns the tab named by the request cookie, creating a fresh one when
    /// the cookie is missing, malformed or refers to an expired tab.
    pub async fn resolve(&self, headers: &HeaderMap) -> Arc<Tab> {
        if let Some(id) = tab_id_from_cookies(headers) {
            if let Some(tab) = self.tabs.read().await.get(&id) {
                return Arc::clone(tab);
            }
        }

        let tab = Arc::new(Tab::new());
        self.tabs.write().await.insert(tab.id, Arc::clone(&tab));
        debug!(tab = %tab.id, "opened tab");
        tab
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.tabs.read().await.len()
    }

    /// Drops tabs untouched for longer than `max_idle`. Tabs with a request
    /// in flight are kept. Returns how many were removed.
    pub async fn purge_idle(&self, max_idle: Duration) -> usize {
        let candidates: Vec<Arc<Tab>> = self.tabs.read().await.values().cloned().collect();

        let now = Instant::now();
        let mut expired = Vec::new();
        for tab in candidates {
            if !tab.is_idle() {
                continue;
            }
            if tab.idle_for(now).await > max_idle {
                expired.push(tab);
            }
        }

        if expired.is_empty() {
            return 0;
        }

        // A tab may have been used while we waited for the write lock.
        let mut tabs = self.tabs.write().await;
        let now = Instant::now();
        let mut removed = 0;
        for tab in expired {
            if tab.is_idle() && tab.idle_for(now).await > max_idle {
                tabs.remove(&tab.id);
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, remaining = tabs.len(), "purged idle tabs");
        }
        removed
    }
}

fn tab_id_from_cookies(headers: &HeaderMap) -> Option<TabId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TAB_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
        .map(TabId)
}

/// Extractor handing a handler the tab that issued the request.
pub struct CurrentTab(pub Arc<Tab>);

impl CurrentTab {
    /// Response header that (re)binds the browser to this tab.
    pub fn cookie(&self) -> [(HeaderName, String); 1] {
        [(SET_COOKIE, self.0.set_cookie())]
    }
}

impl Deref for CurrentTab {
    type Target = Arc<Tab>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentTab
where
    Arc<TabRegistry>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let registry = Arc::<TabRegistry>::from_ref(state);
        Ok(CurrentTab(registry.resolve(&parts.headers).await))
    }
}
