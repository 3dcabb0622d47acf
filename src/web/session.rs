//! Per-browser dashboard sessions.
//!
//! Each browser gets its own pair of views (admin and share), so load
//! tickets, mounted charts, resize events and cycle overrides never cross
//! between clients. Sessions are identified by a random cookie and expire
//! after a period of inactivity.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use tokio::sync::Mutex;

use crate::model::Range;
use crate::view::{EchartsEngine, ResizeHub, Scope, TelemetryView};

pub const SESSION_COOKIE: &str = "panelwatch_session";

const SESSION_TTL: Duration = Duration::from_secs(30 * 60);
const MAX_SESSIONS: usize = 1024;

pub type PageView = TelemetryView<EchartsEngine>;

pub struct Session {
    admin: PageView,
    share: PageView,
}

impl Session {
    fn new(range: Range) -> Self {
        Self {
            admin: TelemetryView::new(Scope::Authenticated, EchartsEngine, ResizeHub::default(), range),
            share: TelemetryView::new(Scope::Shared, EchartsEngine, ResizeHub::default(), range),
        }
    }

    pub fn view_mut(&mut self, scope: Scope) -> &mut PageView {
        match scope {
            Scope::Authenticated => &mut self.admin,
            Scope::Shared => &mut self.share,
        }
    }
}

struct Entry {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
}

/// A session handed to a request.
pub struct OpenSession {
    pub id: String,
    pub session: Arc<Mutex<Session>>,
    /// Whether the id is new and has to be sent back as a cookie.
    pub created: bool,
}

impl OpenSession {
    /// Attach the session cookie to `response` when it was just issued.
    pub fn attach(&self, mut response: Response) -> Response {
        if self.created {
            match HeaderValue::from_str(&session_cookie(&self.id)) {
                Ok(value) => {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => tracing::error!("Invalid session cookie: {}", e),
            }
        }
        response
    }
}

#[derive(Clone)]
pub struct SessionStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    default_range: Range,
    ttl: Duration,
    capacity: usize,
}

impl SessionStore {
    pub fn new(default_range: Range) -> Self {
        Self::with_limits(default_range, SESSION_TTL, MAX_SESSIONS)
    }

    pub fn with_limits(default_range: Range, ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            default_range,
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Session for `id`, or a new one when the id is missing or unknown.
    /// Client-chosen ids are never adopted.
    pub async fn open(&self, id: Option<&str>) -> OpenSession {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        if let Some(id) = id {
            if let Some(entry) = entries.get_mut(id) {
                if now.duration_since(entry.last_seen) < self.ttl {
                    entry.last_seen = now;
                    return OpenSession { id: id.to_string(), session: entry.session.clone(), created: false };
                }
            }
        }

        self.prune(&mut entries, now);
        let id = new_session_id();
        let session = Arc::new(Mutex::new(Session::new(self.default_range)));
        entries.insert(id.clone(), Entry { session: session.clone(), last_seen: now });
        tracing::debug!("Opened session ({} active)", entries.len());

        OpenSession { id, session, created: true }
    }

    /// Existing, unexpired session for `id`.
    pub async fn find(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let entry = entries.get_mut(id).filter(|e| now.duration_since(e.last_seen) < self.ttl)?;
        entry.last_seen = now;
        Some(entry.session.clone())
    }

    /// Drop expired sessions, then the least recently seen ones until
    /// there is room for one more.
    fn prune(&self, entries: &mut HashMap<String, Entry>, now: Instant) {
        entries.retain(|_, e| now.duration_since(e.last_seen) < self.ttl);
        while entries.len() >= self.capacity {
            let oldest = entries.iter().min_by_key(|(_, e)| e.last_seen).map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    entries.remove(&id);
                }
                None => break,
            }
        }
    }
}

fn new_session_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

pub fn session_cookie(id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

/// Session id from the request's `Cookie` headers.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
