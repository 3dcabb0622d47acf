//! View routing, load phases and load tickets.

use std::fmt;

use crate::model::Range;

/// Access context a view runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Admin views, backed by the token-protected routes.
    Authenticated,
    /// Read-only share views, backed by the public mirrors.
    Shared,
}

impl Scope {
    /// URL prefix of the pages of this scope.
    pub fn base_path(self) -> &'static str {
        match self {
            Scope::Authenticated => "/network",
            Scope::Shared => "/share/network",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Overview,
    Detail(i64),
}

impl Route {
    pub fn node_id(self) -> Option<i64> {
        match self {
            Route::Overview => None,
            Route::Detail(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
}

/// What a load was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadKey {
    pub scope: Scope,
    pub route: Route,
    pub range: Range,
}

impl fmt::Display for LoadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.route {
            Route::Overview => write!(f, "{}?range={}", self.scope.base_path(), self.range),
            Route::Detail(id) => write!(f, "{}/{}?range={}", self.scope.base_path(), id, self.range),
        }
    }
}

/// Issued when a load starts; its response is applied only while the
/// ticket is still the newest one issued by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    key: LoadKey,
}

impl LoadTicket {
    pub(super) fn new(generation: u64, key: LoadKey) -> Self {
        Self { generation, key }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn key(&self) -> LoadKey {
        self.key
    }
}

/// Transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_key_display() {
        let key = LoadKey { scope: Scope::Shared, route: Route::Detail(4), range: Range::SevenDays };
        assert_eq!(key.to_string(), "/share/network/4?range=7d");
        let key = LoadKey { scope: Scope::Authenticated, route: Route::Overview, range: Range::OneHour };
        assert_eq!(key.to_string(), "/network?range=1h");
    }
}
