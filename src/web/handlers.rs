//! HTTP request handlers.

use super::render::{self, scope_token};
use super::session::session_id;
use super::AppState;
use crate::model::Range;
use crate::view::{self, LoadKey, Route, Scope, Viewport};

use axum::{
    extract::{Form, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
};
use chrono::Utc;
use rust_embed::RustEmbed;
use serde::Deserialize;
use serde_json::Value;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Assets;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub range: Option<String>,
}

impl RangeQuery {
    fn resolve(&self, state: &AppState) -> Range {
        Range::parse_or(self.range.as_deref(), state.config.default_range)
    }
}

// ============================================================================
// Pages
// ============================================================================

pub async fn handle_root(State(state): State<AppState>) -> impl IntoResponse {
    if state.config.has_admin() {
        Redirect::temporary(Scope::Authenticated.base_path())
    } else {
        Redirect::temporary(Scope::Shared.base_path())
    }
}

pub async fn handle_overview(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Response {
    let range = query.resolve(&state);
    if !state.config.has_admin() {
        return to_share(Route::Overview, range);
    }
    load_page(&state, &headers, Scope::Authenticated, Route::Overview, range).await
}

pub async fn handle_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(query): Query<RangeQuery>,
) -> Response {
    let range = query.resolve(&state);
    if !state.config.has_admin() {
        return to_share(Route::Detail(id), range);
    }
    load_page(&state, &headers, Scope::Authenticated, Route::Detail(id), range).await
}

pub async fn handle_share_overview(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Response {
    let range = query.resolve(&state);
    load_page(&state, &headers, Scope::Shared, Route::Overview, range).await
}

pub async fn handle_share_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(query): Query<RangeQuery>,
) -> Response {
    let range = query.resolve(&state);
    load_page(&state, &headers, Scope::Shared, Route::Detail(id), range).await
}

fn to_share(route: Route, range: Range) -> Response {
    let base = Scope::Shared.base_path();
    let target = match route {
        Route::Overview => format!("{}?range={}", base, range),
        Route::Detail(id) => format!("{}/{}?range={}", base, id, range),
    };
    Redirect::temporary(&target).into_response()
}

/// Drive one load of the session's view and render the page requested.
///
/// The session lock is released while the backend is being queried. When
/// another page of the same session started a load in the meantime, the
/// session's view keeps tracking that newer load and this request renders
/// its own outcome through a detached view.
async fn load_page(state: &AppState, headers: &HeaderMap, scope: Scope, route: Route, range: Range) -> Response {
    let opened = state.sessions.open(session_id(headers).as_deref()).await;
    let ticket = opened.session.lock().await.view_mut(scope).open(route, range);

    let outcome = view::fetch(&state.api, &ticket).await;

    let now_ms = Utc::now().timestamp_millis();
    let mut session = opened.session.lock().await;
    let view = session.view_mut(scope);
    let body = if view.is_current(&ticket) {
        view.complete(ticket, outcome);
        let notices = view.take_notices();
        render::page(view, &notices, now_ms)
    } else {
        tracing::debug!("Request for {} superseded by {} in its session", ticket.key(), view.key());
        let mut own = view.detached();
        let own_ticket = own.show(route, range);
        own.complete(own_ticket, outcome);
        let notices = own.take_notices();
        render::page(&own, &notices, now_ms)
    };
    drop(session);

    opened.attach(Html(body).into_response())
}

// ============================================================================
// Billing cycle override
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CycleForm {
    pub node_id: i64,
    /// Empty or non-numeric clears the override.
    #[serde(default)]
    pub days: String,
    #[serde(default)]
    pub range: Option<String>,
}

pub async fn handle_cycle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CycleForm>,
) -> Response {
    let range = Range::parse_or(form.range.as_deref(), state.config.default_range);
    if !state.config.has_admin() {
        return to_share(Route::Overview, range);
    }

    let days = form.days.trim().parse::<u32>().ok();
    let opened = state.sessions.open(session_id(&headers).as_deref()).await;
    opened
        .session
        .lock()
        .await
        .view_mut(Scope::Authenticated)
        .set_cycle_override(form.node_id, days);
    tracing::info!("Billing cycle override for node {} set to {:?}", form.node_id, days);

    let back = format!("{}?range={}", Scope::Authenticated.base_path(), range);
    opened.attach(Redirect::to(&back).into_response())
}

// ============================================================================
// API: Resize
// ============================================================================

/// Viewport change of one rendered page, identified by the load key it
/// was rendered for.
#[derive(Debug, Deserialize)]
pub struct ResizeRequest {
    pub scope: String,
    #[serde(default)]
    pub node: Option<i64>,
    pub range: String,
    pub width: u32,
    pub height: u32,
}

pub async fn handle_resize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ResizeRequest>,
) -> Response {
    let scope = match req.scope.as_str() {
        s if s == scope_token(Scope::Authenticated) => Scope::Authenticated,
        s if s == scope_token(Scope::Shared) => Scope::Shared,
        _ => return (StatusCode::BAD_REQUEST, "Invalid scope").into_response(),
    };
    let Some(range) = Range::from_token(&req.range) else {
        return (StatusCode::BAD_REQUEST, "Invalid range").into_response();
    };
    if req.width == 0 || req.height == 0 {
        return (StatusCode::BAD_REQUEST, "Invalid viewport").into_response();
    }
    let key = LoadKey { scope, route: req.node.map_or(Route::Overview, Route::Detail), range };

    let Some(session) = session_id(&headers) else {
        return Json(Value::Null).into_response();
    };
    let Some(session) = state.sessions.find(&session).await else {
        return Json(Value::Null).into_response();
    };

    let mut session = session.lock().await;
    let view = session.view_mut(scope);
    if view.key() != key {
        tracing::debug!("Resize for {} ignored, session shows {}", key, view.key());
        return Json(Value::Null).into_response();
    }

    view.resize_hub().publish(Viewport { width: req.width, height: req.height });
    if view.handle_resize() {
        tracing::debug!("Re-rendered {} at {}x{}", key, req.width, req.height);
    }
    Json(view.surface().map(|s| s.option().clone())).into_response()
}

pub async fn handle_health() -> &'static str {
    "ok"
}

// ============================================================================
// Static Assets
// ============================================================================

pub async fn handle_asset(Path(path): Path<String>) -> Response {
    match Assets::get(&path) {
        Some(file) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref().to_string())], file.data).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}
