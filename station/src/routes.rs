//! Control-plane HTTP API.
//!
//! Thin handlers that delegate to the stores and the replan pipeline.
//! Responses are `{ok, ...}` JSON envelopes; failures return 500 with
//! `{ok:false, error}` and never take the server down. Anything that is
//! not an API path is served as a static file from the base directory.

use crate::{i18n, replan, AppState};
use axum::extract::{Form, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::collections::HashMap;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::warn;

/// Cap on name-search results.
const MAX_NAME_RESULTS: usize = 200;

pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(state.paths.base.clone());
    Router::new()
        .route("/api/settings", get(get_settings).post(post_settings))
        .route("/api/tle_names", get(tle_names))
        .route("/api/satlist", get(get_satlist).post(post_satlist))
        .route("/api/tle_txt", get(tle_txt))
        .route("/api/tle_manual", axum::routing::post(tle_manual))
        .route("/api/replan", get(run_replan))
        .route("/api/cleanup", get(run_cleanup))
        .route("/api/select", get(select))
        .route("/api/lang", get(switch_lang))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_settings(State(state): State<AppState>) -> Json<serde_json::Value> {
    let settings = state.settings.read().await.clone();
    Json(json!(settings))
}

async fn post_settings(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let mut updated = state.settings.read().await.clone();
    updated.apply_form(&form);

    // Persist first, then swap the in-memory snapshot.
    if let Err(e) = updated.save(&state.paths.settings()) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"ok": false, "error": e.to_string()})),
        )
            .into_response();
    }
    *state.catalog.write().await = i18n::load(&state.paths.lang_dir(), &updated.lang);
    *state.settings.write().await = updated.clone();

    Json(json!({"ok": true, "saved": updated})).into_response()
}

async fn tle_names(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    let q = params.get("q").map(|s| s.trim().to_uppercase()).unwrap_or_default();
    let mut names = state.tle().names();
    if !q.is_empty() {
        names.retain(|n| n.to_uppercase().contains(&q));
    }
    names.truncate(MAX_NAME_RESULTS);
    Json(json!({"ok": true, "names": names}))
}

async fn get_satlist(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({"ok": true, "list": state.satlist().read()}))
}

async fn post_satlist(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    let op = form.get("op").map(String::as_str).unwrap_or("");
    let name = form.get("name").map(|s| s.trim()).unwrap_or("");

    let store = state.satlist();
    let mut list = store.read();
    let mut changed = false;

    match op {
        // Only names present in the TLE catalog may be added.
        "add" if !name.is_empty() => {
            if !list.iter().any(|n| n == name) && state.tle().names().iter().any(|n| n == name) {
                list.push(name.to_string());
                changed = true;
            }
        }
        "remove" if !name.is_empty() => {
            let before = list.len();
            list.retain(|n| n != name);
            changed = list.len() != before;
        }
        _ => {}
    }

    let ok = if changed { store.write(&list) } else { true };
    Json(json!({"ok": ok, "list": list}))
}

async fn tle_txt(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.tle().read_text() {
        Ok(text) => Json(json!({"ok": true, "text": text})),
        Err(_) => Json(json!({"ok": false, "text": ""})),
    }
}

async fn tle_manual(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let data = form.get("data").map(String::as_str).unwrap_or("");
    match state.tle().save_text(data) {
        Ok(()) => Json(json!({"ok": true, "msg": "saved"})).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"ok": false, "msg": e.to_string()})),
        )
            .into_response(),
    }
}

async fn run_replan(State(state): State<AppState>) -> Response {
    match replan::replan_and_refresh(&state).await {
        Ok(count) => Json(json!({"ok": true, "count": count})).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"ok": false, "error": format!("{:#}", e)})),
        )
            .into_response(),
    }
}

async fn run_cleanup(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    let settings = state.settings.read().await.clone();
    let days = params
        .get("days")
        .and_then(|d| d.trim().parse::<i64>().ok())
        .unwrap_or(settings.gallery_keep_days);

    let zone = pass_scheduler::LocalZone::parse(&settings.timezone);
    let current_id = state.current().read();
    let stats = state.gallery(&settings).cleanup(days, &current_id, &zone);

    if let Err(e) = replan::render_current(&state).await {
        warn!("page refresh after cleanup failed: {:#}", e);
    }

    Json(json!({"ok": true, "days": days, "result": stats}))
}

async fn select(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    let op = params.get("op").map(String::as_str).unwrap_or("add");
    let id = params.get("id").map(|s| s.trim()).unwrap_or("");

    let store = state.selection();
    let ids = match op {
        "clear" => store.clear(),
        "remove" => store.remove(id),
        _ => store.add(id),
    };
    Json(json!({"ok": true, "ids": ids}))
}

async fn switch_lang(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let code = match params.get("code").map(|c| c.to_lowercase()) {
        Some(c) if c == "en" => "en",
        _ => "lt",
    };

    let mut updated = state.settings.read().await.clone();
    updated.lang = code.to_string();
    if let Err(e) = updated.save(&state.paths.settings()) {
        warn!("failed to persist language change: {}", e);
    }
    *state.catalog.write().await = i18n::load(&state.paths.lang_dir(), code);
    *state.settings.write().await = updated;

    if let Err(e) = replan::render_current(&state).await {
        warn!("page refresh after language change failed: {:#}", e);
    }

    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("/index.html")
        .to_string();
    (StatusCode::FOUND, [(header::LOCATION, referer)]).into_response()
}
