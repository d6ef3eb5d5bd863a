mod assets;

use std::{
    convert::Infallible,
    net::SocketAddr,
    path::{Path as FsPath, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{error, info, warn};

use crate::{
    criteria::{Selection, TOOL_TIERS},
    error::UpdateError,
    locations::{SEASONS, WEATHERS},
    render::{escape_html, Layout},
    service::{TableService, UpdateOutcome},
};

#[derive(Clone)]
struct AppState {
    service: Arc<TableService>,
    broadcaster: broadcast::Sender<String>,
    icons_dir: Arc<PathBuf>,
}

pub struct WebServerConfig {
    pub service: TableService,
    pub icons_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

pub fn router(service: Arc<TableService>, icons_dir: PathBuf) -> Router {
    let (tx, _) = broadcast::channel::<String>(64);
    let state = AppState {
        service,
        broadcaster: tx,
        icons_dir: Arc::new(icons_dir),
    };

    Router::new()
        .route("/", get(index))
        .route("/styles.css", get(styles))
        .route("/app.js", get(script))
        .route("/icons/:name", get(icon))
        .route("/api/options", get(options))
        .route("/api/preferences", get(preferences))
        .route("/api/update", post(update))
        .route("/api/results", get(latest_results))
        .route("/api/events", get(stream_events))
        .with_state(state)
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        service,
        icons_dir,
        host,
        port,
    } = config;

    let router = router(Arc::new(service), icons_dir);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "fish table live at http://{addr} (Ctrl+C to stop)");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down web UI");
}

async fn index() -> Html<&'static str> {
    Html(assets::INDEX_HTML)
}

async fn styles() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        assets::STYLES_CSS,
    )
}

async fn script() -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        assets::APP_JS,
    )
}

fn icon_name_is_safe(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn icon_content_type(name: &str) -> &'static str {
    match FsPath::new(name).extension().and_then(|ext| ext.to_str()) {
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

async fn icon(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    if !icon_name_is_safe(&name) {
        return StatusCode::NOT_FOUND.into_response();
    }
    match tokio::fs::read(state.icons_dir.join(&name)).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, icon_content_type(&name))],
            Body::from(Bytes::from(bytes)),
        )
            .into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Serialize)]
struct ToolOption {
    label: &'static str,
    power: u32,
}

#[derive(Serialize)]
struct OptionsResponse {
    tools: Vec<ToolOption>,
    seasons: &'static [&'static str],
    weathers: &'static [&'static str],
    layout: Layout,
}

async fn options(State(state): State<AppState>) -> Json<OptionsResponse> {
    Json(OptionsResponse {
        tools: TOOL_TIERS
            .iter()
            .map(|(label, power)| ToolOption {
                label: *label,
                power: *power,
            })
            .collect(),
        seasons: &SEASONS,
        weathers: &WEATHERS,
        layout: state.service.layout(),
    })
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    html: String,
}

fn failure(status: StatusCode, message: String) -> Response {
    let html = format!("<p class=\"error\">{}</p>\n", escape_html(&message));
    (status, Json(ErrorBody { error: message, html })).into_response()
}

async fn preferences(State(state): State<AppState>) -> Response {
    match state.service.selection() {
        Ok(selection) => Json(selection).into_response(),
        Err(err) => failure(StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}")),
    }
}

async fn update(State(state): State<AppState>, Json(selection): Json<Selection>) -> Response {
    let service = Arc::clone(&state.service);
    let outcome = tokio::task::spawn_blocking(move || service.update(selection)).await;

    match outcome {
        Ok(Ok(UpdateOutcome::Committed(result))) => {
            if let Ok(payload) = serde_json::to_string(&result) {
                let _ = state.broadcaster.send(payload);
            }
            Json(result).into_response()
        }
        Ok(Ok(UpdateOutcome::Stale(result))) => {
            (StatusCode::CONFLICT, Json(result)).into_response()
        }
        Ok(Err(err)) => {
            warn!(error = %err, "update failed");
            let (status, message) = update_failure(&err);
            failure(status, message)
        }
        Err(err) => {
            error!(error = ?err, "update task failed");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Update task failed".to_string(),
            )
        }
    }
}

fn update_failure(err: &UpdateError) -> (StatusCode, String) {
    match err {
        UpdateError::Catalog(err) => (
            StatusCode::BAD_GATEWAY,
            format!("Could not load fish data: {err}"),
        ),
        UpdateError::Preferences(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Could not save preferences: {err}"),
        ),
        UpdateError::Poisoned => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not save preferences: store unavailable".to_string(),
        ),
    }
}

async fn latest_results(State(state): State<AppState>) -> Response {
    match state.service.latest() {
        Some(result) => Json(result).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_names_cannot_escape_the_directory() {
        assert!(icon_name_is_safe("item_icon_12a.png"));
        assert!(icon_name_is_safe("weather_sunny.png"));
        assert!(!icon_name_is_safe("../secret.png"));
        assert!(!icon_name_is_safe(".hidden"));
        assert!(!icon_name_is_safe("a/b.png"));
        assert!(!icon_name_is_safe(""));
    }

    #[test]
    fn update_failures_name_their_cause() {
        let catalog = UpdateError::from(crate::error::CatalogError::Io {
            path: PathBuf::from("fish.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        });
        let (status, message) = update_failure(&catalog);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(message.starts_with("Could not load fish data"));

        let prefs = UpdateError::from(crate::error::PreferenceError::Io {
            path: PathBuf::from("preferences.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        });
        let (status, message) = update_failure(&prefs);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(message.starts_with("Could not save preferences"));
        assert!(!message.contains("fish data"));
    }

    #[test]
    fn live_events_carry_the_selection_and_the_page_applies_it() {
        let service = TableService::new(
            crate::service::CatalogSource::Cached(Arc::new(Vec::new())),
            Layout::Compact,
            Box::new(crate::prefs::MemoryPreferenceStore::default()),
        );
        let UpdateOutcome::Committed(result) = service
            .update(Selection {
                toollevel: "gold".into(),
                season: "winter".into(),
                weather: "rainy".into(),
            })
            .unwrap()
        else {
            panic!("first update commits");
        };
        let payload: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&result).unwrap()).unwrap();
        assert_eq!(payload["selection"]["weather"], "rainy");
        assert_eq!(payload["selection"]["toollevel"], "gold");
        assert!(assets::APP_JS.contains("applySelection(result.selection)"));
    }

    #[test]
    fn icon_types_follow_extension() {
        assert_eq!(icon_content_type("a.png"), "image/png");
        assert_eq!(icon_content_type("a.svg"), "image/svg+xml");
    }
}
