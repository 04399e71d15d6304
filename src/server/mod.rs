//! Blog server - JSON post API, embedded reader assets, and live reload

mod assets;

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path as AxumPath, Query, State, WebSocketUpgrade,
    },
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::archive::{self, ArchiveGroup};
use crate::content::{analyze, IndexLoader, MarkdownRenderer, PostIndex, PostSummary, TocEntry};
use crate::engine::{self, FilterState, SortKey, TagFilter};
use crate::error::BlogError;
use crate::Inkpress;

/// Live reload script injected into served HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Shared server state
struct ServerState {
    /// The loaded index; replaced wholesale when the posts directory changes
    index: RwLock<PostIndex>,
    loader: IndexLoader,
    renderer: MarkdownRenderer,
    config: crate::config::SiteConfig,
    site_dir: PathBuf,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Start the blog server
pub async fn start(app: &Inkpress, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let loader = IndexLoader::new(&app.posts_dir, &app.config.index_file);
    let index = loader.load()?;
    tracing::info!("Loaded {} posts", index.len());

    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        index: RwLock::new(index),
        loader,
        renderer: MarkdownRenderer::new(app.config.highlight.clone()),
        config: app.config.clone(),
        site_dir: app.site_dir.clone(),
        reload_tx: reload_tx.clone(),
        live_reload: watch,
    });

    let router = Router::new()
        .route("/api/posts", get(api_posts))
        .route("/api/posts/:id", get(api_post_detail))
        .route("/api/search", get(api_search))
        .route("/api/archive", get(api_archive))
        .route("/api/config", get(api_config))
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let posts_dir = app.posts_dir.clone();
        let watch_state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = watch_and_reload(posts_dir, watch_state, reload_tx).await {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Watch the posts directory, reload the index, and notify clients
///
/// A failed reload leaves the previously served index untouched.
async fn watch_and_reload(
    posts_dir: PathBuf,
    state: Arc<ServerState>,
    reload_tx: broadcast::Sender<()>,
) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if posts_dir.exists() {
        debouncer
            .watcher()
            .watch(&posts_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", posts_dir);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|e| {
                    let path_str = e.path.to_string_lossy();
                    !path_str.contains(".git") && !path_str.ends_with('~')
                });
                if !relevant {
                    continue;
                }

                match state.loader.load() {
                    Ok(new_index) => {
                        let count = new_index.len();
                        *state.index.write().await = new_index;
                        tracing::info!("Reloaded index, {} posts", count);
                        let _ = reload_tx.send(());
                    }
                    Err(e) => {
                        tracing::error!("Index reload failed, keeping previous index: {}", e);
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// JSON error body with the HTTP status it maps to
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<BlogError> for ApiError {
    fn from(err: BlogError) -> Self {
        let status = match &err {
            BlogError::NotFound(_) => StatusCode::NOT_FOUND,
            BlogError::InvalidDate { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            BlogError::Fetch { .. } => StatusCode::SERVICE_UNAVAILABLE,
            BlogError::Parse { .. } | BlogError::DuplicateId(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Deserialize)]
struct ListParams {
    tag: Option<String>,
    q: Option<String>,
    sort: Option<String>,
}

/// Listing payload; `total` makes an empty result explicit
#[derive(Serialize)]
struct ListResponse {
    posts: Vec<PostSummary>,
    tags: Vec<String>,
    total: usize,
}

/// GET /api/posts?tag=&q=&sort=
async fn api_posts(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let sort_key = match params.sort.as_deref() {
        None | Some("") => SortKey::default(),
        Some(value) => value.parse().map_err(ApiError::bad_request)?,
    };

    let filter = FilterState {
        selected_tag: TagFilter::from_param(params.tag.as_deref()),
        search_query: params.q.unwrap_or_default(),
        sort_key,
    };

    let index = state.index.read().await;
    let posts = engine::apply(&index.posts, &filter);
    let total = posts.len();

    Ok(Json(ListResponse {
        posts,
        tags: index.tags.clone(),
        total,
    }))
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

/// GET /api/search?q=
///
/// Same predicate as the listing filter, so server-side search stays
/// consistent with the client-side one.
async fn api_search(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let filter = FilterState {
        search_query: params.q,
        ..Default::default()
    };

    let index = state.index.read().await;
    let posts = engine::apply(&index.posts, &filter);
    let total = posts.len();

    Ok(Json(ListResponse {
        posts,
        tags: index.tags.clone(),
        total,
    }))
}

/// Detail payload for one post
#[derive(Serialize)]
struct DetailResponse {
    id: String,
    title: String,
    date: String,
    excerpt: String,
    tags: Vec<String>,
    html: String,
    word_count: u32,
    reading_minutes: u32,
    toc: Vec<TocEntry>,
    /// Newer neighbour in index order, for keyboard navigation
    prev: Option<String>,
    /// Older neighbour in index order
    next: Option<String>,
}

/// GET /api/posts/{id}
async fn api_post_detail(
    State(state): State<Arc<ServerState>>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<DetailResponse>, ApiError> {
    let index = state.index.read().await;
    let summary = index.find(&id)?.clone();
    let (prev, next) = index.neighbors(&id);
    let (prev, next) = (prev.map(String::from), next.map(String::from));
    drop(index);

    let body = state.loader.load_body(&summary)?;
    let stats = analyze::analyze_with_speed(&body, state.config.words_per_minute);
    let rendered = state
        .renderer
        .render(&body)
        .map_err(|e| ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: e.to_string(),
        })?;

    Ok(Json(DetailResponse {
        id: summary.id,
        title: summary.title,
        date: summary.date,
        excerpt: summary.excerpt,
        tags: summary.tags,
        html: rendered.html,
        word_count: stats.word_count,
        reading_minutes: stats.reading_minutes,
        toc: rendered.toc,
        prev,
        next,
    }))
}

#[derive(Serialize)]
struct ArchiveEntry {
    year: i32,
    month: u32,
    label: String,
    posts: Vec<PostSummary>,
}

#[derive(Serialize)]
struct ArchiveResponse {
    groups: Vec<ArchiveEntry>,
    total: usize,
}

/// GET /api/archive
async fn api_archive(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ArchiveResponse>, ApiError> {
    let index = state.index.read().await;
    let total = index.len();
    let groups = archive::group(&index.posts)?;

    Ok(Json(ArchiveResponse {
        groups: groups.into_iter().map(to_entry).collect(),
        total,
    }))
}

fn to_entry(group: ArchiveGroup) -> ArchiveEntry {
    let label = group.label();
    ArchiveEntry {
        year: group.year,
        month: group.month,
        label,
        posts: group.posts,
    }
}

#[derive(Serialize)]
struct ConfigResponse {
    title: String,
    subtitle: String,
    description: String,
    author: String,
    language: String,
    default_theme: String,
}

/// GET /api/config - the site fields the reader pages need
async fn api_config(State(state): State<Arc<ServerState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        title: state.config.title.clone(),
        subtitle: state.config.subtitle.clone(),
        description: state.config.description.clone(),
        author: state.config.author.clone(),
        language: state.config.language.clone(),
        default_theme: state.config.default_theme.clone(),
    })
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve site-directory overrides first, then the embedded reader assets
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let path = request.uri().path().to_string();

    // User files in the site directory shadow the embedded defaults
    if state.site_dir.exists() {
        let candidate = state.site_dir.join(path.trim_start_matches('/'));
        if candidate.is_file() {
            let mut service = ServeDir::new(&state.site_dir).append_index_html_on_directories(true);
            if let Ok(response) = service.try_call(request).await {
                return response.into_response();
            }
            return (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response();
        }
    }

    match assets::lookup(&path) {
        Some((content_type, body)) => {
            let body = if content_type.starts_with("text/html") && state.live_reload {
                inject_live_reload(body)
            } else {
                body.to_string()
            };
            ([(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let err: ApiError = BlogError::NotFound("x".into()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: ApiError = BlogError::InvalidDate {
            id: "x".into(),
            date: "bad".into(),
        }
        .into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);

        let err: ApiError = BlogError::Fetch {
            path: "missing.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        }
        .into();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_inject_live_reload() {
        let html = "<html><body>hi</body></html>";
        let injected = inject_live_reload(html);
        assert!(injected.contains("__livereload"));
        assert!(injected.ends_with("</html>"));
    }
}
