//! HTTP server: compiled posts API, contact endpoint and static files

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::path::{Component, Path as FsPath, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::contact::{ContactHandler, ContactOutcome, ContactSubmission};
use crate::content::{ContentStore, Post, PostSummary};
use crate::Portfolio;

/// Shared request state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ContentStore>,
    pub contact: Arc<ContactHandler>,
}

impl AppState {
    pub fn new(store: Arc<ContentStore>, contact: ContactHandler) -> Self {
        Self {
            store,
            contact: Arc::new(contact),
        }
    }
}

/// Build the application router; unmatched paths are served from `public_dir`
pub fn router(state: AppState, public_dir: PathBuf) -> Router {
    Router::new()
        .route("/api/contact", post(contact_handler))
        .route("/api/posts", get(posts_handler))
        .route("/api/posts/*slug", get(post_handler))
        .route("/api/tags", get(tags_handler))
        .route("/api/tags/:tag", get(tag_posts_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Compile the content, then serve until interrupted
pub async fn start(portfolio: &Portfolio, ip: &str, port: u16, watch: bool) -> Result<()> {
    let posts = portfolio.compile()?;
    tracing::info!("Compiled {} posts", posts.len());
    let store = Arc::new(ContentStore::new(posts));

    let contact = ContactHandler::from_config(&portfolio.config.contact);
    let app = router(
        AppState::new(store.clone(), contact),
        portfolio.public_dir.clone(),
    );

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", ip, port))?;

    println!("Server running at http://{}:{}", ip, port);
    if watch {
        println!("Watching {} for changes...", portfolio.content_dir.display());
        let portfolio = portfolio.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_recompile(&portfolio, &store) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Recompile on content changes; only a successful pass replaces the served collection
fn watch_and_recompile(portfolio: &Portfolio, store: &ContentStore) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if portfolio.content_dir.exists() {
        debouncer
            .watcher()
            .watch(&portfolio.content_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", portfolio.content_dir);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                if !events.iter().any(|e| is_relevant_change(&e.path)) {
                    continue;
                }

                for event in &events {
                    tracing::debug!("File changed: {}", event.path.display());
                }

                match portfolio.compile() {
                    Ok(posts) => store.replace(posts),
                    Err(e) => {
                        tracing::error!("Recompilation failed, keeping previous content:\n{}", e)
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

/// Ignore VCS internals, Finder metadata and editor backups
fn is_relevant_change(path: &FsPath) -> bool {
    let in_git_dir = path
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == ".git"));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    !in_git_dir && file_name != ".DS_Store" && !file_name.ends_with('~')
}

async fn contact_handler(
    State(state): State<AppState>,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> ContactOutcome {
    match payload {
        Ok(Json(submission)) => state.contact.handle(submission).await,
        Err(rejection) => {
            tracing::info!("Contact request rejected: {}", rejection.body_text());
            ContactOutcome::Malformed
        }
    }
}

#[derive(Serialize)]
struct PostsIndex<'a> {
    featured: Vec<PostSummary<'a>>,
    posts: Vec<PostSummary<'a>>,
}

async fn posts_handler(State(state): State<AppState>) -> Response {
    let posts = state.store.load();
    let (featured, rest) = posts.partition_featured();
    Json(PostsIndex {
        featured: featured.into_iter().map(Post::summary).collect(),
        posts: rest.into_iter().map(Post::summary).collect(),
    })
    .into_response()
}

#[derive(Serialize)]
struct PostDetail<'a> {
    #[serde(flatten)]
    post: &'a Post,
    newer: Option<PostSummary<'a>>,
    older: Option<PostSummary<'a>>,
}

async fn post_handler(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let posts = state.store.load();
    let slug = slug.trim_start_matches('/');
    match posts.get(slug) {
        Some(post) => {
            let (newer, older) = posts.neighbors(slug);
            Json(PostDetail {
                post,
                newer: newer.map(Post::summary),
                older: older.map(Post::summary),
            })
            .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Post not found" })),
        )
            .into_response(),
    }
}

async fn tags_handler(State(state): State<AppState>) -> Response {
    let posts = state.store.load();
    Json(posts.tags()).into_response()
}

#[derive(Serialize)]
struct TagPosts<'a> {
    tag: &'a str,
    posts: Vec<PostSummary<'a>>,
}

async fn tag_posts_handler(State(state): State<AppState>, Path(tag): Path<String>) -> Response {
    let posts = state.store.load();
    Json(TagPosts {
        tag: &tag,
        posts: posts.by_tag(&tag).map(Post::summary).collect(),
    })
    .into_response()
}
