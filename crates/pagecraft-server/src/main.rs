//! PageCraft API Server
//!
//! Stores the page and the saved custom components for the page builder.
//!
//! ## Endpoints
//!
//! Every response body is `{ "success": bool, "data"?: T, "error"?: string }`.
//!
//! ```text
//! GET  /api/page               -> PageContent
//! POST /api/page               <- PageContent
//! GET  /api/components         -> [ComponentPrototype]
//! POST /api/components         <- ComponentPrototype -> ComponentPrototype (id assigned)
//! POST /api/components/delete  <- id (bare integer)
//! GET  /health
//! ```

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use pagecraft_core::{ApiResponse, ComponentPrototype, FileStorage, PageContent, PrototypeId, Storage, StorageError};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

/// Shared application state
#[derive(Clone)]
struct AppState {
    storage: Arc<dyn Storage>,
}

fn respond<T>(action: &str, result: Result<T, StorageError>) -> ApiResult<T> {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::ok(data))),
        Err(e) => {
            warn!("{} failed: {}", action, e);
            let status = match e {
                StorageError::NotFound(_) => StatusCode::NOT_FOUND,
                StorageError::Serialization(_) => StatusCode::BAD_REQUEST,
                StorageError::Io(_) | StorageError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(ApiResponse::err(e.to_string())))
        }
    }
}

/// Server settings read from the environment.
struct ServerConfig {
    addr: SocketAddr,
    data_dir: Option<PathBuf>,
}

impl ServerConfig {
    fn from_env() -> Result<Self, String> {
        let addr = std::env::var("PAGECRAFT_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse()
            .map_err(|e| format!("Invalid PAGECRAFT_ADDR {:?}: {}", addr, e))?;
        let data_dir = std::env::var_os("PAGECRAFT_DATA_DIR").map(PathBuf::from);
        Ok(Self { addr, data_dir })
    }

    fn open_storage(&self) -> Result<FileStorage, StorageError> {
        match &self.data_dir {
            Some(dir) => FileStorage::new(dir.clone()),
            None => FileStorage::default_location(),
        }
    }
}

fn app(storage: Arc<dyn Storage>) -> Router {
    Router::new()
        .route("/api/page", get(load_page).post(save_page))
        .route("/api/components", get(list_components).post(save_component))
        .route("/api/components/delete", post(delete_component))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { storage })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagecraft_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let storage = config.open_storage()?;
    info!("Storing data in {}", storage.base_path().display());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("PageCraft server listening on {}", config.addr);
    axum::serve(listener, app(Arc::new(storage))).await?;
    Ok(())
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

async fn load_page(State(state): State<AppState>) -> ApiResult<PageContent> {
    respond("Load page", state.storage.load_page().await)
}

async fn save_page(State(state): State<AppState>, Json(page): Json<PageContent>) -> ApiResult<()> {
    let result = state.storage.save_page(&page).await;
    if result.is_ok() {
        info!("Saved page with {} elements", page.elements.len());
    }
    respond("Save page", result)
}

async fn list_components(State(state): State<AppState>) -> ApiResult<Vec<ComponentPrototype>> {
    respond("List components", state.storage.list_components().await)
}

async fn save_component(
    State(state): State<AppState>,
    Json(prototype): Json<ComponentPrototype>,
) -> ApiResult<ComponentPrototype> {
    let result = state.storage.save_component(&prototype).await;
    if let Ok(saved) = &result {
        info!("Saved component {:?} ({})", saved.name, saved.id);
    }
    respond("Save component", result)
}

async fn delete_component(State(state): State<AppState>, Json(id): Json<PrototypeId>) -> ApiResult<()> {
    let result = state.storage.delete_component(id).await;
    if result.is_ok() {
        info!("Deleted component {}", id);
    }
    respond("Delete component", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_core::{ApiStorage, ComponentCategory, ComponentRegistry, Editor, MemoryStorage, NotificationKind};
    use std::net::SocketAddr;

    fn state() -> AppState {
        AppState {
            storage: Arc::new(MemoryStorage::new()),
        }
    }

    #[tokio::test]
    async fn test_empty_page() {
        let (status, Json(body)) = load_page(State(state())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.data, Some(PageContent::default()));
    }

    #[tokio::test]
    async fn test_save_then_load_page() {
        let state = state();
        let registry = ComponentRegistry::with_builtins();
        let button = registry.find_by_name("Button").unwrap();
        let page = PageContent::new(
            vec![registry.instantiate(button, Default::default(), None)],
            Default::default(),
        );

        let (status, _) = save_page(State(state.clone()), Json(page.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (_, Json(body)) = load_page(State(state)).await;
        assert_eq!(body.data, Some(page));
    }

    #[tokio::test]
    async fn test_component_lifecycle() {
        let state = state();
        let draft = ComponentPrototype::new("Card", ComponentCategory::Custom);

        let (_, Json(saved)) = save_component(State(state.clone()), Json(draft)).await;
        let saved = saved.data.unwrap();
        assert_ne!(saved.id, 0);

        let (_, Json(listed)) = list_components(State(state.clone())).await;
        assert_eq!(listed.data, Some(vec![saved.clone()]));

        let (status, _) = delete_component(State(state.clone()), Json(saved.id)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, Json(body)) = delete_component(State(state), Json(saved.id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.success);
        assert!(body.error.is_some());
    }

    async fn spawn_server() -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = app(Arc::new(MemoryStorage::new()));
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_api_storage_page_round_trip() {
        let addr = spawn_server().await;
        let storage = ApiStorage::new(format!("http://{}/", addr));

        let mut editor = Editor::default();
        let button = editor.registry().find_by_name("Button").unwrap().id;
        editor.add_component(button, Default::default()).unwrap();
        editor.save(&storage).await.unwrap();

        let mut other = Editor::default();
        other.load(&storage).await.unwrap();
        assert_eq!(other.elements(), editor.elements());
        assert_eq!(storage.load_page().await.unwrap(), editor.page_content());
    }

    #[tokio::test]
    async fn test_api_storage_component_lifecycle() {
        let addr = spawn_server().await;
        let storage = ApiStorage::new(format!("http://{}", addr));

        let saved = storage
            .save_component(&ComponentPrototype::new("Card", ComponentCategory::Custom))
            .await
            .unwrap();
        assert_ne!(saved.id, 0);
        assert_eq!(storage.list_components().await.unwrap(), vec![saved.clone()]);

        storage.delete_component(saved.id).await.unwrap();
        assert!(matches!(
            storage.delete_component(saved.id).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_api_storage_unreachable_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let storage = ApiStorage::new(format!("http://{}", addr));

        let mut editor = Editor::default();
        assert!(editor.save(&storage).await.is_err());
        assert_eq!(
            editor.notifications().latest().map(|n| n.kind),
            Some(NotificationKind::Error)
        );
    }

    #[tokio::test]
    async fn test_file_backed_router_builds() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let _router = app(Arc::new(storage));
        assert!(dir.path().join("components").exists());
    }

    #[test]
    fn test_response_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::ok(5u32)).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": 5 }));
        let json = serde_json::to_value(ApiResponse::<()>::err("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "boom" }));
    }
}
