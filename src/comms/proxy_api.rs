use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN},
        HeaderValue, StatusCode,
    },
    response::IntoResponse,
    routing::{self, get, post, put, MethodRouter},
    Json, Router,
};
use serde_json::json;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info;

use crate::error::ProxyError;
use crate::operations::{
    create_folder::{self, CreateFolderRequest, FolderCreated},
    delete::{self, BulkDeleteRequest, BulkDeleted, DeleteFileRequest, DeleteFolderRequest, Deleted},
    file_metadata::{self, FileMetadata, FileMetadataRequest},
    list_assets::{self, ListRequest, Listing},
    parse_body,
    search_files::{self, SearchRequest, SearchResult},
    update_metadata::{self, MetadataUpdated, UpdateMetadataRequest},
    upload_auth::{self, UploadAuthRequest},
    AssetProxy, Envelope, QueryParams,
};
use crate::security::auth::UploadAuth;

type SharedState = Arc<AppState>;
type ProxyResult<T> = Result<Json<Envelope<T>>, ProxyError>;

pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";
pub const ALLOW_DELETE: &str = "DELETE, OPTIONS";
pub const ALLOW_GET: &str = "GET, OPTIONS";
pub const ALLOW_GET_POST: &str = "GET, POST, OPTIONS";
pub const ALLOW_PUT: &str = "PUT, OPTIONS";

#[derive(Debug, Clone)]
pub struct AppState {
    pub proxy: AssetProxy,
}

impl AppState {
    pub fn new(proxy: AssetProxy) -> Self {
        Self { proxy }
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

// Pre-flight: 200 with the methods this endpoint accepts.
fn preflight(allow_methods: &'static str) -> MethodRouter<SharedState> {
    MethodRouter::new().options(move || async move {
        (
            StatusCode::OK,
            [
                (ACCESS_CONTROL_ALLOW_METHODS, allow_methods),
                (ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS),
            ],
        )
    })
}

async fn bulk_delete_handler(State(state): State<SharedState>, body: Bytes) -> ProxyResult<BulkDeleted> {
    let req: BulkDeleteRequest = parse_body(&body)?;
    Ok(Json(delete::bulk_delete(&state.proxy, req).await?))
}

async fn delete_file_handler(State(state): State<SharedState>, body: Bytes) -> ProxyResult<Deleted> {
    let req: DeleteFileRequest = parse_body(&body)?;
    Ok(Json(delete::delete_file(&state.proxy, req).await?))
}

async fn delete_folder_handler(State(state): State<SharedState>, body: Bytes) -> ProxyResult<Deleted> {
    let req: DeleteFolderRequest = parse_body(&body)?;
    Ok(Json(delete::delete_folder(&state.proxy, req).await?))
}

async fn create_folder_handler(State(state): State<SharedState>, body: Bytes) -> ProxyResult<FolderCreated> {
    let req: CreateFolderRequest = parse_body(&body)?;
    Ok(Json(create_folder::create_folder(&state.proxy, req).await?))
}

async fn list_assets_handler(State(state): State<SharedState>, RawQuery(query): RawQuery) -> ProxyResult<Listing> {
    let req = ListRequest::from_query(&QueryParams::parse(query.as_deref()))?;
    Ok(Json(list_assets::list_assets(&state.proxy, req).await?))
}

async fn file_metadata_handler(State(state): State<SharedState>, RawQuery(query): RawQuery) -> ProxyResult<FileMetadata> {
    let req = FileMetadataRequest::from_query(&QueryParams::parse(query.as_deref()));
    Ok(Json(file_metadata::file_metadata(&state.proxy, req).await?))
}

async fn search_files_handler(State(state): State<SharedState>, RawQuery(query): RawQuery) -> ProxyResult<SearchResult> {
    let req = SearchRequest::from_query(&QueryParams::parse(query.as_deref()))?;
    Ok(Json(search_files::search_files(&state.proxy, req).await?))
}

async fn update_metadata_handler(State(state): State<SharedState>, body: Bytes) -> ProxyResult<MetadataUpdated> {
    let req: UpdateMetadataRequest = parse_body(&body)?;
    Ok(Json(update_metadata::update_metadata(&state.proxy, req).await?))
}

async fn imagekit_auth_handler(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> Result<Json<UploadAuth>, ProxyError> {
    let req = UploadAuthRequest::from_query(&QueryParams::parse(query.as_deref()))?;
    Ok(Json(upload_auth::authenticate_upload(&state.proxy, req).await?))
}

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/bulk-delete", preflight(ALLOW_DELETE).merge(routing::delete(bulk_delete_handler)))
        .route("/api/create-folder", preflight(ALLOW_GET_POST).merge(post(create_folder_handler)))
        .route("/api/delete-file", preflight(ALLOW_DELETE).merge(routing::delete(delete_file_handler)))
        .route("/api/delete-folder", preflight(ALLOW_DELETE).merge(routing::delete(delete_folder_handler)))
        .route("/api/get-file-metadata", preflight(ALLOW_GET).merge(get(file_metadata_handler)))
        .route("/api/list-assets", preflight(ALLOW_GET_POST).merge(get(list_assets_handler)))
        .route("/api/search-files", preflight(ALLOW_GET).merge(get(search_files_handler)))
        .route("/api/update-metadata", preflight(ALLOW_PUT).merge(put(update_metadata_handler)))
        .route(
            "/api/imagekit-auth",
            preflight(ALLOW_GET_POST).merge(get(imagekit_auth_handler).post(imagekit_auth_handler)),
        )
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("asset proxy listening on {}", addr);
    axum::serve(listener, app).into_future().await?;
    Ok(())
}
