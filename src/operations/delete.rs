use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{AssetProxy, Envelope};
use crate::error::ProxyError;
use crate::upstream::UpstreamCall;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileRequest {
    #[serde(default)]
    pub file_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    // Kept loose so a non-list value is reported as a validation error.
    #[serde(default)]
    pub file_ids: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFolderRequest {
    #[serde(default)]
    pub folder_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleted {
    pub message: String,
    pub details: Value,
}

pub fn delete_file_call(req: &DeleteFileRequest) -> Result<UpstreamCall, ProxyError> {
    let file_id = req
        .file_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ProxyError::validation("File ID is required"))?;

    Ok(UpstreamCall::delete(&["v1", "files"])
        .segment(file_id)
        .expecting(StatusCode::NO_CONTENT))
}

pub fn file_ids(req: &BulkDeleteRequest) -> Result<Vec<String>, ProxyError> {
    let missing = || ProxyError::validation("File IDs array is required");
    let items = match &req.file_ids {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(missing()),
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(id) if !id.is_empty() => Ok(id.clone()),
            _ => Err(ProxyError::validation("File IDs must be non-empty strings")),
        })
        .collect()
}

pub fn bulk_delete_call(ids: &[String]) -> UpstreamCall {
    UpstreamCall::delete(&["v1", "files", "batch", "deleteByFileIds"])
        .json(json!({ "fileIds": ids }))
        .expecting(StatusCode::OK)
}

pub fn delete_folder_call(req: &DeleteFolderRequest) -> Result<UpstreamCall, ProxyError> {
    let folder_path = req
        .folder_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ProxyError::validation("Folder path is required"))?;

    Ok(UpstreamCall::delete(&["v1", "folder"])
        .json(json!({ "folderPath": folder_path }))
        .expecting(StatusCode::NO_CONTENT))
}

pub async fn delete_file(proxy: &AssetProxy, req: DeleteFileRequest) -> Result<Envelope<Deleted>, ProxyError> {
    let call = delete_file_call(&req)?;
    proxy.forward(&call).await?;
    info!(file_id = ?req.file_id, "file deleted");
    Ok(Envelope::ok(Deleted {
        message: "File deleted successfully".to_string(),
    }))
}

pub async fn bulk_delete(proxy: &AssetProxy, req: BulkDeleteRequest) -> Result<Envelope<BulkDeleted>, ProxyError> {
    let ids = file_ids(&req)?;
    let details = proxy.forward(&bulk_delete_call(&ids)).await?;
    info!(count = ids.len(), "files deleted in bulk");
    Ok(Envelope::ok(BulkDeleted {
        message: format!("Successfully deleted {} files", ids.len()),
        details,
    }))
}

pub async fn delete_folder(proxy: &AssetProxy, req: DeleteFolderRequest) -> Result<Envelope<Deleted>, ProxyError> {
    let call = delete_folder_call(&req)?;
    proxy.forward(&call).await?;
    info!(folder_path = ?req.folder_path, "folder deleted");
    Ok(Envelope::ok(Deleted {
        message: "Folder deleted successfully".to_string(),
    }))
}
