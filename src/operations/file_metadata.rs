use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{AssetProxy, Envelope, QueryParams};
use crate::error::ProxyError;
use crate::upstream::UpstreamCall;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileMetadataRequest {
    pub file_id: Option<String>,
}

impl FileMetadataRequest {
    pub fn from_query(query: &QueryParams) -> Self {
        Self {
            file_id: query.first("fileId").map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FileMetadata {
    pub metadata: Value,
}

pub fn metadata_call(req: &FileMetadataRequest) -> Result<UpstreamCall, ProxyError> {
    let file_id = req
        .file_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ProxyError::validation("File ID is required"))?;

    Ok(UpstreamCall::get(&["v1", "files"])
        .segment(file_id)
        .segment("metadata")
        .expecting(StatusCode::OK))
}

/// Image metadata (dimensions, EXIF, ...) the vendor extracted for one file.
pub async fn file_metadata(proxy: &AssetProxy, req: FileMetadataRequest) -> Result<Envelope<FileMetadata>, ProxyError> {
    let call = metadata_call(&req)?;
    let metadata = proxy.forward(&call).await?;
    debug!(file_id = ?req.file_id, "file metadata fetched");
    Ok(Envelope::ok(FileMetadata { metadata }))
}
