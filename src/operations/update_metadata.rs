use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use super::{AssetProxy, Envelope};
use crate::error::ProxyError;
use crate::upstream::UpstreamCall;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMetadataRequest {
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub custom_coordinates: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct MetadataUpdated {
    pub message: String,
    pub file: Value,
}

// null, false, 0, "" and empty collections count as unset.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// PATCH body with only the fields the caller actually set to something.
/// Values are forwarded as given.
pub fn details_payload(req: &UpdateMetadataRequest) -> Value {
    let mut payload = Map::new();
    if let Some(tags) = req.tags.as_ref().filter(|t| is_set(t)) {
        payload.insert("tags".into(), tags.clone());
    }
    if let Some(coords) = req.custom_coordinates.as_ref().filter(|c| is_set(c)) {
        payload.insert("customCoordinates".into(), coords.clone());
    }
    Value::Object(payload)
}

pub fn update_call(req: &UpdateMetadataRequest) -> Result<UpstreamCall, ProxyError> {
    let file_id = req
        .file_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ProxyError::validation("File ID is required"))?;

    Ok(UpstreamCall::patch(&["v1", "files"])
        .segment(file_id)
        .segment("details")
        .json(details_payload(req))
        .expecting(StatusCode::OK))
}

pub async fn update_metadata(proxy: &AssetProxy, req: UpdateMetadataRequest) -> Result<Envelope<MetadataUpdated>, ProxyError> {
    let call = update_call(&req)?;
    let file = proxy.forward(&call).await?;
    info!(file_id = ?req.file_id, "file metadata updated");
    Ok(Envelope::ok(MetadataUpdated {
        message: "File metadata updated successfully".to_string(),
        file,
    }))
}
