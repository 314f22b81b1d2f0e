use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{AssetProxy, Envelope};
use crate::error::ProxyError;
use crate::upstream::UpstreamCall;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    #[serde(default)]
    pub folder_name: Option<String>,
    #[serde(default)]
    pub parent_folder_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FolderCreated {
    pub folder: Value,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderPlan {
    pub folder_name: String,
    pub parent_folder_path: String,
    /// Full path of the folder that will exist afterwards.
    pub folder_path: String,
}

/// `/` + name at the root, otherwise the parent (trailing slashes dropped) + `/` + name.
pub fn folder_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), name)
    }
}

pub fn plan(req: &CreateFolderRequest) -> Result<FolderPlan, ProxyError> {
    let folder_name = req
        .folder_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ProxyError::validation("Folder name is required"))?;
    let parent_folder_path = req.parent_folder_path.as_deref().unwrap_or("/");

    Ok(FolderPlan {
        folder_name: folder_name.to_string(),
        parent_folder_path: parent_folder_path.to_string(),
        folder_path: folder_path(parent_folder_path, folder_name),
    })
}

impl FolderPlan {
    pub fn call(&self) -> UpstreamCall {
        UpstreamCall::post(&["v1", "folder"])
            .json(json!({
                "folderName": self.folder_name,
                "parentFolderPath": self.parent_folder_path,
            }))
            .expecting(StatusCode::CREATED)
    }
}

pub async fn create_folder(proxy: &AssetProxy, req: CreateFolderRequest) -> Result<Envelope<FolderCreated>, ProxyError> {
    let plan = plan(&req)?;
    let folder = proxy.forward(&plan.call()).await?;
    info!(folder_path = %plan.folder_path, "folder created");
    Ok(Envelope::ok(FolderCreated {
        folder,
        message: format!("Folder \"{}\" created successfully", plan.folder_name),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: Option<&str>, parent: Option<&str>) -> CreateFolderRequest {
        CreateFolderRequest {
            folder_name: name.map(str::to_string),
            parent_folder_path: parent.map(str::to_string),
        }
    }

    #[test]
    fn test_folder_path_at_root() {
        let plan = plan(&request(Some("photos"), Some("/"))).unwrap();
        assert_eq!(plan.folder_path, "/photos");
    }

    #[test]
    fn test_folder_path_under_parent_with_trailing_slash() {
        let plan = plan(&request(Some("photos"), Some("/2024/"))).unwrap();
        assert_eq!(plan.folder_path, "/2024/photos");
        assert_eq!(folder_path("/2024", "photos"), "/2024/photos");
        assert_eq!(folder_path("/a/b//", "c"), "/a/b/c");
    }

    #[test]
    fn test_parent_defaults_to_root() {
        let plan = plan(&request(Some("photos"), None)).unwrap();
        assert_eq!(plan.parent_folder_path, "/");
        assert_eq!(plan.folder_path, "/photos");
    }

    #[test]
    fn test_requires_folder_name() {
        for name in [None, Some("")] {
            let err = plan(&request(name, Some("/"))).unwrap_err();
            assert_eq!(err.to_string(), "Folder name is required");
        }
    }

    #[test]
    fn test_call_payload() {
        let call = plan(&request(Some("photos"), Some("/2024/"))).unwrap().call();
        assert_eq!(call.method, reqwest::Method::POST);
        assert_eq!(call.path(), "/v1/folder");
        assert_eq!(call.expect, StatusCode::CREATED);
        assert_eq!(
            call.body,
            Some(json!({"folderName": "photos", "parentFolderPath": "/2024/"}))
        );
    }
}
