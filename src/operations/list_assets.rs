use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{AssetProxy, Envelope, QueryParams};
use crate::error::ProxyError;
use crate::upstream::UpstreamCall;

pub const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub path: String,
    pub limit: i64,
    pub skip: i64,
}

impl ListRequest {
    pub fn from_query(query: &QueryParams) -> Result<Self, ProxyError> {
        Ok(Self {
            path: query.first("path").unwrap_or("/").to_string(),
            limit: query.number_or("limit", DEFAULT_LIMIT)?,
            skip: query.number_or("skip", 0)?,
        })
    }

    pub fn files_call(&self) -> UpstreamCall {
        UpstreamCall::get(&["v1", "files"])
            .query("path", &self.path)
            .query("limit", self.limit)
            .query("skip", self.skip)
    }

    pub fn folders_call(&self) -> UpstreamCall {
        UpstreamCall::get(&["v1", "folder"]).query("path", &self.path)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub files: Value,
    pub folders: Value,
    pub current_path: String,
}

/// Files are required; a folder listing the vendor refuses is reported as empty.
pub async fn list_assets(proxy: &AssetProxy, req: ListRequest) -> Result<Envelope<Listing>, ProxyError> {
    let authorization = proxy.authorization().await?;

    let files_call = req.files_call();
    let files = proxy
        .dispatch(&authorization, &files_call)
        .await?
        .expect(files_call.expect)?;

    let folders_reply = proxy.dispatch(&authorization, &req.folders_call()).await?;
    let folders = if folders_reply.is(StatusCode::OK) {
        folders_reply.json()?
    } else {
        warn!(
            path = %req.path,
            status = folders_reply.status.as_u16(),
            "folder listing failed, returning no folders"
        );
        Value::Array(Vec::new())
    };

    debug!(path = %req.path, "assets listed");
    Ok(Envelope::ok(Listing {
        files,
        folders,
        current_path: req.path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = ListRequest::from_query(&QueryParams::parse(None)).unwrap();
        assert_eq!(
            req,
            ListRequest {
                path: "/".into(),
                limit: 100,
                skip: 0
            }
        );
    }

    #[test]
    fn test_calls_share_path() {
        let req = ListRequest::from_query(&QueryParams::parse(Some("path=%2F2024&limit=5&skip=10"))).unwrap();

        let files = req.files_call();
        assert_eq!(files.path(), "/v1/files");
        assert_eq!(files.query_value("path"), Some("/2024"));
        assert_eq!(files.query_value("limit"), Some("5"));
        assert_eq!(files.query_value("skip"), Some("10"));

        let folders = req.folders_call();
        assert_eq!(folders.path(), "/v1/folder");
        assert_eq!(folders.query_value("path"), Some("/2024"));
        assert_eq!(folders.query.len(), 1);
    }

    #[test]
    fn test_rejects_bad_paging() {
        assert!(ListRequest::from_query(&QueryParams::parse(Some("limit=2.5"))).is_err());
        assert!(ListRequest::from_query(&QueryParams::parse(Some("skip=abc"))).is_err());
    }

    #[test]
    fn test_negative_paging_is_passed_through() {
        let req = ListRequest::from_query(&QueryParams::parse(Some("limit=-1&skip=-5"))).unwrap();
        assert_eq!(req.limit, -1);
        assert_eq!(req.files_call().query_value("limit"), Some("-1"));
        assert_eq!(req.files_call().query_value("skip"), Some("-5"));
    }

    #[test]
    fn test_listing_serializes_camel_case() {
        let json = serde_json::to_value(Envelope::ok(Listing {
            files: serde_json::json!([]),
            folders: serde_json::json!([]),
            current_path: "/".into(),
        }))
        .unwrap();
        assert_eq!(json["currentPath"], "/");
        assert_eq!(json["success"], true);
    }
}
