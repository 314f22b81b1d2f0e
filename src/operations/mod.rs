//! Request translators: one module per proxied operation.
//!
//! Each module turns an inbound payload into an [`UpstreamCall`], hands it
//! to [`AssetProxy::forward`] and shapes the reply into its success body.
//! Validation always runs before the credential is read or anything is sent.

pub mod create_folder;
pub mod delete;
pub mod file_metadata;
pub mod list_assets;
pub mod search_files;
pub mod update_metadata;
pub mod upload_auth;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

use crate::config::{Credential, CredentialSource};
use crate::error::ProxyError;
use crate::security::auth::basic_auth_header;
use crate::upstream::{ImageKitClient, UpstreamCall, UpstreamReply};

/// `{"success": true, ...fields}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Credential source plus upstream client: everything a translator needs.
#[derive(Debug, Clone)]
pub struct AssetProxy {
    credentials: CredentialSource,
    client: ImageKitClient,
}

impl AssetProxy {
    pub fn new(credentials: CredentialSource, client: ImageKitClient) -> Self {
        Self {
            credentials,
            client,
        }
    }

    pub async fn credential(&self) -> Result<Credential, ProxyError> {
        self.credentials.load().await
    }

    pub async fn authorization(&self) -> Result<String, ProxyError> {
        Ok(basic_auth_header(&self.credential().await?))
    }

    /// Send with an already built header; the reply status is not checked.
    pub async fn dispatch(&self, authorization: &str, call: &UpstreamCall) -> Result<UpstreamReply, ProxyError> {
        self.client.send(authorization, call).await
    }

    /// Load the credential, send `call` once and return the decoded body if
    /// the vendor answered with `call.expect`.
    pub async fn forward(&self, call: &UpstreamCall) -> Result<Value, ProxyError> {
        let authorization = self.authorization().await?;
        self.dispatch(&authorization, call).await?.expect(call.expect)
    }
}

/// Decode a JSON request body. An empty or malformed body is a caller error.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ProxyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ProxyError::validation("Request body is required"));
    }
    serde_json::from_slice(body).map_err(|e| ProxyError::validation(format!("Invalid JSON body: {}", e)))
}

/// Query-string pairs in arrival order; keys may repeat.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        Self(pairs)
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Every value for any of `keys`, in order.
    pub fn all(&self, keys: &[&str]) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| keys.contains(&k.as_str()))
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn number_or<N: FromStr>(&self, key: &str, default: N) -> Result<N, ProxyError> {
        match self.first(key) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ProxyError::validation(format!("Invalid {}: {}", key, raw))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(rename = "fileId")]
        file_id: Option<String>,
    }

    #[test]
    fn test_envelope_flattens_data() {
        #[derive(Serialize)]
        struct Data {
            message: &'static str,
        }
        let json = serde_json::to_value(Envelope::ok(Data { message: "done" })).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "message": "done"}));
    }

    #[test]
    fn test_parse_body() {
        let probe: Probe = parse_body(br#"{"fileId":"abc"}"#).unwrap();
        assert_eq!(probe.file_id.as_deref(), Some("abc"));

        let probe: Probe = parse_body(b"{}").unwrap();
        assert!(probe.file_id.is_none());
    }

    #[test]
    fn test_parse_body_rejects_empty_and_malformed() {
        assert!(matches!(parse_body::<Probe>(b""), Err(ProxyError::Validation(_))));
        assert!(matches!(parse_body::<Probe>(b"  \n"), Err(ProxyError::Validation(_))));
        assert!(matches!(parse_body::<Probe>(b"{oops"), Err(ProxyError::Validation(_))));
    }

    #[test]
    fn test_query_params() {
        let q = QueryParams::parse(Some("q=cat&tags=pet&tags%5B%5D=animal&limit=10&path=%2F2024%2F"));
        assert_eq!(q.first("q"), Some("cat"));
        assert_eq!(q.first("path"), Some("/2024/"));
        assert_eq!(q.all(&["tags", "tags[]"]), vec!["pet", "animal"]);
        assert_eq!(q.number_or("limit", 50i64).unwrap(), 10);
        assert_eq!(q.number_or("skip", 0i64).unwrap(), 0);
    }

    #[test]
    fn test_query_params_invalid_number() {
        let q = QueryParams::parse(Some("limit=ten"));
        let err = q.number_or("limit", 100i64).unwrap_err();
        assert_eq!(err.to_string(), "Invalid limit: ten");
    }

    #[test]
    fn test_query_params_absent() {
        let q = QueryParams::parse(None);
        assert!(q.first("path").is_none());
        assert!(q.all(&["tags"]).is_empty());
    }
}
