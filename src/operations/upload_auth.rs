use tracing::debug;

use super::{AssetProxy, QueryParams};
use crate::error::ProxyError;
use crate::security::auth::{upload_auth, UploadAuth};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadAuthRequest {
    pub token: Option<String>,
    pub expire: Option<i64>,
}

impl UploadAuthRequest {
    pub fn from_query(query: &QueryParams) -> Result<Self, ProxyError> {
        let expire = match query.first("expire") {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse()
                    .map_err(|_| ProxyError::validation(format!("Invalid expire: {}", raw)))?,
            ),
        };
        Ok(Self {
            token: query.first("token").map(str::to_string),
            expire,
        })
    }
}

/// Signs locally; no vendor call is made.
pub async fn authenticate_upload(proxy: &AssetProxy, req: UploadAuthRequest) -> Result<UploadAuth, ProxyError> {
    let credential = proxy.credential().await?;
    let auth = upload_auth(&credential, req.token, req.expire);
    debug!(expire = auth.expire, "issued upload signature");
    Ok(auth)
}
