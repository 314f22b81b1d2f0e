use base64::{engine::general_purpose, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha1::Sha1;
use uuid::Uuid;

use crate::config::Credential;

type HmacSha1 = Hmac<Sha1>;

/// Seconds an upload signature stays valid when the caller gives no expiry.
pub const DEFAULT_UPLOAD_TTL_SECS: i64 = 60 * 30;

/// `Authorization` header value for the ImageKit REST API: the private key
/// as username with an empty password.
pub fn basic_auth_header(credential: &Credential) -> String {
    let encoded = general_purpose::STANDARD.encode(format!("{}:", credential.expose()));
    format!("Basic {}", encoded)
}

/// Parameters a browser needs to upload straight to ImageKit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadAuth {
    pub token: String,
    pub expire: i64,
    pub signature: String,
}

// hex(HMAC-SHA1(private_key, token + expire))
pub fn sign_upload(credential: &Credential, token: &str, expire: i64) -> String {
    let mut mac = HmacSha1::new_from_slice(credential.expose().as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(token.as_bytes());
    mac.update(expire.to_string().as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn upload_auth(credential: &Credential, token: Option<String>, expire: Option<i64>) -> UploadAuth {
    let token = token
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let expire = expire.unwrap_or_else(|| Utc::now().timestamp() + DEFAULT_UPLOAD_TTL_SECS);
    let signature = sign_upload(credential, &token, expire);
    UploadAuth {
        token,
        expire,
        signature,
    }
}
