pub mod client;

pub use client::{ImageKitClient, DEFAULT_API_BASE};

use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::error::ProxyError;

/// One outbound request to the vendor API, described before it is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamCall {
    pub method: Method,
    /// Raw path segments; each is percent-encoded on its own when sent.
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub expect: StatusCode,
}

impl UpstreamCall {
    pub fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: None,
            expect: StatusCode::OK,
        }
    }

    pub fn get(segments: &[&str]) -> Self {
        Self::new(Method::GET, segments)
    }

    pub fn post(segments: &[&str]) -> Self {
        Self::new(Method::POST, segments)
    }

    pub fn patch(segments: &[&str]) -> Self {
        Self::new(Method::PATCH, segments)
    }

    pub fn delete(segments: &[&str]) -> Self {
        Self::new(Method::DELETE, segments)
    }

    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn expecting(mut self, status: StatusCode) -> Self {
        self.expect = status;
        self
    }

    /// Unencoded path, for logs and assertions.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub text: String,
}

impl UpstreamReply {
    pub fn is(&self, status: StatusCode) -> bool {
        self.status == status
    }

    /// Decoded body, `null` when the vendor sent nothing (204).
    pub fn json(&self) -> Result<Value, ProxyError> {
        if self.text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.text).map_err(|e| ProxyError::Upstream {
            status: self.status.as_u16(),
            body: format!("invalid JSON in response: {}", e),
        })
    }

    /// The decoded body if the status is the one the call expects.
    pub fn expect(self, status: StatusCode) -> Result<Value, ProxyError> {
        if !self.is(status) {
            return Err(ProxyError::Upstream {
                status: self.status.as_u16(),
                body: self.text,
            });
        }
        self.json()
    }
}
