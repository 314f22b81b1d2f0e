use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{AssetProxy, Envelope, QueryParams};
use crate::error::ProxyError;
use crate::upstream::UpstreamCall;

pub const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub tags: Vec<String>,
    pub limit: i64,
    pub skip: i64,
}

impl SearchRequest {
    pub fn from_query(params: &QueryParams) -> Result<Self, ProxyError> {
        Ok(Self {
            query: params.first("q").unwrap_or_default().to_string(),
            tags: params.all(&["tags", "tags[]"]),
            limit: params.number_or("limit", DEFAULT_LIMIT)?,
            skip: params.number_or("skip", 0)?,
        })
    }

    /// ImageKit search expression: `name="q" AND tags="t1" AND ...`.
    pub fn search_query(&self) -> String {
        let mut terms = Vec::with_capacity(self.tags.len() + 1);
        if !self.query.is_empty() {
            terms.push(format!("name=\"{}\"", self.query));
        }
        terms.extend(self.tags.iter().map(|tag| format!("tags=\"{}\"", tag)));
        terms.join(" AND ")
    }

    pub fn call(&self) -> UpstreamCall {
        let mut call = UpstreamCall::get(&["v1", "files"]);
        let search = self.search_query();
        if !search.is_empty() {
            call = call.query("searchQuery", search);
        }
        call.query("limit", self.limit).query("skip", self.skip)
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub files: Value,
    pub query: String,
    pub tags: Vec<String>,
    pub total: usize,
}

pub async fn search_files(proxy: &AssetProxy, req: SearchRequest) -> Result<Envelope<SearchResult>, ProxyError> {
    let files = proxy.forward(&req.call()).await?;
    let total = files.as_array().map_or(0, Vec::len);
    debug!(query = %req.query, tags = ?req.tags, total, "search complete");
    Ok(Envelope::ok(SearchResult {
        files,
        query: req.query,
        tags: req.tags,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(raw: &str) -> SearchRequest {
        SearchRequest::from_query(&QueryParams::parse(Some(raw))).unwrap()
    }

    #[test]
    fn test_name_and_tags_joined() {
        let req = request("q=cat&tags=pet&tags=animal");
        assert_eq!(
            req.search_query(),
            r#"name="cat" AND tags="pet" AND tags="animal""#
        );
        assert_eq!(req.call().query_value("searchQuery"), Some(req.search_query().as_str()));
    }

    #[test]
    fn test_tags_only() {
        let req = request("tags%5B%5D=pet");
        assert_eq!(req.search_query(), r#"tags="pet""#);
    }

    #[test]
    fn test_empty_search_omits_expression() {
        let req = SearchRequest::from_query(&QueryParams::parse(None)).unwrap();
        assert_eq!(req.query, "");
        assert!(req.tags.is_empty());
        assert_eq!(req.limit, 50);
        assert_eq!(req.skip, 0);

        let call = req.call();
        assert_eq!(call.path(), "/v1/files");
        assert!(call.query_value("searchQuery").is_none());
        assert_eq!(call.query_value("limit"), Some("50"));
    }

    #[test]
    fn test_paging_passes_through() {
        let call = request("q=dog&limit=20&skip=40").call();
        assert_eq!(call.query_value("limit"), Some("20"));
        assert_eq!(call.query_value("skip"), Some("40"));
    }
}
