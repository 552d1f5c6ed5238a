//! SEO research client for the NeuronWriter writer API.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::domain::config::{NEURONWRITER_API_KEY, ResearchConfig};
use crate::domain::{
    AppError, NewQuery, QueryHandle, QuerySnapshot, QueryStatus, QuerySummary, ResearchProject,
};
use crate::ports::ResearchClient;

const SERVICE: &str = "NeuronWriter";

#[derive(Clone)]
pub struct HttpResearchClient {
    api_key: Option<String>,
    base_url: Url,
    client: Client,
}

impl std::fmt::Debug for HttpResearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResearchClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpResearchClient {
    pub fn new(api_key: Option<String>, config: &ResearchConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { api_key, base_url: config.endpoint()?, client })
    }

    pub fn from_env_with_config(config: &ResearchConfig) -> Result<Self, AppError> {
        let key = std::env::var(NEURONWRITER_API_KEY)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self::new(key, config)
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), name)
    }

    fn post<B: Serialize + ?Sized>(&self, name: &str, body: &B) -> Result<Value, AppError> {
        let api_key =
            self.api_key.as_deref().ok_or(AppError::MissingCredential(NEURONWRITER_API_KEY))?;

        let url = self.endpoint(name);
        debug!(%url, "research request");
        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", api_key)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .map_err(|e| AppError::Transport { service: SERVICE, status: None, message: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Transport {
                service: SERVICE,
                status: Some(status.as_u16()),
                message: error_text.trim().to_string(),
            });
        }

        response.json().map_err(|e| AppError::parse(format!("{} response", name), e))
    }
}

impl ResearchClient for HttpResearchClient {
    fn list_projects(&self) -> Result<Vec<ResearchProject>, AppError> {
        let reply = self.post("list-projects", &json!({}))?;
        Ok(items(&reply)
            .iter()
            .filter_map(|p| {
                let id = text(p, "project")?;
                Some(ResearchProject { name: text(p, "name").unwrap_or_else(|| id.clone()), id })
            })
            .collect())
    }

    fn list_queries(&self, project: &str) -> Result<Vec<QuerySummary>, AppError> {
        let reply = self.post("list-queries", &json!({ "project": project }))?;
        Ok(items(&reply)
            .iter()
            .filter_map(|q| {
                Some(QuerySummary {
                    query_id: text(q, "query")?,
                    keyword: text(q, "keyword").unwrap_or_default(),
                    status: text(q, "status").as_deref().and_then(QueryStatus::parse),
                })
            })
            .collect())
    }

    fn create_query(&self, query: &NewQuery) -> Result<QueryHandle, AppError> {
        let reply = self.post(
            "new-query",
            &json!({
                "project": query.project,
                "keyword": query.keyword,
                "engine": query.engine,
                "language": query.language,
            }),
        )?;

        let query_id = text(&reply, "query")
            .ok_or_else(|| AppError::EmptyResponse { service: SERVICE, what: "query id".into() })?;
        let query_url = text(&reply, "query_url").unwrap_or_default();
        Ok(QueryHandle { query_id, query_url })
    }

    fn get_query(&self, query_id: &str) -> Result<QuerySnapshot, AppError> {
        let reply = self.post("get-query", &json!({ "query": query_id }))?;
        let raw_status = text(&reply, "status")
            .ok_or_else(|| AppError::parse("get-query response", "missing status"))?;

        let status = QueryStatus::parse(&raw_status).unwrap_or_else(|| {
            warn!(query_id, status = %raw_status, "unrecognized query status, treating as in progress");
            QueryStatus::InProgress
        });
        let query_url = text(&reply, "query_url");
        Ok(QuerySnapshot { status, query_url, raw: reply })
    }
}

/// List endpoints return a bare array; some deployments wrap it.
fn items(reply: &Value) -> &[Value] {
    match reply {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => ["projects", "queries", "data"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_array))
            .map_or(&[][..], Vec::as_slice),
        _ => &[],
    }
}

/// String field that may arrive as a number.
fn text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
