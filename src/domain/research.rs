use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Research project as listed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchProject {
    pub id: String,
    pub name: String,
}

/// Lifecycle of a research query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryStatus {
    NotFound,
    Waiting,
    InProgress,
    Ready,
}

impl QueryStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "not found" => Some(QueryStatus::NotFound),
            "waiting" => Some(QueryStatus::Waiting),
            "in progress" => Some(QueryStatus::InProgress),
            "ready" => Some(QueryStatus::Ready),
            _ => None,
        }
    }
}

/// Entry of a project's query list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySummary {
    pub query_id: String,
    pub keyword: String,
    pub status: Option<QueryStatus>,
}

/// Handle returned when a query is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryHandle {
    pub query_id: String,
    pub query_url: String,
}

/// Parameters for a new research query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuery {
    pub project: String,
    pub keyword: String,
    pub engine: String,
    pub language: String,
}

/// Snapshot of a query: status plus the raw payload once ready.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot {
    pub status: QueryStatus,
    pub query_url: Option<String>,
    pub raw: serde_json::Value,
}

/// Fixed-interval polling with a wall-clock ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { interval: Duration::from_secs(5), max_wait: Duration::from_secs(300) }
    }
}

/// Case-insensitive keyword match used for query reuse.
pub fn same_keyword(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
