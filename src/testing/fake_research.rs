use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::domain::{
    AppError, NewQuery, QueryHandle, QuerySnapshot, QueryStatus, QuerySummary, ResearchProject,
};
use crate::ports::ResearchClient;

#[derive(Clone, Default)]
pub struct FakeResearchClient {
    pub projects: Arc<Mutex<Vec<ResearchProject>>>,
    pub queries: Arc<Mutex<Vec<QuerySummary>>>,
    /// Statuses returned by successive `get_query` calls; the last repeats.
    pub statuses: Arc<Mutex<VecDeque<QueryStatus>>>,
    pub payload: Arc<Mutex<Value>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeResearchClient {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.projects.lock().unwrap().push(ResearchProject { id: "p1".into(), name: "Default".into() });
        fake.statuses.lock().unwrap().push_back(QueryStatus::Ready);
        fake
    }

    pub fn set_payload(&self, payload: Value) {
        *self.payload.lock().unwrap() = payload;
    }

    pub fn set_statuses(&self, statuses: &[QueryStatus]) {
        *self.statuses.lock().unwrap() = statuses.iter().copied().collect();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ResearchClient for FakeResearchClient {
    fn list_projects(&self) -> Result<Vec<ResearchProject>, AppError> {
        self.record("list_projects".into());
        Ok(self.projects.lock().unwrap().clone())
    }

    fn list_queries(&self, project: &str) -> Result<Vec<QuerySummary>, AppError> {
        self.record(format!("list_queries:{}", project));
        Ok(self.queries.lock().unwrap().clone())
    }

    fn create_query(&self, query: &NewQuery) -> Result<QueryHandle, AppError> {
        self.record(format!("create_query:{}:{}", query.project, query.keyword));
        Ok(QueryHandle { query_id: "q-new".into(), query_url: "https://research.example/q-new".into() })
    }

    fn get_query(&self, query_id: &str) -> Result<QuerySnapshot, AppError> {
        self.record(format!("get_query:{}", query_id));
        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.len() > 1 { statuses.pop_front() } else { statuses.front().copied() };
        let status = status.unwrap_or(QueryStatus::Ready);
        let raw = if status == QueryStatus::Ready { self.payload.lock().unwrap().clone() } else { Value::Null };
        Ok(QuerySnapshot { status, query_url: None, raw })
    }
}
