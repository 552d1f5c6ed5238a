//! Keyword-research port definition.

use crate::domain::{
    AppError, NewQuery, QueryHandle, QuerySnapshot, QuerySummary, ResearchProject,
};

/// Port for the SEO research provider.
pub trait ResearchClient: Send + Sync {
    fn list_projects(&self) -> Result<Vec<ResearchProject>, AppError>;

    fn list_queries(&self, project: &str) -> Result<Vec<QuerySummary>, AppError>;

    fn create_query(&self, query: &NewQuery) -> Result<QueryHandle, AppError>;

    /// Current status of a query; `raw` carries the full payload once ready.
    fn get_query(&self, query_id: &str) -> Result<QuerySnapshot, AppError>;
}
