use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::{AppError, TokenUsage};
use crate::ports::{CompletionClient, CompletionOutput, CompletionRequest};

type Responder = Arc<dyn Fn(&CompletionRequest) -> Result<String, AppError> + Send + Sync>;

/// Completion fake that answers by output-schema name.
///
/// Requests without a schema are answered by the `""` responder.
#[derive(Clone, Default)]
pub struct FakeCompletionClient {
    responders: Arc<Mutex<HashMap<String, Responder>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

pub const FAKE_USAGE: TokenUsage = TokenUsage { prompt_tokens: 10, completion_tokens: 5, total_tokens: 15 };

impl FakeCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(
        &self,
        schema: &str,
        responder: impl Fn(&CompletionRequest) -> Result<String, AppError> + Send + Sync + 'static,
    ) {
        self.responders.lock().unwrap().insert(schema.to_string(), Arc::new(responder));
    }

    pub fn reply(&self, schema: &str, content: impl Into<String>) {
        let content = content.into();
        self.respond_with(schema, move |_| Ok(content.clone()));
    }

    /// Replies in order; the last one repeats.
    pub fn replies(&self, schema: &str, contents: Vec<String>) {
        let next = AtomicUsize::new(0);
        self.respond_with(schema, move |_| {
            let i = next.fetch_add(1, Ordering::SeqCst).min(contents.len().saturating_sub(1));
            Ok(contents[i].clone())
        });
    }

    pub fn fail(&self, schema: &str, make: impl Fn() -> AppError + Send + Sync + 'static) {
        self.respond_with(schema, move |_| Err(make()));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose schema has the given name.
    pub fn requests_for(&self, schema: &str) -> Vec<CompletionRequest> {
        self.requests().into_iter().filter(|r| schema_name(r) == schema).collect()
    }
}

fn schema_name(request: &CompletionRequest) -> &str {
    request.schema.as_ref().map(|s| s.name.as_str()).unwrap_or("")
}

impl CompletionClient for FakeCompletionClient {
    fn complete(&self, request: CompletionRequest) -> Result<CompletionOutput, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let responder = self.responders.lock().unwrap().get(schema_name(&request)).cloned();
        let responder = responder.unwrap_or_else(|| panic!("no fake reply for '{}'", schema_name(&request)));
        let content = responder(&request)?;
        Ok(CompletionOutput { content, usage: FAKE_USAGE })
    }
}
