//! Transport-agnostic request handling.
//!
//! Every handler returns an [`ApiResponse`] holding an HTTP-style status and a
//! JSON body, so the HTTP server and the CLI share one set of semantics.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::adapters::{
    EmbeddedPromptStore, FilesystemArtifactStore, FilesystemPromptStore, HttpCompletionClient,
    HttpImageGenerator, HttpResearchClient, HttpVisionClient,
};
use crate::app::commands::image_media::ImageOptions;
use crate::app::commands::{image_media, merge, outline, render, research_terms, sections, text, text_media};
use crate::app::{AppContext, Collaborators, PipelineSettings};
use crate::domain::{AppError, Keyword, MediaforgeConfig, Phase, PipelineError};
use crate::ports::PromptStore;

/// Status code plus JSON body produced by a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn success<T: Serialize>(data: &T, message: &str) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self { status: 200, body: json!({ "success": true, "data": data, "message": message }) },
            Err(e) => Self::failure(500, "SERIALIZATION_FAILED", &e.to_string(), None),
        }
    }

    fn failure(status: u16, code: &str, message: &str, stage: Option<&str>) -> Self {
        let mut body = json!({ "success": false, "error": code, "message": message });
        if let Some(stage) = stage {
            body["phase"] = json!(stage);
        }
        Self { status, body }
    }

    fn from_error(err: &AppError) -> Self {
        let status = if err.is_client_error() { 400 } else { 500 };
        Self::failure(status, err.code(), &err.to_string(), None)
    }

    fn from_pipeline_error(err: &PipelineError) -> Self {
        let status = if err.is_client_error() { 400 } else { 500 };
        Self::failure(status, err.source.code(), &err.to_string(), Some(&err.stage))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Keyword from a request body. Absent or blank is `MISSING_KEYWORD`.
fn keyword_from(body: &Value) -> Result<Keyword, ApiResponse> {
    match body.get("keyword").and_then(Value::as_str).map(str::trim) {
        Some(raw) if !raw.is_empty() => Keyword::new(raw).map_err(|e| ApiResponse::from_error(&e)),
        _ => Err(ApiResponse::failure(400, "MISSING_KEYWORD", "keyword is required", None)),
    }
}

/// Run one prompt for `{keyword}`.
pub fn text(ctx: &AppContext, prompt_name: Option<&str>, body: &Value) -> ApiResponse {
    let Some(prompt_name) = prompt_name.map(str::trim).filter(|p| !p.is_empty()) else {
        return ApiResponse::failure(400, "MISSING_PROMPT_NAME", "prompt_name is required", None);
    };
    let keyword = match keyword_from(body) {
        Ok(keyword) => keyword,
        Err(response) => return response,
    };

    match text::execute(ctx, prompt_name, &keyword) {
        Ok(output) => ApiResponse::success(&output, "Text generated successfully"),
        Err(e) => ApiResponse::from_error(&e),
    }
}

/// Run the five-phase article pipeline for `{keyword}`.
pub fn text_media(ctx: &AppContext, body: &Value) -> ApiResponse {
    let keyword = match keyword_from(body) {
        Ok(keyword) => keyword,
        Err(response) => return response,
    };

    match ctx.locks().with_lock(&keyword, || text_media::execute(ctx, &keyword)) {
        Ok(report) => ApiResponse::success(&report, "Article generated successfully"),
        Err(e) => ApiResponse::from_pipeline_error(&e),
    }
}

/// Run the image pipeline for `{keyword, count?}`.
pub fn image_media(ctx: &AppContext, body: &Value, debug: bool) -> ApiResponse {
    let keyword = match keyword_from(body) {
        Ok(keyword) => keyword,
        Err(response) => return response,
    };
    let count = body.get("count").and_then(Value::as_u64).map(|c| c.min(u32::MAX as u64) as u32);
    let options = ImageOptions { count, debug };

    match ctx.locks().with_lock(&keyword, || image_media::execute(ctx, &keyword, &options)) {
        Ok(report) => ApiResponse::success(&report, "Image generated successfully"),
        Err(e) => ApiResponse::from_pipeline_error(&e),
    }
}

pub fn health() -> ApiResponse {
    ApiResponse {
        status: 200,
        body: json!({
            "success": true,
            "message": "mediaforge is running",
            "timestamp": Utc::now().to_rfc3339(),
        }),
    }
}

/// Body that is not a JSON object.
pub fn invalid_body(details: &str) -> ApiResponse {
    ApiResponse::failure(400, "INVALID_BODY", &format!("Request body must be a JSON object: {}", details), None)
}

pub fn not_found(path: &str) -> ApiResponse {
    ApiResponse::failure(404, "NOT_FOUND", &format!("No route for {}", path), None)
}

/// Run a single text phase against whatever artifacts already exist.
pub fn phase(ctx: &AppContext, phase: Phase, keyword: &Keyword) -> Result<Value, AppError> {
    let to_value = |v: Result<Value, serde_json::Error>| v.map_err(|e| AppError::parse("phase result", e));
    ctx.locks().with_lock(keyword, || match phase {
        Phase::ResearchTerms => to_value(serde_json::to_value(research_terms::execute(ctx, keyword)?)),
        Phase::GenerateOutline => to_value(serde_json::to_value(outline::execute(ctx, keyword)?)),
        Phase::MergeOutlineWithTerms => to_value(serde_json::to_value(merge::execute(ctx, keyword)?)),
        Phase::GenerateSectionContent => to_value(serde_json::to_value(sections::execute(ctx, keyword)?)),
        Phase::RenderFinal => {
            let outcome = render::execute(ctx, keyword)?;
            Ok(json!({ "path": outcome.path.display().to_string(), "markdown": outcome.markdown }))
        }
    })
}

/// Prompt names available to `text`.
pub fn prompt_names(config: &MediaforgeConfig) -> Vec<String> {
    prompt_store(config).names()
}

fn prompt_store(config: &MediaforgeConfig) -> Arc<dyn PromptStore> {
    match &config.prompts.dir {
        Some(dir) => Arc::new(FilesystemPromptStore::new(dir)),
        None => Arc::new(EmbeddedPromptStore::new()),
    }
}

/// Wire the HTTP adapters described by `config` into an [`AppContext`].
///
/// Credentials are read from the environment; a missing key surfaces when the
/// corresponding service is first called.
pub fn context_from_config(config: &MediaforgeConfig) -> Result<AppContext, AppError> {
    let completion = HttpCompletionClient::from_env_with_config(&config.openai)?;
    let vision = HttpVisionClient::new(completion.clone());
    let research = HttpResearchClient::from_env_with_config(&config.research)?;
    let images = HttpImageGenerator::from_env_with_config(&config.image)?;
    if let Some(dir) = &config.prompts.dir
        && !dir.is_dir()
    {
        warn!(dir = %dir.display(), "prompt directory not found, using embedded prompts");
    }

    Ok(AppContext::new(
        Collaborators {
            completion: Arc::new(completion),
            research: Arc::new(research),
            images: Arc::new(images),
            assessor: Arc::new(vision),
            prompts: prompt_store(config),
            artifacts: Arc::new(FilesystemArtifactStore::new(&config.storage.artifacts_dir)),
        },
        PipelineSettings::from_config(config),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Harness, fixtures};

    #[test]
    fn missing_keyword_is_rejected_before_any_call() {
        let harness = Harness::new();
        let ctx = harness.context();

        for body in [json!({}), json!({"keyword": "   "}), json!({"keyword": 7})] {
            for response in [
                text(&ctx, Some("loop_prompt"), &body),
                text_media(&ctx, &body),
                image_media(&ctx, &body, false),
            ] {
                assert_eq!(response.status, 400);
                assert_eq!(response.body["success"], false);
                assert_eq!(response.body["error"], "MISSING_KEYWORD");
            }
        }
        assert_eq!(harness.external_calls(), 0);
    }

    #[test]
    fn keyword_without_letters_is_a_validation_error() {
        let harness = Harness::new();

        let response = text_media(&harness.context(), &json!({"keyword": "!!!"}));

        assert_eq!(response.status, 400);
        assert_eq!(response.body["error"], "VALIDATION_FAILED");
        assert_eq!(harness.external_calls(), 0);
    }

    #[test]
    fn text_requires_prompt_name_first() {
        let harness = Harness::new();

        let response = text(&harness.context(), Some(" "), &json!({}));

        assert_eq!(response.status, 400);
        assert_eq!(response.body["error"], "MISSING_PROMPT_NAME");
        assert_eq!(harness.external_calls(), 0);
    }

    #[test]
    fn unknown_prompt_is_a_client_error() {
        let harness = Harness::new();

        let response = text(&harness.context(), Some("no_such_prompt"), &json!({"keyword": "raccoon"}));

        assert_eq!(response.status, 400);
        assert_eq!(response.body["error"], "PROMPT_NOT_FOUND");
    }

    #[test]
    fn text_wraps_output_in_success_body() {
        let harness = Harness::new();
        harness.completion.reply("", "Raccoon facts");

        let response =
            text(&harness.context(), Some("image_quality_prompt"), &json!({"keyword": "raccoon removal houston"}));

        assert!(response.is_success());
        assert_eq!(response.body["success"], true);
        assert_eq!(response.body["data"]["content"], "Raccoon facts");
        assert_eq!(response.body["data"]["keyword"], "raccoon removal houston");
        assert_eq!(response.body["data"]["usage"]["total_tokens"], 15);
    }

    #[test]
    fn pipeline_failure_reports_phase_and_server_status() {
        let harness = Harness::new();
        harness.research.set_payload(fixtures::research_payload());
        harness.completion.fail("create_outline", || AppError::MissingCredential("OPENAI_API_KEY"));

        let response = text_media(&harness.context(), &json!({"keyword": "raccoon removal houston"}));

        assert_eq!(response.status, 500);
        assert_eq!(response.body["success"], false);
        assert_eq!(response.body["error"], "MISSING_CREDENTIAL");
        assert_eq!(response.body["phase"], "generate_outline");
    }

    #[test]
    fn image_media_flattens_outcome_and_echoes_count() {
        let harness = Harness::new();
        harness.completion.reply("generate_concepts", fixtures::concepts_reply());
        harness.completion.reply("rate_concepts", fixtures::rating_reply());
        harness.completion.reply("validate_entities", fixtures::entities_reply());
        harness.completion.reply("final_image_prompt", fixtures::final_prompt_reply("A raccoon on a roof"));
        harness.assessor.push(fixtures::assessment(true, &[]));

        let response =
            image_media(&harness.context(), &json!({"keyword": "raccoon removal houston", "count": 2}), false);

        assert_eq!(response.status, 200);
        let data = &response.body["data"];
        assert_eq!(data["description"], "A raccoon on a roof");
        assert_eq!(data["image"]["image_url"], "https://images.example/raccoon_on_roof_1.png");
        assert_eq!(data["rerun"]["attempts_used"], 1);
        assert_eq!(data["image_count"], 2);
        assert_eq!(data["warnings"], json!([]));
    }

    #[test]
    fn health_and_not_found_bodies() {
        let ok = health();
        assert_eq!(ok.status, 200);
        assert!(ok.body["timestamp"].is_string());

        let missing = not_found("/nope");
        assert_eq!(missing.status, 404);
        assert_eq!(missing.body["error"], "NOT_FOUND");
    }
}
