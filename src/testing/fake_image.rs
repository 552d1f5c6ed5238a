use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::{AppError, GeneratedImage, QualityAssessment, StyleParams};
use crate::ports::{AssessmentRequest, ImageGenerator, QualityAssessor};

#[derive(Clone, Default)]
pub struct FakeImageGenerator {
    prompts: Arc<Mutex<Vec<String>>>,
    pub download_fails: Arc<Mutex<bool>>,
}

impl FakeImageGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ImageGenerator for FakeImageGenerator {
    fn generate(&self, prompt: &str, style: &StyleParams) -> Result<GeneratedImage, AppError> {
        let mut prompts = self.prompts.lock().unwrap();
        prompts.push(prompt.to_string());
        Ok(GeneratedImage {
            image_url: format!("https://images.example/raccoon_on_roof_{}.png", prompts.len()),
            resolution: "1312x736".into(),
            seed: 42 + prompts.len() as u64,
            is_image_safe: true,
            style_type: serde_json::to_value(style.style_type)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            created: "2026-01-05T10:00:00Z".into(),
        })
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, AppError> {
        if *self.download_fails.lock().unwrap() {
            return Err(AppError::Transport { service: "fake", status: Some(404), message: url.to_string() });
        }
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

/// Assessor fake returning scripted verdicts; the last one repeats.
#[derive(Clone, Default)]
pub struct FakeQualityAssessor {
    verdicts: Arc<Mutex<VecDeque<Result<QualityAssessment, String>>>>,
    requests: Arc<Mutex<Vec<AssessmentRequest>>>,
}

impl FakeQualityAssessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, verdict: QualityAssessment) {
        self.verdicts.lock().unwrap().push_back(Ok(verdict));
    }

    pub fn push_malformed(&self, reason: &str) {
        self.verdicts.lock().unwrap().push_back(Err(reason.to_string()));
    }

    pub fn requests(&self) -> Vec<AssessmentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl QualityAssessor for FakeQualityAssessor {
    fn assess(&self, request: AssessmentRequest) -> Result<QualityAssessment, AppError> {
        self.requests.lock().unwrap().push(request);
        let mut verdicts = self.verdicts.lock().unwrap();
        let next = if verdicts.len() > 1 { verdicts.pop_front() } else { verdicts.front().cloned() };
        match next {
            Some(Ok(verdict)) => Ok(verdict),
            Some(Err(reason)) => Err(AppError::MalformedAssessment(reason)),
            None => panic!("no scripted verdict"),
        }
    }
}
