//! Vision quality verdicts and retry feedback.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AppError;

/// Rubric used when the prompt template does not carry its own.
pub const DEFAULT_QUALITY_CRITERIA: &str = "Anatomical correctness (body proportions, limb count, facial features), \
Content appropriateness for professional publishing, \
No inappropriate or offensive content, \
No anatomical errors (extra limbs, distorted features, etc.)";

const GENERIC_REDO_HINT: &str =
    "Keep the subject anatomically correct and clearly related to the keyword.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    fn parse(field: &str, value: &Value) -> Result<Self, AppError> {
        match value.as_str().map(|s| s.trim().to_ascii_uppercase()) {
            Some(s) if s == "PASS" => Ok(Verdict::Pass),
            Some(s) if s == "FAIL" => Ok(Verdict::Fail),
            _ => Err(AppError::MalformedAssessment(format!(
                "{} must be PASS or FAIL, got {}",
                field, value
            ))),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => f.write_str("PASS"),
            Verdict::Fail => f.write_str("FAIL"),
        }
    }
}

/// Parsed vision verdict for one generated image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub body_proportions: Verdict,
    pub limb_count: Verdict,
    pub facial_features: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_alignment: Option<Verdict>,
    pub overall_assessment: Verdict,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failure_reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redo_hint: Option<String>,
    #[serde(default)]
    pub processing_time_ms: u64,
}

impl QualityAssessment {
    pub fn passed(&self) -> bool {
        self.overall_assessment == Verdict::Pass
    }

    /// Parse the first JSON object found in a free-form vision reply.
    pub fn from_reply(reply: &str) -> Result<Self, AppError> {
        let span = extract_json_object(reply)
            .ok_or_else(|| AppError::MalformedAssessment("no JSON object in reply".into()))?;
        let value: Value = serde_json::from_str(span)
            .map_err(|e| AppError::MalformedAssessment(format!("invalid JSON: {}", e)))?;

        let required = |field: &str| -> Result<Verdict, AppError> {
            let raw = value.get(field).ok_or_else(|| {
                AppError::MalformedAssessment(format!("missing required field '{}'", field))
            })?;
            Verdict::parse(field, raw)
        };

        let context_alignment = match value.get("context_alignment") {
            Some(Value::Null) | None => None,
            Some(raw) => Some(Verdict::parse("context_alignment", raw)?),
        };
        let failure_reasons = value
            .get("failure_reasons")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let redo_hint = value
            .get("redo_hint")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            body_proportions: required("body_proportions")?,
            limb_count: required("limb_count")?,
            facial_features: required("facial_features")?,
            context_alignment,
            overall_assessment: required("overall_assessment")?,
            failure_reasons,
            redo_hint,
            processing_time_ms: 0,
        })
    }

    /// Natural-language feedback for the next description attempt.
    pub fn feedback(&self) -> String {
        let reasons = if self.failure_reasons.is_empty() {
            let failed: Vec<&str> = [
                ("body proportions", Some(self.body_proportions)),
                ("limb count", Some(self.limb_count)),
                ("facial features", Some(self.facial_features)),
                ("context alignment", self.context_alignment),
            ]
            .into_iter()
            .filter(|(_, verdict)| *verdict == Some(Verdict::Fail))
            .map(|(name, _)| name)
            .collect();
            if failed.is_empty() {
                "overall assessment failed".to_string()
            } else {
                format!("{} failed", failed.join(", "))
            }
        } else {
            self.failure_reasons.join("; ")
        };
        let hint = self.redo_hint.as_deref().unwrap_or(GENERIC_REDO_HINT);
        format!("Previous image failed quality review: {}. Hint: {}", reasons, hint)
    }
}

/// First balanced `{...}` span, skipping braces inside string literals.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Title used in the rubric prompt: the image file name in title case,
/// else the keyword in title case.
pub fn image_title(image_url: &str, keyword: &str) -> String {
    let stem = url::Url::parse(image_url).ok().and_then(|url| {
        let name = url.path_segments()?.next_back()?.to_string();
        let stem = match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => name,
        };
        (!stem.trim().is_empty()).then_some(stem)
    });

    match stem {
        Some(stem) => title_case(&stem.replace(['_', '-'], " ")),
        None => title_case(keyword),
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_embedded_in_prose() {
        let reply = "Here is my review:\n```json\n{\"body_proportions\": \"PASS\", \"limb_count\": \"pass\", \
            \"facial_features\": \"PASS\", \"context_alignment\": \"FAIL\", \"overall_assessment\": \"FAIL\", \
            \"failure_reasons\": [\"missing subject\", \" \"], \"redo_hint\": \"Show a raccoon on a roof {clearly}\"}\n```\nThanks.";

        let assessment = QualityAssessment::from_reply(reply).unwrap();
        assert_eq!(assessment.limb_count, Verdict::Pass);
        assert_eq!(assessment.context_alignment, Some(Verdict::Fail));
        assert!(!assessment.passed());
        assert_eq!(assessment.failure_reasons, vec!["missing subject"]);
        assert_eq!(assessment.redo_hint.as_deref(), Some("Show a raccoon on a roof {clearly}"));
    }

    #[test]
    fn reply_without_object_is_malformed() {
        let err = QualityAssessment::from_reply("Looks great to me.").unwrap_err();
        assert!(matches!(err, AppError::MalformedAssessment(_)));
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let err = QualityAssessment::from_reply(
            r#"{"body_proportions": "PASS", "limb_count": "PASS", "overall_assessment": "PASS"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("facial_features"));
    }

    #[test]
    fn unknown_verdict_is_malformed() {
        let err = QualityAssessment::from_reply(
            r#"{"body_proportions": "MAYBE", "limb_count": "PASS", "facial_features": "PASS", "overall_assessment": "PASS"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::MalformedAssessment(_)));
    }

    #[test]
    fn unknown_context_alignment_is_malformed_but_null_is_absent() {
        let err = QualityAssessment::from_reply(
            r#"{"body_proportions": "PASS", "limb_count": "PASS", "facial_features": "PASS",
                "context_alignment": "MAYBE", "overall_assessment": "PASS"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("context_alignment"));

        let assessment = QualityAssessment::from_reply(
            r#"{"body_proportions": "PASS", "limb_count": "PASS", "facial_features": "PASS",
                "context_alignment": null, "overall_assessment": "PASS"}"#,
        )
        .unwrap();
        assert_eq!(assessment.context_alignment, None);
    }

    #[test]
    fn extraction_ignores_braces_inside_strings() {
        let text = r#"prefix {"a": "}{", "b": {"c": 1}} trailing {"d": 2}"#;
        assert_eq!(extract_json_object(text), Some(r#"{"a": "}{", "b": {"c": 1}}"#));
        assert_eq!(extract_json_object("{ unbalanced"), None);
    }

    #[test]
    fn feedback_prefers_reasons_then_failed_criteria() {
        let mut assessment = QualityAssessment {
            body_proportions: Verdict::Pass,
            limb_count: Verdict::Fail,
            facial_features: Verdict::Pass,
            context_alignment: Some(Verdict::Fail),
            overall_assessment: Verdict::Fail,
            failure_reasons: vec![],
            redo_hint: None,
            processing_time_ms: 0,
        };
        assert_eq!(
            assessment.feedback(),
            format!(
                "Previous image failed quality review: limb count, context alignment failed. Hint: {}",
                GENERIC_REDO_HINT
            )
        );

        assessment.failure_reasons = vec!["missing subject".into(), "extra leg".into()];
        assessment.redo_hint = Some("Center the raccoon".into());
        assert_eq!(
            assessment.feedback(),
            "Previous image failed quality review: missing subject; extra leg. Hint: Center the raccoon"
        );
    }

    #[test]
    fn title_comes_from_file_name_or_keyword() {
        assert_eq!(
            image_title("https://cdn.example.com/gen/raccoon_on-roof.png?x=1", "ignored"),
            "Raccoon On Roof"
        );
        assert_eq!(image_title("https://cdn.example.com/", "raccoon removal houston"), "Raccoon Removal Houston");
        assert_eq!(image_title("not a url", "pest control"), "Pest Control");
    }
}
