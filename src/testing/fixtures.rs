//! Canned provider replies for pipeline tests.

use serde_json::{Value, json};

use crate::domain::{QualityAssessment, Verdict};

pub const SECTION_HEADLINES: [&str; 6] = [
    "Signs of Raccoons in Your Houston Home",
    "Why Raccoons Choose Attics",
    "Humane Raccoon Removal Methods",
    "Texas Wildlife Laws",
    "Repairing Entry Points",
    "Preventing Future Infestations",
];

/// Ready research payload with 5 H2 terms and 10 basic body terms.
pub fn research_payload() -> Value {
    json!({
        "status": "ready",
        "terms": {
            "title": [{"t": "raccoon removal houston", "usage_pc": 90}],
            "h2": [
                {"t": "raccoon removal", "usage_pc": 80},
                {"t": "wildlife control", "usage_pc": 60},
                {"t": "attic", "usage_pc": 55},
                {"t": "humane trapping", "usage_pc": 40},
                {"t": "exclusion", "usage_pc": 30}
            ],
            "content_basic": [
                {"t": "raccoons", "usage_pc": 95, "sugg_usage": [8, 14]},
                {"t": "attic", "usage_pc": 70, "sugg_usage": [3, 6]},
                {"t": "houston", "usage_pc": 68, "sugg_usage": [2, 5]},
                {"t": "trap", "usage_pc": 50, "sugg_usage": [2, 4]},
                {"t": "damage", "usage_pc": 45, "sugg_usage": [1, 3]},
                {"t": "wildlife", "usage_pc": 44, "sugg_usage": [2, 4]},
                {"t": "roof", "usage_pc": 40, "sugg_usage": [1, 3]},
                {"t": "chimney", "usage_pc": 33, "sugg_usage": [1, 2]},
                {"t": "droppings", "usage_pc": 25, "sugg_usage": [1, 2]},
                {"t": "inspection", "usage_pc": 20, "sugg_usage": [1, 2]}
            ]
        }
    })
}

pub fn outline_reply() -> String {
    let sections: Vec<Value> = SECTION_HEADLINES
        .iter()
        .map(|h| json!({"header": h, "description": format!("What readers need to know: {}", h)}))
        .collect();
    json!({ "sections": sections }).to_string()
}

pub fn merge_reply() -> String {
    let sections: Vec<Value> = SECTION_HEADLINES
        .iter()
        .map(|h| {
            json!({
                "headline": h,
                "description": format!("Covers {}", h),
                "header-terms": ["raccoon removal"],
                "content-terms": ["raccoons", "attic", "houston"]
            })
        })
        .collect();
    json!({ "sections": sections }).to_string()
}

/// Section reply echoing the headline found in the user message.
pub fn section_reply(user_message: &str) -> String {
    let headline = SECTION_HEADLINES
        .iter()
        .find(|h| user_message.contains(*h))
        .copied()
        .unwrap_or("Untitled");
    json!({
        "section": {
            "headline": headline,
            "content": [
                {"type": "paragraph", "content": format!("Raccoons in Houston attics: {}.", headline)},
                {"type": "unordered-list", "content": ["Inspect the roof", "Seal the chimney"]}
            ]
        }
    })
    .to_string()
}

pub fn concepts_reply() -> String {
    json!({
        "concepts": [
            {"id": "c1", "title": "Rooftop raccoon", "description": "A raccoon on a Houston roof at dusk", "key_elements": ["raccoon", "roof"]},
            {"id": "c2", "title": "Technician", "description": "A technician setting a humane trap", "key_elements": ["trap"]}
        ]
    })
    .to_string()
}

pub fn rating_reply() -> String {
    json!({
        "ratings": [{"concept_id": "c1", "overall_score": 9}],
        "best_concept": {"concept_id": "c1", "title": "Rooftop raccoon", "description": "A raccoon on a Houston roof at dusk"}
    })
    .to_string()
}

pub fn entities_reply() -> String {
    json!({
        "required_entities": [{"entity": "raccoon", "category": "animal", "importance": "high"}],
        "domain_validation": {"accuracy_notes": "Raccoons have four legs and a ringed tail"},
        "optimized_concept": {"title": "Rooftop raccoon", "description": "A single raccoon on a shingle roof"}
    })
    .to_string()
}

pub fn final_prompt_reply(description: &str) -> String {
    json!({
        "image_description": description,
        "image_title": "Raccoon on a Houston Roof"
    })
    .to_string()
}

pub fn assessment(pass: bool, reasons: &[&str]) -> QualityAssessment {
    let verdict = if pass { Verdict::Pass } else { Verdict::Fail };
    QualityAssessment {
        body_proportions: Verdict::Pass,
        limb_count: Verdict::Pass,
        facial_features: Verdict::Pass,
        context_alignment: Some(verdict),
        overall_assessment: verdict,
        failure_reasons: reasons.iter().map(|r| r.to_string()).collect(),
        redo_hint: (!pass).then(|| "Show the raccoon clearly on the roof".to_string()),
        processing_time_ms: 0,
    }
}
