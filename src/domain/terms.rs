//! Canonical research-term model and the adapter that builds it from raw
//! research responses.
//!
//! The provider returns the same information in several shapes depending on
//! plan and API version (`terms.*` arrays of `{t, usage_pc}`, newline separated
//! `terms_txt.*` text, bare strings). [`extract_structured_terms`] accepts all
//! of them; missing numbers become 0 and missing arrays become empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const HEADING_LIMITS: (usize, usize, usize) = (5, 8, 5);
const BASIC_TERM_LIMIT: usize = 20;
const EXTENDED_TERM_LIMIT: usize = 15;

/// A term with its observed usage across ranking competitors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredTerm {
    pub term: String,
    pub usage_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_usage: Option<[u32; 2]>,
}

impl StructuredTerm {
    /// Build a term, clamping usage into `[0, 100]` and ordering the range.
    pub fn new(term: impl Into<String>, usage_percentage: f64, suggested: Option<(u32, u32)>) -> Self {
        let usage_percentage =
            if usage_percentage.is_finite() { usage_percentage.clamp(0.0, 100.0) } else { 0.0 };
        let suggested_usage = suggested.map(|(a, b)| if a <= b { [a, b] } else { [b, a] });
        Self { term: term.into(), usage_percentage, suggested_usage }
    }

    fn heading_label(&self) -> String {
        format!("{} ({}%)", self.term, self.usage_percentage)
    }

    fn body_label(&self) -> String {
        match self.suggested_usage {
            Some([min, max]) => format!(
                "{} ({}% usage, suggested: {}-{} times)",
                self.term, self.usage_percentage, min, max
            ),
            None => format!("{} ({}% usage)", self.term, self.usage_percentage),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadingTermSet {
    #[serde(default)]
    pub h1: Vec<StructuredTerm>,
    #[serde(default)]
    pub h2: Vec<StructuredTerm>,
    #[serde(default)]
    pub h3: Vec<StructuredTerm>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyTermSet {
    #[serde(default)]
    pub basic: Vec<StructuredTerm>,
    #[serde(default)]
    pub extended: Vec<StructuredTerm>,
}

impl BodyTermSet {
    pub fn len(&self) -> usize {
        self.basic.len() + self.extended.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub term: String,
    #[serde(default)]
    pub importance: f64,
    #[serde(default)]
    pub relevance: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Questions {
    #[serde(default)]
    pub suggested: Vec<String>,
    #[serde(default)]
    pub paa: Vec<String>,
    #[serde(default)]
    pub content: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub content_score: f64,
    #[serde(default)]
    pub readability: f64,
    #[serde(default)]
    pub word_count: u64,
    #[serde(default)]
    pub content_len: u64,
}

/// Everything phase 1 extracts from a ready research query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchTerms {
    pub headings: HeadingTermSet,
    pub body_terms: BodyTermSet,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub questions: Questions,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
}

/// Map a raw research response into the canonical term model.
pub fn extract_structured_terms(raw: &Value) -> ResearchTerms {
    let terms = raw.get("terms").unwrap_or(&Value::Null);
    let terms_txt = raw.get("terms_txt").unwrap_or(&Value::Null);
    let ideas = raw.get("ideas").unwrap_or(&Value::Null);

    let heading = |key: &str, fallback: Option<&str>| {
        let mut found = term_array(terms.get(key));
        if found.is_empty() {
            found = text_lines(terms_txt.get(key));
        }
        if found.is_empty()
            && let Some(fallback) = fallback
        {
            found = term_array(terms.get(fallback));
        }
        found
    };

    let body = |key: &str, ranged: &str, fallback: Option<&str>| {
        let mut found = term_array(terms.get(key));
        if found.is_empty() {
            found = ranged_lines(terms_txt.get(ranged));
        }
        if found.is_empty() {
            found = text_lines(terms_txt.get(key));
        }
        if found.is_empty()
            && let Some(fallback) = fallback
        {
            found = term_array(terms.get(fallback));
        }
        found
    };

    ResearchTerms {
        headings: HeadingTermSet {
            h1: heading("h1", Some("title")),
            h2: heading("h2", None),
            h3: heading("h3", None),
        },
        body_terms: BodyTermSet {
            basic: body("content_basic", "content_basic_w_ranges", Some("desc")),
            extended: body("content_extended", "content_extended_w_ranges", None),
        },
        entities: entities(terms.get("entities")),
        questions: Questions {
            suggested: questions(ideas.get("suggest_questions")),
            paa: first_non_empty(&[
                questions(ideas.get("people_also_ask")),
                questions(ideas.get("paa_questions")),
                questions(ideas.get("paa")),
            ]),
            content: questions(ideas.get("content_questions")),
        },
        competitors: competitors(raw.get("competitors")),
    }
}

/// `H1 Terms: ...` lines for the outline prompt (top 5 H1, 8 H2, 5 H3).
pub fn format_heading_terms(headings: &HeadingTermSet) -> String {
    let (h1, h2, h3) = HEADING_LIMITS;
    let levels = [("H1", &headings.h1, h1), ("H2", &headings.h2, h2), ("H3", &headings.h3, h3)];

    levels
        .iter()
        .filter(|(_, terms, _)| !terms.is_empty())
        .map(|(label, terms, limit)| {
            let listed: Vec<String> = terms.iter().take(*limit).map(|t| t.heading_label()).collect();
            format!("{} Terms: {}", label, listed.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `Basic Terms: ...` / `Extended Terms: ...` lines for the merge prompt,
/// most-used first (top 20 basic, 15 extended).
pub fn format_body_terms(body: &BodyTermSet) -> String {
    let top = |terms: &[StructuredTerm], limit: usize| {
        let mut sorted: Vec<&StructuredTerm> = terms.iter().collect();
        sorted.sort_by(|a, b| b.usage_percentage.total_cmp(&a.usage_percentage));
        sorted.into_iter().take(limit).map(|t| t.body_label()).collect::<Vec<_>>().join(", ")
    };

    format!(
        "Basic Terms: {}\nExtended Terms: {}",
        top(&body.basic, BASIC_TERM_LIMIT),
        top(&body.extended, EXTENDED_TERM_LIMIT)
    )
}

fn term_array(value: Option<&Value>) -> Vec<StructuredTerm> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => non_blank(s).map(|t| StructuredTerm::new(t, 0.0, None)),
            Value::Object(obj) => {
                let term = obj
                    .get("t")
                    .or_else(|| obj.get("term"))
                    .and_then(Value::as_str)
                    .and_then(non_blank)?;
                let usage = obj
                    .get("usage_pc")
                    .or_else(|| obj.get("usage_percentage"))
                    .and_then(number)
                    .unwrap_or(0.0);
                let suggested =
                    obj.get("sugg_usage").or_else(|| obj.get("suggested_usage")).and_then(range);
                Some(StructuredTerm::new(term, usage, suggested))
            }
            _ => None,
        })
        .collect()
}

fn text_lines(value: Option<&Value>) -> Vec<StructuredTerm> {
    let Some(Value::String(text)) = value else {
        return Vec::new();
    };
    text.lines().filter_map(non_blank).map(|t| StructuredTerm::new(t, 0.0, None)).collect()
}

/// Lines shaped like `term: 2-5x` or `term: 2-5`.
fn ranged_lines(value: Option<&Value>) -> Vec<StructuredTerm> {
    let Some(Value::String(text)) = value else {
        return Vec::new();
    };
    text.lines()
        .filter_map(non_blank)
        .map(|line| match line.rsplit_once(':') {
            Some((term, spec)) => {
                let spec = spec.trim().trim_end_matches('x').trim();
                let parsed = spec.split_once('-').and_then(|(a, b)| {
                    Some((a.trim().parse::<u32>().ok()?, b.trim().parse::<u32>().ok()?))
                });
                match parsed {
                    Some(pair) => StructuredTerm::new(term.trim(), 0.0, Some(pair)),
                    None => StructuredTerm::new(line, 0.0, None),
                }
            }
            None => StructuredTerm::new(line, 0.0, None),
        })
        .collect()
}

fn entities(value: Option<&Value>) -> Vec<Entity> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => non_blank(s).map(|term| Entity {
                term: term.to_string(),
                importance: 0.0,
                relevance: 0.0,
                confidence: 0.0,
                links: Vec::new(),
            }),
            Value::Object(obj) => {
                let term = ["t", "name", "text"]
                    .iter()
                    .find_map(|k| obj.get(*k).and_then(Value::as_str).and_then(non_blank))?;
                Some(Entity {
                    term: term.to_string(),
                    importance: obj.get("importance").and_then(number).unwrap_or(0.0),
                    relevance: obj.get("relevance").and_then(number).unwrap_or(0.0),
                    confidence: obj.get("confidence").and_then(number).unwrap_or(0.0),
                    links: pairs(obj.get("links")),
                })
            }
            _ => None,
        })
        .collect()
}

fn questions(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => non_blank(s).map(str::to_string),
            Value::Object(obj) => obj
                .get("q")
                .or_else(|| obj.get("question"))
                .and_then(Value::as_str)
                .and_then(non_blank)
                .map(str::to_string),
            _ => None,
        })
        .collect()
}

fn competitors(value: Option<&Value>) -> Vec<Competitor> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .enumerate()
        .map(|(index, obj)| {
            let text = |key: &str| obj.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
            Competitor {
                rank: obj.get("rank").and_then(number).map(|r| r as u32).unwrap_or(index as u32 + 1),
                url: text("url"),
                title: text("title"),
                desc: text("desc"),
                headers: pairs(obj.get("headers")),
                content_score: obj.get("content_score").and_then(number).unwrap_or(0.0),
                readability: obj.get("readability").and_then(number).unwrap_or(0.0),
                word_count: obj.get("word_count").and_then(number).unwrap_or(0.0) as u64,
                content_len: obj.get("content_len").and_then(number).unwrap_or(0.0) as u64,
            }
        })
        .collect()
}

fn first_non_empty(candidates: &[Vec<String>]) -> Vec<String> {
    candidates.iter().find(|c| !c.is_empty()).cloned().unwrap_or_default()
}

fn pairs(value: Option<&Value>) -> Vec<(String, String)> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let pair = item.as_array()?;
            let first = pair.first()?.as_str()?;
            let second = pair.get(1).and_then(Value::as_str).unwrap_or_default();
            Some((first.to_string(), second.to_string()))
        })
        .collect()
}

fn range(value: &Value) -> Option<(u32, u32)> {
    let pair = value.as_array()?;
    let min = number(pair.first()?)?;
    let max = number(pair.get(1)?)?;
    Some((min.max(0.0) as u32, max.max(0.0) as u32))
}

/// Numbers sometimes arrive as strings.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
