//! Markdown rendering of a finished article.

use std::sync::OnceLock;

use minijinja::{Environment, UndefinedBehavior, context};
use serde::Serialize;

use super::AppError;
use super::article::ContentBlock;
use super::artifacts::ArticleArtifact;

const ARTICLE_TEMPLATE_NAME: &str = "article.md";
const ARTICLE_TEMPLATE: &str = include_str!("../assets/templates/article.md.j2");

static ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(Debug, Serialize)]
struct SectionView {
    number: usize,
    headline: String,
    toc_label: String,
    anchor: String,
    blocks: Vec<String>,
}

/// Render the article as Markdown with a linked table of contents.
///
/// The table of contents and section headings use the same headline, so every
/// TOC link resolves to the `<a id>` anchor emitted under its heading.
pub fn render_markdown(article: &ArticleArtifact) -> Result<String, AppError> {
    let sections: Vec<SectionView> = article
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            let number = index + 1;
            let headline = section.display_headline().to_string();
            SectionView {
                number,
                anchor: slug(&format!("{}-{}", number, headline)),
                toc_label: escape_link_text(&headline),
                headline,
                blocks: section.content.content.iter().map(render_block).collect(),
            }
        })
        .collect();

    let env = environment()?;
    let template = env
        .get_template(ARTICLE_TEMPLATE_NAME)
        .map_err(|e| AppError::config_error(format!("article template unavailable: {}", e)))?;
    let rendered = template
        .render(context! { title => escape_markdown(&article.keyword), sections => sections })
        .map_err(|e| AppError::config_error(format!("article template failed: {}", e)))?;

    Ok(format!("{}\n", rendered.trim_end()))
}

fn environment() -> Result<&'static Environment<'static>, AppError> {
    if let Some(env) = ENV.get() {
        return Ok(env);
    }
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_trim_blocks(true);
    env.add_template(ARTICLE_TEMPLATE_NAME, ARTICLE_TEMPLATE)
        .map_err(|e| AppError::config_error(format!("invalid article template: {}", e)))?;
    Ok(ENV.get_or_init(|| env))
}

fn render_block(block: &ContentBlock) -> String {
    match block {
        ContentBlock::Paragraph(text) => {
            if contains_paragraph_tag(text) {
                text.trim().to_string()
            } else {
                escape_markdown(text)
            }
        }
        ContentBlock::Headline3(text) => format!("### {}", strip_html(text)),
        ContentBlock::OrderedList(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, strip_html(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        ContentBlock::UnorderedList(items) => {
            items.iter().map(|item| format!("- {}", strip_html(item))).collect::<Vec<_>>().join("\n")
        }
    }
}

/// Backslash-escape Markdown control characters.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '`' | '*' | '_' | '{' | '}' | '[' | ']' | '(' | ')' | '#' | '+' | '-' | '.' | '!'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape characters that would end a Markdown link label early.
fn escape_link_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Drop `<...>` tags and trim.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        match rest[open..].find('>') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Anchor slug: lowercase, keep `[a-z0-9 -]`, whitespace runs become `-`.
pub fn slug(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

fn contains_paragraph_tag(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().filter(|(_, b)| **b == b'<').any(|(i, _)| {
        let mut j = i + 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        j + 1 < bytes.len()
            && bytes[j].eq_ignore_ascii_case(&b'p')
            && (bytes[j + 1] == b'>' || bytes[j + 1].is_ascii_whitespace())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::article::SectionContent;
    use crate::domain::artifacts::{ArticleSection, PhaseMetadata};
    use crate::domain::outline::SectionOutline;

    fn section(outline_headline: &str, generated: &str, blocks: Vec<ContentBlock>) -> ArticleSection {
        ArticleSection {
            outline: SectionOutline {
                headline: outline_headline.into(),
                description: String::new(),
                header_terms: vec![],
                content_terms: vec![],
            },
            content: SectionContent { headline: generated.into(), content: blocks },
            metadata: PhaseMetadata::default(),
        }
    }

    #[test]
    fn renders_title_toc_and_blocks() {
        let article = ArticleArtifact::assemble(
            "raccoon removal houston",
            vec![
                section(
                    "Why Raccoons Move In",
                    "",
                    vec![
                        ContentBlock::Paragraph("Attics are warm. Food is close!".into()),
                        ContentBlock::Headline3("<b>Entry points</b>".into()),
                        ContentBlock::OrderedList(vec!["<li>Roof vents</li>".into(), "Chimneys".into()]),
                    ],
                ),
                section(
                    "Costs",
                    "What Removal Costs in Houston",
                    vec![
                        ContentBlock::Paragraph("<p>Prices vary.</p>".into()),
                        ContentBlock::UnorderedList(vec!["Inspection".into()]),
                    ],
                ),
            ],
            0,
        );

        let md = render_markdown(&article).unwrap();
        let expected = "\
# raccoon removal houston

## Table of Contents
- [1. Why Raccoons Move In](#1-why-raccoons-move-in)
- [2. What Removal Costs in Houston](#2-what-removal-costs-in-houston)

## 1. Why Raccoons Move In
<a id=\"1-why-raccoons-move-in\"></a>

Attics are warm\\. Food is close\\!

### Entry points

1. Roof vents
2. Chimneys

## 2. What Removal Costs in Houston
<a id=\"2-what-removal-costs-in-houston\"></a>

<p>Prices vary.</p>

- Inspection
";
        assert_eq!(md, expected);
    }

    #[test]
    fn every_toc_anchor_has_a_target() {
        let article = ArticleArtifact::assemble(
            "pest control",
            vec![section("Intro", "Getting Started: A Guide", vec![]), section("Q&A", "", vec![])],
            0,
        );
        let md = render_markdown(&article).unwrap();
        for anchor in ["1-getting-started-a-guide", "2-qa"] {
            assert!(md.contains(&format!("](#{})", anchor)));
            assert!(md.contains(&format!("<a id=\"{}\"></a>", anchor)));
        }
    }

    #[test]
    fn toc_label_escapes_brackets_but_heading_stays_raw() {
        let article = ArticleArtifact::assemble(
            "raccoon removal",
            vec![section("Costs", "Costs [2026] Guide", vec![])],
            0,
        );
        let md = render_markdown(&article).unwrap();

        assert!(md.contains("- [1. Costs \\[2026\\] Guide](#1-costs-2026-guide)"));
        assert!(md.contains("## 1. Costs [2026] Guide\n"));
    }

    #[test]
    fn escapes_markdown_control_characters() {
        assert_eq!(escape_markdown("a_b *c* [d](e) #1 - x."), "a\\_b \\*c\\* \\[d\\]\\(e\\) \\#1 \\- x\\.");
    }

    #[test]
    fn strips_tags_but_keeps_unclosed_text() {
        assert_eq!(strip_html("  <li><em>Seal</em> gaps</li> "), "Seal gaps");
        assert_eq!(strip_html("a < b"), "a < b");
    }

    #[test]
    fn detects_paragraph_tags_only() {
        assert!(contains_paragraph_tag("<p>x</p>"));
        assert!(contains_paragraph_tag("< P class=\"lead\">x"));
        assert!(!contains_paragraph_tag("<pre>x</pre>"));
        assert!(!contains_paragraph_tag("plain text"));
    }

    #[test]
    fn slug_collapses_whitespace() {
        assert_eq!(slug("3-Humane  Trapping & Exclusion"), "3-humane-trapping-exclusion");
    }
}
