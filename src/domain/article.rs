use serde::{Deserialize, Serialize};

use super::AppError;

/// One renderable block of section body content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum ContentBlock {
    #[serde(rename = "paragraph")]
    Paragraph(String),
    #[serde(rename = "ordered-list")]
    OrderedList(Vec<String>),
    #[serde(rename = "unordered-list")]
    UnorderedList(Vec<String>),
    #[serde(rename = "headline-3")]
    Headline3(String),
}

impl ContentBlock {
    /// Whitespace-delimited word count.
    pub fn word_count(&self) -> usize {
        match self {
            ContentBlock::Paragraph(text) | ContentBlock::Headline3(text) => count_words(text),
            ContentBlock::OrderedList(items) | ContentBlock::UnorderedList(items) => {
                items.iter().map(|i| count_words(i)).sum()
            }
        }
    }
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Generated body of one article section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionContent {
    #[serde(default)]
    pub headline: String,
    pub content: Vec<ContentBlock>,
}

impl SectionContent {
    /// Parse `{"section": {...}}` from the section-writing completion.
    pub fn from_completion(content: &str) -> Result<Self, AppError> {
        #[derive(Deserialize)]
        struct Reply {
            section: SectionContent,
        }

        let reply: Reply =
            serde_json::from_str(content).map_err(|e| AppError::parse("section content", e))?;
        reply.section.validate()?;
        Ok(reply.section)
    }

    fn validate(&self) -> Result<(), AppError> {
        for (index, block) in self.content.iter().enumerate() {
            if let ContentBlock::OrderedList(items) | ContentBlock::UnorderedList(items) = block
                && items.is_empty()
            {
                return Err(AppError::parse(
                    "section content",
                    format!("list block {} has no items", index + 1),
                ));
            }
        }
        Ok(())
    }

    pub fn word_count(&self) -> usize {
        self.content.iter().map(ContentBlock::word_count).sum()
    }
}
