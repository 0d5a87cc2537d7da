//! AI assistance: text refinement and resume import through the LLM client.
//!
//! Handlers hold an `Arc<dyn Assistant>`; the production backend is
//! `LlmAssistant`. The assistant is absent from `AppState` when no API key is
//! configured, and the AI endpoints answer 503.

pub mod handlers;
pub mod import;
pub mod prompts;

use async_trait::async_trait;
use tracing::debug;

use crate::llm_client::{ImageInput, LlmClient, LlmError};
use crate::resume::model::ResumeData;

use prompts::{
    EXTRACT_IMAGE_PROMPT, EXTRACT_PROMPT_TEMPLATE, EXTRACT_SYSTEM, REFINE_PROMPT_TEMPLATE,
    REFINE_SYSTEM,
};

/// Longest document text sent for extraction; longer documents are truncated.
const MAX_DOCUMENT_CHARS: usize = 40_000;

#[async_trait]
pub trait Assistant: Send + Sync {
    /// Rewrites `text` according to a free-form `instruction`.
    async fn refine(&self, text: &str, instruction: &str) -> Result<String, LlmError>;

    /// Extracts a normalized resume from plain document text.
    async fn extract_resume(&self, document: &str) -> Result<ResumeData, LlmError>;

    /// Extracts a normalized resume from a PNG or JPEG image of the document.
    async fn extract_resume_from_image(
        &self,
        media_type: &str,
        image: &[u8],
    ) -> Result<ResumeData, LlmError>;
}

pub struct LlmAssistant {
    llm: LlmClient,
}

impl LlmAssistant {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Assistant for LlmAssistant {
    async fn refine(&self, text: &str, instruction: &str) -> Result<String, LlmError> {
        let prompt = REFINE_PROMPT_TEMPLATE
            .replace("{instruction}", instruction.trim())
            .replace("{text}", text);
        let refined = self.llm.call_text(&prompt, REFINE_SYSTEM).await?;
        Ok(strip_wrapping_quotes(&refined).to_string())
    }

    async fn extract_resume(&self, document: &str) -> Result<ResumeData, LlmError> {
        let document = truncate_chars(document, MAX_DOCUMENT_CHARS);
        debug!(chars = document.chars().count(), "extracting resume from document text");
        let prompt = EXTRACT_PROMPT_TEMPLATE.replace("{document}", document);
        let data: ResumeData = self.llm.call_json(&prompt, EXTRACT_SYSTEM).await?;
        Ok(data.normalize())
    }

    async fn extract_resume_from_image(
        &self,
        media_type: &str,
        image: &[u8],
    ) -> Result<ResumeData, LlmError> {
        debug!(media_type, bytes = image.len(), "extracting resume from image");
        let image = ImageInput {
            media_type,
            data: image,
        };
        let data: ResumeData = self
            .llm
            .call_json_with_image(image, EXTRACT_IMAGE_PROMPT, EXTRACT_SYSTEM)
            .await?;
        Ok(data.normalize())
    }
}

/// Removes one pair of surrounding double quotes, which models like to echo back.
fn strip_wrapping_quotes(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
        .trim()
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_wrapping_quotes() {
        assert_eq!(strip_wrapping_quotes("\"Led a team of 5\""), "Led a team of 5");
        assert_eq!(strip_wrapping_quotes("Said \"hi\" twice"), "Said \"hi\" twice");
        assert_eq!(strip_wrapping_quotes("\"unbalanced"), "\"unbalanced");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_refine_prompt_shape() {
        let prompt = REFINE_PROMPT_TEMPLATE
            .replace("{instruction}", "Make it concise")
            .replace("{text}", "I did many things");
        assert_eq!(prompt, "Make it concise:\n\n\"I did many things\"");
    }

    #[test]
    fn test_extraction_prompts_share_output_shape() {
        assert!(EXTRACT_PROMPT_TEMPLATE.ends_with("DOCUMENT:\n{document}"));
        assert!(!EXTRACT_IMAGE_PROMPT.contains("{document}"));
        for prompt in [EXTRACT_PROMPT_TEMPLATE, EXTRACT_IMAGE_PROMPT] {
            assert!(prompt.contains("\"personalInfo\""));
            assert!(prompt.contains("Group consecutive positions"));
        }
    }
}
