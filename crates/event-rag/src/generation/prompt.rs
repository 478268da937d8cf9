//! Prompt templates for cited answer generation

use crate::types::RetrievedDocument;

/// Fixed instructions appended after the sources
const ANSWER_INSTRUCTIONS: &str = r#"INSTRUCTIONS:
1. Answer the question in at most 2-3 sentences using ONLY the sources above.
2. Cite every factual claim with the number of its source in square brackets, e.g. [1].
3. When a claim is supported by several sources, place the markers next to each other, e.g. [1][3].
4. Use only the source numbers listed above; never invent a source number."#;

/// Prompt builder for event questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Render the retrieved documents as numbered source blocks, in position order
    pub fn build_context(docs: &[RetrievedDocument]) -> String {
        let mut ordered: Vec<&RetrievedDocument> = docs.iter().collect();
        ordered.sort_by_key(|d| d.position_id);

        ordered
            .into_iter()
            .map(Self::format_source_block)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn format_source_block(doc: &RetrievedDocument) -> String {
        let mut block = format!("Source {}:\n", doc.position_id);

        if let Some(title) = &doc.metadata.title {
            block.push_str(&format!("Title: {}\n", title));
        }
        if let Some(url) = &doc.metadata.url {
            block.push_str(&format!("URL: {}\n", url));
        }
        block.push_str(&format!("Content: {}", doc.content));

        block
    }

    /// Build the full generation prompt
    pub fn build_prompt(question: &str, docs: &[RetrievedDocument]) -> String {
        format!(
            r#"You answer questions about a disaster event using the numbered sources below.

SOURCES:
{context}

{instructions}

Question: {question}

Answer:"#,
            context = Self::build_context(docs),
            instructions = ANSWER_INSTRUCTIONS,
            question = question.trim(),
        )
    }
}
