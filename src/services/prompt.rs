//! Grounded prompt composition.

use crate::models::{ChatMessage, Role, SourceSnippet};
use crate::services::llm::PromptMessage;

pub const SYSTEM_PROMPT: &str = "You are Jarvis, an AI assistant for our SaaS product. \
Answer in a friendly, concise, and helpful way. \
Use ONLY the given context; if you are unsure, say you do not know.";

/// Context marker sent when retrieval found nothing.
pub const NO_CONTEXT: &str = "(no context found)";

/// Number retrieved snippets as `Source 1: ...`, separated by blank lines.
pub fn format_context(snippets: &[SourceSnippet]) -> String {
    if snippets.is_empty() {
        return NO_CONTEXT.to_string();
    }
    snippets
        .iter()
        .enumerate()
        .map(|(i, s)| format!("Source {}: {}", i + 1, s.snippet))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Final user turn carrying the context and the question.
pub fn grounded_question(snippets: &[SourceSnippet], question: &str) -> String {
    format!(
        "Use the following context to answer the question. \
If the answer is not in the context, say you are not sure.\n\n\
Context:\n{}\n\nQuestion: {}",
        format_context(snippets),
        question
    )
}

/// System instruction, then prior history verbatim, then the grounded question.
pub fn build_messages(
    history: &[ChatMessage],
    snippets: &[SourceSnippet],
    question: &str,
) -> Vec<PromptMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(PromptMessage::system(SYSTEM_PROMPT));
    messages.extend(history.iter().map(|m| match m.role {
        Role::User => PromptMessage::user(m.content.clone()),
        Role::Assistant => PromptMessage::assistant(m.content.clone()),
    }));
    messages.push(PromptMessage::user(grounded_question(snippets, question)));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm::PromptRole;

    fn snippet(id: &str, text: &str) -> SourceSnippet {
        SourceSnippet {
            id: id.to_string(),
            snippet: text.to_string(),
        }
    }

    #[test]
    fn test_format_context_numbers_sources() {
        let context = format_context(&[
            snippet("doc1", "Task management"),
            snippet("doc4", "Project timelines"),
        ]);
        assert_eq!(
            context,
            "Source 1: Task management\n\nSource 2: Project timelines"
        );
    }

    #[test]
    fn test_empty_context_is_explicit() {
        assert_eq!(format_context(&[]), NO_CONTEXT);
        let question = grounded_question(&[], "Is there an API?");
        assert!(question.contains("Context:\n(no context found)\n\nQuestion: Is there an API?"));
    }

    #[test]
    fn test_build_messages_preserves_history_order_and_roles() {
        let history = vec![
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello! How can I help?"),
        ];
        let messages = build_messages(&history, &[snippet("doc2", "Pricing")], "How much?");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, PromptRole::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1], PromptMessage::user("Hi"));
        assert_eq!(messages[2], PromptMessage::assistant("Hello! How can I help?"));
        assert_eq!(messages[3].role, PromptRole::User);
        assert!(messages[3].content.starts_with("Use the following context"));
        assert!(messages[3].content.contains("Source 1: Pricing"));
        assert!(messages[3].content.ends_with("Question: How much?"));
    }
}
