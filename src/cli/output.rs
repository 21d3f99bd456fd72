use std::fmt::Write as FmtWrite;

use serde::Serialize;

use crate::models::{ChatReply, OutputFormat, ServiceState};
use crate::services::IngestStats;

pub trait Formatter {
    fn format_status(&self, status: &StatusInfo) -> String;
    fn format_reply(&self, reply: &ChatReply) -> String;
    fn format_ingest_stats(&self, stats: &IngestStats) -> String;
    fn format_message(&self, message: &str) -> String;
    fn format_error(&self, error: &str) -> String;
}

/// Downstream dependency status for `jarvis status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub llm: ServiceState,
    pub llm_url: String,
    pub llm_model: String,
    pub vector_db: ServiceState,
    pub vector_url: String,
    pub collection: String,
    pub points: Option<u64>,
}

fn state_marker(state: ServiceState) -> &'static str {
    match state {
        ServiceState::Online => "[ONLINE]",
        ServiceState::Offline => "[OFFLINE]",
    }
}

fn state_emoji(state: ServiceState) -> &'static str {
    match state {
        ServiceState::Online => "✅",
        ServiceState::Offline => "❌",
    }
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "Status").unwrap();
        writeln!(output, "------").unwrap();

        writeln!(output, "Language Model: {}", state_marker(status.llm)).unwrap();
        writeln!(output, "  URL:         {}", status.llm_url).unwrap();
        writeln!(output, "  Model:       {}", status.llm_model).unwrap();
        writeln!(output).unwrap();

        writeln!(output, "Vector DB:      {}", state_marker(status.vector_db)).unwrap();
        writeln!(output, "  URL:         {}", status.vector_url).unwrap();
        writeln!(output, "  Collection:  {}", status.collection).unwrap();
        if let Some(points) = status.points {
            writeln!(output, "  Points:      {}", points).unwrap();
        }

        output
    }

    fn format_reply(&self, reply: &ChatReply) -> String {
        let mut output = String::new();
        writeln!(output, "{}", reply.answer).unwrap();

        if !reply.sources.is_empty() {
            writeln!(output).unwrap();
            writeln!(output, "Sources").unwrap();
            writeln!(output, "-------").unwrap();
            for (i, source) in reply.sources.iter().enumerate() {
                let preview: String = source.snippet.chars().take(120).collect();
                let preview = if source.snippet.chars().count() > 120 {
                    format!("{}...", preview)
                } else {
                    preview
                };
                writeln!(output, "{}. [{}] {}", i + 1, source.id, preview).unwrap();
            }
        }

        if let Some(tokens) = reply.stats.total_tokens {
            writeln!(output).unwrap();
            writeln!(output, "Tokens: {}", tokens).unwrap();
        }
        output
    }

    fn format_ingest_stats(&self, stats: &IngestStats) -> String {
        let mut output = String::new();
        writeln!(output, "Ingestion Complete").unwrap();
        writeln!(output, "------------------").unwrap();
        writeln!(output, "Collection: {}", stats.collection).unwrap();
        writeln!(output, "Documents indexed: {}", stats.documents_indexed).unwrap();
        writeln!(output, "Duration: {}ms", stats.duration_ms).unwrap();
        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}\n", message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}\n", error)
    }
}

pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: Serialize>(&self, value: &T) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|e| serde_json::json!({"error": e.to_string()}).to_string())
    }
}

impl Formatter for JsonFormatter {
    fn format_status(&self, status: &StatusInfo) -> String {
        let json = serde_json::json!({
            "llm": {
                "state": status.llm,
                "url": status.llm_url,
                "model": status.llm_model,
            },
            "vectorDb": {
                "state": status.vector_db,
                "url": status.vector_url,
                "collection": status.collection,
                "points": status.points,
            }
        });
        self.render(&json)
    }

    fn format_reply(&self, reply: &ChatReply) -> String {
        self.render(reply)
    }

    fn format_ingest_stats(&self, stats: &IngestStats) -> String {
        self.render(stats)
    }

    fn format_message(&self, message: &str) -> String {
        serde_json::json!({"message": message}).to_string()
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({"error": error}).to_string()
    }
}

pub struct MarkdownFormatter;

impl Formatter for MarkdownFormatter {
    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "## Status\n").unwrap();

        writeln!(output, "### Language Model {}\n", state_emoji(status.llm)).unwrap();
        writeln!(output, "- **URL:** `{}`", status.llm_url).unwrap();
        writeln!(output, "- **Model:** {}", status.llm_model).unwrap();
        writeln!(output).unwrap();

        writeln!(output, "### Vector DB {}\n", state_emoji(status.vector_db)).unwrap();
        writeln!(output, "- **URL:** `{}`", status.vector_url).unwrap();
        writeln!(output, "- **Collection:** {}", status.collection).unwrap();
        if let Some(points) = status.points {
            writeln!(output, "- **Points:** {}", points).unwrap();
        }

        output
    }

    fn format_reply(&self, reply: &ChatReply) -> String {
        let mut output = String::new();
        writeln!(output, "{}\n", reply.answer).unwrap();

        if !reply.sources.is_empty() {
            writeln!(output, "### Sources\n").unwrap();
            for (i, source) in reply.sources.iter().enumerate() {
                writeln!(output, "{}. **{}**: {}", i + 1, source.id, source.snippet).unwrap();
            }
        }
        output
    }

    fn format_ingest_stats(&self, stats: &IngestStats) -> String {
        let mut output = String::new();
        writeln!(output, "## Ingestion Complete\n").unwrap();
        writeln!(output, "| Metric | Value |").unwrap();
        writeln!(output, "|--------|-------|").unwrap();
        writeln!(output, "| Collection | `{}` |", stats.collection).unwrap();
        writeln!(output, "| Documents indexed | {} |", stats.documents_indexed).unwrap();
        writeln!(output, "| Duration | {}ms |", stats.duration_ms).unwrap();
        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("> {}\n", message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("> ⚠️ **Error:** {}\n", error)
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionStats, SourceSnippet};
    use chrono::Utc;

    fn status() -> StatusInfo {
        StatusInfo {
            llm: ServiceState::Offline,
            llm_url: "http://localhost:1234/v1".to_string(),
            llm_model: "llama-3.2-3b-instruct".to_string(),
            vector_db: ServiceState::Online,
            vector_url: "http://localhost:6334".to_string(),
            collection: "jarvis".to_string(),
            points: Some(5),
        }
    }

    fn reply() -> ChatReply {
        ChatReply {
            answer: "X and Y".to_string(),
            sources: vec![SourceSnippet {
                id: "doc1".to_string(),
                snippet: "Task management".to_string(),
            }],
            stats: SessionStats {
                total_tokens: Some(12),
                total_turns: 2,
                session_started_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_text_status() {
        let output = TextFormatter.format_status(&status());
        assert!(output.contains("Language Model: [OFFLINE]"));
        assert!(output.contains("Vector DB:      [ONLINE]"));
        assert!(output.contains("Points:      5"));
    }

    #[test]
    fn test_json_status_uses_service_states() {
        let output = JsonFormatter::new(false).format_status(&status());
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["llm"]["state"], "offline");
        assert_eq!(json["vectorDb"]["state"], "online");
        assert_eq!(json["vectorDb"]["points"], 5);
    }

    #[test]
    fn test_reply_formats() {
        let text = TextFormatter.format_reply(&reply());
        assert!(text.starts_with("X and Y\n"));
        assert!(text.contains("1. [doc1] Task management"));

        let json: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new(true).format_reply(&reply())).unwrap();
        assert_eq!(json["answer"], "X and Y");
        assert_eq!(json["stats"]["totalTokens"], 12);

        let markdown = MarkdownFormatter.format_reply(&reply());
        assert!(markdown.contains("1. **doc1**: Task management"));
    }

    #[test]
    fn test_ingest_stats_markdown_table() {
        let stats = IngestStats {
            documents_indexed: 5,
            collection: "jarvis".to_string(),
            duration_ms: 120,
        };
        let output = MarkdownFormatter.format_ingest_stats(&stats);
        assert!(output.contains("| Documents indexed | 5 |"));
    }

    #[test]
    fn test_error_formats() {
        assert_eq!(TextFormatter.format_error("boom"), "Error: boom\n");
        assert_eq!(
            JsonFormatter::new(false).format_error("boom"),
            r#"{"error":"boom"}"#
        );
    }
}
