//! Vector index records, query matches, and CLI output format.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata key under which a record's snippet text is stored.
pub const TEXT_KEY: &str = "text";

/// String metadata attached to an indexed vector.
pub type Metadata = BTreeMap<String, String>;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// Machine-parseable JSON format
    Json,
    /// Documentation-friendly Markdown format
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// A vector to be written to the index.
#[derive(Debug, Clone)]
pub struct IndexRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: Metadata,
}

/// A nearest-neighbour hit returned by the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMatch {
    /// Document identifier, if the index returned one.
    pub id: Option<String>,

    /// Similarity score, higher is closer.
    pub score: f32,

    pub metadata: Metadata,
}

impl IndexMatch {
    /// Snippet text stored with the vector, if any.
    pub fn text(&self) -> Option<&str> {
        self.metadata.get(TEXT_KEY).map(String::as_str)
    }
}

/// Summary returned by the index liveness check.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    pub points_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "md".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_match_text_lookup() {
        let mut metadata = Metadata::new();
        metadata.insert(TEXT_KEY.to_string(), "Agendas and minutes".to_string());
        let hit = IndexMatch {
            id: Some("doc1".to_string()),
            score: 0.82,
            metadata,
        };
        assert_eq!(hit.text(), Some("Agendas and minutes"));

        let bare = IndexMatch {
            id: None,
            score: 0.1,
            metadata: Metadata::new(),
        };
        assert_eq!(bare.text(), None);
    }
}
