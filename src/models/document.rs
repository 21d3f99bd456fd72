use serde::{Deserialize, Serialize};

use super::search::{IndexRecord, Metadata, TEXT_KEY};

/// A product document supplied to batch ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Pair the document with its embedding, carrying the text as metadata.
    pub fn into_record(self, vector: Vec<f32>) -> IndexRecord {
        let mut metadata = Metadata::new();
        metadata.insert(TEXT_KEY.to_string(), self.text);
        IndexRecord {
            id: self.id,
            vector,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_record_keeps_text() {
        let record = Document::new("doc2", "Track action items").into_record(vec![0.6, 0.8]);
        assert_eq!(record.id, "doc2");
        assert_eq!(record.vector, vec![0.6, 0.8]);
        assert_eq!(
            record.metadata.get(TEXT_KEY).map(String::as_str),
            Some("Track action items")
        );
    }
}
