//! Output records produced when tagging posts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Characters of the source document kept in a prediction record.
pub const PREVIEW_CHARS: usize = 80;

/// A predicted tag with its posterior confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// The tag label (e.g., "python", "flask")
    pub name: String,

    /// Posterior probability that the tag applies, from 0.0 to 1.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Tag {
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            confidence: Some(confidence),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.confidence {
            Some(c) => write!(f, "{} ({:.3})", self.name, c),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Tags predicted for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagPrediction {
    /// Leading characters of the document, whitespace collapsed
    pub document_preview: String,

    /// Predicted tags, most confident first
    pub tags: Vec<Tag>,
}

impl TagPrediction {
    pub fn new(document: &str, tags: Vec<Tag>) -> Self {
        Self {
            document_preview: preview(document),
            tags,
        }
    }

    /// Tag names without scores.
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }

    /// Drop confidence scores, keeping tag order.
    pub fn without_scores(mut self) -> Self {
        for tag in &mut self.tags {
            tag.confidence = None;
        }
        self
    }
}

impl fmt::Display for TagPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tags.is_empty() {
            return write!(f, "(no tags)");
        }
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", tag)?;
        }
        Ok(())
    }
}

fn preview(document: &str) -> String {
    let collapsed = document.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &collapsed[..cut]),
        None => collapsed,
    }
}

/// Summary of a training run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Posts used to fit the model
    pub train_posts: usize,

    /// Posts held out for evaluation
    pub test_posts: usize,

    /// Size of the label vocabulary
    pub labels: usize,

    /// Width of the fitted feature space
    pub features: usize,

    /// Wall-clock fitting time in seconds
    pub fit_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(PREVIEW_CHARS + 5);
        let p = TagPrediction::new(&long, vec![]);
        assert_eq!(p.document_preview.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.document_preview.ends_with("..."));
    }

    #[test]
    fn test_preview_collapses_whitespace() {
        let p = TagPrediction::new("How  to\n\tparse JSON", vec![]);
        assert_eq!(p.document_preview, "How to parse JSON");
    }

    #[test]
    fn test_prediction_roundtrip() {
        let p = TagPrediction::new("python question", vec![Tag::new("python", 0.91)]);
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"name\":\"python\""));
        let parsed: TagPrediction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, p);
        assert_eq!(parsed.tag_names(), vec!["python"]);
    }

    #[test]
    fn test_display_with_and_without_scores() {
        let p = TagPrediction::new(
            "q",
            vec![Tag::new("python", 0.9), Tag::new("flask", 0.55)],
        );
        assert_eq!(p.to_string(), "python (0.900), flask (0.550)");

        let bare = p.without_scores();
        assert_eq!(bare.to_string(), "python, flask");
        let json = serde_json::to_string(&bare).unwrap();
        assert!(!json.contains("confidence"));

        assert_eq!(TagPrediction::new("q", vec![]).to_string(), "(no tags)");
    }
}
