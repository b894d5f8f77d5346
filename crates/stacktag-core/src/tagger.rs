//! Trained label encoder and pipeline, used together to tag posts.
//!
//! The encoder and pipeline are persisted as two separate artifacts. They must
//! come from the same training run: nothing checks that the pipeline's label
//! width matches the encoder's vocabulary beyond a dimension check on decode.

use crate::dataset::Post;
use crate::error::{ModelResult, Result};
use crate::eval::{self, EvaluationReport};
use crate::labels::{LabelEncoder, MultiHot, TagSet};
use crate::pipeline::{ModelConfig, TagPipeline};
use crate::store::ArtifactStore;
use crate::types::{Tag, TagPrediction};

/// Artifact name of the fitted label encoder.
pub const ENCODER_ARTIFACT: &str = "label_encoder";

/// Artifact name of the fitted vectorizer + classifier pipeline.
pub const PIPELINE_ARTIFACT: &str = "model_pipeline";

/// A fitted label encoder paired with the pipeline trained on its label space.
#[derive(Debug, Clone)]
pub struct Tagger {
    encoder: LabelEncoder,
    pipeline: TagPipeline,
}

impl Tagger {
    /// Fit the encoder on every post's tags, then the pipeline on their documents.
    pub fn train(posts: &[Post], config: &ModelConfig) -> Result<Self> {
        let tag_sets: Vec<TagSet> = posts.iter().map(|p| p.tags.clone()).collect();
        let encoder = LabelEncoder::fit(&tag_sets)?;
        Self::train_with_encoder(encoder, posts, config)
    }

    /// Fit the pipeline on `posts` using an encoder fitted elsewhere.
    ///
    /// Lets the label vocabulary cover posts (such as a held-out split) that
    /// the pipeline never sees. Tags outside `encoder` are dropped.
    pub fn train_with_encoder(
        encoder: LabelEncoder,
        posts: &[Post],
        config: &ModelConfig,
    ) -> Result<Self> {
        let tag_sets: Vec<TagSet> = posts.iter().map(|p| p.tags.clone()).collect();
        let docs: Vec<String> = posts.iter().map(Post::document).collect();
        let pipeline = TagPipeline::fit(&docs, encoder.transform(&tag_sets), config)?;

        tracing::info!(
            "Trained tagger on {} posts: {} labels, {} features",
            posts.len(),
            encoder.len(),
            pipeline.vectorizer().dim()
        );
        Ok(Self { encoder, pipeline })
    }

    /// Pair an existing encoder and pipeline.
    pub fn from_parts(encoder: LabelEncoder, pipeline: TagPipeline) -> Self {
        Self { encoder, pipeline }
    }

    /// Predicted tags for a post, most confident first.
    pub fn tag(&self, title: &str, body: &str) -> Result<Vec<Tag>> {
        self.tag_document(&format!("{} {}", title, body))
    }

    /// Predicted tags for an already-joined document, most confident first.
    pub fn tag_document(&self, doc: &str) -> Result<Vec<Tag>> {
        let (row, scores) = self.pipeline.predict_one(doc)?;
        let names = self.decode_one(row)?;

        let mut tags: Vec<Tag> = names
            .into_iter()
            .map(|name| {
                let confidence = self
                    .encoder
                    .index_of(&name)
                    .and_then(|i| scores.get(i).copied())
                    .unwrap_or(0.0);
                Tag::new(name, confidence)
            })
            .collect();
        tags.sort_by(|a, b| {
            let (ca, cb) = (a.confidence.unwrap_or(0.0), b.confidence.unwrap_or(0.0));
            cb.total_cmp(&ca).then_with(|| a.name.cmp(&b.name))
        });
        Ok(tags)
    }

    /// Tag a post and wrap the result as an output record.
    pub fn predict_post(&self, title: &str, body: &str) -> Result<TagPrediction> {
        let doc = format!("{} {}", title, body);
        Ok(TagPrediction::new(&doc, self.tag_document(&doc)?))
    }

    /// Predicted tag sets for many documents.
    pub fn predict_tags<S: AsRef<str>>(&self, docs: &[S]) -> Result<Vec<TagSet>> {
        let rows = self.pipeline.predict(docs)?;
        Ok(self.encoder.inverse_transform(&rows)?)
    }

    /// Compare predictions on `posts` against their tags.
    ///
    /// Tags outside the encoder's vocabulary are dropped from the truth rows.
    pub fn evaluate(&self, posts: &[Post]) -> Result<EvaluationReport> {
        let docs: Vec<String> = posts.iter().map(Post::document).collect();
        let tag_sets: Vec<TagSet> = posts.iter().map(|p| p.tags.clone()).collect();
        let predicted = self.pipeline.predict(&docs)?;
        let actual = self.encoder.transform(&tag_sets);
        Ok(eval::report_named(&predicted, &actual, self.encoder.classes())?)
    }

    /// Persist both artifacts.
    pub fn save(&self, store: &ArtifactStore) -> Result<()> {
        store.save(ENCODER_ARTIFACT, &self.encoder)?;
        store.save(PIPELINE_ARTIFACT, &self.pipeline)?;
        Ok(())
    }

    /// Restore both artifacts.
    pub fn load(store: &ArtifactStore) -> Result<Self> {
        let encoder: LabelEncoder = store.load(ENCODER_ARTIFACT)?;
        let pipeline: TagPipeline = store.load(PIPELINE_ARTIFACT)?;
        if encoder.len() != pipeline.num_labels() {
            tracing::warn!(
                "Label encoder has {} classes but pipeline predicts {} labels",
                encoder.len(),
                pipeline.num_labels()
            );
        }
        Ok(Self { encoder, pipeline })
    }

    /// Whether both artifacts are present in `store`.
    pub fn exists(store: &ArtifactStore) -> bool {
        store.exists(ENCODER_ARTIFACT) && store.exists(PIPELINE_ARTIFACT)
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    pub fn pipeline(&self) -> &TagPipeline {
        &self.pipeline
    }

    fn decode_one(&self, row: MultiHot) -> ModelResult<TagSet> {
        Ok(self
            .encoder
            .inverse_transform(&[row])?
            .pop()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KnnConfig;
    use crate::error::{ArtifactError, TaggerError};

    fn post(title: &str, body: &str, tags: &[&str]) -> Post {
        Post {
            title: title.to_string(),
            body: body.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn posts() -> Vec<Post> {
        vec![
            post("python list", "list comprehension syntax", &["python"]),
            post("flask app", "python flask route decorator", &["python", "flask"]),
            post("promise", "javascript promise callback async", &["javascript"]),
        ]
    }

    fn config() -> ModelConfig {
        ModelConfig {
            classifier: KnnConfig {
                k: 2,
                ..KnnConfig::default()
            },
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_tag_returns_sorted_known_tags() {
        let tagger = Tagger::train(&posts(), &config()).unwrap();
        let tags = tagger.tag("python list", "syntax question").unwrap();

        assert!(tags.iter().any(|t| t.name == "python"));
        for pair in tags.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        for tag in &tags {
            let c = tag.confidence.unwrap();
            assert!((0.0..=1.0).contains(&c));
        }
    }

    #[test]
    fn test_predict_post_wraps_tags() {
        let tagger = Tagger::train(&posts(), &config()).unwrap();
        let prediction = tagger.predict_post("python list", "syntax").unwrap();
        assert_eq!(prediction.document_preview, "python list syntax");
        assert!(prediction.tag_names().contains(&"python"));
    }

    #[test]
    fn test_evaluate_on_training_posts() {
        let tagger = Tagger::train(&posts(), &config()).unwrap();
        let report = tagger.evaluate(&posts()).unwrap();
        assert_eq!(report.samples, 3);
        assert_eq!(report.labels, 3);
        assert!(report.per_label.iter().any(|m| m.label == "python"));
    }

    #[test]
    fn test_save_load_predicts_identically() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let tagger = Tagger::train(&posts(), &config()).unwrap();
        tagger.save(&store).unwrap();
        assert!(Tagger::exists(&store));

        let restored = Tagger::load(&store).unwrap();
        let docs = [
            "python list syntax question",
            "flask route",
            "async javascript",
            "nothing relevant",
        ];
        assert_eq!(
            restored.predict_tags(&docs).unwrap(),
            tagger.predict_tags(&docs).unwrap()
        );
        assert_eq!(
            restored.tag("flask", "python").unwrap(),
            tagger.tag("flask", "python").unwrap()
        );
    }

    #[test]
    fn test_load_requires_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let tagger = Tagger::train(&posts(), &config()).unwrap();
        store.save(ENCODER_ARTIFACT, tagger.encoder()).unwrap();

        assert!(!Tagger::exists(&store));
        assert!(matches!(
            Tagger::load(&store),
            Err(TaggerError::Artifact(ArtifactError::NotFound(_)))
        ));
    }

    #[test]
    fn test_train_with_wider_encoder() {
        let mut all = posts();
        all.push(post("borrow", "rust borrow checker", &["rust"]));
        let tag_sets: Vec<TagSet> = all.iter().map(|p| p.tags.clone()).collect();
        let encoder = LabelEncoder::fit(&tag_sets).unwrap();

        let tagger = Tagger::train_with_encoder(encoder, &all[..3], &config()).unwrap();
        assert_eq!(tagger.encoder().len(), 4);
        assert_eq!(tagger.pipeline().num_labels(), 4);
        let report = tagger.evaluate(&all).unwrap();
        assert_eq!(report.labels, 4);
    }

    #[test]
    fn test_train_rejects_untagged_corpus() {
        assert!(Tagger::train(&[post("a", "b", &[])], &config()).is_err());
    }
}
