//! Processors: one engine stage applied to one annotation store.
//!
//! Every processor runs the same three steps per document:
//!
//! ```text
//! store ──project──▶ NlpDocument ──engine──▶ NlpDocument ──back-project──▶ plan ──commit──▶ store
//! ```
//!
//! The engine is built once, when the processor is constructed; a factory
//! failure there is a configuration error. An engine failure while
//! processing a document propagates and leaves the store untouched.
//!
//! | Processor | Annotators | Writes |
//! |---|---|---|
//! | [`Tokenize`] | `tokenize,ssplit` | sentences, tokens |
//! | [`PartOfSpeech`] | `pos` | `partOfSpeech` on tokens |
//! | [`Lemma`] | `lemma` | `lemma` on tokens |
//! | [`Ner`] | `ner` | entity annotations |
//! | [`Coreference`] | `parse,coref` | coreference groups |
//! | [`KbpRelation`] | `kbp` | relation groups |
//! | [`OpenIeRelation`] | `depparse,natlog,openie` | relation groups |

use std::sync::Arc;

use spanlink_core::AnnotationStore;

use crate::backproject::{
    back_project_coreference, back_project_token_property, back_project_tokenization,
    BackProjection, Committed, EntityBackProjector, RelationBackProjector, RelationSource,
    RelationVocabulary, TokenProperty,
};
use crate::config::{EngineProperties, EngineSettings, NerSettings};
use crate::document::NlpDocument;
use crate::engine::{Engine, EngineFactory, Stage};
use crate::error::{Error, Result};
use crate::projector::DocumentProjector;
use crate::vocab::TypeVocabulary;

/// A document processor.
pub trait Processor: Send + Sync {
    /// Processor name, for logging.
    fn name(&self) -> &'static str;

    /// Run the processor over one store.
    ///
    /// # Errors
    ///
    /// Projection input errors and engine failures. Nothing is written to
    /// the store when an error is returned.
    fn process(&self, store: &mut dyn AnnotationStore) -> Result<ProcessReport>;
}

/// What one [`Processor::process`] call wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Annotations created
    pub created: usize,
    /// Annotations replaced by augmented versions
    pub replaced: usize,
    /// Groups created
    pub groups: usize,
}

impl From<&Committed> for ProcessReport {
    fn from(committed: &Committed) -> Self {
        Self {
            created: committed.annotations.len(),
            replaced: committed.replaced.len(),
            groups: committed.groups.len(),
        }
    }
}

// =============================================================================
// Shared pipeline
// =============================================================================

/// An engine built for one stage, plus the vocabulary used to project for it.
struct StagePipeline {
    name: &'static str,
    engine: Box<dyn Engine>,
    vocab: Arc<TypeVocabulary>,
}

impl StagePipeline {
    fn new(
        name: &'static str,
        factory: &dyn EngineFactory,
        stage: Stage,
        properties: EngineProperties,
    ) -> Result<Self> {
        let engine = factory.create(stage, &properties).map_err(|e| {
            Error::config(format!(
                "{}: unable to create engine for '{}': {}",
                name,
                stage.annotators(),
                e
            ))
        })?;
        log::info!(
            "[{}] using engine '{}' for annotators '{}'",
            name,
            engine.name(),
            stage.annotators()
        );
        Ok(Self {
            name,
            engine,
            vocab: Arc::new(TypeVocabulary::standard().clone()),
        })
    }

    /// Project `store` and run the engine over the result.
    fn project_and_annotate(&self, store: &dyn AnnotationStore) -> Result<NlpDocument> {
        let mut doc = DocumentProjector::new(&self.vocab).project(store)?;
        self.annotate(&mut doc)?;
        Ok(doc)
    }

    fn annotate(&self, doc: &mut NlpDocument) -> Result<()> {
        self.engine.annotate(doc).map_err(|e| {
            log::warn!("[{}] engine '{}' failed: {}", self.name, self.engine.name(), e);
            e
        })
    }

    fn commit(&self, plan: BackProjection, store: &mut dyn AnnotationStore) -> Result<ProcessReport> {
        let committed = plan.commit(store)?;
        let report = ProcessReport::from(&committed);
        log::debug!(
            "[{}] created {}, replaced {}, grouped {}",
            self.name,
            report.created,
            report.replaced,
            report.groups
        );
        Ok(report)
    }
}

impl std::fmt::Debug for StagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagePipeline")
            .field("name", &self.name)
            .field("engine", &self.engine.name())
            .finish()
    }
}

// =============================================================================
// Token-level processors
// =============================================================================

/// Splits raw text into sentence and token annotations.
///
/// Works from the document text alone; existing annotations are ignored.
#[derive(Debug)]
pub struct Tokenize {
    pipeline: StagePipeline,
}

impl Tokenize {
    /// Build the processor and its engine.
    pub fn new(factory: &dyn EngineFactory, settings: &EngineSettings) -> Result<Self> {
        Ok(Self {
            pipeline: StagePipeline::new(
                "tokenize",
                factory,
                Stage::Tokenize,
                settings.for_stage(Stage::Tokenize),
            )?,
        })
    }
}

impl Processor for Tokenize {
    fn name(&self) -> &'static str {
        self.pipeline.name
    }

    fn process(&self, store: &mut dyn AnnotationStore) -> Result<ProcessReport> {
        let mut doc = NlpDocument::from_text(store.content());
        self.pipeline.annotate(&mut doc)?;
        self.pipeline.commit(back_project_tokenization(&doc), store)
    }
}

/// Adds `partOfSpeech` to existing word tokens.
#[derive(Debug)]
pub struct PartOfSpeech {
    pipeline: StagePipeline,
}

impl PartOfSpeech {
    /// Build the processor and its engine.
    pub fn new(factory: &dyn EngineFactory, settings: &EngineSettings) -> Result<Self> {
        Ok(Self {
            pipeline: StagePipeline::new(
                "pos",
                factory,
                Stage::PartOfSpeech,
                settings.for_stage(Stage::PartOfSpeech),
            )?,
        })
    }
}

impl Processor for PartOfSpeech {
    fn name(&self) -> &'static str {
        self.pipeline.name
    }

    fn process(&self, store: &mut dyn AnnotationStore) -> Result<ProcessReport> {
        let doc = self.pipeline.project_and_annotate(&*store)?;
        let plan = back_project_token_property(&doc, &*store, TokenProperty::PartOfSpeech);
        self.pipeline.commit(plan, store)
    }
}

/// Adds `lemma` to existing word tokens.
///
/// The engine sees any `partOfSpeech` already on the tokens.
#[derive(Debug)]
pub struct Lemma {
    pipeline: StagePipeline,
}

impl Lemma {
    /// Build the processor and its engine.
    pub fn new(factory: &dyn EngineFactory, settings: &EngineSettings) -> Result<Self> {
        Ok(Self {
            pipeline: StagePipeline::new(
                "lemma",
                factory,
                Stage::Lemma,
                settings.for_stage(Stage::Lemma),
            )?,
        })
    }
}

impl Processor for Lemma {
    fn name(&self) -> &'static str {
        self.pipeline.name
    }

    fn process(&self, store: &mut dyn AnnotationStore) -> Result<ProcessReport> {
        let doc = self.pipeline.project_and_annotate(&*store)?;
        let plan = back_project_token_property(&doc, &*store, TokenProperty::Lemma);
        self.pipeline.commit(plan, store)
    }
}

// =============================================================================
// Entities and coreference
// =============================================================================

/// Creates entity annotations from the engine's named-entity mentions.
#[derive(Debug)]
pub struct Ner {
    pipeline: StagePipeline,
    entities: EntityBackProjector,
}

impl Ner {
    /// Validate `settings`, then build the processor and its engine.
    pub fn new(factory: &dyn EngineFactory, settings: &NerSettings) -> Result<Self> {
        let entities = EntityBackProjector::new(settings)?;
        Ok(Self {
            pipeline: StagePipeline::new("ner", factory, Stage::Ner, settings.for_stage(Stage::Ner))?,
            entities,
        })
    }
}

impl Processor for Ner {
    fn name(&self) -> &'static str {
        self.pipeline.name
    }

    fn process(&self, store: &mut dyn AnnotationStore) -> Result<ProcessReport> {
        let doc = self.pipeline.project_and_annotate(&*store)?;
        self.pipeline.commit(self.entities.back_project(&doc), store)
    }
}

/// Groups existing entity annotations into coreference chains.
#[derive(Debug)]
pub struct Coreference {
    pipeline: StagePipeline,
}

impl Coreference {
    /// Build the processor and its engine.
    pub fn new(factory: &dyn EngineFactory, settings: &EngineSettings) -> Result<Self> {
        Ok(Self {
            pipeline: StagePipeline::new(
                "coref",
                factory,
                Stage::Coreference,
                settings.for_stage(Stage::Coreference),
            )?,
        })
    }

    /// Use a custom type vocabulary for projection and head-token typing.
    #[must_use]
    pub fn with_vocabulary(mut self, vocab: Arc<TypeVocabulary>) -> Self {
        self.pipeline.vocab = vocab;
        self
    }
}

impl Processor for Coreference {
    fn name(&self) -> &'static str {
        self.pipeline.name
    }

    fn process(&self, store: &mut dyn AnnotationStore) -> Result<ProcessReport> {
        let doc = self.pipeline.project_and_annotate(&*store)?;
        let plan = back_project_coreference(&doc, &*store, &self.pipeline.vocab);
        self.pipeline.commit(plan, store)
    }
}

// =============================================================================
// Relations
// =============================================================================

/// Links existing entity annotations with KBP slot relations.
#[derive(Debug)]
pub struct KbpRelation {
    pipeline: StagePipeline,
    relations: Arc<RelationVocabulary>,
}

impl KbpRelation {
    /// Build the processor and its engine.
    pub fn new(factory: &dyn EngineFactory, settings: &EngineSettings) -> Result<Self> {
        Ok(Self {
            pipeline: StagePipeline::new(
                "kbp",
                factory,
                Stage::KbpRelation,
                settings.for_stage(Stage::KbpRelation),
            )?,
            relations: Arc::new(RelationVocabulary::standard().clone()),
        })
    }

    /// Use a custom type vocabulary for projection and argument typing.
    #[must_use]
    pub fn with_vocabulary(mut self, vocab: Arc<TypeVocabulary>) -> Self {
        self.pipeline.vocab = vocab;
        self
    }
}

impl Processor for KbpRelation {
    fn name(&self) -> &'static str {
        self.pipeline.name
    }

    fn process(&self, store: &mut dyn AnnotationStore) -> Result<ProcessReport> {
        let doc = self.pipeline.project_and_annotate(&*store)?;
        let plan = RelationBackProjector::new(&self.relations, &self.pipeline.vocab, RelationSource::Kbp)
            .back_project(&doc, &*store);
        self.pipeline.commit(plan, store)
    }
}

/// Links existing entity annotations with open information extraction relations.
#[derive(Debug)]
pub struct OpenIeRelation {
    pipeline: StagePipeline,
    relations: Arc<RelationVocabulary>,
}

impl OpenIeRelation {
    /// Build the processor and its engine.
    pub fn new(factory: &dyn EngineFactory, settings: &EngineSettings) -> Result<Self> {
        Ok(Self {
            pipeline: StagePipeline::new(
                "openie",
                factory,
                Stage::OpenIe,
                settings.for_stage(Stage::OpenIe),
            )?,
            relations: Arc::new(RelationVocabulary::standard().clone()),
        })
    }
}

impl Processor for OpenIeRelation {
    fn name(&self) -> &'static str {
        self.pipeline.name
    }

    fn process(&self, store: &mut dyn AnnotationStore) -> Result<ProcessReport> {
        let doc = self.pipeline.project_and_annotate(&*store)?;
        let plan =
            RelationBackProjector::new(&self.relations, &self.pipeline.vocab, RelationSource::OpenIe)
                .back_project(&doc, &*store);
        self.pipeline.commit(plan, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANNOTATORS_KEY;
    use crate::engine::{MockEngine, MockEngineFactory};
    use spanlink_core::conventions::types;
    use spanlink_core::{AnnotatedText, Properties, Span};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_processors_are_send_sync() {
        assert_send_sync::<Tokenize>();
        assert_send_sync::<Ner>();
        assert_send_sync::<KbpRelation>();
        assert_send_sync::<Box<dyn Processor>>();
    }

    #[test]
    fn test_factory_failure_is_config_error() {
        let factory = MockEngineFactory::failing("models missing");
        let err = Coreference::new(&factory, &EngineSettings::default()).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("models missing")));
    }

    #[test]
    fn test_stage_annotators_forwarded() {
        let factory = MockEngineFactory::new(MockEngine::new("m"));
        let settings = EngineSettings::default().with_property("parse.maxlen", "80");
        Coreference::new(&factory, &settings).unwrap();

        let requests = factory.requests();
        assert_eq!(requests[0].0, Stage::Coreference);
        assert_eq!(
            requests[0].1.get(ANNOTATORS_KEY).map(String::as_str),
            Some("parse,coref")
        );
        assert_eq!(requests[0].1.get("parse.maxlen").map(String::as_str), Some("80"));
    }

    #[test]
    fn test_invalid_ner_settings_build_no_engine() {
        let factory = MockEngineFactory::new(MockEngine::new("m"));
        let settings = NerSettings::default().with_threshold(-1.0);
        assert!(matches!(Ner::new(&factory, &settings), Err(Error::Config(_))));
        assert!(factory.requests().is_empty());
    }

    #[test]
    fn test_engine_failure_writes_nothing() {
        let factory = MockEngineFactory::new(MockEngine::failing("m", "out of memory"));
        let ner = Ner::new(&factory, &NerSettings::default()).unwrap();

        let mut store = AnnotatedText::new("d", "Rachel");
        store.create_annotation(Span::new(0, 6).unwrap(), types::WORD_TOKEN, Properties::new());

        let err = ner.process(&mut store).unwrap_err();
        assert!(matches!(err, Error::Engine(_)));
        assert_eq!(store.annotations().len(), 1);
    }

    #[test]
    fn test_report_counts() {
        let committed = Committed {
            annotations: vec![spanlink_core::AnnotationId(1)],
            replaced: vec![],
            groups: vec![0, 1],
        };
        assert_eq!(
            ProcessReport::from(&committed),
            ProcessReport {
                created: 1,
                replaced: 0,
                groups: 2
            }
        );
    }
}
