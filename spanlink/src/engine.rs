//! Engine invocation: the seam to the external NLP engine.
//!
//! The engine itself (tokenizer, tagger, parser, coreference resolver,
//! relation extractor) lives outside this crate. All it has to do is take a
//! projected [`NlpDocument`] and fill in its output in place: tags on
//! tokens, coreference chains, relation triples on sentences.
//!
//! Engines are built once per processor through an [`EngineFactory`], for a
//! given [`Stage`] and raw properties, and then shared read-only across
//! documents.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::EngineProperties;
use crate::document::NlpDocument;
use crate::error::{Error, Result};

/// An NLP engine that annotates documents in place.
pub trait Engine: Send + Sync {
    /// Run the engine over `doc`, writing its output into it.
    ///
    /// On error the document may be partially annotated and must be
    /// discarded.
    fn annotate(&self, doc: &mut NlpDocument) -> Result<()>;

    /// Engine name, for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn annotate(&self, doc: &mut NlpDocument) -> Result<()> {
        (**self).annotate(doc)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<E: Engine + ?Sized> Engine for Arc<E> {
    fn annotate(&self, doc: &mut NlpDocument) -> Result<()> {
        (**self).annotate(doc)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Builds engines for a pipeline stage.
pub trait EngineFactory: Send + Sync {
    /// Create an engine for `stage` with `properties` (which already carry
    /// the stage's `annotators` key).
    ///
    /// # Errors
    ///
    /// Construction failures should be reported as [`Error::Engine`]; the
    /// calling processor surfaces them as configuration errors.
    fn create(&self, stage: Stage, properties: &EngineProperties) -> Result<Box<dyn Engine>>;
}

/// The engine pipeline a processor needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Stage {
    /// Sentence splitting and tokenization
    Tokenize,
    /// Part-of-speech tagging
    PartOfSpeech,
    /// Lemmatization
    Lemma,
    /// Named-entity recognition
    Ner,
    /// Coreference resolution
    Coreference,
    /// Knowledge-base relation extraction
    KbpRelation,
    /// Open information extraction
    OpenIe,
}

impl Stage {
    /// Engine annotators to request for this stage.
    #[must_use]
    pub const fn annotators(&self) -> &'static str {
        match self {
            Self::Tokenize => "tokenize,ssplit",
            Self::PartOfSpeech => "pos",
            Self::Lemma => "lemma",
            Self::Ner => "ner",
            Self::Coreference => "parse,coref",
            Self::KbpRelation => "kbp",
            Self::OpenIe => "depparse,natlog,openie",
        }
    }
}

// =============================================================================
// Mock engine
// =============================================================================

type AnnotateFn = dyn Fn(&mut NlpDocument) -> Result<()> + Send + Sync;

/// Scriptable engine for tests.
///
/// The annotation behaviour is a closure over the projected document, so a
/// test can assert on what the engine was given and write whatever output
/// the scenario needs.
///
/// ```rust
/// use spanlink::{Engine, MockEngine, NlpDocument};
///
/// let engine = MockEngine::new("mock").with_annotator(|doc| {
///     for token in &mut doc.tokens {
///         token.pos = Some("NN".to_string());
///     }
///     Ok(())
/// });
///
/// let mut doc = NlpDocument::from_text("");
/// engine.annotate(&mut doc).unwrap();
/// assert_eq!(engine.calls(), 1);
/// ```
#[derive(Clone)]
pub struct MockEngine {
    name: String,
    annotator: Arc<AnnotateFn>,
    calls: Arc<AtomicUsize>,
}

impl MockEngine {
    /// An engine that leaves documents untouched.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotator: Arc::new(|_| Ok(())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the annotation behaviour.
    #[must_use]
    pub fn with_annotator<F>(mut self, annotator: F) -> Self
    where
        F: Fn(&mut NlpDocument) -> Result<()> + Send + Sync + 'static,
    {
        self.annotator = Arc::new(annotator);
        self
    }

    /// An engine whose every call fails with `message`.
    #[must_use]
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(name).with_annotator(move |_| Err(Error::engine(message.clone())))
    }

    /// Number of `annotate` calls so far (shared between clones).
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for MockEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockEngine")
            .field("name", &self.name)
            .field("calls", &self.calls())
            .finish()
    }
}

impl Engine for MockEngine {
    fn annotate(&self, doc: &mut NlpDocument) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.annotator)(doc)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Factory handing out clones of one [`MockEngine`], recording each request.
#[derive(Debug)]
pub struct MockEngineFactory {
    engine: Option<MockEngine>,
    failure: Option<String>,
    requests: Mutex<Vec<(Stage, EngineProperties)>>,
}

impl MockEngineFactory {
    /// A factory that always returns `engine`.
    #[must_use]
    pub fn new(engine: MockEngine) -> Self {
        Self {
            engine: Some(engine),
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A factory whose every `create` fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            engine: None,
            failure: Some(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every `(stage, properties)` pair passed to `create`, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<(Stage, EngineProperties)> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl EngineFactory for MockEngineFactory {
    fn create(&self, stage: Stage, properties: &EngineProperties) -> Result<Box<dyn Engine>> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((stage, properties.clone()));

        match (&self.engine, &self.failure) {
            (_, Some(message)) => Err(Error::engine(message.clone())),
            (Some(engine), None) => Ok(Box::new(engine.clone())),
            (None, None) => Err(Error::engine("mock factory has no engine")),
        }
    }
}
