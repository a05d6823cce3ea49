//! # spanlink
//!
//! Alignment between a flat span-annotation store and a hierarchical NLP
//! engine: project the store into the engine's document model, run the
//! engine, and write its output back onto the original annotations.
//!
//! - **Vocabulary**: engine labels ↔ local annotation types ([`TypeVocabulary`])
//! - **Projection**: store → [`NlpDocument`] ([`DocumentProjector`])
//! - **Engine**: the [`Engine`] seam, built per [`Stage`] by an [`EngineFactory`]
//! - **Back-projection**: engine output → [`BackProjection`] plans ([`backproject`])
//! - **Processors**: the three steps per stage ([`processors`])
//!
//! Core types (`Span`, `SourceAnnotation`, `AnnotatedText`, ...) live in
//! `spanlink-core` and are re-exported here.
//!
//! ```rust
//! use spanlink::{AnnotatedText, AnnotationStore, DocumentProjector, Properties, Span, TypeVocabulary};
//! use spanlink::conventions::types;
//!
//! let mut store = AnnotatedText::new("doc", "Rachel lives in London.");
//! store.create_annotation(Span::new(0, 23).unwrap(), types::SENTENCE, Properties::new());
//! store.create_annotation(Span::new(0, 6).unwrap(), types::WORD_TOKEN, Properties::new());
//! store.create_annotation(Span::new(0, 6).unwrap(), types::PERSON, Properties::new());
//!
//! let doc = DocumentProjector::new(TypeVocabulary::standard()).project(&store).unwrap();
//! assert_eq!(doc.tokens[0].ner, "PERSON");
//! assert_eq!(doc.sentences[0].mentions, vec![0]);
//! ```

#![warn(missing_docs)]

pub mod backproject;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod processors;
pub mod projector;
pub mod vocab;

pub use backproject::{
    back_project_coreference, back_project_token_property, back_project_tokenization,
    BackProjection, Committed, EntityBackProjector, RelationBackProjector, RelationSource,
    RelationVocabulary, TokenProperty,
};
pub use config::{EngineProperties, EngineSettings, NerSettings};
pub use document::{
    CorefChain, CorefMention, EntityMention, NlpDocument, RelationTriple, Sentence, Token,
};
pub use engine::{Engine, EngineFactory, MockEngine, MockEngineFactory, Stage};
pub use error::{Error, Result};
pub use processors::{
    Coreference, KbpRelation, Lemma, Ner, OpenIeRelation, PartOfSpeech, ProcessReport, Processor,
    Tokenize,
};
pub use projector::DocumentProjector;
pub use vocab::{TypeVocabulary, UNMAPPED};

pub use spanlink_core::{
    conventions, offset, AnnotatedText, AnnotationId, AnnotationStore, Group, GroupId, Properties,
    Role, SourceAnnotation, Span,
};
