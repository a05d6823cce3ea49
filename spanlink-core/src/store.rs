//! The annotation store interface and an in-memory implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::annotation::{AnnotationId, Properties, SourceAnnotation};
use crate::error::{Error, Result};
use crate::group::{Group, GroupId, Role};
use crate::offset::slice_chars;
use crate::span::Span;

/// What the alignment layer needs from an annotation store.
///
/// Stores are append-only from the alignment layer's point of view: it
/// creates annotations and groups and may swap in a new version of an
/// existing annotation (same id), but never deletes anything.
pub trait AnnotationStore {
    /// The document text the spans index into.
    fn content(&self) -> &str;

    /// All annotations, in creation order.
    fn annotations(&self) -> &[SourceAnnotation];

    /// All groups, in creation order.
    fn groups(&self) -> &[Group];

    /// Create a span-bounded annotation and return its id.
    fn create_annotation(
        &mut self,
        span: Span,
        annotation_type: &str,
        properties: Properties,
    ) -> AnnotationId;

    /// Replace the stored version of `annotation` (matched by id).
    fn replace_annotation(&mut self, annotation: SourceAnnotation) -> Result<()>;

    /// Create a group over existing annotations and return its id.
    fn create_group(
        &mut self,
        group_type: &str,
        properties: Properties,
        participants: Vec<(Role, AnnotationId)>,
    ) -> Result<GroupId>;

    /// Annotations of `annotation_type` that carry a span, in creation order.
    fn by_type(&self, annotation_type: &str) -> Vec<&SourceAnnotation> {
        self.annotations()
            .iter()
            .filter(|a| a.span.is_some() && a.is_type(annotation_type))
            .collect()
    }

    /// Annotations that carry a span, in creation order.
    fn with_spans(&self) -> Vec<&SourceAnnotation> {
        self.annotations()
            .iter()
            .filter(|a| a.span.is_some())
            .collect()
    }

    /// Look up an annotation by id.
    fn get(&self, id: AnnotationId) -> Option<&SourceAnnotation> {
        self.annotations().iter().find(|a| a.id == id)
    }

    /// Covered text of `annotation`, if it has a span inside the content.
    fn text(&self, annotation: &SourceAnnotation) -> Option<&str> {
        annotation.span.and_then(|span| slice_chars(self.content(), span))
    }

    /// Groups of `group_type`.
    fn groups_of_type(&self, group_type: &str) -> Vec<&Group> {
        self.groups()
            .iter()
            .filter(|g| g.group_type == group_type)
            .collect()
    }
}

/// An in-memory annotated text: one document's content, annotations and groups.
///
/// # Example
///
/// ```rust
/// use spanlink_core::{AnnotatedText, AnnotationStore, Properties, Span};
/// use spanlink_core::conventions::types;
///
/// let mut doc = AnnotatedText::new("doc1", "Rachel lives in London.");
/// let rachel = doc.create_annotation(Span::new(0, 6).unwrap(), types::PERSON, Properties::new());
///
/// let annotation = doc.get(rachel).unwrap();
/// assert_eq!(doc.text(annotation), Some("Rachel"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedText {
    /// Document identifier
    pub id: String,
    content: String,
    annotations: Vec<SourceAnnotation>,
    groups: Vec<Group>,
    /// Index: annotation id → position in `annotations`
    #[serde(skip)]
    positions: HashMap<AnnotationId, usize>,
    next_annotation_id: u64,
    next_group_id: GroupId,
}

impl AnnotatedText {
    /// Create an empty annotated text.
    #[must_use]
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            annotations: Vec::new(),
            groups: Vec::new(),
            positions: HashMap::new(),
            next_annotation_id: 0,
            next_group_id: 0,
        }
    }

    /// Add an annotation that has no character span (bounded some other way).
    pub fn add_unbounded(&mut self, annotation_type: &str, properties: Properties) -> AnnotationId {
        self.push(None, annotation_type, properties)
    }

    fn push(
        &mut self,
        span: Option<Span>,
        annotation_type: &str,
        properties: Properties,
    ) -> AnnotationId {
        let id = AnnotationId(self.next_annotation_id);
        self.next_annotation_id += 1;
        self.positions.insert(id, self.annotations.len());
        self.annotations
            .push(SourceAnnotation::new(id, span, annotation_type, properties));
        id
    }

    fn position(&self, id: AnnotationId) -> Option<usize> {
        // The index is skipped by serde; fall back to a scan after deserializing.
        self.positions
            .get(&id)
            .copied()
            .or_else(|| self.annotations.iter().position(|a| a.id == id))
    }
}

impl AnnotationStore for AnnotatedText {
    fn content(&self) -> &str {
        &self.content
    }

    fn annotations(&self) -> &[SourceAnnotation] {
        &self.annotations
    }

    fn groups(&self) -> &[Group] {
        &self.groups
    }

    fn create_annotation(
        &mut self,
        span: Span,
        annotation_type: &str,
        properties: Properties,
    ) -> AnnotationId {
        self.push(Some(span), annotation_type, properties)
    }

    fn replace_annotation(&mut self, annotation: SourceAnnotation) -> Result<()> {
        let pos = self
            .position(annotation.id)
            .ok_or(Error::UnknownAnnotation(annotation.id))?;
        self.annotations[pos] = annotation;
        Ok(())
    }

    fn create_group(
        &mut self,
        group_type: &str,
        properties: Properties,
        participants: Vec<(Role, AnnotationId)>,
    ) -> Result<GroupId> {
        if let Some((_, missing)) = participants
            .iter()
            .find(|(_, id)| self.position(*id).is_none())
        {
            return Err(Error::UnknownAnnotation(*missing));
        }

        let id = self.next_group_id;
        self.next_group_id += 1;
        self.groups.push(Group {
            id,
            group_type: group_type.to_string(),
            properties,
            participants,
        });
        Ok(id)
    }

    fn get(&self, id: AnnotationId) -> Option<&SourceAnnotation> {
        self.position(id).map(|pos| &self.annotations[pos])
    }
}
