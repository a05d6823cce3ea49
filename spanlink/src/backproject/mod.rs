//! Result back-projection: engine output → store annotations and groups.
//!
//! Every back-projector reads an annotated [`NlpDocument`](crate::NlpDocument)
//! and the store it was projected from, and produces a [`BackProjection`]:
//! a plan of new annotations, replaced annotation versions and new groups.
//! Nothing touches the store until [`BackProjection::commit`], which checks
//! the whole plan first, so a failed commit writes nothing.
//!
//! Alignment is by exact character span. An engine mention covering
//! `[12, 17)` links only to store annotations spanning exactly `[12, 17)`;
//! containment or overlap never counts. Misses are logged and skipped.
//!
//! | Back-projector | Reads | Writes |
//! |---|---|---|
//! | [`EntityBackProjector`] | `mentions` | new entity annotations |
//! | [`back_project_coreference`] | `coref_chains` | `grammar/coreference` groups |
//! | [`RelationBackProjector`] | sentence triples | `relation/*` groups |
//! | [`back_project_token_property`] | token POS / lemma | replaced tokens |
//! | [`back_project_tokenization`] | sentences, tokens | new sentences, tokens |

mod coref;
mod entities;
mod relations;
mod tokens;

pub use coref::back_project_coreference;
pub use entities::EntityBackProjector;
pub use relations::{normalize_relation, RelationBackProjector, RelationSource, RelationVocabulary};
pub use tokens::{back_project_token_property, back_project_tokenization, TokenProperty};

use spanlink_core::{
    AnnotationId, AnnotationStore, GroupId, Properties, Role, SourceAnnotation, Span,
};

use crate::error::{Error, Result};

/// A new annotation to create.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedAnnotation {
    /// Character bounds
    pub span: Span,
    /// Type string
    pub annotation_type: String,
    /// Properties
    pub properties: Properties,
}

/// A new group to create over existing annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedGroup {
    /// Group type string
    pub group_type: String,
    /// Properties
    pub properties: Properties,
    /// Participants in insertion order
    pub participants: Vec<(Role, AnnotationId)>,
}

impl PlannedGroup {
    /// Annotations playing `role`.
    pub fn with_role(&self, role: Role) -> impl Iterator<Item = AnnotationId> + '_ {
        self.participants
            .iter()
            .filter(move |(r, _)| *r == role)
            .map(|(_, id)| *id)
    }
}

/// Everything one back-projection wants to write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackProjection {
    /// Annotations to create
    pub annotations: Vec<PlannedAnnotation>,
    /// New versions of existing annotations (matched by id)
    pub replacements: Vec<SourceAnnotation>,
    /// Groups to create
    pub groups: Vec<PlannedGroup>,
}

/// Ids written by [`BackProjection::commit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Committed {
    /// Created annotations, in plan order
    pub annotations: Vec<AnnotationId>,
    /// Replaced annotations, in plan order
    pub replaced: Vec<AnnotationId>,
    /// Created groups, in plan order
    pub groups: Vec<GroupId>,
}

impl BackProjection {
    /// An empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan a new annotation.
    pub fn add_annotation(
        &mut self,
        span: Span,
        annotation_type: impl Into<String>,
        properties: Properties,
    ) {
        self.annotations.push(PlannedAnnotation {
            span,
            annotation_type: annotation_type.into(),
            properties,
        });
    }

    /// Plan a new version of an existing annotation.
    pub fn replace(&mut self, annotation: SourceAnnotation) {
        self.replacements.push(annotation);
    }

    /// Plan a new group.
    pub fn add_group(
        &mut self,
        group_type: impl Into<String>,
        properties: Properties,
        participants: Vec<(Role, AnnotationId)>,
    ) {
        self.groups.push(PlannedGroup {
            group_type: group_type.into(),
            properties,
            participants,
        });
    }

    /// Check if the plan writes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty() && self.replacements.is_empty() && self.groups.is_empty()
    }

    /// Apply the plan to `store`.
    ///
    /// Replacements and group participants are checked against the store
    /// before anything is written.
    ///
    /// # Errors
    ///
    /// `Error::Core(UnknownAnnotation)` if a replacement or participant
    /// refers to an annotation the store does not hold.
    pub fn commit<S>(self, store: &mut S) -> Result<Committed>
    where
        S: AnnotationStore + ?Sized,
    {
        let referenced = self
            .replacements
            .iter()
            .map(|a| a.id)
            .chain(self.groups.iter().flat_map(|g| g.participants.iter().map(|(_, id)| *id)));
        for id in referenced {
            if store.get(id).is_none() {
                return Err(Error::Core(spanlink_core::Error::UnknownAnnotation(id)));
            }
        }

        let mut committed = Committed::default();
        for planned in self.annotations {
            committed.annotations.push(store.create_annotation(
                planned.span,
                &planned.annotation_type,
                planned.properties,
            ));
        }
        for annotation in self.replacements {
            committed.replaced.push(annotation.id);
            store.replace_annotation(annotation)?;
        }
        for planned in self.groups {
            committed.groups.push(store.create_group(
                &planned.group_type,
                planned.properties,
                planned.participants,
            )?);
        }
        Ok(committed)
    }
}

/// Store annotations of `annotation_type` whose span equals `span`.
pub(crate) fn exact_matches<'s, S>(
    store: &'s S,
    annotation_type: &str,
    span: Span,
) -> Vec<&'s SourceAnnotation>
where
    S: AnnotationStore + ?Sized,
{
    store
        .by_type(annotation_type)
        .into_iter()
        .filter(|a| a.span == Some(span))
        .collect()
}
