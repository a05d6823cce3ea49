//! Groups: role-assigned sets of annotations (relations, coreference chains).

use serde::{Deserialize, Serialize};

use crate::annotation::{AnnotationId, Properties};

/// Unique identifier for a group within a store.
pub type GroupId = u64;

/// The part an annotation plays within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Subject side of a directed relation
    Source,
    /// Object side of a directed relation
    Target,
    /// Either side of a symmetric relation
    Object,
    /// Member of a coreference chain
    Mention,
}

impl Role {
    /// Conventional role name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
            Self::Object => "object",
            Self::Mention => "mention",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of role-assigned participant annotations.
///
/// Relation groups (`relation/spouse`, ...) and coreference groups
/// (`grammar/coreference`) share this shape. Groups are created fresh per
/// document and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Identity within the store
    pub id: GroupId,
    /// Group type string
    pub group_type: String,
    /// Properties (e.g. `probability` for relations)
    pub properties: Properties,
    /// Participants in insertion order
    pub participants: Vec<(Role, AnnotationId)>,
}

impl Group {
    /// Annotations playing `role`.
    pub fn with_role(&self, role: Role) -> impl Iterator<Item = AnnotationId> + '_ {
        self.participants
            .iter()
            .filter(move |(r, _)| *r == role)
            .map(|(_, id)| *id)
    }

    /// Role of `annotation`, if it participates.
    #[must_use]
    pub fn role_of(&self, annotation: AnnotationId) -> Option<Role> {
        self.participants
            .iter()
            .find(|(_, id)| *id == annotation)
            .map(|(role, _)| *role)
    }

    /// Check if `annotation` participates in any role.
    #[must_use]
    pub fn contains(&self, annotation: AnnotationId) -> bool {
        self.role_of(annotation).is_some()
    }

    /// Number of participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Check if the group has no participants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
