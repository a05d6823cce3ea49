//! Relation back-projection (KBP slot relations and open information extraction).

use std::collections::{BTreeSet, HashMap, HashSet};

use once_cell::sync::Lazy;
use spanlink_core::conventions::{groups, keys};
use spanlink_core::{AnnotationId, AnnotationStore, Properties, Role, Span};

use super::{exact_matches, BackProjection};
use crate::document::{NlpDocument, RelationTriple};
use crate::vocab::{TypeVocabulary, UNMAPPED};

static STANDARD: Lazy<RelationVocabulary> = Lazy::new(RelationVocabulary::build_standard);

/// KBP slot name → relation group name (without the `relation/` prefix).
const KBP_RELATIONS: &[(&str, &str)] = &[
    ("org:alternate_names", "alsoKnownAs"),
    ("org:city_of_headquarters", "locationOfHeadquarters"),
    ("org:country_of_headquarters", "locationOfHeadquarters"),
    ("org:date_dissolved", "dateDissolved"),
    ("org:date_founded", "dateFounded"),
    ("org:founded_by", "foundedBy"),
    ("org:members", "members"),
    ("org:member_of", "memberOf"),
    ("org:number_of_employees_members", "numberOfMembers"),
    ("org:parents", "parent"),
    ("org:political_religious_affiliation", "affiliation"),
    ("org:shareholders", "shareholders"),
    ("org:stateorprovince_of_headquarters", "locationOfHeadquarters"),
    ("org:subsidiaries", "subsidiaries"),
    ("org:top_members_employees", "leaderOf"),
    ("org:website", "website"),
    ("per:age", "age"),
    ("per:alternate_names", "alsoKnownAs"),
    ("per:cause_of_death", "causeOfDeath"),
    ("per:charges", "criminalCharges"),
    ("per:children", "child"),
    ("per:cities_of_residence", "locationOfResidence"),
    ("per:city_of_birth", "locationOfBirth"),
    ("per:city_of_death", "locationOfDeath"),
    ("per:countries_of_residence", "locationOfResidence"),
    ("per:country_of_birth", "locationOfBirth"),
    ("per:country_of_death", "locationOfDeath"),
    ("per:date_of_birth", "dateOfBirth"),
    ("per:date_of_death", "dateOfDeath"),
    ("per:employee_or_member_of", "memberOf"),
    ("per:origin", "nationality"),
    ("per:other_family", "family"),
    ("per:parents", "parent"),
    ("per:religion", "religion"),
    ("per:schools_attended", "schoolAttended"),
    ("per:siblings", "sibling"),
    ("per:spouse", "spouse"),
    ("per:stateorprovince_of_birth", "locationOfBirth"),
    ("per:stateorprovince_of_death", "locationOfDeath"),
    ("per:statesorprovinces_of_residence", "locationOfResidence"),
    ("per:title", "title"),
];

/// Relations with no direction: both arguments take the `Object` role.
const OMNI_DIRECTIONAL: &[&str] = &["alsoKnownAs", "sibling", "spouse"];

/// Maps engine relation predicates to relation group types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationVocabulary {
    kbp: HashMap<String, String>,
    omni_directional: HashSet<String>,
}

impl RelationVocabulary {
    /// The process-wide default table.
    #[must_use]
    pub fn standard() -> &'static RelationVocabulary {
        &STANDARD
    }

    fn build_standard() -> Self {
        Self {
            kbp: KBP_RELATIONS
                .iter()
                .map(|(slot, name)| (slot.to_string(), relation_group(name)))
                .collect(),
            omni_directional: OMNI_DIRECTIONAL.iter().map(|name| relation_group(name)).collect(),
        }
    }

    /// Group type for a KBP predicate.
    ///
    /// Unknown predicates fall back to `relation/` plus the normalized
    /// predicate.
    #[must_use]
    pub fn kbp_relation_type(&self, predicate: &str) -> String {
        self.kbp
            .get(predicate)
            .cloned()
            .unwrap_or_else(|| relation_group(&normalize_relation(predicate)))
    }

    /// Group type for an open information extraction relation lemma.
    #[must_use]
    pub fn openie_relation_type(&self, relation_lemma: &str) -> String {
        relation_group(&normalize_relation(relation_lemma))
    }

    /// Check if `relation_type` takes its arguments without direction.
    #[must_use]
    pub fn is_omni_directional(&self, relation_type: &str) -> bool {
        self.omni_directional.contains(relation_type)
    }
}

fn relation_group(name: &str) -> String {
    format!("{}{}", groups::RELATION_PREFIX, name)
}

/// Camel-case a relation gloss: `"was born in"` → `"wasBornIn"`.
///
/// Each space-separated word is lowercased and then capitalized, the words
/// are joined, and the first letter is lowercased.
#[must_use]
pub fn normalize_relation(gloss: &str) -> String {
    let mut out = String::with_capacity(gloss.len());
    for word in gloss.split(' ') {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }

    let mut chars = out.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => out,
    }
}

/// Which triples a [`RelationBackProjector`] reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationSource {
    /// `Sentence::kbp_triples`, typed through the KBP table
    Kbp,
    /// `Sentence::openie_triples`, typed from the relation lemma
    OpenIe,
}

/// Turns engine relation triples into relation groups over existing annotations.
///
/// For each side of a triple (subject first, then object) the tokens'
/// named-entity tags must resolve to exactly one local type; every store
/// annotation of that type spanning exactly the side's tokens joins the
/// group. Anything ambiguous skips the whole triple:
///
/// - a side with no tokens
/// - tokens whose tags resolve to more than one local type
/// - tokens with no local type at all
///
/// Omni-directional relations (`spouse`, `sibling`, `alsoKnownAs`) put both
/// sides in the `Object` role, and a triple whose predicate and argument
/// token positions repeat an earlier one in the same sentence is skipped,
/// so "A married B" and "B married A" give one group.
#[derive(Debug, Clone, Copy)]
pub struct RelationBackProjector<'a> {
    relations: &'a RelationVocabulary,
    types: &'a TypeVocabulary,
    source: RelationSource,
}

impl<'a> RelationBackProjector<'a> {
    /// Create a back-projector for `source` triples.
    #[must_use]
    pub fn new(
        relations: &'a RelationVocabulary,
        types: &'a TypeVocabulary,
        source: RelationSource,
    ) -> Self {
        Self {
            relations,
            types,
            source,
        }
    }

    /// Plan one group per accepted triple.
    #[must_use]
    pub fn back_project<S>(&self, doc: &NlpDocument, store: &S) -> BackProjection
    where
        S: AnnotationStore + ?Sized,
    {
        let mut plan = BackProjection::new();

        for sentence in &doc.sentences {
            let triples = match self.source {
                RelationSource::Kbp => &sentence.kbp_triples,
                RelationSource::OpenIe => &sentence.openie_triples,
            };
            let mut seen_omni: HashSet<(String, BTreeSet<(usize, usize)>)> = HashSet::new();

            for triple in triples {
                let relation_type = match self.source {
                    RelationSource::Kbp => self.relations.kbp_relation_type(&triple.relation),
                    RelationSource::OpenIe => {
                        self.relations.openie_relation_type(&triple.relation_lemma)
                    }
                };
                let omni = self.source == RelationSource::Kbp
                    && self.relations.is_omni_directional(&relation_type);

                if omni {
                    let key = (triple.relation.clone(), argument_positions(doc, triple));
                    if !seen_omni.insert(key) {
                        log::debug!(
                            "[relations] sentence {}: duplicate {} triple skipped",
                            sentence.index,
                            relation_type
                        );
                        continue;
                    }
                }

                let (subject_role, object_role) = if omni {
                    (Role::Object, Role::Object)
                } else {
                    (Role::Source, Role::Target)
                };

                let Some(mut participants) =
                    self.resolve_side(doc, store, &triple.subject, subject_role)
                else {
                    continue;
                };
                let Some(objects) = self.resolve_side(doc, store, &triple.object, object_role)
                else {
                    continue;
                };
                participants.extend(objects);

                if participants.is_empty() {
                    log::debug!(
                        "[relations] sentence {}: {} matched no annotations",
                        sentence.index,
                        relation_type
                    );
                    continue;
                }

                plan.add_group(
                    relation_type,
                    Properties::new().with(keys::PROBABILITY, triple.confidence),
                    participants,
                );
            }
        }

        plan
    }

    /// Participants for one side of a triple, or `None` to skip the triple.
    fn resolve_side<S>(
        &self,
        doc: &NlpDocument,
        store: &S,
        side: &[usize],
        role: Role,
    ) -> Option<Vec<(Role, AnnotationId)>>
    where
        S: AnnotationStore + ?Sized,
    {
        if side.is_empty() {
            return None;
        }

        let mut local_types = Vec::new();
        for &idx in side {
            let Some(token) = doc.tokens.get(idx) else {
                log::warn!("[relations] triple refers to missing token {}", idx);
                return None;
            };
            let local = self.types.local_type_or(&token.ner, UNMAPPED);
            if !local_types.contains(&local) {
                local_types.push(local);
            }
        }

        // Mixed types means the side crosses annotation bounds
        let [local_type] = local_types.as_slice() else {
            return None;
        };
        let local_type = *local_type;
        if local_type == UNMAPPED {
            return None;
        }

        let span: Span = doc.span_of_tokens(side)?;
        Some(
            exact_matches(store, local_type, span)
                .into_iter()
                .map(|a| (role, a.id))
                .collect(),
        )
    }
}

/// Sorted, distinct `(begin, end)` positions of every argument token.
fn argument_positions(doc: &NlpDocument, triple: &RelationTriple) -> BTreeSet<(usize, usize)> {
    triple
        .subject
        .iter()
        .chain(&triple.object)
        .filter_map(|&idx| doc.tokens.get(idx))
        .map(|t| (t.span.begin(), t.span.end()))
        .collect()
}
