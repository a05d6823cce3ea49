//! # spanlink-core
//!
//! Core types for spanlink: shared data structures used across the workspace.
//!
//! This crate provides:
//! - **Spans**: `Span`, half-open character intervals, plus char/byte offset helpers
//! - **Annotations**: `SourceAnnotation`, `AnnotationId`, `Properties`
//! - **Groups**: `Group`, `Role` (relations and coreference chains)
//! - **Store**: the `AnnotationStore` trait and the in-memory `AnnotatedText`
//! - **Conventions**: the type, property and group names every component agrees on

pub mod annotation;
pub mod conventions;
pub mod error;
pub mod group;
pub mod offset;
pub mod span;
pub mod store;

pub use annotation::{AnnotationId, Properties, SourceAnnotation};
pub use error::{Error, Result};
pub use group::{Group, GroupId, Role};
pub use span::Span;
pub use store::{AnnotatedText, AnnotationStore};
