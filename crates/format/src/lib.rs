//! Course wire/boundary support.
//!
//! This crate is responsible for translating between the in-memory course
//! model (`edu-model`) and its two external representations: the
//! human-authored local configuration format (YAML) and the remote
//! course-hosting platform's wire format (JSON).
//!
//! The two formats are deliberately independent codepaths over one shared
//! internal representation, an ordered key/value tree ([`Object`]). Each
//! codec builds or walks that tree explicitly, consulting the declarative
//! field tables in [`projection`]; no format knowledge leaks into the model
//! and no reflective field discovery is involved.
//!
//! Course meaning lives in `edu-model`. This crate handles formats only: it
//! performs no I/O and keeps no global state, so encode/decode calls on
//! independent subtrees may run concurrently without coordination.

pub mod local;
pub mod poly;
pub mod projection;
pub mod remote;
pub mod value;

mod fields;

use thiserror::Error;

pub use poly::TaggedCodec;
pub use projection::DisplayLookup;
pub use value::Object;

/// Errors returned by the `edu-format` boundary crate.
///
/// All decode failures are synchronous return values; nothing is silently
/// substituted with a default unless that default is part of the format
/// contract. Encode fails only when asked to serialise a node whose type
/// tag is not registered.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Structurally invalid input: not an object where one is required, an
    /// unparsable value, an unknown schema version or an unparsable date.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A polymorphic payload lacks its type discriminator field.
    #[error("polymorphic payload is missing its type discriminator")]
    MissingDiscriminator,

    /// A type tag with no registered variant.
    #[error("unknown variant tag: `{0}`")]
    UnknownVariant(String),

    /// A required field with no documented default is absent.
    #[error("required field `{0}` is absent")]
    RequiredFieldAbsent(&'static str),
}

pub type FormatResult<T> = std::result::Result<T, FormatError>;
