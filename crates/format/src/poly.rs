//! Tagged encoding of polymorphic node kinds.
//!
//! Task and lesson payloads are unions whose concrete kind is only known at
//! runtime. On the wire they are flat objects: the discriminator field comes
//! first and the concrete kind's own fields share the same object, with no
//! nested wrapper. A [`TaggedCodec`] pairs that encoding with a registration
//! table of decoders, so a new kind only has to register its tag and field
//! set; container decode logic never changes.

use serde_json::Value;

use crate::value::Object;
use crate::{FormatError, FormatResult};

/// Decodes one concrete variant from the flat object its tag selected.
///
/// The discriminator field is still present in the object; decoders read the
/// remaining fields against their own key set.
pub type VariantDecoder<T> = fn(&Object) -> FormatResult<T>;

/// A discriminator key plus the decoders registered for its values.
pub struct TaggedCodec<T> {
    tag_key: &'static str,
    variants: Vec<(&'static str, VariantDecoder<T>)>,
}

impl<T> TaggedCodec<T> {
    pub fn new(tag_key: &'static str) -> Self {
        TaggedCodec {
            tag_key,
            variants: Vec::new(),
        }
    }

    /// Registers a decoder for one discriminator value.
    pub fn register(mut self, tag: &'static str, decoder: VariantDecoder<T>) -> Self {
        self.variants.push((tag, decoder));
        self
    }

    pub fn tag_key(&self) -> &'static str {
        self.tag_key
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.variants.iter().any(|(known, _)| *known == tag)
    }

    /// Encodes one variant: the discriminator first, then the variant's own
    /// fields flattened into the same object.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnknownVariant`] when `tag` has no registered
    /// decoder — an encoder asked to write a kind nobody can read back is a
    /// caller bug surfaced early.
    pub fn encode(&self, tag: &str, fields: Object) -> FormatResult<Object> {
        if !self.is_registered(tag) {
            return Err(FormatError::UnknownVariant(tag.to_string()));
        }
        let mut object = Object::new();
        object.insert(self.tag_key.to_string(), Value::String(tag.to_string()));
        object.extend(fields);
        Ok(object)
    }

    /// Reads the discriminator and runs the decoder registered for it.
    ///
    /// # Errors
    ///
    /// - [`FormatError::MissingDiscriminator`] when the tag field is absent.
    /// - [`FormatError::MalformedPayload`] when the tag field is not a
    ///   string.
    /// - [`FormatError::UnknownVariant`] when no decoder is registered for
    ///   the tag value.
    pub fn decode(&self, object: &Object) -> FormatResult<T> {
        let tag = match object.get(self.tag_key) {
            None => return Err(FormatError::MissingDiscriminator),
            Some(Value::String(tag)) => tag.as_str(),
            Some(_) => {
                return Err(FormatError::MalformedPayload(format!(
                    "discriminator `{}` is not a string",
                    self.tag_key
                )))
            }
        };
        let decoder = self
            .variants
            .iter()
            .find(|(known, _)| *known == tag)
            .map(|(_, decoder)| *decoder)
            .ok_or_else(|| FormatError::UnknownVariant(tag.to_string()))?;
        decoder(object)
    }
}
