//! Declarative field projection tables.
//!
//! For each entity kind these tables declare which model fields are
//! externally visible, under what key, in what order, and through which
//! one-way value transform. The codecs consult the tables instead of
//! discovering fields reflectively, so the external key set is fixed here
//! and nowhere else.
//!
//! Internal-only fields never appear in a table and are therefore never
//! emitted and never required on decode. The display transforms run on
//! encode only: the local format is meant for human reading of those two
//! fields, and decode stores the payload string verbatim rather than trying
//! to invert a display name back into an identifier.

/// External field keys, shared by both codecs.
pub mod keys {
    pub const VERSION: &str = "version";
    pub const TITLE: &str = "title";
    pub const SUMMARY: &str = "summary";
    pub const PROGRAMMING_LANGUAGE: &str = "programming_language";
    pub const LANGUAGE: &str = "language";
    pub const ITEMS: &str = "items";
    pub const TYPE: &str = "type";
    pub const TASK_LIST: &str = "task_list";
    pub const TASK_TYPE: &str = "task_type";
    pub const NAME: &str = "name";
    pub const TASK_FILES: &str = "task_files";
    pub const TEST_FILES: &str = "test_files";
    pub const DESCRIPTION_TEXT: &str = "description_text";
    pub const DESCRIPTION_FORMAT: &str = "description_format";
    pub const ADDITIONAL_FILES: &str = "additional_files";
    pub const TEXT: &str = "text";
    pub const PLACEHOLDERS: &str = "placeholders";
    pub const OFFSET: &str = "offset";
    pub const LENGTH: &str = "length";
    pub const PLACEHOLDER_TEXT: &str = "placeholder_text";
    pub const CHOICE_VARIANTS: &str = "choice_variants";
    pub const IS_MULTICHOICE: &str = "is_multichoice";
    pub const SELECTED_VARIANTS: &str = "selected_variants";
}

/// Discriminator values for the polymorphic node kinds.
pub mod tags {
    pub const LESSON: &str = "lesson";
    pub const FRAMEWORK: &str = "framework";
    pub const SECTION: &str = "section";
    pub const EDU: &str = "edu";
    pub const OUTPUT: &str = "output";
    pub const THEORY: &str = "theory";
    pub const CHOICE: &str = "choice";
}

/// Which one-way encode transform a field routes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transform {
    /// Emit the model value unchanged.
    None,

    /// Map a programming-language identifier to its display name.
    LanguageDisplay,

    /// Map a locale code to its display name.
    LocaleDisplay,
}

/// One externally visible field of an entity kind.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub key: &'static str,
    pub transform: Transform,
}

impl Field {
    pub const fn plain(key: &'static str) -> Self {
        Field {
            key,
            transform: Transform::None,
        }
    }

    pub const fn display(key: &'static str, transform: Transform) -> Self {
        Field { key, transform }
    }
}

/// Course direct fields, in emission order. The version stamp leads.
pub const COURSE_FIELDS: &[Field] = &[
    Field::plain(keys::VERSION),
    Field::plain(keys::TITLE),
    Field::plain(keys::SUMMARY),
    Field::display(keys::PROGRAMMING_LANGUAGE, Transform::LanguageDisplay),
    Field::display(keys::LANGUAGE, Transform::LocaleDisplay),
    Field::plain(keys::ITEMS),
];

/// Section direct fields, in emission order.
pub const SECTION_FIELDS: &[Field] = &[Field::plain(keys::TITLE), Field::plain(keys::ITEMS)];

/// Lesson direct fields, in emission order. The discriminator leads.
pub const LESSON_FIELDS: &[Field] = &[
    Field::plain(keys::TYPE),
    Field::plain(keys::TITLE),
    Field::plain(keys::TASK_LIST),
];

/// Task fields shared by every task kind, in emission order.
pub const TASK_FIELDS: &[Field] = &[
    Field::plain(keys::TASK_TYPE),
    Field::plain(keys::NAME),
    Field::plain(keys::TASK_FILES),
    Field::plain(keys::TEST_FILES),
    Field::plain(keys::DESCRIPTION_TEXT),
    Field::plain(keys::DESCRIPTION_FORMAT),
    Field::plain(keys::ADDITIONAL_FILES),
];

/// Extra fields of the choice task kind, emitted after the shared ones.
pub const CHOICE_FIELDS: &[Field] = &[
    Field::plain(keys::CHOICE_VARIANTS),
    Field::plain(keys::IS_MULTICHOICE),
    Field::plain(keys::SELECTED_VARIANTS),
];

/// Task-file fields, in emission order.
pub const TASK_FILE_FIELDS: &[Field] = &[
    Field::plain(keys::NAME),
    Field::plain(keys::TEXT),
    Field::plain(keys::PLACEHOLDERS),
];

/// Placeholder fields, in emission order.
pub const PLACEHOLDER_FIELDS: &[Field] = &[
    Field::plain(keys::OFFSET),
    Field::plain(keys::LENGTH),
    Field::plain(keys::PLACEHOLDER_TEXT),
];

/// Injected identifier → display-name lookups.
///
/// The conversion layer never owns these mappings; whoever calls the encoder
/// supplies them. A lookup returning `None` leaves the raw value in place,
/// so [`DisplayLookup::identity`] gives a transform-free encoder for tests
/// and tooling.
pub struct DisplayLookup<'a> {
    language: &'a dyn Fn(&str) -> Option<String>,
    locale: &'a dyn Fn(&str) -> Option<String>,
}

fn no_display(_: &str) -> Option<String> {
    None
}

impl<'a> DisplayLookup<'a> {
    pub fn new(
        language: &'a dyn Fn(&str) -> Option<String>,
        locale: &'a dyn Fn(&str) -> Option<String>,
    ) -> Self {
        DisplayLookup { language, locale }
    }

    /// A lookup that leaves every value unchanged.
    pub fn identity() -> DisplayLookup<'static> {
        DisplayLookup {
            language: &no_display,
            locale: &no_display,
        }
    }

    /// Applies `transform` to a raw model value.
    pub fn apply(&self, transform: Transform, raw: &str) -> String {
        let display = match transform {
            Transform::None => None,
            Transform::LanguageDisplay => (self.language)(raw),
            Transform::LocaleDisplay => (self.locale)(raw),
        };
        display.unwrap_or_else(|| raw.to_string())
    }
}
