//! Course tree containers: course, section and lesson.
//!
//! Ownership is strictly hierarchical: each child is exclusively owned by
//! its parent, and the whole tree is owned by whichever subsystem loaded it.
//! Item order inside every container is significant and must survive a
//! round-trip through any external format.

use crate::task::Task;

/// Root of the course tree.
///
/// `programming_language` holds the internal language identifier and
/// `language_code` the locale code. Both are rendered through an injected
/// display-name lookup when the course is written to the local format; the
/// model itself never stores display strings on purpose, but a decode of a
/// human-edited file may leave display text here until the caller resolves
/// it back to an identifier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Course {
    /// Human-readable course title.
    pub title: String,

    /// Human-readable summary shown in course listings.
    pub summary: String,

    /// Internal programming-language identifier (for example "Python").
    pub programming_language: String,

    /// Locale code for the course content (for example "en").
    pub language_code: String,

    /// Ordered top-level items. Order is significant.
    pub items: Vec<StudyItem>,
}

/// A top-level course item: either a section or a bare lesson.
#[derive(Clone, Debug, PartialEq)]
pub enum StudyItem {
    Section(Section),
    Lesson(Lesson),
}

/// A named group of lessons.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Section {
    pub title: String,

    /// Ordered lessons. Order is significant.
    pub lessons: Vec<Lesson>,
}

/// A lesson: an ordered list of tasks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lesson {
    pub kind: LessonKind,

    pub title: String,

    /// Ordered tasks. Order is significant.
    pub tasks: Vec<Task>,
}

/// Which flavour of lesson this is.
///
/// Framework lessons share one task scaffold across all their tasks; plain
/// lessons keep every task independent. The distinction only changes how the
/// authoring tools treat the lesson, not its structure here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LessonKind {
    #[default]
    Plain,
    Framework,
}
