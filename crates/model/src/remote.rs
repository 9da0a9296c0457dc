//! Platform metadata and the side-table that carries it.
//!
//! Entities synchronised with the remote course-hosting platform acquire
//! platform-assigned state: identifiers, update timestamps, publication
//! flags and related-id lists. That state is deliberately kept out of the
//! course tree. It lives in a [`RemoteInfoTable`] keyed by entity identity,
//! so "never synchronised" is simply absence from the table rather than a
//! null-valued field on every node.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Which kind of entity a key or info record refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Course,
    Section,
    Lesson,
    Task,
}

/// Identity of one entity within a course tree.
///
/// The root course has an empty path; a child's path is its parent's path
/// extended with the child's index in its container. The kind disambiguates
/// paths of equal shape (a lesson inside a section and a task inside a
/// top-level lesson both sit two indexes deep).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityKey {
    kind: EntityKind,
    path: Vec<usize>,
}

impl EntityKey {
    /// Key of the root course.
    pub fn course() -> Self {
        EntityKey {
            kind: EntityKind::Course,
            path: Vec::new(),
        }
    }

    /// Key of the child at `index` inside the entity this key names.
    pub fn child(&self, kind: EntityKind, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push(index);
        EntityKey { kind, path }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }
}

/// Platform metadata for one entity, one variant per entity kind.
#[derive(Clone, Debug, PartialEq)]
pub enum RemoteInfo {
    Course(CourseRemoteInfo),
    Section(SectionRemoteInfo),
    Lesson(LessonRemoteInfo),
    Task(TaskRemoteInfo),
}

/// Platform metadata for a course.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CourseRemoteInfo {
    /// Platform-assigned course identifier.
    pub id: i64,

    /// Whether the course is publicly visible on the platform.
    pub is_public: bool,

    /// Whether the course runs in adaptive mode.
    pub is_adaptive: bool,

    /// Whether the platform marks the course as IDE-compatible.
    pub is_idea_compatible: bool,

    /// Platform identifiers of the course's sections.
    pub section_ids: Vec<i64>,

    /// Platform identifiers of the course's instructors.
    pub instructor_ids: Vec<i64>,

    /// When the platform last updated the course. `None` means the date was
    /// never recorded.
    pub update_date: Option<DateTime<Utc>>,
}

impl CourseRemoteInfo {
    /// The recorded update date, or the epoch when none was recorded.
    pub fn update_date_or_epoch(&self) -> DateTime<Utc> {
        self.update_date.unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Platform metadata for a section.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SectionRemoteInfo {
    pub id: i64,

    /// Identifier of the owning course on the platform.
    pub course_id: i64,

    /// One-based position of the section within the course.
    pub position: i64,

    /// Platform identifiers of the section's units.
    pub unit_ids: Vec<i64>,

    pub update_date: Option<DateTime<Utc>>,
}

impl SectionRemoteInfo {
    /// The recorded update date, or the epoch when none was recorded.
    pub fn update_date_or_epoch(&self) -> DateTime<Utc> {
        self.update_date.unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Platform metadata for a lesson.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LessonRemoteInfo {
    pub id: i64,

    /// Identifier of the unit wrapping this lesson on the platform.
    pub unit_id: i64,

    /// Whether the lesson is publicly visible.
    pub is_public: bool,

    /// Platform identifiers of the lesson's steps.
    pub step_ids: Vec<i64>,

    pub update_date: Option<DateTime<Utc>>,
}

impl LessonRemoteInfo {
    /// The recorded update date, or the epoch when none was recorded.
    pub fn update_date_or_epoch(&self) -> DateTime<Utc> {
        self.update_date.unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Platform metadata for a task.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskRemoteInfo {
    /// Platform identifier of the step backing this task.
    pub step_id: i64,

    pub update_date: Option<DateTime<Utc>>,
}

impl TaskRemoteInfo {
    /// The recorded update date, or the epoch when none was recorded.
    pub fn update_date_or_epoch(&self) -> DateTime<Utc> {
        self.update_date.unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Side-table associating entities with their platform metadata.
///
/// No entity requires an entry to be valid; consumers must treat the
/// association as optional. Mutation takes `&mut self`, so exclusive access
/// for concurrent writers is enforced by the borrow rules.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemoteInfoTable {
    entries: HashMap<EntityKey, RemoteInfo>,
}

impl RemoteInfoTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `info` with the entity named by `key`, replacing and
    /// returning any existing association.
    pub fn attach(&mut self, key: EntityKey, info: RemoteInfo) -> Option<RemoteInfo> {
        self.entries.insert(key, info)
    }

    /// Removes and returns the association for `key`, if any.
    pub fn detach(&mut self, key: &EntityKey) -> Option<RemoteInfo> {
        self.entries.remove(key)
    }

    /// Returns the current association for `key`, if any.
    pub fn lookup(&self, key: &EntityKey) -> Option<&RemoteInfo> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &RemoteInfo)> {
        self.entries.iter()
    }
}
