//! Canonical in-memory course model.
//!
//! This crate defines the domain tree an authoring session works on:
//! course → sections/lessons → tasks → files/placeholders, plus the
//! platform-metadata side-table that links entities to their remote
//! counterparts.
//!
//! The model carries no format knowledge. Which fields are externally
//! visible, under what names and in what order, is decided entirely by the
//! codecs in `edu-format`; nothing here derives a wire representation.

pub mod course;
pub mod remote;
pub mod task;

pub use course::{Course, Lesson, LessonKind, Section, StudyItem};
pub use remote::{
    CourseRemoteInfo, EntityKey, EntityKind, LessonRemoteInfo, RemoteInfo, RemoteInfoTable,
    SectionRemoteInfo, TaskRemoteInfo,
};
pub use task::{
    AdditionalFile, AnswerPlaceholder, DescriptionFormat, Task, TaskData, TaskFile,
    UnknownDescriptionFormat,
};
