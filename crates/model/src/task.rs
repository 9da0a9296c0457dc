//! Tasks and their files.
//!
//! A task owns its editable files, raw test texts and auxiliary files, keyed
//! by path relative to the task directory. Path keys are unique; their
//! insertion order carries no meaning, so sorted maps are used to keep any
//! external emission deterministic.

use std::collections::BTreeMap;

/// A single task inside a lesson.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Task {
    /// Display name of the task.
    pub name: String,

    /// Editable files, keyed by relative path.
    pub task_files: BTreeMap<String, TaskFile>,

    /// Raw test-file text, keyed by relative path. Opaque to this layer.
    pub test_files: BTreeMap<String, String>,

    /// Task statement shown to the learner.
    pub description_text: String,

    /// Markup flavour of `description_text`.
    pub description_format: DescriptionFormat,

    /// Auxiliary files shipped with the task, keyed by relative path.
    pub additional_files: BTreeMap<String, AdditionalFile>,

    /// Kind-specific payload; decides the task's type tag.
    pub data: TaskData,
}

impl Task {
    /// The task-kind tag this task serialises under.
    pub fn type_tag(&self) -> &'static str {
        self.data.type_tag()
    }
}

/// Kind-specific task payload.
///
/// Most kinds carry no extra state; choice tasks own their answer variants.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TaskData {
    /// Regular programming exercise checked by tests.
    #[default]
    Edu,

    /// Task checked by comparing program output.
    Output,

    /// Reading-only step with no check.
    Theory,

    /// Multiple-choice quiz step.
    Choice {
        /// Answer variants, in presentation order.
        variants: Vec<String>,

        /// Whether more than one variant may be selected.
        multiple_choice: bool,

        /// Indexes into `variants` the author last selected. Local state,
        /// never published to the platform.
        selected: Vec<usize>,
    },
}

impl TaskData {
    /// The type tag written as this kind's discriminator.
    pub fn type_tag(&self) -> &'static str {
        match self {
            TaskData::Edu => "edu",
            TaskData::Output => "output",
            TaskData::Theory => "theory",
            TaskData::Choice { .. } => "choice",
        }
    }
}

/// Markup flavour of a task description.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DescriptionFormat {
    #[default]
    Html,
    Md,
}

/// Error returned when a description-format tag is outside the known set.
#[derive(Debug, thiserror::Error)]
#[error("unknown description format: `{0}`")]
pub struct UnknownDescriptionFormat(pub String);

impl DescriptionFormat {
    /// Wire value of this format tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptionFormat::Html => "html",
            DescriptionFormat::Md => "md",
        }
    }
}

impl std::fmt::Display for DescriptionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DescriptionFormat {
    type Err = UnknownDescriptionFormat;

    /// Parses a format tag, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(DescriptionFormat::Html),
            "md" => Ok(DescriptionFormat::Md),
            _ => Err(UnknownDescriptionFormat(s.to_string())),
        }
    }
}

/// An editable file inside a task.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskFile {
    /// File name (relative path within the task).
    pub name: String,

    /// Full text content.
    pub text: String,

    /// Answer placeholders, ordered by offset.
    ///
    /// Placeholders are consumed by index during answer-checking, so the
    /// order must be re-established after any decode; see
    /// [`TaskFile::sort_placeholders`].
    pub placeholders: Vec<AnswerPlaceholder>,
}

impl TaskFile {
    /// Sorts placeholders by offset ascending.
    ///
    /// Ties keep their current relative order.
    pub fn sort_placeholders(&mut self) {
        self.placeholders.sort_by_key(|placeholder| placeholder.offset);
    }
}

/// A range within a task file the learner fills in.
///
/// Richer placeholder metadata (hints, dependencies, grading state) is owned
/// by the answer-checking subsystem; this layer only carries the range and
/// the text shown in place of the answer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnswerPlaceholder {
    /// Byte offset of the placeholder within the file text.
    pub offset: usize,

    /// Length of the replaced range.
    pub length: usize,

    /// Text displayed instead of the answer.
    pub placeholder_text: String,
}

/// An auxiliary file shipped with a task. Pass-through for this layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdditionalFile {
    pub name: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_placeholders_orders_by_offset() {
        let mut file = TaskFile {
            name: "main.rs".to_string(),
            text: "fn main() {}".to_string(),
            placeholders: vec![
                AnswerPlaceholder {
                    offset: 10,
                    length: 2,
                    placeholder_text: "b".to_string(),
                },
                AnswerPlaceholder {
                    offset: 3,
                    length: 1,
                    placeholder_text: "a".to_string(),
                },
            ],
        };

        file.sort_placeholders();

        let offsets: Vec<usize> = file.placeholders.iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![3, 10]);
    }

    #[test]
    fn type_tags_cover_every_kind() {
        assert_eq!(TaskData::Edu.type_tag(), "edu");
        assert_eq!(TaskData::Output.type_tag(), "output");
        assert_eq!(TaskData::Theory.type_tag(), "theory");
        let choice = TaskData::Choice {
            variants: vec![],
            multiple_choice: false,
            selected: vec![],
        };
        assert_eq!(choice.type_tag(), "choice");
    }

    #[test]
    fn description_format_parses_case_insensitively() {
        assert_eq!("HTML".parse::<DescriptionFormat>().expect("parse"), DescriptionFormat::Html);
        assert_eq!("md".parse::<DescriptionFormat>().expect("parse"), DescriptionFormat::Md);

        let err = "quiz".parse::<DescriptionFormat>().unwrap_err();
        assert_eq!(err.0, "quiz");
    }
}
