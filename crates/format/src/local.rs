//! Local configuration format codec.
//!
//! The local format is the human-authored YAML representation of a course
//! subtree. Course, section, lesson, task and task file each have an
//! independent payload whose field set, order and transforms come from the
//! projection tables; nesting mirrors the tree. The schema-version stamp is
//! written only at the course level.
//!
//! Decode is lenient: unknown keys are ignored and absent optional keys take
//! their documented defaults. The two display-transformed course fields are
//! read back verbatim — re-deriving an internal identifier from a display
//! name is the caller's concern, not this codec's.

use std::collections::BTreeMap;

use serde_json::Value;

use edu_model::{Course, Lesson, LessonKind, Section, StudyItem, Task, TaskData, TaskFile};

use crate::fields::{
    additional_file_from_object, additional_file_to_object, description_format_field, lesson_tag,
    task_file_from_object, task_file_to_object, task_files_from_object, task_files_to_value,
};
use crate::poly::TaggedCodec;
use crate::projection::{self, keys, tags, DisplayLookup};
use crate::value::{
    as_object, bool_field, from_yaml_text, index_list_field, object_field, seq_field, str_field,
    str_list_field, to_yaml_text, Object,
};
use crate::{FormatError, FormatResult};

/// Current schema version, stamped on every course payload.
pub const LOCAL_FORMAT_VERSION: u64 = 8;

/// Writes a course and its whole subtree as local-format text.
///
/// `lookup` supplies the one-way identifier → display-name transforms for
/// the two language fields; it is consulted on encode only.
///
/// # Errors
///
/// Returns [`FormatError::UnknownVariant`] if the tree contains a node kind
/// with no registered discriminator.
pub fn write_course_yaml(course: &Course, lookup: &DisplayLookup) -> FormatResult<String> {
    to_yaml_text(&course_to_value(course, lookup)?)
}

/// Reads a course and its whole subtree from local-format text.
///
/// # Errors
///
/// Returns [`FormatError::MalformedPayload`] for structurally invalid input
/// or an unsupported schema version, [`FormatError::MissingDiscriminator`] /
/// [`FormatError::UnknownVariant`] for broken polymorphic nodes.
pub fn read_course_yaml(text: &str) -> FormatResult<Course> {
    value_to_course(&from_yaml_text(text)?)
}

/// Writes a standalone section payload.
pub fn write_section_yaml(section: &Section) -> FormatResult<String> {
    to_yaml_text(&Value::Object(section_fields(section)?))
}

/// Reads a standalone section payload.
pub fn read_section_yaml(text: &str) -> FormatResult<Section> {
    let value = from_yaml_text(text)?;
    section_from_object(as_object(&value)?)
}

/// Writes a standalone lesson payload, type tag included.
pub fn write_lesson_yaml(lesson: &Lesson) -> FormatResult<String> {
    let object = item_codec().encode(lesson_tag(lesson.kind), lesson_fields(lesson)?)?;
    to_yaml_text(&Value::Object(object))
}

/// Reads a standalone lesson payload.
pub fn read_lesson_yaml(text: &str) -> FormatResult<Lesson> {
    let value = from_yaml_text(text)?;
    match item_codec().decode(as_object(&value)?)? {
        StudyItem::Lesson(lesson) => Ok(lesson),
        StudyItem::Section(_) => Err(FormatError::MalformedPayload(
            "expected a lesson payload, found a section".to_string(),
        )),
    }
}

/// Writes a standalone task payload, task-type tag included.
pub fn write_task_yaml(task: &Task) -> FormatResult<String> {
    let object = task_codec().encode(task.type_tag(), task_fields(task)?)?;
    to_yaml_text(&Value::Object(object))
}

/// Reads a standalone task payload.
pub fn read_task_yaml(text: &str) -> FormatResult<Task> {
    let value = from_yaml_text(text)?;
    task_codec().decode(as_object(&value)?)
}

/// Writes a standalone task-file payload.
pub fn write_task_file_yaml(file: &TaskFile) -> FormatResult<String> {
    to_yaml_text(&Value::Object(task_file_to_object(file)))
}

/// Reads a standalone task-file payload.
pub fn read_task_file_yaml(text: &str) -> FormatResult<TaskFile> {
    let value = from_yaml_text(text)?;
    task_file_from_object(as_object(&value)?)
}

fn course_to_value(course: &Course, lookup: &DisplayLookup) -> FormatResult<Value> {
    let mut object = Object::new();
    for field in projection::COURSE_FIELDS {
        match field.key {
            keys::VERSION => {
                object.insert(field.key.to_string(), Value::from(LOCAL_FORMAT_VERSION));
            }
            keys::TITLE => {
                object.insert(field.key.to_string(), Value::String(course.title.clone()));
            }
            keys::SUMMARY => {
                object.insert(field.key.to_string(), Value::String(course.summary.clone()));
            }
            keys::PROGRAMMING_LANGUAGE => {
                object.insert(
                    field.key.to_string(),
                    Value::String(lookup.apply(field.transform, &course.programming_language)),
                );
            }
            keys::LANGUAGE => {
                object.insert(
                    field.key.to_string(),
                    Value::String(lookup.apply(field.transform, &course.language_code)),
                );
            }
            keys::ITEMS => {
                let items = course
                    .items
                    .iter()
                    .map(study_item_to_value)
                    .collect::<FormatResult<Vec<_>>>()?;
                object.insert(field.key.to_string(), Value::Array(items));
            }
            _ => {}
        }
    }
    Ok(Value::Object(object))
}

fn study_item_to_value(item: &StudyItem) -> FormatResult<Value> {
    let codec = item_codec();
    let object = match item {
        StudyItem::Section(section) => codec.encode(tags::SECTION, section_fields(section)?)?,
        StudyItem::Lesson(lesson) => {
            codec.encode(lesson_tag(lesson.kind), lesson_fields(lesson)?)?
        }
    };
    Ok(Value::Object(object))
}

fn section_fields(section: &Section) -> FormatResult<Object> {
    let codec = item_codec();
    let mut object = Object::new();
    for field in projection::SECTION_FIELDS {
        match field.key {
            keys::TITLE => {
                object.insert(field.key.to_string(), Value::String(section.title.clone()));
            }
            keys::ITEMS => {
                let lessons = section
                    .lessons
                    .iter()
                    .map(|lesson| {
                        let fields = lesson_fields(lesson)?;
                        Ok(Value::Object(
                            codec.encode(lesson_tag(lesson.kind), fields)?,
                        ))
                    })
                    .collect::<FormatResult<Vec<_>>>()?;
                object.insert(field.key.to_string(), Value::Array(lessons));
            }
            _ => {}
        }
    }
    Ok(object)
}

fn lesson_fields(lesson: &Lesson) -> FormatResult<Object> {
    let mut object = Object::new();
    for field in projection::LESSON_FIELDS {
        match field.key {
            // The discriminator is written by the tagged codec.
            keys::TYPE => {}
            keys::TITLE => {
                object.insert(field.key.to_string(), Value::String(lesson.title.clone()));
            }
            keys::TASK_LIST => {
                let tasks = lesson
                    .tasks
                    .iter()
                    .map(task_to_value)
                    .collect::<FormatResult<Vec<_>>>()?;
                object.insert(field.key.to_string(), Value::Array(tasks));
            }
            _ => {}
        }
    }
    Ok(object)
}

fn task_to_value(task: &Task) -> FormatResult<Value> {
    let object = task_codec().encode(task.type_tag(), task_fields(task)?)?;
    Ok(Value::Object(object))
}

fn task_fields(task: &Task) -> FormatResult<Object> {
    let mut object = Object::new();
    for field in projection::TASK_FIELDS {
        match field.key {
            // The discriminator is written by the tagged codec.
            keys::TASK_TYPE => {}
            keys::NAME => {
                object.insert(field.key.to_string(), Value::String(task.name.clone()));
            }
            keys::TASK_FILES => {
                object.insert(field.key.to_string(), task_files_to_value(&task.task_files));
            }
            keys::TEST_FILES => {
                let tests = task
                    .test_files
                    .iter()
                    .map(|(path, text)| (path.clone(), Value::String(text.clone())))
                    .collect();
                object.insert(field.key.to_string(), Value::Object(tests));
            }
            keys::DESCRIPTION_TEXT => {
                object.insert(
                    field.key.to_string(),
                    Value::String(task.description_text.clone()),
                );
            }
            keys::DESCRIPTION_FORMAT => {
                object.insert(
                    field.key.to_string(),
                    Value::String(task.description_format.to_string()),
                );
            }
            keys::ADDITIONAL_FILES => {
                let extras = task
                    .additional_files
                    .iter()
                    .map(|(path, file)| {
                        (path.clone(), Value::Object(additional_file_to_object(file)))
                    })
                    .collect();
                object.insert(field.key.to_string(), Value::Object(extras));
            }
            _ => {}
        }
    }
    if let TaskData::Choice {
        variants,
        multiple_choice,
        selected,
    } = &task.data
    {
        for field in projection::CHOICE_FIELDS {
            match field.key {
                keys::CHOICE_VARIANTS => {
                    let variants = variants.iter().cloned().map(Value::String).collect();
                    object.insert(field.key.to_string(), Value::Array(variants));
                }
                keys::IS_MULTICHOICE => {
                    object.insert(field.key.to_string(), Value::Bool(*multiple_choice));
                }
                keys::SELECTED_VARIANTS => {
                    let selected = selected.iter().map(|index| Value::from(*index as u64));
                    object.insert(field.key.to_string(), Value::Array(selected.collect()));
                }
                _ => {}
            }
        }
    }
    Ok(object)
}

fn value_to_course(value: &Value) -> FormatResult<Course> {
    let object = as_object(value)?;
    check_version(object)?;
    for key in object.keys() {
        if !projection::COURSE_FIELDS.iter().any(|field| field.key == key) {
            tracing::debug!("ignoring unknown key `{key}` in course payload");
        }
    }
    let codec = item_codec();
    let items = seq_field(object, keys::ITEMS)?
        .iter()
        .map(|item| as_object(item).and_then(|object| codec.decode(object)))
        .collect::<FormatResult<Vec<_>>>()?;
    Ok(Course {
        title: str_field(object, keys::TITLE)?,
        summary: str_field(object, keys::SUMMARY)?,
        // Stored verbatim; the display transform is not inverted here.
        programming_language: str_field(object, keys::PROGRAMMING_LANGUAGE)?,
        language_code: str_field(object, keys::LANGUAGE)?,
        items,
    })
}

fn check_version(object: &Object) -> FormatResult<()> {
    let version = match object.get(keys::VERSION) {
        // The stamp is written on every encode; a hand-edited file without
        // one is read as the current version.
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Number(number)) => number.as_u64().ok_or_else(|| {
            FormatError::MalformedPayload("field `version` is not an unsigned integer".to_string())
        })?,
        Some(_) => {
            return Err(FormatError::MalformedPayload(
                "field `version` is not an unsigned integer".to_string(),
            ))
        }
    };
    if version > LOCAL_FORMAT_VERSION {
        return Err(FormatError::MalformedPayload(format!(
            "unsupported format version {version} (newest supported is {LOCAL_FORMAT_VERSION})"
        )));
    }
    Ok(())
}

fn item_codec() -> TaggedCodec<StudyItem> {
    TaggedCodec::new(keys::TYPE)
        .register(tags::LESSON, decode_plain_lesson)
        .register(tags::FRAMEWORK, decode_framework_lesson)
        .register(tags::SECTION, decode_section)
}

fn decode_plain_lesson(object: &Object) -> FormatResult<StudyItem> {
    lesson_from_object(object, LessonKind::Plain).map(StudyItem::Lesson)
}

fn decode_framework_lesson(object: &Object) -> FormatResult<StudyItem> {
    lesson_from_object(object, LessonKind::Framework).map(StudyItem::Lesson)
}

fn decode_section(object: &Object) -> FormatResult<StudyItem> {
    section_from_object(object).map(StudyItem::Section)
}

fn section_from_object(object: &Object) -> FormatResult<Section> {
    let codec = item_codec();
    let mut lessons = Vec::new();
    for item in seq_field(object, keys::ITEMS)? {
        match codec.decode(as_object(item)?)? {
            StudyItem::Lesson(lesson) => lessons.push(lesson),
            StudyItem::Section(section) => {
                return Err(FormatError::MalformedPayload(format!(
                    "section `{}` cannot contain another section",
                    section.title
                )));
            }
        }
    }
    Ok(Section {
        title: str_field(object, keys::TITLE)?,
        lessons,
    })
}

fn lesson_from_object(object: &Object, kind: LessonKind) -> FormatResult<Lesson> {
    let codec = task_codec();
    let tasks = seq_field(object, keys::TASK_LIST)?
        .iter()
        .map(|task| as_object(task).and_then(|object| codec.decode(object)))
        .collect::<FormatResult<Vec<_>>>()?;
    Ok(Lesson {
        kind,
        title: str_field(object, keys::TITLE)?,
        tasks,
    })
}

fn task_codec() -> TaggedCodec<Task> {
    TaggedCodec::new(keys::TASK_TYPE)
        .register(tags::EDU, |object| task_from_object(object, TaskData::Edu))
        .register(tags::OUTPUT, |object| {
            task_from_object(object, TaskData::Output)
        })
        .register(tags::THEORY, |object| {
            task_from_object(object, TaskData::Theory)
        })
        .register(tags::CHOICE, decode_choice_task)
}

fn decode_choice_task(object: &Object) -> FormatResult<Task> {
    let data = TaskData::Choice {
        variants: str_list_field(object, keys::CHOICE_VARIANTS)?,
        multiple_choice: bool_field(object, keys::IS_MULTICHOICE)?,
        selected: index_list_field(object, keys::SELECTED_VARIANTS)?,
    };
    task_from_object(object, data)
}

fn task_from_object(object: &Object, data: TaskData) -> FormatResult<Task> {
    let test_files = match object_field(object, keys::TEST_FILES)? {
        None => BTreeMap::new(),
        Some(entries) => entries
            .iter()
            .map(|(path, text)| {
                text.as_str()
                    .map(|text| (path.clone(), text.to_string()))
                    .ok_or_else(|| {
                        FormatError::MalformedPayload(format!("test file `{path}` is not text"))
                    })
            })
            .collect::<FormatResult<BTreeMap<_, _>>>()?,
    };
    let additional_files = match object_field(object, keys::ADDITIONAL_FILES)? {
        None => BTreeMap::new(),
        Some(entries) => entries
            .iter()
            .map(|(path, file)| {
                file.as_object()
                    .ok_or_else(|| {
                        FormatError::MalformedPayload(format!(
                            "additional file `{path}` is not an object"
                        ))
                    })
                    .and_then(additional_file_from_object)
                    .map(|file| (path.clone(), file))
            })
            .collect::<FormatResult<BTreeMap<_, _>>>()?,
    };
    Ok(Task {
        name: str_field(object, keys::NAME)?,
        task_files: task_files_from_object(object, keys::TASK_FILES)?,
        test_files,
        description_text: str_field(object, keys::DESCRIPTION_TEXT)?,
        description_format: description_format_field(object)?,
        additional_files,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use edu_model::{AdditionalFile, AnswerPlaceholder, DescriptionFormat};

    fn sample_task() -> Task {
        let mut task = Task {
            name: "Sum of two".to_string(),
            description_text: "Add the numbers.".to_string(),
            description_format: DescriptionFormat::Md,
            data: TaskData::Edu,
            ..Task::default()
        };
        task.task_files.insert(
            "src/main.rs".to_string(),
            TaskFile {
                name: "src/main.rs".to_string(),
                text: "fn main() { /* answer */ }".to_string(),
                placeholders: vec![AnswerPlaceholder {
                    offset: 12,
                    length: 12,
                    placeholder_text: "todo".to_string(),
                }],
            },
        );
        task.test_files.insert(
            "tests/sum.rs".to_string(),
            "#[test] fn sum() {}".to_string(),
        );
        task.additional_files.insert(
            "data/input.txt".to_string(),
            AdditionalFile {
                name: "data/input.txt".to_string(),
                text: "1 2".to_string(),
            },
        );
        task
    }

    fn sample_course() -> Course {
        Course {
            title: "Rust Basics".to_string(),
            summary: "An introduction.".to_string(),
            programming_language: "Rust".to_string(),
            language_code: "en".to_string(),
            items: vec![
                StudyItem::Section(Section {
                    title: "Getting started".to_string(),
                    lessons: vec![Lesson {
                        kind: LessonKind::Plain,
                        title: "Hello".to_string(),
                        tasks: vec![sample_task()],
                    }],
                }),
                StudyItem::Lesson(Lesson {
                    kind: LessonKind::Framework,
                    title: "Project".to_string(),
                    tasks: vec![Task {
                        name: "Quiz".to_string(),
                        data: TaskData::Choice {
                            variants: vec!["yes".to_string(), "no".to_string()],
                            multiple_choice: false,
                            selected: vec![1],
                        },
                        ..Task::default()
                    }],
                }),
            ],
        }
    }

    #[test]
    fn course_round_trips_through_the_local_format() {
        let course = sample_course();
        let yaml = write_course_yaml(&course, &DisplayLookup::identity()).expect("write");
        let decoded = read_course_yaml(&yaml).expect("read");
        assert_eq!(decoded, course);
    }

    #[test]
    fn course_fields_are_emitted_in_projection_order() {
        let yaml = write_course_yaml(&sample_course(), &DisplayLookup::identity()).expect("write");
        assert!(
            yaml.starts_with("version: 8\ntitle: Rust Basics\nsummary: An introduction.\n"),
            "unexpected prefix in:\n{yaml}"
        );
    }

    #[test]
    fn item_order_and_kinds_survive_decode() {
        let yaml = "\
title: Mixed
items:
- type: section
  title: A
  items: []
- type: lesson
  title: B
  task_list: []
- type: section
  title: C
  items: []
";
        let course = read_course_yaml(yaml).expect("read");
        let kinds: Vec<&str> = course
            .items
            .iter()
            .map(|item| match item {
                StudyItem::Section(section) => section.title.as_str(),
                StudyItem::Lesson(lesson) => lesson.title.as_str(),
            })
            .collect();
        assert_eq!(kinds, ["A", "B", "C"]);
        assert!(matches!(course.items[0], StudyItem::Section(_)));
        assert!(matches!(course.items[1], StudyItem::Lesson(_)));
        assert!(matches!(course.items[2], StudyItem::Section(_)));
    }

    #[test]
    fn framework_lessons_carry_their_own_tag() {
        let lesson = Lesson {
            kind: LessonKind::Framework,
            title: "Project".to_string(),
            tasks: vec![],
        };
        let yaml = write_lesson_yaml(&lesson).expect("write");
        assert!(yaml.starts_with("type: framework\n"), "got:\n{yaml}");

        let decoded = read_lesson_yaml(&yaml).expect("read");
        assert_eq!(decoded.kind, LessonKind::Framework);

        let plain = write_lesson_yaml(&Lesson::default()).expect("write");
        assert!(plain.starts_with("type: lesson\n"), "got:\n{plain}");
    }

    #[test]
    fn unregistered_lesson_tag_fails_with_its_value() {
        let yaml = "type: quiz\ntitle: L\n";
        let err = read_lesson_yaml(yaml).unwrap_err();
        assert!(matches!(err, FormatError::UnknownVariant(tag) if tag == "quiz"));
    }

    #[test]
    fn task_without_a_type_tag_fails_with_missing_discriminator() {
        let yaml = "name: Orphan\n";
        let err = read_task_yaml(yaml).unwrap_err();
        assert!(matches!(err, FormatError::MissingDiscriminator));
    }

    #[test]
    fn newer_schema_versions_are_rejected_and_older_accepted() {
        let newer = format!("version: {}\ntitle: C\n", LOCAL_FORMAT_VERSION + 1);
        let err = read_course_yaml(&newer).unwrap_err();
        assert!(matches!(err, FormatError::MalformedPayload(_)));

        let older = read_course_yaml("version: 3\ntitle: C\n").expect("read");
        assert_eq!(older.title, "C");

        let unstamped = read_course_yaml("title: C\n").expect("read");
        assert_eq!(unstamped.title, "C");
    }

    #[test]
    fn display_transforms_run_on_encode_and_are_not_inverted() {
        let language = |id: &str| (id == "Rust").then(|| "Rust (stable)".to_string());
        let locale = |code: &str| (code == "en").then(|| "English".to_string());
        let lookup = DisplayLookup::new(&language, &locale);

        let yaml = write_course_yaml(&sample_course(), &lookup).expect("write");
        assert!(yaml.contains("programming_language: Rust (stable)"));
        assert!(yaml.contains("language: English"));

        let decoded = read_course_yaml(&yaml).expect("read");
        assert_eq!(decoded.programming_language, "Rust (stable)");
        assert_eq!(decoded.language_code, "English");
    }

    #[test]
    fn absent_optional_fields_take_their_defaults() {
        let course = read_course_yaml("title: Bare\n").expect("read");
        assert_eq!(course.title, "Bare");
        assert_eq!(course.summary, "");
        assert_eq!(course.programming_language, "");
        assert!(course.items.is_empty());

        let task = read_task_yaml("task_type: edu\n").expect("read");
        assert_eq!(task.name, "");
        assert!(task.task_files.is_empty());
        assert_eq!(task.description_format, DescriptionFormat::Html);
    }

    #[test]
    fn bad_description_format_is_malformed() {
        let err = read_task_yaml("task_type: edu\ndescription_format: docx\n").unwrap_err();
        assert!(matches!(err, FormatError::MalformedPayload(_)));
    }

    #[test]
    fn choice_state_round_trips_locally() {
        let yaml = "\
task_type: choice
name: Quiz
choice_variants:
- yes please
- no thanks
is_multichoice: true
selected_variants:
- 0
- 1
";
        let task = read_task_yaml(yaml).expect("read");
        match &task.data {
            TaskData::Choice {
                variants,
                multiple_choice,
                selected,
            } => {
                assert_eq!(variants, &["yes please", "no thanks"]);
                assert!(*multiple_choice);
                assert_eq!(selected, &[0, 1]);
            }
            other => panic!("expected a choice task, got {other:?}"),
        }

        let rewritten = write_task_yaml(&task).expect("write");
        let reread = read_task_yaml(&rewritten).expect("reread");
        assert_eq!(reread, task);
    }

    #[test]
    fn task_file_placeholders_are_sorted_after_decode() {
        let yaml = "\
name: main.rs
text: fn main() {}
placeholders:
- offset: 20
  length: 2
  placeholder_text: second
- offset: 3
  length: 1
  placeholder_text: first
";
        let file = read_task_file_yaml(yaml).expect("read");
        let offsets: Vec<usize> = file.placeholders.iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![3, 20]);
    }

    #[test]
    fn sections_reject_nested_sections() {
        let yaml = "\
title: S
items:
- type: section
  title: inner
  items: []
";
        let err = read_section_yaml(yaml).unwrap_err();
        assert!(matches!(err, FormatError::MalformedPayload(_)));
    }
}
