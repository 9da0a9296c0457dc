//! Remote platform wire-format codec.
//!
//! The remote format is the JSON representation exchanged with the course
//! hosting platform. It is a fully independent codepath from the local
//! codec: lower_snake_case wire keys, an explicit date format, no schema
//! stamp and no display transforms. Platform metadata (ids, flags, related
//! id lists, update dates) is spliced into the same object as the model
//! fields at every tree level on encode, and split back out into the
//! [`RemoteInfoTable`] on decode.
//!
//! Decode is two-pass at each level: the model is decoded first, ignoring
//! metadata keys, then the same raw object is read again to build the
//! matching [`RemoteInfo`] variant with zero/false/empty defaults for
//! absent keys. An absent `update_date` is never written as null and reads
//! back as "no date recorded", which the info types surface as the epoch.

use chrono::{DateTime, Utc};
use serde_json::Value;

use edu_model::{
    Course, CourseRemoteInfo, EntityKey, EntityKind, Lesson, LessonKind, LessonRemoteInfo,
    RemoteInfo, RemoteInfoTable, Section, SectionRemoteInfo, StudyItem, Task, TaskData,
    TaskRemoteInfo,
};

use crate::fields::{description_format_field, lesson_tag, task_files_from_object, task_files_to_value};
use crate::poly::TaggedCodec;
use crate::projection::{keys, tags};
use crate::value::{
    as_object, bool_field, from_json_text, i64_field, id_list_field, index_list_field, seq_field,
    str_field, str_list_field, to_json_text, Object,
};
use crate::{FormatError, FormatResult};

/// Wire date format required by the platform.
pub const REMOTE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Platform metadata keys.
mod meta {
    pub const ID: &str = "id";
    pub const IS_PUBLIC: &str = "is_public";
    pub const IS_ADAPTIVE: &str = "is_adaptive";
    pub const IS_IDEA_COMPATIBLE: &str = "is_idea_compatible";
    pub const SECTIONS: &str = "sections";
    pub const INSTRUCTORS: &str = "instructors";
    pub const UPDATE_DATE: &str = "update_date";
    pub const COURSE: &str = "course";
    pub const POSITION: &str = "position";
    pub const UNITS: &str = "units";
    pub const UNIT_ID: &str = "unit_id";
    pub const STEPS: &str = "steps";
    pub const STEP_ID: &str = "step_id";
}

/// Writes a course subtree plus its platform metadata as wire text.
///
/// Entities without a side-table entry are encoded with the zero/false/empty
/// defaults, so the payload is always fully populated.
///
/// # Errors
///
/// Returns [`FormatError::UnknownVariant`] if the tree contains a node kind
/// with no registered discriminator.
pub fn write_course_json(course: &Course, table: &RemoteInfoTable) -> FormatResult<String> {
    to_json_text(&course_to_value(course, table)?)
}

/// Reads a course subtree plus its platform metadata from wire text.
///
/// Every decoded entity gets a side-table entry; keys the payload does not
/// carry take their defaults.
///
/// # Errors
///
/// Returns [`FormatError::MalformedPayload`] when the payload is not a
/// well-formed object or a date does not parse against
/// [`REMOTE_DATE_FORMAT`]; discriminator failures surface as
/// [`FormatError::MissingDiscriminator`] / [`FormatError::UnknownVariant`].
pub fn read_course_json(text: &str) -> FormatResult<(Course, RemoteInfoTable)> {
    let value = from_json_text(text)?;
    let object = as_object(&value)?;
    let course = value_to_course(object)?;
    let mut table = RemoteInfoTable::new();
    extract_course_info(object, &course, &mut table)?;
    Ok((course, table))
}

fn format_remote_date(date: DateTime<Utc>) -> String {
    date.format(REMOTE_DATE_FORMAT).to_string()
}

fn parse_remote_date(text: &str) -> FormatResult<DateTime<Utc>> {
    DateTime::parse_from_str(text, REMOTE_DATE_FORMAT)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|err| FormatError::MalformedPayload(format!("cannot parse date `{text}`: {err}")))
}

fn date_field(object: &Object, key: &str) -> FormatResult<Option<DateTime<Utc>>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => parse_remote_date(text).map(Some),
        Some(_) => Err(FormatError::MalformedPayload(format!(
            "field `{key}` is not a date string"
        ))),
    }
}

fn id_list_value(ids: &[i64]) -> Value {
    Value::Array(ids.iter().map(|id| Value::from(*id)).collect())
}

fn course_to_value(course: &Course, table: &RemoteInfoTable) -> FormatResult<Value> {
    let key = EntityKey::course();
    let mut object = Object::new();
    object.insert(keys::TITLE.to_string(), Value::String(course.title.clone()));
    object.insert(
        keys::SUMMARY.to_string(),
        Value::String(course.summary.clone()),
    );
    object.insert(
        keys::PROGRAMMING_LANGUAGE.to_string(),
        Value::String(course.programming_language.clone()),
    );
    object.insert(
        keys::LANGUAGE.to_string(),
        Value::String(course.language_code.clone()),
    );
    let items = course
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| study_item_to_value(item, &key, index, table))
        .collect::<FormatResult<Vec<_>>>()?;
    object.insert(keys::ITEMS.to_string(), Value::Array(items));

    let info = match table.lookup(&key) {
        Some(RemoteInfo::Course(info)) => info.clone(),
        _ => CourseRemoteInfo::default(),
    };
    object.insert(meta::IS_PUBLIC.to_string(), Value::Bool(info.is_public));
    object.insert(meta::IS_ADAPTIVE.to_string(), Value::Bool(info.is_adaptive));
    object.insert(
        meta::IS_IDEA_COMPATIBLE.to_string(),
        Value::Bool(info.is_idea_compatible),
    );
    object.insert(meta::ID.to_string(), Value::from(info.id));
    object.insert(meta::SECTIONS.to_string(), id_list_value(&info.section_ids));
    object.insert(
        meta::INSTRUCTORS.to_string(),
        id_list_value(&info.instructor_ids),
    );
    if let Some(date) = info.update_date {
        object.insert(
            meta::UPDATE_DATE.to_string(),
            Value::String(format_remote_date(date)),
        );
    }
    Ok(Value::Object(object))
}

fn study_item_to_value(
    item: &StudyItem,
    parent: &EntityKey,
    index: usize,
    table: &RemoteInfoTable,
) -> FormatResult<Value> {
    let codec = item_codec();
    let object = match item {
        StudyItem::Section(section) => {
            let key = parent.child(EntityKind::Section, index);
            codec.encode(tags::SECTION, section_fields(section, &key, table)?)?
        }
        StudyItem::Lesson(lesson) => {
            let key = parent.child(EntityKind::Lesson, index);
            codec.encode(lesson_tag(lesson.kind), lesson_fields(lesson, &key, table)?)?
        }
    };
    Ok(Value::Object(object))
}

fn section_fields(
    section: &Section,
    key: &EntityKey,
    table: &RemoteInfoTable,
) -> FormatResult<Object> {
    let codec = item_codec();
    let mut object = Object::new();
    object.insert(
        keys::TITLE.to_string(),
        Value::String(section.title.clone()),
    );
    let lessons = section
        .lessons
        .iter()
        .enumerate()
        .map(|(index, lesson)| {
            let lesson_key = key.child(EntityKind::Lesson, index);
            let fields = lesson_fields(lesson, &lesson_key, table)?;
            Ok(Value::Object(
                codec.encode(lesson_tag(lesson.kind), fields)?,
            ))
        })
        .collect::<FormatResult<Vec<_>>>()?;
    object.insert(keys::ITEMS.to_string(), Value::Array(lessons));

    let info = match table.lookup(key) {
        Some(RemoteInfo::Section(info)) => info.clone(),
        _ => SectionRemoteInfo::default(),
    };
    object.insert(meta::ID.to_string(), Value::from(info.id));
    object.insert(meta::COURSE.to_string(), Value::from(info.course_id));
    object.insert(meta::POSITION.to_string(), Value::from(info.position));
    object.insert(meta::UNITS.to_string(), id_list_value(&info.unit_ids));
    if let Some(date) = info.update_date {
        object.insert(
            meta::UPDATE_DATE.to_string(),
            Value::String(format_remote_date(date)),
        );
    }
    Ok(object)
}

fn lesson_fields(
    lesson: &Lesson,
    key: &EntityKey,
    table: &RemoteInfoTable,
) -> FormatResult<Object> {
    let mut object = Object::new();
    object.insert(keys::TITLE.to_string(), Value::String(lesson.title.clone()));
    let tasks = lesson
        .tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let task_key = key.child(EntityKind::Task, index);
            task_to_value(task, &task_key, table)
        })
        .collect::<FormatResult<Vec<_>>>()?;
    object.insert(keys::TASK_LIST.to_string(), Value::Array(tasks));

    let info = match table.lookup(key) {
        Some(RemoteInfo::Lesson(info)) => info.clone(),
        _ => LessonRemoteInfo::default(),
    };
    object.insert(meta::ID.to_string(), Value::from(info.id));
    object.insert(meta::UNIT_ID.to_string(), Value::from(info.unit_id));
    object.insert(meta::IS_PUBLIC.to_string(), Value::Bool(info.is_public));
    object.insert(meta::STEPS.to_string(), id_list_value(&info.step_ids));
    if let Some(date) = info.update_date {
        object.insert(
            meta::UPDATE_DATE.to_string(),
            Value::String(format_remote_date(date)),
        );
    }
    Ok(object)
}

fn task_to_value(task: &Task, key: &EntityKey, table: &RemoteInfoTable) -> FormatResult<Value> {
    let mut fields = Object::new();
    fields.insert(keys::NAME.to_string(), Value::String(task.name.clone()));
    fields.insert(
        keys::DESCRIPTION_TEXT.to_string(),
        Value::String(task.description_text.clone()),
    );
    fields.insert(
        keys::DESCRIPTION_FORMAT.to_string(),
        Value::String(task.description_format.to_string()),
    );
    fields.insert(
        keys::TASK_FILES.to_string(),
        task_files_to_value(&task.task_files),
    );
    // Author-local state and step-option content (test and additional
    // files) are not exposed on the wire.
    if let TaskData::Choice {
        variants,
        multiple_choice,
        ..
    } = &task.data
    {
        let variants = variants.iter().cloned().map(Value::String).collect();
        fields.insert(keys::CHOICE_VARIANTS.to_string(), Value::Array(variants));
        fields.insert(keys::IS_MULTICHOICE.to_string(), Value::Bool(*multiple_choice));
    }

    let info = match table.lookup(key) {
        Some(RemoteInfo::Task(info)) => info.clone(),
        _ => TaskRemoteInfo::default(),
    };
    fields.insert(meta::STEP_ID.to_string(), Value::from(info.step_id));
    if let Some(date) = info.update_date {
        fields.insert(
            meta::UPDATE_DATE.to_string(),
            Value::String(format_remote_date(date)),
        );
    }

    let object = task_codec().encode(task.type_tag(), fields)?;
    Ok(Value::Object(object))
}

fn value_to_course(object: &Object) -> FormatResult<Course> {
    let codec = item_codec();
    let items = seq_field(object, keys::ITEMS)?
        .iter()
        .map(|item| as_object(item).and_then(|object| codec.decode(object)))
        .collect::<FormatResult<Vec<_>>>()?;
    Ok(Course {
        title: str_field(object, keys::TITLE)?,
        summary: str_field(object, keys::SUMMARY)?,
        programming_language: str_field(object, keys::PROGRAMMING_LANGUAGE)?,
        language_code: str_field(object, keys::LANGUAGE)?,
        items,
    })
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
    Ok(StudyItem::Section(Section {
        title: str_field(object, keys::TITLE)?,
        lessons,
    }))
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
    // `selected_variants` is never written by this codec, but a payload
    // carrying it is still honoured.
    let data = TaskData::Choice {
        variants: str_list_field(object, keys::CHOICE_VARIANTS)?,
        multiple_choice: bool_field(object, keys::IS_MULTICHOICE)?,
        selected: index_list_field(object, keys::SELECTED_VARIANTS)?,
    };
    task_from_object(object, data)
}

fn task_from_object(object: &Object, data: TaskData) -> FormatResult<Task> {
    Ok(Task {
        name: str_field(object, keys::NAME)?,
        task_files: task_files_from_object(object, keys::TASK_FILES)?,
        test_files: Default::default(),
        description_text: str_field(object, keys::DESCRIPTION_TEXT)?,
        description_format: description_format_field(object)?,
        additional_files: Default::default(),
        data,
    })
}

fn extract_course_info(
    object: &Object,
    course: &Course,
    table: &mut RemoteInfoTable,
) -> FormatResult<()> {
    let key = EntityKey::course();
    let info = CourseRemoteInfo {
        id: i64_field(object, meta::ID)?,
        is_public: bool_field(object, meta::IS_PUBLIC)?,
        is_adaptive: bool_field(object, meta::IS_ADAPTIVE)?,
        is_idea_compatible: bool_field(object, meta::IS_IDEA_COMPATIBLE)?,
        section_ids: id_list_field(object, meta::SECTIONS)?,
        instructor_ids: id_list_field(object, meta::INSTRUCTORS)?,
        update_date: date_field(object, meta::UPDATE_DATE)?,
    };
    table.attach(key.clone(), RemoteInfo::Course(info));

    let raw_items = seq_field(object, keys::ITEMS)?;
    for (index, (raw, item)) in raw_items.iter().zip(&course.items).enumerate() {
        let raw = as_object(raw)?;
        match item {
            StudyItem::Section(section) => {
                extract_section_info(raw, section, key.child(EntityKind::Section, index), table)?;
            }
            StudyItem::Lesson(lesson) => {
                extract_lesson_info(raw, lesson, key.child(EntityKind::Lesson, index), table)?;
            }
        }
    }
    Ok(())
}

fn extract_section_info(
    object: &Object,
    section: &Section,
    key: EntityKey,
    table: &mut RemoteInfoTable,
) -> FormatResult<()> {
    let info = SectionRemoteInfo {
        id: i64_field(object, meta::ID)?,
        course_id: i64_field(object, meta::COURSE)?,
        position: i64_field(object, meta::POSITION)?,
        unit_ids: id_list_field(object, meta::UNITS)?,
        update_date: date_field(object, meta::UPDATE_DATE)?,
    };

    let raw_lessons = seq_field(object, keys::ITEMS)?;
    for (index, (raw, lesson)) in raw_lessons.iter().zip(&section.lessons).enumerate() {
        let raw = as_object(raw)?;
        extract_lesson_info(raw, lesson, key.child(EntityKind::Lesson, index), table)?;
    }

    table.attach(key, RemoteInfo::Section(info));
    Ok(())
}

fn extract_lesson_info(
    object: &Object,
    lesson: &Lesson,
    key: EntityKey,
    table: &mut RemoteInfoTable,
) -> FormatResult<()> {
    let info = LessonRemoteInfo {
        id: i64_field(object, meta::ID)?,
        unit_id: i64_field(object, meta::UNIT_ID)?,
        is_public: bool_field(object, meta::IS_PUBLIC)?,
        step_ids: id_list_field(object, meta::STEPS)?,
        update_date: date_field(object, meta::UPDATE_DATE)?,
    };

    let raw_tasks = seq_field(object, keys::TASK_LIST)?;
    for (index, (raw, _task)) in raw_tasks.iter().zip(&lesson.tasks).enumerate() {
        let raw = as_object(raw)?;
        let info = TaskRemoteInfo {
            step_id: i64_field(raw, meta::STEP_ID)?,
            update_date: date_field(raw, meta::UPDATE_DATE)?,
        };
        table.attach(key.child(EntityKind::Task, index), RemoteInfo::Task(info));
    }

    table.attach(key, RemoteInfo::Lesson(info));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local;
    use crate::projection::DisplayLookup;
    use chrono::TimeZone;
    use edu_model::{AnswerPlaceholder, TaskFile};

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
                        tasks: vec![Task {
                            name: "Sum".to_string(),
                            data: TaskData::Edu,
                            ..Task::default()
                        }],
                    }],
                }),
                StudyItem::Lesson(Lesson {
                    kind: LessonKind::Framework,
                    title: "Project".to_string(),
                    tasks: vec![],
                }),
            ],
        }
    }

    fn populated_table() -> RemoteInfoTable {
        let mut table = RemoteInfoTable::new();
        let course_key = EntityKey::course();
        table.attach(
            course_key.clone(),
            RemoteInfo::Course(CourseRemoteInfo {
                id: 101,
                is_public: true,
                is_adaptive: false,
                is_idea_compatible: true,
                section_ids: vec![7, 8],
                instructor_ids: vec![42],
                update_date: Some(Utc.with_ymd_and_hms(2018, 3, 1, 12, 30, 0).unwrap()),
            }),
        );
        let section_key = course_key.child(EntityKind::Section, 0);
        table.attach(
            section_key.clone(),
            RemoteInfo::Section(SectionRemoteInfo {
                id: 7,
                course_id: 101,
                position: 1,
                unit_ids: vec![70],
                update_date: None,
            }),
        );
        let lesson_key = section_key.child(EntityKind::Lesson, 0);
        table.attach(
            lesson_key.clone(),
            RemoteInfo::Lesson(LessonRemoteInfo {
                id: 70,
                unit_id: 700,
                is_public: true,
                step_ids: vec![9000],
                update_date: None,
            }),
        );
        table.attach(
            lesson_key.child(EntityKind::Task, 0),
            RemoteInfo::Task(TaskRemoteInfo {
                step_id: 9000,
                update_date: None,
            }),
        );
        table
    }

    #[test]
    fn unsynchronised_entities_encode_with_defaults() {
        let json = write_course_json(&sample_course(), &RemoteInfoTable::new()).expect("write");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");

        assert_eq!(value["id"], 0);
        assert_eq!(value["is_public"], false);
        assert_eq!(value["is_adaptive"], false);
        assert_eq!(value["sections"], serde_json::json!([]));
        assert_eq!(value["instructors"], serde_json::json!([]));
        assert!(
            value.get("update_date").is_none(),
            "an absent date must be omitted, not null"
        );
    }

    #[test]
    fn attached_metadata_is_spliced_at_every_level() {
        let json = write_course_json(&sample_course(), &populated_table()).expect("write");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");

        assert_eq!(value["id"], 101);
        assert_eq!(value["is_public"], true);
        assert_eq!(value["sections"], serde_json::json!([7, 8]));
        assert_eq!(value["update_date"], "2018-03-01T12:30:00+0000");

        let section = &value["items"][0];
        assert_eq!(section["type"], "section");
        assert_eq!(section["id"], 7);
        assert_eq!(section["course"], 101);
        assert_eq!(section["position"], 1);
        assert_eq!(section["units"], serde_json::json!([70]));

        let lesson = &section["items"][0];
        assert_eq!(lesson["id"], 70);
        assert_eq!(lesson["unit_id"], 700);
        assert_eq!(lesson["steps"], serde_json::json!([9000]));

        let task = &lesson["task_list"][0];
        assert_eq!(task["task_type"], "edu");
        assert_eq!(task["step_id"], 9000);
    }

    #[test]
    fn decode_rebuilds_the_model_and_the_side_table() {
        let course = sample_course();
        let json = write_course_json(&course, &populated_table()).expect("write");
        let (decoded, table) = read_course_json(&json).expect("read");

        assert_eq!(decoded, course);

        let course_key = EntityKey::course();
        match table.lookup(&course_key) {
            Some(RemoteInfo::Course(info)) => {
                assert_eq!(info.id, 101);
                assert_eq!(info.section_ids, vec![7, 8]);
                assert_eq!(
                    info.update_date,
                    Some(Utc.with_ymd_and_hms(2018, 3, 1, 12, 30, 0).unwrap())
                );
            }
            other => panic!("expected course info, got {other:?}"),
        }

        let task_key = course_key
            .child(EntityKind::Section, 0)
            .child(EntityKind::Lesson, 0)
            .child(EntityKind::Task, 0);
        match table.lookup(&task_key) {
            Some(RemoteInfo::Task(info)) => assert_eq!(info.step_id, 9000),
            other => panic!("expected task info, got {other:?}"),
        }
    }

    #[test]
    fn absent_metadata_decodes_to_defaults_with_epoch_dates() {
        let json = r#"{"title": "Bare", "items": []}"#;
        let (course, table) = read_course_json(json).expect("read");
        assert_eq!(course.title, "Bare");

        match table.lookup(&EntityKey::course()) {
            Some(RemoteInfo::Course(info)) => {
                assert_eq!(info.id, 0);
                assert!(!info.is_public);
                assert!(info.section_ids.is_empty());
                assert_eq!(info.update_date, None);
                assert_eq!(info.update_date_or_epoch(), DateTime::UNIX_EPOCH);
            }
            other => panic!("expected course info, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_dates_are_malformed() {
        let json = r#"{"title": "C", "update_date": "March 1st"}"#;
        let err = read_course_json(json).unwrap_err();
        assert!(matches!(err, FormatError::MalformedPayload(_)));
    }

    #[test]
    fn non_object_payloads_are_malformed() {
        let err = read_course_json("42").unwrap_err();
        assert!(matches!(err, FormatError::MalformedPayload(_)));
    }

    #[test]
    fn author_local_task_state_stays_off_the_wire() {
        let mut task = Task {
            name: "Quiz".to_string(),
            data: TaskData::Choice {
                variants: vec!["a".to_string(), "b".to_string()],
                multiple_choice: true,
                selected: vec![1],
            },
            ..Task::default()
        };
        task.test_files
            .insert("tests/t.rs".to_string(), "#[test]".to_string());
        let course = Course {
            items: vec![StudyItem::Lesson(Lesson {
                tasks: vec![task],
                ..Lesson::default()
            })],
            ..Course::default()
        };

        let json = write_course_json(&course, &RemoteInfoTable::new()).expect("write");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        let wire_task = &value["items"][0]["task_list"][0];

        assert_eq!(wire_task["choice_variants"], serde_json::json!(["a", "b"]));
        assert_eq!(wire_task["is_multichoice"], true);
        assert!(wire_task.get("selected_variants").is_none());
        assert!(wire_task.get("test_files").is_none());
        assert!(wire_task.get("additional_files").is_none());
    }

    #[test]
    fn selected_variants_are_still_honoured_on_decode() {
        let json = r#"{
            "title": "C",
            "items": [{
                "type": "lesson",
                "title": "L",
                "task_list": [{
                    "task_type": "choice",
                    "name": "Quiz",
                    "choice_variants": ["a", "b"],
                    "is_multichoice": false,
                    "selected_variants": [1]
                }]
            }]
        }"#;
        let (course, _) = read_course_json(json).expect("read");
        let StudyItem::Lesson(lesson) = &course.items[0] else {
            panic!("expected a lesson");
        };
        match &lesson.tasks[0].data {
            TaskData::Choice { selected, .. } => assert_eq!(selected, &[1]),
            other => panic!("expected a choice task, got {other:?}"),
        }
    }

    #[test]
    fn task_files_cross_the_wire_with_sorted_placeholders() {
        let json = r#"{
            "title": "C",
            "items": [{
                "type": "lesson",
                "title": "L",
                "task_list": [{
                    "task_type": "edu",
                    "name": "T",
                    "task_files": {
                        "main.rs": {
                            "name": "main.rs",
                            "text": "fn main() {}",
                            "placeholders": [
                                {"offset": 9, "length": 1, "placeholder_text": "late"},
                                {"offset": 1, "length": 1, "placeholder_text": "early"}
                            ]
                        }
                    }
                }]
            }]
        }"#;
        let (course, _) = read_course_json(json).expect("read");
        let StudyItem::Lesson(lesson) = &course.items[0] else {
            panic!("expected a lesson");
        };
        let file = &lesson.tasks[0].task_files["main.rs"];
        let offsets: Vec<usize> = file.placeholders.iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![1, 9]);
    }

    #[test]
    fn local_encoding_is_unaffected_by_attached_metadata() {
        let course = sample_course();
        let before = local::write_course_yaml(&course, &DisplayLookup::identity()).expect("write");

        let mut table = RemoteInfoTable::new();
        table.attach(
            EntityKey::course(),
            RemoteInfo::Course(CourseRemoteInfo {
                id: 999,
                ..CourseRemoteInfo::default()
            }),
        );
        let _ = write_course_json(&course, &table).expect("remote write");

        let after = local::write_course_yaml(&course, &DisplayLookup::identity()).expect("write");
        assert_eq!(before, after);
    }

    #[test]
    fn reencoding_a_decoded_payload_is_stable() {
        let json = write_course_json(&sample_course(), &populated_table()).expect("write");
        let (course, table) = read_course_json(&json).expect("read");
        let again = write_course_json(&course, &table).expect("rewrite");
        assert_eq!(json, again);
    }
}
