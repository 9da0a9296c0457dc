//! Nested payload shapes shared by both codecs.
//!
//! Task files, placeholders and additional files have the same external
//! shape in the local and remote formats, so the field-level readers and
//! writers live here, driven by the projection tables. Entity-level
//! structure stays inside each codec.

use std::collections::BTreeMap;

use serde_json::Value;

use edu_model::{AdditionalFile, AnswerPlaceholder, DescriptionFormat, LessonKind, TaskFile};

use crate::projection::{self, keys, tags, Field};
use crate::value::{object_field, require_usize, seq_field, str_field, Object};
use crate::{FormatError, FormatResult};

/// The discriminator a lesson-shaped node serialises under.
pub(crate) fn lesson_tag(kind: LessonKind) -> &'static str {
    match kind {
        LessonKind::Plain => tags::LESSON,
        LessonKind::Framework => tags::FRAMEWORK,
    }
}

pub(crate) fn task_file_to_object(file: &TaskFile) -> Object {
    let mut object = Object::new();
    for Field { key, .. } in projection::TASK_FILE_FIELDS {
        match *key {
            keys::NAME => {
                object.insert(keys::NAME.to_string(), Value::String(file.name.clone()));
            }
            keys::TEXT => {
                object.insert(keys::TEXT.to_string(), Value::String(file.text.clone()));
            }
            keys::PLACEHOLDERS => {
                let placeholders = file
                    .placeholders
                    .iter()
                    .map(placeholder_to_object)
                    .map(Value::Object)
                    .collect();
                object.insert(keys::PLACEHOLDERS.to_string(), Value::Array(placeholders));
            }
            _ => {}
        }
    }
    object
}

/// Decodes a task file, re-establishing placeholder order by offset.
pub(crate) fn task_file_from_object(object: &Object) -> FormatResult<TaskFile> {
    let mut file = TaskFile {
        name: str_field(object, keys::NAME)?,
        text: str_field(object, keys::TEXT)?,
        placeholders: seq_field(object, keys::PLACEHOLDERS)?
            .iter()
            .map(|placeholder| {
                placeholder
                    .as_object()
                    .ok_or_else(|| {
                        FormatError::MalformedPayload("placeholder is not an object".to_string())
                    })
                    .and_then(placeholder_from_object)
            })
            .collect::<FormatResult<Vec<_>>>()?,
    };
    file.sort_placeholders();
    Ok(file)
}

pub(crate) fn placeholder_to_object(placeholder: &AnswerPlaceholder) -> Object {
    let mut object = Object::new();
    for Field { key, .. } in projection::PLACEHOLDER_FIELDS {
        match *key {
            keys::OFFSET => {
                object.insert(
                    keys::OFFSET.to_string(),
                    Value::from(placeholder.offset as u64),
                );
            }
            keys::LENGTH => {
                object.insert(
                    keys::LENGTH.to_string(),
                    Value::from(placeholder.length as u64),
                );
            }
            keys::PLACEHOLDER_TEXT => {
                object.insert(
                    keys::PLACEHOLDER_TEXT.to_string(),
                    Value::String(placeholder.placeholder_text.clone()),
                );
            }
            _ => {}
        }
    }
    object
}

pub(crate) fn placeholder_from_object(object: &Object) -> FormatResult<AnswerPlaceholder> {
    Ok(AnswerPlaceholder {
        offset: require_usize(object, keys::OFFSET)?,
        length: require_usize(object, keys::LENGTH)?,
        placeholder_text: str_field(object, keys::PLACEHOLDER_TEXT)?,
    })
}

pub(crate) fn additional_file_to_object(file: &AdditionalFile) -> Object {
    let mut object = Object::new();
    object.insert(keys::NAME.to_string(), Value::String(file.name.clone()));
    object.insert(keys::TEXT.to_string(), Value::String(file.text.clone()));
    object
}

pub(crate) fn additional_file_from_object(object: &Object) -> FormatResult<AdditionalFile> {
    Ok(AdditionalFile {
        name: str_field(object, keys::NAME)?,
        text: str_field(object, keys::TEXT)?,
    })
}

pub(crate) fn task_files_to_value(files: &BTreeMap<String, TaskFile>) -> Value {
    let entries = files
        .iter()
        .map(|(path, file)| (path.clone(), Value::Object(task_file_to_object(file))))
        .collect();
    Value::Object(entries)
}

pub(crate) fn task_files_from_object(
    object: &Object,
    key: &str,
) -> FormatResult<BTreeMap<String, TaskFile>> {
    let Some(entries) = object_field(object, key)? else {
        return Ok(BTreeMap::new());
    };
    entries
        .iter()
        .map(|(path, entry)| {
            let file = entry
                .as_object()
                .ok_or_else(|| {
                    FormatError::MalformedPayload(format!("task file `{path}` is not an object"))
                })
                .and_then(task_file_from_object)?;
            Ok((path.clone(), file))
        })
        .collect()
}

/// Decodes the description-format tag, defaulting when absent.
pub(crate) fn description_format_field(object: &Object) -> FormatResult<DescriptionFormat> {
    match object.get(keys::DESCRIPTION_FORMAT) {
        None | Some(Value::Null) => Ok(DescriptionFormat::default()),
        Some(Value::String(tag)) => tag
            .parse()
            .map_err(|err: edu_model::UnknownDescriptionFormat| {
                FormatError::MalformedPayload(err.to_string())
            }),
        Some(_) => Err(FormatError::MalformedPayload(
            "field `description_format` is not a string".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_order_placeholders_are_sorted_on_decode() {
        let mut object = Object::new();
        object.insert(keys::NAME.to_string(), Value::String("main.rs".to_string()));
        object.insert(keys::TEXT.to_string(), Value::String("text".to_string()));
        object.insert(
            keys::PLACEHOLDERS.to_string(),
            Value::Array(vec![
                Value::Object(placeholder_to_object(&AnswerPlaceholder {
                    offset: 9,
                    length: 1,
                    placeholder_text: "late".to_string(),
                })),
                Value::Object(placeholder_to_object(&AnswerPlaceholder {
                    offset: 2,
                    length: 1,
                    placeholder_text: "early".to_string(),
                })),
            ]),
        );

        let file = task_file_from_object(&object).expect("decode");
        let offsets: Vec<usize> = file.placeholders.iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![2, 9]);
    }

    #[test]
    fn placeholder_without_a_range_is_rejected() {
        let mut object = Object::new();
        object.insert(keys::LENGTH.to_string(), Value::from(4u64));

        let err = placeholder_from_object(&object).unwrap_err();
        assert!(matches!(err, FormatError::RequiredFieldAbsent("offset")));
    }

    #[test]
    fn unknown_description_format_is_malformed() {
        let mut object = Object::new();
        object.insert(
            keys::DESCRIPTION_FORMAT.to_string(),
            Value::String("docx".to_string()),
        );

        let err = description_format_field(&object).unwrap_err();
        assert!(matches!(err, FormatError::MalformedPayload(_)));
    }
}
