//! The shared structured-value representation and its text adapters.
//!
//! Both codecs operate over one ordered key/value tree so that neither
//! depends on a serialisation library's field-mapping policy. The adapters
//! here are the only places where payload text is parsed or rendered; the
//! typed readers apply the lenient-decode contract (absent keys take the
//! documented default, present keys must have the declared shape).

use serde_json::Value;

use crate::{FormatError, FormatResult};

/// The ordered object node of the internal value tree.
///
/// Key order is an external contract in both formats, so the tree preserves
/// insertion order end to end.
pub type Object = serde_json::Map<String, Value>;

/// Parses local-format text into a value tree.
pub(crate) fn from_yaml_text(text: &str) -> FormatResult<Value> {
    serde_yaml::from_str(text)
        .map_err(|err| FormatError::MalformedPayload(format!("invalid YAML: {err}")))
}

/// Renders a value tree as local-format text.
pub(crate) fn to_yaml_text(value: &Value) -> FormatResult<String> {
    serde_yaml::to_string(value)
        .map_err(|err| FormatError::MalformedPayload(format!("cannot render YAML: {err}")))
}

/// Parses remote-format text into a value tree.
pub(crate) fn from_json_text(text: &str) -> FormatResult<Value> {
    serde_json::from_str(text)
        .map_err(|err| FormatError::MalformedPayload(format!("invalid JSON: {err}")))
}

/// Renders a value tree as remote-format text.
pub(crate) fn to_json_text(value: &Value) -> FormatResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| FormatError::MalformedPayload(format!("cannot render JSON: {err}")))
}

/// Views a value as an object, failing when the payload root has the wrong
/// shape.
pub(crate) fn as_object(value: &Value) -> FormatResult<&Object> {
    value
        .as_object()
        .ok_or_else(|| FormatError::MalformedPayload("payload is not an object".to_string()))
}

/// Reads an optional string field; absent keys default to the empty string.
pub(crate) fn str_field(object: &Object, key: &str) -> FormatResult<String> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(FormatError::MalformedPayload(format!(
            "field `{key}` is not a string"
        ))),
    }
}

/// Reads an optional boolean field; absent keys default to `false`.
pub(crate) fn bool_field(object: &Object, key: &str) -> FormatResult<bool> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(FormatError::MalformedPayload(format!(
            "field `{key}` is not a boolean"
        ))),
    }
}

/// Reads an optional integer field; absent keys default to zero.
pub(crate) fn i64_field(object: &Object, key: &str) -> FormatResult<i64> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(number)) => number.as_i64().ok_or_else(|| {
            FormatError::MalformedPayload(format!("field `{key}` is not an integer"))
        }),
        Some(_) => Err(FormatError::MalformedPayload(format!(
            "field `{key}` is not an integer"
        ))),
    }
}

/// Reads a required non-negative integer field.
///
/// Unlike the lenient readers there is no default here; the caller names a
/// field whose absence would corrupt downstream state.
pub(crate) fn require_usize(object: &Object, key: &'static str) -> FormatResult<usize> {
    match object.get(key) {
        None | Some(Value::Null) => Err(FormatError::RequiredFieldAbsent(key)),
        Some(Value::Number(number)) => number.as_u64().map(|n| n as usize).ok_or_else(|| {
            FormatError::MalformedPayload(format!("field `{key}` is not a non-negative integer"))
        }),
        Some(_) => Err(FormatError::MalformedPayload(format!(
            "field `{key}` is not a non-negative integer"
        ))),
    }
}

/// Reads an optional sequence field; absent keys default to empty.
pub(crate) fn seq_field<'a>(object: &'a Object, key: &str) -> FormatResult<&'a [Value]> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(FormatError::MalformedPayload(format!(
            "field `{key}` is not a sequence"
        ))),
    }
}

/// Reads an optional object field; absent keys read as `None`.
pub(crate) fn object_field<'a>(object: &'a Object, key: &str) -> FormatResult<Option<&'a Object>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(nested)) => Ok(Some(nested)),
        Some(_) => Err(FormatError::MalformedPayload(format!(
            "field `{key}` is not a mapping"
        ))),
    }
}

/// Reads an optional list of strings; absent keys default to empty.
pub(crate) fn str_list_field(object: &Object, key: &str) -> FormatResult<Vec<String>> {
    seq_field(object, key)?
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                FormatError::MalformedPayload(format!("field `{key}` contains a non-string entry"))
            })
        })
        .collect()
}

/// Reads an optional list of identifiers; absent keys default to empty.
pub(crate) fn id_list_field(object: &Object, key: &str) -> FormatResult<Vec<i64>> {
    seq_field(object, key)?
        .iter()
        .map(|item| {
            item.as_i64().ok_or_else(|| {
                FormatError::MalformedPayload(format!("field `{key}` contains a non-integer entry"))
            })
        })
        .collect()
}

/// Reads an optional list of indexes; absent keys default to empty.
pub(crate) fn index_list_field(object: &Object, key: &str) -> FormatResult<Vec<usize>> {
    seq_field(object, key)?
        .iter()
        .map(|item| {
            item.as_u64().map(|n| n as usize).ok_or_else(|| {
                FormatError::MalformedPayload(format!("field `{key}` contains a non-index entry"))
            })
        })
        .collect()
}
