use serde_json::Value as Json;

use super::Value;

/// Converts a JSON document into a value graph. Objects become `map[string]any`,
/// arrays `[]any`, and `null` the untyped nil.
pub fn from_json(document: &Json) -> Value {
    match document {
        Json::Null => Value::nil(),
        Json::Bool(value) => Value::bool(*value),
        Json::Number(number) => {
            if let Some(value) = number.as_i64() {
                Value::int(value)
            } else if let Some(value) = number.as_u64() {
                Value::typed_uint("uint64", value)
            } else {
                Value::float(number.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(value) => Value::string(value.as_str()),
        Json::Array(items) => Value::slice("[]any", items.iter().map(from_json)),
        Json::Object(object) => Value::map(
            "map[string]any",
            object
                .iter()
                .map(|(key, value)| (Value::string(key.as_str()), from_json(value))),
        ),
    }
}
