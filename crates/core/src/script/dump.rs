use serde::Serialize;

/// Serialize a classified script, report, or outcome to a pretty-printed JSON string.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).expect("trail model serialization cannot fail")
}
