use serde_json::{Map, Value};
use tracing::warn;

/// Extract the JSON object embedded in free-form model output.
///
/// Handles the common decorations seen in practice: a leading `json` marker
/// word, markdown code fences, and prose around the object. Falls back to
/// parsing the whole trimmed text. Returns `None` on any parse failure;
/// callers are responsible for checking expected keys.
pub fn extract_json(raw: &str) -> Option<Map<String, Value>> {
    let mut text = raw.trim();

    // Models sometimes echo the word "json" before the object
    if let Some(prefix) = text.get(..4) {
        if prefix.eq_ignore_ascii_case("json") {
            text = text[4..].trim_start();
        }
    }

    // Markdown code fence
    if let Some(inner) = extract_from_fence(text) {
        if let Some(map) = parse_object(&inner) {
            return Some(map);
        }
    }

    // Greedy match from first '{' to last '}' (embedded newlines allowed)
    let candidate = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            warn!(
                "Response parsed as JSON but is not an object: {}",
                value_kind(&other)
            );
            None
        }
        Err(e) => {
            warn!("Failed to parse JSON from response: {}", e);
            None
        }
    }
}

fn extract_from_fence(text: &str) -> Option<String> {
    let re = regex::Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").ok()?;
    let cap = re.captures(text)?;
    Some(cap.get(1)?.as_str().trim().to_string())
}

fn parse_object(s: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_marker_prefix() {
        let map = extract_json("json\n{\"a\":1}").unwrap();
        assert_eq!(map["a"], serde_json::json!(1));
    }

    #[test]
    fn test_uppercase_marker_prefix() {
        let map = extract_json("JSON {\"answer\": \"Yes\"}").unwrap();
        assert_eq!(map["answer"], "Yes");
    }

    #[test]
    fn test_bare_object() {
        let map = extract_json(r#"{"answer": "No", "explanation": "x"}"#).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_object_surrounded_by_prose() {
        let raw = "Sure, here is the assessment:\n{\"answer\": \"Yes\",\n\"explanation\": \"ok\"}\nLet me know if you need more.";
        let map = extract_json(raw).unwrap();
        assert_eq!(map["answer"], "Yes");
    }

    #[test]
    fn test_markdown_fence() {
        let raw = "```json\n{\"systems\": \"SAP, Oracle\"}\n```";
        let map = extract_json(raw).unwrap();
        assert_eq!(map["systems"], "SAP, Oracle");
    }

    #[test]
    fn test_nested_object_greedy() {
        let raw = "{\"present\": {\"Who\": \"the manager\"}, \"missing\": {}}";
        let map = extract_json(raw).unwrap();
        assert!(map.get("present").unwrap().is_object());
    }

    #[test]
    fn test_garbage_yields_none() {
        assert!(extract_json("I cannot help with that.").is_none());
    }

    #[test]
    fn test_non_object_json_yields_none() {
        assert!(extract_json("[1, 2, 3]").is_none());
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_json("").is_none());
    }

    #[test]
    fn test_truncated_object_yields_none() {
        assert!(extract_json("{\"answer\": \"Yes\", \"explanation\":").is_none());
    }
}
