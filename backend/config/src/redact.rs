//! Config redaction: produce safe-to-share config snapshots by masking sensitive fields.

use serde_json::Value;

static SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "apikey",
    "accessToken",
    "access_token",
    "token",
    "secret",
    "password",
];

/// Redact a config JSON value, masking sensitive fields.
///
/// Keeps the first four characters as a hint, e.g. `sk-a***`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_string(s: &str, key: &str) -> Value {
    if is_sensitive_key(key) && !s.is_empty() {
        let hint = if s.chars().count() > 4 {
            format!("{}***", s.chars().take(4).collect::<String>())
        } else {
            "***".to_string()
        };
        return Value::String(hint);
    }
    Value::String(s.to_string())
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                result.insert(k.clone(), redact_recursive(v, k));
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_api_key() {
        let v = json!({ "provider": { "apiKey": "sk-abcdef123456", "model": "moonshot-v1-8k" } });
        let redacted = redact(&v);
        assert_eq!(redacted["provider"]["apiKey"], "sk-a***");
        assert_eq!(redacted["provider"]["model"], "moonshot-v1-8k");
    }

    #[test]
    fn short_secrets_fully_masked() {
        let redacted = redact(&json!({ "token": "abc" }));
        assert_eq!(redacted["token"], "***");
        let untouched = redact(&json!({ "apiKey": "" }));
        assert_eq!(untouched["apiKey"], "");
    }
}
