//! Environment variable substitution for config values.
//!
//! Supports `${VAR_NAME}` syntax in string values, resolved at load time.
//! Only uppercase `[A-Z_][A-Z0-9_]*` variable names are matched.
//! `$${VAR}` escapes to a literal `${VAR}`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// Matches both `${VAR}` and the escaped `$${VAR}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// A `${VAR}` reference whose variable is unset or empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Result of a substitution pass.
#[derive(Debug)]
pub struct Resolved {
    pub value: Value,
    /// Missing references were replaced with an empty string.
    pub missing: Vec<MissingEnvVarError>,
}

/// Substitute `${VAR}` references from the process environment.
pub fn resolve_env_vars(value: &Value) -> Resolved {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Resolved {
    let mut missing = Vec::new();
    let value = substitute_value(value, env, "", &mut missing);
    Resolved { value, missing }
}

fn substitute_value(
    value: &Value,
    env: &HashMap<String, String>,
    path: &str,
    missing: &mut Vec<MissingEnvVarError>,
) -> Value {
    match value {
        Value::String(s) => Value::String(substitute_string(s, env, path, missing)),
        Value::Array(arr) => Value::Array(
            arr.iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]"), missing))
                .collect(),
        ),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path, missing));
            }
            Value::Object(result)
        }
        // Primitives pass through unchanged.
        other => other.clone(),
    }
}

fn substitute_string(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
    missing: &mut Vec<MissingEnvVarError>,
) -> String {
    if !s.contains('$') {
        return s.to_string();
    }

    ENV_VAR_PATTERN
        .replace_all(s, |caps: &regex::Captures| {
            let var_name = &caps[2];
            if !caps[1].is_empty() {
                return format!("${{{var_name}}}");
            }
            match env.get(var_name) {
                Some(val) if !val.is_empty() => val.clone(),
                _ => {
                    missing.push(MissingEnvVarError {
                        var_name: var_name.to_string(),
                        config_path: path.to_string(),
                    });
                    String::new()
                }
            }
        })
        .into_owned()
}

/// Check whether a string contains any env var references.
pub fn contains_env_var_reference(s: &str) -> bool {
    s.contains('$') && ENV_VAR_PATTERN.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"provider": {"apiKey": "${MOONSHOT_API_KEY}"}});
        let env = env(&[("MOONSHOT_API_KEY", "sk-abc123")]);
        let result = resolve_env_vars_with(&v, &env);
        assert_eq!(result.value["provider"]["apiKey"], "sk-abc123");
        assert!(result.missing.is_empty());
    }

    #[test]
    fn missing_var_is_reported_with_path() {
        let v = json!({"provider": {"apiKey": "${MISSING_VAR}"}});
        let result = resolve_env_vars_with(&v, &HashMap::new());
        assert_eq!(result.value["provider"]["apiKey"], "");
        assert_eq!(result.missing.len(), 1);
        assert_eq!(result.missing[0].var_name, "MISSING_VAR");
        assert_eq!(result.missing[0].config_path, "provider.apiKey");
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"note": "$${HOME_DIR} and ${NAME}"});
        let env = env(&[("NAME", "tandem"), ("HOME_DIR", "/root")]);
        let result = resolve_env_vars_with(&v, &env);
        assert_eq!(result.value["note"], "${HOME_DIR} and tandem");
    }

    #[test]
    fn lowercase_names_are_ignored() {
        let v = json!({"a": ["${lower}", 3]});
        let result = resolve_env_vars_with(&v, &HashMap::new());
        assert_eq!(result.value["a"][0], "${lower}");
        assert_eq!(result.value["a"][1], 3);
        assert!(!contains_env_var_reference("${lower}"));
        assert!(contains_env_var_reference("key=${UPPER}"));
    }
}
