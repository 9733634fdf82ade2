//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`DebtguardSettings::default()`]
//! 2. If `~/.debtguard/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Read the credential from `GEMINI_API_KEY`

use std::path::{Path, PathBuf};

use debtguard_core::security::ApiKey;
use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::DebtguardSettings;

/// Environment variable holding the generation API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Resolve the path to the settings file (`~/.debtguard/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".debtguard").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<DebtguardSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<DebtguardSettings> {
    load_with_env(path, |name| std::env::var(name).ok())
}

/// Same as [`load_settings_from_path`], reading variables through `env`.
pub fn load_with_env<F>(path: &Path, env: F) -> Result<DebtguardSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = serde_json::to_value(DebtguardSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: DebtguardSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings, &env);
    settings.api_key = ApiKey::from_optional(env(API_KEY_ENV));
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `DEBTGUARD_*` overrides. Invalid values are ignored with a warning.
pub fn apply_env_overrides<F>(settings: &mut DebtguardSettings, env: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = read_string(env, "DEBTGUARD_MODEL") {
        settings.generation.model = v;
    }
    if let Some(v) = read_string(env, "DEBTGUARD_BASE_URL") {
        settings.generation.base_url = v;
    }
    if let Some(v) = read_string(env, "DEBTGUARD_READER_PREFIX") {
        settings.reader.proxy_prefix = v;
    }
    if let Some(v) = read_u32(env, "DEBTGUARD_MAX_ATTEMPTS", 1, 20) {
        settings.retry.max_attempts = v;
    }
    if let Some(v) = read_usize(env, "DEBTGUARD_MAX_CONTEXT_CHARS", 1, 10_000_000) {
        settings.synthesis.max_context_chars = v;
    }
    if let Some(v) = read_string(env, "DEBTGUARD_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_bool(env, "DEBTGUARD_LOG_JSON") {
        settings.logging.json = v;
    }
}

/// Parse a boolean: `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_string<F: Fn(&str) -> Option<String>>(env: &F, name: &str) -> Option<String> {
    env(name).filter(|v| !v.is_empty())
}

fn read_bool<F: Fn(&str) -> Option<String>>(env: &F, name: &str) -> Option<bool> {
    let val = env(name)?;
    let result = parse_bool(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_u32<F: Fn(&str) -> Option<String>>(env: &F, name: &str, min: u32, max: u32) -> Option<u32> {
    let val = env(name)?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}

fn read_usize<F: Fn(&str) -> Option<String>>(
    env: &F,
    name: &str,
    min: usize,
    max: usize,
) -> Option<usize> {
    let val = env(name)?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid usize env var, ignoring");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"reader": {"proxyPrefix": "a", "timeoutSecs": 60}});
        let source = serde_json::json!({"reader": {"proxyPrefix": "b"}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["reader"]["proxyPrefix"], "b");
        assert_eq!(merged["reader"]["timeoutSecs"], 60);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"delaysMs": [1, 2, 3]});
        let source = serde_json::json!({"delaysMs": [0]});
        let merged = deep_merge(target, source);
        assert_eq!(merged["delaysMs"], serde_json::json!([0]));
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    // ── file loading ────────────────────────────────────────────────

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_with_env(&dir.path().join("absent.json"), no_env).unwrap();
        assert_eq!(settings.retry.max_attempts, 5);
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn file_values_merge_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"generation": {"model": "gemini-test"}, "retry": {"delaysMs": [10, 20]}}"#,
        )
        .unwrap();

        let settings = load_with_env(&path, no_env).unwrap();
        assert_eq!(settings.generation.model, "gemini-test");
        assert_eq!(settings.generation.base_url, crate::DEFAULT_GENERATION_BASE_URL);
        assert_eq!(settings.retry.delays_ms, vec![10, 20]);
        assert_eq!(settings.retry.max_attempts, 5);
    }

    #[test]
    fn invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_with_env(&path, no_env).unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"retry": {"maxAttempts": 0}}"#).unwrap();
        let err = load_with_env(&path, no_env).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue(_)));
    }

    // ── env overrides ───────────────────────────────────────────────

    #[test]
    fn env_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"generation": {"model": "from-file"}}"#).unwrap();

        let env = env_of(&[
            ("DEBTGUARD_MODEL", "from-env"),
            ("DEBTGUARD_MAX_ATTEMPTS", "3"),
            ("DEBTGUARD_READER_PREFIX", "http://localhost:9/"),
            ("DEBTGUARD_LOG_JSON", "yes"),
            ("GEMINI_API_KEY", "AIza-test"),
        ]);
        let settings = load_with_env(&path, env).unwrap();
        assert_eq!(settings.generation.model, "from-env");
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.reader.proxy_prefix, "http://localhost:9/");
        assert!(settings.logging.json);
        assert_eq!(settings.api_key.as_ref().map(ApiKey::expose), Some("AIza-test"));
    }

    #[test]
    fn out_of_range_env_ignored() {
        let mut settings = DebtguardSettings::default();
        let env = env_of(&[
            ("DEBTGUARD_MAX_ATTEMPTS", "0"),
            ("DEBTGUARD_MAX_CONTEXT_CHARS", "lots"),
            ("DEBTGUARD_LOG_JSON", "maybe"),
        ]);
        apply_env_overrides(&mut settings, &env);
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.synthesis.max_context_chars, 30_000);
        assert!(!settings.logging.json);
    }

    #[test]
    fn empty_api_key_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_of(&[("GEMINI_API_KEY", "")]);
        let settings = load_with_env(&dir.path().join("none.json"), env).unwrap();
        assert!(!settings.has_credential());
    }

    #[test]
    fn parse_helpers() {
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_u32_range("7", 1, 20), Some(7));
        assert_eq!(parse_u32_range("21", 1, 20), None);
        assert_eq!(parse_usize_range("x", 1, 2), None);
    }
}
