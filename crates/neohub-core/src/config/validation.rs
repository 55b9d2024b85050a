//! Config validation - warns about unknown fields

use serde_json::Value;
use tracing::warn;

const HUB_CONFIG_KEYS: &[&str] = &["host", "port", "timeoutSecs", "maxAttempts"];

/// Validate JSON config and warn about unknown fields.
pub fn warn_unknown_fields(content: &str, config_name: &str) {
    let Ok(value) = serde_json::from_str::<Value>(content) else {
        return;
    };

    for key in find_unknown_keys(&value, HUB_CONFIG_KEYS) {
        warn!("Unknown config field in {config_name}: {key}");
    }
}

fn find_unknown_keys(value: &Value, expected: &[&str]) -> Vec<String> {
    let Value::Object(obj) = value else {
        return Vec::new();
    };

    obj.keys()
        .filter(|key| !expected.contains(&key.as_str()))
        .cloned()
        .collect()
}
