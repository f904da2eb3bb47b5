//! Deep merge of configuration tiers.
//!
//! Objects merge key by key; every other value in a higher tier replaces
//! the lower one. A `null` in a higher tier means "not specified".

use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers in order, later tiers winning.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_keys_merge_individually() {
        let base = json!({"server": {"db_path": "a.db", "seed_defaults": true}});
        let overlay = json!({"server": {"db_path": "b.db"}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"server": {"db_path": "b.db", "seed_defaults": true}})
        );
    }

    #[test]
    fn null_overlay_keeps_base() {
        let base = json!({"schedule": {"due_soon_hours": 48}});
        let overlay = json!({"schedule": null});
        assert_eq!(deep_merge(base.clone(), overlay), base);
    }

    #[test]
    fn later_tiers_win() {
        let merged = deep_merge_all(vec![
            json!({"schedule": {"due_soon_hours": 48}}),
            json!({"schedule": {"due_soon_hours": 24}}),
            json!({"schedule": {"due_soon_hours": 12}}),
        ]);
        assert_eq!(merged["schedule"]["due_soon_hours"], 12);
    }
}
