//! Deep merge for layered TOML configuration.
//!
//! # Merge Rules
//!
//! - Tables are merged recursively
//! - Arrays are replaced entirely (not merged)
//! - Scalars in the overlay replace scalars in the base

use toml::Value;

/// Deep merge two TOML values; `overlay` wins at the point of conflict.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            let mut result = base_table.clone();

            for (key, overlay_value) in overlay_table {
                let merged = match base_table.get(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value.clone(),
                };
                result.insert(key.clone(), merged);
            }

            Value::Table(result)
        }

        (_, overlay) => overlay.clone(),
    }
}

/// Merge several layers in order, later layers taking precedence.
pub fn merge_configs(configs: &[Value]) -> Value {
    configs
        .iter()
        .fold(Value::Table(Default::default()), |acc, config| {
            deep_merge(&acc, config)
        })
}
