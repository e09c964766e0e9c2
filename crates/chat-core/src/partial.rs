//! Partial updates
//!
//! Update packets carry a `data` object with the changed fields and a `clear`
//! list naming fields to remove. Field names in `clear` are PascalCase on the
//! wire (`Description`, `StatusText`) while entity fields are snake_case.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;

/// Apply a partial update to an entity and return the updated copy
///
/// Cleared fields are removed first, then `data` fields overwrite.
pub fn apply_partial<T>(
    entity: &T,
    entity_name: &'static str,
    data: &Value,
    clear: &[String],
) -> Result<T, DomainError>
where
    T: Serialize + DeserializeOwned,
{
    let mut value = serde_json::to_value(entity).map_err(|source| DomainError::InvalidPartial {
        entity: entity_name,
        source,
    })?;

    let Value::Object(target) = &mut value else {
        return Err(DomainError::PartialNotObject {
            entity: entity_name,
        });
    };

    for field in clear {
        clear_field(target, &to_snake_case(field));
    }

    match data {
        Value::Object(changes) => {
            for (key, change) in changes {
                target.insert(key.clone(), change.clone());
            }
        }
        Value::Null => {}
        _ => {
            return Err(DomainError::PartialNotObject {
                entity: entity_name,
            })
        }
    }

    serde_json::from_value(value).map_err(|source| DomainError::InvalidPartial {
        entity: entity_name,
        source,
    })
}

/// Remove a field, falling back to `parent_child` → `parent.child` for nested fields
fn clear_field(target: &mut Map<String, Value>, key: &str) {
    if target.remove(key).is_some() {
        return;
    }

    if let Some((parent, child)) = key.split_once('_') {
        if let Some(Value::Object(nested)) = target.get_mut(parent) {
            nested.remove(child);
        }
    }
}

/// Convert a PascalCase wire field name to snake_case
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
