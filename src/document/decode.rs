//! Shape validation from a raw JSON value into [`EntityDocument`]
//!
//! Optional fields that are missing or `null` degrade to empty; fields that
//! are present with the wrong type fail with a path to the offending value.

use super::{Ability, Attack, AttackGroup, Effects, EntityDocument, Meta, StatValue};
use crate::core::error::SchemaError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

type Decoded<T> = std::result::Result<T, SchemaError>;

pub(super) fn document(value: &Value) -> Decoded<EntityDocument> {
    let root = as_object(value, "$")?;

    Ok(EntityDocument {
        meta: present(root, "meta")
            .map(|v| meta(v, "$.meta"))
            .transpose()?,
        lore: opt_string(root, "lore", "$")?,
        stats: stats(root)?,
        stats_order: stats_order(root)?,
        attacks: opt_array(root, "attacks", "$")?
            .iter()
            .enumerate()
            .map(|(i, v)| attack_group(v, &format!("$.attacks[{}]", i)))
            .collect::<Decoded<_>>()?,
        abilities: opt_array(root, "abilities", "$")?
            .iter()
            .enumerate()
            .map(|(i, v)| ability(v, &format!("$.abilities[{}]", i)))
            .collect::<Decoded<_>>()?,
    })
}

fn meta(value: &Value, path: &str) -> Decoded<Meta> {
    let obj = as_object(value, path)?;
    Ok(Meta {
        entity: opt_string(obj, "entity", path)?,
        human_name: opt_string(obj, "humanName", path)?,
        portrait: opt_string(obj, "portrait", path)?,
    })
}

fn stats(root: &Map<String, Value>) -> Decoded<BTreeMap<String, StatValue>> {
    let Some(value) = present(root, "stats") else {
        return Ok(BTreeMap::new());
    };
    let obj = as_object(value, "$.stats")?;

    let mut stats = BTreeMap::new();
    for (key, value) in obj {
        let stat = match value {
            Value::Null => continue,
            Value::String(s) => StatValue::Text(s.clone()),
            Value::Number(n) => StatValue::Number(number(n, &format!("$.stats.{}", key))?),
            other => {
                return Err(SchemaError::new(
                    format!("$.stats.{}", key),
                    format!("expected a string or number, found {}", kind(other)),
                ))
            }
        };
        stats.insert(key.clone(), stat);
    }
    Ok(stats)
}

fn stats_order(root: &Map<String, Value>) -> Decoded<Vec<String>> {
    opt_array(root, "statsOrder", "$")?
        .iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::String(s) => Ok(s.clone()),
            other => Err(SchemaError::new(
                format!("$.statsOrder[{}]", i),
                format!("expected a string, found {}", kind(other)),
            )),
        })
        .collect()
}

fn attack_group(value: &Value, path: &str) -> Decoded<AttackGroup> {
    let obj = as_object(value, path)?;
    Ok(AttackGroup {
        group: req_string(obj, "group", path)?,
        items: opt_array(obj, "items", path)?
            .iter()
            .enumerate()
            .map(|(i, v)| attack(v, &format!("{}.items[{}]", path, i)))
            .collect::<Decoded<_>>()?,
    })
}

fn attack(value: &Value, path: &str) -> Decoded<Attack> {
    let obj = as_object(value, path)?;
    Ok(Attack {
        name: req_string(obj, "name", path)?,
        desc: opt_string(obj, "desc", path)?,
        damage: opt_number(obj, "damage", path)?,
        energy_cost: opt_number(obj, "energyCost", path)?,
    })
}

fn ability(value: &Value, path: &str) -> Decoded<Ability> {
    let obj = as_object(value, path)?;
    let effects = match present(obj, "effects") {
        Some(v) => {
            let effects_path = format!("{}.effects", path);
            let effects = as_object(v, &effects_path)?;
            Some(Effects {
                health_percent: opt_number(effects, "healthPercent", &effects_path)?,
                energy_percent: opt_number(effects, "energyPercent", &effects_path)?,
            })
        }
        None => None,
    };

    Ok(Ability {
        name: req_string(obj, "name", path)?,
        desc: opt_string(obj, "desc", path)?,
        effects,
        energy_cost: opt_number(obj, "energyCost", path)?,
    })
}

// === FIELD HELPERS ===

/// A field counts as present unless missing or `null`
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn as_object<'a>(value: &'a Value, path: &str) -> Decoded<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::new(path, format!("expected an object, found {}", kind(value))))
}

fn opt_string(obj: &Map<String, Value>, key: &str, path: &str) -> Decoded<Option<String>> {
    match present(obj, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(SchemaError::new(
            format!("{}.{}", path, key),
            format!("expected a string, found {}", kind(other)),
        )),
    }
}

fn req_string(obj: &Map<String, Value>, key: &str, path: &str) -> Decoded<String> {
    opt_string(obj, key, path)?
        .ok_or_else(|| SchemaError::new(format!("{}.{}", path, key), "missing required string"))
}

fn opt_number(obj: &Map<String, Value>, key: &str, path: &str) -> Decoded<Option<f64>> {
    let field_path = format!("{}.{}", path, key);
    match present(obj, key) {
        None => Ok(None),
        Some(Value::Number(n)) => number(n, &field_path).map(Some),
        Some(other) => Err(SchemaError::new(
            field_path,
            format!("expected a number, found {}", kind(other)),
        )),
    }
}

fn opt_array<'a>(obj: &'a Map<String, Value>, key: &str, path: &str) -> Decoded<&'a [Value]> {
    match present(obj, key) {
        None => Ok(Default::default()),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(SchemaError::new(
            format!("{}.{}", path, key),
            format!("expected an array, found {}", kind(other)),
        )),
    }
}

fn number(n: &serde_json::Number, path: &str) -> Decoded<f64> {
    n.as_f64()
        .ok_or_else(|| SchemaError::new(path, "number out of range"))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
