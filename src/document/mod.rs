//! Entity document model
//!
//! An entity document describes one character or creature: a header
//! (`meta`), free-text lore, displayable stats with their render order,
//! grouped attacks and passive abilities. Documents are read once, rendered
//! once and never mutated.

mod decode;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::core::error::{EntityError, FetchError, Result};

/// Header block: display title, human-readable name and portrait
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub entity: Option<String>,
    pub human_name: Option<String>,
    /// URL or page-relative path of the portrait image
    pub portrait: Option<String>,
}

/// A stat's display value, kept in the form the author wrote it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Text(text) => f.write_str(text),
            StatValue::Number(n) => f.write_str(&format_number(*n)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    pub name: String,
    pub desc: Option<String>,
    pub damage: Option<f64>,
    pub energy_cost: Option<f64>,
}

/// A titled column of attacks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttackGroup {
    pub group: String,
    pub items: Vec<Attack>,
}

/// Percent restores granted by an ability
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Effects {
    pub health_percent: Option<f64>,
    pub energy_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub name: String,
    pub desc: Option<String>,
    pub effects: Option<Effects>,
    pub energy_cost: Option<f64>,
}

/// The fetched JSON payload, validated
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDocument {
    pub meta: Option<Meta>,
    pub lore: Option<String>,
    pub stats: BTreeMap<String, StatValue>,
    pub stats_order: Vec<String>,
    pub attacks: Vec<AttackGroup>,
    pub abilities: Vec<Ability>,
}

impl EntityDocument {
    /// Parse and validate a document body
    ///
    /// `location` names the source in error messages. Text that is not JSON
    /// yields [`FetchError`]; JSON of the wrong shape yields
    /// [`crate::core::error::SchemaError`].
    pub fn from_json(location: &str, body: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| FetchError::new(location, format!("invalid JSON: {}", e)))?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed JSON value
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        decode::document(value).map_err(EntityError::from)
    }

    /// Stats in render order, skipping keys that have no value
    pub fn ordered_stats(&self) -> impl Iterator<Item = (&str, &StatValue)> {
        self.stats_order
            .iter()
            .filter_map(|key| self.stats.get(key).map(|value| (key.as_str(), value)))
    }
}

/// Format a number the way the page shows it: integral values without a
/// fractional part, everything else in shortest round-trip form
///
/// Magnitudes of at least `1e21` or below `1e-6` switch to exponent form
/// with an explicit sign (`1e+21`, `1.5e-7`).
pub fn format_number(n: f64) -> String {
    let magnitude = n.abs();
    if n != 0.0 && (magnitude >= 1e21 || magnitude < 1e-6) {
        let exp = format!("{:e}", n);
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exp,
        };
    }
    if n.fract() == 0.0 && magnitude < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
