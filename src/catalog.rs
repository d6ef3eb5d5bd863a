use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CatalogError;

/// One row of the creature catalog.
///
/// Numeric fields are read leniently: catalogs in the wild carry numbers,
/// numeric strings and the occasional blank. Season and weather flags are
/// not fixed fields; every key the struct does not name lands in `flags`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureRecord {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub size: Option<String>,
    pub location: String,
    /// Minimum tool power. Missing or non-numeric values give `None`, which
    /// no tool satisfies; `null`, blank and negative values require nothing.
    #[serde(default, alias = "toolLevel", deserialize_with = "lenient_tool_level")]
    pub toollevel: Option<u32>,
    #[serde(default, deserialize_with = "lenient_weight")]
    pub weight: f64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub time: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub fishid: String,
    #[serde(flatten)]
    pub flags: BTreeMap<String, Value>,
}

impl CreatureRecord {
    /// A flag is set when the catalog stores `1`, `"1"` or `true` under it.
    pub fn flag(&self, key: &str) -> bool {
        match self.flags.get(key) {
            Some(Value::Number(n)) => n.as_f64() == Some(1.0),
            Some(Value::String(s)) => s.trim() == "1",
            Some(Value::Bool(b)) => *b,
            _ => false,
        }
    }

    /// Relative path of the item icon; fish use the `a` variant.
    pub fn icon_path(&self) -> String {
        icon_path(&self.fishid, &self.kind)
    }
}

pub fn icon_path(fishid: &str, kind: &str) -> String {
    let variant = if kind == "Fish" { "a" } else { "" };
    format!("icons/item_icon_{fishid}{variant}.png")
}

pub fn parse_catalog(text: &str) -> Result<Vec<CreatureRecord>, CatalogError> {
    Ok(serde_json::from_str(text)?)
}

pub struct CatalogLoader {
    base_dir: PathBuf,
}

impl CatalogLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Vec<CreatureRecord>, CatalogError> {
        let path = self.base_dir.join(file);
        let text = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        let records = parse_catalog(&text)?;
        tracing::debug!(path = %path.display(), records = records.len(), "catalog loaded");
        Ok(records)
    }
}

fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn lenient_weight<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    // `+ 0.0` folds a negative zero into zero so weight ordering stays total.
    Ok(number_from(&value).unwrap_or(0.0) + 0.0)
}

fn lenient_tool_level<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let level = match &value {
        Value::Null => Some(0.0),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        other => number_from(other),
    };
    Ok(level.map(|v| v.max(0.0).ceil() as u32))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}
