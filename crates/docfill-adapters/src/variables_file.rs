//! Flat TOML / JSON variable files (`--vars FILE`).
//!
//! ```toml
//! title = "年度通知"
//! year = 2026
//! ```
//!
//! or the JSON equivalent `{"title": "年度通知", "year": 2026}`. Scalars are
//! coerced to their canonical text; nested values are rejected.

use std::fs;
use std::path::Path;

use tracing::debug;

use docfill_core::{
    application::ApplicationError,
    domain::VariableMap,
    error::{DocfillError, DocfillResult},
};

/// Supported variables-file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarsFormat {
    Toml,
    Json,
}

impl VarsFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Read and parse a variables file.
pub fn load_variables_file(path: &Path) -> DocfillResult<VariableMap> {
    let invalid = |reason: String| -> DocfillError {
        ApplicationError::InvalidVariablesFile {
            path: path.to_path_buf(),
            reason,
        }
        .into()
    };

    let format = VarsFormat::from_path(path)
        .ok_or_else(|| invalid("unsupported extension (expected .toml or .json)".into()))?;

    let text = fs::read_to_string(path).map_err(|e| -> DocfillError {
        ApplicationError::FilesystemError {
            path: path.to_path_buf(),
            reason: format!("Failed to read variables file: {e}"),
        }
        .into()
    })?;

    let vars = parse_variables(&text, format).map_err(invalid)?;
    debug!(path = %path.display(), count = vars.len(), "Variables file loaded");
    Ok(vars)
}

/// Parse the text of a variables file.
pub fn parse_variables(text: &str, format: VarsFormat) -> Result<VariableMap, String> {
    let mut vars = VariableMap::new();
    match format {
        VarsFormat::Toml => {
            let table: toml::Table = toml::from_str(text).map_err(|e| e.to_string())?;
            for (key, value) in &table {
                let value = coerce_toml(key, value)?;
                vars.insert(key, value).map_err(|e| e.to_string())?;
            }
        }
        VarsFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
            let serde_json::Value::Object(object) = value else {
                return Err("top level must be an object".into());
            };
            for (key, value) in &object {
                let value = coerce_json(key, value)?;
                vars.insert(key, value).map_err(|e| e.to_string())?;
            }
        }
    }
    Ok(vars)
}

/// Render a TOML scalar as a variable value.
pub(crate) fn coerce_toml(key: &str, value: &toml::Value) -> Result<String, String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(float_text(*f)),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Datetime(d) => Ok(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => Err(not_scalar(key)),
    }
}

/// Whole floats keep their `.0` so `2.0` does not read back as an integer.
fn float_text(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

fn coerce_json(key: &str, value: &serde_json::Value) -> Result<String, String> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Null => Err(format!("'{key}' is null; values must be plain strings")),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(not_scalar(key)),
    }
}

fn not_scalar(key: &str) -> String {
    format!("'{key}' is not a scalar; values must be plain strings")
}
