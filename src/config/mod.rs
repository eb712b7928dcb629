//! Flat run parameters.
//!
//! Every mode reads its options from one mapping of option name to JSON value,
//! assembled from `--config` files (later files win) and then `--param key=value`
//! bindings. `"auto"` is a reserved string and never read as a number.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::domain::{AxisConfig, Bound, ModelKind, TickPolicy};
use crate::error::AppError;

pub mod modes;

pub use modes::*;

/// Sentinel for data-driven bounds and tick counts.
pub const AUTO: &str = "auto";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: BTreeMap<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from config files followed by `key=value` bindings.
    pub fn load(files: &[PathBuf], bindings: &[String]) -> Result<Self, AppError> {
        let mut params = Self::new();
        for path in files {
            params.merge_file(path)?;
        }
        for binding in bindings {
            params.bind(binding)?;
        }
        Ok(params)
    }

    /// Merge a JSON object file; its keys override existing ones.
    pub fn merge_file(&mut self, path: &Path) -> Result<(), AppError> {
        let file = File::open(path)
            .map_err(|e| AppError::io(format!("Failed to open config '{}': {e}", path.display())))?;
        let value: Value = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| AppError::invalid_input(format!("Invalid config JSON '{}': {e}", path.display())))?;
        let Value::Object(map) = value else {
            return Err(AppError::invalid_input(format!(
                "Config '{}' must be a JSON object of option names to values",
                path.display()
            )));
        };
        self.values.extend(map);
        Ok(())
    }

    /// Apply one `key=value` binding. The value is parsed as JSON when possible
    /// and kept as a plain string otherwise.
    pub fn bind(&mut self, binding: &str) -> Result<(), AppError> {
        let (key, raw) = binding
            .split_once('=')
            .ok_or_else(|| AppError::invalid_input(format!("Parameter binding '{binding}' is not key=value")))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::invalid_input(format!("Parameter binding '{binding}' has no name")));
        }
        let raw = raw.trim();
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn required(&self, key: &str) -> Result<&Value, AppError> {
        self.values
            .get(key)
            .ok_or_else(|| AppError::invalid_input(format!("Missing parameter `{key}`")))
    }

    pub fn str(&self, key: &str) -> Result<String, AppError> {
        as_string(key, self.required(key)?)
    }

    pub fn str_or(&self, key: &str, default: &str) -> Result<String, AppError> {
        match self.values.get(key) {
            Some(v) => as_string(key, v),
            None => Ok(default.to_string()),
        }
    }

    pub fn path(&self, key: &str) -> Result<PathBuf, AppError> {
        let s = self.str(key)?;
        if s.is_empty() {
            return Err(AppError::invalid_input(format!("Parameter `{key}` must not be empty")));
        }
        Ok(PathBuf::from(s))
    }

    pub fn opt_path(&self, key: &str) -> Result<Option<PathBuf>, AppError> {
        let s = self.str_or(key, "")?;
        Ok((!s.is_empty()).then(|| PathBuf::from(s)))
    }

    /// A single string or a list of strings; a single string becomes a one-element list.
    pub fn str_list(&self, key: &str) -> Result<Vec<String>, AppError> {
        self.str_list_value(key, self.required(key)?)
    }

    pub fn str_list_or(&self, key: &str, default: Vec<String>) -> Result<Vec<String>, AppError> {
        match self.values.get(key) {
            Some(v) => self.str_list_value(key, v),
            None => Ok(default),
        }
    }

    fn str_list_value(&self, key: &str, value: &Value) -> Result<Vec<String>, AppError> {
        match value {
            Value::Array(items) => items.iter().map(|v| as_string(key, v)).collect(),
            other => Ok(vec![as_string(key, other)?]),
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, AppError> {
        match self.values.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
            Some(other) => Err(type_error(key, "a boolean", other)),
        }
    }

    /// `"auto"` or a finite number.
    pub fn bound_or(&self, key: &str, default: Bound) -> Result<Bound, AppError> {
        match self.values.get(key) {
            None => Ok(default),
            Some(Value::String(s)) if s.trim().eq_ignore_ascii_case(AUTO) => Ok(Bound::Auto),
            Some(Value::Number(n)) => n
                .as_f64()
                .filter(|v| v.is_finite())
                .map(Bound::Value)
                .ok_or_else(|| type_error(key, "\"auto\" or a number", &Value::Number(n.clone()))),
            Some(other) => Err(type_error(key, "\"auto\" or a number", other)),
        }
    }

    /// `"auto"` or a non-negative integer (0 = no ticks).
    pub fn ticks_or(&self, key: &str, default: TickPolicy) -> Result<TickPolicy, AppError> {
        match self.values.get(key) {
            None => Ok(default),
            Some(Value::String(s)) if s.trim().eq_ignore_ascii_case(AUTO) => Ok(TickPolicy::Auto),
            Some(Value::Number(n)) => {
                if let Some(count) = n.as_u64() {
                    return Ok(TickPolicy::Count(count as usize));
                }
                if n.as_i64().is_some_and(|v| v < 0) {
                    return Err(AppError::invalid_input(format!(
                        "{key} has to be greater 0 or 0 for no ticks (found: {n} < 0)"
                    )));
                }
                Err(type_error(key, "\"auto\" or a non-negative integer", &Value::Number(n.clone())))
            }
            Some(other) => Err(type_error(key, "\"auto\" or a non-negative integer", other)),
        }
    }

    /// `"auto"` (→ `None`) or a positive integer.
    pub fn count_or_auto(&self, key: &str) -> Result<Option<usize>, AppError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().eq_ignore_ascii_case(AUTO) => Ok(None),
            Some(Value::Number(n)) if n.as_u64().is_some_and(|v| v > 0) => {
                Ok(n.as_u64().map(|v| v as usize))
            }
            Some(other) => Err(type_error(key, "\"auto\" or a positive integer", other)),
        }
    }

    /// One model token, or a list of tokens.
    pub fn models(&self, key: &str, default: ModelKind) -> Result<Vec<ModelKind>, AppError> {
        self.str_list_or(key, vec![default.token().to_string()])?
            .iter()
            .map(|s| s.parse())
            .collect()
    }

    /// Axis options `<axis>_min`, `<axis>_max`, `<axis>_ticks_number`.
    pub fn axis(
        &self,
        axis: &str,
        default_min: Bound,
        allow_negative: bool,
    ) -> Result<AxisConfig, AppError> {
        Ok(AxisConfig {
            min: self.bound_or(&format!("{axis}_min"), default_min)?,
            max: self.bound_or(&format!("{axis}_max"), Bound::Auto)?,
            ticks: self.ticks_or(&format!("{axis}_ticks_number"), TickPolicy::Auto)?,
            allow_negative,
        })
    }
}

fn as_string(key: &str, value: &Value) -> Result<String, AppError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(type_error(key, "a string", other)),
    }
}

fn type_error(key: &str, expected: &str, found: &Value) -> AppError {
    AppError::invalid_input(format!("Parameter `{key}` must be {expected} (found: {found})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn bindings_parse_json_or_fall_back_to_strings() {
        let mut p = Params::new();
        p.bind("x_ticks_number=7").unwrap();
        p.bind("title=Pendel Messung").unwrap();
        p.bind(r#"y_column=["a","b"]"#).unwrap();
        p.bind("x_max=auto").unwrap();

        assert_eq!(p.ticks_or("x_ticks_number", TickPolicy::Auto).unwrap(), TickPolicy::Count(7));
        assert_eq!(p.str("title").unwrap(), "Pendel Messung");
        assert_eq!(p.str_list("y_column").unwrap(), vec!["a", "b"]);
        assert_eq!(p.bound_or("x_max", Bound::Value(1.0)).unwrap(), Bound::Auto);
    }

    #[test]
    fn single_string_is_a_one_element_list() {
        let mut p = Params::new();
        p.set("y_column", json!("T"));
        assert_eq!(p.str_list("y_column").unwrap(), vec!["T"]);
    }

    #[test]
    fn negative_tick_count_is_invalid_input() {
        let mut p = Params::new();
        p.set("x_ticks_number", json!(-3));
        let err = p.ticks_or("x_ticks_number", TickPolicy::Auto).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn auto_is_never_a_number() {
        let mut p = Params::new();
        p.set("x_min", json!("0.5"));
        assert!(p.bound_or("x_min", Bound::Auto).is_err());
        p.set("x_min", json!(0.5));
        assert_eq!(p.bound_or("x_min", Bound::Auto).unwrap(), Bound::Value(0.5));
    }

    #[test]
    fn model_lists_reject_unknown_tokens() {
        let mut p = Params::new();
        p.set("model_type", json!(["linear", "quadratic"]));
        let err = p.models("model_type", ModelKind::None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidModel);
    }

    #[test]
    fn later_files_and_bindings_override() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.json");
        let second = dir.path().join("b.json");
        writeln!(File::create(&first).unwrap(), r#"{{"title": "one", "bins": 4}}"#).unwrap();
        writeln!(File::create(&second).unwrap(), r#"{{"title": "two"}}"#).unwrap();

        let p = Params::load(&[first, second], &["bins=auto".to_string()]).unwrap();
        assert_eq!(p.str("title").unwrap(), "two");
        assert_eq!(p.count_or_auto("bins").unwrap(), None);
    }

    #[test]
    fn missing_required_parameter_is_reported_by_name() {
        let err = Params::new().str("data_path").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("data_path"));
    }
}
