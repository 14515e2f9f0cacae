//! Keyword parameters for operation dispatch.
//!
//! Callers hand the dispatcher a loosely typed map of JSON values.
//! [`OperationArgs::validate`] checks that map against an
//! [`OperationSpec`] and produces typed [`ParamValue`]s, so handlers never see
//! a missing, extra, or mistyped argument.
//!
//! # Rules
//!
//! - Every declared parameter must be supplied
//! - No undeclared parameter may be supplied
//! - JSON types must match the declared [`ParamType`]; integers widen to
//!   floats, nothing else converts
//!
//! ```rust
//! use std::collections::HashMap;
//! use rig_core::interface::{OperationSpec, ParamSpec, ParamType};
//! use rig_core::parameter::OperationArgs;
//!
//! static MOVE: OperationSpec =
//!     OperationSpec::new("move_to", &[ParamSpec::new("position", ParamType::Float)]);
//!
//! let mut params = HashMap::new();
//! params.insert("position".to_string(), serde_json::json!(12));
//! let args = OperationArgs::validate(&MOVE, params).unwrap();
//! assert_eq!(args.float("position").unwrap(), 12.0);
//! ```

use std::collections::HashMap;

use anyhow::anyhow;
use serde::Serialize;
use serde_json::Value;

use crate::error::{RigError, RigResult};
use crate::interface::{OperationSpec, ParamType};

/// A validated, typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer value.
    Int(i64),
    /// Float value (possibly widened from an integer).
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// String value.
    Str(String),
}

impl ParamValue {
    fn coerce(ty: ParamType, value: &Value) -> Option<Self> {
        match (ty, value) {
            (ParamType::Int, Value::Number(n)) => n.as_i64().map(ParamValue::Int),
            (ParamType::Float, Value::Number(n)) => n.as_f64().map(ParamValue::Float),
            (ParamType::Bool, Value::Bool(b)) => Some(ParamValue::Bool(*b)),
            (ParamType::Str, Value::String(s)) => Some(ParamValue::Str(s.clone())),
            _ => None,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validated arguments for one operation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperationArgs {
    values: HashMap<String, ParamValue>,
}

impl OperationArgs {
    /// Empty argument set, for parameterless operations.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check `params` against `spec` and convert to typed values.
    ///
    /// Reports the first violation as [`RigError::InvalidParameters`].
    /// Undeclared keys are reported before missing ones, and both in sorted
    /// order so the message is stable.
    pub fn validate(spec: &OperationSpec, params: HashMap<String, Value>) -> RigResult<Self> {
        let invalid = |reason: String| RigError::InvalidParameters {
            operation: spec.name.to_string(),
            reason,
        };

        let mut undeclared: Vec<&String> = params
            .keys()
            .filter(|key| spec.param(key).is_none())
            .collect();
        undeclared.sort();
        if let Some(key) = undeclared.first() {
            return Err(invalid(format!("unexpected parameter '{}'", key)));
        }

        let mut values = HashMap::with_capacity(spec.params.len());
        for declared in spec.params {
            let raw = params
                .get(declared.name)
                .ok_or_else(|| invalid(format!("missing parameter '{}'", declared.name)))?;
            let value = ParamValue::coerce(declared.ty, raw).ok_or_else(|| {
                invalid(format!(
                    "parameter '{}' expects {}, got {}",
                    declared.name,
                    declared.ty,
                    json_kind(raw)
                ))
            })?;
            values.insert(declared.name.to_string(), value);
        }

        Ok(Self { values })
    }

    /// Raw typed value.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Integer argument.
    pub fn int(&self, name: &str) -> anyhow::Result<i64> {
        match self.values.get(name) {
            Some(ParamValue::Int(v)) => Ok(*v),
            _ => Err(anyhow!("no int argument '{}'", name)),
        }
    }

    /// Float argument.
    pub fn float(&self, name: &str) -> anyhow::Result<f64> {
        match self.values.get(name) {
            Some(ParamValue::Float(v)) => Ok(*v),
            _ => Err(anyhow!("no float argument '{}'", name)),
        }
    }

    /// Boolean argument.
    pub fn bool(&self, name: &str) -> anyhow::Result<bool> {
        match self.values.get(name) {
            Some(ParamValue::Bool(v)) => Ok(*v),
            _ => Err(anyhow!("no bool argument '{}'", name)),
        }
    }

    /// String argument.
    pub fn str(&self, name: &str) -> anyhow::Result<&str> {
        match self.values.get(name) {
            Some(ParamValue::Str(v)) => Ok(v.as_str()),
            _ => Err(anyhow!("no str argument '{}'", name)),
        }
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for parameterless calls.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::ParamSpec;
    use serde_json::json;

    static SET_LEVEL: OperationSpec =
        OperationSpec::new("set_level", &[ParamSpec::new("level", ParamType::Int)]);
    static LABEL: OperationSpec = OperationSpec::new(
        "label",
        &[
            ParamSpec::new("text", ParamType::Str),
            ParamSpec::new("blink", ParamType::Bool),
        ],
    );

    fn params(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn reason(err: RigError) -> String {
        match err {
            RigError::InvalidParameters { reason, .. } => reason,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_valid_int() {
        let args = OperationArgs::validate(&SET_LEVEL, params(&[("level", json!(50))])).unwrap();
        assert_eq!(args.int("level").unwrap(), 50);
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_missing_parameter() {
        let err = OperationArgs::validate(&SET_LEVEL, HashMap::new()).unwrap_err();
        assert_eq!(reason(err), "missing parameter 'level'");
    }

    #[test]
    fn test_undeclared_parameter() {
        let err = OperationArgs::validate(
            &SET_LEVEL,
            params(&[("level", json!(1)), ("ramp", json!(true))]),
        )
        .unwrap_err();
        assert_eq!(reason(err), "unexpected parameter 'ramp'");
    }

    #[test]
    fn test_float_does_not_narrow_to_int() {
        let err =
            OperationArgs::validate(&SET_LEVEL, params(&[("level", json!(50.5))])).unwrap_err();
        assert_eq!(reason(err), "parameter 'level' expects int, got float");
    }

    #[test]
    fn test_string_and_bool() {
        let args = OperationArgs::validate(
            &LABEL,
            params(&[("text", json!("hello")), ("blink", json!(false))]),
        )
        .unwrap();
        assert_eq!(args.str("text").unwrap(), "hello");
        assert!(!args.bool("blink").unwrap());
        assert!(args.int("text").is_err());
    }

    #[test]
    fn test_null_rejected() {
        let err = OperationArgs::validate(
            &LABEL,
            params(&[("text", Value::Null), ("blink", json!(true))]),
        )
        .unwrap_err();
        assert_eq!(reason(err), "parameter 'text' expects str, got null");
    }
}
