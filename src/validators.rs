//! Form value validation and casting against a per-field schema.
//!
//! Values arrive from form inputs as loosely typed JSON (numbers often as
//! strings). The schema and the values use the same key names.

use regex::Regex;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Constraint for a single form field
#[derive(Debug, Clone)]
pub enum FieldRule {
    Text {
        min_len: usize,
        max_len: Option<usize>,
        pattern: Option<Regex>,
        required: bool,
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
        required: bool,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
        required: bool,
    },
    OneOf {
        allowed: Vec<String>,
        required: bool,
    },
}

impl FieldRule {
    /// Required text of `min_len..=max_len` characters
    pub fn text(min_len: usize, max_len: Option<usize>) -> Self {
        Self::Text {
            min_len,
            max_len,
            pattern: None,
            required: true,
        }
    }

    /// Required whole number within the given bounds
    pub fn integer(min: Option<i64>, max: Option<i64>) -> Self {
        Self::Integer {
            min,
            max,
            required: true,
        }
    }

    /// Required number within the given bounds
    pub fn number(min: Option<f64>, max: Option<f64>) -> Self {
        Self::Number {
            min,
            max,
            required: true,
        }
    }

    /// Required value out of a fixed set
    pub fn one_of<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf {
            allowed: allowed.into_iter().map(Into::into).collect(),
            required: true,
        }
    }

    /// Attach a regex the text must match. No-op for non-text rules.
    pub fn with_pattern(self, pattern: &str) -> Result<Self, regex::Error> {
        let compiled = Regex::new(pattern)?;
        Ok(match self {
            Self::Text {
                min_len,
                max_len,
                required,
                ..
            } => Self::Text {
                min_len,
                max_len,
                pattern: Some(compiled),
                required,
            },
            other => other,
        })
    }

    /// Allow the field to be left empty
    pub fn optional(mut self) -> Self {
        match &mut self {
            Self::Text { required, .. }
            | Self::Integer { required, .. }
            | Self::Number { required, .. }
            | Self::OneOf { required, .. } => *required = false,
        }
        self
    }

    fn required(&self) -> bool {
        match self {
            Self::Text { required, .. }
            | Self::Integer { required, .. }
            | Self::Number { required, .. }
            | Self::OneOf { required, .. } => *required,
        }
    }

    /// Check one value, returning the message to show on failure
    pub fn check(&self, value: &Value) -> Result<(), String> {
        if is_empty(value) {
            return if self.required() {
                Err("This field is required".to_string())
            } else {
                Ok(())
            };
        }

        match self {
            Self::Text {
                min_len,
                max_len,
                pattern,
                ..
            } => {
                let text = as_text(value);
                let len = text.trim().chars().count();
                if len < *min_len {
                    return Err(format!("Must be at least {} characters", min_len));
                }
                if let Some(max) = max_len {
                    if len > *max {
                        return Err(format!("Must be at most {} characters", max));
                    }
                }
                if let Some(re) = pattern {
                    if !re.is_match(text.trim()) {
                        return Err("Invalid format".to_string());
                    }
                }
                Ok(())
            }
            Self::Integer { min, max, .. } => {
                let n = as_i64(value).ok_or_else(|| "Must be a whole number".to_string())?;
                check_bounds(n, *min, *max)
            }
            Self::Number { min, max, .. } => {
                let n = as_f64(value).ok_or_else(|| "Must be a number".to_string())?;
                check_bounds(n, *min, *max)
            }
            Self::OneOf { allowed, .. } => {
                let text = as_text(value);
                if allowed.iter().any(|a| a == text.trim()) {
                    Ok(())
                } else {
                    Err(format!("Must be one of: {}", allowed.join(", ")))
                }
            }
        }
    }

    /// Coerce a value to this rule's type; values that cannot be coerced
    /// are returned unchanged
    pub fn cast(&self, value: &Value) -> Value {
        if value.is_null() {
            return Value::Null;
        }
        match self {
            Self::Text { .. } | Self::OneOf { .. } => Value::String(as_text(value).trim().to_string()),
            Self::Integer { .. } => as_i64(value)
                .map(|n| Value::Number(n.into()))
                .unwrap_or_else(|| value.clone()),
            Self::Number { .. } => as_f64(value)
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| value.clone()),
        }
    }
}

/// Ordered set of field rules
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    rules: BTreeMap<String, FieldRule>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, rule: FieldRule) -> Self {
        self.rules.insert(name.to_string(), rule);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.rules.get(name)
    }
}

/// Outcome of validating a whole form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValidation {
    pub has_errors: bool,
    pub errors: BTreeMap<String, String>,
}

/// Validate every supplied value against the rule of the same name.
/// A key with no rule in the schema is reported as an error.
pub fn validate_values(values: &Map<String, Value>, schema: &FormSchema) -> FormValidation {
    let mut errors = BTreeMap::new();
    for (key, value) in values {
        let outcome = match schema.get(key) {
            Some(rule) => rule.check(value),
            None => Err(format!("Unknown field '{}'", key)),
        };
        if let Err(message) = outcome {
            errors.insert(key.clone(), message);
        }
    }
    FormValidation {
        has_errors: !errors.is_empty(),
        errors,
    }
}

/// Cast every supplied value to its rule's type. Keys with no rule are dropped.
pub fn cast_values(values: &Map<String, Value>, schema: &FormSchema) -> Map<String, Value> {
    values
        .iter()
        .filter_map(|(key, value)| schema.get(key).map(|rule| (key.clone(), rule.cast(value))))
        .collect()
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok().filter(|f: &f64| f.is_finite()),
        _ => None,
    }
}

fn check_bounds<N: PartialOrd + std::fmt::Display>(
    n: N,
    min: Option<N>,
    max: Option<N>,
) -> Result<(), String> {
    if let Some(min) = min {
        if n < min {
            return Err(format!("Must be at least {}", min));
        }
    }
    if let Some(max) = max {
        if n > max {
            return Err(format!("Must be at most {}", max));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn review_schema() -> FormSchema {
        FormSchema::new()
            .field("position", FieldRule::text(2, Some(32)))
            .field("salary", FieldRule::integer(Some(0), None))
            .field("currency", FieldRule::one_of(["GBP", "USD", "EUR", "JPY", "CNY"]))
            .field("duration_years", FieldRule::number(Some(0.0), Some(60.0)))
            .field(
                "url",
                FieldRule::text(0, None)
                    .with_pattern(r"^https?://")
                    .unwrap()
                    .optional(),
            )
    }

    fn values(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn test_valid_form_has_no_errors() {
        let result = validate_values(
            &values(json!({
                "position": "Engineer",
                "salary": "45000",
                "currency": "GBP",
                "duration_years": 2.5,
                "url": ""
            })),
            &review_schema(),
        );
        assert!(!result.has_errors);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_collects_every_error() {
        let result = validate_values(
            &values(json!({
                "position": "E",
                "salary": "-5",
                "currency": "BTC",
                "duration_years": "lots",
                "url": "ftp://example.com",
                "nickname": "x"
            })),
            &review_schema(),
        );
        assert!(result.has_errors);
        assert_eq!(result.errors.len(), 6);
        assert_eq!(result.errors["position"], "Must be at least 2 characters");
        assert_eq!(result.errors["salary"], "Must be at least 0");
        assert!(result.errors["currency"].starts_with("Must be one of"));
        assert_eq!(result.errors["duration_years"], "Must be a number");
        assert_eq!(result.errors["url"], "Invalid format");
        assert!(result.errors["nickname"].contains("Unknown field"));
    }

    #[test]
    fn test_required_field() {
        let result = validate_values(&values(json!({"position": "  "})), &review_schema());
        assert_eq!(result.errors["position"], "This field is required");
    }

    #[test]
    fn test_integer_rejects_fractions() {
        let rule = FieldRule::integer(None, None);
        assert!(rule.check(&json!("4.5")).is_err());
        assert!(rule.check(&json!(4.0)).is_ok());
    }

    #[test]
    fn test_cast_values() {
        let cast = cast_values(
            &values(json!({
                "position": "  Engineer ",
                "salary": "42",
                "duration_years": "1.5",
                "currency": "GBP",
                "nickname": "dropped"
            })),
            &review_schema(),
        );
        assert_eq!(cast["position"], json!("Engineer"));
        assert_eq!(cast["salary"], json!(42));
        assert_eq!(cast["duration_years"], json!(1.5));
        assert_eq!(cast["currency"], json!("GBP"));
        assert!(!cast.contains_key("nickname"));
    }

    #[test]
    fn test_cast_keeps_uncastable_values() {
        let cast = cast_values(&values(json!({"salary": "lots"})), &review_schema());
        assert_eq!(cast["salary"], json!("lots"));
    }
}
