//! Request validation.
//!
//! Incoming payloads and query strings are turned into typed values here,
//! before any service code runs. Failures carry one message per offending
//! field.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field-level problem found in one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    pub fn require_non_empty(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("{} should not be empty", field));
        }
    }

    pub fn max_length(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(
                field,
                format!("{} must be shorter than or equal to {} characters", field, max),
            );
        }
    }

    pub fn min<T: PartialOrd + fmt::Display>(&mut self, field: &str, value: T, min: T) {
        if value < min {
            self.add(field, format!("{} must not be less than {}", field, min));
        }
    }
}

/// Implemented by decoded request bodies that need checks beyond their shape.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Raw query-string parameters, coerced field by field.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(HashMap<String, String>);

impl From<HashMap<String, String>> for QueryParams {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for QueryParams {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl QueryParams {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// A string parameter; empty values count as absent.
    pub fn string(&self, name: &str) -> Option<String> {
        self.0
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
    }

    /// A whole number no smaller than `min`.
    pub fn integer(&self, errors: &mut ValidationErrors, name: &str, min: u64) -> Option<u64> {
        let raw = self.string(name)?;
        match parse_number::<i64>(&raw) {
            Some(n) if n < 0 || (n as u64) < min => {
                errors.add(name, format!("{} must not be less than {}", name, min));
                None
            }
            Some(n) => Some(n as u64),
            None => {
                errors.add(name, format!("{} must be an integer number", name));
                None
            }
        }
    }

    /// A finite number no smaller than `min`.
    pub fn number(&self, errors: &mut ValidationErrors, name: &str, min: f64) -> Option<f64> {
        let raw = self.string(name)?;
        match parse_number::<f64>(&raw).filter(|n| n.is_finite()) {
            Some(n) if n < min => {
                errors.add(name, format!("{} must not be less than {}", name, min));
                None
            }
            Some(n) => Some(n),
            None => {
                errors.add(
                    name,
                    format!("{} must be a number conforming to the specified constraints", name),
                );
                None
            }
        }
    }
}

fn parse_number<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

/// Implemented by typed list queries built from raw query parameters.
pub trait FromQueryParams: Sized {
    fn from_query_params(params: &QueryParams) -> Result<Self, ValidationErrors>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_coercion() {
        let params = QueryParams::from([("page", "2"), ("limit", "abc"), ("zero", "0")]);
        let mut errors = ValidationErrors::new();

        assert_eq!(params.integer(&mut errors, "page", 1), Some(2));
        assert_eq!(params.integer(&mut errors, "limit", 1), None);
        assert_eq!(params.integer(&mut errors, "zero", 1), None);
        assert_eq!(params.integer(&mut errors, "missing", 1), None);

        assert!(errors.has_field("limit"));
        assert!(errors.has_field("zero"));
        assert!(!errors.has_field("missing"));
        assert_eq!(errors.errors().len(), 2);
    }

    #[test]
    fn test_fractional_page_rejected() {
        let params = QueryParams::from([("page", "1.5")]);
        let mut errors = ValidationErrors::new();
        assert_eq!(params.integer(&mut errors, "page", 1), None);
        assert_eq!(errors.errors()[0].message, "page must be an integer number");
    }

    #[test]
    fn test_number_coercion() {
        let params = QueryParams::from([("min", "12.5"), ("max", "-1"), ("bad", "NaN")]);
        let mut errors = ValidationErrors::new();

        assert_eq!(params.number(&mut errors, "min", 0.0), Some(12.5));
        assert_eq!(params.number(&mut errors, "max", 0.0), None);
        assert_eq!(params.number(&mut errors, "bad", 0.0), None);
        assert!(errors.has_field("max"));
        assert!(errors.has_field("bad"));
    }

    #[test]
    fn test_empty_string_is_absent() {
        let params = QueryParams::from([("difficulty", "")]);
        assert_eq!(params.string("difficulty"), None);
    }

    #[test]
    fn test_finish_and_display() {
        let ok = ValidationErrors::new().finish(5);
        assert_eq!(ok, Ok(5));

        let mut errors = ValidationErrors::new();
        errors.require_non_empty("title", "  ");
        errors.max_length("org_id", &"x".repeat(5), 3);
        let err = errors.finish(()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "title should not be empty; org_id must be shorter than or equal to 3 characters"
        );
    }
}
