//! Input coercion and validation.
//!
//! Inputs arrive as loosely typed JSON. Numbers and strings that parse as
//! finite numbers are accepted; everything else is rejected with the
//! position of the offending element.

use serde_json::Value;

use crate::error::{Result, ValidationError};

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read a single value as a finite number.
pub fn coerce(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// A non-empty array of numeric-coercible values.
pub fn numeric_sequence(value: &Value) -> Result<Vec<f64>> {
    let Value::Array(items) = value else {
        return Err(ValidationError::NotASequence(kind_of(value)));
    };
    if items.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            coerce(item).ok_or_else(|| ValidationError::NonNumeric {
                index,
                value: item.to_string(),
            })
        })
        .collect()
}

/// A present, non-null, non-empty numeric target.
pub fn search_target(target: Option<&Value>) -> Result<f64> {
    match target {
        None | Some(Value::Null) => Err(ValidationError::MissingTarget),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ValidationError::MissingTarget),
        Some(value) => {
            coerce(value).ok_or_else(|| ValidationError::NonNumericTarget(value.to_string()))
        }
    }
}

/// Same rules for callers that already hold numbers.
pub fn numbers(input: &[f64]) -> Result<()> {
    if input.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    match input.iter().position(|n| !n.is_finite()) {
        Some(index) => Err(ValidationError::NonNumeric {
            index,
            value: input[index].to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        assert_eq!(numeric_sequence(&json!([3, "1.5", -2])).unwrap(), vec![3.0, 1.5, -2.0]);
    }

    #[test]
    fn rejects_non_arrays() {
        assert_eq!(numeric_sequence(&json!("5,3")), Err(ValidationError::NotASequence("a string")));
        assert_eq!(numeric_sequence(&json!(null)), Err(ValidationError::NotASequence("null")));
    }

    #[test]
    fn rejects_empty_and_non_numeric() {
        assert_eq!(numeric_sequence(&json!([])), Err(ValidationError::EmptyInput));
        assert!(matches!(
            numeric_sequence(&json!(["a", "b"])),
            Err(ValidationError::NonNumeric { index: 0, .. })
        ));
        assert!(matches!(
            numeric_sequence(&json!([1, true])),
            Err(ValidationError::NonNumeric { index: 1, .. })
        ));
        assert!(matches!(
            numeric_sequence(&json!([1, ""])),
            Err(ValidationError::NonNumeric { index: 1, .. })
        ));
    }

    #[test]
    fn target_rules() {
        assert_eq!(search_target(None), Err(ValidationError::MissingTarget));
        assert_eq!(search_target(Some(&json!(null))), Err(ValidationError::MissingTarget));
        assert_eq!(search_target(Some(&json!(" "))), Err(ValidationError::MissingTarget));
        assert_eq!(search_target(Some(&json!("7"))), Ok(7.0));
        assert!(matches!(
            search_target(Some(&json!({"v": 1}))),
            Err(ValidationError::NonNumericTarget(_))
        ));
    }

    #[test]
    fn typed_numbers_reject_nan() {
        assert!(numbers(&[1.0, 2.0]).is_ok());
        assert_eq!(numbers(&[]), Err(ValidationError::EmptyInput));
        assert!(matches!(
            numbers(&[1.0, f64::NAN]),
            Err(ValidationError::NonNumeric { index: 1, .. })
        ));
    }
}
