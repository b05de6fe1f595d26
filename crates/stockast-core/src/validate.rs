use thiserror::Error;

/// A required request field was missing or blank
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} is required")]
pub struct ValidationError {
    pub field: &'static str,
}

/// Return the trimmed value of a required text field
///
/// Missing, empty, and whitespace-only values are all rejected.
pub fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_value_is_trimmed() {
        assert_eq!(required("text", Some("  AAPL earnings  ")), Ok("AAPL earnings"));
    }

    #[test]
    fn missing_value_names_the_field() {
        let err = required("query", None).unwrap_err();
        assert_eq!(err.to_string(), "query is required");
    }

    #[test]
    fn blank_value_is_rejected() {
        assert!(required("text", Some(" \n\t ")).is_err());
        assert!(required("text", Some("")).is_err());
    }
}
