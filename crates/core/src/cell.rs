use serde_json::Value;

/// Returns the display text of a response cell, verbatim.
///
/// Strings are shown without quotes and numbers with their JSON text, so a
/// value like `8.881784197001252e-16` is never reformatted or rounded.
#[must_use]
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Interprets a response cell as a number.
///
/// The service returns some results as numeric strings (`"0.6666666666666667"`)
/// and others as JSON numbers; both are accepted.
#[must_use]
pub fn cell_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn text_keeps_numbers_verbatim() {
        assert_eq!(cell_text(&json!(8.881_784_197_001_252e-16)), "8.881784197001252e-16");
        assert_eq!(cell_text(&json!(55)), "55");
        assert_eq!(cell_text(&json!("2.23606797749978980505")), "2.23606797749978980505");
    }

    #[test]
    fn null_is_blank() {
        assert_eq!(cell_text(&Value::Null), "");
    }

    #[test]
    fn numbers_parse_from_strings_and_numbers() {
        assert_relative_eq!(cell_number(&json!("0.5")).unwrap(), 0.5);
        assert_relative_eq!(cell_number(&json!(-2)).unwrap(), -2.0);
        assert!(cell_number(&json!("abc")).is_none());
        assert!(cell_number(&json!([1])).is_none());
    }
}
