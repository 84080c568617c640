//! Column value coercion
//!
//! Converts loosely typed input into the declared [`FieldKind`] of a column.
//! Values that cannot be represented fall back to the column default instead
//! of failing the write.

use crate::types::{FieldKind, FieldValue};
use crate::validate::{sanitize_email, sanitize_text_field};

/// Coerce `value` to `kind`, falling back to `default`.
///
/// Integer columns hold non-negative whole numbers only: fractional,
/// negative or non-numeric input yields the default. Null text stays null so
/// nullable columns can be cleared.
pub fn coerce_value(kind: FieldKind, value: &FieldValue, default: &FieldValue) -> FieldValue {
    match kind {
        FieldKind::Text => match value {
            FieldValue::Null => FieldValue::Null,
            FieldValue::Text(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        },
        FieldKind::Integer => value
            .as_i64()
            .filter(|i| *i >= 0)
            .map(FieldValue::Integer)
            .unwrap_or_else(|| default.clone()),
        FieldKind::Float => value
            .as_f64()
            .map(FieldValue::Float)
            .unwrap_or_else(|| default.clone()),
    }
}

/// Coerce and scrub user-supplied input for `column`.
///
/// Text is sanitized (`email` columns keep only address characters), numbers
/// follow [`coerce_value`].
pub fn sanitize_value(
    column: &str,
    kind: FieldKind,
    value: &FieldValue,
    default: &FieldValue,
) -> FieldValue {
    match kind {
        FieldKind::Text => match value {
            FieldValue::Null => FieldValue::Null,
            other => {
                let text = other.to_string();
                if column.eq_ignore_ascii_case("email") {
                    FieldValue::Text(sanitize_email(&text))
                } else {
                    FieldValue::Text(sanitize_text_field(&text))
                }
            }
        },
        FieldKind::Integer | FieldKind::Float => coerce_value(kind, value, default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_falls_back_to_default() {
        let default = FieldValue::Integer(0);
        assert_eq!(
            coerce_value(FieldKind::Integer, &FieldValue::from("12"), &default),
            FieldValue::Integer(12)
        );
        assert_eq!(
            coerce_value(FieldKind::Integer, &FieldValue::from("twelve"), &default),
            default
        );
        assert_eq!(
            coerce_value(FieldKind::Integer, &FieldValue::from(-4), &default),
            default
        );
        assert_eq!(
            coerce_value(FieldKind::Integer, &FieldValue::from(2.5), &default),
            default
        );
        assert_eq!(
            coerce_value(FieldKind::Integer, &FieldValue::Null, &default),
            default
        );
    }

    #[test]
    fn float_parses_text() {
        let default = FieldValue::Float(1.0);
        assert_eq!(
            coerce_value(FieldKind::Float, &FieldValue::from("2.25"), &default),
            FieldValue::Float(2.25)
        );
        assert_eq!(
            coerce_value(FieldKind::Float, &FieldValue::from(3), &default),
            FieldValue::Float(3.0)
        );
        assert_eq!(
            coerce_value(FieldKind::Float, &FieldValue::from("n/a"), &default),
            default
        );
    }

    #[test]
    fn text_renders_numbers_and_keeps_null() {
        let default = FieldValue::from("");
        assert_eq!(
            coerce_value(FieldKind::Text, &FieldValue::from(7), &default),
            FieldValue::from("7")
        );
        assert_eq!(
            coerce_value(FieldKind::Text, &FieldValue::Null, &default),
            FieldValue::Null
        );
    }

    #[test]
    fn sanitize_scrubs_by_column() {
        let default = FieldValue::from("");
        assert_eq!(
            sanitize_value("email", FieldKind::Text, &FieldValue::from(" jane@example.com "), &default),
            FieldValue::from("jane@example.com")
        );
        assert_eq!(
            sanitize_value("first_name", FieldKind::Text, &FieldValue::from("<i>Jane</i>\n"), &default),
            FieldValue::from("Jane")
        );
        assert_eq!(
            sanitize_value("email_count", FieldKind::Integer, &FieldValue::from("x"), &FieldValue::Integer(0)),
            FieldValue::Integer(0)
        );
    }
}
