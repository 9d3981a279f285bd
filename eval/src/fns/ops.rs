//! Value-level implementations of the standard operators.

use core::cmp::Ordering;

use crate::Value;

pub(super) fn add(lhs: &Value, rhs: &Value) -> Value {
    Value::Number(lhs.to_number() + rhs.to_number())
}

pub(super) fn numeric(lhs: &Value, rhs: &Value, op: fn(f64, f64) -> f64) -> Value {
    Value::Number(op(lhs.to_number(), rhs.to_number()))
}

pub(super) fn concat(lhs: &Value, rhs: &Value) -> Value {
    Value::Str(format!("{lhs}{rhs}"))
}

/// Compares values: strings are compared lexicographically, everything else is compared
/// numerically. Returns `None` if the values are incomparable (e.g., one of them is NaN).
pub(super) fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Str(lhs), Value::Str(rhs)) => Some(lhs.cmp(rhs)),
        _ => lhs.to_number().partial_cmp(&rhs.to_number()),
    }
}

pub(super) fn compare_with(lhs: &Value, rhs: &Value, matches: fn(Ordering) -> bool) -> Value {
    Value::from(compare(lhs, rhs).map_or(false, matches))
}

/// Checks whether `needle` is contained in `haystack`: among the record fields,
/// or as a substring.
pub(super) fn contains(needle: &Value, haystack: &Value) -> bool {
    match (needle, haystack) {
        (_, Value::Record(fields)) => fields.values().any(|value| value == needle),
        (Value::Str(needle), Value::Str(haystack)) => haystack.contains(needle.as_str()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_coerces_operands() {
        assert_eq!(add(&Value::from("2"), &Value::Number(3.0)), Value::Number(5.0));
        assert_eq!(
            numeric(&Value::from("6"), &Value::from("4"), |x, y| x - y),
            Value::Number(2.0)
        );
        let sum = add(&Value::Void, &Value::Number(1.0));
        assert!(sum.to_number().is_nan());
    }

    #[test]
    fn concatenation() {
        assert_eq!(
            concat(&Value::from("x = "), &Value::Number(1.5)),
            Value::from("x = 1.5")
        );
        assert_eq!(concat(&Value::Number(1.0), &Value::from(true)), Value::from("11"));
    }

    #[test]
    fn comparisons() {
        assert_eq!(compare(&Value::from("abc"), &Value::from("abd")), Some(Ordering::Less));
        assert_eq!(compare(&Value::from("10"), &Value::Number(9.0)), Some(Ordering::Greater));
        assert_eq!(compare(&Value::Number(f64::NAN), &Value::Number(1.0)), None);
        assert_eq!(
            compare_with(&Value::Number(1.0), &Value::Number(1.0), Ordering::is_le),
            Value::from(true)
        );
    }

    #[test]
    fn membership() {
        let record = Value::record([("a", 1.0), ("b", 2.0)]);
        assert!(contains(&Value::Number(2.0), &record));
        assert!(!contains(&Value::Number(3.0), &record));
        assert!(contains(&Value::from("ell"), &Value::from("hello")));
        assert!(!contains(&Value::Number(1.0), &Value::Number(1.0)));
    }
}
