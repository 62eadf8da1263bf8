// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Three-state expectations used by check steps and expected tx results.

use std::borrow::Borrow;

use crate::value::{original_to_json, original_to_string};

/// JSON as written in the scenario file
pub type Original = serde_json::Value;

/// An expected value.
///
/// `Unspecified` fields are never compared, `Star` matches anything and
/// `Value` must be equal to the actual value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Check<T> {
    /// field absent from the scenario
    #[default]
    Unspecified,
    /// `"*"`
    Star,
    /// exact expected value and its source
    Value(T, Original),
}

impl<T> Check<T> {
    /// Builds an exact expectation
    pub fn value(value: T, original: Original) -> Self {
        Check::Value(value, original)
    }

    /// Expectation of `value` as if the test author had written an empty string
    pub fn default_value(value: T) -> Self {
        Check::Value(value, Original::String(String::new()))
    }

    /// true if the field was absent
    pub fn is_unspecified(&self) -> bool {
        matches!(self, Check::Unspecified)
    }

    /// true for `"*"`
    pub fn is_star(&self) -> bool {
        matches!(self, Check::Star)
    }

    /// Expected value, if any
    pub fn expected(&self) -> Option<&T> {
        match self {
            Check::Value(value, _) => Some(value),
            _ => None,
        }
    }

    /// Compares against the actual value. Only `Value` can fail.
    pub fn check<Q>(&self, actual: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        match self {
            Check::Unspecified | Check::Star => true,
            Check::Value(expected, _) => expected.borrow() == actual,
        }
    }

    /// Source JSON, `""` for unspecified and `"*"` for star
    pub fn original(&self) -> Original {
        match self {
            Check::Unspecified => Original::String(String::new()),
            Check::Star => Original::String("*".to_string()),
            Check::Value(_, original) => original.clone(),
        }
    }

    /// Source text without the JSON quotes of strings
    pub fn original_str(&self) -> String {
        original_to_string(&self.original())
    }

    /// Source as JSON text
    pub fn original_json(&self) -> String {
        original_to_json(&self.original())
    }
}

/// Expected list of byte values, compared element by element
pub type CheckValueList = Check<Vec<Check<Vec<u8>>>>;

impl Check<Vec<Check<Vec<u8>>>> {
    /// Lengths must match and every element check must pass
    pub fn check_list(&self, actual: &[Vec<u8>]) -> bool {
        match self {
            Check::Unspecified | Check::Star => true,
            Check::Value(expected, _) => {
                expected.len() == actual.len()
                    && expected
                        .iter()
                        .zip(actual)
                        .all(|(check, value)| check.check(value.as_slice()))
            }
        }
    }

    /// JSON source of every element, comma separated
    pub fn elements_json(&self) -> String {
        match self {
            Check::Value(expected, _) => expected
                .iter()
                .map(|check| check.original_json())
                .collect::<Vec<_>>()
                .join(", "),
            other => other.original_json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_star_and_unspecified_always_match() {
        assert!(Check::<u64>::Star.check(&42u64));
        assert!(Check::<u64>::Unspecified.check(&0u64));
        assert!(Check::<Vec<u8>>::Star.check(b"anything".as_slice()));
    }

    #[test]
    fn test_value_check() {
        let check = Check::value(5u64, json!("5"));
        assert!(check.check(&5u64));
        assert!(!check.check(&6u64));
        assert_eq!(check.original_str(), "5");
        assert_eq!(check.original_json(), "\"5\"");
    }

    #[test]
    fn test_list_check() {
        let list: CheckValueList = Check::value(
            vec![Check::value(b"a".to_vec(), json!("str:a")), Check::Star],
            json!(["str:a", "*"]),
        );
        assert!(list.check_list(&[b"a".to_vec(), b"zzz".to_vec()]));
        assert!(!list.check_list(&[b"a".to_vec()]));
        assert!(!list.check_list(&[b"b".to_vec(), b"zzz".to_vec()]));
        assert_eq!(list.elements_json(), "\"str:a\", \"*\"");
    }
}
