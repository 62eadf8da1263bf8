// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Conversion of single JSON values into interpreted, source-carrying values.

use num::BigUint;
use serde_json::Value;

use massa_scenario_exports::ScenarioError;
use massa_scenario_models::address::ADDRESS_LENGTH;
use massa_scenario_models::{Check, CheckValueList, Parsed};

use super::{parse_error, Parser};

/// Prefixes a parse error with what was being parsed
pub(crate) fn context(message: &str) -> impl Fn(ScenarioError) -> ScenarioError + '_ {
    move |err| parse_error(format!("{}: {}", message, err))
}

/// `"*"`
pub(crate) fn is_star(value: &Value) -> bool {
    value.as_str() == Some("*")
}

pub(crate) fn parse_string(value: &Value) -> Result<String, ScenarioError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| parse_error("not a string value".to_string()))
}

pub(crate) fn parse_bool(value: &Value) -> Result<bool, ScenarioError> {
    value
        .as_bool()
        .ok_or_else(|| parse_error("not a bool value".to_string()))
}

pub(crate) fn parse_string_list(value: &Value) -> Result<Vec<String>, ScenarioError> {
    let list = value
        .as_array()
        .ok_or_else(|| parse_error("not a JSON list".to_string()))?;
    list.iter().map(parse_string).collect()
}

/// Text of a number expression; plain JSON numbers are accepted as well
fn expression_text(value: &Value) -> Result<String, ScenarioError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        _ => Err(parse_error("not a string value".to_string())),
    }
}

impl Parser {
    /// A string expression
    pub(crate) fn bytes_from_string(&self, value: &Value) -> Result<Parsed<Vec<u8>>, ScenarioError> {
        let text = parse_string(value)?;
        let bytes = self.interpreter.interpret_string(&text)?;
        Ok(Parsed::new(bytes, value.clone()))
    }

    /// Any expression, lists and maps are concatenated
    pub(crate) fn bytes_from_tree(&self, value: &Value) -> Result<Parsed<Vec<u8>>, ScenarioError> {
        let bytes = self.interpreter.interpret_sub_tree(value)?;
        Ok(Parsed::new(bytes, value.clone()))
    }

    pub(crate) fn big_uint(&self, value: &Value) -> Result<Parsed<BigUint>, ScenarioError> {
        let text = expression_text(value)?;
        let bytes = self.interpreter.interpret_string(&text)?;
        Ok(Parsed::new(BigUint::from_bytes_be(&bytes), value.clone()))
    }

    pub(crate) fn uint64(&self, value: &Value) -> Result<Parsed<u64>, ScenarioError> {
        let text = expression_text(value)?;
        let bytes = self.interpreter.interpret_string(&text)?;
        let significant: Vec<u8> = bytes.iter().copied().skip_while(|byte| *byte == 0).collect();
        if significant.len() > 8 {
            return Err(parse_error(format!("value too large for uint64: {}", text)));
        }
        let value_u64 = significant
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
        Ok(Parsed::new(value_u64, value.clone()))
    }

    /// 32-byte address expression
    pub(crate) fn account_address(&self, value: &Value) -> Result<Parsed<Vec<u8>>, ScenarioError> {
        let address = self.bytes_from_string(value)?;
        if address.value.len() != ADDRESS_LENGTH {
            return Err(parse_error(
                "account address is not 32 bytes in length".to_string(),
            ));
        }
        Ok(address)
    }

    pub(crate) fn sub_tree_list(&self, value: &Value) -> Result<Vec<Parsed<Vec<u8>>>, ScenarioError> {
        let list = value
            .as_array()
            .ok_or_else(|| parse_error("not a JSON list".to_string()))?;
        list.iter().map(|item| self.bytes_from_tree(item)).collect()
    }

    pub(crate) fn check_bytes(&self, value: &Value) -> Result<Check<Vec<u8>>, ScenarioError> {
        if is_star(value) {
            return Ok(Check::Star);
        }
        let parsed = self.bytes_from_tree(value)?;
        Ok(Check::value(parsed.value, parsed.original))
    }

    pub(crate) fn check_big_uint(&self, value: &Value) -> Result<Check<BigUint>, ScenarioError> {
        if is_star(value) {
            return Ok(Check::Star);
        }
        let parsed = self.big_uint(value)?;
        Ok(Check::value(parsed.value, parsed.original))
    }

    pub(crate) fn check_uint64(&self, value: &Value) -> Result<Check<u64>, ScenarioError> {
        if is_star(value) {
            return Ok(Check::Star);
        }
        let parsed = self.uint64(value)?;
        Ok(Check::value(parsed.value, parsed.original))
    }

    /// `"*"`, a list of expected values, or a single value; `""` is the empty list
    pub(crate) fn check_value_list(&self, value: &Value) -> Result<CheckValueList, ScenarioError> {
        if is_star(value) {
            return Ok(Check::Star);
        }
        if let Some(list) = value.as_array() {
            let checks = list
                .iter()
                .map(|item| self.check_bytes(item))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Check::value(checks, value.clone()));
        }
        if value.as_str() == Some("") {
            return Ok(Check::value(Vec::new(), value.clone()));
        }
        let single = self.check_bytes(value)?;
        Ok(Check::value(vec![single], value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::file_resolver::DefaultFileResolver;

    fn parser() -> Parser {
        Parser::new(vec![5, 0], Box::new(DefaultFileResolver::new()))
    }

    #[test]
    fn test_numbers_accept_json_numbers() {
        let parser = parser();
        assert_eq!(parser.uint64(&json!(12)).unwrap().value, 12);
        assert_eq!(parser.uint64(&json!("0x0000000000000001")).unwrap().value, 1);
        assert_eq!(
            parser.uint64(&json!("0x010000000000000000")).unwrap_err().to_string(),
            "value too large for uint64: 0x010000000000000000"
        );
        assert_eq!(
            parser.big_uint(&json!("1,000,000")).unwrap().value,
            BigUint::from(1_000_000u32)
        );
    }

    #[test]
    fn test_checks() {
        let parser = parser();
        assert!(parser.check_uint64(&json!("*")).unwrap().is_star());
        let check = parser.check_bytes(&json!("str:abc")).unwrap();
        assert!(check.check(b"abc".as_slice()));
        assert_eq!(check.original_str(), "str:abc");

        let empty = parser.check_value_list(&json!("")).unwrap();
        assert!(empty.check_list(&[]));
        let single = parser.check_value_list(&json!("str:x")).unwrap();
        assert!(single.check_list(&[b"x".to_vec()]));
        let list = parser.check_value_list(&json!(["u8:1", "*"])).unwrap();
        assert!(list.check_list(&[vec![1], vec![9, 9]]));
    }

    #[test]
    fn test_account_address_length() {
        let parser = parser();
        assert!(parser.account_address(&json!("address:owner")).is_ok());
        assert_eq!(
            parser.account_address(&json!("str:short")).unwrap_err().to_string(),
            "account address is not 32 bytes in length"
        );
    }
}
