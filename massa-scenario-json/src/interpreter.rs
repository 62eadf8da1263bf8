// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Turns value expressions of scenario files into bytes.
//!
//! ```text
//! ""                 empty
//! "1,000" / "0x0a"   unsigned numbers, minimal big-endian (hex keeps its zeros)
//! "-5" / "+5"        signed numbers, minimal two's complement
//! "u32:5" / "i8:-1"  fixed width numbers
//! "biguint:5"        length-prefixed number, "nested:" for any value
//! "str:abc"          raw text, also "''abc" and "``abc"
//! "address:owner"    32-byte user address, padded with '_', optional "#shard"
//! "sc:adder"         32-byte contract address carrying the VM type
//! "file:x.wasm"      file contents, "mxsc:x.mxsc.json" contract code
//! "keccak256:..."    hash of the nested expression
//! "a|b"              concatenation
//! ```
//! JSON lists and maps are interpreted element by element and concatenated.

use num::{BigInt, BigUint, Signed, Zero};
use serde_json::Value;
use sha3::{Digest, Keccak256};

use massa_scenario_exports::{FileResolver, ScenarioError};
use massa_scenario_models::address::{ADDRESS_LENGTH, SC_ADDRESS_NUM_LEADING_ZEROS, VM_TYPE_LENGTH};

const STR_PREFIXES: [&str; 3] = ["str:", "''", "``"];
const ADDRESS_PREFIX: &str = "address:";
const SC_ADDRESS_PREFIX: &str = "sc:";
const FILE_PREFIX: &str = "file:";
const MXSC_PREFIX: &str = "mxsc:";
const KECCAK256_PREFIX: &str = "keccak256:";
const BIGUINT_PREFIX: &str = "biguint:";
const NESTED_PREFIX: &str = "nested:";

/// Fixed width prefixes with their byte length and signedness
const FIXED_WIDTH_PREFIXES: [(&str, usize, bool); 8] = [
    ("u8:", 1, false),
    ("u16:", 2, false),
    ("u32:", 4, false),
    ("u64:", 8, false),
    ("i8:", 1, true),
    ("i16:", 2, true),
    ("i32:", 4, true),
    ("i64:", 8, true),
];

fn parse_error(message: String) -> ScenarioError {
    ScenarioError::ParseError(message)
}

/// Minimal big-endian bytes, empty for zero
pub fn biguint_to_bytes(value: &BigUint) -> Vec<u8> {
    if value.is_zero() {
        Vec::new()
    } else {
        value.to_bytes_be()
    }
}

/// Minimal two's complement, empty for zero
fn bigint_to_bytes(value: &BigInt) -> Vec<u8> {
    if value.is_zero() {
        Vec::new()
    } else {
        value.to_signed_bytes_be()
    }
}

/// Two's complement on exactly `length` bytes
fn bigint_to_fixed_bytes(value: &BigInt, length: usize, original: &str) -> Result<Vec<u8>, ScenarioError> {
    let minimal = value.to_signed_bytes_be();
    if minimal.len() > length {
        return Err(parse_error(format!(
            "representation of {} does not fit in {} bytes",
            original, length
        )));
    }
    let fill = if value.is_negative() { 0xff } else { 0x00 };
    let mut result = vec![fill; length - minimal.len()];
    result.extend(minimal);
    Ok(result)
}

/// Interprets scenario value expressions
pub struct ExprInterpreter {
    vm_type: Vec<u8>,
    file_resolver: Box<dyn FileResolver>,
}

impl ExprInterpreter {
    pub fn new(vm_type: Vec<u8>, file_resolver: Box<dyn FileResolver>) -> Self {
        ExprInterpreter {
            vm_type,
            file_resolver,
        }
    }

    pub fn file_resolver(&self) -> &dyn FileResolver {
        self.file_resolver.as_ref()
    }

    pub fn file_resolver_mut(&mut self) -> &mut dyn FileResolver {
        self.file_resolver.as_mut()
    }

    /// Interprets strings, and lists or maps of values concatenated; map keys
    /// only document the values
    pub fn interpret_sub_tree(&self, value: &Value) -> Result<Vec<u8>, ScenarioError> {
        match value {
            Value::String(text) => self.interpret_string(text),
            Value::Array(items) => {
                let mut concat = Vec::new();
                for item in items {
                    concat.extend(self.interpret_sub_tree(item)?);
                }
                Ok(concat)
            }
            Value::Object(map) => {
                let mut concat = Vec::new();
                for item in map.values() {
                    concat.extend(self.interpret_sub_tree(item)?);
                }
                Ok(concat)
            }
            Value::Number(number) => self.interpret_string(&number.to_string()),
            _ => Err(parse_error(format!(
                "cannot interpret given JSON subtree as value: {}",
                value
            ))),
        }
    }

    /// Interprets one value expression
    pub fn interpret_string(&self, text: &str) -> Result<Vec<u8>, ScenarioError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(path) = text.strip_prefix(FILE_PREFIX) {
            return self.file_resolver.resolve_file_value(path);
        }
        if let Some(path) = text.strip_prefix(MXSC_PREFIX) {
            return self.file_resolver.resolve_mxsc_value(path);
        }
        if let Some(nested) = text.strip_prefix(KECCAK256_PREFIX) {
            let value = self.interpret_string(nested)?;
            return Ok(Keccak256::digest(&value).to_vec());
        }

        let parts: Vec<&str> = text.split('|').collect();
        if parts.len() > 1 {
            let mut concat = Vec::new();
            for part in parts {
                concat.extend(self.interpret_string(part)?);
            }
            return Ok(concat);
        }

        match text {
            "false" => return Ok(Vec::new()),
            "true" => return Ok(vec![1]),
            _ => {}
        }
        for prefix in STR_PREFIXES {
            if let Some(raw) = text.strip_prefix(prefix) {
                return Ok(raw.as_bytes().to_vec());
            }
        }
        if let Some(name) = text.strip_prefix(ADDRESS_PREFIX) {
            return address_expression(name);
        }
        if let Some(name) = text.strip_prefix(SC_ADDRESS_PREFIX) {
            return self.sc_address_expression(name);
        }
        for (prefix, length, signed) in FIXED_WIDTH_PREFIXES {
            if let Some(number) = text.strip_prefix(prefix) {
                return interpret_fixed_width(number, length, signed);
            }
        }
        if let Some(nested) = text.strip_prefix(BIGUINT_PREFIX) {
            return Ok(length_prefixed(self.interpret_string(nested)?));
        }
        if let Some(nested) = text.strip_prefix(NESTED_PREFIX) {
            return Ok(length_prefixed(self.interpret_string(nested)?));
        }
        interpret_number(text)
    }

    /// `sc:` addresses: 8 zero bytes, the VM type, then the name padded with '_'
    fn sc_address_expression(&self, input: &str) -> Result<Vec<u8>, ScenarioError> {
        let prefix_length = SC_ADDRESS_NUM_LEADING_ZEROS + VM_TYPE_LENGTH;
        let mut result = vec![0u8; prefix_length];
        let vm_length = self.vm_type.len().min(VM_TYPE_LENGTH);
        result[SC_ADDRESS_NUM_LEADING_ZEROS..SC_ADDRESS_NUM_LEADING_ZEROS + vm_length]
            .copy_from_slice(&self.vm_type[..vm_length]);
        let named = named_address(input, ADDRESS_LENGTH - prefix_length)?;
        result.extend(named);
        Ok(result)
    }
}

fn length_prefixed(value: Vec<u8>) -> Vec<u8> {
    let mut result = (value.len() as u32).to_be_bytes().to_vec();
    result.extend(value);
    result
}

/// Name padded with '_' to `length` bytes, the last byte replaced by the
/// shard after a `#`
fn named_address(input: &str, length: usize) -> Result<Vec<u8>, ScenarioError> {
    let mut tokens = input.split('#');
    let name = tokens.next().unwrap_or_default().as_bytes();
    let shard = match (tokens.next(), tokens.next()) {
        (None, _) => None,
        (Some(shard), None) => {
            let shard = hex::decode(shard)
                .map_err(|err| parse_error(format!("invalid address shard id {}: {}", shard, err)))?;
            match shard.as_slice() {
                [shard] => Some(*shard),
                _ => return Err(parse_error(format!("invalid address shard id in {}", input))),
            }
        }
        _ => {
            return Err(parse_error(format!(
                "only one shard id separator allowed in address expression: {}",
                input
            )))
        }
    };
    let name_limit = if shard.is_some() { length - 1 } else { length };
    if name.len() > name_limit {
        return Err(parse_error(format!("address name too long: {}", input)));
    }
    let mut result = name.to_vec();
    result.resize(length, b'_');
    if let Some(shard) = shard {
        result[length - 1] = shard;
    }
    Ok(result)
}

fn address_expression(input: &str) -> Result<Vec<u8>, ScenarioError> {
    named_address(input, ADDRESS_LENGTH)
}

fn interpret_fixed_width(text: &str, length: usize, signed: bool) -> Result<Vec<u8>, ScenarioError> {
    let value = interpret_signed_big_int(text)?;
    if !signed && value.is_negative() {
        return Err(parse_error(format!("negative value not allowed: {}", text)));
    }
    if !signed {
        let magnitude = biguint_to_bytes(value.magnitude());
        if magnitude.len() > length {
            return Err(parse_error(format!(
                "representation of {} does not fit in {} bytes",
                text, length
            )));
        }
        let mut result = vec![0u8; length - magnitude.len()];
        result.extend(magnitude);
        return Ok(result);
    }
    bigint_to_fixed_bytes(&value, length, text)
}

fn interpret_signed_big_int(text: &str) -> Result<BigInt, ScenarioError> {
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = BigInt::from(BigUint::from_bytes_be(&interpret_unsigned_number(unsigned)?));
    Ok(if negative { -magnitude } else { magnitude })
}

fn interpret_number(text: &str) -> Result<Vec<u8>, ScenarioError> {
    if text.starts_with('-') || text.starts_with('+') {
        return Ok(bigint_to_bytes(&interpret_signed_big_int(text)?));
    }
    interpret_unsigned_number(text)
}

fn interpret_unsigned_number(text: &str) -> Result<Vec<u8>, ScenarioError> {
    let cleaned: String = text.chars().filter(|c| *c != '_' && *c != ',').collect();
    if let Some(digits) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        let digits = if digits.len() % 2 == 1 {
            format!("0{}", digits)
        } else {
            digits.to_string()
        };
        return hex::decode(&digits)
            .map_err(|err| parse_error(format!("could not parse hex value {}: {}", text, err)));
    }
    if let Some(digits) = cleaned
        .strip_prefix("0b")
        .or_else(|| cleaned.strip_prefix("0B"))
    {
        let value = BigUint::parse_bytes(digits.as_bytes(), 2)
            .ok_or_else(|| parse_error(format!("could not parse binary value: {}", text)))?;
        return Ok(biguint_to_bytes(&value));
    }
    let value = BigUint::parse_bytes(cleaned.as_bytes(), 10)
        .ok_or_else(|| parse_error(format!("could not parse base 10 value: {}", text)))?;
    Ok(biguint_to_bytes(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_resolver::DefaultFileResolver;

    fn interpreter() -> ExprInterpreter {
        ExprInterpreter::new(vec![5, 0], Box::new(DefaultFileResolver::new()))
    }

    fn interpret(text: &str) -> Vec<u8> {
        interpreter().interpret_string(text).unwrap()
    }

    #[test]
    fn test_numbers() {
        assert_eq!(interpret(""), Vec::<u8>::new());
        assert_eq!(interpret("0"), Vec::<u8>::new());
        assert_eq!(interpret("1,000"), vec![0x03, 0xe8]);
        assert_eq!(interpret("1_000"), vec![0x03, 0xe8]);
        assert_eq!(interpret("0x0000"), vec![0, 0]);
        assert_eq!(interpret("0xabc"), vec![0x0a, 0xbc]);
        assert_eq!(interpret("0b101"), vec![5]);
        assert_eq!(interpret("-1"), vec![0xff]);
        assert_eq!(interpret("+255"), vec![0x00, 0xff]);
        assert_eq!(interpret("-256"), vec![0xff, 0x00]);
        assert!(interpreter().interpret_string("12a").is_err());
    }

    #[test]
    fn test_fixed_width_and_nested() {
        assert_eq!(interpret("u8:5"), vec![5]);
        assert_eq!(interpret("u32:5"), vec![0, 0, 0, 5]);
        assert_eq!(interpret("u64:0"), vec![0; 8]);
        assert_eq!(interpret("i16:-2"), vec![0xff, 0xfe]);
        assert!(interpreter().interpret_string("u8:256").is_err());
        assert!(interpreter().interpret_string("u8:-1").is_err());
        assert_eq!(interpret("biguint:0x0102"), vec![0, 0, 0, 2, 1, 2]);
        assert_eq!(interpret("nested:str:ab"), vec![0, 0, 0, 2, b'a', b'b']);
    }

    #[test]
    fn test_strings_and_booleans() {
        assert_eq!(interpret("str:hello"), b"hello".to_vec());
        assert_eq!(interpret("''hello"), b"hello".to_vec());
        assert_eq!(interpret("``hello"), b"hello".to_vec());
        assert_eq!(interpret("true"), vec![1]);
        assert_eq!(interpret("false"), Vec::<u8>::new());
        assert_eq!(interpret("str:a|u8:1|0x02"), vec![b'a', 1, 2]);
    }

    #[test]
    fn test_addresses() {
        let mut expected = b"owner".to_vec();
        expected.resize(32, b'_');
        assert_eq!(interpret("address:owner"), expected);
        expected[31] = 1;
        assert_eq!(interpret("address:owner#01"), expected);

        let sc = interpret("sc:adder");
        assert_eq!(sc.len(), 32);
        assert_eq!(&sc[..8], &[0; 8]);
        assert_eq!(&sc[8..10], &[5, 0]);
        assert_eq!(&sc[10..15], b"adder");
        assert_eq!(sc[31], b'_');
        assert!(interpreter()
            .interpret_string("address:this-name-is-way-too-long-for-an-address")
            .is_err());
    }

    #[test]
    fn test_keccak_and_sub_trees() {
        assert_eq!(
            hex::encode(interpret("keccak256:str:")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        let tree = serde_json::json!({"first": "u8:1", "rest": ["0x02", "str:c"]});
        assert_eq!(interpreter().interpret_sub_tree(&tree).unwrap(), vec![1, 2, b'c']);
        assert!(interpreter()
            .interpret_sub_tree(&serde_json::json!(null))
            .is_err());
    }
}
