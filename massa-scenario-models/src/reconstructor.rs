// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Renders raw bytes back into scenario expressions for diagnostics.

use std::fmt::Write;

use num::BigUint;

use crate::address::{ADDRESS_LENGTH, SC_ADDRESS_NUM_LEADING_ZEROS, VM_TYPE_LENGTH};

/// Number of code bytes shown before eliding the rest
const CODE_PREVIEW_BYTES: usize = 10;

/// What the bytes are expected to represent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconstructorHint {
    /// no idea, show hex and a string rendering
    NoHint,
    /// unsigned big-endian number
    Number,
    /// text
    Str,
    /// 32-byte account address
    Address,
    /// contract code, shown truncated
    Code,
}

/// Turns bytes into the expression a test author would have written
#[derive(Clone, Copy, Debug, Default)]
pub struct ExprReconstructor;

impl ExprReconstructor {
    /// Renders `value` according to `hint`
    pub fn reconstruct(&self, value: &[u8], hint: ReconstructorHint) -> String {
        match hint {
            ReconstructorHint::NoHint => unknown_bytes_pretty(value),
            ReconstructorHint::Number => BigUint::from_bytes_be(value).to_string(),
            ReconstructorHint::Str => format!("str:{}", String::from_utf8_lossy(value)),
            ReconstructorHint::Address => address_pretty(value),
            ReconstructorHint::Code => code_pretty(value),
        }
    }

    /// Renders every element in quotes: `["a", "b"]`
    pub fn reconstruct_list(&self, values: &[Vec<u8>], hint: ReconstructorHint) -> String {
        let items: Vec<String> = values
            .iter()
            .map(|value| format!("\"{}\"", self.reconstruct(value, hint)))
            .collect();
        format!("[{}]", items.join(", "))
    }
}

fn can_interpret_as_string(value: &[u8]) -> bool {
    value.iter().all(|byte| (32..=126).contains(byte))
}

fn unknown_bytes_pretty(value: &[u8]) -> String {
    if value.is_empty() {
        return String::new();
    }
    if can_interpret_as_string(value) {
        // printable ASCII is valid UTF-8
        return format!(
            "0x{} (str:{})",
            hex::encode(value),
            String::from_utf8_lossy(value)
        );
    }
    format!("0x{} (str:{})", hex::encode(value), quote_bytes(value))
}

fn code_pretty(value: &[u8]) -> String {
    if value.len() > CODE_PREVIEW_BYTES {
        format!("0x{}...", hex::encode(&value[..CODE_PREVIEW_BYTES]))
    } else {
        format!("0x{}", hex::encode(value))
    }
}

fn address_pretty(value: &[u8]) -> String {
    if value.len() != ADDRESS_LENGTH {
        return unknown_bytes_pretty(value);
    }
    let (prefix, name_start) = if value[..SC_ADDRESS_NUM_LEADING_ZEROS]
        .iter()
        .all(|byte| *byte == 0)
    {
        ("sc", SC_ADDRESS_NUM_LEADING_ZEROS + VM_TYPE_LENGTH)
    } else {
        ("address", 0)
    };
    let last = value[ADDRESS_LENGTH - 1];
    let (name, shard) = if last == b'_' {
        (&value[name_start..], None)
    } else {
        (&value[name_start..ADDRESS_LENGTH - 1], Some(last))
    };
    let mut name_end = name.len();
    while name_end > 0 && name[name_end - 1] == b'_' {
        name_end -= 1;
    }
    let name = &name[..name_end];
    if name.is_empty() || !can_interpret_as_string(name) {
        return unknown_bytes_pretty(value);
    }
    let name = String::from_utf8_lossy(name);
    match shard {
        None => format!("{}:{}", prefix, name),
        Some(shard) => format!("{}:{}#{:02x}", prefix, name, shard),
    }
}

/// Double-quoted rendering with escapes for control and invalid UTF-8 bytes
pub fn quote_bytes(value: &[u8]) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for chunk in value.utf8_chunks() {
        for character in chunk.valid().chars() {
            match character {
                '"' => quoted.push_str("\\\""),
                '\\' => quoted.push_str("\\\\"),
                '\u{07}' => quoted.push_str("\\a"),
                '\u{08}' => quoted.push_str("\\b"),
                '\u{0c}' => quoted.push_str("\\f"),
                '\n' => quoted.push_str("\\n"),
                '\r' => quoted.push_str("\\r"),
                '\t' => quoted.push_str("\\t"),
                '\u{0b}' => quoted.push_str("\\v"),
                ' '..='~' => quoted.push(character),
                c if (c as u32) < 0x80 => {
                    let _ = write!(quoted, "\\x{:02x}", c as u32);
                }
                c if c.is_control() || c.is_whitespace() => {
                    if (c as u32) < 0x10000 {
                        let _ = write!(quoted, "\\u{:04x}", c as u32);
                    } else {
                        let _ = write!(quoted, "\\U{:08x}", c as u32);
                    }
                }
                c => quoted.push(c),
            }
        }
        for byte in chunk.invalid() {
            let _ = write!(quoted, "\\x{:02x}", byte);
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(name: &[u8], leading_zeros: usize) -> Vec<u8> {
        let mut address = vec![0u8; leading_zeros];
        address.extend_from_slice(name);
        address.resize(ADDRESS_LENGTH, b'_');
        address
    }

    #[test]
    fn test_no_hint() {
        let reconstructor = ExprReconstructor;
        assert_eq!(reconstructor.reconstruct(b"", ReconstructorHint::NoHint), "");
        assert_eq!(
            reconstructor.reconstruct(b"key-c", ReconstructorHint::NoHint),
            "0x6b65792d63 (str:key-c)"
        );
        assert_eq!(
            reconstructor.reconstruct(&[1, 1], ReconstructorHint::NoHint),
            "0x0101 (str:\"\\x01\\x01\")"
        );
    }

    #[test]
    fn test_quote_invalid_utf8() {
        let hash =
            hex::decode("54e3ea4bdef3b22154767a2cae081fca2bec2eae1ec62ee71308cb2a300d675d").unwrap();
        assert_eq!(
            quote_bytes(&hash),
            "\"T\\xe3\\xeaK\\xde\\xf3\\xb2!Tvz,\\xae\\b\\x1f\\xca+\\xec.\\xae\\x1e\\xc6.\\xe7\\x13\\b\\xcb*0\\rg]\""
        );
    }

    #[test]
    fn test_addresses() {
        let reconstructor = ExprReconstructor;
        assert_eq!(
            reconstructor.reconstruct(&padded(b"the-address", 0), ReconstructorHint::Address),
            "address:the-address"
        );
        assert_eq!(
            reconstructor.reconstruct(&padded(b"contract", 10), ReconstructorHint::Address),
            "sc:contract"
        );
        let mut sharded = padded(b"owner", 0);
        sharded[31] = 1;
        assert_eq!(
            reconstructor.reconstruct(&sharded, ReconstructorHint::Address),
            "address:owner#01"
        );
        assert_eq!(reconstructor.reconstruct(b"", ReconstructorHint::Address), "");
    }

    #[test]
    fn test_numbers_code_and_lists() {
        let reconstructor = ExprReconstructor;
        assert_eq!(reconstructor.reconstruct(&[1, 0], ReconstructorHint::Number), "256");
        assert_eq!(reconstructor.reconstruct(b"", ReconstructorHint::Number), "0");
        assert_eq!(
            reconstructor.reconstruct(b"0123456789abc", ReconstructorHint::Code),
            "0x30313233343536373839..."
        );
        assert_eq!(
            reconstructor.reconstruct_list(
                &[b"www.a".to_vec(), b"www.b".to_vec()],
                ReconstructorHint::Str
            ),
            "[\"str:www.a\", \"str:www.b\"]"
        );
    }
}
