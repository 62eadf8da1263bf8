// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Binary encoding of ESDT storage values.
//!
//! Integers are unsigned varints, byte strings are length-prefixed and big
//! integers are stored as their minimal big-endian bytes.

use nom::{
    bytes::complete::take,
    error::{context, ContextError, ErrorKind, ParseError},
    multi::length_count,
    sequence::tuple,
    IResult, Parser,
};
use num::BigUint;

use massa_scenario_models::vm::EsdtTokenType;

use crate::error::WorldError;

/// Writes a value at the end of a buffer
pub trait Serializer<T: ?Sized> {
    fn serialize(&self, value: &T, buffer: &mut Vec<u8>) -> Result<(), WorldError>;
}

/// Reads a value from the head of a buffer
pub trait Deserializer<T> {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], T, E>;
}

/// Metadata of a non-fungible token instance
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EsdtMetadata {
    pub nonce: u64,
    pub name: Vec<u8>,
    pub creator: Vec<u8>,
    pub royalties: u32,
    pub hash: Vec<u8>,
    pub uris: Vec<Vec<u8>>,
    pub attributes: Vec<u8>,
}

/// Token instance as kept in account storage
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EsdtToken {
    pub token_type: EsdtTokenType,
    pub value: BigUint,
    /// bit 0 of the first byte marks the instance as frozen
    pub properties: Vec<u8>,
    pub metadata: Option<EsdtMetadata>,
}

impl EsdtToken {
    /// Fungible balance without metadata
    pub fn fungible(value: BigUint) -> Self {
        EsdtToken {
            token_type: EsdtTokenType::Fungible,
            value,
            properties: Vec::new(),
            metadata: None,
        }
    }

    /// Whether the frozen flag is set
    pub fn is_frozen(&self) -> bool {
        self.properties.first().map_or(false, |flags| flags & 1 == 1)
    }
}

fn serialize_u64(value: u64, buffer: &mut Vec<u8>) {
    let mut encoded = unsigned_varint::encode::u64_buffer();
    buffer.extend_from_slice(unsigned_varint::encode::u64(value, &mut encoded));
}

fn serialize_bytes(value: &[u8], buffer: &mut Vec<u8>) {
    serialize_u64(value.len() as u64, buffer);
    buffer.extend_from_slice(value);
}

fn biguint_bytes(value: &BigUint) -> Vec<u8> {
    if value.bits() == 0 {
        Vec::new()
    } else {
        value.to_bytes_be()
    }
}

fn deserialize_u64<'a, E: ParseError<&'a [u8]>>(input: &'a [u8]) -> IResult<&'a [u8], u64, E> {
    unsigned_varint::decode::u64(input)
        .map(|(value, rest)| (rest, value))
        .map_err(|_| nom::Err::Error(E::from_error_kind(input, ErrorKind::Fail)))
}

fn deserialize_length<'a, E: ParseError<&'a [u8]>>(input: &'a [u8]) -> IResult<&'a [u8], usize, E> {
    let (rest, length) = deserialize_u64(input)?;
    if length > rest.len() as u64 {
        return Err(nom::Err::Error(E::from_error_kind(input, ErrorKind::TooLarge)));
    }
    Ok((rest, length as usize))
}

fn deserialize_bytes<'a, E: ParseError<&'a [u8]>>(input: &'a [u8]) -> IResult<&'a [u8], Vec<u8>, E> {
    let (rest, length) = deserialize_length(input)?;
    take(length).map(|bytes: &[u8]| bytes.to_vec()).parse(rest)
}

fn deserialize_bytes_list<'a, E: ParseError<&'a [u8]>>(
    input: &'a [u8],
) -> IResult<&'a [u8], Vec<Vec<u8>>, E> {
    length_count(deserialize_length, deserialize_bytes)(input)
}

/// Serializer for `EsdtToken`
#[derive(Default)]
pub struct EsdtTokenSerializer;

impl EsdtTokenSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer<EsdtToken> for EsdtTokenSerializer {
    fn serialize(&self, value: &EsdtToken, buffer: &mut Vec<u8>) -> Result<(), WorldError> {
        serialize_u64(u32::from(value.token_type) as u64, buffer);
        serialize_bytes(&biguint_bytes(&value.value), buffer);
        serialize_bytes(&value.properties, buffer);
        match &value.metadata {
            None => serialize_u64(0, buffer),
            Some(metadata) => {
                serialize_u64(1, buffer);
                serialize_u64(metadata.nonce, buffer);
                serialize_bytes(&metadata.name, buffer);
                serialize_bytes(&metadata.creator, buffer);
                serialize_u64(metadata.royalties as u64, buffer);
                serialize_bytes(&metadata.hash, buffer);
                serialize_u64(metadata.uris.len() as u64, buffer);
                for uri in &metadata.uris {
                    serialize_bytes(uri, buffer);
                }
                serialize_bytes(&metadata.attributes, buffer);
            }
        }
        Ok(())
    }
}

/// Deserializer for `EsdtToken`
#[derive(Default)]
pub struct EsdtTokenDeserializer;

impl EsdtTokenDeserializer {
    pub fn new() -> Self {
        Self
    }

    fn deserialize_metadata<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], EsdtMetadata, E> {
        context(
            "Failed EsdtMetadata deserialization",
            tuple((
                context("Failed nonce deserialization", deserialize_u64),
                context("Failed name deserialization", deserialize_bytes),
                context("Failed creator deserialization", deserialize_bytes),
                context("Failed royalties deserialization", deserialize_u64),
                context("Failed hash deserialization", deserialize_bytes),
                context("Failed uris deserialization", deserialize_bytes_list),
                context("Failed attributes deserialization", deserialize_bytes),
            )),
        )
        .map(
            |(nonce, name, creator, royalties, hash, uris, attributes)| EsdtMetadata {
                nonce,
                name,
                creator,
                royalties: royalties.min(u32::MAX as u64) as u32,
                hash,
                uris,
                attributes,
            },
        )
        .parse(buffer)
    }
}

impl Deserializer<EsdtToken> for EsdtTokenDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], EsdtToken, E> {
        let (rest, token_type) =
            context("Failed token type deserialization", deserialize_u64)(buffer)?;
        let token_type = u32::try_from(token_type)
            .ok()
            .and_then(|token_type| EsdtTokenType::try_from(token_type).ok())
            .ok_or_else(|| nom::Err::Error(E::from_error_kind(buffer, ErrorKind::Fail)))?;
        let (rest, (value, properties, has_metadata)) = context(
            "Failed EsdtToken deserialization",
            tuple((deserialize_bytes, deserialize_bytes, deserialize_u64)),
        )(rest)?;
        let (rest, metadata) = match has_metadata {
            0 => (rest, None),
            1 => {
                let (rest, metadata) = self.deserialize_metadata(rest)?;
                (rest, Some(metadata))
            }
            _ => return Err(nom::Err::Error(E::from_error_kind(rest, ErrorKind::Fail))),
        };
        Ok((
            rest,
            EsdtToken {
                token_type,
                value: BigUint::from_bytes_be(&value),
                properties,
                metadata,
            },
        ))
    }
}

/// Serializer for the role list of a token
#[derive(Default)]
pub struct EsdtRolesSerializer;

impl EsdtRolesSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer<[Vec<u8>]> for EsdtRolesSerializer {
    fn serialize(&self, value: &[Vec<u8>], buffer: &mut Vec<u8>) -> Result<(), WorldError> {
        serialize_u64(value.len() as u64, buffer);
        for role in value {
            serialize_bytes(role, buffer);
        }
        Ok(())
    }
}

/// Deserializer for the role list of a token
#[derive(Default)]
pub struct EsdtRolesDeserializer;

impl EsdtRolesDeserializer {
    pub fn new() -> Self {
        Self
    }
}

impl Deserializer<Vec<Vec<u8>>> for EsdtRolesDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Vec<Vec<u8>>, E> {
        context("Failed roles deserialization", deserialize_bytes_list)(buffer)
    }
}

/// Decodes a whole storage value, trailing bytes are an error
pub(crate) fn decode_all<T, D: Deserializer<T>>(
    deserializer: &D,
    buffer: &[u8],
) -> Result<T, WorldError> {
    let (rest, value) = deserializer
        .deserialize::<nom::error::VerboseError<&[u8]>>(buffer)
        .map_err(|err| WorldError::EsdtStorageError(format!("{:?}", err)))?;
    if !rest.is_empty() {
        return Err(WorldError::EsdtStorageError(format!(
            "{} trailing bytes",
            rest.len()
        )));
    }
    Ok(value)
}
