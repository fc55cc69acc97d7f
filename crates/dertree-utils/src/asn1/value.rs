//! Decoded values of primitive nodes.

use chrono::{DateTime, Utc};
use dertree_bignum::BigNum;
use dertree_types::DecodeError;

use super::time::{parse_generalized_time, parse_utc_time};
use super::{Identifier, TagClass, TagNumber};
use crate::oid::Oid;

/// The decoded value of a node, discriminated by its universal tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Constructed nodes, NULL, end-of-content, and every non-universal
    /// primitive (whose raw content is left to the consumer).
    Absent,
    Boolean(bool),
    /// INTEGER and ENUMERATED.
    Integer(BigNum),
    /// BIT STRING: unused bit count of the final octet plus the bit data.
    BitString { unused_bits: u8, data: Vec<u8> },
    /// OCTET STRING and the other primitives kept as raw bytes.
    Bytes(Vec<u8>),
    Text(String),
    /// OBJECT IDENTIFIER in dotted-decimal form.
    ObjectIdentifier(String),
    /// RELATIVE-OID in dotted-decimal form.
    RelativeOid(String),
    Time(DateTime<Utc>),
}

impl Value {
    /// Interpret primitive content according to its tag. `offset` is the
    /// absolute position of `content`, used for error reporting.
    pub(crate) fn decode(
        identifier: Identifier,
        content: &[u8],
        offset: usize,
    ) -> Result<Self, DecodeError> {
        if identifier.type_class() != TagClass::Universal {
            return Ok(Value::Absent);
        }
        let Some(tag) = identifier.tag_number() else {
            return Ok(Value::Bytes(content.to_vec()));
        };
        let invalid = |reason| DecodeError::InvalidValue { offset, reason };

        match tag {
            TagNumber::EndOfContent | TagNumber::Null => {
                if content.is_empty() {
                    Ok(Value::Absent)
                } else {
                    Err(invalid("NULL and end-of-content must be empty"))
                }
            }
            TagNumber::Boolean => match content {
                [b] => Ok(Value::Boolean(*b != 0)),
                _ => Err(invalid("BOOLEAN must hold exactly one byte")),
            },
            TagNumber::Integer | TagNumber::Enumerated => {
                if content.is_empty() {
                    return Err(invalid("INTEGER must not be empty"));
                }
                Ok(Value::Integer(BigNum::from_signed_bytes_be(content)))
            }
            TagNumber::BitString => match content.split_first() {
                None => Err(invalid("BIT STRING is missing its unused-bits byte")),
                Some((&unused_bits, data)) => {
                    if unused_bits > 7 || (data.is_empty() && unused_bits != 0) {
                        return Err(invalid("BIT STRING unused-bits count out of range"));
                    }
                    Ok(Value::BitString {
                        unused_bits,
                        data: data.to_vec(),
                    })
                }
            },
            TagNumber::ObjectIdentifier => Oid::from_der_value(content)
                .map(|oid| Value::ObjectIdentifier(oid.to_dot_string()))
                .map_err(|e| e.rebase(offset)),
            TagNumber::RelativeOid => Oid::from_relative_der_value(content)
                .map(|oid| Value::RelativeOid(oid.to_dot_string()))
                .map_err(|e| e.rebase(offset)),
            TagNumber::Sequence | TagNumber::Set => Err(DecodeError::MalformedTag {
                offset,
                byte: identifier.raw(),
                reason: "SEQUENCE and SET must be constructed",
            }),
            TagNumber::UtcTime | TagNumber::GeneralizedTime => {
                let text = std::str::from_utf8(content).map_err(|_| {
                    DecodeError::InvalidTimeFormat {
                        offset,
                        reason: "time is not ASCII".into(),
                    }
                })?;
                let parsed = if tag == TagNumber::UtcTime {
                    parse_utc_time(text)
                } else {
                    parse_generalized_time(text)
                };
                parsed
                    .map(Value::Time)
                    .map_err(|reason| DecodeError::InvalidTimeFormat {
                        offset,
                        reason: format!("{reason}: {text:?}"),
                    })
            }
            TagNumber::Utf8String
            | TagNumber::NumericString
            | TagNumber::PrintableString
            | TagNumber::Ia5String
            | TagNumber::VisibleString
            | TagNumber::T61String
            | TagNumber::VideotexString
            | TagNumber::GraphicString
            | TagNumber::GeneralString
            | TagNumber::ObjectDescriptor
            | TagNumber::CharacterString
            | TagNumber::UniversalString
            | TagNumber::BmpString => decode_text(tag, content)
                .map(Value::Text)
                .map_err(|reason| DecodeError::InvalidStringEncoding {
                    offset,
                    reason: format!("{}: {reason}", tag.name()),
                }),
            TagNumber::OctetString
            | TagNumber::External
            | TagNumber::Real
            | TagNumber::EmbeddedPdv => Ok(Value::Bytes(content.to_vec())),
        }
    }

    /// Text of a string value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Dotted form of an OBJECT IDENTIFIER value.
    pub fn as_oid(&self) -> Option<&str> {
        match self {
            Value::ObjectIdentifier(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&BigNum> {
        match self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Bytes of an OCTET STRING, or the data of a BIT STRING.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::BitString { data, .. } => Some(data),
            _ => None,
        }
    }
}

/// Decode string content per the character set its tag implies.
fn decode_text(tag: TagNumber, content: &[u8]) -> Result<String, &'static str> {
    match tag {
        TagNumber::Utf8String => std::str::from_utf8(content)
            .map(str::to_string)
            .map_err(|_| "invalid UTF-8"),
        TagNumber::NumericString
        | TagNumber::PrintableString
        | TagNumber::Ia5String
        | TagNumber::VisibleString => {
            if content.is_ascii() {
                Ok(content.iter().map(|&b| b as char).collect())
            } else {
                Err("byte outside the 7-bit range")
            }
        }
        TagNumber::BmpString => {
            if content.len() % 2 != 0 {
                return Err("odd number of bytes");
            }
            let units = content
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]));
            char::decode_utf16(units)
                .collect::<Result<String, _>>()
                .map_err(|_| "unpaired surrogate")
        }
        TagNumber::UniversalString => {
            if content.len() % 4 != 0 {
                return Err("length is not a multiple of four");
            }
            content
                .chunks_exact(4)
                .map(|c| char::from_u32(u32::from_be_bytes([c[0], c[1], c[2], c[3]])))
                .collect::<Option<String>>()
                .ok_or("invalid code point")
        }
        // T61, videotex, graphic, general: single-byte, read as Latin-1
        _ => Ok(content.iter().map(|&b| b as char).collect()),
    }
}
