//! OID (Object Identifier) decoding and the display-name registry.

mod registry;

pub use registry::{display_name, lookup};

use dertree_types::DecodeError;

/// A parsed OID represented as a sequence of arc values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid {
    arcs: Vec<u128>,
}

/// Error returned when parsing a dotted-decimal OID string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid dotted OID {0:?}")]
pub struct ParseOidError(String);

impl Oid {
    /// Create an OID from a slice of arc values.
    pub fn new(arcs: &[u128]) -> Self {
        Self {
            arcs: arcs.to_vec(),
        }
    }

    /// Return the arc values.
    pub fn arcs(&self) -> &[u128] {
        &self.arcs
    }

    /// Parse an OBJECT IDENTIFIER from its DER content bytes.
    ///
    /// The first group packs two arcs as `arc1 * 40 + arc2`; arc1 is 2 for
    /// every value of 80 and above. Error offsets are relative to `data`.
    pub fn from_der_value(data: &[u8]) -> Result<Self, DecodeError> {
        let mut groups = decode_groups(data)?.into_iter();
        let first = groups.next().ok_or(DecodeError::InvalidOidEncoding {
            offset: 0,
            reason: "empty object identifier",
        })?;
        let mut arcs = match first {
            0..=39 => vec![0, first],
            40..=79 => vec![1, first - 40],
            _ => vec![2, first - 80],
        };
        arcs.extend(groups);
        Ok(Self { arcs })
    }

    /// Parse a RELATIVE-OID from its DER content bytes.
    pub fn from_relative_der_value(data: &[u8]) -> Result<Self, DecodeError> {
        let arcs = decode_groups(data)?;
        if arcs.is_empty() {
            return Err(DecodeError::InvalidOidEncoding {
                offset: 0,
                reason: "empty relative object identifier",
            });
        }
        Ok(Self { arcs })
    }

    /// Return the dotted-string representation (e.g., "1.2.840.113549.1.1.1").
    pub fn to_dot_string(&self) -> String {
        self.arcs
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Registry display name, falling back to the dotted form.
    pub fn display_name(&self) -> String {
        display_name(&self.to_dot_string())
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.to_dot_string())
    }
}

impl std::str::FromStr for Oid {
    type Err = ParseOidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arcs = s
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                part.parse::<u128>().ok()
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ParseOidError(s.to_string()))?;
        match arcs.as_slice() {
            [first, second, ..] if *first <= 2 && (*first == 2 || *second < 40) => {
                Ok(Self { arcs })
            }
            _ => Err(ParseOidError(s.to_string())),
        }
    }
}

/// Split base-128 groups; bit 0x80 marks continuation within a group.
fn decode_groups(data: &[u8]) -> Result<Vec<u128>, DecodeError> {
    let mut groups = Vec::new();
    let mut value: u128 = 0;
    let mut group_start = true;
    for (i, &byte) in data.iter().enumerate() {
        if group_start && byte == 0x80 {
            return Err(DecodeError::InvalidOidEncoding {
                offset: i,
                reason: "non-minimal arc encoding",
            });
        }
        if value > (u128::MAX >> 7) {
            return Err(DecodeError::InvalidOidEncoding {
                offset: i,
                reason: "arc exceeds 128 bits",
            });
        }
        value = (value << 7) | (byte & 0x7F) as u128;
        group_start = byte & 0x80 == 0;
        if group_start {
            groups.push(value);
            value = 0;
        }
    }
    if !group_start {
        return Err(DecodeError::InvalidOidEncoding {
            offset: data.len().saturating_sub(1),
            reason: "last arc has its continuation bit set",
        });
    }
    Ok(groups)
}
