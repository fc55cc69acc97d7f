//! ASN.1 DER decoder producing an [`Asn1Tree`].

use dertree_types::DecodeError;

use super::tree::{Asn1Tree, NodeId, NodeRecord};
use super::{Identifier, TagNumber, Value};

/// Nesting limit applied by [`decode`] and [`Decoder::new`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Decode every top-level element of `data` with the default limits.
pub fn decode(data: &[u8]) -> Result<Asn1Tree, DecodeError> {
    Decoder::new(data).decode()
}

/// A configurable DER decoder.
///
/// Decoding is all-or-nothing: any malformed element aborts the call and
/// no partial tree is returned.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    /// Create a new decoder over the given data.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the nesting limit. Top-level elements sit at depth 0, so a
    /// limit of 1 admits only flat, primitive elements.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decode the whole buffer.
    pub fn decode(self) -> Result<Asn1Tree, DecodeError> {
        log::debug!(
            "decoding {} bytes (max depth {})",
            self.data.len(),
            self.max_depth
        );
        let mut builder = Builder {
            data: self.data,
            max_depth: self.max_depth,
            nodes: Vec::new(),
        };
        let roots = builder.parse_top_level()?;
        log::debug!(
            "decoded {} top-level element(s), {} nodes",
            roots.len(),
            builder.nodes.len()
        );
        Ok(Asn1Tree::from_parts(
            self.data.to_vec(),
            builder.nodes,
            roots,
        ))
    }
}

struct Builder<'a> {
    data: &'a [u8],
    max_depth: usize,
    nodes: Vec<NodeRecord>,
}

impl Builder<'_> {
    fn parse_top_level(&mut self) -> Result<Vec<NodeId>, DecodeError> {
        let end = self.data.len();
        let mut roots = Vec::new();
        let mut pos = 0;
        while pos < end {
            let garbage = DecodeError::TrailingGarbage {
                offset: pos,
                count: end - pos,
            };
            // Leftover bytes must start with a complete header
            if !roots.is_empty()
                && (self.data[pos] == 0x00 || self.read_header(pos, end).is_err())
            {
                return Err(garbage);
            }
            match self.parse_element(pos, end, None, 0) {
                Ok((id, next)) => {
                    roots.push(id);
                    pos = next;
                }
                Err(DecodeError::Truncated { .. }) if !roots.is_empty() => return Err(garbage),
                Err(e) => return Err(e),
            }
        }
        Ok(roots)
    }

    /// Parse one TLV starting at `pos` that must end at or before `end`.
    /// Returns the new node and the position just past it.
    fn parse_element(
        &mut self,
        pos: usize,
        end: usize,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Result<(NodeId, usize), DecodeError> {
        if depth >= self.max_depth {
            return Err(DecodeError::NestingTooDeep {
                offset: pos,
                limit: self.max_depth,
            });
        }
        let (identifier, content_start, content_end) = self.read_header(pos, end)?;
        let length = content_end - content_start;
        log::trace!(
            "{pos}: d={depth} hl={} l={length} {identifier}",
            content_start - pos
        );

        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeRecord {
            identifier,
            header_offset: pos,
            content: content_start..content_end,
            value: Value::Absent,
            children: Vec::new(),
            parent,
            depth,
        });
        if let Some(NodeId(p)) = parent {
            self.nodes[p].children.push(id);
        }

        if identifier.is_constructed() {
            let mut child_pos = content_start;
            while child_pos < content_end {
                let (_, next) = self.parse_element(child_pos, content_end, Some(id), depth + 1)?;
                child_pos = next;
            }
        } else {
            let content = &self.data[content_start..content_end];
            self.nodes[id.0].value = Value::decode(identifier, content, content_start)?;
        }
        Ok((id, content_end))
    }

    /// Read the identifier and length octets of the element at `pos` and
    /// check that its content fits before `end`. Returns the identifier and
    /// the content range bounds.
    fn read_header(
        &self,
        pos: usize,
        end: usize,
    ) -> Result<(Identifier, usize, usize), DecodeError> {
        let identifier = Identifier::parse(self.data[pos], pos)?;
        if !identifier.is_constructed()
            && (identifier.is(TagNumber::Sequence) || identifier.is(TagNumber::Set))
        {
            return Err(DecodeError::MalformedTag {
                offset: pos,
                byte: identifier.raw(),
                reason: "SEQUENCE and SET must be constructed",
            });
        }
        let (length, content_start) = self.read_length(pos + 1, end)?;
        let available = end - content_start;
        if length > available {
            return Err(DecodeError::Truncated {
                offset: content_start,
                need: length,
                available,
            });
        }
        Ok((identifier, content_start, content_start + length))
    }

    /// Parse a DER length at `pos`. Returns the length and the offset of
    /// the first content byte.
    fn read_length(&self, pos: usize, end: usize) -> Result<(usize, usize), DecodeError> {
        if pos >= end {
            return Err(DecodeError::Truncated {
                offset: pos,
                need: 1,
                available: 0,
            });
        }
        let first = self.data[pos];
        if first < 0x80 {
            return Ok((first as usize, pos + 1));
        }
        if first == 0x80 {
            // Indefinite length is BER only
            return Err(DecodeError::UnsupportedLength {
                offset: pos,
                reason: "indefinite length",
            });
        }
        if first == 0xFF {
            return Err(DecodeError::UnsupportedLength {
                offset: pos,
                reason: "reserved length octet 0xff",
            });
        }
        let num_bytes = (first & 0x7F) as usize;
        if num_bytes > std::mem::size_of::<usize>() {
            return Err(DecodeError::UnsupportedLength {
                offset: pos,
                reason: "length does not fit in usize",
            });
        }
        let start = pos + 1;
        if end - start < num_bytes {
            return Err(DecodeError::Truncated {
                offset: start,
                need: num_bytes,
                available: end - start,
            });
        }
        let length = self.data[start..start + num_bytes]
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize);
        Ok((length, start + num_bytes))
    }
}
