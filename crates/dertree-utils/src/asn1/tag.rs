//! Identifier octet parsing and tag display.

use super::{Identifier, TagClass, TagNumber};
use dertree_types::DecodeError;

/// Low five bits all set: a multi-byte tag number follows.
const HIGH_TAG_MARKER: u8 = 0x1F;

impl Identifier {
    /// Wrap a raw identifier byte without validation.
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Parse the identifier byte found at `offset`.
    ///
    /// Multi-byte (high) tag numbers are not supported and are rejected
    /// rather than misread as a single-byte tag.
    pub fn parse(byte: u8, offset: usize) -> Result<Self, DecodeError> {
        if byte & HIGH_TAG_MARKER == HIGH_TAG_MARKER {
            return Err(DecodeError::MalformedTag {
                offset,
                byte,
                reason: "multi-byte tag numbers are not supported",
            });
        }
        Ok(Self(byte))
    }

    /// Return the raw identifier byte.
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Tag class from the top two bits.
    pub fn type_class(self) -> TagClass {
        match self.0 & 0xC0 {
            0x00 => TagClass::Universal,
            0x40 => TagClass::Application,
            0x80 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }

    /// True when bit 0x20 is set.
    pub fn is_constructed(self) -> bool {
        self.0 & 0x20 != 0
    }

    /// The low five bits, whatever the class.
    pub fn number(self) -> u8 {
        self.0 & 0x1F
    }

    /// The low five bits mapped onto the universal tag enumeration.
    ///
    /// Only meaningful when `type_class()` is `Universal`; reserved numbers
    /// map to `None`.
    pub fn tag_number(self) -> Option<TagNumber> {
        TagNumber::from_u8(self.number())
    }

    /// True for a universal-class identifier with the given tag number.
    pub fn is(self, tag: TagNumber) -> bool {
        self.type_class() == TagClass::Universal && self.number() == tag as u8
    }

    /// True for a context-specific identifier `[number]`.
    pub fn is_context(self, number: u8, constructed: bool) -> bool {
        self.type_class() == TagClass::ContextSpecific
            && self.number() == number
            && self.is_constructed() == constructed
    }
}

impl TagNumber {
    /// Map a five-bit tag number; reserved values yield `None`.
    pub fn from_u8(value: u8) -> Option<Self> {
        use TagNumber::*;
        Some(match value {
            0x00 => EndOfContent,
            0x01 => Boolean,
            0x02 => Integer,
            0x03 => BitString,
            0x04 => OctetString,
            0x05 => Null,
            0x06 => ObjectIdentifier,
            0x07 => ObjectDescriptor,
            0x08 => External,
            0x09 => Real,
            0x0A => Enumerated,
            0x0B => EmbeddedPdv,
            0x0C => Utf8String,
            0x0D => RelativeOid,
            0x10 => Sequence,
            0x11 => Set,
            0x12 => NumericString,
            0x13 => PrintableString,
            0x14 => T61String,
            0x15 => VideotexString,
            0x16 => Ia5String,
            0x17 => UtcTime,
            0x18 => GeneralizedTime,
            0x19 => GraphicString,
            0x1A => VisibleString,
            0x1B => GeneralString,
            0x1C => UniversalString,
            0x1D => CharacterString,
            0x1E => BmpString,
            _ => return None,
        })
    }

    /// Upper-case display name, as printed by `openssl asn1parse`.
    pub fn name(self) -> &'static str {
        use TagNumber::*;
        match self {
            EndOfContent => "EOC",
            Boolean => "BOOLEAN",
            Integer => "INTEGER",
            BitString => "BIT STRING",
            OctetString => "OCTET STRING",
            Null => "NULL",
            ObjectIdentifier => "OBJECT",
            ObjectDescriptor => "OBJECT DESCRIPTOR",
            External => "EXTERNAL",
            Real => "REAL",
            Enumerated => "ENUMERATED",
            EmbeddedPdv => "EMBEDDED PDV",
            Utf8String => "UTF8STRING",
            RelativeOid => "RELATIVE OID",
            Sequence => "SEQUENCE",
            Set => "SET",
            NumericString => "NUMERICSTRING",
            PrintableString => "PRINTABLESTRING",
            T61String => "T61STRING",
            VideotexString => "VIDEOTEXSTRING",
            Ia5String => "IA5STRING",
            UtcTime => "UTCTIME",
            GeneralizedTime => "GENERALIZEDTIME",
            GraphicString => "GRAPHICSTRING",
            VisibleString => "VISIBLESTRING",
            GeneralString => "GENERALSTRING",
            UniversalString => "UNIVERSALSTRING",
            CharacterString => "CHARACTER STRING",
            BmpString => "BMPSTRING",
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.type_class() {
            TagClass::Universal => match self.tag_number() {
                Some(tag) => return f.pad(tag.name()),
                None => "univ",
            },
            TagClass::Application => "appl",
            TagClass::ContextSpecific => "cont",
            TagClass::Private => "priv",
        };
        f.pad(&format!("{prefix} [ {} ]", self.number()))
    }
}
