//! ASN.1 DER decoding into an owned, navigable tree.
//!
//! ```
//! use dertree_utils::asn1::{decode, TagNumber};
//!
//! // SEQUENCE { OID 2.5.4.3, UTF8String "example.com" }
//! let der = [
//!     0x30, 0x12, 0x06, 0x03, 0x55, 0x04, 0x03, 0x0C, 0x0B, b'e', b'x', b'a', b'm',
//!     b'p', b'l', b'e', b'.', b'c', b'o', b'm',
//! ];
//! let tree = decode(&der).unwrap();
//! let seq = tree.root(0).unwrap();
//! assert!(seq.identifier().is(TagNumber::Sequence));
//! let cn = tree.find_enclosing("2.5.4.3").unwrap();
//! assert_eq!(cn.child(1).and_then(|n| n.as_text()), Some("example.com"));
//! ```

mod decoder;
mod tag;
mod time;
mod tree;
mod value;

pub use decoder::{decode, Decoder, DEFAULT_MAX_DEPTH};
pub use tree::{Asn1Tree, Node, NodeId};
pub use value::Value;

/// Identifier byte constants for the tags this workspace handles by value.
pub mod tags {
    pub const BOOLEAN: u8 = 0x01;
    pub const INTEGER: u8 = 0x02;
    pub const BIT_STRING: u8 = 0x03;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OID: u8 = 0x06;
    pub const UTF8_STRING: u8 = 0x0C;
    pub const SEQUENCE: u8 = 0x30;
    pub const SET: u8 = 0x31;
    pub const PRINTABLE_STRING: u8 = 0x13;
    pub const IA5_STRING: u8 = 0x16;
    pub const UTC_TIME: u8 = 0x17;
    pub const GENERALIZED_TIME: u8 = 0x18;
    pub const BMP_STRING: u8 = 0x1E;
    pub const CONTEXT_SPECIFIC: u8 = 0x80;
    pub const CONSTRUCTED: u8 = 0x20;
}

/// A single-byte ASN.1 identifier octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier(u8);

/// ASN.1 tag class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

/// Universal tag numbers (X.680 §8.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagNumber {
    EndOfContent = 0x00,
    Boolean = 0x01,
    Integer = 0x02,
    BitString = 0x03,
    OctetString = 0x04,
    Null = 0x05,
    ObjectIdentifier = 0x06,
    ObjectDescriptor = 0x07,
    External = 0x08,
    Real = 0x09,
    Enumerated = 0x0A,
    EmbeddedPdv = 0x0B,
    Utf8String = 0x0C,
    RelativeOid = 0x0D,
    Sequence = 0x10,
    Set = 0x11,
    NumericString = 0x12,
    PrintableString = 0x13,
    T61String = 0x14,
    VideotexString = 0x15,
    Ia5String = 0x16,
    UtcTime = 0x17,
    GeneralizedTime = 0x18,
    GraphicString = 0x19,
    VisibleString = 0x1A,
    GeneralString = 0x1B,
    UniversalString = 0x1C,
    CharacterString = 0x1D,
    BmpString = 0x1E,
}
