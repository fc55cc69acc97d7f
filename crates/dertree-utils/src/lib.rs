#![forbid(unsafe_code)]
#![doc = "ASN.1 DER decoding into a navigable tree, plus the OID registry."]

#[cfg(feature = "asn1")]
pub mod asn1;

#[cfg(feature = "oid")]
pub mod oid;
