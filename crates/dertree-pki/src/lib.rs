#![forbid(unsafe_code)]
#![doc = "X.509 certificate model built on the dertree ASN.1 tree."]

#[cfg(feature = "x509")]
pub mod x509;
