#![forbid(unsafe_code)]
#![doc = "Arbitrary-precision signed integers for ASN.1 INTEGER and ENUMERATED values."]

mod bignum;
mod ops;

pub use bignum::{BigNum, Limb, LIMB_BITS};
