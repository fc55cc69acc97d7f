//! Read-only X.509 certificate model.
//!
//! A [`Certificate`] owns the [`Asn1Tree`](dertree_utils::asn1::Asn1Tree)
//! it was decoded from and exposes typed views over it. Nothing is
//! verified: signatures, chains and policy are left to the caller.

mod certificate;
mod extension;
mod name;
mod public_key;
mod text;

pub use certificate::Certificate;
pub use extension::{Extension, ExtensionValue};
pub use public_key::PublicKey;

use dertree_types::PkiError;

/// Object identifiers the certificate model reads directly.
pub mod known {
    pub const KEY_USAGE: &str = "2.5.29.15";
    pub const SUBJECT_ALT_NAME: &str = "2.5.29.17";
    pub const ISSUER_ALT_NAME: &str = "2.5.29.18";
    pub const BASIC_CONSTRAINTS: &str = "2.5.29.19";
    pub const EXT_KEY_USAGE: &str = "2.5.29.37";
    pub const SUBJECT_KEY_IDENTIFIER: &str = "2.5.29.14";
    pub const AUTHORITY_KEY_IDENTIFIER: &str = "2.5.29.35";
    pub const RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
    pub const EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
    pub const COMMON_NAME: &str = "2.5.4.3";
    pub const COUNTRY_NAME: &str = "2.5.4.6";
    pub const ORGANIZATION_NAME: &str = "2.5.4.10";
}

fn unexpected(what: impl Into<String>) -> PkiError {
    PkiError::UnexpectedStructure(what.into())
}
