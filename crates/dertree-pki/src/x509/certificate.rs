//! Certificate population and accessors.

use chrono::{DateTime, Utc};
use dertree_bignum::BigNum;
use dertree_types::PkiError;
use dertree_utils::asn1::{decode, Asn1Tree, Node, NodeId, TagNumber, Value};
use dertree_utils::oid;

use super::extension::Extension;
use super::name::{attribute_values, distinguished_name};
use super::public_key::PublicKey;
use super::{known, unexpected};

/// A decoded X.509 certificate.
///
/// ```text
/// Certificate ::= SEQUENCE {
///     tbsCertificate       TBSCertificate,
///     signatureAlgorithm   AlgorithmIdentifier,
///     signatureValue       BIT STRING }
/// ```
///
/// The certificate owns the tree it was decoded from; every accessor is a
/// view over that tree or a value read from it at population time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    tree: Asn1Tree,
    layout: Layout,
    version: u32,
    serial_number: BigNum,
    sig_alg_oid: String,
    signature: Vec<u8>,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    issuer_dn: String,
    subject_dn: String,
    public_key: PublicKey,
    extensions: Vec<Extension>,
}

/// Positions of the certificate fields inside the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    root: NodeId,
    tbs: NodeId,
    serial: NodeId,
    issuer: NodeId,
    subject: NodeId,
    sig_alg: NodeId,
}

impl Certificate {
    /// Decode `raw` and read it as a certificate.
    ///
    /// Fails with a decode error when `raw` is not DER, and with
    /// `UnexpectedStructure` when it is DER but not shaped like a
    /// certificate.
    pub fn populate(raw: &[u8]) -> Result<Self, PkiError> {
        log::debug!("populating certificate from {} bytes", raw.len());
        let tree = decode(raw)?;
        let cert = Self::from_tree(tree)?;
        log::debug!(
            "certificate v{} subject \"{}\" with {} extension(s)",
            cert.version,
            cert.subject_dn,
            cert.extensions.len()
        );
        Ok(cert)
    }

    /// Read a certificate out of an already decoded tree.
    pub fn from_tree(tree: Asn1Tree) -> Result<Self, PkiError> {
        if tree.roots().len() != 1 {
            return Err(unexpected("expected exactly one top-level element"));
        }
        let root = tree
            .root(0)
            .ok_or_else(|| unexpected("expected exactly one top-level element"))?;
        expect_tag(root, TagNumber::Sequence, "Certificate")?;
        if root.child_count() != 3 {
            return Err(unexpected("Certificate must have three fields"));
        }
        let tbs = required(root, 0, TagNumber::Sequence, "tbsCertificate")?;
        let sig_alg = required(root, 1, TagNumber::Sequence, "signatureAlgorithm")?;
        let sig_value = required(root, 2, TagNumber::BitString, "signatureValue")?;

        let sig_alg_oid = algorithm_oid(sig_alg, "signatureAlgorithm")?;
        let signature = sig_value
            .as_bytes()
            .ok_or_else(|| unexpected("signatureValue"))?
            .to_vec();

        // The field iterator borrows `tree`, so it must end before the move below
        let (version, serial, issuer, validity, subject, spki, extensions) = {
            let mut fields = tbs.children().peekable();
            let version = match fields.next_if(|n| n.identifier().is_context(0, true)) {
                Some(explicit) => read_version(explicit)?,
                None => 1,
            };
            let serial = next_field(&mut fields, TagNumber::Integer, "serialNumber")?;
            let signature_alg = next_field(&mut fields, TagNumber::Sequence, "signature")?;
            algorithm_oid(signature_alg, "signature")?;
            let issuer = next_field(&mut fields, TagNumber::Sequence, "issuer")?;
            let validity = next_field(&mut fields, TagNumber::Sequence, "validity")?;
            let subject = next_field(&mut fields, TagNumber::Sequence, "subject")?;
            let spki = next_field(&mut fields, TagNumber::Sequence, "subjectPublicKeyInfo")?;

            fields.next_if(|n| n.identifier().is_context(1, false));
            fields.next_if(|n| n.identifier().is_context(2, false));
            let extensions = match fields.next_if(|n| n.identifier().is_context(3, true)) {
                Some(explicit) => read_extensions(explicit)?,
                None => Vec::new(),
            };
            if let Some(extra) = fields.next() {
                return Err(unexpected(format!(
                    "unexpected {} at offset {} in tbsCertificate",
                    extra.identifier(),
                    extra.offset()
                )));
            }
            (version, serial, issuer, validity, subject, spki, extensions)
        };

        let (not_before, not_after) = read_validity(validity)?;
        let serial_number = serial
            .as_integer()
            .ok_or_else(|| unexpected("serialNumber"))?
            .clone();
        let public_key = PublicKey::from_node(spki)?;
        let issuer_dn = distinguished_name(issuer);
        let subject_dn = distinguished_name(subject);

        let layout = Layout {
            root: root.id(),
            tbs: tbs.id(),
            serial: serial.id(),
            issuer: issuer.id(),
            subject: subject.id(),
            sig_alg: sig_alg.id(),
        };
        Ok(Self {
            tree,
            layout,
            version,
            serial_number,
            sig_alg_oid,
            signature,
            not_before,
            not_after,
            issuer_dn,
            subject_dn,
            public_key,
            extensions,
        })
    }

    /// The decoded tree, for raw navigation.
    pub fn tree(&self) -> &Asn1Tree {
        &self.tree
    }

    /// The certificate's top-level SEQUENCE.
    pub fn root(&self) -> Node<'_> {
        self.tree.get(self.layout.root)
    }

    /// The tbsCertificate SEQUENCE.
    pub fn tbs(&self) -> Node<'_> {
        self.tree.get(self.layout.tbs)
    }

    /// The DER encoding the certificate was populated from.
    pub fn to_der(&self) -> &[u8] {
        self.tree.as_bytes()
    }

    /// Certificate version, 1-based (v1 when the field is absent).
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn serial_number(&self) -> &BigNum {
        &self.serial_number
    }

    /// Serial number content octets as encoded.
    pub fn serial_number_bytes(&self) -> &[u8] {
        self.tree.get(self.layout.serial).content()
    }

    pub fn subject_distinguished_name(&self) -> &str {
        &self.subject_dn
    }

    pub fn issuer_distinguished_name(&self) -> &str {
        &self.issuer_dn
    }

    /// Every subject attribute value of type `oid`.
    pub fn subject(&self, oid: &str) -> Vec<String> {
        attribute_values(self.tree.get(self.layout.subject), oid)
    }

    /// Every issuer attribute value of type `oid`.
    pub fn issuer(&self, oid: &str) -> Vec<String> {
        attribute_values(self.tree.get(self.layout.issuer), oid)
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// True when `at` lies inside the validity window, both ends included.
    pub fn check_validity(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at <= self.not_after
    }

    pub fn sig_alg_oid(&self) -> &str {
        &self.sig_alg_oid
    }

    pub fn sig_alg_name(&self) -> String {
        oid::display_name(&self.sig_alg_oid)
    }

    /// Parameters of the outer signatureAlgorithm, if any.
    pub fn sig_alg_params(&self) -> Option<Node<'_>> {
        self.tree.get(self.layout.sig_alg).child(1)
    }

    /// Signature bits without the unused-bits octet.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Extensions in encoding order.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn extension(&self, oid: &str) -> Option<&Extension> {
        self.extensions.iter().find(|e| e.oid() == oid)
    }

    pub fn critical_extension_oids(&self) -> Vec<&str> {
        self.extension_oids(true)
    }

    pub fn non_critical_extension_oids(&self) -> Vec<&str> {
        self.extension_oids(false)
    }

    /// The KeyUsage bits in RFC 5280 order, from digitalSignature (0) to
    /// decipherOnly (8). All false when the extension is absent.
    pub fn key_usage(&self) -> [bool; 9] {
        let mut usage = [false; 9];
        let Some(Value::BitString { data, .. }) = self
            .extension(known::KEY_USAGE)
            .and_then(|e| e.value_node())
            .map(|n| n.value())
        else {
            return usage;
        };
        for (bit, flag) in usage.iter_mut().enumerate() {
            *flag = data
                .get(bit / 8)
                .is_some_and(|byte| byte & (0x80 >> (bit % 8)) != 0);
        }
        usage
    }

    /// ExtendedKeyUsage purposes as dotted OIDs.
    pub fn extended_key_usage(&self) -> Vec<String> {
        self.extension_strings(known::EXT_KEY_USAGE)
    }

    /// Text-valued GeneralNames of the subjectAltName extension.
    pub fn subject_alternative_names(&self) -> Vec<String> {
        self.extension_strings(known::SUBJECT_ALT_NAME)
    }

    /// Text-valued GeneralNames of the issuerAltName extension.
    pub fn issuer_alternative_names(&self) -> Vec<String> {
        self.extension_strings(known::ISSUER_ALT_NAME)
    }

    fn extension_strings(&self, oid: &str) -> Vec<String> {
        self.extension(oid)
            .map(Extension::value_as_strings)
            .unwrap_or_default()
    }

    fn extension_oids(&self, critical: bool) -> Vec<&str> {
        self.extensions
            .iter()
            .filter(|e| e.is_critical() == critical)
            .map(Extension::oid)
            .collect()
    }
}

fn expect_tag(node: Node<'_>, tag: TagNumber, what: &str) -> Result<(), PkiError> {
    if node.identifier().is(tag) {
        Ok(())
    } else {
        Err(unexpected(format!(
            "{what}: expected {}, found {} at offset {}",
            tag.name(),
            node.identifier(),
            node.offset()
        )))
    }
}

fn required<'t>(
    parent: Node<'t>,
    index: usize,
    tag: TagNumber,
    what: &str,
) -> Result<Node<'t>, PkiError> {
    let node = parent
        .child(index)
        .ok_or_else(|| unexpected(format!("missing {what}")))?;
    expect_tag(node, tag, what)?;
    Ok(node)
}

fn next_field<'t>(
    fields: &mut impl Iterator<Item = Node<'t>>,
    tag: TagNumber,
    what: &str,
) -> Result<Node<'t>, PkiError> {
    let node = fields
        .next()
        .ok_or_else(|| unexpected(format!("missing {what}")))?;
    expect_tag(node, tag, what)?;
    Ok(node)
}

/// The OID leading an AlgorithmIdentifier.
fn algorithm_oid(alg: Node<'_>, what: &str) -> Result<String, PkiError> {
    alg.child(0)
        .and_then(|n| n.as_oid())
        .map(str::to_string)
        .ok_or_else(|| unexpected(format!("{what} has no algorithm OID")))
}

/// `[0] EXPLICIT INTEGER`, encoded 0-based.
fn read_version(explicit: Node<'_>) -> Result<u32, PkiError> {
    if explicit.child_count() != 1 {
        return Err(unexpected("version must wrap one INTEGER"));
    }
    required(explicit, 0, TagNumber::Integer, "version")?
        .as_integer()
        .and_then(BigNum::to_u64)
        .and_then(|v| u32::try_from(v).ok())
        .and_then(|v| v.checked_add(1))
        .ok_or_else(|| unexpected("version out of range"))
}

fn read_validity(validity: Node<'_>) -> Result<(DateTime<Utc>, DateTime<Utc>), PkiError> {
    if validity.child_count() != 2 {
        return Err(unexpected("validity must hold two times"));
    }
    let time = |index: usize, what: &str| {
        validity
            .child(index)
            .and_then(|n| n.as_time())
            .ok_or_else(|| unexpected(format!("{what} must be UTCTime or GeneralizedTime")))
    };
    Ok((time(0, "notBefore")?, time(1, "notAfter")?))
}

/// `[3] EXPLICIT SEQUENCE OF Extension`.
fn read_extensions(explicit: Node<'_>) -> Result<Vec<Extension>, PkiError> {
    if explicit.child_count() != 1 {
        return Err(unexpected("extensions must wrap one SEQUENCE"));
    }
    required(explicit, 0, TagNumber::Sequence, "extensions")?
        .children()
        .map(Extension::from_node)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x509::fixtures::{der, EC_CERT_PEM, RSA_V1_CERT_PEM};
    use crate::x509::ExtensionValue;
    use chrono::TimeZone;
    use dertree_types::ErrorKind;

    fn ec_cert() -> Certificate {
        Certificate::populate(&der(EC_CERT_PEM)).unwrap()
    }

    fn rsa_cert() -> Certificate {
        Certificate::populate(&der(RSA_V1_CERT_PEM)).unwrap()
    }

    #[test]
    fn test_ec_cert_basic_fields() {
        let cert = ec_cert();
        assert_eq!(cert.version(), 3);
        assert_eq!(cert.serial_number().to_u64(), Some(0x1234_5678_90AB_CDEF));
        assert_eq!(
            cert.serial_number_bytes(),
            &[0x12, 0x34, 0x56, 0x78, 0x90, 0xAB, 0xCD, 0xEF]
        );
        assert_eq!(cert.sig_alg_oid(), "1.2.840.10045.4.3.2");
        assert_eq!(cert.sig_alg_name(), "ecdsaWithSHA256");
        assert!(cert.sig_alg_params().is_none());
        assert_eq!(cert.signature().len(), 72);
        assert_eq!(&cert.signature()[..4], &[0x30, 0x46, 0x02, 0x21]);
        assert_eq!(cert.to_der().len(), 506);
    }

    #[test]
    fn test_ec_cert_names() {
        let cert = ec_cert();
        assert_eq!(
            cert.subject_distinguished_name(),
            "CN=example.com, O=\"Example, Inc.\", C=US"
        );
        assert_eq!(cert.issuer_distinguished_name(), cert.subject_distinguished_name());
        assert_eq!(cert.subject(known::COMMON_NAME), vec!["example.com"]);
        assert_eq!(cert.issuer(known::ORGANIZATION_NAME), vec!["Example, Inc."]);
        assert!(cert.subject("2.5.4.11").is_empty());
    }

    #[test]
    fn test_ec_cert_validity() {
        let cert = ec_cert();
        let not_before = Utc.with_ymd_and_hms(2026, 10, 18, 8, 15, 27).unwrap();
        let not_after = Utc.with_ymd_and_hms(2036, 10, 15, 8, 15, 27).unwrap();
        assert_eq!(cert.not_before(), not_before);
        assert_eq!(cert.not_after(), not_after);
        assert!(cert.check_validity(not_before));
        assert!(cert.check_validity(not_after));
        assert!(!cert.check_validity(not_before - chrono::TimeDelta::seconds(1)));
        assert!(!cert.check_validity(not_after + chrono::TimeDelta::seconds(1)));
    }

    #[test]
    fn test_ec_cert_extensions() {
        let cert = ec_cert();
        let oids: Vec<&str> = cert.extensions().iter().map(|e| e.oid()).collect();
        assert_eq!(
            oids,
            vec!["2.5.29.19", "2.5.29.15", "2.5.29.37", "2.5.29.17", "2.5.29.14"]
        );
        assert_eq!(cert.critical_extension_oids(), vec!["2.5.29.19", "2.5.29.15"]);
        assert_eq!(
            cert.non_critical_extension_oids(),
            vec!["2.5.29.37", "2.5.29.17", "2.5.29.14"]
        );

        let bc = cert.extension(known::BASIC_CONSTRAINTS).unwrap();
        assert!(bc.is_critical());
        assert_eq!(bc.raw_value(), &[0x30, 0x00]);
        assert_eq!(bc.value_node().map(|n| n.child_count()), Some(0));

        let ski = cert.extension(known::SUBJECT_KEY_IDENTIFIER).unwrap();
        match ski.value() {
            ExtensionValue::Nested(tree) => {
                assert_eq!(tree.root(0).and_then(|n| n.as_bytes()).map(<[u8]>::len), Some(20));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(cert.extension(known::AUTHORITY_KEY_IDENTIFIER).is_none());
    }

    #[test]
    fn test_ec_cert_usages_and_names() {
        let cert = ec_cert();
        let ku = cert.key_usage();
        assert_eq!(
            ku,
            [true, false, true, false, false, false, false, false, false]
        );
        assert_eq!(
            cert.extended_key_usage(),
            vec!["1.3.6.1.5.5.7.3.1", "1.3.6.1.5.5.7.3.2"]
        );
        assert_eq!(
            cert.subject_alternative_names(),
            vec!["example.com", "www.example.com"]
        );
        assert!(cert.issuer_alternative_names().is_empty());
    }

    #[test]
    fn test_ec_cert_public_key() {
        let cert = ec_cert();
        let key = cert.public_key();
        assert_eq!(key.algorithm_name(), "ecPublicKey");
        assert_eq!(key.key().len(), 65);
        assert_eq!(key.node().encoded(), cert.tbs().child(6).unwrap().encoded());
    }

    #[test]
    fn test_rsa_v1_cert() {
        let cert = rsa_cert();
        assert_eq!(cert.version(), 1);
        assert_eq!(cert.serial_number().to_u64(), Some(7));
        assert_eq!(cert.sig_alg_name(), "sha256WithRSAEncryption");
        assert!(cert
            .sig_alg_params()
            .unwrap()
            .identifier()
            .is(TagNumber::Null));
        assert_eq!(cert.subject_distinguished_name(), "CN=Legacy Root, ST=Berlin, C=DE");
        assert_eq!(cert.subject(known::COUNTRY_NAME), vec!["DE"]);
        assert_eq!(
            cert.not_after(),
            Utc.with_ymd_and_hms(2027, 10, 18, 8, 15, 34).unwrap()
        );
        assert!(cert.extensions().is_empty());
        assert_eq!(cert.key_usage(), [false; 9]);
        assert!(cert.subject_alternative_names().is_empty());
        assert_eq!(cert.signature().len(), 128);
        assert_eq!(cert.public_key().key().len(), 140);
    }

    #[test]
    fn test_root_navigation() {
        let cert = ec_cert();
        let root = cert.root();
        assert_eq!(root.child_count(), 3);
        assert_eq!(cert.tbs().id(), root.child(0).unwrap().id());
        let cn = cert.tree().find_enclosing(known::COMMON_NAME).unwrap();
        assert_eq!(cn.child(1).and_then(|n| n.as_text()), Some("example.com"));
    }

    #[test]
    fn test_populate_bare_integer() {
        let err = Certificate::populate(&[0x02, 0x01, 0x05]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedStructure);
    }

    #[test]
    fn test_populate_propagates_decode_errors() {
        let err = Certificate::populate(&[0x30, 0x05, 0x02]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Truncated);
        assert!(matches!(err, PkiError::Decode(_)));
    }

    #[test]
    fn test_populate_rejects_two_certificates() {
        let mut raw = der(EC_CERT_PEM);
        raw.extend(der(RSA_V1_CERT_PEM));
        let err = Certificate::populate(&raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedStructure);
    }

    #[test]
    fn test_populate_rejects_empty_and_wrong_shapes() {
        for raw in [
            &[][..],
            &[0x30, 0x00][..],
            &[0x30, 0x06, 0x30, 0x00, 0x30, 0x00, 0x05, 0x00][..],
            &[0x31, 0x07, 0x30, 0x00, 0x30, 0x00, 0x03, 0x01, 0x00][..],
        ] {
            let err = Certificate::populate(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnexpectedStructure, "{raw:02x?}");
        }
    }

    #[test]
    fn test_populate_rejects_tampered_tbs() {
        // turn the serial INTEGER into an OCTET STRING
        let mut raw = der(EC_CERT_PEM);
        let serial_offset = Certificate::populate(&raw)
            .unwrap()
            .tbs()
            .child(1)
            .unwrap()
            .offset();
        raw[serial_offset] = 0x04;
        let err = Certificate::populate(&raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedStructure);
    }

    #[test]
    fn test_from_tree_owns_decoded_tree() {
        let raw = der(RSA_V1_CERT_PEM);
        let tree = decode(&raw).unwrap();
        let expected = tree.clone();
        let cert = Certificate::from_tree(tree).unwrap();
        assert_eq!(cert.tree(), &expected);
        assert_eq!(cert.to_der(), &raw[..]);
        assert_eq!(cert.root().id(), expected.root(0).unwrap().id());

        let err = Certificate::from_tree(decode(&[0x05, 0x00, 0x05, 0x00]).unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedStructure);
    }

    #[test]
    fn test_certificate_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Certificate>();
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use proptest::sample::Index;

        proptest! {
            #[test]
            fn test_populate_mutated_certificate(edits in proptest::collection::vec((any::<Index>(), any::<u8>()), 1..8)) {
                let mut raw = der(EC_CERT_PEM);
                for (index, byte) in edits {
                    let i = index.index(raw.len());
                    raw[i] = byte;
                }
                match Certificate::populate(&raw) {
                    Ok(cert) => prop_assert_eq!(cert.to_der(), &raw[..]),
                    Err(err) => prop_assert_eq!(Certificate::populate(&raw).unwrap_err().kind(), err.kind()),
                }
            }

            #[test]
            fn test_populate_truncated_certificate(len in 0usize..400) {
                let raw = der(EC_CERT_PEM);
                let cut = &raw[..len.min(raw.len() - 1)];
                prop_assert!(Certificate::populate(cut).is_err());
            }
        }
    }
}
