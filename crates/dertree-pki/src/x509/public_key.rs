//! SubjectPublicKeyInfo view.

use dertree_types::PkiError;
use dertree_utils::asn1::{decode, Asn1Tree, Node, NodeId, TagNumber, Value};
use dertree_utils::oid;

use super::unexpected;

/// The subject public key of a certificate.
///
/// ```text
/// SubjectPublicKeyInfo ::= SEQUENCE {
///     algorithm         AlgorithmIdentifier,
///     subjectPublicKey  BIT STRING }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// The SubjectPublicKeyInfo on its own.
    spki: Asn1Tree,
    root: NodeId,
    algorithm_oid: String,
    unused_bits: u8,
    key: Vec<u8>,
}

impl PublicKey {
    /// Read a SubjectPublicKeyInfo node.
    pub fn from_node(spki: Node<'_>) -> Result<Self, PkiError> {
        if !spki.identifier().is(TagNumber::Sequence) || spki.child_count() != 2 {
            return Err(unexpected("SubjectPublicKeyInfo must be a SEQUENCE of two"));
        }
        let algorithm_oid = spki
            .child(0)
            .filter(|alg| alg.identifier().is(TagNumber::Sequence))
            .and_then(|alg| alg.child(0))
            .and_then(|n| n.as_oid())
            .ok_or_else(|| unexpected("public key algorithm identifier"))?
            .to_string();
        let (unused_bits, key) = match spki.child(1).map(|n| n.value()) {
            Some(Value::BitString { unused_bits, data }) => (*unused_bits, data.clone()),
            _ => return Err(unexpected("subjectPublicKey must be a BIT STRING")),
        };
        let tree = decode(spki.encoded())?;
        let root = tree
            .root(0)
            .map(|n| n.id())
            .ok_or_else(|| unexpected("empty SubjectPublicKeyInfo"))?;
        Ok(Self {
            spki: tree,
            root,
            algorithm_oid,
            unused_bits,
            key,
        })
    }

    /// Key material with the bit-string framing removed.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn algorithm_oid(&self) -> &str {
        &self.algorithm_oid
    }

    /// Registry name of the algorithm, or its dotted form.
    pub fn algorithm_name(&self) -> String {
        oid::display_name(&self.algorithm_oid)
    }

    /// The AlgorithmIdentifier parameters, e.g. the named curve of an EC
    /// key or the NULL of an RSA key.
    pub fn algorithm_params(&self) -> Option<Node<'_>> {
        self.node().child(0).and_then(|alg| alg.child(1))
    }

    /// Length of the bit string in bits.
    pub fn key_bits(&self) -> usize {
        (self.key.len() * 8).saturating_sub(self.unused_bits as usize)
    }

    /// The key material decoded as DER, when it is DER (RSA keys are a
    /// `SEQUENCE { modulus, publicExponent }`; EC points are not).
    pub fn decoded(&self) -> Option<Asn1Tree> {
        self.node().child(1).and_then(|bits| bits.decode_encapsulated())
    }

    /// The SubjectPublicKeyInfo node.
    pub fn node(&self) -> Node<'_> {
        self.spki.get(self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x509::fixtures::{der, EC_CERT_PEM, RSA_V1_CERT_PEM};
    use dertree_types::ErrorKind;

    fn spki_of(pem: &str, index: usize) -> PublicKey {
        let tree = decode(&der(pem)).unwrap();
        let spki = tree.root(0).and_then(|c| c.child(0)).and_then(|t| t.child(index)).unwrap();
        PublicKey::from_node(spki).unwrap()
    }

    #[test]
    fn test_ec_public_key() {
        let key = spki_of(EC_CERT_PEM, 6);
        assert_eq!(key.algorithm_oid(), "1.2.840.10045.2.1");
        assert_eq!(key.algorithm_name(), "ecPublicKey");
        assert_eq!(key.key().len(), 65);
        assert_eq!(&key.key()[..5], &[0x04, 0x25, 0x6B, 0x3A, 0xC4]);
        assert_eq!(key.key_bits(), 520);
        assert_eq!(
            key.algorithm_params().and_then(|p| p.as_oid()),
            Some("1.2.840.10045.3.1.7")
        );
        assert!(key.decoded().is_none());
    }

    #[test]
    fn test_rsa_public_key_decodes_nested() {
        let key = spki_of(RSA_V1_CERT_PEM, 5);
        assert_eq!(key.algorithm_name(), "rsaEncryption");
        assert_eq!(key.key().len(), 140);
        assert_eq!(&key.key()[..4], &[0x30, 0x81, 0x89, 0x02]);
        assert!(key
            .algorithm_params()
            .unwrap()
            .identifier()
            .is(TagNumber::Null));

        let nested = key.decoded().unwrap();
        let seq = nested.root(0).unwrap();
        assert_eq!(seq.child_count(), 2);
        let modulus = seq.child(0).and_then(|n| n.as_integer()).unwrap();
        assert_eq!(modulus.bit_len(), 1024);
        assert_eq!(seq.child(1).and_then(|n| n.as_integer()).and_then(|e| e.to_u64()), Some(65537));
    }

    #[test]
    fn test_rejects_malformed_spki() {
        // SEQUENCE { SEQUENCE { OID 1.2 }, OCTET STRING }
        let tree = decode(&[0x30, 0x08, 0x30, 0x03, 0x06, 0x01, 0x2A, 0x04, 0x01, 0x00]).unwrap();
        let err = PublicKey::from_node(tree.root(0).unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedStructure);

        let tree = decode(&[0x02, 0x01, 0x01]).unwrap();
        assert!(PublicKey::from_node(tree.root(0).unwrap()).is_err());
    }
}
