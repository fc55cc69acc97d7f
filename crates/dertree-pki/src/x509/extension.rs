//! X.509 v3 extensions.

use dertree_types::PkiError;
use dertree_utils::asn1::{Asn1Tree, Node, TagNumber};
use dertree_utils::oid;

use super::name::{attribute_text, general_name_text};
use super::unexpected;

/// The `extnValue` of an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionValue {
    /// The OCTET STRING content decoded as DER.
    Nested(Asn1Tree),
    /// Content that is not itself DER, kept as raw bytes.
    Opaque(Vec<u8>),
}

/// One entry of the certificate's extensions sequence.
///
/// ```text
/// Extension ::= SEQUENCE {
///     extnID     OBJECT IDENTIFIER,
///     critical   BOOLEAN DEFAULT FALSE,
///     extnValue  OCTET STRING }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    oid: String,
    critical: bool,
    raw_value: Vec<u8>,
    value: ExtensionValue,
}

impl Extension {
    /// Read an `Extension` SEQUENCE.
    pub fn from_node(node: Node<'_>) -> Result<Self, PkiError> {
        if !node.identifier().is(TagNumber::Sequence) {
            return Err(unexpected("extension must be a SEQUENCE"));
        }
        let oid = node
            .child(0)
            .and_then(|n| n.as_oid())
            .ok_or_else(|| unexpected("extension without an extnID"))?
            .to_string();
        let critical = match node.child_count() {
            2 => false,
            3 => node
                .child(1)
                .and_then(|n| n.as_bool())
                .ok_or_else(|| unexpected(format!("extension {oid}: critical must be BOOLEAN")))?,
            n => return Err(unexpected(format!("extension {oid} has {n} fields"))),
        };
        let value_node = node
            .last_child()
            .filter(|n| n.identifier().is(TagNumber::OctetString))
            .ok_or_else(|| unexpected(format!("extension {oid}: extnValue must be an OCTET STRING")))?;
        let raw_value = value_node.content().to_vec();
        let value = match value_node.decode_encapsulated() {
            Some(tree) => ExtensionValue::Nested(tree),
            None => ExtensionValue::Opaque(raw_value.clone()),
        };
        Ok(Self {
            oid,
            critical,
            raw_value,
            value,
        })
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    /// Registry name of the extension, or its dotted form.
    pub fn name(&self) -> String {
        oid::display_name(&self.oid)
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn value(&self) -> &ExtensionValue {
        &self.value
    }

    /// The OCTET STRING content, decoded or not.
    pub fn raw_value(&self) -> &[u8] {
        &self.raw_value
    }

    /// Root of the nested value, if it decoded.
    pub fn value_node(&self) -> Option<Node<'_>> {
        match &self.value {
            ExtensionValue::Nested(tree) => tree.root(0),
            ExtensionValue::Opaque(_) => None,
        }
    }

    /// Strings carried by the children of the nested value: text values,
    /// object identifiers in dotted form, and primitive GeneralNames
    /// (`dNSName`, `iPAddress`, `registeredID` and the like).
    pub fn value_as_strings(&self) -> Vec<String> {
        let Some(node) = self.value_node() else {
            return Vec::new();
        };
        node.children()
            .filter_map(|child| match child.as_oid() {
                Some(oid) => Some(oid.to_string()),
                None => attribute_text(child).or_else(|| general_name_text(child)),
            })
            .collect()
    }
}
