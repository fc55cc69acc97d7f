//! Distinguished-name rendering and attribute lookup.

use std::net::IpAddr;

use dertree_utils::asn1::{Node, TagClass};
use dertree_utils::oid::Oid;

/// Attribute keys in rendering order, with their object identifiers.
const DN_ORDER: &[(&str, &str)] = &[
    ("CN", "2.5.4.3"),
    ("DNQ", "2.5.4.46"),
    ("SERIALNUMBER", "2.5.4.5"),
    ("GIVENNAME", "2.5.4.42"),
    ("SURNAME", "2.5.4.4"),
    ("OU", "2.5.4.11"),
    ("O", "2.5.4.10"),
    ("STREET", "2.5.4.9"),
    ("L", "2.5.4.7"),
    ("ST", "2.5.4.8"),
    ("C", "2.5.4.6"),
    ("E", "1.2.840.113549.1.9.1"),
];

const SPECIAL_CHARS: &[char] = &[',', '+', '=', '\n', '<', '>', '#', ';', '\\'];

/// Render a `Name` as `CN=…, O=…, C=…`.
///
/// Attributes appear in a fixed order regardless of their order in the
/// encoding; only the first occurrence of each type is shown and types
/// outside the table are skipped.
pub(crate) fn distinguished_name(name: Node<'_>) -> String {
    DN_ORDER
        .iter()
        .filter_map(|(key, oid)| {
            let value = name
                .find_enclosing(oid)
                .and_then(|atv| atv.last_child())
                .and_then(attribute_text)?;
            Some(format!("{key}={}", quote(&value)))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every value of attribute `oid` in a `Name`, in encoding order.
pub(crate) fn attribute_values(name: Node<'_>, oid: &str) -> Vec<String> {
    name.children()
        .flat_map(|rdn| rdn.children())
        .filter(|atv| atv.child(0).and_then(|n| n.as_oid()) == Some(oid))
        .filter_map(|atv| atv.last_child().and_then(attribute_text))
        .collect()
}

/// Text of a string node.
pub(crate) fn attribute_text(node: Node<'_>) -> Option<String> {
    node.as_text().map(str::to_string)
}

/// Text form of a primitive GeneralName.
///
/// `rfc822Name`, `dNSName` and `uniformResourceIdentifier` are IA5 text,
/// `iPAddress` renders as an address and `registeredID` in dotted form.
/// Other choices have no single-line text form.
pub(crate) fn general_name_text(node: Node<'_>) -> Option<String> {
    let id = node.identifier();
    if id.type_class() != TagClass::ContextSpecific || id.is_constructed() {
        return None;
    }
    let content = node.content();
    match id.number() {
        1 | 2 | 6 => std::str::from_utf8(content)
            .ok()
            .filter(|text| text.is_ascii())
            .map(str::to_string),
        7 => ip_address(content).map(|ip| ip.to_string()),
        8 => Oid::from_der_value(content).ok().map(|oid| oid.to_string()),
        _ => None,
    }
}

/// An `iPAddress` GeneralName: four octets for IPv4, sixteen for IPv6.
pub(crate) fn ip_address(content: &[u8]) -> Option<IpAddr> {
    match content.len() {
        4 => <[u8; 4]>::try_from(content).ok().map(IpAddr::from),
        16 => <[u8; 16]>::try_from(content).ok().map(IpAddr::from),
        _ => None,
    }
}

fn quote(value: &str) -> String {
    if value.contains(SPECIAL_CHARS) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}
