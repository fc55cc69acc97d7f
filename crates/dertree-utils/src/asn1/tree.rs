//! The decoded tree: an arena of node records plus borrowed node views.

use std::fmt;
use std::ops::Range;

use chrono::{DateTime, Utc};
use dertree_bignum::BigNum;

use super::{decode, Identifier, Value};
use crate::oid;

/// Index of a node inside its [`Asn1Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in pre-order.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeRecord {
    pub(crate) identifier: Identifier,
    pub(crate) header_offset: usize,
    pub(crate) content: Range<usize>,
    pub(crate) value: Value,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) depth: usize,
}

/// An owned, immutable parse tree.
///
/// The tree keeps its own copy of the input. Records are stored in
/// pre-order, so the subtree under any node occupies a contiguous run of
/// the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asn1Tree {
    data: Vec<u8>,
    nodes: Vec<NodeRecord>,
    roots: Vec<NodeId>,
}

impl Asn1Tree {
    pub(crate) fn from_parts(data: Vec<u8>, nodes: Vec<NodeRecord>, roots: Vec<NodeId>) -> Self {
        Self { data, nodes, roots }
    }

    /// The bytes this tree was decoded from.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Top-level nodes in encoding order.
    pub fn roots(&self) -> impl ExactSizeIterator<Item = Node<'_>> + '_ {
        self.roots.iter().map(move |&id| Node { tree: self, id })
    }

    /// The `n`th top-level node.
    pub fn root(&self, n: usize) -> Option<Node<'_>> {
        self.roots.get(n).map(|&id| Node { tree: self, id })
    }

    /// Total number of nodes at every depth.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        (id.0 < self.nodes.len()).then_some(Node { tree: self, id })
    }

    /// View of a node known to belong to this tree.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn get(&self, id: NodeId) -> Node<'_> {
        assert!(id.0 < self.nodes.len(), "node id {} out of range", id.0);
        Node { tree: self, id }
    }

    /// Every node in pre-order across all top-level elements.
    pub fn iter(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        (0..self.nodes.len()).map(move |i| Node {
            tree: self,
            id: NodeId(i),
        })
    }

    /// First node, in pre-order across the top-level nodes, whose value is
    /// the object identifier `oid`.
    pub fn find_oid(&self, oid: &str) -> Option<Node<'_>> {
        self.iter().find(|n| n.as_oid() == Some(oid))
    }

    /// Parent of the node [`find_oid`](Self::find_oid) returns, typically
    /// the `SEQUENCE { OID, value }` wrapper.
    pub fn find_enclosing(&self, oid: &str) -> Option<Node<'_>> {
        self.find_oid(oid).and_then(|n| n.parent())
    }

    fn record(&self, id: NodeId) -> &NodeRecord {
        &self.nodes[id.0]
    }
}

/// A borrowed view of one node.
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t Asn1Tree,
    id: NodeId,
}

impl<'t> Node<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tree this node belongs to.
    pub fn tree(&self) -> &'t Asn1Tree {
        self.tree
    }

    pub fn identifier(&self) -> Identifier {
        self.record().identifier
    }

    pub fn value(&self) -> &'t Value {
        &self.record().value
    }

    /// Raw content octets, excluding the identifier and length.
    pub fn content(&self) -> &'t [u8] {
        &self.tree.data[self.record().content.clone()]
    }

    /// The full encoding of this node, header included.
    pub fn encoded(&self) -> &'t [u8] {
        let r = self.record();
        &self.tree.data[r.header_offset..r.content.end]
    }

    /// Offset of the identifier byte in the decoded input.
    pub fn offset(&self) -> usize {
        self.record().header_offset
    }

    /// Identifier plus length octets.
    pub fn header_len(&self) -> usize {
        let r = self.record();
        r.content.start - r.header_offset
    }

    /// Nesting depth; top-level nodes are at 0.
    pub fn depth(&self) -> usize {
        self.record().depth
    }

    pub fn children(&self) -> impl ExactSizeIterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        self.tree
            .record(self.id)
            .children
            .iter()
            .map(move |&id| Node { tree, id })
    }

    pub fn child(&self, n: usize) -> Option<Node<'t>> {
        self.record().children.get(n).map(|&id| self.with_id(id))
    }

    pub fn child_count(&self) -> usize {
        self.record().children.len()
    }

    pub fn last_child(&self) -> Option<Node<'t>> {
        self.record().children.last().map(|&id| self.with_id(id))
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.record().parent.map(|id| self.with_id(id))
    }

    /// Depth-first pre-order search of this subtree, this node included,
    /// for the first object identifier equal to `oid`.
    pub fn find_oid(&self, oid: &str) -> Option<Node<'t>> {
        self.subtree().find(|n| n.as_oid() == Some(oid))
    }

    /// This node followed by all of its descendants, in pre-order.
    pub fn subtree(&self) -> impl Iterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        let depth = self.depth();
        let start = self.id.0;
        tree.nodes[start..]
            .iter()
            .enumerate()
            .take_while(move |(i, r)| *i == 0 || r.depth > depth)
            .map(move |(i, _)| Node {
                tree,
                id: NodeId(start + i),
            })
    }

    /// Parent of the node [`find_oid`](Self::find_oid) returns.
    pub fn find_enclosing(&self, oid: &str) -> Option<Node<'t>> {
        self.find_oid(oid).and_then(|n| n.parent())
    }

    pub fn as_text(&self) -> Option<&'t str> {
        self.value().as_text()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value().as_bool()
    }

    pub fn as_integer(&self) -> Option<&'t BigNum> {
        self.value().as_integer()
    }

    pub fn as_oid(&self) -> Option<&'t str> {
        self.value().as_oid()
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        self.value().as_time()
    }

    /// Octet-string bytes or bit-string data.
    pub fn as_bytes(&self) -> Option<&'t [u8]> {
        self.value().as_bytes()
    }

    /// Decode the content of an OCTET STRING, or of a BIT STRING without
    /// unused bits, as a DER structure of its own.
    ///
    /// Returns `None` when the node carries no such content or the content
    /// is not well-formed DER. The nested tree reports offsets relative to
    /// the encapsulated bytes.
    pub fn decode_encapsulated(&self) -> Option<Asn1Tree> {
        let inner = match self.value() {
            Value::Bytes(b) => b.as_slice(),
            Value::BitString {
                unused_bits: 0,
                data,
            } => data.as_slice(),
            _ => return None,
        };
        if inner.is_empty() {
            return None;
        }
        match decode(inner) {
            Ok(tree) => Some(tree),
            Err(e) => {
                log::trace!("content at {} is not nested DER: {e}", self.offset());
                None
            }
        }
    }

    fn record(&self) -> &'t NodeRecord {
        self.tree.record(self.id)
    }

    fn with_id(&self, id: NodeId) -> Node<'t> {
        Node {
            tree: self.tree,
            id,
        }
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("offset", &self.offset())
            .field("identifier", &self.identifier())
            .field("value", self.value())
            .field("children", &self.child_count())
            .finish()
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

/// One line per node, in the layout of `openssl asn1parse -i`.
impl fmt::Display for Asn1Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.iter() {
            writeln!(f, "{node}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.identifier();
        write!(
            f,
            "{:5}:d={:<2} hl={} l={:4} {}: {:indent$}",
            self.offset(),
            self.depth(),
            self.header_len(),
            self.content().len(),
            if id.is_constructed() { "cons" } else { "prim" },
            "",
            indent = self.depth(),
        )?;
        match value_text(self) {
            Some(text) => write!(f, "{:<18}:{text}", id.to_string()),
            None => write!(f, "{id}"),
        }
    }
}

fn value_text(node: &Node<'_>) -> Option<String> {
    match node.value() {
        Value::Absent | Value::BitString { .. } => None,
        Value::Boolean(_) => node.content().first().map(|b| b.to_string()),
        Value::Integer(n) if n.is_negative() => {
            Some(format!("-{}", hex::encode_upper(n.neg().to_bytes_be())))
        }
        Value::Integer(n) => Some(hex::encode_upper(n.to_bytes_be())),
        Value::Bytes(b) => Some(format!("[HEX DUMP]:{}", hex::encode_upper(b))),
        Value::Text(s) => Some(s.clone()),
        Value::ObjectIdentifier(s) => Some(oid::display_name(s)),
        Value::RelativeOid(s) => Some(s.clone()),
        Value::Time(_) => Some(String::from_utf8_lossy(node.content()).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asn1::TagNumber;

    // SEQUENCE { SEQUENCE { OID 2.5.4.3, UTF8String "example.com" },
    //            SEQUENCE { OID 2.5.4.6, PrintableString "US" } }
    const NAME: &[u8] = &[
        0x30, 0x1F, 0x30, 0x12, 0x06, 0x03, 0x55, 0x04, 0x03, 0x0C, 0x0B, b'e', b'x', b'a',
        b'm', b'p', b'l', b'e', b'.', b'c', b'o', b'm', 0x30, 0x09, 0x06, 0x03, 0x55, 0x04,
        0x06, 0x13, 0x02, b'U', b'S',
    ];

    #[test]
    fn test_find_oid_returns_oid_node() {
        let tree = decode(NAME).unwrap();
        let oid = tree.find_oid("2.5.4.3").unwrap();
        assert!(oid.identifier().is(TagNumber::ObjectIdentifier));
        assert_eq!(oid.offset(), 4);
        let seq = oid.parent().unwrap();
        assert_eq!(seq.child(1).and_then(|n| n.as_text()), Some("example.com"));
        assert_eq!(tree.find_enclosing("2.5.4.3"), Some(seq));
        assert!(tree.find_oid("2.5.4.10").is_none());
    }

    #[test]
    fn test_node_find_oid_is_scoped_to_subtree() {
        let tree = decode(NAME).unwrap();
        let root = tree.root(0).unwrap();
        let first = root.child(0).unwrap();
        let second = root.child(1).unwrap();
        assert!(first.find_oid("2.5.4.6").is_none());
        assert_eq!(
            second.find_enclosing("2.5.4.6").and_then(|n| n.last_child()).and_then(|n| n.as_text()),
            Some("US")
        );
        let oid = second.child(0).unwrap();
        assert_eq!(oid.find_oid("2.5.4.6"), Some(oid));
        let offsets: Vec<usize> = first.subtree().map(|n| n.offset()).collect();
        assert_eq!(offsets, vec![2, 4, 9]);
        assert_eq!(root.subtree().count(), tree.len());
    }

    #[test]
    fn test_find_oid_searches_later_roots() {
        let mut der = vec![0x05, 0x00];
        der.extend_from_slice(NAME);
        let tree = decode(&der).unwrap();
        assert_eq!(tree.find_oid("2.5.4.6").map(|n| n.offset()), Some(2 + 24));
    }

    #[test]
    fn test_content_and_encoded() {
        let tree = decode(NAME).unwrap();
        let text = tree.find_enclosing("2.5.4.6").unwrap().child(1).unwrap();
        assert_eq!(text.content(), b"US");
        assert_eq!(text.encoded(), &[0x13, 0x02, b'U', b'S']);
        assert_eq!(tree.root(0).unwrap().encoded(), NAME);
        assert_eq!(tree.as_bytes(), NAME);
    }

    #[test]
    fn test_children_iterator() {
        let tree = decode(NAME).unwrap();
        let root = tree.root(0).unwrap();
        let offsets: Vec<usize> = root.children().map(|n| n.offset()).collect();
        assert_eq!(offsets, vec![2, 22]);
        assert_eq!(root.children().len(), root.child_count());
        assert!(root.child(2).is_none());
        assert_eq!(tree.get(root.id()), root);
        assert!(tree.node(NodeId(tree.len())).is_none());
    }

    #[test]
    fn test_decode_encapsulated() {
        // OCTET STRING { SEQUENCE { BOOLEAN TRUE } }
        let tree = decode(&[0x04, 0x05, 0x30, 0x03, 0x01, 0x01, 0xFF]).unwrap();
        let inner = tree.root(0).unwrap().decode_encapsulated().unwrap();
        assert_eq!(inner.root(0).and_then(|n| n.child(0)).and_then(|n| n.as_bool()), Some(true));

        // BIT STRING, no unused bits, wrapping NULL
        let tree = decode(&[0x03, 0x03, 0x00, 0x05, 0x00]).unwrap();
        assert!(tree.root(0).unwrap().decode_encapsulated().is_some());

        // not DER, unused bits set, empty, wrong type
        for der in [
            &[0x04, 0x02, 0x30, 0x05][..],
            &[0x03, 0x03, 0x01, 0x05, 0x00][..],
            &[0x04, 0x00][..],
            &[0x02, 0x01, 0x00][..],
        ] {
            let tree = decode(der).unwrap();
            assert!(tree.root(0).unwrap().decode_encapsulated().is_none());
        }
    }

    #[test]
    fn test_display_dump() {
        let tree = decode(NAME).unwrap();
        let dump = tree.to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "    0:d=0  hl=2 l=  31 cons: SEQUENCE");
        assert_eq!(lines[1], "    2:d=1  hl=2 l=  18 cons:  SEQUENCE");
        assert_eq!(
            lines[2],
            "    4:d=2  hl=2 l=   3 prim:   OBJECT            :commonName"
        );
        assert_eq!(
            lines[3],
            "    9:d=2  hl=2 l=  11 prim:   UTF8STRING        :example.com"
        );
    }

    #[test]
    fn test_display_integer_and_bytes() {
        let tree = decode(&[0x02, 0x02, 0xFF, 0x7F, 0x04, 0x02, 0xDE, 0xAD]).unwrap();
        let dump = tree.to_string();
        assert!(dump.contains("INTEGER           :-81"));
        assert!(dump.contains("OCTET STRING      :[HEX DUMP]:DEAD"));
    }

    #[test]
    fn test_tree_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Asn1Tree>();
    }
}
