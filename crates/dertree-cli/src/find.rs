//! OID search command implementation.

use dertree_utils::asn1::decode;
use dertree_utils::oid::{display_name, Oid};

use crate::input::{read_der, Inform};

pub fn run(input: &str, inform: Option<Inform>, oid: &str) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", render(input, inform, oid)?);
    Ok(())
}

fn render(input: &str, inform: Option<Inform>, oid: &str) -> Result<String, Box<dyn std::error::Error>> {
    let oid = oid.parse::<Oid>()?.to_dot_string();
    let der = read_der(input, inform)?;
    let tree = decode(&der).map_err(|e| format!("failed to decode {input}: {e}"))?;

    let found = tree
        .find_oid(&oid)
        .ok_or_else(|| format!("{oid} ({}) not found in {input}", display_name(&oid)))?;
    let enclosing = found.parent().unwrap_or(found);
    log::debug!("{oid} at offset {}, enclosing element at {}", found.offset(), enclosing.offset());

    let mut out = String::new();
    for node in enclosing.subtree() {
        out.push_str(&node.to_string());
        out.push('\n');
    }
    Ok(out)
}
