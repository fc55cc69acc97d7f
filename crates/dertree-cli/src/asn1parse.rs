//! DER structure dump command implementation.

use dertree_utils::asn1::Decoder;

use crate::input::{read_der, Inform};

pub fn run(input: &str, inform: Option<Inform>, max_depth: usize) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", render(input, inform, max_depth)?);
    Ok(())
}

fn render(input: &str, inform: Option<Inform>, max_depth: usize) -> Result<String, Box<dyn std::error::Error>> {
    let der = read_der(input, inform)?;
    let tree = Decoder::new(&der)
        .with_max_depth(max_depth)
        .decode()
        .map_err(|e| format!("failed to decode {input}: {e}"))?;
    Ok(tree.to_string())
}
