//! Reading DER input from files, with PEM unwrapping.

use std::fs;

use clap::ValueEnum;

/// Encoding of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Inform {
    Der,
    Pem,
}

const PEM_PREFIX: &[u8] = b"-----BEGIN";

/// Read `path` and return its DER bytes.
///
/// Without an explicit format, content starting with a PEM boundary
/// (leading whitespace allowed) is treated as PEM and anything else as DER.
pub fn read_der(path: &str, inform: Option<Inform>) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let data = fs::read(path).map_err(|e| format!("cannot read {path}: {e}"))?;
    let inform = inform.unwrap_or_else(|| detect(&data));
    log::debug!("reading {path} as {inform:?} ({} bytes)", data.len());
    match inform {
        Inform::Der => Ok(data),
        Inform::Pem => {
            let (label, der) = pem_rfc7468::decode_vec(skip_whitespace(&data))
                .map_err(|e| format!("invalid PEM in {path}: {e}"))?;
            log::debug!("PEM label {label}, {} DER bytes", der.len());
            Ok(der)
        }
    }
}

fn detect(data: &[u8]) -> Inform {
    if skip_whitespace(data).starts_with(PEM_PREFIX) {
        Inform::Pem
    } else {
        Inform::Der
    }
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    &data[start..]
}
