//! Human-readable text output for certificates.
//!
//! Provides `to_text()`, which produces output similar to
//! `openssl x509 -noout -text`.

use chrono::{DateTime, Utc};
use dertree_utils::asn1::{Node, TagClass};
use dertree_utils::oid::{display_name, Oid};

use super::extension::{Extension, ExtensionValue};
use super::name::{distinguished_name, ip_address};
use super::{known, Certificate, PublicKey};

const KEY_USAGE_NAMES: [&str; 9] = [
    "Digital Signature",
    "Non Repudiation",
    "Key Encipherment",
    "Data Encipherment",
    "Key Agreement",
    "Certificate Sign",
    "CRL Sign",
    "Encipher Only",
    "Decipher Only",
];

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

fn hex_colon(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

fn hex_dump(data: &[u8], per_line: usize, indent: usize) -> String {
    let prefix = " ".repeat(indent);
    data.chunks(per_line)
        .map(|chunk| format!("{prefix}{}", hex_colon(chunk)))
        .collect::<Vec<_>>()
        .join(":\n")
}

fn format_time(t: DateTime<Utc>) -> String {
    t.format("%b %e %H:%M:%S %Y GMT").to_string()
}

fn format_serial(cert: &Certificate) -> String {
    match cert.serial_number().to_i64().filter(|v| *v >= 0) {
        Some(v) => format!(" {v} ({v:#x})"),
        None => format!("\n            {}", hex_colon(cert.serial_number_bytes())),
    }
}

fn format_public_key(key: &PublicKey) -> String {
    let mut out = format!("            Public Key Algorithm: {}\n", key.algorithm_name());
    match key.algorithm_oid() {
        known::RSA_ENCRYPTION => {
            let nested = key.decoded();
            let fields = nested.as_ref().and_then(|t| t.root(0)).and_then(|seq| {
                let modulus = seq.child(0)?.as_integer()?;
                let exponent = seq.child(1)?.as_integer()?;
                Some((seq.child(0)?.content(), modulus.bit_len(), exponent))
            });
            match fields {
                Some((modulus, bits, exponent)) => {
                    out.push_str(&format!("                Public-Key: ({bits} bit)\n"));
                    out.push_str("                Modulus:\n");
                    out.push_str(&format!("{}\n", hex_dump(modulus, 15, 20)));
                    out.push_str(&format!(
                        "                Exponent: {exponent} ({exponent:#x})\n"
                    ));
                }
                None => out.push_str(&format_raw_key(key, key.key_bits())),
            }
        }
        known::EC_PUBLIC_KEY => {
            let bits = match key.key() {
                [0x04, point @ ..] => point.len() / 2 * 8,
                _ => key.key_bits(),
            };
            out.push_str(&format_raw_key(key, bits));
            if let Some(curve) = key.algorithm_params().and_then(|p| p.as_oid()) {
                out.push_str(&format!("                ASN1 OID: {}\n", display_name(curve)));
            }
        }
        _ => out.push_str(&format_raw_key(key, key.key_bits())),
    }
    out
}

fn format_raw_key(key: &PublicKey, bits: usize) -> String {
    format!(
        "                Public-Key: ({bits} bit)\n                pub:\n{}\n",
        hex_dump(key.key(), 15, 20)
    )
}

fn format_general_name(name: Node<'_>) -> String {
    let id = name.identifier();
    if id.type_class() != TagClass::ContextSpecific {
        return format!("<unsupported {id}>");
    }
    let content = name.content();
    let text = || String::from_utf8_lossy(content).into_owned();
    match id.number() {
        1 => format!("email:{}", text()),
        2 => format!("DNS:{}", text()),
        4 => format!(
            "DirName:{}",
            name.child(0).map(distinguished_name).unwrap_or_default()
        ),
        6 => format!("URI:{}", text()),
        7 => match ip_address(content) {
            Some(ip) => format!("IP Address:{ip}"),
            None => format!("IP Address:<invalid {}>", hex_colon(content)),
        },
        8 => match Oid::from_der_value(content) {
            Ok(oid) => format!("Registered ID:{}", oid.display_name()),
            Err(_) => format!("Registered ID:<invalid {}>", hex_colon(content)),
        },
        0 => "othername:<unsupported>".to_string(),
        n => format!("<unsupported cont [ {n} ]>"),
    }
}

fn format_extension_value(cert: &Certificate, ext: &Extension) -> String {
    let value = ext.value_node();
    match ext.oid() {
        known::BASIC_CONSTRAINTS => {
            let ca = value
                .and_then(|seq| seq.children().find_map(|n| n.as_bool()))
                .unwrap_or(false);
            let pathlen = value
                .and_then(|seq| seq.children().find_map(|n| n.as_integer().cloned()))
                .map(|p| format!(", pathlen:{p}"))
                .unwrap_or_default();
            format!("CA:{}{pathlen}", if ca { "TRUE" } else { "FALSE" })
        }
        known::KEY_USAGE => {
            let used: Vec<&str> = cert
                .key_usage()
                .iter()
                .zip(KEY_USAGE_NAMES)
                .filter(|(set, _)| **set)
                .map(|(_, name)| name)
                .collect();
            if used.is_empty() {
                "(none)".to_string()
            } else {
                used.join(", ")
            }
        }
        known::EXT_KEY_USAGE => ext
            .value_as_strings()
            .iter()
            .map(|oid| display_name(oid))
            .collect::<Vec<_>>()
            .join(", "),
        known::SUBJECT_ALT_NAME | known::ISSUER_ALT_NAME => value
            .map(|names| {
                names
                    .children()
                    .map(format_general_name)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default(),
        known::SUBJECT_KEY_IDENTIFIER => value
            .and_then(|n| n.as_bytes())
            .map(|id| hex_colon(id).to_uppercase())
            .unwrap_or_default(),
        known::AUTHORITY_KEY_IDENTIFIER => value
            .and_then(|seq| seq.children().find(|n| n.identifier().is_context(0, false)))
            .map(|id| format!("keyid:{}", hex_colon(id.content()).to_uppercase()))
            .unwrap_or_default(),
        _ => match ext.value() {
            ExtensionValue::Nested(tree) => tree
                .to_string()
                .lines()
                .collect::<Vec<_>>()
                .join("\n                "),
            ExtensionValue::Opaque(raw) => hex_colon(raw),
        },
    }
}

// ---------------------------------------------------------------------------
// Certificate::to_text()
// ---------------------------------------------------------------------------

impl Certificate {
    /// Produce human-readable text output similar to `openssl x509 -text`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("Certificate:\n");
        out.push_str("    Data:\n");
        out.push_str(&format!(
            "        Version: {} ({:#x})\n",
            self.version(),
            self.version().saturating_sub(1)
        ));
        out.push_str(&format!("        Serial Number:{}\n", format_serial(self)));
        out.push_str(&format!("        Signature Algorithm: {}\n", self.sig_alg_name()));
        out.push_str(&format!("        Issuer: {}\n", self.issuer_distinguished_name()));
        out.push_str("        Validity\n");
        out.push_str(&format!("            Not Before: {}\n", format_time(self.not_before())));
        out.push_str(&format!("            Not After : {}\n", format_time(self.not_after())));
        out.push_str(&format!("        Subject: {}\n", self.subject_distinguished_name()));
        out.push_str("        Subject Public Key Info:\n");
        out.push_str(&format_public_key(self.public_key()));

        if !self.extensions().is_empty() {
            out.push_str("        X509v3 extensions:\n");
            for ext in self.extensions() {
                let crit = if ext.is_critical() { " critical" } else { "" };
                out.push_str(&format!("            {}:{crit}\n", ext.name()));
                out.push_str(&format!("                {}\n", format_extension_value(self, ext)));
            }
        }

        out.push_str(&format!("    Signature Algorithm: {}\n", self.sig_alg_name()));
        out.push_str("    Signature Value:\n");
        out.push_str(&format!("{}\n", hex_dump(self.signature(), 18, 8)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x509::fixtures::{der, EC_CERT_PEM, RSA_V1_CERT_PEM};
    use dertree_utils::asn1::decode;

    #[test]
    fn test_ec_cert_text() {
        let cert = Certificate::populate(&der(EC_CERT_PEM)).unwrap();
        let text = cert.to_text();
        assert!(text.starts_with("Certificate:\n    Data:\n        Version: 3 (0x2)\n"));
        assert!(text.contains("Serial Number: 1311768467294899695 (0x1234567890abcdef)"));
        assert!(text.contains("Not Before: Oct 18 08:15:27 2026 GMT"));
        assert!(text.contains("Not After : Oct 15 08:15:27 2036 GMT"));
        assert!(text.contains("Subject: CN=example.com, O=\"Example, Inc.\", C=US"));
        assert!(text.contains("Public-Key: (256 bit)"));
        assert!(text.contains("ASN1 OID: prime256v1"));
        assert!(text.contains("basicConstraints: critical\n                CA:FALSE\n"));
        assert!(text.contains("Digital Signature, Key Encipherment"));
        assert!(text.contains("serverAuth, clientAuth"));
        assert!(text.contains("DNS:example.com, DNS:www.example.com"));
        assert!(text.contains("A6:25:38:BF:80:70:6C:B8:D4:E6:5B:61:81:B2:15:13:C0:8D:E9:33"));
        assert!(text.contains("    Signature Value:\n        30:46:02:21:00:a4:cf"));
    }

    #[test]
    fn test_rsa_cert_text() {
        let cert = Certificate::populate(&der(RSA_V1_CERT_PEM)).unwrap();
        let text = cert.to_text();
        assert!(text.contains("Version: 1 (0x0)"));
        assert!(text.contains("Serial Number: 7 (0x7)"));
        assert!(text.contains("Public Key Algorithm: rsaEncryption"));
        assert!(text.contains("Public-Key: (1024 bit)"));
        assert!(text.contains("Modulus:\n                    00:d4:2c:6b:5d"));
        assert!(text.contains("Exponent: 65537 (0x10001)"));
        assert!(!text.contains("X509v3 extensions"));
    }

    #[test]
    fn test_hex_dump_wraps() {
        let data: Vec<u8> = (0..20).collect();
        assert_eq!(
            hex_dump(&data, 15, 2),
            "  00:01:02:03:04:05:06:07:08:09:0a:0b:0c:0d:0e:\n  0f:10:11:12:13"
        );
    }

    #[test]
    fn test_general_names() {
        // [7] 192.0.2.1, [1] "a@b", [6] "https://x", [8] 1.2.3, [7] 3 octets
        let der = [
            0x30, 0x1F, 0x87, 0x04, 192, 0, 2, 1, 0x81, 0x03, b'a', b'@', b'b', 0x86, 0x09,
            b'h', b't', b't', b'p', b's', b':', b'/', b'/', b'x', 0x88, 0x02, 0x2A, 0x03,
            0x87, 0x03, 10, 0, 0,
        ];
        let tree = decode(&der).unwrap();
        let names: Vec<String> = tree.root(0).unwrap().children().map(format_general_name).collect();
        assert_eq!(
            names,
            vec![
                "IP Address:192.0.2.1",
                "email:a@b",
                "URI:https://x",
                "Registered ID:1.2.3",
                "IP Address:<invalid 0a:00:00>",
            ]
        );
    }
}
