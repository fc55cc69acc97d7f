//! X.509 certificate display command implementation.

use dertree_pki::x509::Certificate;

use crate::input::{read_der, Inform};

pub fn run(input: &str, inform: Option<Inform>, text: bool) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", render(input, inform, text)?);
    Ok(())
}

fn render(input: &str, inform: Option<Inform>, text: bool) -> Result<String, Box<dyn std::error::Error>> {
    let der = read_der(input, inform)?;
    let cert = Certificate::populate(&der).map_err(|e| format!("failed to parse certificate: {e}"))?;

    if text {
        return Ok(cert.to_text());
    }

    let mut out = String::new();
    out.push_str(&format!("subject= {}\n", cert.subject_distinguished_name()));
    out.push_str(&format!("issuer= {}\n", cert.issuer_distinguished_name()));
    out.push_str(&format!(
        "serial= {}\n",
        hex::encode_upper(cert.serial_number_bytes())
    ));
    out.push_str(&format!("notBefore= {}\n", format_time(cert.not_before())));
    out.push_str(&format!("notAfter= {}\n", format_time(cert.not_after())));
    out.push_str(&format!(
        "publicKey= {} ({} bit)\n",
        cert.public_key().algorithm_name(),
        cert.public_key().key_bits()
    ));
    for ext in cert.extensions() {
        let crit = if ext.is_critical() { " critical" } else { "" };
        out.push_str(&format!("extension= {}{crit}\n", ext.name()));
    }
    Ok(out)
}

fn format_time(t: chrono::DateTime<chrono::Utc>) -> String {
    t.format("%b %e %H:%M:%S %Y GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::{write_temp, EC_CERT_PEM};

    #[test]
    fn test_x509_summary() {
        let path = write_temp("test_x509cmd_summary.pem", EC_CERT_PEM.as_bytes());
        let out = render(path.to_str().unwrap(), None, false).unwrap();
        assert!(out.contains("subject= CN=example.com, O=\"Example, Inc.\", C=US\n"));
        assert!(out.contains("serial= 1234567890ABCDEF\n"));
        assert!(out.contains("notBefore= Oct 18 08:15:27 2026 GMT\n"));
        assert!(out.contains("notAfter= Oct 15 08:15:27 2036 GMT\n"));
        assert!(out.contains("publicKey= ecPublicKey (520 bit)\n"));
        assert!(out.contains("extension= keyUsage critical\n"));
        assert!(out.contains("extension= subjectAltName\n"));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_x509_text() {
        let path = write_temp("test_x509cmd_text.pem", EC_CERT_PEM.as_bytes());
        let out = render(path.to_str().unwrap(), Some(Inform::Pem), true).unwrap();
        assert!(out.starts_with("Certificate:\n"));
        assert!(out.contains("DNS:example.com"));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_x509_not_a_certificate() {
        let path = write_temp("test_x509cmd_int.der", &[0x02, 0x01, 0x05]);
        let err = run(path.to_str().unwrap(), None, false).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse certificate: unexpected certificate structure"));
        std::fs::remove_file(path).unwrap();
    }
}
