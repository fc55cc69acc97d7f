#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(cert) = dertree_pki::x509::Certificate::populate(data) {
        let _ = cert.to_text();
        let _ = cert.key_usage();
        let _ = cert.subject_alternative_names();
        let _ = cert.public_key().decoded();
    }
});
