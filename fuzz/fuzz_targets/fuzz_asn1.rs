#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(tree) = dertree_utils::asn1::decode(data) {
        // every node must lie inside the input
        for node in tree.iter() {
            assert!(node.offset() + node.header_len() + node.content().len() <= data.len());
            let _ = node.decode_encapsulated();
        }
        let _ = tree.to_string();
    }
});
