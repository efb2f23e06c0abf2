#![no_main]

use std::sync::OnceLock;

use codec::{decode_datagram, encode_packet, Limits};
use libfuzzer_sys::fuzz_target;
use schema::Protocol;

fn protocol() -> &'static Protocol {
    static PROTOCOL: OnceLock<Protocol> = OnceLock::new();
    PROTOCOL.get_or_init(|| sample_protocol::protocol().expect("sample protocol"))
}

fuzz_target!(|data: &[u8]| {
    let protocol = protocol();
    let Ok(decoded) = decode_datagram(protocol, data) else {
        return;
    };

    // Whatever decodes must re-encode into datagrams that decode again.
    let limits = Limits::default();
    let header = decoded.schema.header(decoded.header.sequence);
    if let Ok(buffers) = encode_packet(decoded.schema, &header, &decoded.packet, &limits) {
        for buf in &buffers {
            assert!(buf.len() <= limits.mtu);
            let again = decode_datagram(protocol, buf).expect("re-encoded datagram decodes");
            assert_eq!(again.schema.name, decoded.schema.name);
        }
    }
});
