//! Fuzz target for packet framing boundary conditions
//!
//! # Strategy
//!
//! - Magic byte: valid, off-by-one, random
//! - Length fields: zero, exact, one short, one over, maximum (2^24 - 1)
//! - Packet types: every defined type plus reserved values
//! - Trailing garbage after the last complete packet
//!
//! # Invariants
//!
//! - Parsing never panics
//! - A length field that overruns the input is `TruncatedPacket` with an
//!   offset inside the input
//! - Partial results are a prefix of what a full parse would return
//! - Re-encoding a successful parse reproduces the input exactly

#![no_main]

use arbitrary::Arbitrary;
use keyring_proto::{
    KeyringHeader, MAX_PACKET_LEN, PacketBuffer, PacketType, ProtocolError, parse_active_key,
    parse_keyring, parse_keyring_entry,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct Container {
    magic: Magic,
    version: u8,
    reserved: [u8; 2],
    packets: Vec<FuzzPacket>,
    trailing: Vec<u8>,
}

#[derive(Debug, Clone, Arbitrary)]
enum Magic {
    Valid,
    OffByOne,
    Random(u8),
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzPacket {
    packet_type: u8,
    data: Vec<u8>,
    length: LengthField,
}

#[derive(Debug, Clone, Arbitrary)]
enum LengthField {
    Exact,
    OneShort,
    OneOver,
    Max,
    Random(u32),
}

fuzz_target!(|container: Container| {
    let mut buf = Vec::new();
    buf.push(match container.magic {
        Magic::Valid => KeyringHeader::MAGIC,
        Magic::OffByOne => KeyringHeader::MAGIC.wrapping_add(1),
        Magic::Random(b) => b,
    });
    buf.push(container.version);
    buf.extend_from_slice(&container.reserved);

    let mut honest = true;
    for packet in &container.packets {
        let length = match packet.length {
            LengthField::Exact => packet.data.len(),
            LengthField::OneShort => packet.data.len().saturating_sub(1),
            LengthField::OneOver => packet.data.len() + 1,
            LengthField::Max => MAX_PACKET_LEN,
            LengthField::Random(n) => (n as usize) & MAX_PACKET_LEN,
        } & MAX_PACKET_LEN;
        honest &= length == packet.data.len();

        buf.push(packet.packet_type);
        buf.extend_from_slice(&(length as u32).to_be_bytes()[1..]);
        buf.extend_from_slice(&packet.data);
    }
    buf.extend_from_slice(&container.trailing);

    match parse_keyring(&buf) {
        Ok(keyring) => {
            for packet in &keyring.packets {
                match packet.packet_type {
                    PacketType::KEYRING_ENTRY => {
                        let _ = parse_keyring_entry(packet.data);
                    },
                    PacketType::ACTIVE_KEY => {
                        let _ = parse_active_key(packet.data);
                    },
                    _ => {},
                }
            }

            let mut out = PacketBuffer::new();
            out.write_header(keyring.header);
            for packet in &keyring.packets {
                out.add_packet(packet.packet_type, packet.data);
            }
            assert_eq!(out.as_bytes(), &buf[..], "re-encoding must reproduce the input");
        },
        Err(partial) => {
            if let ProtocolError::TruncatedPacket { offset, .. } = partial.error {
                assert!(offset <= buf.len(), "offset {offset} beyond input {}", buf.len());
            }
            if honest && container.trailing.is_empty() && buf[0] == KeyringHeader::MAGIC {
                panic!("well-formed container rejected: {}", partial.error);
            }
        },
    }
});
