//! Keyring binary format.
//!
//! A keyring file is a 4-byte header followed by a flat sequence of
//! length-prefixed packets. This crate parses and builds that framing and
//! nothing else: it never touches key material beyond copying bytes, and
//! never performs cryptography.
//!
//! # Container layout
//!
//! ```text
//! Pos | Size   | Description
//! ----|--------|---------------------------------------------------
//! 0   | 1      | Magic byte 0xEC
//! 1   | 1      | Format version (0x01 is the only defined version)
//! 2   | 2      | Reserved, zero in format 1
//! 4   | (rest) | Packet sequence
//! ```
//!
//! # Packet layout
//!
//! ```text
//! Pos | Size | Description
//! ----|------|--------------------------------
//! 0   | 1    | Packet type
//! 1   | 3    | Content length n (BE uint24)
//! 4   | n    | Content
//! ```
//!
//! All multi-byte integers are big-endian.
//!
//! # Packet types
//!
//! ```text
//! Code | Meaning          | Content
//! -----|------------------|------------------------------------------
//! 2    | data key         | cipher packet (nonce || sealed DEK)
//! 3    | access key salt  | opaque bytes
//! 4    | keyring entry    | BE uint32 id || raw key bytes
//! 5    | active key id    | BE uint32 id, or empty for "none"
//! 6    | encrypted bundle | cipher packet whose plaintext is a packet sequence
//! ```
//!
//! Every other type is reserved. Reserved packets parse and re-encode
//! unchanged so that newer writers stay readable.
//!
//! # Zero-copy
//!
//! Parsed [`Packet`] and [`KeyEntry`] values borrow from the input buffer.
//! Anything that outlives the buffer must be copied out explicitly (see
//! [`Packet::to_owned_packet`]).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod entry;
pub mod errors;
pub mod header;
pub mod packet;

pub use entry::{KeyEntry, KeyId, parse_active_key, parse_keyring_entry};
pub use errors::{PartialParse, ProtocolError, Result};
pub use header::KeyringHeader;
pub use packet::{
    Keyring, MAX_PACKET_LEN, OwnedPacket, PACKET_HEADER_SIZE, Packet, PacketBuffer, PacketReader,
    PacketType, parse_keyring, parse_packets,
};
