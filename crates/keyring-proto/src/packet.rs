//! Packet framing.
//!
//! A packet is `type(1) | length(3, BE uint24) | content(length)`. Parsing
//! is zero-copy: [`Packet::data`] borrows from the input. Building goes
//! through [`PacketBuffer`], which appends packets in call order.

use std::fmt;

use bytes::BufMut;

use crate::{
    KeyId, KeyringHeader,
    errors::{PartialParse, ProtocolError},
};

/// Size of a packet header (type byte plus 24-bit length)
pub const PACKET_HEADER_SIZE: usize = 4;

/// Largest content a packet can carry (2^24 - 1 bytes)
pub const MAX_PACKET_LEN: usize = (1 << 24) - 1;

/// Packet type byte.
///
/// Unknown values are legal and preserved; only the associated constants
/// have defined meanings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketType(u8);

impl PacketType {
    /// Encrypted data encryption key (cipher packet)
    pub const DATA_KEY: Self = Self(2);
    /// Access key generation salt (plain bytes)
    pub const ACCESS_KEY_SALT: Self = Self(3);
    /// Stored key: BE uint32 id followed by the key
    pub const KEYRING_ENTRY: Self = Self(4);
    /// Active key id: BE uint32, or empty
    pub const ACTIVE_KEY: Self = Self(5);
    /// Encrypted bundle of nested packets (cipher packet)
    pub const BUNDLE: Self = Self(6);

    /// Wrap a raw type byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// Raw type byte.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        self.0
    }

    /// Name of a defined type. `None` if reserved.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::DATA_KEY => Some("DATA_KEY"),
            Self::ACCESS_KEY_SALT => Some("ACCESS_KEY_SALT"),
            Self::KEYRING_ENTRY => Some("KEYRING_ENTRY"),
            Self::ACTIVE_KEY => Some("ACTIVE_KEY_ID"),
            Self::BUNDLE => Some("BUNDLE"),
            _ => None,
        }
    }

    /// Whether the type has a defined meaning in format 1.
    #[must_use]
    pub fn is_known(self) -> bool {
        self.name().is_some()
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "UNKNOWN_TYPE_{}", self.0),
        }
    }
}

/// A parsed packet borrowing its content from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    /// Packet type
    pub packet_type: PacketType,
    /// Packet content (format depends on type)
    pub data: &'a [u8],
}

impl<'a> Packet<'a> {
    /// Create a packet view over `data`.
    #[must_use]
    pub fn new(packet_type: PacketType, data: &'a [u8]) -> Self {
        Self { packet_type, data }
    }

    /// Size of this packet on the wire, header included.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        PACKET_HEADER_SIZE + self.data.len()
    }

    /// Copy the content into an owned packet.
    #[must_use]
    pub fn to_owned_packet(&self) -> OwnedPacket {
        OwnedPacket { packet_type: self.packet_type, data: self.data.to_vec() }
    }
}

impl fmt::Display for Packet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = &self.data[..self.data.len().min(16)];
        write!(f, "Packet(type={}, data=\"{}\")", self.packet_type, prefix.escape_ascii())
    }
}

/// A packet that owns its content.
///
/// Used for packets carried through a read/write cycle without being
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedPacket {
    /// Packet type
    pub packet_type: PacketType,
    /// Packet content
    pub data: Vec<u8>,
}

impl OwnedPacket {
    /// Borrow as a [`Packet`].
    #[must_use]
    pub fn as_packet(&self) -> Packet<'_> {
        Packet::new(self.packet_type, &self.data)
    }
}

/// A parsed keyring container: header plus top-level packets.
///
/// The caller is responsible for validating the header version and the
/// packet types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyring<'a> {
    /// Container header
    pub header: KeyringHeader,
    /// Top-level packets in file order
    pub packets: Vec<Packet<'a>>,
}

/// Iterator over the packets of a byte sequence.
///
/// Yields each packet in order. After the first error it yields that error
/// once and then stops.
#[derive(Debug, Clone)]
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
    failed: bool,
}

impl<'a> PacketReader<'a> {
    /// Read packets from `data`. `base` is added to offsets in errors.
    #[must_use]
    pub fn new(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base, failed: false }
    }

    /// Bytes consumed so far, relative to the start of `data`.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    fn read_packet(&mut self) -> Result<Packet<'a>, ProtocolError> {
        let rest = &self.data[self.pos..];
        let Some(&[packet_type, l0, l1, l2]) = rest.first_chunk::<PACKET_HEADER_SIZE>() else {
            return Err(ProtocolError::TruncatedPacketHeader { offset: self.base + self.pos });
        };

        let len = uint24([l0, l1, l2]);
        let content = &rest[PACKET_HEADER_SIZE..];
        let content_offset = self.base + self.pos + PACKET_HEADER_SIZE;

        let Some(data) = content.get(..len) else {
            return Err(ProtocolError::TruncatedPacket {
                offset: content_offset,
                expected: len,
                actual: content.len(),
            });
        };

        self.pos += PACKET_HEADER_SIZE + len;
        debug_assert!(self.pos <= self.data.len());

        Ok(Packet::new(PacketType::from_byte(packet_type), data))
    }
}

impl<'a> Iterator for PacketReader<'a> {
    type Item = Result<Packet<'a>, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }

        let result = self.read_packet();
        self.failed = result.is_err();
        Some(result)
    }
}

/// Parse a complete keyring container.
///
/// The header's magic byte is checked; version and reserved bytes are
/// returned for the caller to validate.
///
/// # Errors
///
/// Returns a [`PartialParse`] holding the header (if it was read) and every
/// packet decoded before the failure.
pub fn parse_keyring(data: &[u8]) -> Result<Keyring<'_>, PartialParse<'_>> {
    let header = KeyringHeader::from_bytes(data)
        .map_err(|error| PartialParse { header: None, packets: Vec::new(), error })?;

    match parse_packets(&data[KeyringHeader::SIZE..], KeyringHeader::SIZE) {
        Ok(packets) => Ok(Keyring { header, packets }),
        Err(partial) => Err(PartialParse { header: Some(header), ..partial }),
    }
}

/// Parse `data` as a packet sequence.
///
/// `base` is the offset of `data` within its enclosing buffer and is added
/// to positions reported in errors.
///
/// # Errors
///
/// Returns a [`PartialParse`] with every complete packet decoded before the
/// truncation.
pub fn parse_packets(data: &[u8], base: usize) -> Result<Vec<Packet<'_>>, PartialParse<'_>> {
    let mut packets = Vec::new();
    for item in PacketReader::new(data, base) {
        match item {
            Ok(packet) => packets.push(packet),
            Err(error) => return Err(PartialParse { header: None, packets, error }),
        }
    }
    Ok(packets)
}

/// Writable builder for an encoded packet sequence.
///
/// Packets are appended in the order given. The builder does not enforce
/// any ordering between packet types.
#[derive(Debug, Clone, Default)]
pub struct PacketBuffer {
    buf: Vec<u8>,
}

impl PacketBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `capacity` bytes.
    ///
    /// Sizing the buffer up front avoids reallocation, which would leave
    /// stale copies of secret content in freed memory.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity) }
    }

    /// Append a container header.
    pub fn write_header(&mut self, header: KeyringHeader) {
        self.buf.put_slice(&header.to_bytes());
    }

    /// Append a packet with the given type and content.
    ///
    /// # Panics
    ///
    /// Panics if `data` exceeds [`MAX_PACKET_LEN`]. Building an oversized
    /// packet is a caller bug; the length field cannot represent it.
    pub fn add_packet(&mut self, packet_type: PacketType, data: &[u8]) {
        assert!(
            data.len() <= MAX_PACKET_LEN,
            "keyring: packet too big ({} > {MAX_PACKET_LEN})",
            data.len()
        );

        let len = (data.len() as u32).to_be_bytes();
        self.buf.put_u8(packet_type.to_byte());
        self.buf.put_slice(&len[1..]);
        self.buf.put_slice(data);
    }

    /// Append an [`PacketType::ACTIVE_KEY`] packet. `None` writes an empty
    /// record.
    pub fn add_active_key(&mut self, id: Option<KeyId>) {
        match id {
            Some(id) => self.add_packet(PacketType::ACTIVE_KEY, &id.to_be_bytes()),
            None => self.add_packet(PacketType::ACTIVE_KEY, &[]),
        }
    }

    /// Append a [`PacketType::KEYRING_ENTRY`] packet.
    ///
    /// # Panics
    ///
    /// Panics if the entry exceeds [`MAX_PACKET_LEN`].
    pub fn add_keyring_entry(&mut self, id: KeyId, key: &[u8]) {
        let len = 4 + key.len();
        assert!(len <= MAX_PACKET_LEN, "keyring: packet too big ({len} > {MAX_PACKET_LEN})");

        self.buf.put_u8(PacketType::KEYRING_ENTRY.to_byte());
        self.buf.put_slice(&(len as u32).to_be_bytes()[1..]);
        self.buf.put_u32(id);
        self.buf.put_slice(key);
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Take the encoded bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

fn uint24(bytes: [u8; 3]) -> usize {
    (usize::from(bytes[0]) << 16) | (usize::from(bytes[1]) << 8) | usize::from(bytes[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stream() -> Vec<u8> {
        let mut buf = PacketBuffer::new();
        buf.add_packet(PacketType::ACCESS_KEY_SALT, b"salt");
        buf.add_active_key(Some(3));
        buf.add_keyring_entry(3, b"hunter2");
        buf.into_vec()
    }

    #[test]
    fn packet_wire_layout() {
        let mut buf = PacketBuffer::new();
        buf.add_packet(PacketType::from_byte(0x42), b"abc");
        assert_eq!(buf.as_bytes(), &[0x42, 0x00, 0x00, 0x03, b'a', b'b', b'c']);
    }

    #[test]
    fn keyring_entry_layout() {
        let mut buf = PacketBuffer::new();
        buf.add_keyring_entry(0x0102_0304, b"k");
        assert_eq!(buf.as_bytes(), &[0x04, 0x00, 0x00, 0x05, 0x01, 0x02, 0x03, 0x04, b'k']);
    }

    #[test]
    fn empty_active_key() {
        let mut buf = PacketBuffer::new();
        buf.add_active_key(None);
        assert_eq!(buf.as_bytes(), &[0x05, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn parse_stream() {
        let data = sample_stream();
        let packets = parse_packets(&data, 0).unwrap();

        assert_eq!(packets.len(), 3);
        assert_eq!(packets[0], Packet::new(PacketType::ACCESS_KEY_SALT, b"salt"));
        assert_eq!(packets[1], Packet::new(PacketType::ACTIVE_KEY, &[0, 0, 0, 3]));
        assert_eq!(packets[2].packet_type, PacketType::KEYRING_ENTRY);
        assert_eq!(packets[2].encoded_len(), 4 + 4 + 7);
    }

    #[test]
    fn parsed_packets_alias_input() {
        let data = sample_stream();
        let packets = parse_packets(&data, 0).unwrap();

        let start = data.as_ptr() as usize;
        let salt = packets[0].data.as_ptr() as usize;
        assert_eq!(salt - start, PACKET_HEADER_SIZE);
    }

    #[test]
    fn empty_input_has_no_packets() {
        assert_eq!(parse_packets(&[], 0).unwrap(), Vec::new());
    }

    #[test]
    fn truncated_header_reports_partial_result() {
        let mut data = sample_stream();
        data.extend_from_slice(&[0x04, 0x00]);

        let err = parse_packets(&data, 4).unwrap_err();
        assert_eq!(err.packets.len(), 3);
        assert_eq!(err.error, ProtocolError::TruncatedPacketHeader { offset: 4 + data.len() - 2 });
    }

    #[test]
    fn truncated_content_reports_offset() {
        // Claims 16 bytes, provides 2
        let data = [0x03, 0x00, 0x00, 0x10, 0xAA, 0xBB];
        let err = parse_packets(&data, 100).unwrap_err();

        assert!(err.packets.is_empty());
        assert_eq!(err.error, ProtocolError::TruncatedPacket { offset: 104, expected: 16, actual: 2 });
    }

    #[test]
    fn reader_stops_after_error() {
        let data = [0x03, 0x00, 0x00, 0x10];
        let mut reader = PacketReader::new(&data, 0);

        assert!(matches!(reader.next(), Some(Err(ProtocolError::TruncatedPacket { .. }))));
        assert_eq!(reader.next(), None);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn parse_keyring_with_header() {
        let mut buf = PacketBuffer::new();
        buf.write_header(KeyringHeader::new());
        buf.add_packet(PacketType::ACCESS_KEY_SALT, b"pepper");

        let keyring = parse_keyring(buf.as_bytes()).unwrap();
        assert_eq!(keyring.header, KeyringHeader::new());
        assert_eq!(keyring.packets, vec![Packet::new(PacketType::ACCESS_KEY_SALT, b"pepper")]);
    }

    #[test]
    fn parse_keyring_bad_header() {
        let err = parse_keyring(&[0xEC, 0x01]).unwrap_err();
        assert_eq!(err.header, None);
        assert_eq!(err.error, ProtocolError::HeaderTruncated { expected: 4, actual: 2 });

        let err = parse_keyring(&[0x00, 0x01, 0x00, 0x00]).unwrap_err();
        assert_eq!(err.error, ProtocolError::InvalidMagic(0x00));
    }

    #[test]
    fn parse_keyring_partial_packets() {
        let mut buf = PacketBuffer::new();
        buf.write_header(KeyringHeader::new());
        buf.add_packet(PacketType::ACCESS_KEY_SALT, b"pepper");
        let mut data = buf.into_vec();
        data.extend_from_slice(&[0x06, 0x00, 0x01, 0x00]);

        let err = parse_keyring(&data).unwrap_err();
        assert_eq!(err.header, Some(KeyringHeader::new()));
        assert_eq!(err.packets.len(), 1);
        assert_eq!(
            err.error,
            ProtocolError::TruncatedPacket { offset: data.len(), expected: 256, actual: 0 }
        );
    }

    #[test]
    fn unknown_types_round_trip() {
        let mut buf = PacketBuffer::new();
        buf.add_packet(PacketType::from_byte(0), b"zero");
        buf.add_packet(PacketType::from_byte(0xFF), b"future");

        let packets = parse_packets(buf.as_bytes(), 0).unwrap();
        let mut rebuilt = PacketBuffer::new();
        for packet in &packets {
            assert!(!packet.packet_type.is_known());
            rebuilt.add_packet(packet.packet_type, packet.data);
        }
        assert_eq!(rebuilt.as_bytes(), buf.as_bytes());
    }

    #[test]
    fn max_length_packet() {
        let data = vec![0u8; MAX_PACKET_LEN];
        let mut buf = PacketBuffer::with_capacity(MAX_PACKET_LEN + PACKET_HEADER_SIZE);
        buf.add_packet(PacketType::BUNDLE, &data);

        assert_eq!(&buf.as_bytes()[..4], &[0x06, 0xFF, 0xFF, 0xFF]);
        let packets = parse_packets(buf.as_bytes(), 0).unwrap();
        assert_eq!(packets[0].data.len(), MAX_PACKET_LEN);
    }

    #[test]
    #[should_panic(expected = "packet too big")]
    fn oversized_packet_panics() {
        let data = vec![0u8; MAX_PACKET_LEN + 1];
        PacketBuffer::new().add_packet(PacketType::BUNDLE, &data);
    }

    #[test]
    fn packet_type_display() {
        assert_eq!(PacketType::DATA_KEY.to_string(), "DATA_KEY");
        assert_eq!(PacketType::ACTIVE_KEY.to_string(), "ACTIVE_KEY_ID");
        assert_eq!(PacketType::from_byte(9).to_string(), "UNKNOWN_TYPE_9");
    }

    #[test]
    fn packet_display_truncates_data() {
        let packet = Packet::new(PacketType::ACCESS_KEY_SALT, b"0123456789abcdefXYZ");
        assert_eq!(packet.to_string(), "Packet(type=ACCESS_KEY_SALT, data=\"0123456789abcdef\")");
    }

    #[test]
    fn owned_packet_is_independent() {
        let mut data = b"payload".to_vec();
        let owned = Packet::new(PacketType::BUNDLE, &data).to_owned_packet();
        data.fill(0);
        assert_eq!(owned.as_packet().data, b"payload");
    }
}
