//! The packet carried in every radio frame.
//!
//! A [`Packet`] is the fixed-layout record a node transmits once per cycle.
//! The receiver decodes it by byte offset, so the layout below is the wire
//! format and must not change:
//!
//! | Offset | Width | Field          | Encoding              |
//! |--------|-------|----------------|-----------------------|
//! | 0      | 1     | `node_id`      | `u8`                  |
//! | 1      | 2     | `seq_no`       | `u16`, little-endian  |
//! | 3      | 1     | `reading_type` | [`ReadingType`] tag   |
//! | 4      | 2     | `reading`      | `u16`, little-endian  |
//! | 6      | 1     | `checksum`     | CRC-8 of bytes 0..6   |
//!
//! The checksum never covers itself and is always the last field written
//! before transmission; see [`Packet::seal`].

use crate::consts::{PACKET_BODY_LEN, PACKET_LEN};
use crate::crc::crc8;
use crate::error::DecodeError;

/// Semantic kind of the reading carried by a packet.
///
/// Only temperature is produced today. Any other tag value round-trips
/// through [`ReadingType::Other`] so new payload kinds do not change the
/// layout.
///
/// Two values are equal when they carry the same wire tag, so
/// `Other(TEMPERATURE_TAG)` equals `Temperature`.
#[derive(Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ReadingType {
    /// Raw converter output of the on-board temperature sensor.
    #[default]
    Temperature,
    /// A tag this firmware does not produce.
    Other(u8),
}

impl ReadingType {
    /// Wire tag for [`ReadingType::Temperature`].
    pub const TEMPERATURE_TAG: u8 = 0x01;

    /// The canonical variant for this value's wire tag.
    pub fn normalized(self) -> Self {
        Self::from(u8::from(self))
    }
}

impl PartialEq for ReadingType {
    fn eq(&self, other: &Self) -> bool {
        u8::from(*self) == u8::from(*other)
    }
}

impl Eq for ReadingType {}

impl From<ReadingType> for u8 {
    fn from(kind: ReadingType) -> u8 {
        match kind {
            ReadingType::Temperature => ReadingType::TEMPERATURE_TAG,
            ReadingType::Other(tag) => tag,
        }
    }
}

impl From<u8> for ReadingType {
    fn from(tag: u8) -> ReadingType {
        match tag {
            ReadingType::TEMPERATURE_TAG => ReadingType::Temperature,
            tag => ReadingType::Other(tag),
        }
    }
}

/// One measurement as sent on air.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Packet {
    /// Identity of the sending node, fixed at build time.
    pub node_id: u8,
    /// Incremented by one before every transmission, wrapping on overflow.
    pub seq_no: u16,
    /// What `reading` means.
    pub reading_type: ReadingType,
    /// Raw converter value, not converted to physical units.
    pub reading: u16,
    /// CRC-8 over every other field, see [`Packet::compute_checksum`].
    pub checksum: u8,
}

impl Packet {
    /// Builds a packet and computes its checksum.
    pub fn new(node_id: u8, seq_no: u16, reading_type: ReadingType, reading: u16) -> Self {
        let mut packet = Self {
            node_id,
            seq_no,
            reading_type: reading_type.normalized(),
            reading,
            checksum: 0,
        };
        packet.seal();
        packet
    }

    /// The packet bytes that the checksum covers, in wire order.
    pub fn body(&self) -> [u8; PACKET_BODY_LEN] {
        let seq = self.seq_no.to_le_bytes();
        let reading = self.reading.to_le_bytes();
        [
            self.node_id,
            seq[0],
            seq[1],
            self.reading_type.into(),
            reading[0],
            reading[1],
        ]
    }

    /// Checksum of the current field values. Does not modify the packet.
    pub fn compute_checksum(&self) -> u8 {
        crc8(&self.body())
    }

    /// Recomputes and stores the checksum.
    pub fn seal(&mut self) {
        self.checksum = self.compute_checksum();
    }

    /// Whether the stored checksum matches the other fields.
    pub fn is_valid(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    /// The full wire layout, checksum last.
    pub fn to_bytes(&self) -> [u8; PACKET_LEN] {
        let mut out = [0u8; PACKET_LEN];
        out[..PACKET_BODY_LEN].copy_from_slice(&self.body());
        out[PACKET_BODY_LEN] = self.checksum;
        out
    }

    /// Decodes a packet from its wire layout and verifies the checksum.
    ///
    /// Only the first [`PACKET_LEN`] bytes are read.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < PACKET_LEN {
            return Err(DecodeError::Truncated {
                needed: PACKET_LEN,
                got: bytes.len(),
            });
        }
        let packet = Self {
            node_id: bytes[0],
            seq_no: u16::from_le_bytes([bytes[1], bytes[2]]),
            reading_type: ReadingType::from(bytes[3]),
            reading: u16::from_le_bytes([bytes[4], bytes[5]]),
            checksum: bytes[6],
        };
        let expected = packet.compute_checksum();
        if expected != packet.checksum {
            return Err(DecodeError::BadChecksum {
                expected,
                found: packet.checksum,
            });
        }
        Ok(packet)
    }
}
