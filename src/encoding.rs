//! Manchester line coding for the radio link.
//!
//! Every bit is sent as two half-bits of equal length with a transition in
//! the middle, so the receiver recovers the clock from the data itself:
//!
//! | Bit | First half | Second half |
//! |-----|------------|-------------|
//! | 1   | high       | low         |
//! | 0   | low        | high        |
//!
//! Bytes go out least significant bit first. A frame is the [`PREAMBLE`]
//! followed by the packet bytes; the transmitter closes it with one more
//! transition (see [`crate::driver`]).
//!
//! ## Functions
//!
//! - [`encode_byte`]: one byte to its 16 half-bit levels
//! - [`decode_byte`]: 16 half-bit levels back to a byte
//! - [`encode_buffer`] / [`decode_buffer`]: slice-level versions of the above
//! - [`frame`]: preamble plus packet bytes, ready to send
//! - [`decode_frame`]: receiver side, finds the frame start in a captured
//!   half-bit stream and decodes the packet behind it
//!
//! Half-bit levels are plain `bool`s (`true` = line high).

use crate::consts::{FRAME_LEN, PACKET_LEN, PREAMBLE};
use crate::error::DecodeError;
use crate::packet::Packet;

/// Half-bit levels per encoded byte.
pub const HALF_BITS_PER_BYTE: usize = 16;

/// Number of consecutive one bits the receiver wants to see before it
/// accepts a zero as the frame-start marker.
pub const MIN_SYNC_ONES: usize = 16;

/// Half-bit levels of a single bit.
pub const fn encode_bit(bit: bool) -> [bool; 2] {
    [bit, !bit]
}

/// Encodes one byte, least significant bit first.
pub fn encode_byte(byte: u8) -> [bool; HALF_BITS_PER_BYTE] {
    let mut out = [false; HALF_BITS_PER_BYTE];
    for bit in 0..8 {
        let [first, second] = encode_bit(byte & (1 << bit) != 0);
        out[bit * 2] = first;
        out[bit * 2 + 1] = second;
    }
    out
}

/// Decodes 16 half-bit levels into a byte.
///
/// Returns [`DecodeError::InvalidSymbol`] with the offending half-bit index
/// when a bit period has no mid-bit transition.
pub fn decode_byte(halves: &[bool]) -> Result<u8, DecodeError> {
    if halves.len() < HALF_BITS_PER_BYTE {
        return Err(DecodeError::Truncated {
            needed: HALF_BITS_PER_BYTE,
            got: halves.len(),
        });
    }
    let mut byte = 0u8;
    for bit in 0..8 {
        let first = halves[bit * 2];
        if first == halves[bit * 2 + 1] {
            return Err(DecodeError::InvalidSymbol(bit * 2));
        }
        if first {
            byte |= 1 << bit;
        }
    }
    Ok(byte)
}

/// Encodes `input` into `output` as half-bit levels.
///
/// # Returns
/// The number of half-bits written.
pub fn encode_buffer(input: &[u8], output: &mut [bool]) -> usize {
    let mut i = 0;
    for &byte in input {
        output[i..i + HALF_BITS_PER_BYTE].copy_from_slice(&encode_byte(byte));
        i += HALF_BITS_PER_BYTE;
    }
    i
}

/// Decodes half-bit levels back into bytes.
///
/// # Returns
/// The number of bytes written to `output`, or an error if the input does not
/// split into whole bytes or contains a bit without a transition.
pub fn decode_buffer(input: &[bool], output: &mut [u8]) -> Result<usize, DecodeError> {
    if input.len() % HALF_BITS_PER_BYTE != 0 {
        return Err(DecodeError::PartialByte(input.len()));
    }
    let mut i = 0;
    for (n, chunk) in input.chunks(HALF_BITS_PER_BYTE).enumerate() {
        output[i] = decode_byte(chunk)
            .map_err(|e| offset_symbol(e, n * HALF_BITS_PER_BYTE))?;
        i += 1;
    }
    Ok(i)
}

fn offset_symbol(err: DecodeError, by: usize) -> DecodeError {
    match err {
        DecodeError::InvalidSymbol(at) => DecodeError::InvalidSymbol(at + by),
        other => other,
    }
}

/// Assembles the byte stream of one frame: preamble, then the packet in wire
/// order.
pub fn frame(packet: &Packet) -> heapless::Vec<u8, FRAME_LEN> {
    let mut buf = heapless::Vec::new();
    let _ = buf.extend_from_slice(&PREAMBLE);
    let _ = buf.extend_from_slice(&packet.to_bytes());
    buf
}

/// Index just past the frame-start zero bit, if one follows at least
/// [`MIN_SYNC_ONES`] ones in the given half-bit alignment.
fn find_frame_start(halves: &[bool]) -> Option<usize> {
    let mut ones = 0;
    let mut i = 0;
    while i + 1 < halves.len() {
        match (halves[i], halves[i + 1]) {
            (true, false) => ones += 1,
            (false, true) if ones >= MIN_SYNC_ONES => return Some(i + 2),
            _ => ones = 0,
        }
        i += 2;
    }
    None
}

/// Finds a frame in a captured half-bit stream and decodes its packet.
///
/// The capture may start anywhere, including mid-bit and with idle line
/// before the preamble. Both half-bit alignments are tried.
pub fn decode_frame(halves: &[bool]) -> Result<Packet, DecodeError> {
    for alignment in 0..2 {
        let Some(aligned) = halves.get(alignment..) else {
            break;
        };
        let Some(start) = find_frame_start(aligned) else {
            continue;
        };
        let body = &aligned[start..];
        let needed = PACKET_LEN * HALF_BITS_PER_BYTE;
        if body.len() < needed {
            return Err(DecodeError::Truncated {
                needed,
                got: body.len(),
            });
        }
        let mut bytes = [0u8; PACKET_LEN];
        let _ = decode_buffer(&body[..needed], &mut bytes)?;
        return Packet::from_bytes(&bytes);
    }
    Err(DecodeError::NoPreamble)
}
