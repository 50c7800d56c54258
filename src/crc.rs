//! CRC-8 used as the packet checksum.
//!
//! Polynomial `0x07`, initial value `0x00`, no reflection and no final XOR.
//! Running the CRC over a body followed by its own CRC yields zero.

const POLY: u8 = 0x07;

/// Folds one byte into a running CRC-8.
pub fn crc8_update(crc: u8, data: &u8) -> u8 {
    let mut crc = crc ^ *data;
    for _ in 0..8 {
        crc = if crc & 0x80 != 0 {
            (crc << 1) ^ POLY
        } else {
            crc << 1
        };
    }
    crc
}

/// CRC-8 over a whole byte slice.
pub fn crc8(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, crc8_update)
}
