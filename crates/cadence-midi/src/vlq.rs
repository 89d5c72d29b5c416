//! Variable-length quantities, the delta-time encoding of Standard MIDI Files.
//!
//! Seven value bits per byte, most significant group first, with the top bit
//! set on every byte except the last. At most four bytes.

use crate::error::{Error, Result};

/// Largest value a four-byte quantity can hold.
pub const VLQ_MAX: u32 = 0x0FFF_FFFF;

/// Number of bytes `value` occupies once encoded.
pub fn encoded_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        _ => 4,
    }
}

/// Append the minimal encoding of `value` to `out`.
pub fn write_vlq(out: &mut Vec<u8>, value: u32) -> Result<()> {
    if value > VLQ_MAX {
        return Err(Error::VlqOverflow(value as u64));
    }
    let len = encoded_len(value);
    for i in (0..len).rev() {
        let group = ((value >> (7 * i)) & 0x7F) as u8;
        let continuation = if i > 0 { 0x80 } else { 0 };
        out.push(group | continuation);
    }
    Ok(())
}

/// Encode `value` into a fresh buffer.
pub fn encode_vlq(value: u32) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(4);
    write_vlq(&mut out, value)?;
    Ok(out)
}

/// Decode one quantity from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed.
pub fn read_vlq(bytes: &[u8]) -> Result<(u32, usize)> {
    let mut value = 0u32;
    for (i, byte) in bytes.iter().take(4).enumerate() {
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    if bytes.len() >= 4 {
        Err(Error::VlqOverflow(value as u64))
    } else {
        Err(Error::VlqTruncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode_vlq(0).unwrap(), [0x00]);
        assert_eq!(encode_vlq(96).unwrap(), [0x60]);
        assert_eq!(encode_vlq(127).unwrap(), [0x7F]);
        assert_eq!(encode_vlq(128).unwrap(), [0x81, 0x00]);
        assert_eq!(encode_vlq(16384).unwrap(), [0x81, 0x80, 0x00]);
        assert_eq!(encode_vlq(VLQ_MAX).unwrap(), [0xFF, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(
            encode_vlq(VLQ_MAX + 1),
            Err(Error::VlqOverflow(0x1000_0000))
        );
    }

    #[test]
    fn test_read_errors() {
        assert_eq!(read_vlq(&[]), Err(Error::VlqTruncated));
        assert_eq!(read_vlq(&[0x81, 0x80]), Err(Error::VlqTruncated));
        assert!(matches!(
            read_vlq(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F]),
            Err(Error::VlqOverflow(_))
        ));
    }

    #[test]
    fn test_read_stops_at_last_byte() {
        assert_eq!(read_vlq(&[0x60, 0x90, 0x3C]).unwrap(), (96, 1));
        assert_eq!(read_vlq(&[0x81, 0x00, 0xFF]).unwrap(), (128, 2));
    }

    proptest! {
        #[test]
        fn minimal_and_reversible(value in 0u32..=VLQ_MAX) {
            let bytes = encode_vlq(value).unwrap();
            prop_assert_eq!(bytes.len(), encoded_len(value));
            // No leading zero group except for the value 0 itself.
            prop_assert!(value == 0 || bytes[0] != 0x80);
            prop_assert_eq!(bytes.last().map(|b| b & 0x80), Some(0));
            prop_assert_eq!(read_vlq(&bytes).unwrap(), (value, bytes.len()));
        }
    }
}
