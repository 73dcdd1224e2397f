//! Internet checksum (RFC 1071) as used by ICMP echo messages.

/// Compute the ICMP checksum of `data`.
///
/// Words are summed in little-endian order and the folded complement is
/// byte-swapped at the end, so the returned value is in network order:
/// writing it with [`u16::to_be_bytes`] into the checksum field yields a
/// packet whose checksum verifies to zero. An odd trailing byte is treated
/// as if it were followed by a zero byte.
///
/// # Examples
///
/// ```
/// use multiping::checksum::checksum;
///
/// let mut packet = vec![8, 0, 0, 0, 0, 1, 0, 1];
/// let sum = checksum(&packet);
/// packet[2..4].copy_from_slice(&sum.to_be_bytes());
/// assert_eq!(checksum(&packet), 0);
/// ```
#[must_use]
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum = 0u64;
    let mut words = data.chunks_exact(2);
    for word in &mut words {
        sum += u64::from(word[0]) + (u64::from(word[1]) << 8);
    }
    if let [last] = words.remainder() {
        sum += u64::from(*last);
    }
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xffff);
    }
    (!(sum as u16)).swap_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_checksum(data: &[u8]) -> Vec<u8> {
        let mut padded = data.to_vec();
        if padded.len() % 2 == 1 {
            padded.push(0);
        }
        let sum = checksum(&padded);
        padded.extend_from_slice(&sum.to_be_bytes());
        padded
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(checksum(&[]), 0xffff);
    }

    #[test]
    fn test_rfc1071_example() {
        // Sample from RFC 1071 section 3: one's complement sum is 0xddf2
        let data = [0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7];
        assert_eq!(checksum(&data), !0xddf2);
    }

    #[test]
    fn test_odd_length_is_zero_padded() {
        assert_eq!(checksum(&[0xab]), checksum(&[0xab, 0x00]));
        assert_eq!(checksum(&[1, 2, 3]), checksum(&[1, 2, 3, 0]));
    }

    #[test]
    fn test_appended_checksum_folds_to_zero() {
        let samples: [&[u8]; 6] = [
            b"",
            b"Q",
            b"ping",
            &[0xff; 201],
            &[0x08, 0x00, 0x00, 0x00, 0x12, 0x34, 0x00, 0x01],
            &[0x80, 0x00, 0x80, 0x00, 0x80, 0x00],
        ];
        for sample in samples {
            assert_eq!(
                checksum(&with_checksum(sample)),
                0,
                "sample of {} bytes did not verify",
                sample.len()
            );
        }
    }

    #[test]
    fn test_checksum_written_into_header_verifies() {
        let mut packet = vec![8u8, 0, 0, 0, 0x00, 0x2a, 0x00, 0x01];
        packet.extend_from_slice(&[b'Q'; 192]);
        let sum = checksum(&packet);
        packet[2..4].copy_from_slice(&sum.to_be_bytes());
        assert_eq!(checksum(&packet), 0);
    }

    #[test]
    fn test_carry_is_folded() {
        // 0xffff + 0x0001 overflows into bit 16 and must wrap around
        let data = [0xff, 0xff, 0x00, 0x01];
        assert_eq!(checksum(&data), !0x0001u16);
    }
}
