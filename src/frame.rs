use crate::constants::*;
use crate::error::FrameError;

/// Computes the protocol checksum over the given bytes.
///
/// The documented algorithm is the two's-complement negation of the byte
/// sum: `(~(sum & 0xFF) + 1) & 0xFF`. Working in `u8` throughout keeps the
/// result identical on signed and unsigned platforms.
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    (!sum).wrapping_add(1)
}

/// Builds a 9-byte request frame for `code` with up to 5 data bytes,
/// zero-padded, and appends the checksum over bytes 1..=7.
pub fn encode_command(code: u8, data: &[u8]) -> [u8; FRAME_LEN] {
    debug_assert!(data.len() <= MAX_DATA_LEN);

    let mut frame = [0u8; FRAME_LEN];
    frame[0] = FRAME_START;
    frame[1] = SENSOR_ADDRESS;
    frame[2] = code;
    frame[3..3 + data.len()].copy_from_slice(data);
    frame[FRAME_LEN - 1] = checksum(&frame[1..FRAME_LEN - 1]);
    frame
}

/// Validates a received frame and extracts its payload.
///
/// A response is trusted only once all three checks pass: byte 0 is the
/// start marker, byte 1 echoes the command the response was read for, and
/// the checksum over bytes 1..=7 matches byte 8.
///
/// # Returns
///
/// The six payload bytes (frame bytes 2..=7) on success, or the specific
/// [`FrameError`] for the first check that failed.
pub fn decode_response(
    frame: &[u8; FRAME_LEN],
    expected_code: u8,
) -> Result<[u8; RESPONSE_PAYLOAD_LEN], FrameError> {
    if frame[0] != FRAME_START {
        return Err(FrameError::BadStartByte(frame[0]));
    }
    if frame[1] != expected_code {
        return Err(FrameError::BadCommandEcho {
            expected: expected_code,
            actual: frame[1],
        });
    }

    let expected = checksum(&frame[1..FRAME_LEN - 1]);
    let actual = frame[FRAME_LEN - 1];
    if expected != actual {
        return Err(FrameError::ChecksumMismatch { expected, actual });
    }

    let mut payload = [0u8; RESPONSE_PAYLOAD_LEN];
    payload.copy_from_slice(&frame[2..FRAME_LEN - 1]);
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    // Builds a checksum-correct response frame for tests.
    fn response_frame(code: u8, payload: [u8; RESPONSE_PAYLOAD_LEN]) -> [u8; FRAME_LEN] {
        let mut frame = [0u8; FRAME_LEN];
        frame[0] = FRAME_START;
        frame[1] = code;
        frame[2..FRAME_LEN - 1].copy_from_slice(&payload);
        frame[FRAME_LEN - 1] = checksum(&frame[1..FRAME_LEN - 1]);
        frame
    }

    #[quickcheck]
    fn checksum_cancels_the_sum(bytes: Vec<u8>) -> bool {
        let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        sum.wrapping_add(checksum(&bytes)) == 0
    }

    #[test]
    fn checksum_matches_vendor_documented_frames() {
        // Hardcoded frames from the vendor documentation.
        assert_eq!(checksum(&[0x01, CMD_QUERY_STATE, 0, 0, 0, 0, 0]), 0x7A);
        assert_eq!(checksum(&[0x01, CMD_READ_RESULT, 0, 0, 0, 0, 0]), 0x79);
        assert_eq!(checksum(&[0x01, CMD_READ_THRESHOLDS, 0, 0, 0, 0, 0]), 0x6F);
    }

    #[test]
    fn encode_zero_pads_and_appends_checksum() {
        let frame = encode_command(CMD_WRITE_BLOW_TIME, &[0x07]);
        assert_eq!(
            frame,
            [0xFF, 0x01, 0x89, 0x07, 0x00, 0x00, 0x00, 0x00, 0x6F]
        );
    }

    #[test]
    fn encode_without_data_bytes() {
        let frame = encode_command(CMD_QUERY_STATE, &[]);
        assert_eq!(
            frame,
            [0xFF, 0x01, 0x85, 0x00, 0x00, 0x00, 0x00, 0x00, 0x7A]
        );
    }

    #[test]
    fn decode_recovers_the_payload() {
        let payload = [0x31, 0xAB, 0x00, 0xFF, 0x02, 0x7F];
        let frame = response_frame(CMD_QUERY_STATE, payload);
        assert_eq!(decode_response(&frame, CMD_QUERY_STATE), Ok(payload));
    }

    #[quickcheck]
    fn decode_round_trips_arbitrary_payloads(code: u8, data: Vec<u8>) -> bool {
        let mut payload = [0u8; RESPONSE_PAYLOAD_LEN];
        for (slot, &b) in payload.iter_mut().zip(data.iter()) {
            *slot = b;
        }
        let frame = response_frame(code, payload);
        decode_response(&frame, code) == Ok(payload)
    }

    #[test]
    fn bad_start_byte_rejected_even_with_valid_checksum() {
        let mut frame = response_frame(CMD_QUERY_STATE, [0x31, 0, 0, 0, 0, 0]);
        frame[0] = 0xAA;
        assert_eq!(
            decode_response(&frame, CMD_QUERY_STATE),
            Err(FrameError::BadStartByte(0xAA))
        );
    }

    #[test]
    fn mismatched_command_echo_rejected() {
        let frame = response_frame(CMD_READ_RESULT, [0x00, 0x32, 0, 0, 0, 0x01]);
        assert_eq!(
            decode_response(&frame, CMD_QUERY_STATE),
            Err(FrameError::BadCommandEcho {
                expected: CMD_QUERY_STATE,
                actual: CMD_READ_RESULT,
            })
        );
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let mut frame = response_frame(CMD_QUERY_STATE, [0x31, 0, 0, 0, 0, 0]);
        let good = frame[FRAME_LEN - 1];
        frame[FRAME_LEN - 1] = good.wrapping_add(1);
        assert_eq!(
            decode_response(&frame, CMD_QUERY_STATE),
            Err(FrameError::ChecksumMismatch {
                expected: good,
                actual: good.wrapping_add(1),
            })
        );
    }
}
