use crate::SensorState;

/// Reasons a received 9-byte frame fails validation.
///
/// A frame that fails any of these checks is discarded whole; no field of
/// it is ever trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Byte 0 was not the 0xFF start marker.
    BadStartByte(u8),
    /// Byte 1 did not echo the command this response was read for.
    BadCommandEcho { expected: u8, actual: u8 },
    /// The checksum byte did not match the sum of bytes 1..=7.
    ChecksumMismatch { expected: u8, actual: u8 },
}

/// Outcomes of a response read that ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// The timeout elapsed without a start marker ever arriving.
    NoDataTimeout,
    /// A start marker arrived but the frame stalled at this many bytes.
    PartialTimeout(usize),
}

/// Errors the driver can report. All of them are recoverable: the driver
/// never panics or retries on its own, it hands the decision back to the
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A caller-supplied value was outside its contractual range; nothing
    /// was transmitted.
    InvalidArg,
    /// The response frame failed validation.
    Frame(FrameError),
    /// The response read timed out.
    Read(ReadError),
    /// The operation is not legal in the current mirrored sensor state.
    InvalidStateTransition(SensorState),
    /// The sensor answered but did not acknowledge the command; carries
    /// the ack byte it sent instead of 0x01.
    CommandRejected(u8),
    /// The underlying serial channel failed while reading.
    ReadFailure,
    /// The underlying serial channel failed while writing.
    WriteFailure,
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Error::Frame(e)
    }
}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Self {
        Error::Read(e)
    }
}
