use crate::constants::*;
use crate::frame;
use crate::SensorState;

/// The operations the sensor understands.
///
/// Each variant maps to a command code and the data bytes of its request
/// frame; interpreting the response payload is up to the caller issuing
/// the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Ask the sensor which operating state it is in (0x85).
    QueryState,
    /// Ask the sensor to move to the given state (0x87).
    ChangeState(SensorState),
    /// Read a completed measurement (0x86).
    ReadResult,
    /// Read the configured blow duration in seconds (0x88).
    ReadBlowTime,
    /// Set the blow duration in seconds (0x89). The driver validates the
    /// 1-10 s range before this command is ever encoded.
    WriteBlowTime(u8),
    /// Read the drinking and drunk alarm thresholds (0x90).
    ReadThresholds,
}

impl Command {
    /// The command code, echoed back in byte 1 of the response.
    pub fn code(&self) -> u8 {
        match self {
            Command::QueryState => CMD_QUERY_STATE,
            Command::ChangeState(_) => CMD_CHANGE_STATE,
            Command::ReadResult => CMD_READ_RESULT,
            Command::ReadBlowTime => CMD_READ_BLOW_TIME,
            Command::WriteBlowTime(_) => CMD_WRITE_BLOW_TIME,
            Command::ReadThresholds => CMD_READ_THRESHOLDS,
        }
    }

    /// Encodes this command as a ready-to-send request frame.
    pub fn frame(&self) -> [u8; FRAME_LEN] {
        match *self {
            Command::ChangeState(state) => frame::encode_command(self.code(), &[state.code()]),
            Command::WriteBlowTime(seconds) => frame::encode_command(self.code(), &[seconds]),
            _ => frame::encode_command(self.code(), &[]),
        }
    }
}
