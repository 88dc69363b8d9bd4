// FRAME_START is the byte that marks the beginning of every frame,
// request and response alike. Bytes received before it are noise.
pub const FRAME_START: u8 = 0xFF;

// SENSOR_ADDRESS is the fixed device address carried in byte 1 of every
// request frame. The ZE29A does not support multi-drop addressing.
pub const SENSOR_ADDRESS: u8 = 0x01;

// FRAME_LEN is the length of every frame on the wire, start byte and
// checksum included.
pub const FRAME_LEN: usize = 9;

// MAX_DATA_LEN is the number of data bytes in a request frame; unused
// positions are zero-padded.
pub const MAX_DATA_LEN: usize = 5;

// RESPONSE_PAYLOAD_LEN is the number of data bytes in a response frame
// (frame bytes 2..=7, between the command echo and the checksum).
pub const RESPONSE_PAYLOAD_LEN: usize = 6;

// ACK_OK is the payload byte the sensor answers with when it accepts a
// state-change or configuration command.
pub const ACK_OK: u8 = 0x01;

// Command codes from the sensor documentation.
pub const CMD_QUERY_STATE: u8 = 0x85;
pub const CMD_READ_RESULT: u8 = 0x86;
pub const CMD_CHANGE_STATE: u8 = 0x87;
pub const CMD_READ_BLOW_TIME: u8 = 0x88;
pub const CMD_WRITE_BLOW_TIME: u8 = 0x89;
pub const CMD_READ_THRESHOLDS: u8 = 0x90;

// Operating state codes reported in byte 0 of a query-state response.
pub const STATE_IDLE: u8 = 0x31;
pub const STATE_PREHEATING: u8 = 0x32;
pub const STATE_WAITING_FOR_BLOW: u8 = 0x33;
pub const STATE_BLOWING: u8 = 0x34;
pub const STATE_BLOW_INTERRUPTED: u8 = 0x35;
pub const STATE_CALCULATING: u8 = 0x36;
pub const STATE_RESULT_READY: u8 = 0x37;

// Alarm status codes reported alongside a measurement result.
pub const ALARM_NONE: u8 = 0x00;
pub const ALARM_DRINKING: u8 = 0x01;
pub const ALARM_DRUNK: u8 = 0x02;

// Valid range for the configurable blow duration, in seconds.
pub const BLOW_TIME_MIN: u8 = 1;
pub const BLOW_TIME_MAX: u8 = 10;

// DEFAULT_READ_TIMEOUT_MS bounds how long a single response read may take.
pub const DEFAULT_READ_TIMEOUT_MS: u32 = 3000;

// DEFAULT_SETTLE_DELAY_MS is how long the sensor needs after a command has
// been transmitted before its reply can be expected on the wire.
pub const DEFAULT_SETTLE_DELAY_MS: u32 = 800;

// DEFAULT_POLL_INTERVAL_MS is the pause between state queries while waiting
// for the sensor to reach a target state.
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 500;

// IDLE_POLL_MS is the pause between receive-buffer probes while a read is
// waiting for the next byte to arrive.
pub const IDLE_POLL_MS: u32 = 10;

// START_TEST_IDLE_WAIT_MS bounds the wait for the sensor to settle back to
// idle before a new test is triggered.
pub const START_TEST_IDLE_WAIT_MS: u32 = 10_000;
