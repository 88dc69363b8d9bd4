#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

use embedded_io::ReadReady;
use embedded_io_async::{Read, Write};
use log::debug;

mod command;
pub use command::*;

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

mod frame;
pub use frame::*;

mod timer;
pub use timer::*;

/// Operating state reported by the sensor's own state machine.
///
/// The driver mirrors this state from query-state responses; it never
/// advances it locally. The only way to push the sensor to another state
/// is an explicit state-change command, and even then the mirror is not
/// updated until the next successful query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorState {
    /// Waiting for instructions.
    Idle,
    /// Warming the sensing element before a test.
    Preheating,
    /// Preheat done, waiting for the subject to blow.
    WaitingForBlow,
    /// A blow is in progress.
    Blowing,
    /// The blow stopped before the configured blow duration elapsed.
    BlowInterrupted,
    /// Computing the result from the captured sample.
    Calculating,
    /// A measurement is ready to be read.
    ResultReady,
    /// Any state code the documentation does not cover.
    Unknown(u8),
}

impl SensorState {
    /// Maps a state code from a query-state response.
    pub fn from_code(code: u8) -> Self {
        match code {
            STATE_IDLE => SensorState::Idle,
            STATE_PREHEATING => SensorState::Preheating,
            STATE_WAITING_FOR_BLOW => SensorState::WaitingForBlow,
            STATE_BLOWING => SensorState::Blowing,
            STATE_BLOW_INTERRUPTED => SensorState::BlowInterrupted,
            STATE_CALCULATING => SensorState::Calculating,
            STATE_RESULT_READY => SensorState::ResultReady,
            other => SensorState::Unknown(other),
        }
    }

    /// The wire code for this state.
    pub fn code(&self) -> u8 {
        match *self {
            SensorState::Idle => STATE_IDLE,
            SensorState::Preheating => STATE_PREHEATING,
            SensorState::WaitingForBlow => STATE_WAITING_FOR_BLOW,
            SensorState::Blowing => STATE_BLOWING,
            SensorState::BlowInterrupted => STATE_BLOW_INTERRUPTED,
            SensorState::Calculating => STATE_CALCULATING,
            SensorState::ResultReady => STATE_RESULT_READY,
            SensorState::Unknown(code) => code,
        }
    }
}

/// Alarm tier the sensor assigns to a measured concentration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmLevel {
    /// Below the drinking threshold (< 20 mg/100ml).
    None,
    /// Between the thresholds (20-80 mg/100ml).
    Drinking,
    /// At or above the drunk threshold (>= 80 mg/100ml).
    Drunk,
    /// Any alarm code the documentation does not cover.
    Unknown(u8),
}

impl AlarmLevel {
    /// Maps an alarm code from a read-result response.
    pub fn from_code(code: u8) -> Self {
        match code {
            ALARM_NONE => AlarmLevel::None,
            ALARM_DRINKING => AlarmLevel::Drinking,
            ALARM_DRUNK => AlarmLevel::Drunk,
            other => AlarmLevel::Unknown(other),
        }
    }
}

/// A completed breath test read back from the sensor.
///
/// Produced fresh on every successful read-result exchange; the driver
/// never caches one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementResult {
    /// Alcohol concentration in mg/100ml.
    pub concentration: u16,
    /// Alarm tier the sensor assigned to the concentration.
    pub alarm: AlarmLevel,
}

/// The sensor's alarm thresholds, both in mg/100ml.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Concentration at which the drinking alarm trips.
    pub drinking: u8,
    /// Concentration at which the drunk alarm trips.
    pub drunk: u8,
}

/// Represents a ZE29A breath-alcohol sensor on a serial link.
///
/// The driver owns one strictly sequential request/response exchange at a
/// time; `&mut self` on every operation is the critical section that keeps
/// the periodic state-poll path and on-demand commands from interleaving
/// on the shared receive buffer.
///
/// # Type Parameters
///
/// * `Serial`: The serial interface used to communicate with the sensor.
///   It must implement `embedded_io_async::Read`, `embedded_io_async::Write`
///   and `embedded_io::ReadReady`, and is expected to be already opened and
///   configured (the module talks 9600 baud, 8N1).
/// * `T`: The [`Timer`] providing deadlines and delays.
pub struct Ze29a<Serial, T> {
    serial: Serial,
    timer: T,
    config: Config,
    state: SensorState,
}

impl<S, T> Ze29a<S, T>
where
    S: Read + Write + ReadReady,
    T: Timer,
{
    /// Creates a new `Ze29a` driver instance.
    ///
    /// # Arguments
    ///
    /// * `serial`: The serial interface for communication with the sensor.
    /// * `timer`: The time source for timeouts and delays.
    /// * `config`: Protocol timings; `Config::default()` matches the module.
    ///
    /// The mirrored state starts out as `Unknown` until the first
    /// successful state query; operations gated on the state will refuse
    /// to run before one.
    pub fn new(serial: S, timer: T, config: Config) -> Self {
        Self {
            serial,
            timer,
            config,
            state: SensorState::Unknown(0x00),
        }
    }

    /// Last state mirrored from the sensor, as of the most recent
    /// successful state query.
    pub fn last_state(&self) -> SensorState {
        self.state
    }

    /// Verifies communication with the sensor.
    ///
    /// Drops whatever stale bytes are sitting in the receive path and runs
    /// one state query, seeding the mirrored state.
    pub async fn init(&mut self) -> Result<SensorState, Error> {
        self.drain_stale_bytes().await?;
        let state = self.query_state().await?;
        debug!("ZE29A init complete, sensor state: {:?}", state);
        Ok(state)
    }

    /// Queries the sensor's operating state and updates the mirror.
    pub async fn query_state(&mut self) -> Result<SensorState, Error> {
        let payload = self.transact(Command::QueryState).await?;
        let state = SensorState::from_code(payload[0]);
        if let SensorState::Unknown(code) = state {
            log::warn!("Sensor reported undocumented state code {:#04X}", code);
        }
        self.state = state;
        Ok(state)
    }

    /// Asks the sensor to move to `target`.
    ///
    /// The sensor is free to refuse; a non-acknowledging reply surfaces as
    /// [`Error::CommandRejected`] with the ack byte it sent instead.
    pub async fn change_state(&mut self, target: SensorState) -> Result<(), Error> {
        debug!("Requesting state change to {:?}", target);
        let payload = self.transact(Command::ChangeState(target)).await?;
        if payload[0] == ACK_OK {
            Ok(())
        } else {
            log::error!(
                "State change to {:?} rejected with {:#04X}",
                target,
                payload[0]
            );
            Err(Error::CommandRejected(payload[0]))
        }
    }

    /// Starts a new breath test.
    ///
    /// Legal only while the mirrored state is `Idle` or `ResultReady`;
    /// anywhere else the call fails with [`Error::InvalidStateTransition`]
    /// without transmitting a byte. On the legal path the driver waits
    /// (bounded, non-fatal) for the sensor to settle back to `Idle`, then
    /// commands the transition to `Preheating`. From there the sensor
    /// advances through `WaitingForBlow`, `Blowing`, `Calculating` and
    /// `ResultReady` on its own; callers follow along with
    /// [`query_state`](Self::query_state) or
    /// [`wait_for_state`](Self::wait_for_state).
    pub async fn start_test(&mut self) -> Result<(), Error> {
        if self.state != SensorState::Idle && self.state != SensorState::ResultReady {
            log::error!("Cannot start a test from {:?}", self.state);
            return Err(Error::InvalidStateTransition(self.state));
        }

        // Coming from ResultReady the sensor drops back to Idle on its
        // own; the preheat command is only accepted once it has.
        if !self
            .wait_for_state(SensorState::Idle, START_TEST_IDLE_WAIT_MS)
            .await
        {
            log::warn!(
                "Sensor not idle after {} ms, attempting preheat anyway",
                START_TEST_IDLE_WAIT_MS
            );
        }

        self.change_state(SensorState::Preheating).await
    }

    /// Polls the sensor until it reports `target` or `timeout_ms` elapses.
    ///
    /// Queries at the configured poll interval. A failed query inside the
    /// loop is logged and polling continues; the sensor frequently drops a
    /// frame while it is busy switching states.
    ///
    /// # Returns
    ///
    /// `true` once the mirrored state equals `target`, `false` if the
    /// timeout elapsed first. Never an error: elapsing is an expected
    /// outcome, not a fault.
    pub async fn wait_for_state(&mut self, target: SensorState, timeout_ms: u32) -> bool {
        let deadline = self.timer.now_ms() + timeout_ms as u64;
        loop {
            match self.query_state().await {
                Ok(state) if state == target => return true,
                Ok(state) => debug!("Waiting for {:?}, sensor is {:?}", target, state),
                Err(e) => debug!("State poll failed while waiting for {:?}: {:?}", target, e),
            }
            if self.timer.now_ms() >= deadline {
                debug!("Timed out waiting for state {:?}", target);
                return false;
            }
            self.timer.delay_ms(self.config.poll_interval_ms).await;
        }
    }

    /// Reads a completed measurement.
    ///
    /// Guarded on the mirrored state being `ResultReady`; the sensor only
    /// holds a valid result in that state.
    pub async fn read_result(&mut self) -> Result<MeasurementResult, Error> {
        if self.state != SensorState::ResultReady {
            return Err(Error::InvalidStateTransition(self.state));
        }

        let payload = self.transact(Command::ReadResult).await?;
        let concentration = u16::from_be_bytes([payload[0], payload[1]]);
        let alarm = AlarmLevel::from_code(payload[5]);
        debug!("Measurement: {} mg/100ml, alarm {:?}", concentration, alarm);
        Ok(MeasurementResult {
            concentration,
            alarm,
        })
    }

    /// Reads the configured blow duration from the sensor.
    ///
    /// Always re-queries the device; the value is never cached host-side.
    pub async fn read_blow_time(&mut self) -> Result<u8, Error> {
        let payload = self.transact(Command::ReadBlowTime).await?;
        let seconds = payload[0];
        if !(BLOW_TIME_MIN..=BLOW_TIME_MAX).contains(&seconds) {
            log::warn!(
                "Sensor reported blow time {} s outside the documented {}-{} s range",
                seconds,
                BLOW_TIME_MIN,
                BLOW_TIME_MAX
            );
        }
        Ok(seconds)
    }

    /// Sets the blow duration on the sensor.
    ///
    /// # Arguments
    ///
    /// * `seconds`: Desired blow duration, 1 to 10 seconds.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the sensor acknowledged the new duration.
    /// * `Err(Error::InvalidArg)` if `seconds` is out of range; nothing is
    ///   transmitted in that case.
    /// * `Err(Error::CommandRejected)` if the sensor refused the value.
    pub async fn write_blow_time(&mut self, seconds: u8) -> Result<(), Error> {
        if !(BLOW_TIME_MIN..=BLOW_TIME_MAX).contains(&seconds) {
            log::error!(
                "Blow time {} s out of range ({}-{} s)",
                seconds,
                BLOW_TIME_MIN,
                BLOW_TIME_MAX
            );
            return Err(Error::InvalidArg);
        }

        let payload = self.transact(Command::WriteBlowTime(seconds)).await?;
        if payload[0] == ACK_OK {
            debug!("Blow time set to {} s", seconds);
            Ok(())
        } else {
            log::error!("Blow time change rejected with {:#04X}", payload[0]);
            Err(Error::CommandRejected(payload[0]))
        }
    }

    /// Reads the drinking and drunk alarm thresholds.
    pub async fn read_thresholds(&mut self) -> Result<Thresholds, Error> {
        let payload = self.transact(Command::ReadThresholds).await?;
        Ok(Thresholds {
            drinking: payload[0],
            drunk: payload[1],
        })
    }

    // One full exchange: encode, send, wait out the settle delay, read the
    // response frame, validate it against the command's echo.
    async fn transact(&mut self, command: Command) -> Result<[u8; RESPONSE_PAYLOAD_LEN], Error> {
        let request = command.frame();
        self.send_frame(&request).await?;
        let response = self.read_frame().await?;
        let payload = frame::decode_response(&response, command.code())?;
        Ok(payload)
    }

    // Transmits one request frame. Stale bytes are drained first so a
    // prior unread response cannot be mistaken for the reply to this
    // command, and the settle delay runs before the caller starts reading.
    async fn send_frame(&mut self, request: &[u8; FRAME_LEN]) -> Result<(), Error> {
        self.drain_stale_bytes().await?;

        debug!("Sending frame: {:02X?}", request);
        self.serial
            .write_all(request)
            .await
            .map_err(|_| Error::WriteFailure)?;
        self.serial.flush().await.map_err(|_| Error::WriteFailure)?;

        self.timer.delay_ms(self.config.settle_delay_ms).await;
        Ok(())
    }

    // Assembles one 9-byte response frame within the configured timeout.
    // Bytes ahead of the 0xFF start marker are discarded, which is what
    // resynchronizes the stream after garbage or a half-read frame.
    async fn read_frame(&mut self) -> Result<[u8; FRAME_LEN], Error> {
        let deadline = self.timer.now_ms() + self.config.read_timeout_ms as u64;
        let mut response = [0u8; FRAME_LEN];
        let mut filled = 0usize;

        while self.timer.now_ms() < deadline {
            if !self.serial.read_ready().map_err(|_| Error::ReadFailure)? {
                self.timer.delay_ms(IDLE_POLL_MS).await;
                continue;
            }

            let mut byte = [0u8; 1];
            let n = self
                .serial
                .read(&mut byte)
                .await
                .map_err(|_| Error::ReadFailure)?;
            if n == 0 {
                // read_ready lied; the channel is gone.
                return Err(Error::ReadFailure);
            }

            if filled == 0 {
                if byte[0] != FRAME_START {
                    debug!("Discarding {:#04X} while searching for frame start", byte[0]);
                    continue;
                }
                response[0] = FRAME_START;
                filled = 1;
                continue;
            }

            response[filled] = byte[0];
            filled += 1;
            if filled == FRAME_LEN {
                debug!("Received frame: {:02X?}", response);
                return Ok(response);
            }
        }

        if filled == 0 {
            log::error!("No response within {} ms", self.config.read_timeout_ms);
            Err(ReadError::NoDataTimeout.into())
        } else {
            log::error!("Response stalled at {} of {} bytes", filled, FRAME_LEN);
            Err(ReadError::PartialTimeout(filled).into())
        }
    }

    // Consumes everything currently readable on the serial link.
    async fn drain_stale_bytes(&mut self) -> Result<(), Error> {
        let mut drained = 0usize;
        while self.serial.read_ready().map_err(|_| Error::ReadFailure)? {
            let mut scratch = [0u8; 16];
            let n = self
                .serial
                .read(&mut scratch)
                .await
                .map_err(|_| Error::ReadFailure)?;
            if n == 0 {
                break;
            }
            drained += n;
        }
        if drained > 0 {
            debug!("Drained {} stale byte(s) before sending", drained);
        }
        Ok(())
    }
}
