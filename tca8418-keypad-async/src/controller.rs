//! TCA8418 register access, init sequence and FIFO draining.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Timer};
use embedded_hal_async::digital::Wait;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};

use crate::config::KeypadConfig;
use crate::key::KeyEvent;
use crate::keypad::Keypad;
use crate::reg::*;

/// Drives a TCA8418 wired to a 5x5 key matrix and feeds the decoded events
/// into a [`Keypad`].
///
/// The controller owns the I2C device and is the only writer of the keypad
/// state. It is normally moved into its own task running either
/// [`run_on_interrupt`](Self::run_on_interrupt) or
/// [`run_polling`](Self::run_polling), while the application keeps a shared
/// reference to the `Keypad`.
pub struct KeypadController<
    'a,
    I2cType: I2c<SevenBitAddress, Error = ErrorType>,
    ErrorType: embedded_hal_async::i2c::Error,
    M: RawMutex,
> {
    i2c: I2cType,
    keypad: &'a Keypad<M>,
    address: u8,
    poll_interval: Duration,
}

impl<
        'a,
        I2cType: I2c<SevenBitAddress, Error = ErrorType>,
        ErrorType: embedded_hal_async::i2c::Error,
        M: RawMutex,
    > KeypadController<'a, I2cType, ErrorType, M>
{
    /// Creates a new `KeypadController`.
    ///
    /// # Arguments
    ///
    /// * `i2c` - An I2C peripheral that implements `embedded-hal-async::i2c::I2c`.
    /// * `keypad` - The shared keypad state the decoded events are delivered to.
    /// * `config` - Bus address and poll interval.
    pub fn new(i2c: I2cType, keypad: &'a Keypad<M>, config: &KeypadConfig) -> Self {
        Self {
            i2c,
            keypad,
            address: config.address,
            poll_interval: config.poll_interval,
        }
    }

    /// The keypad this controller feeds.
    pub fn keypad(&self) -> &'a Keypad<M> {
        self.keypad
    }

    /// Releases the I2C peripheral.
    pub fn release(self) -> I2cType {
        self.i2c
    }

    /// Writes `value` into `reg`.
    pub async fn write_register(&mut self, reg: Register, value: u8) -> Result<(), ErrorType> {
        self.i2c
            .write(self.address, &[reg.into(), value])
            .await
            .inspect_err(|err| log::warn!("Error writing {reg:?}: {err:?}"))
    }

    /// Reads the current value of `reg`.
    pub async fn read_register(&mut self, reg: Register) -> Result<u8, ErrorType> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg.into()], &mut buf)
            .await
            .inspect_err(|err| log::warn!("Error reading {reg:?}: {err:?}"))?;
        Ok(buf[0])
    }

    /// Initializes the keypad controller.
    ///
    /// Configures ROW0-ROW4 and COL0-COL4 as a debounced key matrix, throws
    /// away whatever the FIFO collected before, enables key event and
    /// overflow interrupts and resets the keypad state. Calling it again
    /// repeats the whole sequence; registered handlers survive.
    pub async fn init(&mut self) -> Result<(), ErrorType> {
        log::trace!("keypad::init start");

        self.write_register(Register::KpGpio1, KP_GPIO1_ROWS).await?;
        self.write_register(Register::KpGpio2, KP_GPIO2_COLS).await?;
        self.write_register(Register::KpGpio3, KP_GPIO3_UNUSED).await?;
        log::trace!("keypad::init matrix lines set");

        self.write_register(Register::DebounceDis1, DEBOUNCE_DIS1_ROWS).await?;
        self.write_register(Register::DebounceDis2, DEBOUNCE_DIS2_COLS).await?;
        self.write_register(Register::DebounceDis3, DEBOUNCE_DIS3_UNUSED).await?;
        log::trace!("keypad::init debounce set");

        self.flush_fifo().await?;
        log::trace!("keypad::init fifo flushed");

        self.write_register(Register::Cfg, CFG_KE_IEN | CFG_OVR_FLOW_IEN).await?;
        log::trace!("keypad::init interrupts enabled");

        self.keypad.reset();
        log::trace!("keypad::init done");
        Ok(())
    }

    /// Discards stale FIFO entries and clears the interrupt status.
    async fn flush_fifo(&mut self) -> Result<(), ErrorType> {
        for _ in 0..FIFO_DEPTH {
            let raw = self.read_register(Register::KeyEventA).await?;
            if raw == FIFO_EMPTY {
                break;
            }
            log::debug!("Discarding stale key code {raw:#04x}");
        }
        self.clear_interrupts().await
    }

    /// Acknowledges the key event and overflow interrupts so INT deasserts.
    async fn clear_interrupts(&mut self) -> Result<(), ErrorType> {
        self.write_register(Register::IntStat, INT_STAT_K_INT | INT_STAT_OVR_FLOW_INT).await
    }

    /// Reads FIFO entries until one decodes to a key of the 5x5 matrix.
    ///
    /// Codes of unused rows and columns are skipped. Returns `None` once the
    /// FIFO is empty, or straight away if the keypad has not been initialized.
    pub async fn read_key_event(&mut self) -> Result<Option<KeyEvent>, ErrorType> {
        if !self.keypad.is_initialized() {
            return Ok(None);
        }
        loop {
            let raw = self.read_register(Register::KeyEventA).await?;
            if raw == FIFO_EMPTY {
                return Ok(None);
            }
            match KeyEvent::from_raw(raw) {
                Some(event) => return Ok(Some(event)),
                None => log::debug!("Skipping key code {raw:#04x} outside the matrix"),
            }
        }
    }

    /// Drains the FIFO, dispatching every event to the keypad, then clears
    /// the interrupt status. Returns the number of events delivered.
    pub async fn process_key_events(&mut self) -> Result<usize, ErrorType> {
        if !self.keypad.is_initialized() {
            return Ok(0);
        }
        let mut count = 0;
        while let Some(event) = self.read_key_event().await? {
            self.keypad.dispatch(event);
            count += 1;
        }
        self.clear_interrupts().await?;
        Ok(count)
    }

    /// Processes key events every time `int` sees a falling edge. Never
    /// returns.
    ///
    /// `int` is the TCA8418 INT line, configured as an input with pull-up.
    /// The FIFO is drained once up front so events that arrived before the
    /// first edge are not stuck behind an already asserted line.
    pub async fn run_on_interrupt<P: Wait>(&mut self, int: &mut P) {
        loop {
            // Bus errors are logged by the register accessors.
            let _ = self.process_key_events().await;
            if let Err(err) = int.wait_for_falling_edge().await {
                log::warn!("Error waiting for keypad interrupt: {err:?}");
                Timer::after(self.poll_interval).await;
            }
        }
    }

    /// Processes key events once per poll interval. Never returns.
    ///
    /// Fallback for boards where the INT line is not wired.
    pub async fn run_polling(&mut self) {
        loop {
            let _ = self.process_key_events().await;
            Timer::after(self.poll_interval).await;
        }
    }
}
