//! A fake TCA8418 behind an `embedded-hal-async` I2C bus.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal_async::i2c::{
    ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation, SevenBitAddress,
};
use tca8418_keypad_async::reg::{Register, TCA8418_I2C_ADDR};
use tca8418_keypad_async::{KeyId, Keypad, KeypadConfig, KeypadController};

pub type TestKeypad = Keypad<CriticalSectionRawMutex>;
pub type TestController<'a> =
    KeypadController<'a, FakeTca8418, ErrorKind, CriticalSectionRawMutex>;

struct Chip {
    registers: [u8; 0x40],
    fifo: VecDeque<u8>,
    writes: Vec<(u8, u8)>,
    selected: u8,
    failing: bool,
}

impl Default for Chip {
    fn default() -> Self {
        Self {
            registers: [0; 0x40],
            fifo: VecDeque::new(),
            writes: Vec::new(),
            selected: 0,
            failing: false,
        }
    }
}

impl Chip {
    fn write(&mut self, reg: u8, value: u8) {
        self.writes.push((reg, value));
        if reg == Register::IntStat as u8 {
            self.registers[reg as usize] &= !value;
        } else {
            self.registers[reg as usize] = value;
        }
    }

    fn read(&mut self) -> u8 {
        if self.selected == Register::KeyEventA as u8 {
            self.fifo.pop_front().unwrap_or(0)
        } else {
            self.registers[self.selected as usize]
        }
    }
}

/// Cloning hands out another view of the same chip, so a test can keep
/// feeding the FIFO after the bus moved into a controller.
#[derive(Clone, Default)]
pub struct FakeTca8418(Rc<RefCell<Chip>>);

impl FakeTca8418 {
    pub fn push_raw(&self, codes: &[u8]) {
        self.0.borrow_mut().fifo.extend(codes.iter().copied());
    }

    pub fn fifo_len(&self) -> usize {
        self.0.borrow().fifo.len()
    }

    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.0.borrow().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.0.borrow_mut().writes.clear();
    }

    pub fn register(&self, reg: Register) -> u8 {
        self.0.borrow().registers[reg as usize]
    }

    pub fn set_register(&self, reg: Register, value: u8) {
        self.0.borrow_mut().registers[reg as usize] = value;
    }

    pub fn set_failing(&self, failing: bool) {
        self.0.borrow_mut().failing = failing;
    }
}

impl ErrorType for FakeTca8418 {
    type Error = ErrorKind;
}

impl I2c<SevenBitAddress> for FakeTca8418 {
    async fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        if chip.failing || address != TCA8418_I2C_ADDR {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    let bytes: &[u8] = *bytes;
                    if let Some(&reg) = bytes.first() {
                        chip.selected = reg;
                    }
                    if let &[reg, value] = bytes {
                        chip.write(reg, value);
                    }
                }
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = chip.read();
                    }
                }
            }
        }
        Ok(())
    }
}

/// An INT line that never sees another edge.
pub struct SilentInt;

impl embedded_hal::digital::ErrorType for SilentInt {
    type Error = Infallible;
}

impl embedded_hal_async::digital::Wait for SilentInt {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        core::future::pending().await
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        core::future::pending().await
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        core::future::pending().await
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        core::future::pending().await
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        core::future::pending().await
    }
}

/// Raw FIFO code for a press at the 0-based `row`/`column`.
pub fn press(row: u8, column: u8) -> u8 {
    0x80 | release(row, column)
}

/// Raw FIFO code for a release at the 0-based `row`/`column`.
pub fn release(row: u8, column: u8) -> u8 {
    row * 10 + column + 1
}

pub fn key(index: u8) -> KeyId {
    KeyId::new(index).unwrap()
}

pub fn keypad() -> TestKeypad {
    Keypad::new(&KeypadConfig::default())
}

pub fn controller<'a>(chip: &FakeTca8418, keypad: &'a TestKeypad) -> TestController<'a> {
    KeypadController::new(chip.clone(), keypad, &KeypadConfig::default())
}
