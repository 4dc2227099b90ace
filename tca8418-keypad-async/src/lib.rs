//! An asynchronous, `no_std` driver for a 5x5 keypad behind a TCA8418 key
//! scanner.
//!
//! The driver is split in two halves:
//!
//! * [`KeypadController`] owns the I2C device. It configures the TCA8418,
//!   drains its key event FIFO whenever the INT line falls (or on a poll
//!   tick) and decodes the raw codes into [`KeyEvent`]s.
//! * [`Keypad`] holds the state shared with the application: which keys are
//!   down, the last pressed and released key, per-key and wildcard handlers
//!   and a queue of events the `wait_for_*` methods consume.
//!
//! Keys are numbered `0..=24` row by row, see [`KeyId`].
//!
//! # Usage
//!
//! ```ignore
//! # #![no_std]
//! # #![no_main]
//! # use esp_hal::i2c::master::I2c;
//! # use esp_hal::gpio::{Input, InputConfig, Pull};
//! # use esp_hal::Config;
//! # use esp_hal::clock::CpuClock;
//! # use esp_hal::time::Rate;
//! # use embassy_executor::Spawner;
//! # use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! # use static_cell::StaticCell;
//! use tca8418_keypad_async::{KeyId, Keypad, KeypadConfig, KeypadController, Timeout};
//!
//! static KEYPAD: StaticCell<Keypad<CriticalSectionRawMutex>> = StaticCell::new();
//!
//! #[esp_hal_embassy::main]
//! async fn main(spawner: Spawner) {
//!     let peripherals = esp_hal::init(Config::default().with_cpu_clock(CpuClock::max()));
//!     let config = esp_hal::i2c::master::Config::default().with_frequency(Rate::from_khz(100));
//!     let i2c = I2c::new(peripherals.I2C0, config)
//!         .unwrap()
//!         .with_sda(peripherals.GPIO13)
//!         .with_scl(peripherals.GPIO14)
//!         .into_async();
//!     let int = Input::new(peripherals.GPIO15, InputConfig::default().with_pull(Pull::Up));
//!
//!     let keypad_config = KeypadConfig::default();
//!     let keypad = &*KEYPAD.init(Keypad::new(&keypad_config));
//!     let mut controller = KeypadController::new(i2c, keypad, &keypad_config);
//!     controller.init().await.unwrap();
//!     spawner.spawn(drain_keypad(controller, int)).unwrap();
//!
//!     keypad.on_any_key_pressed(|key| log::info!("Pressed {key}"));
//!     if keypad.wait_for_key_press(KeyId::new(12).unwrap(), Timeout::Never).await {
//!         // log::info!("Middle key pressed");
//!     }
//! }
//!
//! #[embassy_executor::task]
//! async fn drain_keypad(
//!     mut controller: KeypadController<
//!         'static,
//!         I2c<'static, esp_hal::Async>,
//!         esp_hal::i2c::master::Error,
//!         CriticalSectionRawMutex,
//!     >,
//!     mut int: Input<'static>,
//! ) {
//!     controller.run_on_interrupt(&mut int).await;
//! }
//! ```

#![no_std]

extern crate alloc;

mod config;
mod controller;
mod key;
mod keypad;
pub mod reg;
mod timeout;

pub use config::KeypadConfig;
pub use controller::KeypadController;
pub use key::{KeyEvent, KeyId, COLUMNS, KEY_COUNT, ROWS};
pub use keypad::Keypad;
pub use timeout::Timeout;
