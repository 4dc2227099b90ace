#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those     holding buffers for the duration of a data transfer."
)]

use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Timer};
use esp_hal::i2c::master::I2c;
use esp_hal::{
    clock::CpuClock,
    gpio::{Input, InputConfig, Pull},
    time::Rate,
    timer::systimer::SystemTimer,
};
use esp_println::println;
use log::{info, warn};
use static_cell::StaticCell;
use tca8418_keypad_async::{KeyId, Keypad, KeypadConfig, KeypadController, Timeout};

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    println!("{}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

type DemoController = KeypadController<
    'static,
    I2c<'static, esp_hal::Async>,
    esp_hal::i2c::master::Error,
    CriticalSectionRawMutex,
>;

static KEYPAD: StaticCell<Keypad<CriticalSectionRawMutex>> = StaticCell::new();

const SECRET: [u8; 3] = [1, 2, 3];

/// The main entry point of the application.
#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger(log::LevelFilter::Debug);
    info!("Logger initialized");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timer0 = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(timer0.alarm0);

    let keypad_scl = peripherals.GPIO14;
    let keypad_sda = peripherals.GPIO13;
    let keypad_int = Input::new(
        peripherals.GPIO15,
        InputConfig::default().with_pull(Pull::Up),
    );

    let config = esp_hal::i2c::master::Config::default().with_frequency(Rate::from_khz(100));
    let keypad_i2c = I2c::new(peripherals.I2C0, config)
        .unwrap()
        .with_sda(keypad_sda)
        .with_scl(keypad_scl)
        .into_async();

    let keypad_config = KeypadConfig::default();
    let keypad: &'static Keypad<CriticalSectionRawMutex> =
        KEYPAD.init(Keypad::new(&keypad_config));
    let mut controller = KeypadController::new(keypad_i2c, keypad, &keypad_config);
    match controller.init().await {
        Ok(_) => log::debug!("Keypad controller initialized."),
        Err(err) => warn!("Error initializing keypad controller: {err:?}"),
    };

    for corner in [0, 4, 20, 24].into_iter().filter_map(KeyId::new) {
        keypad.on_key_pressed(corner, move || {
            info!("Corner {corner} (row {}, column {})", corner.row(), corner.column())
        });
    }
    keypad.on_any_key_released(|key| log::debug!("Released {key}"));

    spawner.spawn(drain_keypad(controller, keypad_int)).unwrap();

    let secret: heapless::Vec<KeyId, 3> = SECRET.into_iter().filter_map(KeyId::new).collect();
    loop {
        info!("Enter the code {SECRET:?}");
        keypad.clear_event_queue();
        if keypad.wait_for_sequence_default(&secret).await {
            info!("Correct!");
        } else {
            warn!("Wrong code.");
        }

        info!("Press any key to try again");
        if let Some(key) = keypad.wait_for_any_key(Timeout::from_millis(5000)).await {
            info!("Key {key} pressed, currently down: {:?}", keypad.pressed_keys());
        }
        Timer::after(Duration::from_millis(200)).await;
    }
}

/// Drains the TCA8418 whenever its INT line falls.
#[embassy_executor::task]
async fn drain_keypad(mut controller: DemoController, mut int: Input<'static>) {
    controller.run_on_interrupt(&mut int).await;
}
