//! quartet-hw-interface
//!
//! Firmware for the Quartet four-channel CV reference generator on the
//! Raspberry Pi Pico 2. Wires the library crates into the live module:
//!
//! 1. A 4 kHz control tick renders the pitch CVs for idle channels from
//!    the per-channel settings and runs the autotune engine for the
//!    channel being calibrated, then flushes the latched codes to the
//!    DAC8564 over SPI.
//! 2. A capture task timestamps rising edges of the VCO tuning input and
//!    feeds period samples to the engine's frequency meter.
//! 3. Two buttons drive the engine: SELECT cycles the addressed channel
//!    (long press: bump its octave), TUNE arms / starts / acknowledges
//!    (short press) or aborts (long press).
//! 4. The OLED task renders the engine's status snapshots at 30 Hz.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C1, SPI0};
use embassy_rp::spi::{self, Spi};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_embedded_hal::shared_bus::asynch::spi::SpiDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use dac_driver::CalibratedDac;
use quartet::autotune::StatusFrame;
use quartet_oled_display_rs::{display_update_task, DisplayConfig, OledDriver};
use quartet_settings::channel_settings::SettingsStore;

mod capture;
mod control;
mod ui;

use capture::{capture_task, CaptureMeter};
use control::control_loop;
use ui::{select_task, tune_task, UiCommand};

// ---------------------------------------------------------------------------
// Boot block and interrupt binding
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

// Wire the I2C1 peripheral interrupt to Embassy's async handler.
bind_interrupts!(struct Irqs {
    I2C1_IRQ => i2c::InterruptHandler<I2C1>;
});

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// SPI0 bus behind a mutex; the DAC is its only device but the shared-bus
/// wrapper also owns the chip-select timing.
static SPI_BUS: StaticCell<Mutex<CriticalSectionRawMutex, Spi<'static, SPI0, spi::Async>>> =
    StaticCell::new();

/// Per-channel settings — written by the UI tasks, read by the control
/// tick.
static SETTINGS: StaticCell<Mutex<CriticalSectionRawMutex, SettingsStore>> = StaticCell::new();

/// Autotune status snapshot — written by the control tick, read by the
/// display task.
static STATUS: StaticCell<Mutex<CriticalSectionRawMutex, StatusFrame>> = StaticCell::new();

/// UI commands for the control tick.
static COMMANDS: Channel<CriticalSectionRawMutex, UiCommand, 8> = Channel::new();

/// VCO period samples, capture task → frequency meter.
static PERIODS: Channel<CriticalSectionRawMutex, u32, 16> = Channel::new();

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// Concrete SPI type for the DAC, wrapping SPI_BUS with its chip select.
type DacSpi = SpiDevice<
    'static,
    CriticalSectionRawMutex,
    Spi<'static, SPI0, spi::Async>,
    Output<'static>,
>;

/// Concrete I2C type for the OLED display (exclusive use of I2C1).
type OledI2c = I2c<'static, I2C1, i2c::Async>;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Thin wrapper that monomorphises the generic control loop so it can be
/// spawned as a concrete Embassy task.
#[embassy_executor::task]
async fn control_task(
    dac: CalibratedDac<DacSpi>,
    meter: CaptureMeter,
    settings: &'static Mutex<CriticalSectionRawMutex, SettingsStore>,
    status: &'static Mutex<CriticalSectionRawMutex, StatusFrame>,
) {
    control_loop(dac, meter, &COMMANDS, settings, status).await;
}

/// Thin wrapper for the generic display task.
#[embassy_executor::task]
async fn oled_task(
    driver: OledDriver<OledI2c>,
    status: &'static Mutex<CriticalSectionRawMutex, StatusFrame>,
    config: DisplayConfig,
) {
    display_update_task(driver, status, config).await;
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("quartet-hw-interface starting");

    // —— Pin assignments ————————————————————————————————————————————————————
    // SPI0 CLK  → GP18    DAC8564 SCLK
    // SPI0 MOSI → GP19    DAC8564 DIN
    // DAC CS    → GP17    active-low, manual via SpiDevice
    // I2C1 SDA  → GP2     OLED
    // I2C1 SCL  → GP3     OLED
    // FREQ IN   → GP22    VCO square wave, comparator output
    // BTN SEL   → GP14    active-low, pull-up enabled
    // BTN TUNE  → GP15    active-low, pull-up enabled
    // ———————————————————————————————————————————————————————————————————————

    // DAC SPI bus. The DAC8564 clocks data on the falling SCLK edge and
    // tolerates well above 10 MHz.
    let mut spi_config = spi::Config::default();
    spi_config.frequency = 10_000_000;
    let spi = Spi::new_txonly(p.SPI0, p.PIN_18, p.PIN_19, p.DMA_CH0, spi_config);
    let spi_bus = SPI_BUS.init(Mutex::new(spi));

    let dac_cs = Output::new(p.PIN_17, Level::High);
    let dac = CalibratedDac::new(SpiDevice::new(spi_bus, dac_cs));

    // OLED on its own I2C peripheral at the standard SSD1306 address.
    let i2c = I2c::new_async(p.I2C1, p.PIN_3, p.PIN_2, Irqs, i2c::Config::default());
    let oled = OledDriver::new(i2c, 0x3C);

    // VCO tuning input. The analog front end squares the signal up; the
    // pull-down keeps the pin quiet with nothing patched.
    let freq_in = Input::new(p.PIN_22, Pull::Down);
    let meter = CaptureMeter::new(&PERIODS);

    // UI buttons, active-low.
    let select_btn = Input::new(p.PIN_14, Pull::Up);
    let tune_btn = Input::new(p.PIN_15, Pull::Up);

    // Shared state.
    let settings = SETTINGS.init(Mutex::new(SettingsStore::new()));
    let status = STATUS.init(Mutex::new(StatusFrame::default()));

    // —— Spawn tasks ————————————————————————————————————————————————————————

    spawner.spawn(capture_task(freq_in, &PERIODS)).unwrap();
    spawner
        .spawn(control_task(dac, meter, settings, status))
        .unwrap();
    spawner
        .spawn(select_task(select_btn, settings, status))
        .unwrap();
    spawner
        .spawn(tune_task(tune_btn, &COMMANDS, settings, status))
        .unwrap();
    spawner
        .spawn(oled_task(oled, status, DisplayConfig::default()))
        .unwrap();

    info!("All tasks spawned");
}
