#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use esp_hal::Async;
use esp_hal::Config;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Pull};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;

use log::{error, info};

use embassy_executor::Spawner;
use embassy_time::{Duration, Ticker};

use thermal_drivers::lm75bd::{Config as Lm75bdConfig, Lm75bd};
use thermal_mgr::{LogNotifier, MonitorTask, ThermalEvent, ThermalManager};

// I²C bus frequency.
const I2C_FREQUENCY_KHZ: u32 = 100;

// The thermal manager shared by the monitor and the producers.
static THERMAL: ThermalManager = ThermalManager::new();

type Sensor = Lm75bd<I2c<'static, Async>>;
type Monitor = MonitorTask<'static, Lm75bdConfig, Sensor, LogNotifier>;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

#[toml_cfg::toml_config]
struct DeviceConfig {
    #[default(0x4F)]
    sensor_address: u8,
    #[default(1000)]
    measure_interval_ms: u64,
}

macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}

#[embassy_executor::task]
async fn monitor(task: Monitor) {
    task.run().await
}

#[embassy_executor::task]
async fn measure(interval: Duration) {
    let mut ticker = Ticker::every(interval);

    loop {
        ticker.next().await;

        if let Err(e) = THERMAL.send_event(ThermalEvent::MeasureTemperature) {
            error!("Measurement request rejected: {e}");
        }
    }
}

#[embassy_executor::task]
async fn os_interrupt(mut os_pin: Input<'static>) {
    loop {
        // The OS output is configured as active low.
        os_pin.wait_for_falling_edge().await;
        THERMAL.on_os_interrupt();
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger_from_env();

    let config = Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_int = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_int.software_interrupt0);

    info!("ESP RTOS started!");

    // Retrieve device configuration.
    let device_config = DEVICE_CONFIG;

    // The monitor borrows the sensor configuration forever.
    let sensor_config: &'static Lm75bdConfig = mk_static!(
        Lm75bdConfig,
        Lm75bdConfig::new(device_config.sensor_address)
    );

    let i2c = I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQUENCY_KHZ)),
    )
    .expect("Failed to configure the I2C bus")
    .with_sda(peripherals.GPIO4)
    .with_scl(peripherals.GPIO5)
    .into_async();

    let mut sensor = Lm75bd::new(i2c);
    sensor
        .configure(sensor_config)
        .await
        .expect("Failed to configure the LM75BD sensor");

    let task = THERMAL
        .init(sensor_config, sensor, LogNotifier::new())
        .expect("Thermal manager already initialized");

    spawner
        .spawn(monitor(task))
        .expect("Impossible to spawn the thermal monitor task");

    // OS output of the sensor, open drain.
    let os_pin = Input::new(
        peripherals.GPIO3,
        InputConfig::default().with_pull(Pull::Up),
    );

    spawner
        .spawn(os_interrupt(os_pin))
        .expect("Impossible to spawn the OS interrupt task");

    spawner
        .spawn(measure(Duration::from_millis(
            device_config.measure_interval_ms,
        )))
        .expect("Impossible to spawn the measurement task");
}
