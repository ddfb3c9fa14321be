#![no_std]
#![no_main]

// Sends SOS on the speaker and LEDs, then waits for the four buttons to be
// pressed in order to switch the LEDs off.

use defmt::{error, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32::exti::{Channel, ExtiInput};
use embassy_stm32::gpio::{Level, Output, Pin, Pull, Speed};
use enum_ordinalize::Ordinalize;
use panic_halt as _;

use despi_m02_beacon::{Beacon, SOS, Source};

mod io;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // Clocks, with the default configuration.
    let peripherals = embassy_stm32::init(Default::default());

    // Outputs: LED1..LED4 and the speaker.
    let leds = io::LedBank::new([
        Output::new(peripherals.PB6.degrade(), Level::Low, Speed::Low),
        Output::new(peripherals.PB7.degrade(), Level::Low, Speed::Low),
        Output::new(peripherals.PB8.degrade(), Level::Low, Speed::Low),
        Output::new(peripherals.PB9.degrade(), Level::Low, Speed::Low),
    ]);
    let speaker = Output::new(peripherals.PE1.degrade(), Level::Low, Speed::Low);

    // Inputs: SW1..SW4, active-low with pull-ups.
    let buttons: [ExtiInput<'static>; Source::VARIANT_COUNT] = [
        ExtiInput::new(peripherals.PE2.degrade(), peripherals.EXTI2.degrade(), Pull::Up),
        ExtiInput::new(peripherals.PE3.degrade(), peripherals.EXTI3.degrade(), Pull::Up),
        ExtiInput::new(peripherals.PE4.degrade(), peripherals.EXTI4.degrade(), Pull::Up),
        ExtiInput::new(peripherals.PE5.degrade(), peripherals.EXTI5.degrade(), Pull::Up),
    ];

    let mut beacon = Beacon::new(io::TimerBank::new(speaker), leds);
    match beacon.start(&SOS) {
        Ok(()) => info!("beacon started"),
        Err(e) => error!("beacon not started: {}", e),
    }
    io::install(beacon);

    spawner.spawn(io::compare_task()).unwrap();
    for (source, button) in Source::VARIANTS.iter().zip(buttons) {
        spawner.spawn(io::button_task(*source, button)).unwrap();
    }
}
