/*
 * The four LEDs.
 *
 * Both the playback engine and the disarm state machine light the LEDs, but
 * only ever one of them at a time, so the shared state is a plain byte: the
 * last pattern written. The upper nibble carries the LEDs, LED1 in bit 7 down
 * to LED4 in bit 4, the same as the output port the LEDs hang off.
 *
 * Turning a pattern into pin levels, including which pins are active-low, is
 * kept here as well so that the firmware's LED bank stays a dumb loop over
 * output pins.
 */

use enum_ordinalize::Ordinalize;

pub const LED1: u8 = 0x80;
pub const LED2: u8 = 0x40;
pub const LED3: u8 = 0x20;
pub const LED4: u8 = 0x10;
pub const LEDS_ALL: u8 = LED1 | LED2 | LED3 | LED4;
pub const LEDS_OFF: u8 = 0x00;

#[derive(Ordinalize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum Led {
    Led1,
    Led2,
    Led3,
    Led4,
}

impl Led {
    pub const fn mask(self) -> u8 {
        LED1 >> (self as usize)
    }
}

/// Sink for LED patterns. Writing the same pattern twice must look the same
/// as writing it once.
pub trait IndicatorDriver {
    fn write(&mut self, pattern: u8);
}

/// Last pattern written to the LEDs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndicatorState(u8);

impl IndicatorState {
    pub const fn new() -> Self {
        IndicatorState(LEDS_OFF)
    }

    pub fn pattern(&self) -> u8 {
        self.0
    }

    pub fn is_lit(&self, led: Led) -> bool {
        self.0 & led.mask() != 0
    }

    pub fn set<D: IndicatorDriver>(&mut self, driver: &mut D, pattern: u8) {
        self.0 = pattern;
        driver.write(pattern);
    }
}

/*
 * Pin levels for a pattern. A `true` level means the pin is driven high, so
 * an active-low LED that should be on comes out as `false`.
 */
pub fn pin_levels(pattern: u8, active_lows: &[bool; Led::VARIANT_COUNT]) -> [bool; Led::VARIANT_COUNT] {
    let mut levels = [false; Led::VARIANT_COUNT];
    for led in Led::VARIANTS {
        let i = led.ordinal();
        levels[i] = pattern & led.mask() != 0;
        if active_lows[i] {
            levels[i] = !levels[i];
        }
    }
    levels
}
