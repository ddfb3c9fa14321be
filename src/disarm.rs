/*
 * Switching the LEDs off again after the signal has been sent.
 *
 * When playback ends all four LEDs light up and only the first button is
 * armed. Pressing it switches off its LED, masks its own input and arms the
 * second button, and so on until the fourth button leaves everything dark
 * and nothing armed.
 *
 * The order of the buttons is not checked anywhere. A button that is not the
 * next one simply cannot raise an event, because its input is masked. If its
 * handler runs anyway, the hardware or its configuration is broken and we
 * panic.
 */

use enum_ordinalize::Ordinalize;

use crate::beacon::Beacon;
use crate::event_source::{EventId, EventSource};
use crate::indicator::{IndicatorDriver, LEDS_ALL, Led};

#[derive(Ordinalize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum Source {
    Sw1,
    Sw2,
    Sw3,
    Sw4,
}

impl Source {
    pub const FIRST: Source = Source::Sw1;

    /// The button that has to be pressed after this one.
    pub fn next(self) -> Option<Source> {
        Source::from_ordinal(self.ordinal() + 1)
    }

    /// The LED this button switches off.
    pub fn led(self) -> Led {
        match self {
            Source::Sw1 => Led::Led1,
            Source::Sw2 => Led::Led2,
            Source::Sw3 => Led::Led3,
            Source::Sw4 => Led::Led4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisarmState {
    // Playback has not finished yet.
    Inactive,
    Armed(Source),
    Done,
}

impl DisarmState {
    /// How many buttons have been pressed since playback ended.
    pub fn progress(&self) -> usize {
        match self {
            DisarmState::Inactive => 0,
            DisarmState::Armed(source) => source.ordinal(),
            DisarmState::Done => Source::VARIANT_COUNT,
        }
    }
}

impl<'a, E: EventSource, D: IndicatorDriver> Beacon<'a, E, D> {
    /*
     * Called by playback once its own events are masked. Any edge that was
     * latched on the first button while playing is thrown away before the
     * button is armed.
     */
    pub(crate) fn start_disarm(&mut self) {
        self.set_indicators(LEDS_ALL);
        self.arm_source(Source::FIRST);
        info!("waiting for {}", Source::FIRST);
    }

    pub(crate) fn reset_disarm(&mut self) {
        self.disarm = DisarmState::Inactive;
    }

    pub fn on_input_event(&mut self, source: Source) {
        match self.disarm {
            DisarmState::Armed(armed) if armed == source => {}
            state => panic!("{:?} pressed while disarm is {:?}", source, state),
        }

        // Current source off and masked before the next one may fire.
        let event = EventId::Input(source);
        self.events.acknowledge(event);
        self.set_indicators(self.indicators.pattern() & !source.led().mask());
        self.events.disarm(event);

        match source.next() {
            Some(next) => {
                self.arm_source(next);
                debug!("{} done, waiting for {}", source, next);
            }
            None => {
                self.disarm = DisarmState::Done;
                info!("disarmed");
            }
        }
    }

    fn arm_source(&mut self, source: Source) {
        let event = EventId::Input(source);
        self.events.acknowledge(event);
        self.events.arm(event, 0);
        self.disarm = DisarmState::Armed(source);
    }
}
