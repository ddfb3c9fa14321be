/*
 * A host model of the timer block, for the tests.
 *
 * It has a free-running 16-bit counter, two output-compare channels (the
 * duration channel and the speaker channel, which can toggle the speaker line
 * on every match), four falling-edge inputs, an interrupt-enable register
 * and a flag register. An event that is not armed is not generated at all:
 * a compare match still toggles the line, but raises no flag, and a button
 * edge on a masked input is lost.
 *
 * `step` advances the counter by one tick and then dispatches every armed,
 * pending event to the beacon in priority order, the same way the interrupt
 * controller would. Every register operation is logged so tests can check
 * the order in which the handlers mask and unmask things.
 */

use crate::beacon::Beacon;
use crate::disarm::Source;
use crate::event_source::{EventId, EventSource, Ticks};
use crate::indicator::IndicatorDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Arm(EventId),
    Disarm(EventId),
    Acknowledge(EventId),
    EnableToggle,
    DisableToggle,
}

// A handler that forgets to acknowledge would be re-entered forever.
const MAX_DISPATCHES_PER_TICK: usize = 16;

pub struct SimulatedTimer {
    counter: Ticks,
    duration_compare: Ticks,
    tone_compare: Ticks,
    enabled: u8,
    flags: u8,
    toggle: bool,
    line: bool,
    toggles: u32,
    log: Vec<Op>,
}

impl SimulatedTimer {
    pub fn new() -> Self {
        SimulatedTimer {
            counter: 0,
            duration_compare: 0,
            tone_compare: 0,
            enabled: 0,
            flags: 0,
            toggle: false,
            line: false,
            toggles: 0,
            log: Vec::new(),
        }
    }

    pub fn set_counter(&mut self, counter: Ticks) {
        self.counter = counter;
    }

    pub fn compare(&self, event: EventId) -> Ticks {
        match event {
            EventId::Duration => self.duration_compare,
            EventId::Tone => self.tone_compare,
            EventId::Input(_) => panic!("{event:?} has no compare register"),
        }
    }

    pub fn is_armed(&self, event: EventId) -> bool {
        self.enabled & event.mask() != 0
    }

    pub fn toggle_enabled(&self) -> bool {
        self.toggle
    }

    pub fn line(&self) -> bool {
        self.line
    }

    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    pub fn log(&self) -> &[Op] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn tick(&mut self) {
        self.counter = self.counter.wrapping_add(1);

        if self.counter == self.duration_compare {
            self.raise(EventId::Duration);
        }
        if self.counter == self.tone_compare {
            if self.toggle {
                self.line = !self.line;
                self.toggles += 1;
            }
            self.raise(EventId::Tone);
        }
    }

    /// A falling edge on a button.
    pub fn press(&mut self, source: Source) {
        self.raise(EventId::Input(source));
    }

    pub fn next_pending(&self) -> Option<EventId> {
        EventId::PRIORITY
            .into_iter()
            .find(|&event| self.is_armed(event) && self.is_pending(event))
    }

    fn raise(&mut self, event: EventId) {
        if self.is_armed(event) {
            self.flags |= event.mask();
        }
    }
}

impl EventSource for SimulatedTimer {
    fn arm(&mut self, event: EventId, period: Ticks) {
        self.log.push(Op::Arm(event));
        self.enabled |= event.mask();
        match event {
            EventId::Duration => self.duration_compare = self.counter.wrapping_add(period),
            EventId::Tone => self.tone_compare = self.counter.wrapping_add(period),
            EventId::Input(_) => {}
        }
    }

    fn disarm(&mut self, event: EventId) {
        self.log.push(Op::Disarm(event));
        self.enabled &= !event.mask();
    }

    fn is_pending(&self, event: EventId) -> bool {
        self.flags & event.mask() != 0
    }

    fn acknowledge(&mut self, event: EventId) {
        self.log.push(Op::Acknowledge(event));
        self.flags &= !event.mask();
    }

    fn enable_toggle(&mut self) {
        self.log.push(Op::EnableToggle);
        self.toggle = true;
    }

    fn disable_toggle(&mut self) {
        self.log.push(Op::DisableToggle);
        self.toggle = false;
    }
}

#[derive(Debug, Default)]
pub struct LedLog {
    pub writes: Vec<u8>,
}

impl IndicatorDriver for LedLog {
    fn write(&mut self, pattern: u8) {
        self.writes.push(pattern);
    }
}

pub type SimBeacon<'a> = Beacon<'a, SimulatedTimer, LedLog>;

/// Run every armed, pending event to completion.
pub fn service(beacon: &mut SimBeacon<'_>) -> Vec<EventId> {
    let mut dispatched = Vec::new();
    while let Some(event) = beacon.events().next_pending() {
        assert!(
            dispatched.len() < MAX_DISPATCHES_PER_TICK,
            "{event:?} is never acknowledged"
        );
        beacon.dispatch(event);
        dispatched.push(event);
    }
    dispatched
}

pub fn step(beacon: &mut SimBeacon<'_>) -> Vec<EventId> {
    beacon.events_mut().tick();
    service(beacon)
}

pub fn run(beacon: &mut SimBeacon<'_>, ticks: u32) -> Vec<EventId> {
    let mut dispatched = Vec::new();
    for _ in 0..ticks {
        dispatched.extend(step(beacon));
    }
    dispatched
}

pub fn press(beacon: &mut SimBeacon<'_>, source: Source) -> Vec<EventId> {
    beacon.events_mut().press(source);
    service(beacon)
}
